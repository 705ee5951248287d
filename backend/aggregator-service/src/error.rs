use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use error_types::{error_codes, ErrorResponse};
use thiserror::Error;

use crate::models::Platform;
use crate::platforms::PlatformError;
use crate::services::oauth::OAuthError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not logged in to {0}")]
    NotAuthenticated(Platform),

    #[error("{platform} session expired and could not be refreshed: {reason}")]
    TokenRefreshFailed { platform: Platform, reason: String },

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    OAuth(#[from] OAuthError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    fn kind_and_code(&self) -> (&'static str, &'static str) {
        match self {
            AppError::NotAuthenticated(_) => ("AuthenticationError", error_codes::NOT_AUTHENTICATED),
            AppError::TokenRefreshFailed { .. } => ("AuthenticationError", error_codes::TOKEN_REFRESH_FAILED),
            AppError::Platform(e) if e.status() == Some(401) => {
                ("UpstreamError", error_codes::UPSTREAM_UNAUTHORIZED)
            }
            AppError::Platform(_) => ("UpstreamError", error_codes::UPSTREAM_ERROR),
            AppError::OAuth(OAuthError::InvalidState) => ("OAuthError", error_codes::INVALID_STATE),
            AppError::OAuth(OAuthError::Upstream { .. }) => ("OAuthError", error_codes::OAUTH_EXCHANGE_FAILED),
            AppError::OAuth(OAuthError::Network(_) | OAuthError::Decode(_)) => {
                ("OAuthError", error_codes::UPSTREAM_ERROR)
            }
            AppError::OAuth(OAuthError::Config(_)) => ("ConfigurationError", error_codes::CONFIGURATION_ERROR),
            AppError::OAuth(OAuthError::Unsupported(_) | OAuthError::Pkce(_)) => {
                ("ValidationError", error_codes::VALIDATION_ERROR)
            }
            AppError::OAuth(OAuthError::StateStore) => ("InternalError", error_codes::INTERNAL_ERROR),
            AppError::Validation(_) => ("ValidationError", error_codes::VALIDATION_ERROR),
            AppError::NotFound(_) => ("NotFound", error_codes::NOT_FOUND),
            AppError::Internal(_) => ("InternalError", error_codes::INTERNAL_ERROR),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotAuthenticated(_) | AppError::TokenRefreshFailed { .. } => StatusCode::UNAUTHORIZED,
            AppError::Platform(e) if e.status() == Some(401) => StatusCode::UNAUTHORIZED,
            AppError::Platform(_) => StatusCode::BAD_GATEWAY,
            AppError::OAuth(e) => match e {
                OAuthError::InvalidState | OAuthError::Unsupported(_) | OAuthError::Pkce(_) => {
                    StatusCode::BAD_REQUEST
                }
                OAuthError::Upstream { .. } => StatusCode::UNAUTHORIZED,
                OAuthError::Network(_) | OAuthError::Decode(_) => StatusCode::BAD_GATEWAY,
                OAuthError::Config(_) | OAuthError::StateStore => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (kind, code) = self.kind_and_code();
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(kind, self.to_string(), code))
    }
}
