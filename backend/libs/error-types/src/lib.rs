//! Unified error response format for omniview HTTP services
//!
//! Every failing route answers with the same JSON body so the frontend can
//! branch on `code` without parsing `message`.

use serde::{Deserialize, Serialize};

/// Wire body for every non-2xx JSON response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short error kind, e.g. `"AuthenticationError"`
    pub error: String,
    /// Human-readable message
    pub message: String,
    /// Stable machine-readable code, see [`error_codes`]
    pub code: String,
}

impl ErrorResponse {
    pub fn new(
        error: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

/// Stable error codes surfaced to API clients.
pub mod error_codes {
    pub const NOT_AUTHENTICATED: &str = "NOT_AUTHENTICATED";
    pub const TOKEN_REFRESH_FAILED: &str = "TOKEN_REFRESH_FAILED";
    pub const INVALID_STATE: &str = "INVALID_STATE";
    pub const OAUTH_EXCHANGE_FAILED: &str = "OAUTH_EXCHANGE_FAILED";
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";
    pub const UPSTREAM_UNAUTHORIZED: &str = "UPSTREAM_UNAUTHORIZED";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFIGURATION_ERROR: &str = "CONFIGURATION_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_error_message_and_code() {
        let body = ErrorResponse::new(
            "AuthenticationError",
            "Not logged in to twitch",
            error_codes::NOT_AUTHENTICATED,
        );
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "AuthenticationError");
        assert_eq!(json["message"], "Not logged in to twitch");
        assert_eq!(json["code"], "NOT_AUTHENTICATED");
        assert_eq!(json.as_object().unwrap().len(), 3);
    }
}
