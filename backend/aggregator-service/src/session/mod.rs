//! Signed-cookie sessions
//!
//! The cookie only carries an opaque session id plus its HMAC; credentials
//! live server-side in a [`CredentialRepository`].

mod repository;

pub use repository::{CacheCredentialRepository, CredentialRepository};

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::AppError;

pub const SESSION_COOKIE: &str = "omniview_session";

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies `<uuid>.<hex hmac-sha256>` cookie values.
#[derive(Clone)]
pub struct SessionSigner {
    key: Vec<u8>,
}

impl SessionSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length")
    }

    pub fn sign(&self, session_id: &str) -> String {
        let mut mac = self.mac();
        mac.update(session_id.as_bytes());
        format!("{}.{}", session_id, hex::encode(mac.finalize().into_bytes()))
    }

    /// Session id of a correctly signed value.
    pub fn verify(&self, value: &str) -> Option<String> {
        let (session_id, signature) = value.rsplit_once('.')?;
        Uuid::parse_str(session_id).ok()?;
        let signature = hex::decode(signature).ok()?;

        let mut mac = self.mac();
        mac.update(session_id.as_bytes());
        mac.verify_slice(&signature).ok()?;
        Some(session_id.to_string())
    }
}

/// Cookie policy plus signer, shared through [`AppState`].
#[derive(Clone)]
pub struct SessionManager {
    signer: SessionSigner,
    ttl_secs: u64,
    secure: bool,
}

impl SessionManager {
    pub fn new(secret: &str, ttl_secs: u64, secure: bool) -> Self {
        Self {
            signer: SessionSigner::new(secret),
            ttl_secs,
            secure,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Session from a cookie value, or a fresh one when it is missing or forged.
    pub fn resolve(&self, cookie_value: Option<&str>) -> Session {
        match cookie_value.and_then(|value| self.signer.verify(value)) {
            Some(id) => Session { id, is_new: false },
            None => {
                if cookie_value.is_some() {
                    debug!("Discarding session cookie with bad signature");
                }
                Session {
                    id: Uuid::new_v4().to_string(),
                    is_new: true,
                }
            }
        }
    }

    pub fn cookie(&self, session: &Session) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, self.signer.sign(&session.id))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(CookieDuration::seconds(self.ttl_secs as i64))
            .finish()
    }
}

/// Request extractor; never fails for a missing cookie, it mints a new id.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    is_new: bool,
}

impl Session {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// True when the caller has no valid cookie yet.
    pub fn is_new(&self) -> bool {
        self.is_new
    }
}

impl FromRequest for Session {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<AppState>>() {
            Some(state) => {
                let cookie = req.cookie(SESSION_COOKIE);
                Ok(state.sessions.resolve(cookie.as_ref().map(|c| c.value())))
            }
            None => Err(AppError::Internal("application state not configured".into())),
        };
        ready(result)
    }
}
