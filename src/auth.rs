//! The shared-secret admin gate.
//!
//! Admin sessions are HMAC-signed tokens carried in an HttpOnly cookie.
//! Anything that fails to decode, verify, or sit inside its expiry window
//! is treated exactly like a missing cookie: the request is bounced to the
//! login page.

use axum::extract::{FromRequest, RequestParts};
use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use axum::response::Redirect;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::Duration;
use uuid::Uuid;

use crate::config::Settings;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::util::current_time;

pub const SESSION_COOKIE: &str = "sahyog_admin";
pub const LOGIN_PATH: &str = "/admin/login";

const SESSION_LIFETIME: Duration = Duration::days(7);

#[derive(Serialize, Deserialize)]
struct SessionClaims {
    iat: i64,
    exp: i64,
    /// Distinguishes sessions issued at the same second
    nonce: String,
}

/// Checks the submitted password against the configured admin secret.
/// With no secret configured there is nothing to compare against, so every
/// attempt is rejected.
pub fn authenticate(password: &str, settings: &Settings) -> bool {
    match &settings.admin_password {
        Some(secret) => password == secret,
        None => {
            tracing::warn!("admin login attempted but no admin password is configured");
            false
        }
    }
}

pub fn create_session(settings: &Settings) -> ApiResult<String> {
    let now = current_time();
    let claims = SessionClaims {
        iat: now.unix_timestamp(),
        exp: (now + SESSION_LIFETIME).unix_timestamp(),
        nonce: Uuid::new_v4().to_string(),
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.session_secret.as_bytes()),
    )
    .map_err(|err| ApiError::Server(format!("failed to sign session token: {err}")))
}

pub fn validate_session(token: &str, settings: &Settings) -> bool {
    jsonwebtoken::decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(settings.session_secret.as_bytes()),
        &Validation::default(),
    )
    .is_ok()
}

/// The `Set-Cookie` value that establishes an admin session.
pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE,
        token,
        SESSION_LIFETIME.whole_seconds()
    )
}

/// The `Set-Cookie` value that destroys the session.
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax")
}

pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;

    cookies.split(';').find_map(|cookie| {
        cookie
            .trim()
            .strip_prefix(SESSION_COOKIE)?
            .strip_prefix('=')
            .map(ToOwned::to_owned)
    })
}

/// Extract an `Admin` in a handler to require a valid session. There is no
/// admin identity to carry, so the extractor is the whole check: failing it
/// redirects to the login page instead of producing an error value.
pub struct Admin;

#[axum::async_trait]
impl<B: Send> FromRequest<B> for Admin {
    type Rejection = Redirect;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let valid = req
            .extensions()
            .get::<AppState>()
            .zip(session_token(req.headers()))
            .map(|(state, token)| validate_session(&token, &state.settings))
            .unwrap_or(false);

        if valid {
            Ok(Admin)
        } else {
            Err(Redirect::to(LOGIN_PATH))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn test_settings(admin_password: Option<&str>) -> Settings {
        Settings {
            port: 0,
            database_url: "mem://".to_owned(),
            database_ns: "test".to_owned(),
            database_db: "test".to_owned(),
            admin_password: admin_password.map(ToOwned::to_owned),
            session_secret: "0123456789abcdef0123456789abcdef".to_owned(),
            blob_api_url: None,
            blob_token: None,
            upload_dir: "public/uploads".into(),
            upload_prefix: "/uploads".to_owned(),
            mailgun_token: None,
            mailgun_domain: None,
            contact_email: None,
            revalidate_url: None,
        }
    }

    #[test]
    fn authentication_fails_closed_without_a_configured_password() {
        let settings = test_settings(None);
        assert!(!authenticate("", &settings));
        assert!(!authenticate("hunter2", &settings));
    }

    #[test]
    fn authentication_requires_an_exact_match() {
        let settings = test_settings(Some("hunter2"));
        assert!(authenticate("hunter2", &settings));
        assert!(!authenticate("Hunter2", &settings));
        assert!(!authenticate("hunter2 ", &settings));
    }

    #[test]
    fn fresh_sessions_validate() {
        let settings = test_settings(None);
        let token = create_session(&settings).unwrap();
        assert!(validate_session(&token, &settings));
    }

    #[test]
    fn expired_sessions_are_rejected() {
        let settings = test_settings(None);
        let issued = current_time() - Duration::days(8);
        let claims = SessionClaims {
            iat: issued.unix_timestamp(),
            exp: (issued + SESSION_LIFETIME).unix_timestamp(),
            nonce: "nonce".to_owned(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(settings.session_secret.as_bytes()),
        )
        .unwrap();

        assert!(!validate_session(&token, &settings));
    }

    #[test]
    fn malformed_and_foreign_tokens_are_rejected() {
        let settings = test_settings(None);
        assert!(!validate_session("", &settings));
        assert!(!validate_session("definitely-not-a-token", &settings));

        let mut other = test_settings(None);
        other.session_secret = "ffffffffffffffffffffffffffffffff".to_owned();
        let foreign = create_session(&other).unwrap();
        assert!(!validate_session(&foreign, &settings));
    }

    #[test]
    fn session_token_is_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; sahyog_admin=abc123; lang=en"),
        );
        assert_eq!(session_token(&headers), Some("abc123".to_owned()));

        let mut unrelated = HeaderMap::new();
        unrelated.insert(COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(session_token(&unrelated), None);
    }
}
