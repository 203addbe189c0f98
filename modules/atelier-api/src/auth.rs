use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use atelier_common::AtelierError;

use crate::{error::ApiError, AppState};

type HmacSha256 = Hmac<Sha256>;

const COOKIE_NAME: &str = "at_session";
const SESSION_DURATION_SECS: i64 = 7 * 24 * 3600; // 7 days

/// Authenticated session. Extract this in handlers that require a caller.
/// If the session cookie is missing or invalid, the request is rejected
/// with a 401 JSON body. This API has no login page of its own; sessions
/// are minted by the external auth provider's callback.
pub struct Session {
    pub user_id: String,
}

impl FromRequestParts<Arc<AppState>> for Session {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match session_from_parts(parts, &state.config.session_secret) {
            Some(user_id) => Ok(Session { user_id }),
            None => Err(ApiError(AtelierError::Authorization(
                "authentication required".to_string(),
            ))
            .into_response()),
        }
    }
}

/// Session if present, `None` otherwise. Never rejects. Used by the event
/// append endpoint, where anonymous callers are permitted and the actor is
/// simply recorded as null.
pub struct MaybeSession(pub Option<String>);

impl FromRequestParts<Arc<AppState>> for MaybeSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeSession(session_from_parts(
            parts,
            &state.config.session_secret,
        )))
    }
}

fn session_from_parts(parts: &Parts, secret: &str) -> Option<String> {
    let cookie_header = parts
        .headers
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    parse_cookie(cookie_header, COOKIE_NAME).and_then(|value| verify_session(value, secret))
}

/// Create a signed session cookie value: `user_id|expiry|signature`
pub fn create_session(user_id: &str, secret: &str) -> String {
    let expiry = chrono::Utc::now().timestamp() + SESSION_DURATION_SECS;
    let payload = format!("{user_id}|{expiry}");
    let sig = sign(&payload, secret);
    format!("{payload}|{sig}")
}

/// Build the Cookie header value for a session. Used by tests and by the
/// auth provider callback that mints sessions.
pub fn session_cookie_header(user_id: &str, secret: &str) -> String {
    format!("{COOKIE_NAME}={}", create_session(user_id, secret))
}

/// Verify a session cookie value. Returns the user id if valid.
fn verify_session(value: &str, secret: &str) -> Option<String> {
    let parts: Vec<&str> = value.splitn(3, '|').collect();
    if parts.len() != 3 {
        return None;
    }

    let user_id = parts[0];
    let expiry_str = parts[1];
    let sig = parts[2];

    // Verify signature
    let payload = format!("{user_id}|{expiry_str}");
    let expected_sig = sign(&payload, secret);
    if !constant_time_eq(sig.as_bytes(), expected_sig.as_bytes()) {
        return None;
    }

    // Check expiry
    let expiry: i64 = expiry_str.parse().ok()?;
    if chrono::Utc::now().timestamp() > expiry {
        return None;
    }

    Some(user_id.to_string())
}

fn sign(payload: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time comparison to prevent timing attacks.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Parse a specific cookie from the Cookie header string.
fn parse_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    for part in header.split(';') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix(name) {
            if let Some(value) = value.strip_prefix('=') {
                return Some(value);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_session() {
        let secret = "test-secret-key";
        let user_id = "user_2abc";
        let cookie_value = create_session(user_id, secret);
        let result = verify_session(&cookie_value, secret);
        assert_eq!(result, Some(user_id.to_string()));
    }

    #[test]
    fn rejects_tampered_session() {
        let secret = "test-secret-key";
        let cookie_value = create_session("user_2abc", secret);
        // Tamper with the user id
        let tampered = cookie_value.replacen("user_2abc", "user_9zzz", 1);
        assert_eq!(verify_session(&tampered, secret), None);
    }

    #[test]
    fn rejects_wrong_secret() {
        let cookie_value = create_session("user_2abc", "secret-a");
        assert_eq!(verify_session(&cookie_value, "secret-b"), None);
    }

    #[test]
    fn rejects_expired_session() {
        let user_id = "user_2abc";
        let secret = "test-secret";
        // Manually create an expired session
        let expiry = chrono::Utc::now().timestamp() - 100;
        let payload = format!("{user_id}|{expiry}");
        let sig = sign(&payload, secret);
        let value = format!("{payload}|{sig}");
        assert_eq!(verify_session(&value, secret), None);
    }

    #[test]
    fn rejects_malformed_value() {
        assert_eq!(verify_session("garbage", "secret"), None);
        assert_eq!(verify_session("a|b", "secret"), None);
    }

    #[test]
    fn parse_cookie_works() {
        assert_eq!(
            parse_cookie("at_session=abc123; other=xyz", "at_session"),
            Some("abc123")
        );
        assert_eq!(
            parse_cookie("other=xyz; at_session=abc123", "at_session"),
            Some("abc123")
        );
        assert_eq!(parse_cookie("other=xyz", "at_session"), None);
    }
}
