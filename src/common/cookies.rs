// src/common/cookies.rs
//! Minimal cookie reading and `Set-Cookie` building

use axum::http::{header::COOKIE, HeaderMap, HeaderValue};

use super::ApiError;

/// Session cookie carrying the authenticated-session token
pub const SESSION_COOKIE: &str = "pastemyst";
/// Cookie carrying the pending-registration token
pub const REGISTRATION_COOKIE: &str = "pastemyst-registration";
/// Cookie identifying the browser during an OAuth round trip
pub const OAUTH_SESSION_COOKIE: &str = "pastemyst_oauth_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
        }
    }
}

/// Returns the value of the first cookie named `name`, if any
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Builds an HttpOnly `Set-Cookie` value scoped to `/`
pub fn build_cookie(
    name: &str,
    value: &str,
    max_age_secs: i64,
    same_site: SameSite,
    secure: bool,
) -> Result<HeaderValue, ApiError> {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite={}",
        name,
        value,
        max_age_secs,
        same_site.as_str()
    );
    if secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::InternalServer(format!("invalid cookie value: {}", e)))
}

/// Builds a `Set-Cookie` value that removes `name` from the browser
pub fn expired_cookie(name: &str, secure: bool) -> Result<HeaderValue, ApiError> {
    let mut cookie = format!(
        "{}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Strict",
        name
    );
    if secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::InternalServer(format!("invalid cookie value: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_cookie_among_many() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; pastemyst=abc.def.ghi; other=1"),
        );

        assert_eq!(
            read_cookie(&headers, SESSION_COOKIE),
            Some("abc.def.ghi".to_string())
        );
        assert_eq!(read_cookie(&headers, REGISTRATION_COOKIE), None);
    }

    #[test]
    fn test_read_cookie_does_not_match_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("pastemyst-registration=reg"),
        );

        assert_eq!(read_cookie(&headers, SESSION_COOKIE), None);
        assert_eq!(
            read_cookie(&headers, REGISTRATION_COOKIE),
            Some("reg".to_string())
        );
    }

    #[test]
    fn test_empty_cookie_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("pastemyst="));
        assert_eq!(read_cookie(&headers, SESSION_COOKIE), None);
    }

    #[test]
    fn test_build_cookie_attributes() {
        let value = build_cookie(SESSION_COOKIE, "token", 60, SameSite::Strict, true).unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("pastemyst=token;"));
        assert!(value.contains("Max-Age=60"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Strict"));
        assert!(value.ends_with("; Secure"));
    }

    #[test]
    fn test_expired_cookie() {
        let value = expired_cookie(REGISTRATION_COOKIE, false).unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("pastemyst-registration=;"));
        assert!(value.contains("Max-Age=0"));
        assert!(!value.contains("Secure"));
    }
}
