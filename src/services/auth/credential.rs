//! Bearer credential extraction.
//!
//! Looks at the `Authorization` header first and falls back to the `Bearer`
//! cookie. Nothing else is consulted. Failure reasons are logged at debug level
//! and collapsed into `AppError::Unauthorized`.

use std::collections::HashMap;

use axum::http::{HeaderMap, header};
use tracing::debug;

use crate::error::{AppError, Result};

/// Cookie (and `Authorization` scheme) name carrying the token.
pub const BEARER: &str = "Bearer";

// Stand-in for a header value that is not visible ASCII.
const UNREADABLE: &str = "<unreadable>";

/// Read-only view of the request metadata the extractor needs.
///
/// Header names are matched case-insensitively by implementations.
pub trait RequestContext {
    fn header(&self, name: &str) -> Option<&str>;

    fn cookie(&self, name: &str) -> Option<String>;
}

impl RequestContext for HeaderMap {
    fn header(&self, name: &str) -> Option<&str> {
        // An unreadable value is still "present": it must not fall through to the cookie.
        self.get(name).map(|v| v.to_str().unwrap_or(UNREADABLE))
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|raw| find_cookie(raw, name))
    }
}

/// Owned request metadata for callers that are not on an axum stack.
#[derive(Debug, Clone, Default)]
pub struct RequestMetadata {
    headers: HashMap<String, String>,
    cookies: HashMap<String, String>,
}

impl RequestMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }
}

impl RequestContext for RequestMetadata {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).map(|v| unquote(v).to_string())
    }
}

/// Locate the raw bearer token in `ctx`.
pub fn extract_bearer<C: RequestContext + ?Sized>(ctx: &C) -> Result<String> {
    match ctx.header(header::AUTHORIZATION.as_str()) {
        Some(value) if !value.trim().is_empty() => parse_authorization(value),
        _ => from_cookie(ctx),
    }
}

fn parse_authorization(value: &str) -> Result<String> {
    let mut parts = value.trim().split(' ');
    let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        debug!(target: "web_auth::credential", "malformed Authorization header");
        return Err(AppError::Unauthorized);
    };

    if !scheme.eq_ignore_ascii_case(BEARER) {
        debug!(
            target: "web_auth::credential",
            scheme = %scheme,
            "invalid Authorization scheme, must be Bearer"
        );
        return Err(AppError::Unauthorized);
    }
    if token.is_empty() {
        debug!(target: "web_auth::credential", "empty bearer token");
        return Err(AppError::Unauthorized);
    }

    Ok(token.to_string())
}

fn from_cookie<C: RequestContext + ?Sized>(ctx: &C) -> Result<String> {
    match ctx.cookie(BEARER) {
        Some(token) if !token.is_empty() => Ok(token),
        Some(_) => {
            debug!(target: "web_auth::credential", "empty Bearer cookie");
            Err(AppError::Unauthorized)
        }
        None => {
            debug!(target: "web_auth::credential", "no credential presented");
            Err(AppError::Unauthorized)
        }
    }
}

// `Cookie: a=1; Bearer=xyz` (RFC 6265 cookie-string)
fn find_cookie(raw: &str, name: &str) -> Option<String> {
    raw.split(';').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k.trim() == name).then(|| unquote(v.trim()).to_string())
    })
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn bearer_header_returns_token() {
        let map = headers(&[(header::AUTHORIZATION, "Bearer abc.def.ghi")]);
        assert_eq!(extract_bearer(&map).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        for scheme in ["bearer", "BEARER", "BeArEr"] {
            let ctx = RequestMetadata::new().with_header("Authorization", format!("{scheme} tok"));
            assert_eq!(extract_bearer(&ctx).unwrap(), "tok");
        }
    }

    #[test]
    fn other_scheme_is_rejected() {
        for value in ["Basic dXNlcjpwYXNz", "Token abc", "Digest x"] {
            let map = headers(&[(header::AUTHORIZATION, value)]);
            assert_eq!(extract_bearer(&map), Err(AppError::Unauthorized));
        }
    }

    #[test]
    fn other_scheme_does_not_fall_back_to_cookie() {
        let map = headers(&[
            (header::AUTHORIZATION, "Basic dXNlcjpwYXNz"),
            (header::COOKIE, "Bearer=from-cookie"),
        ]);
        assert_eq!(extract_bearer(&map), Err(AppError::Unauthorized));
    }

    #[test]
    fn malformed_header_is_rejected() {
        for value in ["Bearer", "Bearer a b", "Bearer  a"] {
            let ctx = RequestMetadata::new().with_header("authorization", value);
            assert_eq!(extract_bearer(&ctx), Err(AppError::Unauthorized), "{value}");
        }
    }

    #[test]
    fn header_wins_over_cookie() {
        let map = headers(&[
            (header::AUTHORIZATION, "Bearer from-header"),
            (header::COOKIE, "Bearer=from-cookie"),
        ]);
        assert_eq!(extract_bearer(&map).unwrap(), "from-header");
    }

    #[test]
    fn cookie_is_used_without_header() {
        let map = headers(&[(header::COOKIE, "session=1; Bearer=cookie.tok.en; theme=dark")]);
        assert_eq!(extract_bearer(&map).unwrap(), "cookie.tok.en");
    }

    #[test]
    fn quoted_cookie_value_is_unquoted() {
        let map = headers(&[(header::COOKIE, "Bearer=\"quoted.tok.en\"")]);
        assert_eq!(extract_bearer(&map).unwrap(), "quoted.tok.en");
    }

    #[test]
    fn cookie_found_across_multiple_cookie_headers() {
        let map = headers(&[
            (header::COOKIE, "session=1"),
            (header::COOKIE, "Bearer=second"),
        ]);
        assert_eq!(extract_bearer(&map).unwrap(), "second");
    }

    #[test]
    fn blank_header_falls_back_to_cookie() {
        let ctx = RequestMetadata::new()
            .with_header("Authorization", "  ")
            .with_cookie(BEARER, "tok");
        assert_eq!(extract_bearer(&ctx).unwrap(), "tok");
    }

    #[test]
    fn missing_credential_is_unauthorized() {
        assert_eq!(extract_bearer(&HeaderMap::new()), Err(AppError::Unauthorized));

        let map = headers(&[(header::COOKIE, "session=1; bearer=lowercase-name")]);
        assert_eq!(extract_bearer(&map), Err(AppError::Unauthorized));
    }

    #[test]
    fn empty_cookie_is_unauthorized() {
        let map = headers(&[(header::COOKIE, "Bearer=")]);
        assert_eq!(extract_bearer(&map), Err(AppError::Unauthorized));
    }

    #[test]
    fn opaque_header_value_is_unauthorized() {
        let mut map = HeaderMap::new();
        map.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap(),
        );
        map.insert(header::COOKIE, HeaderValue::from_static("Bearer=fallback"));
        assert_eq!(extract_bearer(&map), Err(AppError::Unauthorized));
    }
}
