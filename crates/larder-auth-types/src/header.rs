//! `Authorization` header parsing.

use http::HeaderMap;
use http::header::AUTHORIZATION;

use crate::token::AuthError;

/// Schemes accepted in front of the token value.
pub const TOKEN_SCHEMES: &[&str] = &["Token", "Bearer"];

/// Pull the raw token out of `Authorization: Token <jwt>` (or `Bearer`).
///
/// `Ok(None)` means the header is absent and the caller is anonymous. A
/// present header with another scheme, no value, or non-ASCII bytes is an
/// error.
pub fn token_from_headers(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AuthError::Malformed)?;
    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(AuthError::UnsupportedScheme)?;
    if !TOKEN_SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme)) {
        return Err(AuthError::UnsupportedScheme);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::Malformed);
    }
    Ok(Some(token))
}
