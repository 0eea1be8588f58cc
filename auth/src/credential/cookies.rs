use http::header::InvalidHeaderValue;
use http::HeaderValue;

use super::carrier::LEGACY_COOKIE;
use super::carrier::PRIMARY_COOKIE;

/// Build the `Set-Cookie` value carrying a freshly issued token.
pub fn session_cookie(
    token: &str,
    max_age_seconds: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{PRIMARY_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// `Set-Cookie` values expiring both session cookies.
pub fn clear_session_cookies(secure: bool) -> Result<[HeaderValue; 2], InvalidHeaderValue> {
    Ok([
        expired_cookie(PRIMARY_COOKIE, secure)?,
        expired_cookie(LEGACY_COOKIE, secure)?,
    ])
}

fn expired_cookie(name: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}
