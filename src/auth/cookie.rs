use axum::http::{header, HeaderMap};

pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// `Set-Cookie` value carrying the refresh token.
pub fn refresh_cookie(token: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{REFRESH_COOKIE_NAME}={token}; Path=/; SameSite=Strict; HttpOnly; Max-Age={max_age_seconds}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that makes the browser drop the refresh token.
pub fn cleared_refresh_cookie(secure: bool) -> String {
    refresh_cookie("", 0, secure)
}

/// First non-empty value of the named cookie across all `Cookie` headers.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, v)| *k == name && !v.is_empty())
        .map(|(_, v)| v)
}
