//! Token cookies
//!
//! Both tokens travel as `HttpOnly; SameSite=Strict; Path=/` cookies. The
//! `Secure` flag follows `auth.secure_cookies`.

use axum::http::{HeaderMap, header};
use chrono::Duration;
use cookie::{Cookie, SameSite};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

pub fn token_cookie(name: &str, value: &str, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((name.to_string(), value.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(cookie::time::Duration::seconds(max_age.num_seconds()))
        .build()
}

/// A cookie that tells the browser to forget `name` right away.
pub fn removal_cookie(name: &str, secure: bool) -> Cookie<'static> {
    token_cookie(name, "", Duration::zero(), secure)
}

/// Find cookie `name` in the request's `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(|parsed| parsed.ok())
        .find(|c| c.name() == name && !c.value().is_empty())
        .map(|c| c.value().to_string())
}
