//! services/api/src/web/cookies.rs
//!
//! Reading and writing the two cookies the service uses: the login session and
//! the id of the last surprise a browser opened.

use axum::http::{header, HeaderMap, HeaderValue};
use chrono::Duration;

pub const SESSION_COOKIE: &str = "session";
pub const LAST_SURPRISE_COOKIE: &str = "last_surprise";

/// Finds the value of cookie `name` in the request's `Cookie` header.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| {
            let (key, value) = c.trim().split_once('=')?;
            (key == name).then_some(value)
        })
}

fn secure_flag(secure: bool) -> &'static str {
    if secure {
        "; Secure"
    } else {
        ""
    }
}

pub fn session_cookie(session_id: &str, max_age: Duration, secure: bool) -> String {
    format!(
        "{}={}; HttpOnly{}; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        session_id,
        secure_flag(secure),
        max_age.num_seconds()
    )
}

pub fn clear_session_cookie(secure: bool) -> String {
    format!(
        "{}=; HttpOnly{}; SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE,
        secure_flag(secure)
    )
}

/// Remembers `surprise_id` for a year. Ids that are not plain tokens are not remembered.
pub fn last_surprise_cookie(surprise_id: &str, secure: bool) -> Option<HeaderValue> {
    let is_token = surprise_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if surprise_id.is_empty() || !is_token {
        return None;
    }
    HeaderValue::from_str(&format!(
        "{}={}{}; SameSite=Lax; Path=/; Max-Age={}",
        LAST_SURPRISE_COOKIE,
        surprise_id,
        secure_flag(secure),
        Duration::days(365).num_seconds()
    ))
    .ok()
}

pub fn clear_last_surprise_cookie(secure: bool) -> HeaderValue {
    HeaderValue::from_str(&format!(
        "{}=; SameSite=Lax; Path=/; Max-Age=0{}",
        LAST_SURPRISE_COOKIE,
        secure_flag(secure)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("last_surprise=; Path=/; Max-Age=0"))
}
