//! Session credential helpers
//!
//! A session id travels either as the `roomshare_session` cookie or as an
//! `Authorization: Bearer` token; the header wins when both are present.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use roomshare_core::UserId;
use tower_cookies::{Cookie, Cookies};

use crate::error::MarketError;
use crate::store::{Session, SessionId, SessionStore};

pub const SESSION_COOKIE: &str = "roomshare_session";

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Helper to get the current session, if any
pub fn get_session<S: SessionStore>(
    cookies: &Cookies,
    headers: &HeaderMap,
    session_store: &S,
) -> Option<Session> {
    let token = bearer_token(headers)
        .map(str::to_string)
        .or_else(|| cookies.get(SESSION_COOKIE).map(|c| c.value().to_string()))?;
    session_store.get(&SessionId(token)).ok().flatten()
}

/// Helper to require an authenticated user
pub fn require_user<S: SessionStore>(
    cookies: &Cookies,
    headers: &HeaderMap,
    session_store: &S,
) -> Result<UserId, MarketError> {
    get_session(cookies, headers, session_store)
        .map(|session| session.user_id)
        .ok_or(MarketError::NotAuthenticated)
}

/// Helper to set session cookie
pub fn set_session_cookie(cookies: &Cookies, session_id: &str) {
    let cookie = Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true)
        .build();
    cookies.add(cookie);
}

/// Helper to clear session cookie
pub fn clear_session_cookie(cookies: &Cookies) {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(tower_cookies::cookie::time::Duration::ZERO)
        .build();
    cookies.add(cookie);
}
