//! Signup, email verification and login endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use chrono::Utc;
use roomshare_core::user::validate_aadhar;
use roomshare_core::{Role, RoomId, RoommateProfile, User, UserId};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use super::extract::ApiJson;
use super::session::{clear_session_cookie, get_session, require_user, set_session_cookie};
use super::{ok, ok_with_message};
use crate::crypto::{generate_verification_code, hash_password, verify_password};
use crate::email::EmailSender;
use crate::error::MarketError;
use crate::state::AppState;
use crate::store::{MarketStore, PendingVerification, SessionStore};

/// Minimum password length
const MIN_PASSWORD_LENGTH: usize = 8;
/// Maximum password length
const MAX_PASSWORD_LENGTH: usize = 80;

/// The signed-in user's own account
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    pub is_verified: bool,
    pub listed_rooms: Vec<RoomId>,
    pub rented_rooms: Vec<RoomId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roommate_profile: Option<RoommateProfile>,
}

impl From<User> for AccountView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            is_verified: user.is_verified,
            listed_rooms: user.listed_rooms,
            rented_rooms: user.rented_rooms,
            roommate_profile: user.roommate_profile,
        }
    }
}

#[derive(Serialize)]
pub struct SessionPayload {
    pub token: String,
    pub user: AccountView,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub aadhar_number: String,
    pub role: Role,
    pub phone: Option<String>,
}

/// POST /api/auth/signup
/// Create an unverified account and email a verification code
pub async fn signup<M, S, E>(
    State(state): State<Arc<AppState<M, S, E>>>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse, MarketError>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    let name = req.name.trim();
    if name.is_empty() {
        return Err(MarketError::Validation("Name is required".to_string()));
    }
    let email = req.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(MarketError::Validation("A valid email is required".to_string()));
    }
    let password_length = req.password.chars().count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&password_length) {
        return Err(MarketError::Validation(format!(
            "Password must be between {} and {} characters",
            MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
        )));
    }
    validate_aadhar(req.aadhar_number.trim())?;

    if state.store.get_user_by_email(&email)?.is_some() {
        return Err(MarketError::Conflict("Email already registered".to_string()));
    }

    let password_hash =
        hash_password(&req.password, state.config.bcrypt_cost).map_err(MarketError::internal)?;

    let mut user = User::new(
        name,
        email.as_str(),
        req.aadhar_number.trim(),
        password_hash,
        req.role,
    );
    user.phone = req.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
    state.store.create_user(&user)?;

    let swept = state
        .store
        .cleanup_expired_pending(state.config.verification_ttl_minutes)?;
    if swept > 0 {
        tracing::debug!(swept, "Dropped expired verification codes");
    }

    let code = generate_verification_code();
    state.store.create_pending(PendingVerification {
        email: email.clone(),
        code: code.clone(),
        user_id: user.id,
        created_at: Utc::now(),
    })?;

    state
        .email_sender
        .send_verification(&email, &code)
        .map_err(MarketError::Internal)?;

    tracing::info!(user_id = %user.id, role = ?user.role, "Account created, awaiting verification");

    Ok((
        StatusCode::CREATED,
        ok_with_message("Verification code sent", user.summary()),
    ))
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

/// POST /api/auth/verify
/// Confirm the emailed code and open a session
pub async fn verify<M, S, E>(
    State(state): State<Arc<AppState<M, S, E>>>,
    cookies: Cookies,
    ApiJson(req): ApiJson<VerifyRequest>,
) -> Result<impl IntoResponse, MarketError>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    let pending = state
        .store
        .get_pending(&req.email)?
        .ok_or(MarketError::InvalidVerificationCode)?;

    let ttl = chrono::Duration::minutes(state.config.verification_ttl_minutes);
    if Utc::now() - pending.created_at > ttl {
        state.store.delete_pending(&pending.email)?;
        return Err(MarketError::VerificationExpired);
    }
    if pending.code != req.code.trim() {
        return Err(MarketError::InvalidVerificationCode);
    }

    state.store.set_verified(pending.user_id)?;
    state.store.delete_pending(&pending.email)?;

    let user = state
        .store
        .get_user(pending.user_id)?
        .ok_or(MarketError::NotFound("User"))?;
    let session = state.session_store.create(user.id)?;
    set_session_cookie(&cookies, &session.id.0);

    tracing::info!(user_id = %user.id, "Account verified");

    Ok(ok(SessionPayload {
        token: session.id.0,
        user: user.into(),
    }))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login
pub async fn login<M, S, E>(
    State(state): State<Arc<AppState<M, S, E>>>,
    cookies: Cookies,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, MarketError>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    let user = state
        .store
        .get_user_by_email(&req.email)?
        .ok_or(MarketError::InvalidCredentials)?;

    let valid = verify_password(&req.password, &user.password_hash)
        .map_err(MarketError::internal)?;
    if !valid {
        return Err(MarketError::InvalidCredentials);
    }
    if !user.is_verified {
        return Err(MarketError::Forbidden(
            "Please verify your account first".to_string(),
        ));
    }

    let session = state.session_store.create(user.id)?;
    set_session_cookie(&cookies, &session.id.0);

    tracing::debug!(user_id = %user.id, "User logged in");

    Ok(ok(SessionPayload {
        token: session.id.0,
        user: user.into(),
    }))
}

/// POST /api/auth/logout
pub async fn logout<M, S, E>(
    State(state): State<Arc<AppState<M, S, E>>>,
    cookies: Cookies,
    headers: HeaderMap,
) -> Result<impl IntoResponse, MarketError>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    if let Some(session) = get_session(&cookies, &headers, state.session_store.as_ref()) {
        state.session_store.delete(&session.id)?;
    }

    clear_session_cookie(&cookies);

    Ok(ok_with_message("Logged out", ()))
}

/// GET /api/auth/me
pub async fn me<M, S, E>(
    State(state): State<Arc<AppState<M, S, E>>>,
    cookies: Cookies,
    headers: HeaderMap,
) -> Result<impl IntoResponse, MarketError>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    let user_id = require_user(&cookies, &headers, state.session_store.as_ref())?;
    let user = state
        .store
        .get_user(user_id)?
        .ok_or(MarketError::NotAuthenticated)?;

    Ok(ok(AccountView::from(user)))
}
