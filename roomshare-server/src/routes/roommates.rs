//! Roommate search and profile endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use roomshare_core::{RoommateProfileDraft, RoommateSearchParams};
use tower_cookies::Cookies;

use super::extract::{ApiJson, ApiQuery};
use super::ok;
use super::session::require_user;
use crate::email::EmailSender;
use crate::error::MarketError;
use crate::service::{ListingService, ProfileService};
use crate::state::AppState;
use crate::store::{MarketStore, SessionStore};

/// GET /api/roommates
pub async fn search_roommates<M, S, E>(
    State(state): State<Arc<AppState<M, S, E>>>,
    ApiQuery(params): ApiQuery<RoommateSearchParams>,
) -> Result<impl IntoResponse, MarketError>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    let result = ListingService::new(state.store.as_ref()).search_roommates(&params)?;
    Ok(ok(result))
}

/// GET /api/roommates/profile
pub async fn get_profile<M, S, E>(
    State(state): State<Arc<AppState<M, S, E>>>,
    cookies: Cookies,
    headers: HeaderMap,
) -> Result<impl IntoResponse, MarketError>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    let actor = require_user(&cookies, &headers, state.session_store.as_ref())?;
    let profile = ProfileService::new(state.store.as_ref()).get_profile(actor)?;
    Ok(ok(profile))
}

/// PUT /api/roommates/profile
pub async fn upsert_profile<M, S, E>(
    State(state): State<Arc<AppState<M, S, E>>>,
    cookies: Cookies,
    headers: HeaderMap,
    ApiJson(draft): ApiJson<RoommateProfileDraft>,
) -> Result<impl IntoResponse, MarketError>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    let actor = require_user(&cookies, &headers, state.session_store.as_ref())?;
    let profile = ProfileService::new(state.store.as_ref()).upsert_profile(actor, draft)?;
    Ok(ok(profile))
}

/// POST /api/roommates/profile/activate
pub async fn activate_profile<M, S, E>(
    State(state): State<Arc<AppState<M, S, E>>>,
    cookies: Cookies,
    headers: HeaderMap,
) -> Result<impl IntoResponse, MarketError>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    let actor = require_user(&cookies, &headers, state.session_store.as_ref())?;
    let profile = ProfileService::new(state.store.as_ref()).set_active(actor, true)?;
    Ok(ok(profile))
}

/// POST /api/roommates/profile/deactivate
pub async fn deactivate_profile<M, S, E>(
    State(state): State<Arc<AppState<M, S, E>>>,
    cookies: Cookies,
    headers: HeaderMap,
) -> Result<impl IntoResponse, MarketError>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    let actor = require_user(&cookies, &headers, state.session_store.as_ref())?;
    let profile = ProfileService::new(state.store.as_ref()).set_active(actor, false)?;
    Ok(ok(profile))
}
