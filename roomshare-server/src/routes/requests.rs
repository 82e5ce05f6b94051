//! Rental request endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use roomshare_core::{RequestId, RoomId};
use serde::Deserialize;
use tower_cookies::Cookies;

use super::extract::OptionalJson;
use super::ok;
use super::session::require_user;
use crate::email::EmailSender;
use crate::error::MarketError;
use crate::service::RequestService;
use crate::state::AppState;
use crate::store::{MarketStore, SessionStore};

#[derive(Default, Deserialize)]
pub struct SendRequestBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// POST /api/rooms/{id}/request
pub async fn send_request<M, S, E>(
    State(state): State<Arc<AppState<M, S, E>>>,
    cookies: Cookies,
    headers: HeaderMap,
    Path(id): Path<String>,
    OptionalJson(body): OptionalJson<SendRequestBody>,
) -> Result<impl IntoResponse, MarketError>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    let requester = require_user(&cookies, &headers, state.session_store.as_ref())?;
    let room_id: RoomId = id.parse()?;
    let view = RequestService::new(state.store.as_ref()).create_request(
        room_id,
        requester,
        body.message.as_deref(),
    )?;
    Ok((StatusCode::CREATED, ok(view)))
}

/// GET /api/rooms/requests/sent
pub async fn list_sent<M, S, E>(
    State(state): State<Arc<AppState<M, S, E>>>,
    cookies: Cookies,
    headers: HeaderMap,
) -> Result<impl IntoResponse, MarketError>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    let requester = require_user(&cookies, &headers, state.session_store.as_ref())?;
    let views = RequestService::new(state.store.as_ref()).list_sent_requests(requester)?;
    Ok(ok(views))
}

/// GET /api/rooms/requests/received
pub async fn list_received<M, S, E>(
    State(state): State<Arc<AppState<M, S, E>>>,
    cookies: Cookies,
    headers: HeaderMap,
) -> Result<impl IntoResponse, MarketError>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    let owner = require_user(&cookies, &headers, state.session_store.as_ref())?;
    let views = RequestService::new(state.store.as_ref()).list_received_requests(owner)?;
    Ok(ok(views))
}

/// POST /api/rooms/requests/{id}/accept
pub async fn accept<M, S, E>(
    State(state): State<Arc<AppState<M, S, E>>>,
    cookies: Cookies,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarketError>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    let actor = require_user(&cookies, &headers, state.session_store.as_ref())?;
    let request_id: RequestId = id.parse()?;
    let view = RequestService::new(state.store.as_ref()).accept_request(request_id, actor)?;
    Ok(ok(view))
}

/// POST /api/rooms/requests/{id}/reject
pub async fn reject<M, S, E>(
    State(state): State<Arc<AppState<M, S, E>>>,
    cookies: Cookies,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarketError>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    let actor = require_user(&cookies, &headers, state.session_store.as_ref())?;
    let request_id: RequestId = id.parse()?;
    let view = RequestService::new(state.store.as_ref()).reject_request(request_id, actor)?;
    Ok(ok(view))
}
