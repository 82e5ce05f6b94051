//! Room listing endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use roomshare_core::{Pagination, Room, RoomDraft, RoomId, RoomSearchParams, RoomUpdate};
use serde::Serialize;
use serde_json::json;
use tower_cookies::Cookies;

use super::extract::{ApiJson, ApiQuery};
use super::ok;
use super::session::require_user;
use crate::email::EmailSender;
use crate::error::MarketError;
use crate::service::{ListingService, RoomService};
use crate::state::AppState;
use crate::store::{MarketStore, SessionStore};

#[derive(Serialize)]
pub struct SearchFilters {
    pub cities: Vec<String>,
}

#[derive(Serialize)]
pub struct RoomSearchResponse {
    pub success: bool,
    pub rooms: Vec<Room>,
    pub pagination: Pagination,
    pub filters: SearchFilters,
}

/// GET /api/rooms
pub async fn search_rooms<M, S, E>(
    State(state): State<Arc<AppState<M, S, E>>>,
    ApiQuery(params): ApiQuery<RoomSearchParams>,
) -> Result<Json<RoomSearchResponse>, MarketError>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    let result = ListingService::new(state.store.as_ref()).search_rooms(&params)?;

    Ok(Json(RoomSearchResponse {
        success: true,
        rooms: result.rooms,
        pagination: result.pagination,
        filters: SearchFilters {
            cities: result.cities,
        },
    }))
}

/// GET /api/rooms/{id}
pub async fn get_room<M, S, E>(
    State(state): State<Arc<AppState<M, S, E>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarketError>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    let room_id: RoomId = id.parse()?;
    let room = RoomService::new(state.store.as_ref()).get_room(room_id)?;
    Ok(ok(room))
}

/// POST /api/rooms
pub async fn create_room<M, S, E>(
    State(state): State<Arc<AppState<M, S, E>>>,
    cookies: Cookies,
    headers: HeaderMap,
    ApiJson(draft): ApiJson<RoomDraft>,
) -> Result<impl IntoResponse, MarketError>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    let actor = require_user(&cookies, &headers, state.session_store.as_ref())?;
    let room = RoomService::new(state.store.as_ref()).create_room(actor, draft)?;
    Ok((StatusCode::CREATED, ok(room)))
}

/// GET /api/rooms/mine
pub async fn list_owned_rooms<M, S, E>(
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
    let rooms = RoomService::new(state.store.as_ref()).list_owned_rooms(actor)?;
    Ok(ok(rooms))
}

/// PUT /api/rooms/{id}
pub async fn update_room<M, S, E>(
    State(state): State<Arc<AppState<M, S, E>>>,
    cookies: Cookies,
    headers: HeaderMap,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<RoomUpdate>,
) -> Result<impl IntoResponse, MarketError>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    let actor = require_user(&cookies, &headers, state.session_store.as_ref())?;
    let room_id: RoomId = id.parse()?;
    let room = RoomService::new(state.store.as_ref()).update_room(actor, room_id, update)?;
    Ok(ok(room))
}

/// DELETE /api/rooms/{id}
pub async fn delete_room<M, S, E>(
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
    let room_id: RoomId = id.parse()?;
    RoomService::new(state.store.as_ref()).delete_room(actor, room_id)?;
    Ok(ok(json!({})))
}
