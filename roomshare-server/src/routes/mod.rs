//! HTTP routes for the marketplace

mod auth;
mod extract;
mod health;
mod requests;
mod roommates;
mod rooms;
mod session;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;

use crate::email::EmailSender;
use crate::state::AppState;
use crate::store::{MarketStore, SessionStore};

pub use session::SESSION_COOKIE;

/// Success envelope shared by every endpoint
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: T,
}

pub(crate) fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        message: None,
        data,
    })
}

pub(crate) fn ok_with_message<T: Serialize>(message: &'static str, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        message: Some(message),
        data,
    })
}

/// Create the router with all routes
pub fn create_router<M, S, E>(state: Arc<AppState<M, S, E>>) -> Router
where
    M: MarketStore + 'static,
    S: SessionStore + 'static,
    E: EmailSender + 'static,
{
    Router::new()
        .route("/api/health", get(health::health))
        // Identity
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/verify", post(auth::verify))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        // Rooms
        .route("/api/rooms", get(rooms::search_rooms).post(rooms::create_room))
        .route("/api/rooms/mine", get(rooms::list_owned_rooms))
        .route(
            "/api/rooms/{id}",
            get(rooms::get_room)
                .put(rooms::update_room)
                .delete(rooms::delete_room),
        )
        // Rental requests
        .route("/api/rooms/{id}/request", post(requests::send_request))
        .route("/api/rooms/requests/sent", get(requests::list_sent))
        .route("/api/rooms/requests/received", get(requests::list_received))
        .route("/api/rooms/requests/{id}/accept", post(requests::accept))
        .route("/api/rooms/requests/{id}/reject", post(requests::reject))
        // Roommates
        .route("/api/roommates", get(roommates::search_roommates))
        .route(
            "/api/roommates/profile",
            get(roommates::get_profile).put(roommates::upsert_profile),
        )
        .route(
            "/api/roommates/profile/activate",
            post(roommates::activate_profile),
        )
        .route(
            "/api/roommates/profile/deactivate",
            post(roommates::deactivate_profile),
        )
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
