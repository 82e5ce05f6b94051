//! Roomshare Core Library
//!
//! Domain model and search logic for the room-rental marketplace:
//! - Users list rooms and keep an optional roommate profile
//! - Tenants send rental requests that owners accept or reject
//! - Search parameters compile into structured document queries

pub mod error;
pub mod ids;
pub mod pagination;
mod params;
pub mod query;
pub mod request;
pub mod room;
pub mod room_filter;
pub mod roommate_filter;
pub mod user;

pub use error::Error;
pub use ids::{RequestId, RoomId, UserId};
pub use pagination::{PageRequest, Pagination};
pub use query::{Direction, Filter, Query, Sort};
pub use request::{RequestStatus, RequestView, RoomRequest};
pub use room::{normalize_amenities, Room, RoomDraft, RoomSummary, RoomUpdate};
pub use room_filter::{compile_room_query, RoomSearchParams};
pub use roommate_filter::{compile_roommate_query, RoommateSearchParams};
pub use user::{Role, RoommateProfile, RoommateProfileDraft, User, UserSummary};

/// Result type for roomshare-core operations
pub type Result<T> = std::result::Result<T, Error>;
