//! Storage abstractions for the marketplace
//!
//! The store behaves like a document database: each method is atomic for
//! the one document it touches, and nothing spans documents. Callers that
//! update several documents order their writes themselves.

pub mod memory;
pub mod models;
pub mod sqlite;

use std::sync::Arc;

pub use memory::{InMemoryMarketStore, InMemorySessionStore};
pub use models::*;
pub use sqlite::SqliteStore;

use roomshare_core::{
    Filter, Query, RequestId, RequestStatus, Room, RoomId, RoomRequest, RoomUpdate,
    RoommateProfile, User, UserId,
};

use crate::error::MarketError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, MarketError>;

/// Users collection plus pending email verifications
pub trait UserStore: Send + Sync {
    /// Insert a new user; email and aadhar number must be unused
    fn create_user(&self, user: &User) -> StoreResult<()>;

    fn get_user(&self, user_id: UserId) -> StoreResult<Option<User>>;

    /// Look a user up by email, ignoring case
    fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    fn set_verified(&self, user_id: UserId) -> StoreResult<()>;

    /// Replace (or clear) the embedded roommate profile
    fn set_roommate_profile(
        &self,
        user_id: UserId,
        profile: Option<RoommateProfile>,
    ) -> StoreResult<()>;

    /// Add a room to `listedRooms` unless already present
    fn add_listed_room(&self, user_id: UserId, room_id: RoomId) -> StoreResult<()>;

    fn remove_listed_room(&self, user_id: UserId, room_id: RoomId) -> StoreResult<()>;

    /// Add a room to `rentedRooms` unless already present
    fn add_rented_room(&self, user_id: UserId, room_id: RoomId) -> StoreResult<()>;

    /// Run a compiled query (filter, sort, page) over users
    fn find_users(&self, query: &Query) -> StoreResult<Vec<User>>;

    fn count_users(&self, filter: &Filter) -> StoreResult<u64>;

    /// Store a verification code, replacing any earlier one for the email
    fn create_pending(&self, pending: PendingVerification) -> StoreResult<()>;

    fn get_pending(&self, email: &str) -> StoreResult<Option<PendingVerification>>;

    fn delete_pending(&self, email: &str) -> StoreResult<()>;

    /// Drop verification codes older than `max_age_minutes`; returns how many
    fn cleanup_expired_pending(&self, max_age_minutes: i64) -> StoreResult<u64>;
}

/// Rooms collection
pub trait RoomStore: Send + Sync {
    fn insert_room(&self, room: &Room) -> StoreResult<()>;

    fn get_room(&self, room_id: RoomId) -> StoreResult<Option<Room>>;

    /// Apply a partial update to the stored document and return the result
    ///
    /// Vacancy and roommates are left as stored. Nothing is written when the
    /// updated room fails validation.
    fn update_room(&self, room_id: RoomId, update: RoomUpdate) -> StoreResult<Room>;

    /// Returns whether a room was removed
    fn delete_room(&self, room_id: RoomId) -> StoreResult<bool>;

    /// Compare-and-set occupancy
    ///
    /// Takes the room for `roommate` when it is vacant or already theirs and
    /// returns false when another tenant holds it.
    fn occupy_room(&self, room_id: RoomId, roommate: UserId) -> StoreResult<bool>;

    /// Run a compiled query (filter, sort, page) over rooms
    fn find_rooms(&self, query: &Query) -> StoreResult<Vec<Room>>;

    fn count_rooms(&self, filter: &Filter) -> StoreResult<u64>;

    /// Distinct `address.city` values among matching rooms, sorted
    fn distinct_cities(&self, filter: &Filter) -> StoreResult<Vec<String>>;

    fn rooms_by_owner(&self, owner: UserId) -> StoreResult<Vec<Room>>;
}

/// RoomRequests collection
pub trait RequestStore: Send + Sync {
    /// Insert a request
    ///
    /// Fails with `Conflict` when the same requester already has a pending
    /// request for the same room; a concurrent duplicate insert must fail
    /// rather than overwrite.
    fn insert_request(&self, request: &RoomRequest) -> StoreResult<()>;

    fn get_request(&self, request_id: RequestId) -> StoreResult<Option<RoomRequest>>;

    fn find_pending_request(
        &self,
        room_id: RoomId,
        requester: UserId,
    ) -> StoreResult<Option<RoomRequest>>;

    /// Compare-and-set the status; returns false when the stored status was
    /// not `from`
    fn update_request_status(
        &self,
        request_id: RequestId,
        from: RequestStatus,
        to: RequestStatus,
    ) -> StoreResult<bool>;

    /// Requests sent by a user, newest first
    fn requests_by_requester(&self, requester: UserId) -> StoreResult<Vec<RoomRequest>>;

    /// Requests addressed to an owner, newest first, optionally by status
    fn requests_for_owner(
        &self,
        owner: UserId,
        status: Option<RequestStatus>,
    ) -> StoreResult<Vec<RoomRequest>>;

    fn requests_with_status(&self, status: RequestStatus) -> StoreResult<Vec<RoomRequest>>;
}

/// Everything the marketplace services need from persistence
pub trait MarketStore: UserStore + RoomStore + RequestStore {}

impl<T: UserStore + RoomStore + RequestStore> MarketStore for T {}

/// Trait for session storage
pub trait SessionStore: Send + Sync {
    /// Create a new session for a user
    fn create(&self, user_id: UserId) -> StoreResult<Session>;

    /// Get a session by ID
    fn get(&self, session_id: &SessionId) -> StoreResult<Option<Session>>;

    /// Delete a session
    fn delete(&self, session_id: &SessionId) -> StoreResult<()>;
}

// Shared handles, so one SqliteStore can back every trait at once

impl<T: UserStore + ?Sized> UserStore for Arc<T> {
    fn create_user(&self, user: &User) -> StoreResult<()> {
        (**self).create_user(user)
    }

    fn get_user(&self, user_id: UserId) -> StoreResult<Option<User>> {
        (**self).get_user(user_id)
    }

    fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        (**self).get_user_by_email(email)
    }

    fn set_verified(&self, user_id: UserId) -> StoreResult<()> {
        (**self).set_verified(user_id)
    }

    fn set_roommate_profile(
        &self,
        user_id: UserId,
        profile: Option<RoommateProfile>,
    ) -> StoreResult<()> {
        (**self).set_roommate_profile(user_id, profile)
    }

    fn add_listed_room(&self, user_id: UserId, room_id: RoomId) -> StoreResult<()> {
        (**self).add_listed_room(user_id, room_id)
    }

    fn remove_listed_room(&self, user_id: UserId, room_id: RoomId) -> StoreResult<()> {
        (**self).remove_listed_room(user_id, room_id)
    }

    fn add_rented_room(&self, user_id: UserId, room_id: RoomId) -> StoreResult<()> {
        (**self).add_rented_room(user_id, room_id)
    }

    fn find_users(&self, query: &Query) -> StoreResult<Vec<User>> {
        (**self).find_users(query)
    }

    fn count_users(&self, filter: &Filter) -> StoreResult<u64> {
        (**self).count_users(filter)
    }

    fn create_pending(&self, pending: PendingVerification) -> StoreResult<()> {
        (**self).create_pending(pending)
    }

    fn get_pending(&self, email: &str) -> StoreResult<Option<PendingVerification>> {
        (**self).get_pending(email)
    }

    fn delete_pending(&self, email: &str) -> StoreResult<()> {
        (**self).delete_pending(email)
    }

    fn cleanup_expired_pending(&self, max_age_minutes: i64) -> StoreResult<u64> {
        (**self).cleanup_expired_pending(max_age_minutes)
    }
}

impl<T: RoomStore + ?Sized> RoomStore for Arc<T> {
    fn insert_room(&self, room: &Room) -> StoreResult<()> {
        (**self).insert_room(room)
    }

    fn get_room(&self, room_id: RoomId) -> StoreResult<Option<Room>> {
        (**self).get_room(room_id)
    }

    fn update_room(&self, room_id: RoomId, update: RoomUpdate) -> StoreResult<Room> {
        (**self).update_room(room_id, update)
    }

    fn delete_room(&self, room_id: RoomId) -> StoreResult<bool> {
        (**self).delete_room(room_id)
    }

    fn occupy_room(&self, room_id: RoomId, roommate: UserId) -> StoreResult<bool> {
        (**self).occupy_room(room_id, roommate)
    }

    fn find_rooms(&self, query: &Query) -> StoreResult<Vec<Room>> {
        (**self).find_rooms(query)
    }

    fn count_rooms(&self, filter: &Filter) -> StoreResult<u64> {
        (**self).count_rooms(filter)
    }

    fn distinct_cities(&self, filter: &Filter) -> StoreResult<Vec<String>> {
        (**self).distinct_cities(filter)
    }

    fn rooms_by_owner(&self, owner: UserId) -> StoreResult<Vec<Room>> {
        (**self).rooms_by_owner(owner)
    }
}

impl<T: RequestStore + ?Sized> RequestStore for Arc<T> {
    fn insert_request(&self, request: &RoomRequest) -> StoreResult<()> {
        (**self).insert_request(request)
    }

    fn get_request(&self, request_id: RequestId) -> StoreResult<Option<RoomRequest>> {
        (**self).get_request(request_id)
    }

    fn find_pending_request(
        &self,
        room_id: RoomId,
        requester: UserId,
    ) -> StoreResult<Option<RoomRequest>> {
        (**self).find_pending_request(room_id, requester)
    }

    fn update_request_status(
        &self,
        request_id: RequestId,
        from: RequestStatus,
        to: RequestStatus,
    ) -> StoreResult<bool> {
        (**self).update_request_status(request_id, from, to)
    }

    fn requests_by_requester(&self, requester: UserId) -> StoreResult<Vec<RoomRequest>> {
        (**self).requests_by_requester(requester)
    }

    fn requests_for_owner(
        &self,
        owner: UserId,
        status: Option<RequestStatus>,
    ) -> StoreResult<Vec<RoomRequest>> {
        (**self).requests_for_owner(owner, status)
    }

    fn requests_with_status(&self, status: RequestStatus) -> StoreResult<Vec<RoomRequest>> {
        (**self).requests_with_status(status)
    }
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn create(&self, user_id: UserId) -> StoreResult<Session> {
        (**self).create(user_id)
    }

    fn get(&self, session_id: &SessionId) -> StoreResult<Option<Session>> {
        (**self).get(session_id)
    }

    fn delete(&self, session_id: &SessionId) -> StoreResult<()> {
        (**self).delete(session_id)
    }
}
