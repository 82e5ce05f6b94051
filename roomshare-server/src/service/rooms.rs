//! Room listing management

use roomshare_core::{Role, Room, RoomDraft, RoomId, RoomUpdate, UserId, UserSummary};
use serde::Serialize;

use crate::error::MarketError;
use crate::store::MarketStore;

/// A room as shown on its detail page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetails {
    #[serde(flatten)]
    pub room: Room,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_details: Option<UserSummary>,
}

pub struct RoomService<'a, M: MarketStore> {
    store: &'a M,
}

impl<'a, M: MarketStore> RoomService<'a, M> {
    pub fn new(store: &'a M) -> Self {
        Self { store }
    }

    /// List a new vacant room owned by `actor`
    pub fn create_room(&self, actor: UserId, draft: RoomDraft) -> Result<Room, MarketError> {
        let user = self
            .store
            .get_user(actor)?
            .ok_or(MarketError::NotFound("User"))?;

        if !user.is_verified {
            return Err(MarketError::Forbidden(
                "Please verify your account first".to_string(),
            ));
        }
        if user.role != Role::Owner {
            return Err(MarketError::Forbidden(
                "Only owners can list rooms".to_string(),
            ));
        }

        let room = draft.into_room(actor)?;
        self.store.insert_room(&room)?;
        self.store.add_listed_room(actor, room.id)?;

        tracing::info!(room_id = %room.id, owner = %actor, "Room listed");

        Ok(room)
    }

    pub fn get_room(&self, room_id: RoomId) -> Result<RoomDetails, MarketError> {
        let room = self
            .store
            .get_room(room_id)?
            .ok_or(MarketError::NotFound("Room"))?;
        let owner_details = self.store.get_user(room.owner)?.map(|u| u.summary());
        Ok(RoomDetails {
            room,
            owner_details,
        })
    }

    /// Apply a partial update; only the owner may edit
    pub fn update_room(
        &self,
        actor: UserId,
        room_id: RoomId,
        update: RoomUpdate,
    ) -> Result<Room, MarketError> {
        self.owned_room(actor, room_id)?;
        let room = self.store.update_room(room_id, update)?;

        tracing::info!(room_id = %room_id, "Room updated");

        Ok(room)
    }

    /// Remove a listing and drop it from the owner's `listedRooms`
    ///
    /// Requests that reference the room are kept as history.
    pub fn delete_room(&self, actor: UserId, room_id: RoomId) -> Result<(), MarketError> {
        let room = self.owned_room(actor, room_id)?;
        if !self.store.delete_room(room.id)? {
            return Err(MarketError::NotFound("Room"));
        }
        self.store.remove_listed_room(room.owner, room.id)?;

        tracing::info!(room_id = %room_id, "Room deleted");

        Ok(())
    }

    pub fn list_owned_rooms(&self, actor: UserId) -> Result<Vec<Room>, MarketError> {
        self.store.rooms_by_owner(actor)
    }

    fn owned_room(&self, actor: UserId, room_id: RoomId) -> Result<Room, MarketError> {
        let room = self
            .store
            .get_room(room_id)?
            .ok_or(MarketError::NotFound("Room"))?;
        if room.owner != actor {
            return Err(MarketError::Forbidden(
                "Not authorized to modify this room".to_string(),
            ));
        }
        Ok(room)
    }
}
