//! Rental request lifecycle
//!
//! Acceptance touches three documents without a cross-document
//! transaction. The request status is flipped first (compare-and-set), then
//! the room is occupied with a compare-and-set on vacancy: when another
//! request for the same room got there first, this one goes back to pending.
//! Any other failure after the flip leaves the room or requester behind;
//! [`RequestService::reconcile_accepted_requests`] repairs those.

use roomshare_core::{
    RequestId, RequestStatus, RequestView, RoomId, RoomRequest, RoomSummary, UserId, UserSummary,
};

use crate::error::MarketError;
use crate::store::{MarketStore, ReconcileReport, StoreResult};

const ALREADY_PROCESSED: &str = "Request has already been processed";
const ROOM_TAKEN: &str = "Room is no longer available";

pub struct RequestService<'a, M: MarketStore> {
    store: &'a M,
}

impl<'a, M: MarketStore> RequestService<'a, M> {
    pub fn new(store: &'a M) -> Self {
        Self { store }
    }

    /// Send a rental request for a vacant room
    pub fn create_request(
        &self,
        room_id: RoomId,
        requester: UserId,
        message: Option<&str>,
    ) -> Result<RequestView, MarketError> {
        let room = self
            .store
            .get_room(room_id)?
            .ok_or(MarketError::NotFound("Room"))?;

        if !room.is_vacant {
            tracing::debug!(room_id = %room_id, requester = %requester, "Request for occupied room");
            return Err(MarketError::InvalidState(
                "Room is not available".to_string(),
            ));
        }
        if room.owner == requester {
            return Err(MarketError::InvalidOperation(
                "You cannot request your own room".to_string(),
            ));
        }
        if self
            .store
            .find_pending_request(room_id, requester)?
            .is_some()
        {
            tracing::debug!(room_id = %room_id, requester = %requester, "Duplicate pending request");
            return Err(MarketError::Conflict(
                "You already have a pending request for this room".to_string(),
            ));
        }

        let request = RoomRequest::pending(&room, requester, message)?;
        self.store.insert_request(&request)?;

        tracing::info!(
            request_id = %request.id,
            room_id = %room_id,
            requester = %requester,
            "Room request created"
        );

        Ok(RequestView {
            room_details: Some(room.summary()),
            requester_details: self.user_summary(request.requester)?,
            owner_details: self.user_summary(request.owner)?,
            request,
        })
    }

    /// Accept a pending request, occupying the room
    pub fn accept_request(
        &self,
        request_id: RequestId,
        actor: UserId,
    ) -> Result<RequestView, MarketError> {
        let request = self.pending_request_for(request_id, actor)?;

        let room = self
            .store
            .get_room(request.room)?
            .filter(|room| room.is_vacant)
            .ok_or_else(|| {
                tracing::debug!(request_id = %request_id, room_id = %request.room, "Room no longer vacant");
                MarketError::InvalidState(ROOM_TAKEN.to_string())
            })?;

        if !self.store.update_request_status(
            request_id,
            RequestStatus::Pending,
            RequestStatus::Accepted,
        )? {
            tracing::debug!(request_id = %request_id, "Lost race to process request");
            return Err(MarketError::InvalidState(ALREADY_PROCESSED.to_string()));
        }

        let occupied = self
            .store
            .occupy_room(room.id, request.requester)
            .map_err(|e| inconsistent(&request, "occupying room", e))?;
        if !occupied {
            // Another request for the room was accepted first; hand this one back
            self.store
                .update_request_status(request_id, RequestStatus::Accepted, RequestStatus::Pending)
                .map_err(|e| inconsistent(&request, "returning request to pending", e))?;
            tracing::debug!(request_id = %request_id, room_id = %room.id, "Lost race to occupy room");
            return Err(MarketError::InvalidState(ROOM_TAKEN.to_string()));
        }
        self.store
            .add_rented_room(request.requester, room.id)
            .map_err(|e| inconsistent(&request, "recording rented room", e))?;

        tracing::info!(
            request_id = %request_id,
            room_id = %room.id,
            requester = %request.requester,
            "Room request accepted"
        );

        self.view_for_owner(request_id)
    }

    /// Reject a pending request
    pub fn reject_request(
        &self,
        request_id: RequestId,
        actor: UserId,
    ) -> Result<RequestView, MarketError> {
        self.pending_request_for(request_id, actor)?;

        if !self.store.update_request_status(
            request_id,
            RequestStatus::Pending,
            RequestStatus::Rejected,
        )? {
            tracing::debug!(request_id = %request_id, "Lost race to process request");
            return Err(MarketError::InvalidState(ALREADY_PROCESSED.to_string()));
        }

        tracing::info!(request_id = %request_id, "Room request rejected");

        self.view_for_owner(request_id)
    }

    /// Every request the user has sent, newest first
    pub fn list_sent_requests(&self, requester: UserId) -> Result<Vec<RequestView>, MarketError> {
        self.store
            .requests_by_requester(requester)?
            .into_iter()
            .map(|request| {
                Ok(RequestView {
                    room_details: self.room_summary(request.room)?,
                    requester_details: None,
                    owner_details: self.user_summary(request.owner)?,
                    request,
                })
            })
            .collect()
    }

    /// Pending requests addressed to the owner, newest first
    pub fn list_received_requests(&self, owner: UserId) -> Result<Vec<RequestView>, MarketError> {
        self.store
            .requests_for_owner(owner, Some(RequestStatus::Pending))?
            .into_iter()
            .map(|request| {
                Ok(RequestView {
                    room_details: self.room_summary(request.room)?,
                    requester_details: self.user_summary(request.requester)?,
                    owner_details: None,
                    request,
                })
            })
            .collect()
    }

    /// Re-apply missing side effects of accepted requests
    ///
    /// Safe to run any number of times.
    pub fn reconcile_accepted_requests(&self) -> StoreResult<ReconcileReport> {
        let mut report = ReconcileReport::default();

        for request in self.store.requests_with_status(RequestStatus::Accepted)? {
            report.scanned += 1;

            let Some(room) = self.store.get_room(request.room)? else {
                tracing::warn!(request_id = %request.id, room_id = %request.room, "Accepted request references a deleted room");
                continue;
            };

            if room.is_vacant || !room.current_roommates.contains(&request.requester) {
                if self.store.occupy_room(room.id, request.requester)? {
                    tracing::warn!(request_id = %request.id, room_id = %room.id, "Repaired room occupancy");
                    report.rooms_repaired += 1;
                } else {
                    tracing::error!(
                        request_id = %request.id,
                        room_id = %room.id,
                        "Accepted request's room is held by another tenant, manual reconciliation required"
                    );
                }
            }

            if let Some(user) = self.store.get_user(request.requester)? {
                if !user.rented_rooms.contains(&room.id) {
                    tracing::warn!(request_id = %request.id, user_id = %user.id, "Repairing rented rooms");
                    self.store.add_rented_room(user.id, room.id)?;
                    report.users_repaired += 1;
                }
            }
        }

        Ok(report)
    }

    /// Load a request the actor may decide on
    fn pending_request_for(
        &self,
        request_id: RequestId,
        actor: UserId,
    ) -> Result<RoomRequest, MarketError> {
        let request = self
            .store
            .get_request(request_id)?
            .ok_or(MarketError::NotFound("Request"))?;

        if request.owner != actor {
            return Err(MarketError::Forbidden(
                "Not authorized to manage this request".to_string(),
            ));
        }
        if request.status != RequestStatus::Pending {
            tracing::debug!(request_id = %request_id, status = %request.status, "Request already processed");
            return Err(MarketError::InvalidState(ALREADY_PROCESSED.to_string()));
        }

        Ok(request)
    }

    fn view_for_owner(&self, request_id: RequestId) -> Result<RequestView, MarketError> {
        let request = self
            .store
            .get_request(request_id)?
            .ok_or(MarketError::NotFound("Request"))?;
        Ok(RequestView {
            room_details: self.room_summary(request.room)?,
            requester_details: self.user_summary(request.requester)?,
            owner_details: None,
            request,
        })
    }

    fn room_summary(&self, room_id: RoomId) -> StoreResult<Option<RoomSummary>> {
        Ok(self.store.get_room(room_id)?.map(|room| room.summary()))
    }

    fn user_summary(&self, user_id: UserId) -> StoreResult<Option<UserSummary>> {
        Ok(self.store.get_user(user_id)?.map(|user| user.summary()))
    }
}

fn inconsistent(request: &RoomRequest, step: &str, cause: MarketError) -> MarketError {
    tracing::error!(
        request_id = %request.id,
        room_id = %request.room,
        requester = %request.requester,
        step,
        error = %cause,
        "Request accepted but side effects failed, manual reconciliation required"
    );
    MarketError::Inconsistent(format!(
        "request {} accepted but {} failed: {}",
        request.id, step, cause
    ))
}
