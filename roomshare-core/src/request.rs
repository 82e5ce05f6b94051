//! Rental requests and their lifecycle states

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, RequestId, Result, Room, RoomId, RoomSummary, UserId, UserSummary};

/// Longest message a requester may attach
pub const MAX_MESSAGE_LENGTH: usize = 500;

/// `pending → accepted | rejected`; both outcomes are final
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RequestStatus::Pending),
            "accepted" => Some(RequestStatus::Accepted),
            "rejected" => Some(RequestStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Accepted)
                | (RequestStatus::Pending, RequestStatus::Rejected)
        )
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tenant's request to rent a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    pub id: RequestId,
    pub room: RoomId,
    pub requester: UserId,
    /// Snapshot of `room.owner` taken when the request was created
    pub owner: UserId,
    pub message: String,
    pub status: RequestStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl RoomRequest {
    /// A new pending request against `room`
    ///
    /// The owner is always copied from the room; it is never taken from the
    /// caller.
    pub fn pending(room: &Room, requester: UserId, message: Option<&str>) -> Result<Self> {
        let message = message.map(str::trim).unwrap_or_default();
        if message.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(Error::Validation(format!(
                "message cannot exceed {} characters",
                MAX_MESSAGE_LENGTH
            )));
        }
        let now = Utc::now();
        Ok(Self {
            id: RequestId::new(),
            room: room.id,
            requester,
            owner: room.owner,
            message: message.to_string(),
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }
}

/// A request joined with the display data of the documents it references
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    #[serde(flatten)]
    pub request: RoomRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_details: Option<RoomSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester_details: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_details: Option<UserSummary>,
}
