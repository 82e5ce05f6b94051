//! Storage records that live beside the domain documents

use chrono::{DateTime, Utc};
use roomshare_core::UserId;
use serde::{Deserialize, Serialize};

/// Opaque session credential
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// A logged-in user session
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// A one-time code waiting to verify a new account's email
#[derive(Debug, Clone)]
pub struct PendingVerification {
    pub email: String,
    pub code: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a reconciliation pass over accepted requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub scanned: u64,
    pub rooms_repaired: u64,
    pub users_repaired: u64,
}
