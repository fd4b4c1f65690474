//! Replication Wire Protocol
//!
//! Defines the endpoint and Data Transfer Objects used on the
//! leader-to-follower replication channel.
//!
//! These structures are serialized as JSON and sent over HTTP; the version
//! carried in each message is what followers use to order applies.

use serde::{Deserialize, Serialize};

/// Endpoint for pushing one write (or delete) from the leader to a follower.
pub const ENDPOINT_REPLICATE: &str = "/replicate";

/// Body of an acknowledgement for an accepted replication message.
pub const ACK_REPLICATED: &str = "replicated";
/// Body returned when the endpoint is hit on the wrong role.
pub const ACK_REJECTED: &str = "rejected";

/// One replicated update, sent by the leader after its local apply.
///
/// Messages are idempotent: the follower accepts a message whose version is
/// at least its stored version for the key, so redelivery cannot regress
/// state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicateRequest {
    /// The data key.
    pub key: String,
    /// The new value. `None` when `delete` is set.
    #[serde(default)]
    pub value: Option<String>,
    /// Version the leader assigned to this update.
    pub version: u64,
    /// Marks the update as a removal.
    #[serde(default)]
    pub delete: bool,
}

/// Follower's answer on the replication channel.
///
/// A follower answers `replicated` whether the message was applied or
/// dropped as stale; only transport errors and role violations count as
/// missed acknowledgements on the leader side.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReplicateAck {
    pub status: String,
}

impl ReplicateAck {
    pub fn replicated() -> Self {
        Self {
            status: ACK_REPLICATED.to_string(),
        }
    }

    pub fn rejected() -> Self {
        Self {
            status: ACK_REJECTED.to_string(),
        }
    }
}
