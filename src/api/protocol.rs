//! Client API Protocol
//!
//! Endpoints and Data Transfer Objects of the client-facing HTTP surface.

use serde::{Deserialize, Serialize};

use crate::config::types::NodeRole;

/// Public endpoint for client writes. Leader only.
pub const ENDPOINT_WRITE: &str = "/write";
/// Public endpoint for client reads (`/read/:key`). Any node.
pub const ENDPOINT_READ: &str = "/read";
/// Public endpoint for client deletes (`/delete/:key`). Leader only.
pub const ENDPOINT_DELETE: &str = "/delete";
/// Liveness probe. Any node.
pub const ENDPOINT_HEALTH: &str = "/health";

/// Client request for writing a key-value pair.
#[derive(Debug, Serialize, Deserialize)]
pub struct WriteRequest {
    pub key: String,
    pub value: String,
}

/// Outcome of a write or delete, as reported to the client.
///
/// Success carries the assigned version and how many followers acknowledged
/// before the response; a quorum miss carries the shortfall instead.
#[derive(Debug, Serialize, Deserialize)]
pub struct WriteResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    /// Follower acknowledgements collected when the quorum was met.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quorum_reached: Option<usize>,
    /// Follower acknowledgements collected when the quorum was missed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acks: Option<usize>,
    /// The quorum that was required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quorum: Option<usize>,
}

impl WriteResponse {
    pub fn committed(
        message: &str,
        key: String,
        value: Option<String>,
        version: u64,
        acks: usize,
    ) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            key: Some(key),
            value,
            version: Some(version),
            quorum_reached: Some(acks),
            acks: None,
            quorum: None,
        }
    }

    pub fn quorum_miss(acks: usize, quorum: usize) -> Self {
        Self {
            success: false,
            message: Some(format!(
                "Replication quorum not reached ({}/{})",
                acks, quorum
            )),
            key: None,
            value: None,
            version: None,
            quorum_reached: None,
            acks: Some(acks),
            quorum: Some(quorum),
        }
    }

    pub fn rejected(message: &str) -> Self {
        Self {
            success: false,
            message: Some(message.to_string()),
            key: None,
            value: None,
            version: None,
            quorum_reached: None,
            acks: None,
            quorum: None,
        }
    }
}

/// Response for client reads. Reads always succeed; absent keys answer
/// `found: false` with a null value.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadResponse {
    pub key: String,
    pub value: Option<String>,
    pub version: Option<u64>,
    pub found: bool,
}

/// Liveness probe response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_type: NodeRole,
}

/// Service metadata served on `/`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfoResponse {
    pub service: String,
    pub node_type: NodeRole,
    pub quorum: usize,
    pub followers: Vec<String>,
    pub storage_size: usize,
    pub current_version: u64,
    pub routes: Vec<String>,
    pub cpu_usage: f32,
    pub mem_used_mb: u64,
    pub mem_total_mb: u64,
}
