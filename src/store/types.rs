use serde::{Deserialize, Serialize};

/// A stored value together with the version the leader assigned to it.
///
/// Values are opaque strings; the store never interprets them. The version
/// is what followers compare against when deciding whether an incoming
/// replication message supersedes local state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    pub value: String,
    pub version: u64,
}
