use crate::config::types::NodeConfig;
use crate::replication::dispatcher::ReplicationDispatcher;
use crate::replication::protocol::ReplicateRequest;
use crate::store::memory::VersionedStore;

use std::sync::Arc;

/// Result of coordinating one client write.
#[derive(Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Quorum met; the write is durable on at least `acks` followers.
    Committed { version: u64, acks: usize },
    /// Quorum missed. The leader keeps its local apply; the higher version
    /// reaches lagging followers only when a later write supersedes it.
    QuorumMiss { acks: usize, quorum: usize },
}

/// Result of coordinating one client delete.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Committed { version: u64, acks: usize },
    QuorumMiss { acks: usize, quorum: usize },
    /// The key was never written (or already deleted); no version allocated.
    NotFound,
}

/// Orchestrates the leader's write path: local apply, replication fan-out,
/// quorum verdict.
///
/// Concurrent writes serialize only at version allocation inside the store;
/// their replication rounds overlap freely.
pub struct WriteCoordinator {
    store: Arc<VersionedStore>,
    dispatcher: Arc<ReplicationDispatcher>,
    write_quorum: usize,
}

impl WriteCoordinator {
    pub fn new(
        store: Arc<VersionedStore>,
        dispatcher: Arc<ReplicationDispatcher>,
        config: &NodeConfig,
    ) -> Self {
        Self {
            store,
            dispatcher,
            write_quorum: config.write_quorum,
        }
    }

    pub async fn write(&self, key: &str, value: &str) -> WriteOutcome {
        let version = self.store.apply_local_write(key, value);

        let msg = ReplicateRequest {
            key: key.to_string(),
            value: Some(value.to_string()),
            version,
            delete: false,
        };
        let acks = self.dispatcher.dispatch(msg).await;

        if acks >= self.write_quorum {
            WriteOutcome::Committed { version, acks }
        } else {
            tracing::warn!(
                "Write '{}' at version {} missed quorum: {}/{}",
                key,
                version,
                acks,
                self.write_quorum
            );
            WriteOutcome::QuorumMiss {
                acks,
                quorum: self.write_quorum,
            }
        }
    }

    pub async fn delete(&self, key: &str) -> DeleteOutcome {
        let Some(version) = self.store.apply_local_delete(key) else {
            return DeleteOutcome::NotFound;
        };

        let msg = ReplicateRequest {
            key: key.to_string(),
            value: None,
            version,
            delete: true,
        };
        let acks = self.dispatcher.dispatch(msg).await;

        if acks >= self.write_quorum {
            DeleteOutcome::Committed { version, acks }
        } else {
            tracing::warn!(
                "Delete '{}' at version {} missed quorum: {}/{}",
                key,
                version,
                acks,
                self.write_quorum
            );
            DeleteOutcome::QuorumMiss {
                acks,
                quorum: self.write_quorum,
            }
        }
    }
}
