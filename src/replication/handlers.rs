//! Replication Ingest Handler
//!
//! The follower end of the replication channel. Translates incoming HTTP
//! messages into `VersionedStore::apply_remote` calls.

use axum::{
    Json,
    extract::Extension,
    extract::rejection::JsonRejection,
    http::StatusCode,
};
use std::sync::Arc;

use super::protocol::{ReplicateAck, ReplicateRequest};
use crate::config::types::NodeConfig;
use crate::store::memory::VersionedStore;

/// Internal endpoint: applies one replicated update.
///
/// Followers only; the leader answers 403. Stale and duplicate messages are
/// acknowledged like applied ones — a non-200 for a drop would make the
/// leader miss a quorum it logically has.
pub async fn handle_replicate(
    Extension(config): Extension<Arc<NodeConfig>>,
    Extension(store): Extension<Arc<VersionedStore>>,
    payload: Result<Json<ReplicateRequest>, JsonRejection>,
) -> (StatusCode, Json<ReplicateAck>) {
    if config.role.is_leader() {
        return (StatusCode::FORBIDDEN, Json(ReplicateAck::rejected()));
    }

    let Json(req) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            tracing::error!("Malformed replication message: {}", rejection);
            return (StatusCode::BAD_REQUEST, Json(ReplicateAck::rejected()));
        }
    };

    let applied = store.apply_remote(&req);
    if applied {
        tracing::debug!(
            "Applied replication for '{}' at version {} (delete={})",
            req.key,
            req.version,
            req.delete
        );
    }

    (StatusCode::OK, Json(ReplicateAck::replicated()))
}
