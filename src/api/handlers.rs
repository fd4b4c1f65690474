//! Client API Handlers
//!
//! HTTP endpoints that expose the store and the write coordinator to
//! clients. Writes and deletes are admitted on the leader only; reads,
//! health, and metadata are served by every node.

use axum::{
    Json,
    extract::{Extension, Path},
    extract::rejection::JsonRejection,
    http::StatusCode,
};
use std::sync::Arc;
use sysinfo::System;

use super::coordinator::{DeleteOutcome, WriteCoordinator, WriteOutcome};
use super::protocol::{
    ENDPOINT_DELETE, ENDPOINT_HEALTH, ENDPOINT_READ, ENDPOINT_WRITE, HealthResponse, ReadResponse,
    ServiceInfoResponse, WriteRequest, WriteResponse,
};
use crate::config::types::NodeConfig;
use crate::replication::protocol::ENDPOINT_REPLICATE;
use crate::store::memory::VersionedStore;

/// Public write handler. Leader only.
///
/// Applies locally, replicates to all followers, and reports success only
/// when the write quorum acknowledged.
pub async fn handle_write(
    Extension(config): Extension<Arc<NodeConfig>>,
    Extension(coordinator): Extension<Arc<WriteCoordinator>>,
    payload: Result<Json<WriteRequest>, JsonRejection>,
) -> (StatusCode, Json<WriteResponse>) {
    if !config.role.is_leader() {
        return (
            StatusCode::FORBIDDEN,
            Json(WriteResponse::rejected(
                "Write operations allowed on leader only",
            )),
        );
    }

    let Json(req) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            tracing::error!("Malformed write request: {}", rejection);
            return (
                StatusCode::BAD_REQUEST,
                Json(WriteResponse::rejected("Invalid request body")),
            );
        }
    };

    match coordinator.write(&req.key, &req.value).await {
        WriteOutcome::Committed { version, acks } => (
            StatusCode::OK,
            Json(WriteResponse::committed(
                "Write successful",
                req.key,
                Some(req.value),
                version,
                acks,
            )),
        ),
        WriteOutcome::QuorumMiss { acks, quorum } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(WriteResponse::quorum_miss(acks, quorum)),
        ),
    }
}

/// Public delete handler. Leader only.
pub async fn handle_delete(
    Extension(config): Extension<Arc<NodeConfig>>,
    Extension(coordinator): Extension<Arc<WriteCoordinator>>,
    Path(key): Path<String>,
) -> (StatusCode, Json<WriteResponse>) {
    if !config.role.is_leader() {
        return (
            StatusCode::FORBIDDEN,
            Json(WriteResponse::rejected(
                "Delete operations allowed on leader only",
            )),
        );
    }

    match coordinator.delete(&key).await {
        DeleteOutcome::Committed { version, acks } => (
            StatusCode::OK,
            Json(WriteResponse::committed(
                "Delete successful",
                key,
                None,
                version,
                acks,
            )),
        ),
        DeleteOutcome::QuorumMiss { acks, quorum } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(WriteResponse::quorum_miss(acks, quorum)),
        ),
        DeleteOutcome::NotFound => (
            StatusCode::NOT_FOUND,
            Json(WriteResponse::rejected("Key does not exist")),
        ),
    }
}

/// Public read handler. Served by every node from its local state.
///
/// Always answers 200; an absent key reads as `found: false`. Follower
/// reads may trail the leader by in-flight replication delay.
pub async fn handle_read(
    Extension(store): Extension<Arc<VersionedStore>>,
    Path(key): Path<String>,
) -> Json<ReadResponse> {
    match store.read(&key) {
        Some(entry) => Json(ReadResponse {
            key,
            value: Some(entry.value),
            version: Some(entry.version),
            found: true,
        }),
        None => Json(ReadResponse {
            key,
            value: None,
            version: None,
            found: false,
        }),
    }
}

/// Liveness probe.
pub async fn handle_health(
    Extension(config): Extension<Arc<NodeConfig>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_type: config.role,
    })
}

/// Service metadata: role, cluster shape, store figures, host usage.
pub async fn handle_root(
    Extension(config): Extension<Arc<NodeConfig>>,
    Extension(store): Extension<Arc<VersionedStore>>,
) -> Json<ServiceInfoResponse> {
    let mut sys = System::new_all();
    sys.refresh_cpu();
    sys.refresh_memory();
    let cpu_usage = sys.global_cpu_info().cpu_usage();
    // sysinfo returns bytes for memory values.
    let mem_total_mb = sys.total_memory() / (1024 * 1024);
    let mem_used_mb = sys.used_memory() / (1024 * 1024);

    Json(ServiceInfoResponse {
        service: "quorum-kv".to_string(),
        node_type: config.role,
        quorum: config.write_quorum,
        followers: config.follower_urls.clone(),
        storage_size: store.len(),
        current_version: store.current_version(),
        routes: vec![
            "/".to_string(),
            ENDPOINT_HEALTH.to_string(),
            ENDPOINT_WRITE.to_string(),
            format!("{}/:key", ENDPOINT_READ),
            format!("{}/:key", ENDPOINT_DELETE),
            ENDPOINT_REPLICATE.to_string(),
        ],
        cpu_usage,
        mem_used_mb,
        mem_total_mb,
    })
}
