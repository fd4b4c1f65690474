use axum::{
    Router,
    extract::Extension,
    routing::{delete, get, post},
};
use std::sync::Arc;

use super::coordinator::WriteCoordinator;
use super::handlers::{handle_delete, handle_health, handle_read, handle_root, handle_write};
use super::protocol::{ENDPOINT_DELETE, ENDPOINT_HEALTH, ENDPOINT_READ, ENDPOINT_WRITE};
use crate::config::types::NodeConfig;
use crate::replication::handlers::handle_replicate;
use crate::replication::protocol::ENDPOINT_REPLICATE;
use crate::store::memory::VersionedStore;

/// Assembles the full HTTP surface of one node.
///
/// Every node exposes every route; admission is decided per request by the
/// role checks inside the handlers (writes and deletes leader-only,
/// replication ingress follower-only, the rest everywhere).
pub fn build_router(
    config: Arc<NodeConfig>,
    store: Arc<VersionedStore>,
    coordinator: Arc<WriteCoordinator>,
) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route(ENDPOINT_HEALTH, get(handle_health))
        .route(ENDPOINT_WRITE, post(handle_write))
        .route(&format!("{}/:key", ENDPOINT_READ), get(handle_read))
        .route(&format!("{}/:key", ENDPOINT_DELETE), delete(handle_delete))
        .route(ENDPOINT_REPLICATE, post(handle_replicate))
        .layer(Extension(config))
        .layer(Extension(store))
        .layer(Extension(coordinator))
}
