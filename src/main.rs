use quorum_kv::api::coordinator::WriteCoordinator;
use quorum_kv::api::router::build_router;
use quorum_kv::config::types::NodeConfig;
use quorum_kv::replication::dispatcher::ReplicationDispatcher;
use quorum_kv::store::memory::VersionedStore;

use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // 1. Configuration; invalid input is fatal before any port binds.
    let config = match NodeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid node configuration: {}", e);
            std::process::exit(1);
        }
    };
    let config = Arc::new(config);

    tracing::info!("Starting {} node on port {}", config.role, config.port);
    if config.role.is_leader() {
        tracing::info!(
            "Replicating to {} follower(s), write quorum {}",
            config.follower_urls.len(),
            config.write_quorum
        );
        tracing::info!(
            "Simulated replication delay: {}-{} ms",
            config.min_delay_ms,
            config.max_delay_ms
        );
    } else if let Some(leader_url) = &config.leader_url {
        tracing::info!("Accepting replication from leader at {}", leader_url);
    }

    // 2. State: the versioned store and the leader's write path.
    let store = Arc::new(VersionedStore::new());
    let dispatcher = Arc::new(ReplicationDispatcher::new(&config));
    let coordinator = Arc::new(WriteCoordinator::new(
        store.clone(),
        dispatcher,
        &config,
    ));

    // 3. HTTP server.
    let app = build_router(config.clone(), store, coordinator);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
