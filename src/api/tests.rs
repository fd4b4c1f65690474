#[cfg(test)]
mod tests {
    use crate::api::coordinator::WriteCoordinator;
    use crate::api::protocol::{ReadResponse, WriteResponse};
    use crate::api::router::build_router;
    use crate::config::types::{NodeConfig, NodeRole};
    use crate::replication::dispatcher::ReplicationDispatcher;
    use crate::store::memory::VersionedStore;

    use serde_json::json;
    use std::sync::Arc;

    fn node_config(role: NodeRole, follower_urls: Vec<String>, write_quorum: usize) -> NodeConfig {
        NodeConfig {
            role,
            port: 0,
            leader_url: None,
            follower_urls,
            write_quorum,
            min_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    async fn spawn_node(config: NodeConfig) -> (String, Arc<VersionedStore>) {
        let config = Arc::new(config);
        let store = Arc::new(VersionedStore::new());
        let dispatcher = Arc::new(ReplicationDispatcher::new(&config));
        let coordinator = Arc::new(WriteCoordinator::new(store.clone(), dispatcher, &config));
        let app = build_router(config, store.clone(), coordinator);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), store)
    }

    /// One leader plus `followers` in-process follower nodes. The quorum is
    /// the full follower count, so a successful write implies every
    /// follower applied it before the response.
    async fn spawn_cluster(
        followers: usize,
    ) -> (String, Arc<VersionedStore>, Vec<(String, Arc<VersionedStore>)>) {
        let mut follower_nodes = Vec::new();
        for _ in 0..followers {
            follower_nodes.push(spawn_node(node_config(NodeRole::Follower, vec![], 1)).await);
        }

        let follower_urls: Vec<String> =
            follower_nodes.iter().map(|(url, _)| url.clone()).collect();
        let (leader_url, leader_store) =
            spawn_node(node_config(NodeRole::Leader, follower_urls, followers)).await;

        (leader_url, leader_store, follower_nodes)
    }

    async fn read_from(client: &reqwest::Client, base_url: &str, key: &str) -> ReadResponse {
        client
            .get(format!("{}/read/{}", base_url, key))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    // ============================================================
    // WRITE PATH
    // ============================================================

    #[tokio::test]
    async fn test_write_replicates_to_every_follower() {
        let (leader_url, _leader_store, followers) = spawn_cluster(3).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/write", leader_url))
            .json(&json!({"key": "hello", "value": "world"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: WriteResponse = response.json().await.unwrap();
        assert!(body.success);
        assert_eq!(body.version, Some(1));
        assert_eq!(body.quorum_reached, Some(3));

        // Quorum == follower count, so every node already converged.
        let leader_read = read_from(&client, &leader_url, "hello").await;
        assert!(leader_read.found);
        assert_eq!(leader_read.value.as_deref(), Some("world"));

        for (url, _store) in &followers {
            let read = read_from(&client, url, "hello").await;
            assert!(read.found);
            assert_eq!(read.value.as_deref(), Some("world"));
            assert_eq!(read.version, Some(1));
        }
    }

    #[tokio::test]
    async fn test_quorum_miss_reports_failure_and_keeps_leader_state() {
        // Both followers unreachable: bind-then-drop leaves refused ports.
        let mut dead_urls = Vec::new();
        for _ in 0..2 {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            dead_urls.push(format!("http://{}", listener.local_addr().unwrap()));
        }

        let (leader_url, leader_store) =
            spawn_node(node_config(NodeRole::Leader, dead_urls, 1)).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/write", leader_url))
            .json(&json!({"key": "k", "value": "v"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        let body: WriteResponse = response.json().await.unwrap();
        assert!(!body.success);
        assert_eq!(body.acks, Some(0));
        assert_eq!(body.quorum, Some(1));

        // No rollback: the leader retains the write it could not replicate.
        let entry = leader_store.read("k").unwrap();
        assert_eq!(entry.value, "v");
        let read = read_from(&client, &leader_url, "k").await;
        assert!(read.found);
    }

    #[tokio::test]
    async fn test_concurrent_writes_to_one_key_converge_on_max_version() {
        let (leader_url, leader_store, followers) = spawn_cluster(3).await;
        let client = reqwest::Client::new();

        let mut handles = Vec::new();
        for i in 0..10 {
            let client = client.clone();
            let url = format!("{}/write", leader_url);
            handles.push(tokio::spawn(async move {
                let response = client
                    .post(url)
                    .json(&json!({"key": "k", "value": format!("v{}", i)}))
                    .send()
                    .await
                    .unwrap();
                assert_eq!(response.status(), reqwest::StatusCode::OK);
                let body: WriteResponse = response.json().await.unwrap();
                body.version.unwrap()
            }));
        }

        let mut versions = Vec::new();
        for handle in handles {
            versions.push(handle.await.unwrap());
        }
        versions.sort_unstable();
        assert_eq!(versions, (1..=10).collect::<Vec<u64>>());

        // Monotonic apply: every node settles on the maximum version.
        let winner = leader_store.read("k").unwrap();
        assert_eq!(winner.version, 10);
        for (_url, store) in &followers {
            let entry = store.read("k").unwrap();
            assert_eq!(entry.version, 10);
            assert_eq!(entry.value, winner.value);
        }
    }

    // ============================================================
    // DELETE PATH
    // ============================================================

    #[tokio::test]
    async fn test_delete_converges_to_absent_everywhere() {
        let (leader_url, _leader_store, followers) = spawn_cluster(2).await;
        let client = reqwest::Client::new();

        client
            .post(format!("{}/write", leader_url))
            .json(&json!({"key": "d", "value": "1"}))
            .send()
            .await
            .unwrap();

        let response = client
            .delete(format!("{}/delete/d", leader_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: WriteResponse = response.json().await.unwrap();
        assert!(body.success);
        assert_eq!(body.version, Some(2));

        let read = read_from(&client, &leader_url, "d").await;
        assert!(!read.found);
        for (url, _store) in &followers {
            let read = read_from(&client, url, "d").await;
            assert!(!read.found);
            assert!(read.value.is_none());
        }
    }

    #[tokio::test]
    async fn test_delete_of_absent_key_is_not_found() {
        let (leader_url, leader_store, _followers) = spawn_cluster(1).await;
        let client = reqwest::Client::new();

        let response = client
            .delete(format!("{}/delete/ghost", leader_url))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
        assert_eq!(leader_store.current_version(), 0);
    }

    // ============================================================
    // ROLE ENFORCEMENT
    // ============================================================

    #[tokio::test]
    async fn test_follower_rejects_writes_and_deletes() {
        let (url, _store) = spawn_node(node_config(NodeRole::Follower, vec![], 1)).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/write", url))
            .json(&json!({"key": "x", "value": "y"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
        let body: WriteResponse = response.json().await.unwrap();
        assert!(!body.success);

        let response = client
            .delete(format!("{}/delete/x", url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_leader_rejects_replication_ingress() {
        let (leader_url, _leader_store, _followers) = spawn_cluster(1).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/replicate", leader_url))
            .json(&json!({"key": "k", "value": "v", "version": 1, "delete": false}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
    }

    // ============================================================
    // READS, HEALTH, METADATA
    // ============================================================

    #[tokio::test]
    async fn test_read_of_absent_key_succeeds_with_found_false() {
        let (url, _store) = spawn_node(node_config(NodeRole::Follower, vec![], 1)).await;
        let client = reqwest::Client::new();

        let response = client
            .get(format!("{}/read/nothing-here", url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: ReadResponse = response.json().await.unwrap();
        assert!(!body.found);
        assert!(body.value.is_none());
        assert!(body.version.is_none());
        assert_eq!(body.key, "nothing-here");
    }

    #[tokio::test]
    async fn test_stale_replicate_injection_is_acked_and_ignored() {
        let (url, store) = spawn_node(node_config(NodeRole::Follower, vec![], 1)).await;
        let client = reqwest::Client::new();

        for version in [5u64, 2] {
            let response = client
                .post(format!("{}/replicate", url))
                .json(&json!({"key": "k", "value": format!("v{}", version), "version": version}))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), reqwest::StatusCode::OK);
        }

        // The version-2 message was acknowledged but dropped.
        let entry = store.read("k").unwrap();
        assert_eq!(entry.value, "v5");
        assert_eq!(entry.version, 5);
    }

    #[tokio::test]
    async fn test_malformed_write_is_bad_request() {
        let (leader_url, _leader_store, _followers) = spawn_cluster(1).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/write", leader_url))
            .json(&json!({"key": "missing-value"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health_and_root_answer_on_any_role() {
        let (leader_url, _leader_store, followers) = spawn_cluster(1).await;
        let client = reqwest::Client::new();

        for (url, expected_role) in [
            (leader_url.as_str(), "leader"),
            (followers[0].0.as_str(), "follower"),
        ] {
            let health: serde_json::Value = client
                .get(format!("{}/health", url))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            assert_eq!(health["status"], "healthy");
            assert_eq!(health["node_type"], expected_role);

            let info: serde_json::Value = client
                .get(format!("{}/", url))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            assert_eq!(info["node_type"], expected_role);
            assert!(info["routes"].as_array().unwrap().len() >= 6);
        }
    }
}
