use super::protocol::{ACK_REPLICATED, ENDPOINT_REPLICATE, ReplicateAck, ReplicateRequest};
use crate::config::types::NodeConfig;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use rand::Rng;
use std::time::Duration;

const REPLICATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Leader-side replication fan-out.
///
/// One instance per node, created from the validated config. The embedded
/// `reqwest::Client` pools connections and is shared by all concurrent
/// dispatches.
pub struct ReplicationDispatcher {
    followers: Vec<String>,
    write_quorum: usize,
    min_delay_ms: u64,
    max_delay_ms: u64,
    http_client: reqwest::Client,
}

impl ReplicationDispatcher {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            followers: config.follower_urls.clone(),
            write_quorum: config.write_quorum,
            min_delay_ms: config.min_delay_ms,
            max_delay_ms: config.max_delay_ms,
            http_client: reqwest::Client::new(),
        }
    }

    /// Pushes one message to every follower concurrently and counts
    /// acknowledgements as they arrive.
    ///
    /// Returns as soon as the quorum is met; attempts still in flight at
    /// that point keep running detached and cannot change the returned
    /// count. When the quorum is out of reach, returns the final count
    /// after all attempts resolve.
    pub async fn dispatch(&self, msg: ReplicateRequest) -> usize {
        if self.followers.is_empty() {
            return 0;
        }

        let mut attempts = FuturesUnordered::new();
        for follower_url in &self.followers {
            let client = self.http_client.clone();
            let target = format!("{}{}", follower_url, ENDPOINT_REPLICATE);
            let payload = msg.clone();
            let delay = self.sample_delay();

            attempts.push(tokio::spawn(async move {
                replicate_to_follower(client, target, payload, delay).await
            }));
        }

        let mut acks = 0;
        while let Some(joined) = attempts.next().await {
            if matches!(joined, Ok(true)) {
                acks += 1;
                if acks >= self.write_quorum {
                    return acks;
                }
            }
        }

        acks
    }

    // Fresh sample per attempt, inclusive bounds.
    fn sample_delay(&self) -> Duration {
        let ms = rand::thread_rng().gen_range(self.min_delay_ms..=self.max_delay_ms);
        Duration::from_millis(ms)
    }
}

/// Sends one replication attempt after its simulated network delay.
///
/// Success means HTTP 200 with an accepting body; transport errors,
/// timeouts, and non-200 statuses are logged and absorbed into a missed
/// acknowledgement.
async fn replicate_to_follower(
    client: reqwest::Client,
    target: String,
    payload: ReplicateRequest,
    delay: Duration,
) -> bool {
    tokio::time::sleep(delay).await;

    let response = client
        .post(&target)
        .json(&payload)
        .timeout(REPLICATION_TIMEOUT)
        .send()
        .await;

    match response {
        Ok(resp) if resp.status() == reqwest::StatusCode::OK => {
            match resp.json::<ReplicateAck>().await {
                Ok(ack) if ack.status == ACK_REPLICATED => true,
                Ok(ack) => {
                    tracing::warn!("Unexpected ack '{}' from {}", ack.status, target);
                    false
                }
                Err(e) => {
                    tracing::error!("Unreadable ack from {}: {}", target, e);
                    false
                }
            }
        }
        Ok(resp) => {
            tracing::error!("Replication to {} rejected: {}", target, resp.status());
            false
        }
        Err(e) => {
            tracing::error!("Replication to {} failed: {}", target, e);
            false
        }
    }
}
