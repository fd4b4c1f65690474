use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Role a node plays in the cluster.
///
/// All nodes run the same binary; the role decides which endpoints a node
/// admits. Writes and deletes go to the leader, replication ingress goes to
/// followers, reads are served anywhere.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// The unique node that accepts writes and assigns versions.
    Leader,
    /// A read-serving replica that only accepts state via `/replicate`.
    Follower,
}

impl NodeRole {
    pub fn is_leader(self) -> bool {
        self == NodeRole::Leader
    }

    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "leader" => Ok(NodeRole::Leader),
            "follower" => Ok(NodeRole::Follower),
            other => Err(anyhow!(
                "NODE_TYPE must be 'leader' or 'follower', got '{}'",
                other
            )),
        }
    }
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeRole::Leader => write!(f, "leader"),
            NodeRole::Follower => write!(f, "follower"),
        }
    }
}

/// Static cluster configuration for one node, derived from the environment.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// This node's role.
    pub role: NodeRole,
    /// TCP port the HTTP server binds on (`0.0.0.0`).
    pub port: u16,
    /// Base URL of the leader. Informational, set on followers.
    pub leader_url: Option<String>,
    /// Base URLs of all followers. Set on the leader; replication fans out
    /// to every entry.
    pub follower_urls: Vec<String>,
    /// Minimum follower acknowledgements required to report a write as
    /// successful. Always within `[1, follower_urls.len()]` on a leader.
    pub write_quorum: usize,
    /// Inclusive lower bound of the simulated per-replication delay.
    pub min_delay_ms: u64,
    /// Inclusive upper bound of the simulated per-replication delay.
    pub max_delay_ms: u64,
}

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_WRITE_QUORUM: usize = 3;
const DEFAULT_MIN_DELAY_MS: u64 = 50;
const DEFAULT_MAX_DELAY_MS: u64 = 1000;

impl NodeConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds and validates a configuration from an arbitrary variable
    /// lookup. `from_env` passes `std::env::var`; tests pass closures.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let role = match lookup("NODE_TYPE") {
            Some(raw) => NodeRole::parse(&raw)?,
            None => NodeRole::Follower,
        };

        let port = parse_var(&lookup, "PORT", DEFAULT_PORT)?;

        let leader_url = lookup("LEADER_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let follower_urls: Vec<String> = lookup("FOLLOWER_URLS")
            .unwrap_or_default()
            .split(',')
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .collect();

        let write_quorum = parse_var(&lookup, "WRITE_QUORUM", DEFAULT_WRITE_QUORUM)?;
        let min_delay_ms = parse_var(&lookup, "MIN_DELAY_MS", DEFAULT_MIN_DELAY_MS)?;
        let max_delay_ms = parse_var(&lookup, "MAX_DELAY_MS", DEFAULT_MAX_DELAY_MS)?;

        let config = Self {
            role,
            port,
            leader_url,
            follower_urls,
            write_quorum,
            min_delay_ms,
            max_delay_ms,
        };
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.min_delay_ms > self.max_delay_ms {
            return Err(anyhow!(
                "MIN_DELAY_MS ({}) must not exceed MAX_DELAY_MS ({})",
                self.min_delay_ms,
                self.max_delay_ms
            ));
        }

        // Quorum bounds only constrain the leader; followers never dispatch.
        if self.role.is_leader() {
            if self.follower_urls.is_empty() {
                return Err(anyhow!("FOLLOWER_URLS must be set on the leader"));
            }
            if self.write_quorum == 0 {
                return Err(anyhow!("WRITE_QUORUM must be at least 1"));
            }
            if self.write_quorum > self.follower_urls.len() {
                return Err(anyhow!(
                    "WRITE_QUORUM ({}) exceeds the follower count ({})",
                    self.write_quorum,
                    self.follower_urls.len()
                ));
            }
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid {}: {}", name, e)),
        None => Ok(default),
    }
}
