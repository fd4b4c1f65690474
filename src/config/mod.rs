//! Node Configuration Module
//!
//! Parses the environment into a validated `NodeConfig` at startup.
//! The cluster is statically configured: one leader with a fixed follower
//! list and write quorum, selected per node via `NODE_TYPE`.
//!
//! Validation happens before any port is bound; an invalid role, a quorum
//! outside `[1, follower count]`, or inverted delay bounds abort the process
//! with a non-zero exit code.

pub mod types;
