//! Error types for the routing boundary.
//!
//! The search algorithms themselves signal "no result" with `Option` or an
//! empty `Vec`; these enums cover the operations that talk to callers.

use thiserror::Error;

use crate::graph::NodeId;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("road graph is empty")]
    EmptyGraph,
    #[error("origin ({lat:.6}, {lon:.6}) could not be snapped to the road graph")]
    OriginNotSnapped { lat: f64, lon: f64 },
    #[error("node {0} is not part of the road graph")]
    UnknownNode(NodeId),
    #[error("no evacuation site could be resolved to a road node")]
    NoSites,
    #[error("no evacuation site is reachable from node {0}")]
    NoReachableSite(NodeId),
    #[error("invalid routing options: {0}")]
    InvalidOptions(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("rainfall feed request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rainfall feed returned malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("rainfall feed unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse routing options: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("criterion weight `{name}` must be a finite non-negative number, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },
    #[error("k must be at least 1")]
    ZeroK,
    #[error("manual rainfall must be a finite non-negative number, got {0}")]
    InvalidManualRainfall(f64),
}
