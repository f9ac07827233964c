//! evac-router core
//!
//! Risk-aware evacuation routing over a road-segment graph: rainfall and
//! flood-risk edge costs, K alternative routes, multi-criteria ranking.

pub mod traits;
pub mod error;
pub mod config;
pub mod graph;
pub mod polyline;
pub mod haversine;
pub mod rainfall;
pub mod feed;
pub mod mcdm;
pub mod cost;
pub mod dijkstra;
pub mod yen;
pub mod ranking;
pub mod locate;
pub mod planner;
