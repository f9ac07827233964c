//! Path-level TOPSIS ranking.

use serde::Serialize;
use tracing::debug;

use crate::cost::{EdgeScore, WeightOverlay};
use crate::dijkstra::PathResult;
use crate::graph::RoadGraph;
use crate::mcdm::{self, CRITERIA, CriteriaWeights};
use crate::rainfall::Rainfall;

/// Aggregate criteria for one path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PathMetrics {
    /// Physical length in metres.
    pub length: f64,
    /// Sum of static risk levels over the edges.
    pub risk: f64,
    /// Sum of rainfall sampled at each edge's midpoint (mm/h).
    pub rainfall: f64,
}

impl PathMetrics {
    pub fn of(path: &PathResult, graph: &RoadGraph, rainfall: &Rainfall<'_>) -> Self {
        path.edges
            .iter()
            .filter_map(|id| graph.edge(*id))
            .fold(Self::default(), |acc, edge| Self {
                length: acc.length + edge.length,
                risk: acc.risk + f64::from(edge.risk_level),
                rainfall: acc.rainfall + rainfall.at_geometry(&edge.geometry),
            })
    }

    fn as_row(&self) -> [f64; CRITERIA] {
        [self.length, self.risk, self.rainfall]
    }
}

/// A candidate path with its ranking outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPath {
    pub path: PathResult,
    pub metrics: PathMetrics,
    /// Per-edge multi-criteria breakdown, in traversal order.
    pub breakdown: Vec<EdgeScore>,
    /// TOPSIS closeness in [0, 1]; higher is better.
    pub closeness: f64,
    pub is_optimal: bool,
}

/// Scores `paths` with TOPSIS and flags the best one.
///
/// A single path is optimal with closeness 1. Among equal scores the
/// earliest path wins. An empty input yields an empty batch.
pub fn rank_paths(
    paths: Vec<PathResult>,
    graph: &RoadGraph,
    rainfall: &Rainfall<'_>,
    overlay: &WeightOverlay,
    weights: &CriteriaWeights,
) -> Vec<RankedPath> {
    let metrics: Vec<PathMetrics> = paths
        .iter()
        .map(|path| PathMetrics::of(path, graph, rainfall))
        .collect();

    let closeness = if paths.len() == 1 {
        vec![1.0]
    } else {
        let rows: Vec<[f64; CRITERIA]> = metrics.iter().map(PathMetrics::as_row).collect();
        mcdm::topsis(&rows, &weights.normalized())
    };

    let best = closeness
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (idx, &score)| match best {
            Some((_, top)) if score <= top => best,
            _ => Some((idx, score)),
        })
        .map(|(idx, _)| idx);

    debug!(paths = paths.len(), optimal = ?best, "ranked candidate paths");

    paths
        .into_iter()
        .zip(metrics)
        .zip(closeness)
        .enumerate()
        .map(|(idx, ((path, metrics), closeness))| {
            let breakdown = path
                .edges
                .iter()
                .filter_map(|id| overlay.score(*id).copied())
                .collect();
            RankedPath {
                path,
                metrics,
                breakdown,
                closeness,
                is_optimal: Some(idx) == best,
            }
        })
        .collect()
}
