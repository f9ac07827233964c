//! Edge cost model.
//!
//! Two weighting policies exist. The risk-multiplier policy scales length by
//! the worse of static flood risk and live rainfall tier. The baked policy
//! precomputes a multi-criteria weight for every edge into a
//! [`WeightOverlay`] owned by the caller; the graph itself is never written.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::graph::{Edge, EdgeId, MAX_RISK_LEVEL, RoadGraph};
use crate::mcdm::{self, CRITERIA, CriteriaWeights};
use crate::rainfall::{Rainfall, rainfall_tier};

/// Rainfall normalisation never uses a ceiling below this (mm/h).
pub const MIN_RAINFALL_CEILING: f64 = 10.0;

/// Scale applied to the WSM score when baking: weight = length * (1 + wsm * 5).
pub const WSM_PENALTY_SCALE: f64 = 5.0;

/// Length multiplier for a combined risk tier.
pub fn risk_multiplier(tier: u8) -> f64 {
    match tier {
        0 => 1.0,
        1 => 1.5,
        2 => 3.0,
        _ => 10.0,
    }
}

/// Combined tier: the worse of static risk and rainfall tier.
pub fn combined_risk(static_risk: u8, rainfall_mm: f64) -> u8 {
    static_risk.min(MAX_RISK_LEVEL).max(rainfall_tier(rainfall_mm))
}

/// Risk-multiplier weight of `edge` under `rainfall`.
pub fn effective_weight(edge: &Edge, rainfall: &Rainfall<'_>) -> f64 {
    let rain = rainfall.at_geometry(&edge.geometry);
    edge.length * risk_multiplier(combined_risk(edge.risk_level, rain))
}

/// Multi-criteria breakdown for one edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeScore {
    pub edge: EdgeId,
    pub length: f64,
    pub risk: f64,
    pub rainfall: f64,
    /// Weighted-sum score in [0, 1]; lower is better.
    pub wsm: f64,
    /// TOPSIS closeness in [0, 1]; higher is better. Audit only.
    pub topsis: f64,
    pub baked_weight: f64,
}

/// Per-call baked weights, indexed by [`EdgeId`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightOverlay {
    scores: Vec<EdgeScore>,
}

impl WeightOverlay {
    /// Scores every edge of `graph` against the current rainfall snapshot.
    ///
    /// Pure: identical inputs give an identical overlay.
    pub fn bake(graph: &RoadGraph, rainfall: &Rainfall<'_>, weights: &CriteriaWeights) -> Self {
        let edges = graph.edges();
        if edges.is_empty() {
            return Self::default();
        }

        let rows: Vec<[f64; CRITERIA]> = edges
            .par_iter()
            .map(|edge| {
                [
                    edge.length,
                    f64::from(edge.risk_level),
                    rainfall.at_geometry(&edge.geometry),
                ]
            })
            .collect();

        let (min_len, max_len) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
            (lo.min(r[0]), hi.max(r[0]))
        });
        let max_rain = rows.iter().map(|r| r[2]).fold(0.0, f64::max);
        let rain_ceiling = max_rain.max(MIN_RAINFALL_CEILING);

        let w = weights.normalized();
        let closeness = mcdm::topsis(&rows, &w);

        let scores: Vec<EdgeScore> = edges
            .iter()
            .zip(&rows)
            .zip(closeness)
            .map(|((edge, row), topsis)| {
                let normalized = [
                    mcdm::min_max(row[0], min_len, max_len),
                    mcdm::min_max(row[1], 0.0, f64::from(MAX_RISK_LEVEL)),
                    mcdm::min_max(row[2], 0.0, rain_ceiling),
                ];
                let wsm = mcdm::weighted_sum(&normalized, &w);
                EdgeScore {
                    edge: edge.id,
                    length: row[0],
                    risk: row[1],
                    rainfall: row[2],
                    wsm,
                    topsis,
                    baked_weight: row[0] * (1.0 + wsm * WSM_PENALTY_SCALE),
                }
            })
            .collect();

        debug!(
            edges = scores.len(),
            max_rainfall = max_rain,
            "baked multi-criteria edge weights"
        );

        Self { scores }
    }

    pub fn score(&self, edge: EdgeId) -> Option<&EdgeScore> {
        self.scores.get(edge.0)
    }

    pub fn weight(&self, edge: EdgeId) -> Option<f64> {
        self.score(edge).map(|s| s.baked_weight)
    }

    pub fn scores(&self) -> &[EdgeScore] {
        &self.scores
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// How the solver prices an edge.
#[derive(Debug, Clone, Copy)]
pub enum WeightPolicy<'a> {
    /// Length scaled by the combined risk tier.
    RiskMultiplier(Rainfall<'a>),
    /// Baked multi-criteria weights; edges missing from the overlay fall
    /// back to the risk multiplier.
    Baked {
        overlay: &'a WeightOverlay,
        rainfall: Rainfall<'a>,
    },
}

impl WeightPolicy<'_> {
    pub fn weight(&self, edge: &Edge) -> f64 {
        match self {
            WeightPolicy::RiskMultiplier(rainfall) => effective_weight(edge, rainfall),
            WeightPolicy::Baked { overlay, rainfall } => overlay
                .weight(edge.id)
                .unwrap_or_else(|| effective_weight(edge, rainfall)),
        }
    }
}
