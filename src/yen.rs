//! K shortest loopless paths (Yen's algorithm).
//!
//! Spur searches for one rank are independent reads over the immutable graph
//! and weight overlay, so they run in parallel and are merged back in
//! spur-index order to keep results deterministic.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::cost::{WeightOverlay, WeightPolicy};
use crate::dijkstra::{Exclusions, PathResult, Target, shortest_path};
use crate::graph::{NodeId, RoadGraph};
use crate::mcdm::CriteriaWeights;
use crate::rainfall::Rainfall;
use crate::traits::Cancellation;

/// Cooperative stop signal for long searches: an optional deadline plus a
/// flag another thread may raise.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    deadline: Option<Instant>,
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
            flag: Arc::default(),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(AtomicOrdering::Relaxed)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

impl Cancellation for CancelToken {
    fn is_cancelled(&self) -> bool {
        CancelToken::is_cancelled(self)
    }
}

#[derive(Debug)]
struct Candidate {
    path: PathResult,
    seq: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    // Min-heap on cost, earlier discovery first on ties.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .path
            .total_cost
            .total_cmp(&self.path.total_cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Bakes multi-criteria weights for this call and returns up to `k` paths
/// from `start` to the nearest member of `targets`, best first.
///
/// The overlay lives only for the duration of the call.
pub fn k_shortest_paths<C: Cancellation + ?Sized>(
    graph: &RoadGraph,
    start: NodeId,
    targets: &Target,
    k: usize,
    rainfall: Rainfall<'_>,
    weights: &CriteriaWeights,
    cancel: &C,
) -> Vec<PathResult> {
    let overlay = WeightOverlay::bake(graph, &rainfall, weights);
    let policy = WeightPolicy::Baked {
        overlay: &overlay,
        rainfall,
    };
    k_shortest_paths_with_policy(graph, start, targets, k, &policy, cancel)
}

/// Yen's algorithm under an explicit weighting policy.
///
/// Cancellation is honoured per rank: a round interrupted before every spur
/// was searched is discarded, so each returned path holds its true rank.
pub fn k_shortest_paths_with_policy<C: Cancellation + ?Sized>(
    graph: &RoadGraph,
    start: NodeId,
    targets: &Target,
    k: usize,
    policy: &WeightPolicy<'_>,
    cancel: &C,
) -> Vec<PathResult> {
    if k == 0 {
        return Vec::new();
    }

    let Some(first) = shortest_path(graph, start, targets, &Exclusions::new(), policy) else {
        debug!(start = %start, "no path to any target");
        return Vec::new();
    };

    let mut accepted: Vec<PathResult> = vec![first];
    let mut candidates: BinaryHeap<Candidate> = BinaryHeap::new();
    let mut queued: HashSet<Vec<NodeId>> = HashSet::new();
    let mut seq = 0usize;

    while accepted.len() < k {
        if cancel.is_cancelled() {
            warn!(found = accepted.len(), requested = k, "k-shortest search cancelled");
            break;
        }

        let Some(previous) = accepted.last() else {
            break;
        };
        let spur_count = previous.nodes.len().saturating_sub(1);

        let round: Option<Vec<Option<PathResult>>> = (0..spur_count)
            .into_par_iter()
            .map(|i| {
                (!cancel.is_cancelled()).then(|| spur_candidate(graph, previous, i, &accepted, targets, policy))
            })
            .collect();
        let Some(spurs) = round else {
            warn!(found = accepted.len(), requested = k, "k-shortest search cancelled mid-round");
            break;
        };

        for candidate in spurs.into_iter().flatten() {
            if queued.insert(candidate.nodes.clone()) {
                candidates.push(Candidate { path: candidate, seq });
                seq += 1;
            }
        }

        let mut next = None;
        while let Some(Candidate { path, .. }) = candidates.pop() {
            if !accepted.iter().any(|p| p.nodes == path.nodes) {
                next = Some(path);
                break;
            }
        }

        match next {
            Some(path) => {
                debug!(rank = accepted.len(), cost = path.total_cost, "accepted path");
                accepted.push(path);
            }
            None => break,
        }
    }

    accepted
}

/// Candidate diverging from `previous` at node index `i`, if any.
fn spur_candidate(
    graph: &RoadGraph,
    previous: &PathResult,
    i: usize,
    accepted: &[PathResult],
    targets: &Target,
    policy: &WeightPolicy<'_>,
) -> Option<PathResult> {
    let spur_node = previous.nodes[i];
    let root_nodes = &previous.nodes[..=i];

    let mut exclusions = Exclusions::new();
    for path in accepted {
        if path.nodes.len() > i + 1 && path.nodes[..=i] == *root_nodes {
            exclusions.exclude_segment(path.nodes[i], path.nodes[i + 1]);
        }
    }
    for node in &root_nodes[..i] {
        exclusions.exclude_node(*node);
    }

    let spur = shortest_path(graph, spur_node, targets, &exclusions, policy)?;

    let root_cost: f64 = previous.edge_costs[..i].iter().sum();
    let root_distance: f64 = previous.edges[..i]
        .iter()
        .filter_map(|id| graph.edge(*id))
        .map(|edge| edge.length)
        .sum();

    let mut nodes = root_nodes[..i].to_vec();
    nodes.extend_from_slice(&spur.nodes);
    let mut edges = previous.edges[..i].to_vec();
    edges.extend_from_slice(&spur.edges);
    let mut edge_costs = previous.edge_costs[..i].to_vec();
    edge_costs.extend_from_slice(&spur.edge_costs);

    Some(PathResult {
        edges,
        nodes,
        edge_costs,
        target: spur.target,
        total_cost: root_cost + spur.total_cost,
        total_distance: root_distance + spur.total_distance,
    })
}
