//! Single-source shortest path with target sets and exclusions.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet};

use serde::Serialize;

use crate::cost::WeightPolicy;
use crate::graph::{EdgeId, NodeId, RoadGraph};
use crate::polyline::Polyline;

/// Where a search may stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Single(NodeId),
    /// Any member of the set; the nearest one by cost wins.
    Any(BTreeSet<NodeId>),
}

impl Target {
    pub fn matches(&self, node: NodeId) -> bool {
        match self {
            Target::Single(target) => *target == node,
            Target::Any(targets) => targets.contains(&node),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Target::Single(_) => false,
            Target::Any(targets) => targets.is_empty(),
        }
    }
}

impl FromIterator<NodeId> for Target {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Target::Any(iter.into_iter().collect())
    }
}

/// One traversal direction of an edge, `from -> to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirectedEdge {
    pub from: NodeId,
    pub to: NodeId,
}

impl DirectedEdge {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self { from, to }
    }

    pub fn reversed(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }
}

/// Nodes and directed edges a search must not use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exclusions {
    nodes: HashSet<NodeId>,
    edges: HashSet<DirectedEdge>,
}

impl Exclusions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude_node(&mut self, node: NodeId) {
        self.nodes.insert(node);
    }

    /// Excludes only the `from -> to` direction.
    pub fn exclude_edge(&mut self, edge: DirectedEdge) {
        self.edges.insert(edge);
    }

    /// Excludes both directions of a segment.
    pub fn exclude_segment(&mut self, a: NodeId, b: NodeId) {
        let edge = DirectedEdge::new(a, b);
        self.edges.insert(edge);
        self.edges.insert(edge.reversed());
    }

    pub fn is_node_excluded(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    pub fn is_edge_excluded(&self, from: NodeId, to: NodeId) -> bool {
        self.edges.contains(&DirectedEdge::new(from, to))
    }
}

/// A route through the graph.
///
/// `nodes` always has one more entry than `edges`, and `edge_costs[i]` is
/// the weight paid for `edges[i]` when the path was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    pub edges: Vec<EdgeId>,
    pub nodes: Vec<NodeId>,
    pub edge_costs: Vec<f64>,
    pub target: NodeId,
    pub total_cost: f64,
    pub total_distance: f64,
}

impl PathResult {
    /// Zero-length path that starts and ends at `node`.
    pub fn trivial(node: NodeId) -> Self {
        Self {
            edges: Vec::new(),
            nodes: vec![node],
            edge_costs: Vec::new(),
            target: node,
            total_cost: 0.0,
            total_distance: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Whether no node occurs twice.
    pub fn is_loopless(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        self.nodes.iter().all(|node| seen.insert(*node))
    }

    /// Continuous route geometry built from the traversed edges, each
    /// oriented in the direction of travel.
    pub fn geometry(&self, graph: &RoadGraph) -> Polyline {
        let oriented: Vec<Polyline> = self
            .edges
            .iter()
            .zip(&self.nodes)
            .filter_map(|(id, from)| {
                let edge = graph.edge(*id)?;
                let mut points = edge.geometry.points().to_vec();
                if edge.from != *from {
                    points.reverse();
                }
                Some(Polyline::new(points))
            })
            .collect();

        Polyline::stitch(&oriented)
    }
}

#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    cost: f64,
    node: NodeId,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    // Reversed so BinaryHeap pops the cheapest entry; ties go to the lower id.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

#[derive(Debug, Clone, Copy)]
struct Predecessor {
    node: NodeId,
    edge: EdgeId,
    weight: f64,
}

/// Cheapest path from `start` to `target` avoiding `exclusions`.
///
/// Returns `None` when `start` is excluded or unknown, when the target set is
/// empty, or when no target is reachable.
pub fn shortest_path(
    graph: &RoadGraph,
    start: NodeId,
    target: &Target,
    exclusions: &Exclusions,
    policy: &WeightPolicy<'_>,
) -> Option<PathResult> {
    if exclusions.is_node_excluded(start) || target.is_empty() {
        return None;
    }
    if !graph.contains(start) {
        return None;
    }

    let mut dist: HashMap<NodeId, f64> = HashMap::new();
    let mut prev: HashMap<NodeId, Predecessor> = HashMap::new();
    let mut heap = BinaryHeap::new();

    dist.insert(start, 0.0);
    heap.push(QueueEntry { cost: 0.0, node: start });

    while let Some(QueueEntry { cost, node }) = heap.pop() {
        if cost > dist.get(&node).copied().unwrap_or(f64::INFINITY) {
            continue;
        }

        if target.matches(node) {
            return Some(reconstruct(graph, start, node, cost, &prev));
        }

        for adj in graph.neighbors(node) {
            if exclusions.is_node_excluded(adj.neighbor)
                || exclusions.is_edge_excluded(node, adj.neighbor)
            {
                continue;
            }
            let Some(edge) = graph.edge(adj.edge) else {
                continue;
            };

            let weight = policy.weight(edge);
            let next = cost + weight;
            if next < dist.get(&adj.neighbor).copied().unwrap_or(f64::INFINITY) {
                dist.insert(adj.neighbor, next);
                prev.insert(
                    adj.neighbor,
                    Predecessor {
                        node,
                        edge: adj.edge,
                        weight,
                    },
                );
                heap.push(QueueEntry {
                    cost: next,
                    node: adj.neighbor,
                });
            }
        }
    }

    None
}

fn reconstruct(
    graph: &RoadGraph,
    start: NodeId,
    end: NodeId,
    total_cost: f64,
    prev: &HashMap<NodeId, Predecessor>,
) -> PathResult {
    let mut nodes = vec![end];
    let mut edges = Vec::new();
    let mut edge_costs = Vec::new();

    let mut current = end;
    while current != start {
        let Some(step) = prev.get(&current) else {
            break;
        };
        edges.push(step.edge);
        edge_costs.push(step.weight);
        nodes.push(step.node);
        current = step.node;
    }

    nodes.reverse();
    edges.reverse();
    edge_costs.reverse();

    let total_distance = edges
        .iter()
        .filter_map(|id| graph.edge(*id))
        .map(|edge| edge.length)
        .sum();

    PathResult {
        edges,
        nodes,
        edge_costs,
        target: end,
        total_cost,
        total_distance,
    }
}
