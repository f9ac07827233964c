//! Road-segment graph store.
//!
//! The graph is built once from ingested segment records and is read-only
//! afterwards. Each physical road is stored once as an [`Edge`]; traversal
//! directions are adjacency entries that share it.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::polyline::Polyline;

/// Highest static flood-risk level an edge can carry.
pub const MAX_RISK_LEVEL: u8 = 3;

/// Opaque road-node identifier (OSM node id in practice).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a physical edge in [`RoadGraph::edges`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

impl Node {
    pub fn location(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    /// Physical length in metres.
    pub length: f64,
    /// Static flood-risk level, 0..=3.
    pub risk_level: u8,
    pub geometry: Polyline,
    pub name: Option<String>,
}

/// One traversal direction of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjacency {
    pub neighbor: NodeId,
    pub edge: EdgeId,
}

/// A directed road-segment record as delivered by ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub risk_level: Option<u8>,
    /// Geometry as (lat, lon) points, ordered from `from` to `to`.
    #[serde(default)]
    pub geometry: Vec<(f64, f64)>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RoadGraph {
    nodes: Vec<Node>,
    node_index: HashMap<NodeId, usize>,
    edges: Vec<Edge>,
    adjacency: HashMap<NodeId, Vec<Adjacency>>,
}

impl RoadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from segment records, in order.
    pub fn from_segments<I>(segments: I) -> Self
    where
        I: IntoIterator<Item = RoadSegment>,
    {
        let mut graph = Self::new();
        for segment in segments {
            graph.add_segment(segment);
        }
        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "road graph built"
        );
        graph
    }

    /// Adds one road segment.
    ///
    /// A missing or unusable length becomes 1 and a missing risk level 0, so
    /// one malformed record never poisons the whole graph.
    pub fn add_segment(&mut self, segment: RoadSegment) -> EdgeId {
        let RoadSegment {
            from,
            to,
            length,
            risk_level,
            geometry,
            name,
        } = segment;

        let length = match length {
            Some(value) if value.is_finite() && value >= 0.0 => value,
            _ => 1.0,
        };
        let risk_level = risk_level.unwrap_or(0).min(MAX_RISK_LEVEL);

        if geometry.len() >= 2 {
            let start = geometry[0];
            let end = geometry[geometry.len() - 1];
            self.register_node(from, start);
            self.register_node(to, end);
        }

        let id = EdgeId(self.edges.len());
        self.edges.push(Edge {
            id,
            from,
            to,
            length,
            risk_level,
            geometry: Polyline::new(geometry),
            name,
        });

        // Roads are travelled both ways; each direction gets its own entry.
        self.adjacency.entry(from).or_default().push(Adjacency { neighbor: to, edge: id });
        self.adjacency.entry(to).or_default().push(Adjacency { neighbor: from, edge: id });

        id
    }

    /// Records a node coordinate. A later segment overwrites an earlier one;
    /// the node keeps its first-seen position in [`RoadGraph::nodes`].
    fn register_node(&mut self, id: NodeId, (lat, lon): (f64, f64)) {
        match self.node_index.get(&id) {
            Some(&idx) => self.nodes[idx] = Node { id, lat, lon },
            None => {
                self.node_index.insert(id, self.nodes.len());
                self.nodes.push(Node { id, lat, lon });
            }
        }
    }

    /// Nodes with a known coordinate, in ingestion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index.get(&id).map(|&idx| &self.nodes[idx])
    }

    /// Physical edges, indexed by [`EdgeId`].
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    /// Outgoing adjacency entries of `node`.
    pub fn neighbors(&self, node: NodeId) -> &[Adjacency] {
        self.adjacency
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether `node` appears as an endpoint of any segment.
    pub fn contains(&self, node: NodeId) -> bool {
        self.adjacency.contains_key(&node)
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
