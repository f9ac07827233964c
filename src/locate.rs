//! Snapping arbitrary coordinates onto graph nodes.

use crate::graph::{Node, NodeId};
use crate::haversine::haversine_m;

/// A coordinate resolved to its nearest graph node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snap {
    pub node: NodeId,
    /// Great-circle distance from the query point to the node, in metres.
    pub distance_m: f64,
}

/// Nearest node by planar distance in coordinate space.
///
/// Linear scan; the first strict minimum wins, so iteration order decides
/// ties.
pub fn nearest_node(lat: f64, lon: f64, nodes: &[Node]) -> Option<NodeId> {
    nearest(lat, lon, nodes).map(|node| node.id)
}

/// Like [`nearest_node`], also reporting the real-world snap distance.
pub fn snap(lat: f64, lon: f64, nodes: &[Node]) -> Option<Snap> {
    nearest(lat, lon, nodes).map(|node| Snap {
        node: node.id,
        distance_m: haversine_m((lat, lon), node.location()),
    })
}

fn nearest(lat: f64, lon: f64, nodes: &[Node]) -> Option<&Node> {
    let mut best: Option<(&Node, f64)> = None;
    for node in nodes {
        let d = (node.lat - lat).hypot(node.lon - lon);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((node, d)),
        }
    }
    best.map(|(node, _)| node)
}
