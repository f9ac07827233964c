//! Grid-shaped road network for scenario tests.
//!
//! Node `(row, col)` has id `row * cols + col + 1` and sits at
//! `(14.650 + 0.002 * row, 121.030 + 0.002 * col)`. Every segment carries a
//! three-point geometry whose middle vertex is the exact midpoint, so
//! rainfall cells can target whole rows or columns.

use std::collections::HashMap;

use evac_router::cost::effective_weight;
use evac_router::graph::{NodeId, RoadGraph, RoadSegment};
use evac_router::rainfall::Rainfall;
use evac_router::traits::EvacuationSite;

pub const BASE_LAT: f64 = 14.650;
pub const BASE_LON: f64 = 121.030;
pub const SPACING: f64 = 0.002;

#[derive(Debug, Clone)]
pub struct GridCity {
    pub rows: usize,
    pub cols: usize,
    length: f64,
    risk: HashMap<(u64, u64), u8>,
    lengths: HashMap<(u64, u64), f64>,
}

impl GridCity {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            length: 200.0,
            risk: HashMap::new(),
            lengths: HashMap::new(),
        }
    }

    pub fn id(&self, row: usize, col: usize) -> NodeId {
        NodeId((row * self.cols + col + 1) as u64)
    }

    pub fn coords(&self, row: usize, col: usize) -> (f64, f64) {
        (BASE_LAT + SPACING * row as f64, BASE_LON + SPACING * col as f64)
    }

    pub fn risk(mut self, a: u64, b: u64, level: u8) -> Self {
        self.risk.insert(key(a, b), level);
        self
    }

    pub fn length(mut self, a: u64, b: u64, length: f64) -> Self {
        self.lengths.insert(key(a, b), length);
        self
    }

    pub fn segments(&self) -> Vec<RoadSegment> {
        let mut segments = Vec::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                if col + 1 < self.cols {
                    segments.push(self.segment((row, col), (row, col + 1)));
                }
                if row + 1 < self.rows {
                    segments.push(self.segment((row, col), (row + 1, col)));
                }
            }
        }
        segments
    }

    pub fn build(&self) -> RoadGraph {
        RoadGraph::from_segments(self.segments())
    }

    fn segment(&self, a: (usize, usize), b: (usize, usize)) -> RoadSegment {
        let from = self.id(a.0, a.1);
        let to = self.id(b.0, b.1);
        let start = self.coords(a.0, a.1);
        let end = self.coords(b.0, b.1);
        let mid = ((start.0 + end.0) / 2.0, (start.1 + end.1) / 2.0);
        let k = key(from.0, to.0);

        RoadSegment {
            from,
            to,
            length: Some(self.lengths.get(&k).copied().unwrap_or(self.length)),
            risk_level: Some(self.risk.get(&k).copied().unwrap_or(0)),
            geometry: vec![start, mid, end],
            name: Some(format!("Street {}-{}", from, to)),
        }
    }
}

fn key(a: u64, b: u64) -> (u64, u64) {
    (a.min(b), a.max(b))
}

/// A named shelter location.
#[derive(Debug, Clone)]
pub struct Shelter {
    pub id: &'static str,
    pub name: &'static str,
    pub barangay: &'static str,
    pub lat: f64,
    pub lon: f64,
}

impl Shelter {
    pub const fn new(id: &'static str, name: &'static str, barangay: &'static str, lat: f64, lon: f64) -> Self {
        Self { id, name, barangay, lat, lon }
    }
}

impl EvacuationSite for Shelter {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        self.name
    }

    fn district(&self) -> Option<&str> {
        Some(self.barangay)
    }

    fn location(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }
}

/// Every simple path from `start` to `goal` with its dry risk-multiplier cost.
pub fn all_simple_paths(graph: &RoadGraph, start: NodeId, goal: NodeId) -> Vec<(Vec<NodeId>, f64)> {
    let mut out = Vec::new();
    let mut stack = vec![start];
    walk(graph, goal, &mut stack, 0.0, &mut out);
    out
}

fn walk(graph: &RoadGraph, goal: NodeId, stack: &mut Vec<NodeId>, cost: f64, out: &mut Vec<(Vec<NodeId>, f64)>) {
    let Some(&current) = stack.last() else {
        return;
    };
    if current == goal {
        out.push((stack.clone(), cost));
        return;
    }
    for adj in graph.neighbors(current) {
        if stack.contains(&adj.neighbor) {
            continue;
        }
        let edge = graph.edge(adj.edge).expect("adjacency points at a stored edge");
        let weight = effective_weight(edge, &Rainfall::Manual(0.0));
        stack.push(adj.neighbor);
        walk(graph, goal, stack, cost + weight, out);
        stack.pop();
    }
}
