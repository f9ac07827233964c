//! Polyline representation for road and route geometries.
//!
//! Points are stored as decoded (latitude, longitude) pairs. GeoJSON's
//! (longitude, latitude) ordering is an ingestion concern and is flipped
//! before reaching the core.

use serde::{Deserialize, Serialize};

/// An ordered coordinate sequence describing a road segment or a route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<(f64, f64)>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    ///
    /// Each point is a (latitude, longitude) tuple.
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<(f64, f64)> {
        self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<(f64, f64)> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<(f64, f64)> {
        self.points.last().copied()
    }

    /// Representative point used for rainfall sampling: the middle vertex.
    pub fn midpoint(&self) -> Option<(f64, f64)> {
        self.points.get(self.points.len() / 2).copied()
    }

    /// Joins segment geometries into one continuous line.
    ///
    /// Each segment after the first is reversed when its far end lies closer
    /// to the running end point than its near end, and the shared joint
    /// vertex is not repeated.
    pub fn stitch<'a, I>(segments: I) -> Self
    where
        I: IntoIterator<Item = &'a Polyline>,
    {
        let mut points: Vec<(f64, f64)> = Vec::new();

        for segment in segments {
            let mut coords = segment.points.clone();
            if coords.is_empty() {
                continue;
            }

            if let Some(&tail) = points.last() {
                let to_first = planar_distance(tail, coords[0]);
                let to_last = planar_distance(tail, coords[coords.len() - 1]);
                if to_last < to_first {
                    coords.reverse();
                }
                points.extend(coords.into_iter().skip(1));
            } else {
                points.extend(coords);
            }
        }

        Self { points }
    }
}

fn planar_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}
