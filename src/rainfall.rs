//! Rainfall grid lookup.
//!
//! The grid is a list of axis-aligned cells produced upstream. Cells do not
//! overlap by construction, so the first containing cell wins.

use serde::{Deserialize, Serialize};

use crate::polyline::Polyline;

/// Simulated grid resolution in degrees.
const SIM_RESOLUTION_DEG: f64 = 0.05;
const SIM_LAT_RANGE: (f64, f64) = (14.60, 14.76);
const SIM_LON_RANGE: (f64, f64) = (121.00, 121.16);
/// Decay rate of a simulated storm cell per degree of distance.
const SIM_DECAY: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RainfallCell {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
    /// Intensity in mm/h.
    pub intensity: f64,
}

impl RainfallCell {
    /// Bounds are inclusive on every side.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

/// Aggregate figures logged whenever a grid is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridSummary {
    pub cells: usize,
    pub max_intensity: f64,
    pub mean_intensity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RainfallIndex {
    cells: Vec<RainfallCell>,
}

impl RainfallIndex {
    pub fn new(cells: Vec<RainfallCell>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[RainfallCell] {
        &self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Intensity of the first cell containing the point, or 0.
    pub fn intensity_at(&self, lat: f64, lon: f64) -> f64 {
        self.cells
            .iter()
            .find(|cell| cell.contains(lat, lon))
            .map(|cell| cell.intensity)
            .unwrap_or(0.0)
    }

    pub fn summary(&self) -> GridSummary {
        if self.cells.is_empty() {
            return GridSummary::default();
        }
        let total: f64 = self.cells.iter().map(|c| c.intensity).sum();
        let max = self
            .cells
            .iter()
            .map(|c| c.intensity)
            .fold(f64::NEG_INFINITY, f64::max);
        GridSummary {
            cells: self.cells.len(),
            max_intensity: max,
            mean_intensity: total / self.cells.len() as f64,
        }
    }

    /// Synthetic storm grid over the Quezon City study area.
    ///
    /// Used when live data is unavailable. Each storm centre contributes
    /// `intensity * exp(-20 * d)` where `d` is the planar distance in degrees
    /// from the cell's south-west corner.
    pub fn simulated(timeframe: Timeframe) -> Self {
        let centers = timeframe.storm_centers();
        let steps_lat = grid_steps(SIM_LAT_RANGE);
        let steps_lon = grid_steps(SIM_LON_RANGE);

        let mut cells = Vec::with_capacity(steps_lat * steps_lon);
        for i in 0..steps_lat {
            let lat = SIM_LAT_RANGE.0 + i as f64 * SIM_RESOLUTION_DEG;
            for j in 0..steps_lon {
                let lon = SIM_LON_RANGE.0 + j as f64 * SIM_RESOLUTION_DEG;
                let intensity: f64 = centers
                    .iter()
                    .map(|&(c_lat, c_lon, peak)| {
                        let d = (lat - c_lat).hypot(lon - c_lon);
                        peak * (-d * SIM_DECAY).exp()
                    })
                    .sum();
                cells.push(RainfallCell {
                    min_lon: lon,
                    max_lon: lon + SIM_RESOLUTION_DEG,
                    min_lat: lat,
                    max_lat: lat + SIM_RESOLUTION_DEG,
                    intensity: intensity.max(0.0),
                });
            }
        }

        Self { cells }
    }
}

fn grid_steps((start, end): (f64, f64)) -> usize {
    // Small epsilon keeps the inclusive upper row despite float accumulation.
    ((end - start) / SIM_RESOLUTION_DEG + 1e-9).floor() as usize + 1
}

/// Forecast horizon for the simulated grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "now")]
    Now,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "3h")]
    ThreeHours,
    #[serde(rename = "6h")]
    SixHours,
}

impl Timeframe {
    /// Storm centres as (lat, lon, peak mm/h).
    fn storm_centers(self) -> &'static [(f64, f64, f64)] {
        match self {
            Timeframe::Now => &[(14.68, 121.05, 25.0)],
            Timeframe::OneHour => &[(14.70, 121.08, 40.0)],
            Timeframe::ThreeHours => &[(14.75, 121.12, 15.0)],
            Timeframe::SixHours => &[(14.65, 121.00, 5.0)],
        }
    }
}

/// Rainfall tier derived from intensity: 0 up to 5 mm/h, then 1, 2 and 3
/// above 5, 15 and 30 mm/h.
pub fn rainfall_tier(intensity: f64) -> u8 {
    if intensity > 30.0 {
        3
    } else if intensity > 15.0 {
        2
    } else if intensity > 5.0 {
        1
    } else {
        0
    }
}

/// Rainfall input for one routing call.
#[derive(Debug, Clone, Copy)]
pub enum Rainfall<'a> {
    Live(&'a RainfallIndex),
    /// Simulation mode: a uniform operator-supplied intensity.
    Manual(f64),
}

impl Rainfall<'_> {
    pub fn intensity_at(&self, lat: f64, lon: f64) -> f64 {
        match self {
            Rainfall::Live(index) => index.intensity_at(lat, lon),
            Rainfall::Manual(mm) => *mm,
        }
    }

    /// Rainfall sampled at an edge geometry's representative point.
    pub fn at_geometry(&self, geometry: &Polyline) -> f64 {
        match self {
            Rainfall::Manual(mm) => *mm,
            Rainfall::Live(_) => geometry
                .midpoint()
                .map(|(lat, lon)| self.intensity_at(lat, lon))
                .unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(min_lon: f64, max_lon: f64, min_lat: f64, max_lat: f64, intensity: f64) -> RainfallCell {
        RainfallCell { min_lon, max_lon, min_lat, max_lat, intensity }
    }

    #[test]
    fn test_point_outside_all_cells_is_zero() {
        let index = RainfallIndex::new(vec![cell(121.0, 121.1, 14.6, 14.7, 12.0)]);
        assert_eq!(index.intensity_at(15.0, 121.05), 0.0);
    }

    #[test]
    fn test_point_inside_cell_returns_intensity() {
        let index = RainfallIndex::new(vec![
            cell(121.0, 121.1, 14.6, 14.7, 12.0),
            cell(121.1, 121.2, 14.6, 14.7, 40.0),
        ]);
        assert_eq!(index.intensity_at(14.65, 121.15), 40.0);
    }

    #[test]
    fn test_first_match_wins_on_shared_border() {
        let index = RainfallIndex::new(vec![
            cell(121.0, 121.1, 14.6, 14.7, 12.0),
            cell(121.1, 121.2, 14.6, 14.7, 40.0),
        ]);
        assert_eq!(index.intensity_at(14.65, 121.1), 12.0);
    }

    #[test]
    fn test_empty_index_is_zero() {
        assert_eq!(RainfallIndex::default().intensity_at(14.65, 121.05), 0.0);
    }

    #[test]
    fn test_summary() {
        let index = RainfallIndex::new(vec![
            cell(0.0, 1.0, 0.0, 1.0, 10.0),
            cell(1.0, 2.0, 0.0, 1.0, 30.0),
        ]);
        let summary = index.summary();
        assert_eq!(summary.cells, 2);
        assert_eq!(summary.max_intensity, 30.0);
        assert_eq!(summary.mean_intensity, 20.0);
    }

    #[test]
    fn test_simulated_grid_covers_study_area() {
        let index = RainfallIndex::simulated(Timeframe::Now);
        assert_eq!(index.cells().len(), 16);
        // Close to the storm centre the sample is strongest.
        let near = index.intensity_at(14.66, 121.06);
        let far = index.intensity_at(14.76, 121.16);
        assert!(near > far, "near={near} far={far}");
        assert!(index.cells().iter().all(|c| c.intensity >= 0.0));
    }

    #[test]
    fn test_manual_rainfall_ignores_geometry() {
        let rain = Rainfall::Manual(22.0);
        assert_eq!(rain.at_geometry(&Polyline::default()), 22.0);
        assert_eq!(rain.intensity_at(0.0, 0.0), 22.0);
    }

    #[test]
    fn test_live_rainfall_samples_midpoint() {
        let index = RainfallIndex::new(vec![cell(0.0, 1.0, 0.0, 1.0, 18.0)]);
        let rain = Rainfall::Live(&index);
        let inside = Polyline::new(vec![(5.0, 5.0), (0.5, 0.5), (5.0, 5.0)]);
        assert_eq!(rain.at_geometry(&inside), 18.0);
        assert_eq!(rain.at_geometry(&Polyline::default()), 0.0);
    }
}
