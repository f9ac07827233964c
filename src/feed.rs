//! HTTP adapter for the latest rainfall grid.
//!
//! The upstream service publishes the grid as polygon features whose first
//! ring starts at the south-west corner and reaches the north-east corner at
//! vertex 2. When it has nothing to serve it answers `{"error": "..."}`.

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::FeedError;
use crate::rainfall::{RainfallCell, RainfallIndex, Timeframe};
use crate::traits::RainfallFeed;

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub base_url: String,
    pub path: String,
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            path: "/jaxa_rainfall_latest".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRainfallFeed {
    config: FeedConfig,
    client: reqwest::blocking::Client,
}

impl HttpRainfallFeed {
    pub fn new(config: FeedConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl RainfallFeed for HttpRainfallFeed {
    fn fetch(&self) -> Result<RainfallIndex, FeedError> {
        let url = format!("{}{}", self.config.base_url, self.config.path);
        let body = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())?;

        parse_grid(&body)
    }
}

/// Fetches live rainfall, falling back to the simulated grid for
/// `timeframe` when the feed fails.
pub fn fetch_or_simulate<F: RainfallFeed>(feed: &F, timeframe: Timeframe) -> RainfallIndex {
    let index = match feed.fetch() {
        Ok(index) => index,
        Err(err) => {
            warn!(error = %err, ?timeframe, "live rainfall unavailable, using simulated grid");
            RainfallIndex::simulated(timeframe)
        }
    };

    let summary = index.summary();
    info!(
        cells = summary.cells,
        max_mm_h = summary.max_intensity,
        mean_mm_h = summary.mean_intensity,
        "rainfall grid loaded"
    );
    index
}

/// Parses a rainfall grid document into an index.
///
/// Features without a usable ring are skipped.
pub fn parse_grid(body: &str) -> Result<RainfallIndex, FeedError> {
    let response: GridResponse = serde_json::from_str(body)?;
    if let Some(error) = response.error {
        return Err(FeedError::Unavailable(error));
    }

    let cells = response
        .features
        .unwrap_or_default()
        .into_iter()
        .filter_map(|feature| {
            let ring = feature.geometry.coordinates.into_iter().next()?;
            let sw = ring.first()?;
            let ne = ring.get(2)?;
            Some(RainfallCell {
                min_lon: sw[0],
                max_lon: ne[0],
                min_lat: sw[1],
                max_lat: ne[1],
                intensity: feature.properties.intensity,
            })
        })
        .collect();

    Ok(RainfallIndex::new(cells))
}

#[derive(Debug, Deserialize)]
struct GridResponse {
    error: Option<String>,
    features: Option<Vec<GridFeature>>,
}

#[derive(Debug, Deserialize)]
struct GridFeature {
    geometry: GridGeometry,
    properties: GridProperties,
}

#[derive(Debug, Deserialize)]
struct GridGeometry {
    /// Polygon rings of `[lon, lat]` positions.
    coordinates: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Deserialize)]
struct GridProperties {
    #[serde(default)]
    intensity: f64,
}
