//! Routing options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mcdm::CriteriaWeights;

/// Default number of alternative routes.
pub const DEFAULT_K: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingOptions {
    /// Relative importance of length, risk and rainfall.
    pub weights: CriteriaWeights,
    /// Number of alternative routes to search for.
    pub k: usize,
    /// Use `manual_rainfall_mm` everywhere instead of the live grid.
    pub simulation_mode: bool,
    pub manual_rainfall_mm: f64,
    /// Budget for the K-shortest search, in milliseconds.
    pub deadline_ms: Option<u64>,
}

impl Default for RoutingOptions {
    fn default() -> Self {
        Self {
            weights: CriteriaWeights::default(),
            k: DEFAULT_K,
            simulation_mode: false,
            manual_rainfall_mm: 0.0,
            deadline_ms: None,
        }
    }
}

impl RoutingOptions {
    /// Parses and validates options from JSON. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            ("length", self.weights.length),
            ("risk", self.weights.risk),
            ("rainfall", self.weights.rainfall),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }
        if self.k == 0 {
            return Err(ConfigError::ZeroK);
        }
        if !self.manual_rainfall_mm.is_finite() || self.manual_rainfall_mm < 0.0 {
            return Err(ConfigError::InvalidManualRainfall(self.manual_rainfall_mm));
        }
        Ok(())
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}
