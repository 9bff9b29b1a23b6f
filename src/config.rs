//! Runtime configuration.
//!
//! Defaults cover a local OSRM instance. A JSON file may override any
//! subset of fields, and `TELEMETRY_*` environment variables override both.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::TelemetryError;
use crate::fuel::{DEFAULT_LOW_FUEL_THRESHOLD_PCT, FuelModel};
use crate::osrm::OsrmConfig;
use crate::scoring::{RouteScorer, ScoringConfig};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub osrm: OsrmConfig,
    pub scoring: ScoringConfig,
    pub low_fuel_threshold_pct: f64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            osrm: OsrmConfig::default(),
            scoring: ScoringConfig::default(),
            low_fuel_threshold_pct: DEFAULT_LOW_FUEL_THRESHOLD_PCT,
        }
    }
}

impl TelemetryConfig {
    pub fn from_json(json: &str) -> Result<Self, TelemetryError> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, TelemetryError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The file at `path` (or defaults), overridden by the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, TelemetryError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.check()?;
        Ok(config)
    }

    /// Reject values no computation can use.
    pub fn check(&self) -> Result<(), TelemetryError> {
        let price = self.scoring.fuel_price_per_liter;
        if !(price.is_finite() && price > 0.0) {
            return Err(TelemetryError::InvalidConfig {
                field: "scoring.fuel_price_per_liter",
                value: price,
            });
        }
        let threshold = self.low_fuel_threshold_pct;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(TelemetryError::InvalidConfig {
                field: "low_fuel_threshold_pct",
                value: threshold,
            });
        }
        Ok(())
    }

    /// Override fields from `lookup`, which maps a variable name to its value.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TELEMETRY_OSRM_URL") {
            self.osrm.base_url = url;
        }
        if let Some(profile) = lookup("TELEMETRY_OSRM_PROFILE") {
            self.osrm.profile = profile;
        }
        override_parsed(&lookup, "TELEMETRY_OSRM_TIMEOUT_SECS", &mut self.osrm.timeout_secs);
        override_parsed(&lookup, "TELEMETRY_FUEL_PRICE", &mut self.scoring.fuel_price_per_liter);
        override_parsed(&lookup, "TELEMETRY_LONG_DISTANCE_M", &mut self.scoring.long_distance_m);
        override_parsed(&lookup, "TELEMETRY_LONG_DURATION_S", &mut self.scoring.long_duration_s);
        override_parsed(&lookup, "TELEMETRY_LOW_FUEL_THRESHOLD", &mut self.low_fuel_threshold_pct);
    }

    pub fn fuel_model(&self) -> FuelModel {
        FuelModel::new(self.low_fuel_threshold_pct)
    }

    pub fn route_scorer(&self) -> RouteScorer {
        RouteScorer::new(self.scoring.clone())
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => tracing::warn!(key, value = %raw, "ignoring unparseable configuration value"),
    }
}
