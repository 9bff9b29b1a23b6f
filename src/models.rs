//! Shared data model for trips, fuel profiles, and route candidates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TelemetryError;
use crate::polyline::Polyline;

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A telemetry event as received on the wire. Every field is optional so
/// that missing coordinates can be reported with the offending index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
    pub accuracy: Option<f64>,
    /// Reported ground speed in m/s.
    pub speed: Option<f64>,
    /// Reported heading in degrees.
    pub heading: Option<f64>,
}

impl RawLocation {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..Self::default()
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }
}

/// A validated, normalized telemetry sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSample {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub timestamp: DateTime<Utc>,
    pub accuracy: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
}

/// Motor fuel data as received on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotorData {
    /// Kilometres per litre.
    pub fuel_efficiency: Option<f64>,
    /// Tank capacity in litres.
    pub fuel_tank: Option<f64>,
    /// Current fuel level in percent.
    pub current_fuel_level: Option<f64>,
}

/// Fuel level assumed when the caller does not report one.
pub const DEFAULT_FUEL_LEVEL_PCT: f64 = 100.0;

/// A validated motor fuel profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotorFuelProfile {
    pub fuel_efficiency_km_per_l: f64,
    pub tank_capacity_l: f64,
    pub current_fuel_level_pct: f64,
}

impl MotorFuelProfile {
    /// Build a profile, rejecting values that would divide by zero or
    /// produce meaningless percentages.
    pub fn new(
        fuel_efficiency_km_per_l: f64,
        tank_capacity_l: f64,
        current_fuel_level_pct: f64,
    ) -> Result<Self, TelemetryError> {
        let profile = Self {
            fuel_efficiency_km_per_l,
            tank_capacity_l,
            current_fuel_level_pct,
        };
        profile.check()?;
        Ok(profile)
    }

    pub fn check(&self) -> Result<(), TelemetryError> {
        if !(self.fuel_efficiency_km_per_l.is_finite() && self.fuel_efficiency_km_per_l > 0.0) {
            return Err(TelemetryError::InvalidProfile {
                field: "fuelEfficiency",
                value: self.fuel_efficiency_km_per_l,
            });
        }
        if !(self.tank_capacity_l.is_finite() && self.tank_capacity_l > 0.0) {
            return Err(TelemetryError::InvalidProfile {
                field: "fuelTank",
                value: self.tank_capacity_l,
            });
        }
        if !(0.0..=100.0).contains(&self.current_fuel_level_pct) {
            return Err(TelemetryError::InvalidFuelLevel(self.current_fuel_level_pct));
        }
        Ok(())
    }
}

impl TryFrom<&MotorData> for MotorFuelProfile {
    type Error = TelemetryError;

    fn try_from(data: &MotorData) -> Result<Self, Self::Error> {
        let efficiency = data
            .fuel_efficiency
            .ok_or_else(|| TelemetryError::missing("motorData.fuelEfficiency"))?;
        let tank = data
            .fuel_tank
            .ok_or_else(|| TelemetryError::missing("motorData.fuelTank"))?;
        let level = data.current_fuel_level.unwrap_or(DEFAULT_FUEL_LEVEL_PCT);
        Self::new(efficiency, tank, level)
    }
}

/// One leg of a route candidate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLeg {
    pub distance_m: f64,
    /// Free-flow duration in seconds.
    pub duration_s: f64,
    /// Traffic-adjusted duration in seconds, when the provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_duration_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_address: Option<String>,
}

/// An alternative route supplied by a directions provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCandidate {
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
    #[serde(default)]
    pub encoded_path: String,
    #[serde(default)]
    pub start_address: String,
    #[serde(default)]
    pub end_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl RouteCandidate {
    pub fn distance_m(&self) -> f64 {
        self.legs.iter().map(|leg| leg.distance_m).sum()
    }

    pub fn duration_s(&self) -> f64 {
        self.legs.iter().map(|leg| leg.duration_s).sum()
    }

    /// Traffic-adjusted duration. Legs without traffic data contribute
    /// their nominal duration; `None` when no leg carries traffic data.
    pub fn traffic_duration_s(&self) -> Option<f64> {
        if self.legs.iter().all(|leg| leg.traffic_duration_s.is_none()) {
            return None;
        }
        Some(
            self.legs
                .iter()
                .map(|leg| leg.traffic_duration_s.unwrap_or(leg.duration_s))
                .sum(),
        )
    }

    /// Decode the route geometry.
    pub fn path(&self) -> Result<Polyline, TelemetryError> {
        Polyline::decode(&self.encoded_path)
    }
}
