//! Test fixtures for trip-telemetry.
//!
//! Provides realistic test data including:
//! - Real Metro Manila locations (from OpenStreetMap)
//! - Builders for location batches and route candidates

#![allow(dead_code)]

pub mod manila_locations;

pub use manila_locations::*;

use chrono::{DateTime, Duration, TimeZone, Utc};
use trip_telemetry::models::{MotorData, RawLocation, RouteCandidate, RouteLeg};
use trip_telemetry::polyline::Polyline;

/// Fixed trip start so results do not depend on the wall clock.
pub fn trip_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
}

/// Raw samples along `stops`, `interval_secs` apart.
pub fn drive(stops: &[Location], interval_secs: i64) -> Vec<RawLocation> {
    stops
        .iter()
        .enumerate()
        .map(|(i, stop)| {
            RawLocation::at(stop.lat, stop.lng)
                .with_timestamp(trip_start() + Duration::seconds(i as i64 * interval_secs))
        })
        .collect()
}

pub fn motor(efficiency: f64, tank: f64, level: f64) -> MotorData {
    MotorData {
        fuel_efficiency: Some(efficiency),
        fuel_tank: Some(tank),
        current_fuel_level: Some(level),
    }
}

/// Builder for route candidates with sensible defaults.
#[derive(Clone, Debug, Default)]
pub struct TestRoute {
    legs: Vec<RouteLeg>,
    path: Vec<Location>,
    summary: Option<String>,
}

impl TestRoute {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leg(mut self, distance_m: f64, duration_s: f64) -> Self {
        self.legs.push(RouteLeg {
            distance_m,
            duration_s,
            ..RouteLeg::default()
        });
        self
    }

    pub fn leg_in_traffic(mut self, distance_m: f64, duration_s: f64, traffic_s: f64) -> Self {
        self.legs.push(RouteLeg {
            distance_m,
            duration_s,
            traffic_duration_s: Some(traffic_s),
            ..RouteLeg::default()
        });
        self
    }

    pub fn through(mut self, stops: &[Location]) -> Self {
        self.path = stops.to_vec();
        self
    }

    pub fn summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    pub fn build(self) -> RouteCandidate {
        let points = self.path.iter().map(Location::coordinate).collect();
        RouteCandidate {
            legs: self.legs,
            encoded_path: Polyline::new(points).encode(),
            start_address: self.path.first().map(|l| l.name.to_string()).unwrap_or_default(),
            end_address: self.path.last().map(|l| l.name.to_string()).unwrap_or_default(),
            summary: self.summary,
        }
    }
}
