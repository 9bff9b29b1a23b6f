//! Fuel-state modeling from traveled distance and a motor fuel profile.
//!
//! Distances are meters everywhere in the crate; profile efficiency is
//! kilometres per litre, so conversion happens here and nowhere else.

use serde::Serialize;

use crate::error::TelemetryError;
use crate::models::MotorFuelProfile;

/// Remaining fuel percentage below which `low_fuel` is raised.
pub const DEFAULT_LOW_FUEL_THRESHOLD_PCT: f64 = 20.0;

const METERS_PER_KM: f64 = 1000.0;

/// Fuel state after a distance has been traveled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelState {
    #[serde(rename = "fuelConsumed")]
    pub fuel_consumed_l: f64,
    #[serde(rename = "fuelConsumedPercentage")]
    pub fuel_consumed_pct: f64,
    /// Tank level after the distance; `None` when untracked.
    #[serde(rename = "newFuelLevel", skip_serializing_if = "Option::is_none")]
    pub remaining_fuel_pct: Option<f64>,
    /// Range left on the remaining fuel, in meters; `None` when untracked.
    #[serde(rename = "remainingDistance", skip_serializing_if = "Option::is_none")]
    pub remaining_range_m: Option<f64>,
    pub low_fuel: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip_can_complete: Option<bool>,
    /// False for the neutral state returned when no profile is known.
    pub tracked: bool,
}

impl FuelState {
    /// Zero consumption and no level or range; used when fuel tracking is
    /// not requested.
    pub fn neutral() -> Self {
        Self {
            fuel_consumed_l: 0.0,
            fuel_consumed_pct: 0.0,
            remaining_fuel_pct: None,
            remaining_range_m: None,
            low_fuel: false,
            trip_can_complete: None,
            tracked: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelModel {
    pub low_fuel_threshold_pct: f64,
}

impl Default for FuelModel {
    fn default() -> Self {
        Self {
            low_fuel_threshold_pct: DEFAULT_LOW_FUEL_THRESHOLD_PCT,
        }
    }
}

impl FuelModel {
    pub fn new(low_fuel_threshold_pct: f64) -> Self {
        Self {
            low_fuel_threshold_pct,
        }
    }

    /// Derive the fuel state after `distance_m` meters.
    ///
    /// `remaining_trip_m`, when known, decides `trip_can_complete`.
    pub fn estimate(
        &self,
        distance_m: f64,
        profile: Option<&MotorFuelProfile>,
        remaining_trip_m: Option<f64>,
    ) -> Result<FuelState, TelemetryError> {
        check_distance(distance_m)?;
        let Some(profile) = profile else {
            return Ok(FuelState::neutral());
        };
        profile.check()?;
        if let Some(remaining) = remaining_trip_m {
            check_distance(remaining)?;
        }

        let fuel_consumed_l = fuel_liters(distance_m, Some(profile));
        let fuel_consumed_pct = fuel_consumed_l / profile.tank_capacity_l * 100.0;
        let remaining_fuel_pct = (profile.current_fuel_level_pct - fuel_consumed_pct).max(0.0);
        let remaining_range_m = remaining_fuel_pct
            * profile.tank_capacity_l
            * profile.fuel_efficiency_km_per_l
            / 100.0
            * METERS_PER_KM;

        let low_fuel = remaining_fuel_pct < self.low_fuel_threshold_pct;
        if low_fuel {
            tracing::debug!(remaining_fuel_pct, "fuel below threshold");
        }

        Ok(FuelState {
            fuel_consumed_l,
            fuel_consumed_pct,
            remaining_fuel_pct: Some(remaining_fuel_pct),
            remaining_range_m: Some(remaining_range_m),
            low_fuel,
            trip_can_complete: remaining_trip_m.map(|needed| remaining_range_m >= needed),
            tracked: true,
        })
    }
}

/// Litres needed to cover `distance_m`; zero without a profile.
///
/// Expects a checked profile.
pub fn fuel_liters(distance_m: f64, profile: Option<&MotorFuelProfile>) -> f64 {
    profile.map_or(0.0, |p| distance_m / METERS_PER_KM / p.fuel_efficiency_km_per_l)
}

pub fn fuel_cost(liters: f64, price_per_liter: f64) -> f64 {
    liters * price_per_liter
}

fn check_distance(distance_m: f64) -> Result<(), TelemetryError> {
    if distance_m.is_finite() && distance_m >= 0.0 {
        Ok(())
    } else {
        Err(TelemetryError::InvalidDistance(distance_m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn profile(efficiency: f64, tank: f64, level: f64) -> MotorFuelProfile {
        MotorFuelProfile {
            fuel_efficiency_km_per_l: efficiency,
            tank_capacity_l: tank,
            current_fuel_level_pct: level,
        }
    }

    #[test]
    fn test_fifteen_km_at_thirty_km_per_liter() {
        let state = FuelModel::default()
            .estimate(15_000.0, Some(&profile(30.0, 10.0, 80.0)), None)
            .unwrap();
        assert!((state.fuel_consumed_l - 0.5).abs() < 1e-9);
        assert!((state.fuel_consumed_pct - 5.0).abs() < 1e-9);
        assert!((state.remaining_fuel_pct.unwrap() - 75.0).abs() < 1e-9);
        // 7.5 L left at 30 km/L
        assert!((state.remaining_range_m.unwrap() - 225_000.0).abs() < 1e-6);
        assert!(!state.low_fuel);
        assert!(state.tracked);
    }

    #[test]
    fn test_remaining_clamped_at_zero() {
        let state = FuelModel::default()
            .estimate(1_000_000.0, Some(&profile(10.0, 20.0, 50.0)), Some(1.0))
            .unwrap();
        assert_eq!(state.remaining_fuel_pct, Some(0.0));
        assert_eq!(state.remaining_range_m, Some(0.0));
        assert!(state.low_fuel);
        assert_eq!(state.trip_can_complete, Some(false));
    }

    #[test]
    fn test_zero_efficiency_rejected() {
        let err = FuelModel::default()
            .estimate(15_000.0, Some(&profile(0.0, 10.0, 80.0)), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
    }

    #[test]
    fn test_negative_tank_rejected() {
        let err = FuelModel::default()
            .estimate(15_000.0, Some(&profile(12.0, -1.0, 80.0)), None)
            .unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidProfile { field: "fuelTank", .. }));
    }

    #[test]
    fn test_absent_profile_is_neutral() {
        let state = FuelModel::default().estimate(15_000.0, None, Some(10.0)).unwrap();
        assert_eq!(state, FuelState::neutral());

        let value = serde_json::to_value(state).unwrap();
        assert!(value.get("newFuelLevel").is_none());
        assert!(value.get("remainingDistance").is_none());
        assert_eq!(value["tracked"], serde_json::json!(false));
        assert_eq!(value["lowFuel"], serde_json::json!(false));
    }

    #[test]
    fn test_negative_distance_rejected() {
        let err = FuelModel::default()
            .estimate(-5.0, Some(&profile(12.0, 40.0, 80.0)), None)
            .unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidDistance(_)));
    }

    #[test]
    fn test_trip_completion_flag() {
        let model = FuelModel::default();
        let p = profile(10.0, 40.0, 50.0); // 20 L left, 200 km range
        let ok = model.estimate(0.0, Some(&p), Some(200_000.0)).unwrap();
        assert_eq!(ok.trip_can_complete, Some(true));
        let short = model.estimate(0.0, Some(&p), Some(200_001.0)).unwrap();
        assert_eq!(short.trip_can_complete, Some(false));
    }

    #[test]
    fn test_custom_threshold() {
        let p = profile(10.0, 40.0, 30.0);
        assert!(!FuelModel::default().estimate(0.0, Some(&p), None).unwrap().low_fuel);
        assert!(FuelModel::new(35.0).estimate(0.0, Some(&p), None).unwrap().low_fuel);
    }

    #[test]
    fn test_fuel_cost() {
        assert_eq!(fuel_liters(15_000.0, None), 0.0);
        assert!((fuel_cost(0.5, 60.0) - 30.0).abs() < 1e-9);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_remaining_non_increasing(
                efficiency in 0.1..50.0f64,
                tank in 1.0..200.0f64,
                level in 0.0..=100.0f64,
                d1 in 0.0..2_000_000.0f64,
                extra in 0.0..2_000_000.0f64,
            ) {
                let model = FuelModel::default();
                let p = profile(efficiency, tank, level);
                let near = model.estimate(d1, Some(&p), None).unwrap();
                let far = model.estimate(d1 + extra, Some(&p), None).unwrap();
                let (near_pct, far_pct) = (near.remaining_fuel_pct.unwrap(), far.remaining_fuel_pct.unwrap());
                prop_assert!(far_pct <= near_pct);
                prop_assert!(far_pct >= 0.0);
                prop_assert!(far.remaining_range_m.unwrap() >= 0.0);
            }
        }
    }
}
