//! Great-circle geometry on a spherical Earth.
//!
//! Every component that needs a distance or bearing calls into this module.
//! None of these functions validate their input; validation is an explicit
//! step applied by the ingestors via [`validate`] / [`ensure_valid`].

use crate::error::TelemetryError;
use crate::models::Coordinate;

/// Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two points in meters.
pub fn distance_m(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push h marginally past 1 for antipodal points.
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Initial great-circle bearing from `a` to `b`, in degrees within [0, 360).
pub fn bearing_deg(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let y = delta_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();

    let bearing = y.atan2(x).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if bearing >= 360.0 { 0.0 } else { bearing }
}

/// Sum of consecutive distances along a path, in meters.
pub fn path_length_m(points: &[Coordinate]) -> f64 {
    points.windows(2).map(|w| distance_m(w[0], w[1])).sum()
}

/// Latitude/longitude range check. Non-finite values are invalid.
pub fn validate(coord: Coordinate) -> bool {
    coord.latitude.is_finite()
        && coord.longitude.is_finite()
        && (-90.0..=90.0).contains(&coord.latitude)
        && (-180.0..=180.0).contains(&coord.longitude)
}

pub fn ensure_valid(coord: Coordinate) -> Result<(), TelemetryError> {
    if validate(coord) {
        Ok(())
    } else {
        Err(TelemetryError::InvalidCoordinate {
            latitude: coord.latitude,
            longitude: coord.longitude,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANILA_A: Coordinate = Coordinate::new(14.5995, 120.9842);
    const MANILA_B: Coordinate = Coordinate::new(14.6091, 121.0223);

    #[test]
    fn test_same_point() {
        assert_eq!(distance_m(MANILA_A, MANILA_A), 0.0);
    }

    #[test]
    fn test_manila_known_distance() {
        // Δlat 0.0096° ≈ 1067m, Δlng 0.0381° at 14.6°N ≈ 4100m.
        let dist = distance_m(MANILA_A, MANILA_B);
        assert!((dist - 4236.3).abs() < 1.0, "Manila pair should be ~4236m, got {}", dist);
    }

    #[test]
    fn test_las_vegas_to_los_angeles() {
        let dist = distance_m(Coordinate::new(36.17, -115.14), Coordinate::new(34.05, -118.24));
        assert!(dist > 350_000.0 && dist < 400_000.0, "LV to LA should be ~370km, got {}", dist);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = Coordinate::new(0.0, 0.0);
        assert!((bearing_deg(origin, Coordinate::new(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((bearing_deg(origin, Coordinate::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((bearing_deg(origin, Coordinate::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((bearing_deg(origin, Coordinate::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_validate_ranges() {
        assert!(validate(Coordinate::new(90.0, 180.0)));
        assert!(validate(Coordinate::new(-90.0, -180.0)));
        assert!(!validate(Coordinate::new(90.0001, 0.0)));
        assert!(!validate(Coordinate::new(0.0, -180.5)));
        assert!(!validate(Coordinate::new(f64::NAN, 0.0)));
    }

    #[test]
    fn test_ensure_valid_reports_coordinate() {
        let err = ensure_valid(Coordinate::new(95.0, 10.0)).unwrap_err();
        assert!(matches!(
            err,
            TelemetryError::InvalidCoordinate { latitude, .. } if latitude == 95.0
        ));
    }

    #[test]
    fn test_path_length_short_paths() {
        assert_eq!(path_length_m(&[]), 0.0);
        assert_eq!(path_length_m(&[MANILA_A]), 0.0);
        assert_eq!(path_length_m(&[MANILA_A, MANILA_B]), distance_m(MANILA_A, MANILA_B));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn valid_coord() -> impl Strategy<Value = Coordinate> {
            (-90.0..=90.0, -180.0..=180.0).prop_map(|(lat, lng)| Coordinate::new(lat, lng))
        }

        proptest! {
            #[test]
            fn prop_distance_symmetric(a in valid_coord(), b in valid_coord()) {
                prop_assert!((distance_m(a, b) - distance_m(b, a)).abs() < 1e-6);
            }

            #[test]
            fn prop_distance_identity(a in valid_coord()) {
                prop_assert_eq!(distance_m(a, a), 0.0);
            }

            #[test]
            fn prop_distance_bounded(a in valid_coord(), b in valid_coord()) {
                let dist = distance_m(a, b);
                prop_assert!(dist >= 0.0);
                prop_assert!(dist <= std::f64::consts::PI * EARTH_RADIUS_M + 1.0);
            }

            #[test]
            fn prop_bearing_in_range(a in valid_coord(), b in valid_coord()) {
                let bearing = bearing_deg(a, b);
                prop_assert!((0.0..360.0).contains(&bearing));
            }
        }
    }
}
