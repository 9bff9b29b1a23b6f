//! Metro Manila locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap.

use trip_telemetry::models::Coordinate;

/// A named location with coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

pub const MANILA_CITY_HALL: Location = Location::new("Manila City Hall", 14.5995, 120.9842);
pub const SANTA_MESA: Location = Location::new("Santa Mesa", 14.6091, 121.0223);

// ============================================================================
// España Boulevard to Quezon Avenue (northbound commute)
// ============================================================================

pub const ESPANA_COMMUTE: &[Location] = &[
    Location::new("Quiapo Church", 14.5987, 120.9837),
    Location::new("University of Santo Tomas", 14.6096, 120.9894),
    Location::new("España / Lacson", 14.6118, 120.9935),
    Location::new("Welcome Rotonda", 14.6174, 121.0024),
    Location::new("Quezon Avenue / Banawe", 14.6244, 121.0079),
    Location::new("Quezon Avenue / Timog", 14.6372, 121.0215),
    Location::new("Quezon Memorial Circle", 14.6516, 121.0493),
];

// ============================================================================
// Makati / BGC loop
// ============================================================================

pub const MAKATI_LOOP: &[Location] = &[
    Location::new("Ayala Triangle", 14.5565, 121.0233),
    Location::new("Greenbelt", 14.5526, 121.0220),
    Location::new("McKinley Road", 14.5451, 121.0317),
    Location::new("Bonifacio High Street", 14.5509, 121.0509),
    Location::new("Kalayaan Avenue", 14.5622, 121.0414),
    Location::new("Ayala Triangle", 14.5565, 121.0233),
];

// ============================================================================
// Airport runs (long-distance candidates)
// ============================================================================

pub const NAIA_TERMINAL_3: Location = Location::new("NAIA Terminal 3", 14.5203, 121.0163);
pub const CLARK_AIRPORT: Location = Location::new("Clark International Airport", 15.1859, 120.5603);
