//! Polyline representation for route geometries.
//!
//! Geometry is held as decoded coordinates. The compact encoded form
//! (Google polyline algorithm, precision 5, as emitted by OSRM and most
//! directions providers) is only produced or parsed at API boundaries.

use serde::{Deserialize, Serialize};

use crate::error::TelemetryError;
use crate::haversine;
use crate::models::Coordinate;

const PRECISION: f64 = 1e5;

/// A polyline representing a route geometry as decoded coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Length along the geometry in meters.
    pub fn length_m(&self) -> f64 {
        haversine::path_length_m(&self.points)
    }

    /// Encode as a precision-5 polyline string.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        let (mut prev_lat, mut prev_lng) = (0_i64, 0_i64);
        for point in &self.points {
            let lat = (point.latitude * PRECISION).round() as i64;
            let lng = (point.longitude * PRECISION).round() as i64;
            encode_value(lat - prev_lat, &mut out);
            encode_value(lng - prev_lng, &mut out);
            prev_lat = lat;
            prev_lng = lng;
        }
        out
    }

    /// Decode a precision-5 polyline string.
    ///
    /// Fails with the byte offset of the offending point when the input is
    /// truncated, contains invalid characters, or decodes out of range.
    pub fn decode(encoded: &str) -> Result<Self, TelemetryError> {
        let bytes = encoded.as_bytes();
        let mut points = Vec::new();
        let mut pos = 0;
        let (mut lat, mut lng) = (0_i64, 0_i64);

        while pos < bytes.len() {
            let start = pos;
            lat = lat
                .checked_add(decode_value(bytes, &mut pos)?)
                .ok_or(TelemetryError::MalformedPolyline(start))?;
            lng = lng
                .checked_add(decode_value(bytes, &mut pos)?)
                .ok_or(TelemetryError::MalformedPolyline(start))?;
            let point = Coordinate::new(lat as f64 / PRECISION, lng as f64 / PRECISION);
            // Decoded points obey the same ranges as any other coordinate.
            if !haversine::validate(point) {
                return Err(TelemetryError::MalformedPolyline(start));
            }
            points.push(point);
        }

        Ok(Self { points })
    }
}

impl From<Vec<Coordinate>> for Polyline {
    fn from(points: Vec<Coordinate>) -> Self {
        Self::new(points)
    }
}

fn encode_value(value: i64, out: &mut String) {
    let mut v = if value < 0 { !(value << 1) } else { value << 1 };
    while v >= 0x20 {
        out.push(char::from((((v & 0x1f) | 0x20) + 63) as u8));
        v >>= 5;
    }
    out.push(char::from((v + 63) as u8));
}

fn decode_value(bytes: &[u8], pos: &mut usize) -> Result<i64, TelemetryError> {
    let mut result = 0_i64;
    let mut shift = 0;
    loop {
        let byte = *bytes
            .get(*pos)
            .ok_or(TelemetryError::MalformedPolyline(*pos))?;
        // Valid chunks are 63..=126; a 64-bit value never needs more than 13.
        if !(63..=126).contains(&byte) || shift > 60 {
            return Err(TelemetryError::MalformedPolyline(*pos));
        }
        *pos += 1;
        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }
    Ok(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}
