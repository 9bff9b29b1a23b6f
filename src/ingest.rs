//! Location batch ingestion.
//!
//! Validates and normalizes one trip's ordered batch of raw samples,
//! computes per-segment and cumulative distance, and optionally snaps the
//! trajectory to roads through a [`RoadSnapper`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::TelemetryError;
use crate::haversine;
use crate::models::{Coordinate, LocationSample, RawLocation};
use crate::polyline::Polyline;
use crate::traits::RoadSnapper;

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Timestamp given to samples that arrive without one.
    pub received_at: DateTime<Utc>,
    /// Delegate the trajectory to the road snapper.
    pub snap_to_roads: bool,
}

impl IngestOptions {
    pub fn new(received_at: DateTime<Utc>) -> Self {
        Self {
            received_at,
            snap_to_roads: false,
        }
    }

    pub fn snap_to_roads(mut self, snap: bool) -> Self {
        self.snap_to_roads = snap;
        self
    }
}

/// Distance and timing between two consecutive samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub from_index: usize,
    pub to_index: usize,
    pub distance_m: f64,
    /// Zero when the timestamps run backwards.
    pub duration_s: f64,
    pub bearing_deg: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub samples: Vec<LocationSample>,
    pub segments: Vec<Segment>,
    pub total_distance_m: f64,
    /// `to_index` of every segment whose timestamp went backwards.
    pub non_monotonic: Vec<usize>,
    /// Snapped trajectory, or the raw one when `snapped` is false.
    pub route: Polyline,
    pub snapped: bool,
}

impl IngestReport {
    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.samples.iter().map(|s| s.coordinate).collect()
    }
}

/// Ingest an ordered batch of samples for a single trip.
///
/// Every sample is validated before anything is computed; the first
/// invalid one fails the batch. Snapping failures never fail the batch.
pub fn ingest(
    raw: &[RawLocation],
    options: &IngestOptions,
    snapper: &dyn RoadSnapper,
) -> Result<IngestReport, TelemetryError> {
    let samples = normalize(raw, options.received_at)?;
    let segments = segments(&samples);
    let total_distance_m: f64 = segments.iter().map(|s| s.distance_m).sum();

    let non_monotonic: Vec<usize> = samples
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[1].timestamp < pair[0].timestamp)
        .map(|(i, _)| i + 1)
        .collect();
    if !non_monotonic.is_empty() {
        tracing::warn!(
            count = non_monotonic.len(),
            first = non_monotonic[0],
            "non-monotonic timestamps in location batch"
        );
    }

    let raw_route: Vec<Coordinate> = samples.iter().map(|s| s.coordinate).collect();
    let (route, snapped) = if options.snap_to_roads && raw_route.len() >= 2 {
        snap_or_fallback(snapper, raw_route)
    } else {
        (raw_route, false)
    };

    tracing::debug!(
        points = samples.len(),
        segments = segments.len(),
        total_distance_m,
        snapped,
        "ingested location batch"
    );

    Ok(IngestReport {
        samples,
        segments,
        total_distance_m,
        non_monotonic,
        route: Polyline::new(route),
        snapped,
    })
}

fn normalize(
    raw: &[RawLocation],
    received_at: DateTime<Utc>,
) -> Result<Vec<LocationSample>, TelemetryError> {
    raw.iter()
        .enumerate()
        .map(|(index, location)| {
            let latitude = location
                .latitude
                .ok_or_else(|| TelemetryError::missing(format!("locations[{index}].latitude")))?;
            let longitude = location
                .longitude
                .ok_or_else(|| TelemetryError::missing(format!("locations[{index}].longitude")))?;
            let coordinate = Coordinate::new(latitude, longitude);
            if !haversine::validate(coordinate) {
                return Err(TelemetryError::InvalidSample {
                    index,
                    latitude,
                    longitude,
                });
            }

            Ok(LocationSample {
                coordinate,
                timestamp: location.timestamp.unwrap_or(received_at),
                accuracy: location.accuracy.unwrap_or(0.0),
                speed: location.speed,
                heading: location.heading,
            })
        })
        .collect()
}

fn segments(samples: &[LocationSample]) -> Vec<Segment> {
    samples
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let (from, to) = (&pair[0], &pair[1]);
            let elapsed = (to.timestamp - from.timestamp).num_milliseconds() as f64 / 1000.0;
            Segment {
                from_index: i,
                to_index: i + 1,
                distance_m: haversine::distance_m(from.coordinate, to.coordinate),
                duration_s: elapsed.max(0.0),
                bearing_deg: haversine::bearing_deg(from.coordinate, to.coordinate),
            }
        })
        .collect()
}

fn snap_or_fallback(snapper: &dyn RoadSnapper, raw: Vec<Coordinate>) -> (Vec<Coordinate>, bool) {
    match snapper.snap(&raw) {
        Ok(snapped) if snapped.len() == raw.len() => (snapped, true),
        Ok(snapped) => {
            tracing::warn!(
                expected = raw.len(),
                got = snapped.len(),
                "road snapper returned a mismatched trajectory, using raw points"
            );
            (raw, false)
        }
        Err(err) => {
            tracing::warn!(error = %err, "road snapping failed, using raw points");
            (raw, false)
        }
    }
}
