//! Trip summary statistics.

use serde::Serialize;

use crate::haversine;
use crate::ingest::IngestReport;
use crate::models::LocationSample;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripStatistics {
    #[serde(rename = "totalDistance")]
    pub total_distance_m: f64,
    #[serde(rename = "duration")]
    pub duration_s: f64,
    #[serde(rename = "averageSpeed")]
    pub average_speed_mps: f64,
    /// Highest speed reported by any sample.
    #[serde(rename = "maxSpeed", skip_serializing_if = "Option::is_none")]
    pub max_speed_mps: Option<f64>,
    pub points_processed: usize,
}

impl TripStatistics {
    pub fn from_samples(samples: &[LocationSample]) -> Self {
        let points: Vec<_> = samples.iter().map(|s| s.coordinate).collect();
        Self::fold(samples, haversine::path_length_m(&points))
    }

    /// Reuses the cumulative distance the ingestor already computed.
    pub fn from_report(report: &IngestReport) -> Self {
        Self::fold(&report.samples, report.total_distance_m)
    }

    pub fn average_speed_kmh(&self) -> f64 {
        self.average_speed_mps * 3.6
    }

    fn fold(samples: &[LocationSample], distance_m: f64) -> Self {
        let max_speed_mps = samples
            .iter()
            .filter_map(|s| s.speed)
            .filter(|speed| speed.is_finite())
            .reduce(f64::max);

        let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
            return Self::default();
        };
        if samples.len() < 2 {
            return Self {
                max_speed_mps,
                points_processed: samples.len(),
                ..Self::default()
            };
        }

        let duration_s =
            ((last.timestamp - first.timestamp).num_milliseconds() as f64 / 1000.0).max(0.0);
        let average_speed_mps = if duration_s > 0.0 {
            distance_m / duration_s
        } else {
            0.0
        };

        Self {
            total_distance_m: distance_m,
            duration_s,
            average_speed_mps,
            max_speed_mps,
            points_processed: samples.len(),
        }
    }
}
