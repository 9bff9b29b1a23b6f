//! Request/response surface over the telemetry core.
//!
//! Every call is request-scoped: the service holds configuration and
//! collaborator handles only, never per-trip state.

use std::time::Instant;

use chrono::Utc;
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::TelemetryConfig;
use crate::error::TelemetryError;
use crate::fuel::{FuelModel, FuelState};
use crate::haversine;
use crate::ingest::{self, IngestOptions, Segment};
use crate::models::{Coordinate, LocationSample, MotorData, MotorFuelProfile, RawLocation, RouteCandidate};
use crate::scoring::{RouteAnalysis, RouteScorer};
use crate::traits::{DirectionsOptions, DirectionsProvider, NoProvider, RoadSnapper};
use crate::trip::TripStatistics;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationBatchRequest {
    pub locations: Vec<RawLocation>,
    #[serde(default)]
    pub motor_data: Option<MotorData>,
    /// Meters still to travel, for the trip-completion check.
    #[serde(default)]
    pub remaining_distance: Option<f64>,
    #[serde(default)]
    pub snap_to_roads: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceData {
    pub distances: Vec<Segment>,
    pub total_distance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnappedRoute {
    pub snapped: bool,
    pub points: Vec<Coordinate>,
    pub encoded: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationBatchResponse {
    pub processed_locations: Vec<LocationSample>,
    pub distance_data: DistanceData,
    pub fuel_data: FuelState,
    pub snapped_route: SnappedRoute,
    pub statistics: TripStatistics,
    pub non_monotonic_segments: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatesRequest {
    pub routes: Vec<RouteCandidate>,
    #[serde(default)]
    pub motor_data: Option<MotorData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionsRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    #[serde(default)]
    pub motor_data: Option<MotorData>,
    #[serde(default)]
    pub options: DirectionsOptions,
}

/// Either pre-fetched candidates or an origin/destination pair to look up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteRequest {
    Candidates(CandidatesRequest),
    Directions(DirectionsRequest),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteAnalysisResponse {
    #[serde(flatten)]
    pub analysis: RouteAnalysis,
    /// False when the directions provider could not be reached.
    pub directions_available: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CoordinatePair {
    pub from: Coordinate,
    pub to: Coordinate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceRequest {
    pub pairs: Vec<CoordinatePair>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceResponse {
    pub distances: Vec<f64>,
    pub total_distance: f64,
    pub processing_time_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelRequest {
    /// Meters traveled.
    pub distance: f64,
    pub motor_data: MotorData,
    #[serde(default)]
    pub remaining_distance: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelResponse {
    #[serde(flatten)]
    pub fuel: FuelState,
    pub processing_time_ms: f64,
}

/// A single batch or an array of independent batches.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LocationBatches {
    One(LocationBatchRequest),
    Many(Vec<LocationBatchRequest>),
}

impl LocationBatches {
    pub fn into_vec(self) -> Vec<LocationBatchRequest> {
        match self {
            Self::One(batch) => vec![batch],
            Self::Many(batches) => batches,
        }
    }
}

/// Parse a JSON payload, reporting malformed input as a validation error.
pub fn parse<T: DeserializeOwned>(json: &str) -> Result<T, TelemetryError> {
    Ok(serde_json::from_str(json)?)
}

pub struct TelemetryService {
    fuel: FuelModel,
    scorer: RouteScorer,
    snapper: Box<dyn RoadSnapper>,
    directions: Box<dyn DirectionsProvider>,
}

impl TelemetryService {
    /// A service with no external providers: snapping and directions
    /// always fall back.
    pub fn new(config: &TelemetryConfig) -> Self {
        Self {
            fuel: config.fuel_model(),
            scorer: config.route_scorer(),
            snapper: Box::new(NoProvider),
            directions: Box::new(NoProvider),
        }
    }

    pub fn with_snapper(mut self, snapper: impl RoadSnapper + 'static) -> Self {
        self.snapper = Box::new(snapper);
        self
    }

    pub fn with_directions(mut self, directions: impl DirectionsProvider + 'static) -> Self {
        self.directions = Box::new(directions);
        self
    }

    pub fn process_locations(
        &self,
        request: &LocationBatchRequest,
    ) -> Result<LocationBatchResponse, TelemetryError> {
        let profile = profile_from(request.motor_data.as_ref())?;
        let options = IngestOptions::new(Utc::now()).snap_to_roads(request.snap_to_roads);

        let report = ingest::ingest(&request.locations, &options, self.snapper.as_ref())?;
        let fuel_data =
            self.fuel
                .estimate(report.total_distance_m, profile.as_ref(), request.remaining_distance)?;
        let statistics = TripStatistics::from_report(&report);

        tracing::info!(
            points = statistics.points_processed,
            total_distance_m = report.total_distance_m,
            snapped = report.snapped,
            low_fuel = fuel_data.low_fuel,
            "processed location batch"
        );

        Ok(LocationBatchResponse {
            snapped_route: SnappedRoute {
                snapped: report.snapped,
                encoded: report.route.encode(),
                points: report.route.into_points(),
            },
            distance_data: DistanceData {
                distances: report.segments,
                total_distance: report.total_distance_m,
            },
            processed_locations: report.samples,
            fuel_data,
            statistics,
            non_monotonic_segments: report.non_monotonic,
        })
    }

    /// Process independent trips in parallel. Results keep input order.
    pub fn process_location_batches(
        &self,
        requests: &[LocationBatchRequest],
    ) -> Vec<Result<LocationBatchResponse, TelemetryError>> {
        requests
            .par_iter()
            .map(|request| self.process_locations(request))
            .collect()
    }

    pub fn process_routes(
        &self,
        request: &RouteRequest,
    ) -> Result<RouteAnalysisResponse, TelemetryError> {
        match request {
            RouteRequest::Candidates(req) => {
                let profile = profile_from(req.motor_data.as_ref())?;
                Ok(self.analyze(&req.routes, profile.as_ref()))
            }
            RouteRequest::Directions(req) => {
                haversine::ensure_valid(req.origin)?;
                haversine::ensure_valid(req.destination)?;
                let profile = profile_from(req.motor_data.as_ref())?;

                match self
                    .directions
                    .directions(req.origin, req.destination, &req.options)
                {
                    Ok(candidates) => Ok(self.analyze(&candidates, profile.as_ref())),
                    Err(err) => {
                        tracing::warn!(error = %err, "directions lookup failed, skipping route analysis");
                        Ok(RouteAnalysisResponse {
                            analysis: RouteAnalysis::default(),
                            directions_available: false,
                        })
                    }
                }
            }
        }
    }

    pub fn calculate_distance(
        &self,
        request: &DistanceRequest,
    ) -> Result<DistanceResponse, TelemetryError> {
        let started = Instant::now();
        for pair in &request.pairs {
            haversine::ensure_valid(pair.from)?;
            haversine::ensure_valid(pair.to)?;
        }
        let distances: Vec<f64> = request
            .pairs
            .iter()
            .map(|pair| haversine::distance_m(pair.from, pair.to))
            .collect();

        Ok(DistanceResponse {
            total_distance: distances.iter().sum(),
            distances,
            processing_time_ms: elapsed_ms(started),
        })
    }

    pub fn calculate_fuel(&self, request: &FuelRequest) -> Result<FuelResponse, TelemetryError> {
        let started = Instant::now();
        let profile = MotorFuelProfile::try_from(&request.motor_data)?;
        let fuel = self
            .fuel
            .estimate(request.distance, Some(&profile), request.remaining_distance)?;

        Ok(FuelResponse {
            fuel,
            processing_time_ms: elapsed_ms(started),
        })
    }

    fn analyze(
        &self,
        candidates: &[RouteCandidate],
        profile: Option<&MotorFuelProfile>,
    ) -> RouteAnalysisResponse {
        let analysis = self.scorer.score(candidates, profile);
        tracing::info!(
            candidates = candidates.len(),
            scored = analysis.routes.len(),
            best = ?analysis.best_route,
            "scored route candidates"
        );
        RouteAnalysisResponse {
            analysis,
            directions_available: true,
        }
    }
}

fn profile_from(data: Option<&MotorData>) -> Result<Option<MotorFuelProfile>, TelemetryError> {
    data.map(MotorFuelProfile::try_from).transpose()
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
