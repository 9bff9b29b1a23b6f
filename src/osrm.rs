//! OSRM HTTP adapter for road snapping and route alternatives.
//!
//! Snapping uses the `match` service, directions use the `route` service.
//! OSRM reports free-flow durations only, so its legs carry no traffic data.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ProviderError;
use crate::models::{Coordinate, RouteCandidate, RouteLeg};
use crate::traits::{DirectionsOptions, DirectionsProvider, RoadSnapper};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OsrmConfig {
        &self.config
    }

    fn url(&self, service: &str, coordinates: &[Coordinate], query: &str) -> String {
        format!(
            "{}/{}/v1/{}/{}?{}",
            self.config.base_url.trim_end_matches('/'),
            service,
            self.config.profile,
            coordinate_list(coordinates),
            query
        )
    }

    fn fetch<T>(&self, url: String) -> Result<T, ProviderError>
    where
        T: for<'de> Deserialize<'de> + OsrmEnvelope,
    {
        tracing::debug!(%url, "OSRM request");
        // OSRM reports failures as JSON bodies with a non-"Ok" code, often
        // alongside a 4xx status, so the body is parsed before the status.
        let response = self.client.get(url).send()?;
        let status = response.status();
        let body = response.json::<T>()?;
        let (code, message) = body.outcome();
        if code != "Ok" {
            return Err(ProviderError::Rejected {
                code: code.to_string(),
                message: message.unwrap_or_else(|| status.to_string()),
            });
        }
        Ok(body)
    }
}

impl RoadSnapper for OsrmClient {
    fn snap(&self, coordinates: &[Coordinate]) -> Result<Vec<Coordinate>, ProviderError> {
        if coordinates.len() < 2 {
            return Ok(coordinates.to_vec());
        }

        let url = self.url("match", coordinates, "overview=false&geometries=polyline");
        let body: OsrmMatchResponse = self.fetch(url)?;

        if body.tracepoints.len() != coordinates.len() {
            return Err(ProviderError::Malformed(format!(
                "expected {} tracepoints, got {}",
                coordinates.len(),
                body.tracepoints.len()
            )));
        }

        // Unmatched tracepoints come back as null and keep the raw position.
        Ok(body
            .tracepoints
            .into_iter()
            .zip(coordinates)
            .map(|(tracepoint, raw)| match tracepoint {
                Some(tp) => Coordinate::new(tp.location[1], tp.location[0]),
                None => *raw,
            })
            .collect())
    }
}

impl DirectionsProvider for OsrmClient {
    fn directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        options: &DirectionsOptions,
    ) -> Result<Vec<RouteCandidate>, ProviderError> {
        let query = format!(
            "alternatives={}&steps=false&overview=full&geometries=polyline",
            options.alternatives
        );
        let url = self.url("route", &[origin, destination], &query);
        let body: OsrmRouteResponse = self.fetch(url)?;

        let start_address = body
            .waypoints
            .first()
            .map(|wp| wp.name.clone())
            .unwrap_or_default();
        let end_address = body
            .waypoints
            .last()
            .map(|wp| wp.name.clone())
            .unwrap_or_default();

        Ok(body
            .routes
            .into_iter()
            .enumerate()
            .filter_map(|(index, route)| {
                let summary = route
                    .legs
                    .iter()
                    .map(|leg| leg.summary.as_str())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join("; ");
                let candidate = RouteCandidate {
                    legs: route
                        .legs
                        .into_iter()
                        .map(|leg| RouteLeg {
                            distance_m: leg.distance,
                            duration_s: leg.duration,
                            traffic_duration_s: None,
                            start_address: None,
                            end_address: None,
                        })
                        .collect(),
                    encoded_path: route.geometry,
                    start_address: start_address.clone(),
                    end_address: end_address.clone(),
                    summary: (!summary.is_empty()).then_some(summary),
                };
                match candidate.path() {
                    Ok(_) => Some(candidate),
                    Err(err) => {
                        tracing::warn!(index, error = %err, "dropping OSRM route with unreadable geometry");
                        None
                    }
                }
            })
            .collect())
    }
}

fn coordinate_list(coordinates: &[Coordinate]) -> String {
    coordinates
        .iter()
        .map(|c| format!("{:.6},{:.6}", c.longitude, c.latitude))
        .collect::<Vec<_>>()
        .join(";")
}

trait OsrmEnvelope {
    fn outcome(&self) -> (&str, Option<String>);
}

#[derive(Debug, Deserialize)]
struct OsrmMatchResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    tracepoints: Vec<Option<OsrmTracepoint>>,
}

#[derive(Debug, Deserialize)]
struct OsrmTracepoint {
    /// `[longitude, latitude]`
    location: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
    #[serde(default)]
    waypoints: Vec<OsrmWaypoint>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    #[serde(default)]
    geometry: String,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    distance: f64,
    duration: f64,
    #[serde(default)]
    summary: String,
}

#[derive(Debug, Deserialize)]
struct OsrmWaypoint {
    #[serde(default)]
    name: String,
}

impl OsrmEnvelope for OsrmMatchResponse {
    fn outcome(&self) -> (&str, Option<String>) {
        (&self.code, self.message.clone())
    }
}

impl OsrmEnvelope for OsrmRouteResponse {
    fn outcome(&self) -> (&str, Option<String>) {
        (&self.code, self.message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_list_is_lng_lat() {
        let list = coordinate_list(&[Coordinate::new(14.5995, 120.9842), Coordinate::new(1.0, 2.0)]);
        assert_eq!(list, "120.984200,14.599500;2.000000,1.000000");
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let client = OsrmClient::new(OsrmConfig {
            base_url: "http://osrm.local/".to_string(),
            ..OsrmConfig::default()
        })
        .unwrap();
        let url = client.url("route", &[Coordinate::new(1.0, 2.0)], "steps=false");
        assert_eq!(url, "http://osrm.local/route/v1/car/2.000000,1.000000?steps=false");
    }

    #[test]
    fn test_match_response_with_unmatched_tracepoint() {
        let body: OsrmMatchResponse = serde_json::from_str(
            r#"{"code":"Ok","tracepoints":[{"location":[121.0,14.6]},null]}"#,
        )
        .unwrap();
        assert_eq!(body.tracepoints.len(), 2);
        assert!(body.tracepoints[1].is_none());
    }

    #[test]
    fn test_single_point_snap_skips_request() {
        // Unroutable address; a request would fail.
        let client = OsrmClient::new(OsrmConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..OsrmConfig::default()
        })
        .unwrap();
        let point = [Coordinate::new(14.6, 121.0)];
        assert_eq!(client.snap(&point).unwrap(), point.to_vec());
    }
}
