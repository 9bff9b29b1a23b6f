//! Collaborator interfaces for external mapping providers.
//!
//! The core never talks to a provider directly. Implementations must bound
//! every call with a timeout so a slow upstream cannot stall a request;
//! callers treat any error as "provider unavailable" and fall back.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::models::{Coordinate, RouteCandidate};

/// Snaps raw GPS coordinates onto the road network.
///
/// Returns exactly one coordinate per input, in input order.
pub trait RoadSnapper: Sync {
    fn snap(&self, coordinates: &[Coordinate]) -> Result<Vec<Coordinate>, ProviderError>;
}

/// Looks up alternative routes between two points.
pub trait DirectionsProvider: Sync {
    fn directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        options: &DirectionsOptions,
    ) -> Result<Vec<RouteCandidate>, ProviderError>;
}

/// Options forwarded to a [`DirectionsProvider`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DirectionsOptions {
    /// Ask for alternative routes in addition to the primary one.
    pub alternatives: bool,
}

impl Default for DirectionsOptions {
    fn default() -> Self {
        Self { alternatives: true }
    }
}

/// Stand-in used when no provider is configured. Always unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProvider;

impl RoadSnapper for NoProvider {
    fn snap(&self, _coordinates: &[Coordinate]) -> Result<Vec<Coordinate>, ProviderError> {
        Err(ProviderError::Unavailable("no road-snapping provider configured".to_string()))
    }
}

impl DirectionsProvider for NoProvider {
    fn directions(
        &self,
        _origin: Coordinate,
        _destination: Coordinate,
        _options: &DirectionsOptions,
    ) -> Result<Vec<RouteCandidate>, ProviderError> {
        Err(ProviderError::Unavailable("no directions provider configured".to_string()))
    }
}
