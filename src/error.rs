//! Error taxonomy for telemetry processing.

use thiserror::Error;

/// How a front end should surface a [`TelemetryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range input.
    Validation,
    /// Input that would make a computation meaningless (division by zero).
    Precondition,
    /// A local file could not be read.
    Io,
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
    #[error("location {index}: invalid coordinate ({latitude}, {longitude})")]
    InvalidSample {
        index: usize,
        latitude: f64,
        longitude: f64,
    },
    #[error("missing required field `{field}`")]
    MissingField { field: String },
    #[error("fuel level must be within [0, 100], got {0}")]
    InvalidFuelLevel(f64),
    #[error("distance must be a finite non-negative number, got {0}")]
    InvalidDistance(f64),
    #[error("{field} must be greater than zero, got {value}")]
    InvalidProfile { field: &'static str, value: f64 },
    #[error("malformed encoded polyline at byte {0}")]
    MalformedPolyline(usize),
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("invalid configuration: {field} = {value}")]
    InvalidConfig { field: &'static str, value: f64 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TelemetryError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidProfile { .. } => ErrorKind::Precondition,
            Self::Io(_) => ErrorKind::Io,
            _ => ErrorKind::Validation,
        }
    }
}

/// Failure reported by an external collaborator (road snapping, directions).
///
/// Never escapes ingest or route processing; callers fall back instead.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("provider rejected request ({code}): {message}")]
    Rejected { code: String, message: String },
    #[error("malformed provider response: {0}")]
    Malformed(String),
}
