//! trip-telemetry core
//!
//! Derives traveled distance, fuel state, and route rankings from vehicle
//! trip telemetry. All computation is request-scoped; mapping providers are
//! reached through the collaborator traits in [`traits`].

pub mod config;
pub mod error;
pub mod fuel;
pub mod haversine;
pub mod ingest;
pub mod models;
pub mod osrm;
pub mod polyline;
pub mod scoring;
pub mod service;
pub mod traits;
pub mod trip;
