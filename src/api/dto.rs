//! Data Transfer Objects
//!
//! Response types for the API endpoints.

use serde::{Deserialize, Serialize};

/// Map-key success body
#[derive(Debug, Serialize, Deserialize)]
pub struct MapKeyResponse {
    pub key: String,
}

/// Error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "degraded"
    pub status: String,
    /// Whether the map key is configured
    pub map_key: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Service version
    pub version: String,
}
