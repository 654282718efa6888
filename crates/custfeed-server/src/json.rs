//! JSON response types for the HTTP API.

use serde::Serialize;

/// A customer row as returned by `/api/customers`.
#[derive(Debug, Serialize)]
pub struct CustomerJson {
    /// Customer name.
    pub name: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Whether the store answered a round-trip query.
    pub store_connected: bool,
    /// Number of currently connected stream clients.
    pub active_streams: usize,
}
