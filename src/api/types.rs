//! API request bodies and response types.
//!
//! Field names match the JSON contract of the grid dashboard.

use serde::{Deserialize, Serialize};

use crate::sim::GridState;

/// `POST /api/control/wind` body.
#[derive(Debug, Deserialize)]
pub struct WindRequest {
    pub wind_speed: f64,
}

/// `POST /api/control/clouds` body.
#[derive(Debug, Deserialize)]
pub struct CloudsRequest {
    pub cloud_cover: f64,
}

/// `POST /api/control/temperature` body.
#[derive(Debug, Deserialize)]
pub struct TemperatureRequest {
    pub temperature: f64,
}

/// `POST /api/control/industrial` body.
#[derive(Debug, Deserialize)]
pub struct IndustrialRequest {
    pub enabled: bool,
}

/// Health check body for `GET /`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'static str,
}

/// Transport status for `GET /api/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub api: &'static str,
    pub simulation: &'static str,
    pub stream: &'static str,
    /// Ticks since the last reset.
    pub total_ticks: u64,
    /// Connected SSE subscribers.
    pub subscribers: usize,
}

/// Acknowledgement for control and scenario endpoints.
///
/// Only the fields touched by the request are populated; the rest are
/// omitted from the JSON.
#[derive(Debug, Default, Serialize)]
pub struct ControlResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_cover: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industrial_enabled: Option<bool>,
}

impl ControlResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok",
            ..Self::default()
        }
    }
}

/// Body for `POST /api/reset`.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Message pushed on the SSE stream.
#[derive(Debug, Serialize)]
pub struct StreamMessage<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: &'a GridState,
}

impl<'a> StreamMessage<'a> {
    pub fn state_update(state: &'a GridState) -> Self {
        Self {
            kind: "state_update",
            data: state,
        }
    }
}

/// Error response body for 4xx/5xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
