//! Probe endpoints for container orchestration.
//!
//! - `/api/live`: liveness, the process can answer HTTP.
//! - `/api/ready`: readiness. There are no dependencies to check, so this
//!   always succeeds.
//! - `/api/health`: kept for existing clients such as the frontend status widget.

use axum::Json;
use serde::Serialize;

use crate::clock::now_iso8601;

#[derive(Debug, Serialize)]
pub struct ProbeStatus {
    pub status: &'static str,
    pub ts: String,
}

impl ProbeStatus {
    fn now(status: &'static str) -> Self {
        Self {
            status,
            ts: now_iso8601(),
        }
    }
}

/// `GET /api/live`
pub async fn live() -> Json<ProbeStatus> {
    Json(ProbeStatus::now("live"))
}

/// `GET /api/ready`
pub async fn ready() -> Json<ProbeStatus> {
    Json(ProbeStatus::now("ready"))
}

/// `GET /api/health`
pub async fn health() -> Json<ProbeStatus> {
    Json(ProbeStatus::now("healthy"))
}
