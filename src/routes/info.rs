//! Service identity endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
}

/// `GET /api/info`: name and version resolved at startup.
pub async fn info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: state.config.service_name.clone(),
        version: state.config.service_version.clone(),
    })
}
