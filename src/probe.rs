//! One-shot backend health probe.
//!
//! Mirrors the frontend status widget: a single `GET /api/health` with cache
//! bypass, rendered as `Backend: <status> (<ts>)` on success or
//! `Backend: unreachable` on any failure. No retries, no polling.

use std::fmt;
use std::time::Duration;

use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use serde_json::Value;

use crate::config::{HEALTH_PATH, PROBE_TIMEOUT_SECS};

/// Fields read from the health response. Anything else is ignored.
///
/// Kept as raw JSON values so a backend reporting e.g. a numeric status is
/// still rendered rather than treated as unreachable.
#[derive(Debug, Deserialize)]
struct HealthBody {
    status: Option<Value>,
    ts: Option<Value>,
    timestamp: Option<Value>,
}

/// Outcome of a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Reachable { status: String, ts: String },
    Unreachable,
}

impl BackendStatus {
    pub fn is_reachable(&self) -> bool {
        matches!(self, BackendStatus::Reachable { .. })
    }
}

impl HealthBody {
    fn into_status(self) -> BackendStatus {
        let ts = [self.ts, self.timestamp]
            .into_iter()
            .flatten()
            .find(is_truthy)
            .map_or_else(|| "now".to_string(), |t| render(&t));

        BackendStatus::Reachable {
            status: self
                .status
                .map_or_else(|| "unknown".to_string(), |s| render(&s)),
            ts,
        }
    }
}

/// Strings verbatim, every other value as its JSON text.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `null`, `false`, zero and the empty string do not count as a timestamp.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendStatus::Reachable { status, ts } => write!(f, "Backend: {status} ({ts})"),
            BackendStatus::Unreachable => f.write_str("Backend: unreachable"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),
}

/// HTTP client for probing a backend directly, bypassing any configured proxy.
pub fn build_client() -> Result<reqwest::Client, ProbeError> {
    Ok(reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
        .build()?)
}

/// Probe `base_url` once. Failures are logged as warnings and reported as unreachable.
pub async fn check_backend(client: &reqwest::Client, base_url: &str) -> BackendStatus {
    match fetch_health(client, base_url).await {
        Ok(body) => body.into_status(),
        Err(e) => {
            tracing::warn!(error = %e, url = %base_url, "Backend health check failed");
            BackendStatus::Unreachable
        }
    }
}

async fn fetch_health(client: &reqwest::Client, base_url: &str) -> Result<HealthBody, ProbeError> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), HEALTH_PATH);
    let response = client
        .get(&url)
        .header(CACHE_CONTROL, "no-store")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(ProbeError::Status(response.status()));
    }

    Ok(response.json::<HealthBody>().await?)
}
