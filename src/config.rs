//! Configuration and constants.
//!
//! The service is configured entirely from the command line and the process
//! environment (`PORT`, `SERVICE_NAME`, `SERVICE_VERSION`). `ServiceConfig` is
//! resolved once at startup and shared read-only with every handler.

use std::net::{IpAddr, SocketAddr};

use clap::ValueEnum;

// =============================================================================
// Service Identity
// =============================================================================

/// Default listening port
pub const DEFAULT_PORT: u16 = 3000;

/// Default bind address (all interfaces, for container networking)
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default service identifier used in logs and `/api/info`
pub const DEFAULT_SERVICE_NAME: &str = "cobank-backend";

/// Default version string reported by `/api/info`
pub const DEFAULT_SERVICE_VERSION: &str = "1.0.0";

// =============================================================================
// Request Handling Limits
// =============================================================================

/// Maximum accepted JSON request body (1 MiB)
pub const MAX_JSON_BODY_BYTES: usize = 1024 * 1024;

// =============================================================================
// Logging
// =============================================================================

/// Default log filter when neither `--log-level` nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "cobank_backend=info";

/// Default log format
pub const DEFAULT_LOG_FORMAT: LogFormat = LogFormat::Json;

// =============================================================================
// Probe
// =============================================================================

/// Path polled by the `check` subcommand
pub const HEALTH_PATH: &str = "/api/health";

/// Overall request timeout for the `check` subcommand
pub const PROBE_TIMEOUT_SECS: u64 = 5;

/// Process-wide service configuration.
///
/// Flattened into the CLI so every field can come from a flag or from the
/// environment variable named alongside it.
#[derive(Debug, Clone, PartialEq, Eq, clap::Args)]
pub struct ServiceConfig {
    /// Service identifier included in logs and `/api/info`
    #[arg(long, env = "SERVICE_NAME", default_value = DEFAULT_SERVICE_NAME)]
    pub service_name: String,

    /// Version string reported by `/api/info`
    #[arg(long, env = "SERVICE_VERSION", default_value = DEFAULT_SERVICE_VERSION)]
    pub service_version: String,

    /// Address to bind
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Listening port
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            service_version: DEFAULT_SERVICE_VERSION.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServiceConfig {
    /// Resolve the address the HTTP server binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.host.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Base URL a local probe should use to reach this service.
    pub fn local_base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One flat JSON object per line
    Json,
    /// Human-readable output for local development
    Text,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid bind host: {0}")]
    InvalidHost(String),
}
