//! CoBank demo backend.
//!
//! A small JSON service exposing Kubernetes liveness and readiness probes,
//! service identity, and a sample message endpoint, plus a one-shot health
//! probe client for container health checks.

pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod middleware;
pub mod probe;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
