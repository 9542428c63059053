//! HTTP server module.
//!
//! Plain HTTP only; TLS is expected to terminate at the ingress. The server
//! includes:
//! - Startup bind with fail-fast on address errors
//! - Client address capture for access logs
//! - Graceful shutdown on SIGTERM/SIGINT

mod server;
mod shutdown;

pub use server::{bind, serve, start_server, ServerError};
