//! HTTP server startup logic.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::{ConfigError, ServiceConfig};

use super::shutdown;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Bind the listening socket for the configured address.
///
/// Failing here is fatal for the process; there is no retry.
pub async fn bind(config: &ServiceConfig) -> Result<TcpListener, ServerError> {
    let addr = config.socket_addr()?;
    Ok(TcpListener::bind(addr).await?)
}

/// Start the HTTP server based on configuration.
///
/// This function blocks until the server shuts down.
pub async fn start_server(app: Router, config: &ServiceConfig) -> Result<(), ServerError> {
    let listener = bind(config).await?;

    tracing::info!("Listening on :{}", config.port);

    serve(listener, app, shutdown::shutdown_signal()).await
}

/// Serve `app` on an already-bound listener until `shutdown` resolves.
///
/// In-flight requests are drained before this returns.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(|e| ServerError::Server(e.to_string()))
}
