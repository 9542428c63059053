//! Terminal error handling for the request pipeline.
//!
//! Every fault raised while handling a request ends up here and is turned
//! into the same information-minimal response. Diagnostics are logged
//! server-side only.

use std::any::Any;
use std::panic::Location;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Client-visible body for every fault.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("request entity too large (limit {limit} bytes)")]
    PayloadTooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    BodyRead(#[source] axum::Error),

    #[error("malformed JSON body: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("JSON body must be an object or an array")]
    NotComposite,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(stack = ?self, "{}", self);
        internal_error_response()
    }
}

fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": INTERNAL_ERROR_MESSAGE })),
    )
        .into_response()
}

/// Converts a caught handler panic into the standard error response.
///
/// Installed through `CatchPanicLayer::custom`. The panic itself has already
/// been logged by the hook from [`install_panic_hook`].
pub fn handle_panic(_payload: Box<dyn Any + Send + 'static>) -> Response {
    internal_error_response()
}

/// Replaces the default panic hook so panics are logged as a single
/// structured error line instead of free-form stderr text.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        report_panic(info.payload(), info.location());
    }));
}

fn report_panic(payload: &(dyn Any + Send), location: Option<&Location<'_>>) {
    let message = panic_message(payload);
    let stack = location.map(ToString::to_string);
    tracing::error!(stack = stack.as_deref(), "panicked: {message}");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unhandled error".to_string()
    }
}
