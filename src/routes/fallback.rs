//! Not-found fallback for unmatched method and path pairs.

use axum::{extract::OriginalUri, http::StatusCode, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct NotFound {
    pub error: &'static str,
    pub path: String,
}

/// Echoes the original URL, query string included, back to the caller.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> (StatusCode, Json<NotFound>) {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| uri.path().to_owned());

    (
        StatusCode::NOT_FOUND,
        Json(NotFound {
            error: "Not Found",
            path,
        }),
    )
}
