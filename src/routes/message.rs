//! Sample business endpoint.

use axum::Json;
use serde::Serialize;

use crate::clock::now_iso8601;

pub const GREETING: &str = "Hello from CoBank backend 👋";

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
    pub ts: String,
}

/// `GET /api/message`
pub async fn message() -> Json<Message> {
    Json(Message {
        message: GREETING,
        ts: now_iso8601(),
    })
}
