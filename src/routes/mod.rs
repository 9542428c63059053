//! HTTP route table and request pipeline.
//!
//! Every request passes through the same fixed stack, outermost first:
//! JSON body parsing, access logging, panic capture, then an exact
//! (method, path) lookup. Anything the table does not match, including a
//! known path with another method, gets the 404 fallback.

pub mod fallback;
pub mod health;
pub mod info;
pub mod message;

use axum::{
    handler::Handler,
    middleware,
    routing::{get, MethodRouter},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::handle_panic;
use crate::middleware::{access_log_layer, json_body_layer};
use crate::state::AppState;

/// Creates the Axum router with all routes and the request pipeline.
pub fn create_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/api/live", get_only(health::live))
        .route("/api/ready", get_only(health::ready))
        .route("/api/health", get_only(health::health))
        .route("/api/info", get_only(info::info))
        .route("/api/message", get_only(message::message))
        .fallback(fallback::not_found)
        .with_state(state);

    with_pipeline(routes)
}

/// Wraps a routed service in the shared middleware stack.
pub fn with_pipeline(routes: Router) -> Router {
    routes
        // Handler panics become the generic 500
        .layer(CatchPanicLayer::custom(handle_panic))
        // Access log wraps dispatch and fallbacks
        .layer(middleware::from_fn(access_log_layer))
        // Body parsing runs first; its failures skip the access log
        .layer(middleware::from_fn(json_body_layer))
}

/// GET (and implicit HEAD) route whose other methods fall through to 404.
fn get_only<H, T>(handler: H) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    get(handler).fallback(fallback::not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use chrono::{DateTime, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app() -> Router {
        create_router(AppState::new(ServiceConfig::default()))
    }

    async fn send(app: Router, method: Method, uri: &str) -> Response {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app.oneshot(req).await.unwrap()
    }

    async fn json_body(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn assert_recent(ts: &Value) {
        let ts = ts.as_str().expect("ts must be a string");
        let parsed = DateTime::parse_from_rfc3339(ts).expect("ts must be ISO-8601");
        let skew = Utc::now().signed_duration_since(parsed.with_timezone(&Utc));
        assert!(skew.num_seconds().abs() < 5, "ts {ts} too far from now");
    }

    #[tokio::test]
    async fn test_probe_routes_report_status_and_timestamp() {
        for (path, status) in [
            ("/api/live", "live"),
            ("/api/ready", "ready"),
            ("/api/health", "healthy"),
        ] {
            let resp = send(test_app(), Method::GET, path).await;
            assert_eq!(resp.status(), StatusCode::OK, "{path}");
            assert_eq!(
                resp.headers()[header::CONTENT_TYPE],
                "application/json",
                "{path}"
            );

            let body = json_body(resp).await;
            assert_eq!(body["status"], status, "{path}");
            assert_recent(&body["ts"]);
            assert_eq!(body.as_object().unwrap().len(), 2, "{path}");
        }
    }

    #[tokio::test]
    async fn test_info_reports_configured_identity() {
        let config = ServiceConfig {
            service_name: "foo".to_string(),
            service_version: "2.0.0".to_string(),
            ..ServiceConfig::default()
        };
        let app = create_router(AppState::new(config));

        let resp = send(app, Method::GET, "/api/info").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            json_body(resp).await,
            json!({ "service": "foo", "version": "2.0.0" })
        );
    }

    #[tokio::test]
    async fn test_message_returns_greeting() {
        let resp = send(test_app(), Method::GET, "/api/message").await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        assert_eq!(body["message"], "Hello from CoBank backend 👋");
        assert_recent(&body["ts"]);
    }

    #[tokio::test]
    async fn test_unknown_path_echoes_path() {
        let resp = send(test_app(), Method::GET, "/api/unknown").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(resp).await,
            json!({ "error": "Not Found", "path": "/api/unknown" })
        );
    }

    #[tokio::test]
    async fn test_not_found_keeps_query_string() {
        let resp = send(test_app(), Method::GET, "/api/unknown?x=1").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(resp).await["path"], "/api/unknown?x=1");
    }

    #[tokio::test]
    async fn test_wrong_method_on_known_path_is_404() {
        let resp = send(test_app(), Method::POST, "/api/live").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(resp).await,
            json!({ "error": "Not Found", "path": "/api/live" })
        );
    }

    #[tokio::test]
    async fn test_paths_match_exactly() {
        for path in ["/api/live/", "/API/LIVE", "/api", "/"] {
            let resp = send(test_app(), Method::GET, path).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
        }
    }

    #[tokio::test]
    async fn test_head_is_served_for_get_routes() {
        let resp = send(test_app(), Method::HEAD, "/api/live").await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_json_body_yields_generic_500() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/message")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{"))
            .unwrap();
        let resp = test_app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(resp.into_body(), 4096).await.unwrap();
        assert_eq!(&bytes[..], br#"{"error":"Internal Server Error"}"#);
    }

    #[tokio::test]
    async fn test_malformed_json_logs_one_error_line_and_no_access_line() {
        let (subscriber, logs) = crate::logging::capture("svc");
        let _guard = tracing::subscriber::set_default(subscriber);

        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/message")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{"))
            .unwrap();
        let resp = test_app().oneshot(req).await.unwrap();
        axum::body::to_bytes(resp.into_body(), 4096).await.unwrap();

        let lines = logs.lines();
        assert_eq!(lines.len(), 1, "unexpected log lines: {lines:?}");
        assert_eq!(lines[0]["level"], "error");
        assert!(lines[0].get("status").is_none());
        assert!(lines[0].get("stack").is_some());
    }

    #[tokio::test]
    async fn test_valid_json_on_unrouted_method_reaches_fallback() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/message")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"hello":"world"}"#))
            .unwrap();
        let resp = test_app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_handler_panic_yields_generic_500() {
        async fn boom() -> &'static str {
            panic!("handler exploded")
        }
        let app = with_pipeline(Router::new().route("/boom", get(boom)));

        let resp = send(app, Method::GET, "/boom").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(resp).await;
        assert_eq!(body, json!({ "error": "Internal Server Error" }));
    }

    #[tokio::test]
    async fn test_repeated_requests_are_structurally_identical() {
        let first = json_body(send(test_app(), Method::GET, "/api/ready").await).await;
        let second = json_body(send(test_app(), Method::GET, "/api/ready").await).await;

        let keys = |v: &Value| v.as_object().unwrap().keys().cloned().collect::<Vec<_>>();
        assert_eq!(keys(&first), keys(&second));
        assert_eq!(first["status"], second["status"]);
    }
}
