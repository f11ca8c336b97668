//! Integration tests for the home page against a local Service A stand-in.
//!
//! Each test starts an axum server on an ephemeral loopback port that plays
//! Service A, then drives either `DataFetchHandler` or the full router.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::{routing::get, Json, Router};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tower::ServiceExt;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use service_b::api::{create_router, AppState};
use service_b::config::Config;
use service_b::upstream::{ServiceAClient, UpstreamAddress};
use service_b::view::{DataFetchHandler, Templates};

/// Counts ERROR events seen by the current thread's subscriber.
#[derive(Clone, Default)]
struct ErrorCounter(Arc<AtomicUsize>);

impl ErrorCounter {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Install an error counter for the rest of the test.
fn count_errors() -> (ErrorCounter, tracing::subscriber::DefaultGuard) {
    let counter = ErrorCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (counter, guard)
}

/// Serve `router` as Service A and return the port it listens on.
async fn spawn_service_a(router: Router) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    port
}

/// A loopback port with nothing listening.
async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn data_route(body: Value) -> Router {
    Router::new().route("/api/data/", get(move || async move { Json(body) }))
}

fn status_route(status: StatusCode) -> Router {
    Router::new().route("/api/data/", get(move || async move { (status, "error") }))
}

fn handler_for(port: u16, timeout: Duration) -> DataFetchHandler {
    DataFetchHandler::new(
        ServiceAClient::new(timeout).unwrap(),
        UpstreamAddress::new("127.0.0.1").with_port(port),
    )
}

fn app_for(port: u16, timeout: Duration) -> Router {
    let config = Config::from_vars([("SERVICE_A_HOST", "127.0.0.1")]).unwrap();
    let state = AppState::new(
        config,
        ServiceAClient::new(timeout).unwrap(),
        Templates::builtin().unwrap(),
    )
    .with_upstream_port(port);
    create_router(state)
}

async fn get_home(app: Router) -> (StatusCode, Option<String>, String) {
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn successful_fetch_passes_payload_through() {
    let (errors, _guard) = count_errors();
    let body = json!({"items": ["a", "b"], "source": "service-a", "meta": {"page": 1}});
    let port = spawn_service_a(data_route(body.clone())).await;

    let context = handler_for(port, Duration::from_secs(5)).context().await;

    assert_eq!(serde_json::to_value(&context.data).unwrap(), body);
    assert_eq!(errors.count(), 0);
}

#[tokio::test]
async fn home_page_lists_items() {
    let (errors, _guard) = count_errors();
    let port = spawn_service_a(data_route(json!({"items": ["a", "b"]}))).await;

    let (status, content_type, html) = get_home(app_for(port, Duration::from_secs(5))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(html.contains("<li>a</li>"));
    assert!(html.contains("<li>b</li>"));
    assert!(!html.contains("No items available."));
    assert_eq!(errors.count(), 0);
}

#[tokio::test]
async fn non_list_items_render_empty_page() {
    for body in [
        json!({"items": 5}),
        json!({"items": {"k": "v"}}),
        json!({"items": "abc"}),
        json!({"other": 1}),
    ] {
        let port = spawn_service_a(data_route(body.clone())).await;

        let (status, _, html) = get_home(app_for(port, Duration::from_secs(5))).await;

        assert_eq!(status, StatusCode::OK, "payload {}", body);
        assert!(html.contains("No items available."), "payload {}", body);
    }
}

#[tokio::test]
async fn failed_fetch_is_counted_by_kind() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    let _metrics = metrics::set_default_local_recorder(&recorder);

    let port = spawn_service_a(status_route(StatusCode::NOT_FOUND)).await;
    handler_for(port, Duration::from_secs(5)).context().await;

    assert!(handle
        .render()
        .contains(r#"upstream_fetch_failures_total{kind="upstream_status"} 1"#));
}

#[tokio::test]
async fn items_are_html_escaped() {
    let port = spawn_service_a(data_route(json!({"items": ["<script>x</script>"]}))).await;

    let (_, _, html) = get_home(app_for(port, Duration::from_secs(5))).await;

    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn not_found_falls_back_and_logs_once() {
    let (errors, _guard) = count_errors();
    let port = spawn_service_a(status_route(StatusCode::NOT_FOUND)).await;

    let context = handler_for(port, Duration::from_secs(5)).context().await;

    assert_eq!(serde_json::to_value(&context.data).unwrap(), json!({"items": []}));
    assert_eq!(errors.count(), 1);
}

#[tokio::test]
async fn server_error_falls_back_and_logs_once() {
    let (errors, _guard) = count_errors();
    let port = spawn_service_a(status_route(StatusCode::INTERNAL_SERVER_ERROR)).await;

    let context = handler_for(port, Duration::from_secs(5)).context().await;

    assert_eq!(serde_json::to_value(&context.data).unwrap(), json!({"items": []}));
    assert_eq!(errors.count(), 1);
}

#[tokio::test]
async fn refused_connection_falls_back_and_logs_once() {
    let (errors, _guard) = count_errors();
    let port = closed_port().await;

    let context = handler_for(port, Duration::from_secs(5)).context().await;

    assert_eq!(serde_json::to_value(&context.data).unwrap(), json!({"items": []}));
    assert_eq!(errors.count(), 1);
}

#[tokio::test]
async fn slow_upstream_falls_back_and_logs_once() {
    let (errors, _guard) = count_errors();
    let port = spawn_service_a(Router::new().route(
        "/api/data/",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"items": ["late"]}))
        }),
    ))
    .await;

    let context = handler_for(port, Duration::from_millis(200)).context().await;

    assert_eq!(serde_json::to_value(&context.data).unwrap(), json!({"items": []}));
    assert_eq!(errors.count(), 1);
}

#[tokio::test]
async fn malformed_body_falls_back_and_logs_once() {
    let (errors, _guard) = count_errors();
    let port = spawn_service_a(
        Router::new().route("/api/data/", get(|| async { "definitely not json" })),
    )
    .await;

    let context = handler_for(port, Duration::from_secs(5)).context().await;

    assert_eq!(serde_json::to_value(&context.data).unwrap(), json!({"items": []}));
    assert_eq!(errors.count(), 1);
}

#[tokio::test]
async fn home_page_degrades_to_empty_list_with_200() {
    let port = closed_port().await;

    let (status, _, html) = get_home(app_for(port, Duration::from_secs(5))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("No items available."));
}

#[tokio::test]
async fn repeated_requests_render_identically() {
    let port = spawn_service_a(data_route(json!({"items": ["a", "b"]}))).await;
    let app = app_for(port, Duration::from_secs(5));

    let (_, _, first) = get_home(app.clone()).await;
    let (_, _, second) = get_home(app).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn repeated_fallbacks_render_identically() {
    let port = closed_port().await;
    let app = app_for(port, Duration::from_secs(5));

    let (_, _, first) = get_home(app.clone()).await;
    let (_, _, second) = get_home(app).await;

    assert_eq!(first, second);
}

#[test]
fn alt_host_resolves_through_app_state() {
    let config = Config::from_vars([("SERVICE_A_HOST", "alt-host")]).unwrap();
    let state = AppState::new(
        config,
        ServiceAClient::with_default_timeout().unwrap(),
        Templates::builtin().unwrap(),
    );

    assert_eq!(state.upstream_address().url(), "http://alt-host:8000/api/data/");
}
