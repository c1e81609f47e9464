//! HttpSource tests against a local axum server standing in for the
//! processing, analyzer and consistency-check services.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::RawQuery,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;

use trackwatch::{
    report, App, ConsistencyMode, DashboardApi, Dispatcher, EventKind, HttpSource, Settings,
    SourceError, StatsSnapshot,
};

fn backend() -> Router {
    Router::new()
        .route(
            "/processing/stats",
            get(|| async {
                Json(json!({
                    "num_gps_events": 1200,
                    "num_alert_events": 35,
                    "max_alerts_per_day": 12,
                    "last_updated": "2025-03-01T12:00:00+00:00"
                }))
            }),
        )
        .route(
            "/analyzer/stats",
            get(|| async { Json(json!({"num_gps_events": 80, "num_alert_events": 4})) }),
        )
        .route(
            "/analyzer/track/locations",
            get(|RawQuery(query): RawQuery| async move {
                Json(json!({"device_id": "truck-7", "query": query.unwrap_or_default()}))
            }),
        )
        .route(
            "/analyzer/track/alerts",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"message": "No TrackAlerts message at index 9"})),
                )
            }),
        )
        .route(
            "/consistency_check/checks",
            get(|| async {
                Json(json!({
                    "last_updated": "2025-03-01T12:00:00+00:00",
                    "counts": {
                        "db": {"alerts": 10, "gps": 5},
                        "queue": {"alerts": 7, "gps": 9},
                        "processing": {"alerts": 10, "gps": 5}
                    },
                    "not_in_queue": [{"trace_id": "x"}]
                }))
            }),
        )
        .route(
            "/consistency_check/update",
            post(|| async { Json(json!({"processing_time_ms": 42})) }),
        )
        .route("/broken/stats", get(|| async { "<html>oops</html>" }))
        .route(
            "/slow/stats",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({}))
            }),
        )
}

async fn spawn_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, backend()).await.unwrap();
    });
    addr
}

fn settings_for(addr: SocketAddr) -> Settings {
    Settings {
        base_host: addr.to_string(),
        ..Settings::default()
    }
}

fn source_for(addr: SocketAddr) -> HttpSource {
    HttpSource::from_settings(&settings_for(addr)).unwrap()
}

#[tokio::test]
async fn test_processing_stats_snapshot() {
    let addr = spawn_backend().await;
    let source = source_for(addr);

    let stats = source.processing_stats().await.unwrap();
    let snapshot = StatsSnapshot::from_processing(&stats);

    assert_eq!(snapshot.get("Number of GPS Events Stored"), Some("1200"));
    assert_eq!(snapshot.get("Max Alerts Per Day"), Some("12"));
    assert_eq!(snapshot.get("Peak GPS Activity Day"), Some("N/A"));
    assert_ne!(snapshot.get("Last Updated"), Some("N/A"));
}

#[tokio::test]
async fn test_lookup_sends_exact_index_query() {
    let addr = spawn_backend().await;
    let source = source_for(addr);

    let record = source.track_event(EventKind::Gps, 3).await.unwrap();
    assert_eq!(record.get("query").unwrap(), "index=3");
    assert_eq!(record.render(), "device_id: truck-7\nquery: index=3");
}

#[tokio::test]
async fn test_not_found_uses_backend_message() {
    let addr = spawn_backend().await;
    let source = source_for(addr);

    match source.track_event(EventKind::Alert, 9).await {
        Err(SourceError::Http { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "No TrackAlerts message at index 9");
        }
        other => panic!("expected HTTP error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_consistency_both_contracts() {
    let addr = spawn_backend().await;
    let source = source_for(addr);

    let report = source.consistency_report().await.unwrap();
    assert_eq!(report.missing_from_db(), 0);
    assert_eq!(report.missing_from_queue(), 1);
    let text = report.render();
    assert!(text.contains("Database vs Queue:\n  Alerts: +3\n  GPS: -4"));
    assert!(text.contains("Processing Time: N/A ms"));

    let ack = source.run_consistency_update().await.unwrap();
    assert_eq!(ack.processing_time_ms, 42);
}

#[tokio::test]
async fn test_non_json_body_is_parse_error() {
    let addr = spawn_backend().await;
    let mut settings = settings_for(addr);
    settings.endpoints.processing_stats.path = "/broken/stats".to_string();
    let source = HttpSource::from_settings(&settings).unwrap();

    let result = source.processing_stats().await;
    assert!(matches!(result, Err(SourceError::Parse(_))));
}

#[tokio::test]
async fn test_request_timeout() {
    let addr = spawn_backend().await;
    let mut settings = settings_for(addr);
    settings.endpoints.analyzer_stats.path = "/slow/stats".to_string();
    settings.request_timeout_ms = 100;
    let source = HttpSource::from_settings(&settings).unwrap();

    let result = source.analyzer_stats().await;
    assert!(matches!(result, Err(SourceError::Timeout)));
}

#[tokio::test]
async fn test_connection_refused() {
    // Reserve a port, then free it so nothing is listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source = source_for(addr);
    let result = source.processing_stats().await;
    assert!(matches!(result, Err(SourceError::Connection(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_lookups_render_independently() {
    let addr = spawn_backend().await;
    let source = Arc::new(source_for(addr));
    let (dispatcher, updates) = Dispatcher::new(
        source,
        ConsistencyMode::Report,
        tokio::runtime::Handle::current(),
    );
    let mut app = App::with_theme(
        dispatcher,
        updates,
        Duration::from_millis(7000),
        trackwatch::ui::Theme::dark(),
    );

    app.gps.input = "3".to_string();
    app.submit_lookup();
    app.cycle_focus();
    app.alert.input = "9".to_string();
    app.submit_lookup();

    let mut applied = 0;
    for _ in 0..200 {
        applied += app.drain_updates();
        if applied >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(app.gps.text, "device_id: truck-7\nquery: index=3");
    assert_eq!(app.alert.text, "Error fetching Alert event");
    // Lookup failures stay in their panel
    assert!(app.notices.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_poll_failure_raises_notice() {
    let addr = spawn_backend().await;
    let mut settings = settings_for(addr);
    settings.endpoints.processing_stats.path = "/missing".to_string();
    let source = Arc::new(HttpSource::from_settings(&settings).unwrap());
    let (dispatcher, updates) = Dispatcher::new(
        source,
        ConsistencyMode::Report,
        tokio::runtime::Handle::current(),
    );
    let mut app = App::with_theme(
        dispatcher,
        updates,
        settings.error_ttl(),
        trackwatch::ui::Theme::dark(),
    );

    app.refresh_stats();

    // Tick plus two stats responses
    let mut applied = 0;
    for _ in 0..200 {
        applied += app.drain_updates();
        if applied >= 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert!(app.last_updated.is_some());
    assert!(app.processing.text.is_none());
    assert_eq!(
        app.analyzer.text.as_deref(),
        Some("GPS Events Count: 80\nAlert Events Count: 4")
    );
    assert_eq!(app.notices.len(), 1);
    assert!(app.notices.iter().next().unwrap().message.starts_with("HTTP 404"));
}

#[tokio::test]
async fn test_once_prints_both_panels() {
    let addr = spawn_backend().await;
    let source = source_for(addr);

    let out = report::stats(&source).await;
    assert!(!out.failed);
    assert!(out.text.starts_with("== Processing Stats ==\nNumber of GPS Events Stored: 1200\n"));
    assert!(out
        .text
        .ends_with("== Analyzer Stats ==\nGPS Events Count: 80\nAlert Events Count: 4"));
}

#[tokio::test]
async fn test_once_fails_when_both_panels_fail() {
    let addr = spawn_backend().await;
    let mut settings = settings_for(addr);
    settings.endpoints.processing_stats.path = "/missing".to_string();
    settings.endpoints.analyzer_stats.path = "/broken/stats".to_string();
    let source = HttpSource::from_settings(&settings).unwrap();

    let out = report::stats(&source).await;
    assert!(out.failed);
    assert!(out.text.contains("== Processing Stats ==\nError: HTTP 404"));
    assert!(out.text.contains("== Analyzer Stats ==\nError: "));
}

#[tokio::test]
async fn test_check_prints_each_contract() {
    let addr = spawn_backend().await;
    let source = source_for(addr);

    let out = report::consistency(&source, ConsistencyMode::Report).await;
    assert!(!out.failed);
    assert!(out.text.contains("Database vs Queue:\n  Alerts: +3\n  GPS: -4"));

    let out = report::consistency(&source, ConsistencyMode::Update).await;
    assert!(!out.failed);
    assert_eq!(out.text, "Consistency check completed in 42 ms");
}

#[tokio::test]
async fn test_check_fails_on_error() {
    let addr = spawn_backend().await;
    let mut settings = settings_for(addr);
    settings.endpoints.consistency_checks.path = "/missing".to_string();
    let source = HttpSource::from_settings(&settings).unwrap();

    let out = report::consistency(&source, ConsistencyMode::Report).await;
    assert!(out.failed);
    assert!(out.text.starts_with("Error running consistency check: HTTP 404"));
}
