use std::fmt::Write as _;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::state::{AppState, ObservabilitySnapshot};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";
const STATIC_JSON_CACHE_CONTROL: &str = "public, max-age=3600";

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.observability.record_health_request();
    let observability = state.observability.snapshot();
    Json(serde_json::json!({
        "status": "healthy",
        "model": "not_loaded",
        "datasets": state.dataset_count,
        "cities": state.city_count,
        "uptime_secs": state.uptime_secs(),
        "started_at": state.started_at.to_rfc3339(),
        "observability": observability,
    }))
}

pub async fn get_governorates(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.observability.record_governorates_request();
    let payload = &state.governorates;

    if if_none_match_matches(&headers, &payload.etag) {
        return not_modified_response(STATIC_JSON_CACHE_CONTROL, Some(payload.etag.as_str()));
    }

    json_bytes_response(
        (*payload.json).clone(),
        STATIC_JSON_CACHE_CONTROL,
        Some(payload.etag.as_str()),
    )
}

/// Both dashboard datasets, serialized once at startup.
pub async fn get_datasets(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    state.observability.record_datasets_request();
    let payload = &state.datasets;

    if if_none_match_matches(&headers, &payload.etag) {
        state.observability.record_datasets_not_modified();
        return not_modified_response(STATIC_JSON_CACHE_CONTROL, Some(payload.etag.as_str()));
    }

    json_bytes_response(
        (*payload.json).clone(),
        STATIC_JSON_CACHE_CONTROL,
        Some(payload.etag.as_str()),
    )
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = render_prometheus_metrics(
        state.dataset_count,
        state.city_count,
        state.uptime_secs(),
        state.observability.snapshot(),
    );

    (
        [
            (header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    )
}

fn write_metric(
    body: &mut String,
    name: &str,
    kind: &str,
    help: &str,
    value: impl std::fmt::Display,
) {
    let _ = writeln!(body, "# HELP {name} {help}");
    let _ = writeln!(body, "# TYPE {name} {kind}");
    let _ = writeln!(body, "{name} {value}");
}

fn render_prometheus_metrics(
    dataset_count: usize,
    city_count: usize,
    uptime_secs: i64,
    observability: ObservabilitySnapshot,
) -> String {
    let mut body = String::new();
    write_metric(
        &mut body,
        "weatherguard_datasets",
        "gauge",
        "Number of dashboard datasets served.",
        dataset_count,
    );
    write_metric(
        &mut body,
        "weatherguard_cities",
        "gauge",
        "Number of city records across all datasets.",
        city_count,
    );
    write_metric(
        &mut body,
        "weatherguard_model_loaded",
        "gauge",
        "Whether a prediction model is loaded (1 or 0).",
        0,
    );
    write_metric(
        &mut body,
        "weatherguard_uptime_seconds",
        "gauge",
        "Seconds since the server started.",
        uptime_secs,
    );
    write_metric(
        &mut body,
        "weatherguard_health_requests_total",
        "counter",
        "Total /api/health requests.",
        observability.health_requests_total,
    );
    write_metric(
        &mut body,
        "weatherguard_datasets_requests_total",
        "counter",
        "Total /api/datasets requests.",
        observability.datasets_requests_total,
    );
    write_metric(
        &mut body,
        "weatherguard_datasets_not_modified_total",
        "counter",
        "Total /api/datasets requests answered with 304 Not Modified.",
        observability.datasets_not_modified_total,
    );
    write_metric(
        &mut body,
        "weatherguard_governorates_requests_total",
        "counter",
        "Total /api/governorates requests.",
        observability.governorates_requests_total,
    );
    body
}

fn json_bytes_response(body: Bytes, cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn not_modified_response(cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::body::to_bytes;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::{if_none_match_matches, render_prometheus_metrics};
    use crate::state::{AppState, ObservabilitySnapshot};

    async fn spawn_test_server(state: AppState) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let app = crate::app::build_app(state);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test app");
        });
        (addr, handle)
    }

    #[test]
    fn metrics_output_contains_prometheus_help_type_and_values() {
        let observability = ObservabilitySnapshot {
            health_requests_total: 4,
            datasets_requests_total: 12,
            datasets_not_modified_total: 7,
            governorates_requests_total: 3,
        };

        let metrics = render_prometheus_metrics(2, 8, 61, observability);

        assert!(metrics.contains("# HELP weatherguard_datasets "));
        assert!(metrics.contains("# TYPE weatherguard_datasets_requests_total counter"));
        assert!(metrics.contains("weatherguard_datasets 2"));
        assert!(metrics.contains("weatherguard_cities 8"));
        assert!(metrics.contains("weatherguard_model_loaded 0"));
        assert!(metrics.contains("weatherguard_uptime_seconds 61"));
        assert!(metrics.contains("weatherguard_health_requests_total 4"));
        assert!(metrics.contains("weatherguard_datasets_requests_total 12"));
        assert!(metrics.contains("weatherguard_datasets_not_modified_total 7"));
        assert!(metrics.contains("weatherguard_governorates_requests_total 3"));
    }

    #[test]
    fn if_none_match_supports_weak_and_multiple_etags() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            axum::http::header::IF_NONE_MATCH,
            axum::http::HeaderValue::from_static("W/\"other\", \"datasets-0badf00d\""),
        );
        assert!(if_none_match_matches(&headers, "\"datasets-0badf00d\""));
        assert!(!if_none_match_matches(&headers, "\"datasets-12345678\""));

        headers.insert(
            axum::http::header::IF_NONE_MATCH,
            axum::http::HeaderValue::from_static("*"),
        );
        assert!(if_none_match_matches(&headers, "\"anything\""));
        assert!(!if_none_match_matches(&axum::http::HeaderMap::new(), "\"anything\""));
    }

    #[tokio::test]
    async fn health_and_metrics_expose_expected_contract() {
        let (addr, server_handle) = spawn_test_server(AppState::new()).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        client
            .get(format!("{base_url}/api/datasets"))
            .send()
            .await
            .expect("datasets request")
            .error_for_status()
            .expect("datasets status");

        let health = client
            .get(format!("{base_url}/api/health"))
            .send()
            .await
            .expect("health request")
            .error_for_status()
            .expect("health status")
            .json::<serde_json::Value>()
            .await
            .expect("parse health");

        assert_eq!(health.get("status").and_then(|v| v.as_str()), Some("healthy"));
        assert_eq!(
            health.get("model").and_then(|v| v.as_str()),
            Some("not_loaded")
        );
        assert_eq!(health.get("datasets").and_then(|v| v.as_u64()), Some(2));
        assert_eq!(health.get("cities").and_then(|v| v.as_u64()), Some(8));
        assert!(health.get("started_at").and_then(|v| v.as_str()).is_some());
        assert_eq!(
            health
                .get("observability")
                .and_then(|v| v.get("datasets_requests_total"))
                .and_then(|v| v.as_u64()),
            Some(1)
        );

        let metrics = client
            .get(format!("{base_url}/api/metrics"))
            .send()
            .await
            .expect("metrics request")
            .error_for_status()
            .expect("metrics status")
            .text()
            .await
            .expect("parse metrics text");

        assert!(metrics.contains("# TYPE weatherguard_datasets_requests_total counter"));
        assert!(metrics.contains("weatherguard_datasets_requests_total 1"));
        assert!(metrics.contains("weatherguard_health_requests_total 1"));
        assert!(metrics.contains("weatherguard_model_loaded 0"));

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn datasets_endpoint_returns_not_modified_when_etag_matches() {
        let state = AppState::new();
        let observability = std::sync::Arc::clone(&state.observability);
        let (addr, server_handle) = spawn_test_server(state).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        let first = client
            .get(format!("{base_url}/api/datasets"))
            .send()
            .await
            .expect("datasets request should succeed");
        assert_eq!(first.status(), reqwest::StatusCode::OK);
        let first_etag = first
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .expect("etag header should be present");
        let body = first
            .json::<serde_json::Value>()
            .await
            .expect("parse datasets body");
        assert_eq!(body[0]["key"], "monitor");
        assert_eq!(body[0]["cities"][0]["dangerScore"], 85);
        assert_eq!(body[1]["key"], "regions");
        assert_eq!(body[1]["cities"][3]["risk"], "Low Risk");

        let second = client
            .get(format!("{base_url}/api/datasets"))
            .header(reqwest::header::IF_NONE_MATCH, first_etag)
            .send()
            .await
            .expect("conditional datasets request should succeed");

        assert_eq!(second.status(), reqwest::StatusCode::NOT_MODIFIED);
        assert_eq!(
            second
                .headers()
                .get(reqwest::header::CACHE_CONTROL)
                .and_then(|value| value.to_str().ok()),
            Some("public, max-age=3600")
        );
        assert_eq!(observability.snapshot().datasets_not_modified_total, 1);

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn governorates_are_sorted_json_array() {
        let app = crate::app::build_app(AppState::new());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/governorates")
                    .body(axum::body::Body::empty())
                    .expect("build request"),
            )
            .await
            .expect("governorates response");

        assert_eq!(response.status(), axum::http::StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(axum::http::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("application/json")
        );
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let names: Vec<String> = serde_json::from_slice(&body).expect("parse governorates");
        assert_eq!(names.len(), 24);
        assert_eq!(names.first().map(String::as_str), Some("Ariana"));
        assert!(names.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[tokio::test]
    async fn predict_endpoint_is_not_provided() {
        let app = crate::app::build_app(AppState::new());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/predict")
                    .body(axum::body::Body::empty())
                    .expect("build request"),
            )
            .await
            .expect("predict response");

        assert!(response.status().is_client_error());
    }
}
