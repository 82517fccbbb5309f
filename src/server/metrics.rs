use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all Wrapped metrics
const PREFIX: &str = "wrapped";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Wrap Metrics
    pub static ref WRAPS_GENERATED_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_wraps_generated_total"), "Wraps generated by time range"),
        &["time_range"]
    ).expect("Failed to create wraps_generated_total metric");

    pub static ref CATALOG_FETCH_FAILURES_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            format!("{PREFIX}_catalog_fetch_failures_total"),
            "Catalog requests that degraded to empty results"
        ),
        &["endpoint"]
    ).expect("Failed to create catalog_fetch_failures_total metric");

    pub static ref GAME_GUESSES_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_game_guesses_total"), "Guessing game answers by outcome"),
        &["outcome"]
    ).expect("Failed to create game_guesses_total metric");

    pub static ref DUO_INVITATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_duo_invitations_total"), "Duo Wrapped invitation events"),
        &["event"]
    ).expect("Failed to create duo_invitations_total metric");

    pub static ref PROCESS_MEMORY_BYTES: Gauge = Gauge::new(
        format!("{PREFIX}_process_memory_bytes"),
        "Process memory usage in bytes"
    ).expect("Failed to create process_memory_bytes metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Already registered metrics are fine, tests call this repeatedly.
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(WRAPS_GENERATED_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(CATALOG_FETCH_FAILURES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(GAME_GUESSES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(DUO_INVITATIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(PROCESS_MEMORY_BYTES.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Record an HTTP request, `path` should be the matched route template.
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

pub fn record_wrap_generated(time_range: &str) {
    WRAPS_GENERATED_TOTAL.with_label_values(&[time_range]).inc();
}

pub fn record_catalog_fetch_failure(endpoint: &str) {
    CATALOG_FETCH_FAILURES_TOTAL
        .with_label_values(&[endpoint])
        .inc();
}

pub fn record_game_guess(correct: bool) {
    let outcome = if correct { "correct" } else { "wrong" };
    GAME_GUESSES_TOTAL.with_label_values(&[outcome]).inc();
}

/// `event` is either `sent` or `accepted`.
pub fn record_duo_invitation(event: &str) {
    DUO_INVITATIONS_TOTAL.with_label_values(&[event]).inc();
}

/// Update process memory usage
pub fn update_memory_usage() {
    #[cfg(target_os = "linux")]
    {
        if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
            let rss_kb = status
                .lines()
                .find(|line| line.starts_with("VmRSS:"))
                .and_then(|line| line.split_whitespace().nth(1))
                .and_then(|kb| kb.parse::<f64>().ok());
            if let Some(kb) = rss_kb {
                PROCESS_MEMORY_BYTES.set(kb * 1024.0);
            }
        }
    }
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    update_memory_usage();

    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
