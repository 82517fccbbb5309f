//! Development-only latency injection.

use axum::body::Body;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::IntoResponse;
use rand_distr::{Distribution, Normal};
use std::time::Duration;

const MEAN_DELAY_MS: f64 = 500.0;
const DELAY_STD_DEV_MS: f64 = 300.0;

/// Delays every request by a normally distributed amount of time, so that
/// frontends can be exercised against a slow catalog.
pub async fn slowdown_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let delay_ms = Normal::new(MEAN_DELAY_MS, DELAY_STD_DEV_MS)
        .map(|normal| normal.sample(&mut rand::rng()).max(0.0))
        .unwrap_or(MEAN_DELAY_MS);
    tokio::time::sleep(Duration::from_millis(delay_ms as u64)).await;
    next.run(request).await
}
