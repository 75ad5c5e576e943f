// src/logging_middleware.rs
//! Per-request access logging

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Logs method, path, status and latency of every request under a request id.
/// An incoming `x-request-id` is kept, otherwise a new one is generated and
/// echoed on the response. Bodies, query strings and headers are never logged.
pub async fn log_request(mut request: Request, next: Next) -> Response {
    let started = Instant::now();
    let header = HeaderName::from_static(REQUEST_ID_HEADER);

    let request_id = request
        .headers()
        .get(&header)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        request.headers_mut().insert(header.clone(), value);
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;

    let status = response.status();
    let latency_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        warn!(request_id = %request_id, method = %method, path = %path, status = status.as_u16(), latency_ms, "Request failed");
    } else {
        info!(request_id = %request_id, method = %method, path = %path, status = status.as_u16(), latency_ms, "Request handled");
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(header, value);
    }

    response
}
