//! Structured log line for every request that changes a patient

use axum::{body::Body, extract::Request, http::Method, middleware::Next, response::Response};

use super::request_id::RequestId;

/// Log POST, PUT and DELETE requests with their outcome
pub async fn mutation_log_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    if !matches!(method, Method::POST | Method::PUT | Method::DELETE) {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let response = next.run(request).await;

    tracing::info!(
        target: "mutation",
        request_id = %request_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        "Patient mutation"
    );

    response
}
