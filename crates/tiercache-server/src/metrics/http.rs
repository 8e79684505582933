//! HTTP metrics middleware.

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use metrics::{counter, histogram};
use std::time::Instant;

/// Label usado para requests que no matchean ninguna ruta.
const UNMATCHED_PATH: &str = "unmatched";

/// Middleware que registra metricas HTTP para cada request.
///
/// El label `path` es la ruta del router (`/admin/cache/warm/{tier}`), no el
/// path concreto, para acotar la cardinalidad.
pub async fn http_metrics_middleware(
    matched_path: Option<MatchedPath>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = matched_path
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string());

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();

    counter!(
        "tiercache_http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);

    histogram!(
        "tiercache_http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(start.elapsed().as_secs_f64());

    response
}

/// Registra las metricas HTTP
pub fn register_http_metrics() {
    metrics::describe_counter!(
        "tiercache_http_requests_total",
        "Total number of HTTP requests"
    );
    metrics::describe_histogram!(
        "tiercache_http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
}
