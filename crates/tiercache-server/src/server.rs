use std::net::SocketAddr;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::handlers::{
    admin::{clear_all, clear_tier, clear_user, stats, warm_secrets, warm_tier},
    diagnostics::cache_diagnostics,
    health::health_check,
    metrics::metrics_handler,
};
use crate::middleware::{RequestIdLayer, trace_layer};
use crate::state::AppState;

fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/cache_diagnostics", get(cache_diagnostics))
        // Admin routes
        .route("/admin/cache/clear-all", post(clear_all))
        .route("/admin/cache/clear-user", post(clear_user))
        .route("/admin/cache/clear/{tier}", post(clear_tier))
        .route("/admin/cache/stats", get(stats))
        .route("/admin/cache/warm-secrets", post(warm_secrets))
        .route("/admin/cache/warm/{tier}", post(warm_tier))
        .with_state(state)
}

fn with_middleware(router: Router) -> Router {
    // Last layer is outermost: request id wraps trace, trace wraps metrics
    router
        .layer(middleware::from_fn(
            crate::metrics::http::http_metrics_middleware,
        ))
        .layer(trace_layer())
        .layer(RequestIdLayer)
}

/// Creates a router with the given application state.
pub fn create_router(state: AppState) -> Router {
    with_middleware(app_router(state))
}

/// Creates a router that also serves `/metrics` from the given handle.
pub fn create_router_with_metrics(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    // Router for metrics endpoint (different state)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    with_middleware(Router::new().merge(app_router(state)).merge(metrics_router))
}

/// Serves `app` on an already bound listener until a shutdown signal.
pub async fn serve(listener: tokio::net::TcpListener, app: Router) -> Result<(), std::io::Error> {
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Runs the server with the given state and metrics handle.
pub async fn run_server(
    addr: SocketAddr,
    state: AppState,
    prometheus_handle: PrometheusHandle,
) -> Result<(), std::io::Error> {
    let app = create_router_with_metrics(state, prometheus_handle);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve(listener, app).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::warn!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
