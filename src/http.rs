//! HTTP server for the Prometheus metrics endpoint.

use std::net::SocketAddr;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tracing::{error, info};

use crate::errors::{ServiceError, ServiceResult};
use crate::metrics::SharedSink;

const CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Create the HTTP router.
pub fn create_router(sink: SharedSink) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(sink)
}

async fn metrics_handler(State(sink): State<SharedSink>) -> Response {
    match sink.render() {
        Ok(body) => (StatusCode::OK, [("content-type", CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!("[http] failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn health_handler() -> Response {
    (StatusCode::OK, "healthy\n").into_response()
}

/// Serves `/metrics` until the process exits.
pub async fn serve(sink: SharedSink, addr: SocketAddr) -> ServiceResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServiceError::BindError { addr, source })?;
    info!("[http] listening on {}", addr);

    axum::serve(listener, create_router(sink))
        .await
        .map_err(ServiceError::ServerError)
}
