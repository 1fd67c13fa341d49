use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use hyper::Server;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::config::Config;
use crate::error::CatalogError;
use crate::normalize::{build_membership_catalog, build_service_catalog};
use crate::observability::metrics;
use crate::square::CatalogSource;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub source: Arc<dyn CatalogSource>,
    pub metrics: Option<PrometheusHandle>,
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "n1-catalog-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Prometheus exposition endpoint
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed",
        )
            .into_response(),
    }
}

async fn services_handler(State(state): State<AppState>) -> Response {
    metrics::api::request("services");
    match build_service_catalog(state.source.as_ref(), &state.config.square).await {
        Ok(catalog) => no_cache(Json(catalog).into_response()),
        Err(e) => {
            metrics::api::error("services");
            error!("failed to fetch services from Square: {e}");
            upstream_error_response(&e, "Failed to fetch services from Square")
        }
    }
}

async fn memberships_handler(State(state): State<AppState>) -> Response {
    metrics::api::request("memberships");
    match build_membership_catalog(state.source.as_ref()).await {
        Ok(catalog) => no_cache(Json(catalog).into_response()),
        Err(e) => {
            metrics::api::error("memberships");
            error!("failed to fetch memberships from Square: {e}");
            upstream_error_response(&e, "Failed to fetch memberships from Square")
        }
    }
}

/// Success responses must always reflect the latest catalog state, so every
/// intermediary is told not to cache them.
fn no_cache(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate, proxy-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    response
}

/// Clients get a generic message; the underlying cause stays in the server
/// logs so upstream detail and credentials never leak.
fn upstream_error_response(error: &CatalogError, message: &str) -> Response {
    let status = if error.is_timeout() {
        StatusCode::GATEWAY_TIMEOUT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Create the HTTP server with all routes
pub fn create_server(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .route("/api/services", get(services_handler))
        .route("/api/memberships", get(memberships_handler))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}

/// Start the HTTP server on the specified port
pub async fn start_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("🚀 HTTP server running on http://localhost:{port}");
    println!("💚 Health check: http://localhost:{port}/health");
    println!("💅 Services:     http://localhost:{port}/api/services");
    println!("🏷️ Memberships:  http://localhost:{port}/api/memberships");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
