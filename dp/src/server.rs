//! Inbound HTTP surface
//!
//! Two routes under `/api`, permissive-by-default CORS, and an optional
//! static frontend served for everything else.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use eyre::{Context, Result};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::domain::{DatePlanResponse, DatePreferences};
use crate::planner::{DatePlanner, LOCATION_ERROR, PlanError};

/// Body detail returned when synthesis fails
pub const INVALID_RESPONSE_DETAIL: &str = "Invalid AI response format";

#[derive(Clone)]
pub struct AppState {
    planner: Arc<DatePlanner>,
}

/// Plan failures mapped onto HTTP responses
#[derive(Debug)]
pub struct ApiError(PlanError);

impl From<PlanError> for ApiError {
    fn from(err: PlanError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            // Not a hard failure: clients get a 200 whose itinerary is the message
            PlanError::LocationNotResolved => (StatusCode::OK, Json(json!({ "itinerary": LOCATION_ERROR }))).into_response(),
            PlanError::InvalidPreferences(e) => {
                debug!(error = %e, "rejecting preferences");
                (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": e.to_string() }))).into_response()
            }
            PlanError::Synthesis(e) => {
                error!(error = %e, "plan generation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": INVALID_RESPONSE_DETAIL })),
                )
                    .into_response()
            }
        }
    }
}

/// API routes only
pub fn api_router(planner: Arc<DatePlanner>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/generate-date-plan/", post(generate_date_plan))
        .route("/api/generate-date-plan", post(generate_date_plan))
        .with_state(AppState { planner })
}

/// Full application: API routes, static fallback, CORS and request tracing
pub fn app(planner: Arc<DatePlanner>, config: &ServerConfig) -> Router {
    let mut router = api_router(planner);

    if let Some(dir) = &config.static_dir {
        if dir.is_dir() {
            info!(dir = %dir.display(), "serving static frontend");
            router = router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
        } else {
            warn!(dir = %dir.display(), "static-dir does not exist, frontend not served");
        }
    }

    router
        .layer(build_cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}

pub fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let values: Vec<HeaderValue> = origins.iter().filter_map(|o| HeaderValue::from_str(o).ok()).collect();
    if values.is_empty() {
        warn!(?origins, "no valid CORS origins configured, allowing any");
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(values)
    }
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: &ServerConfig, planner: Arc<DatePlanner>) -> Result<()> {
    serve_until(config, planner, shutdown_signal()).await
}

/// Bind and serve until `shutdown` resolves
///
/// `bind` may be a hostname or a bare IPv4/IPv6 address; port 0 picks a free port.
pub async fn serve_until<F>(config: &ServerConfig, planner: Arc<DatePlanner>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind((config.bind.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind to {} port {}", config.bind, config.port))?;
    let addr = listener.local_addr().context("failed to read bound address")?;
    info!(%addr, "date planner listening");

    axum::serve(listener, app(planner, config))
        .with_graceful_shutdown(shutdown)
        .await
        .context("server failure")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn generate_date_plan(
    State(state): State<AppState>,
    Json(preferences): Json<DatePreferences>,
) -> Result<Json<DatePlanResponse>, ApiError> {
    debug!(location = %preferences.location, "generate_date_plan: called");
    let plan = state.planner.generate(&preferences).await?;
    Ok(Json(plan))
}
