//! Traffic Dashboard API Server
//!
//! REST surface over the analytics engine: stats polling, frame ingestion,
//! violations, citations (issue / list / document download), ambulance
//! priority override, and edge-node heartbeats.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod routes;

use analytics::TrafficAnalytics;
use citation_store::{PlainTextRenderer, RenderDocument, StoreError};
use heartbeat::NodeRegistry;

/// Application state shared across handlers
pub struct AppState {
    /// Analytics engine (per-resource locks inside)
    pub analytics: Arc<TrafficAnalytics>,
    /// Edge-node heartbeat registry
    pub nodes: Arc<NodeRegistry>,
    /// Citation document renderer
    pub renderer: Arc<dyn RenderDocument>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state around an engine instance
    pub fn new(analytics: Arc<TrafficAnalytics>, nodes: Arc<NodeRegistry>) -> Self {
        Self {
            analytics,
            nodes,
            renderer: Arc::new(PlainTextRenderer),
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Error body for rejected operations
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Map store errors onto HTTP statuses
pub(crate) fn store_error_response(err: StoreError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::AlreadyCited(_) => StatusCode::CONFLICT,
        StoreError::MissingRate(_) | StoreError::LockPoisoned => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub violation_count: usize,
    pub citation_count: usize,
    pub node_count: usize,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/stats", get(routes::stats::get_stats))
        .route("/api/v1/frames", post(routes::frames::ingest_frame))
        .route("/api/v1/violations", get(routes::violations::get_violations))
        .route(
            "/api/v1/citations",
            get(routes::citations::get_citations).post(routes::citations::issue_citation),
        )
        .route(
            "/api/v1/citations/:id/document",
            get(routes::citations::download_document),
        )
        .route(
            "/api/v1/priority/override",
            put(routes::priority::set_override).delete(routes::priority::clear_override),
        )
        .route("/api/v1/nodes", get(routes::nodes::get_nodes))
        .route(
            "/api/v1/nodes/:id/heartbeat",
            post(routes::nodes::post_heartbeat),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = state.analytics.store();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        violation_count: store.violation_count(),
        citation_count: store.citation_count(),
        node_count: state.nodes.list().len(),
    })
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Run the server
pub async fn run_server(
    addr: &str,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
