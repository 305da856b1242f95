//! Dashboard Stats Routes

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::AppState;
use analytics::DashboardStats;

/// Get aggregated traffic stats for the dashboard
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<DashboardStats> {
    Json(state.analytics.current_stats())
}
