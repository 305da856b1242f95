//! Ambulance Priority Routes

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;

/// Request body for the priority override
#[derive(Debug, Deserialize)]
pub struct OverrideRequest {
    pub enabled: bool,
}

/// Current priority state
#[derive(Debug, Serialize)]
pub struct PriorityResponse {
    pub ambulance_priority: bool,
    pub priority_override: bool,
}

fn priority_response(state: &AppState) -> PriorityResponse {
    let stats = state.analytics.current_stats();
    PriorityResponse {
        ambulance_priority: stats.ambulance_priority,
        priority_override: stats.priority_override,
    }
}

/// Pin the ambulance priority flag until cleared
pub async fn set_override(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OverrideRequest>,
) -> Json<PriorityResponse> {
    state.analytics.set_priority_override(request.enabled);
    Json(priority_response(&state))
}

/// Clear the override; automatic detection resumes on the next frame
pub async fn clear_override(State(state): State<Arc<AppState>>) -> Json<PriorityResponse> {
    state.analytics.clear_priority_override();
    Json(priority_response(&state))
}
