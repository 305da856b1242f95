//! Violation Routes

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{store_error_response, AppState, ErrorResponse};
use citation_store::ViolationRecord;

/// Query parameters for the violations endpoint
#[derive(Debug, Deserialize)]
pub struct ViolationQuery {
    /// Maximum number of records; omit to return all
    pub limit: Option<usize>,
}

/// Response for the violations endpoint
#[derive(Debug, Serialize)]
pub struct ViolationResponse {
    pub data: Vec<ViolationRecord>,
    pub count: usize,
}

/// Get recent violations, most recent first
pub async fn get_violations(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ViolationQuery>,
) -> Result<Json<ViolationResponse>, (StatusCode, Json<ErrorResponse>)> {
    let data = state
        .analytics
        .store()
        .list_violations(params.limit)
        .map_err(store_error_response)?;

    Ok(Json(ViolationResponse {
        count: data.len(),
        data,
    }))
}
