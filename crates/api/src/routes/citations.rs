//! Citation Routes

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{store_error_response, AppState, ErrorResponse};
use citation_store::Citation;

/// Request body for issuing a citation
#[derive(Debug, Deserialize)]
pub struct IssueCitationRequest {
    pub violation_id: u64,
}

/// Response for the citations listing
#[derive(Debug, Serialize)]
pub struct CitationResponse {
    pub data: Vec<Citation>,
    pub count: usize,
}

/// Issue a citation against an open violation
pub async fn issue_citation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IssueCitationRequest>,
) -> Result<(StatusCode, Json<Citation>), (StatusCode, Json<ErrorResponse>)> {
    let citation = state
        .analytics
        .store()
        .issue_citation(request.violation_id)
        .map_err(store_error_response)?;

    Ok((StatusCode::CREATED, Json(citation)))
}

/// List issued citations, most recent first
pub async fn get_citations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CitationResponse>, (StatusCode, Json<ErrorResponse>)> {
    let data = state
        .analytics
        .store()
        .list_citations()
        .map_err(store_error_response)?;

    Ok(Json(CitationResponse {
        count: data.len(),
        data,
    }))
}

/// Download the rendered citation document.
///
/// The payload is copied out of the store first; rendering runs on the
/// copy with no store lock held.
pub async fn download_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let payload = state
        .analytics
        .store()
        .document_payload(id)
        .map_err(store_error_response)?;

    let bytes = state.renderer.render(&payload);
    Ok((
        [(header::CONTENT_TYPE, state.renderer.content_type())],
        bytes,
    ))
}
