//! Frame Ingestion Routes

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::{store_error_response, AppState, ErrorResponse};
use analytics::FrameSummary;
use traffic_model::{BoundingBox, Detection, Frame, ObjectClass};

/// One detection as reported by the vision-model wrapper
#[derive(Debug, Deserialize)]
pub struct DetectionPayload {
    /// Model label; unknown labels are ignored, not errors
    pub label: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// One processed frame's detections
#[derive(Debug, Deserialize)]
pub struct FramePayload {
    pub detections: Vec<DetectionPayload>,
    pub width: u32,
    pub height: u32,
    /// Capture time; defaults to receive time when absent
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

/// Ingest one frame of detections into the engine
pub async fn ingest_frame(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FramePayload>,
) -> Result<Json<FrameSummary>, (StatusCode, Json<ErrorResponse>)> {
    let detections: Vec<Detection> = payload
        .detections
        .into_iter()
        .filter_map(|det| match ObjectClass::from_label(&det.label) {
            Some(class) => Some(Detection {
                class,
                confidence: det.confidence,
                bbox: det.bbox,
            }),
            None => {
                debug!(label = det.label, "Ignoring unknown detection label");
                None
            }
        })
        .collect();

    let mut frame = Frame::new(detections, payload.width, payload.height);
    if let Some(timestamp) = payload.timestamp {
        frame.timestamp = timestamp;
    }
    let summary = state
        .analytics
        .process_frame(&frame)
        .map_err(store_error_response)?;

    Ok(Json(summary))
}
