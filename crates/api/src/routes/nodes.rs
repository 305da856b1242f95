//! Edge-Node Heartbeat Routes

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;
use heartbeat::NodeInfo;

/// Optional metadata sent with a heartbeat
#[derive(Debug, Default, Deserialize)]
pub struct HeartbeatRequest {
    pub area: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Response for the nodes listing
#[derive(Debug, Serialize)]
pub struct NodeResponse {
    pub data: Vec<NodeInfo>,
    pub count: usize,
}

/// Record a heartbeat from an edge node
pub async fn post_heartbeat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Option<Json<HeartbeatRequest>>,
) -> Json<NodeResponse> {
    let meta = body.map(|Json(b)| b).unwrap_or_default();
    state.nodes.register(&id, meta.area, meta.lat, meta.lon);
    list(&state)
}

/// List known nodes and their liveness
pub async fn get_nodes(State(state): State<Arc<AppState>>) -> Json<NodeResponse> {
    list(&state)
}

fn list(state: &AppState) -> Json<NodeResponse> {
    let data = state.nodes.list();
    Json(NodeResponse {
        count: data.len(),
        data,
    })
}
