use crate::{AppState, RouteSource};
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /api/health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let (mode, history, capacity) = match &state.source {
        RouteSource::Live(generator) => {
            let history = generator.history();
            ("live", history.backend_name(), history.capacity())
        }
        RouteSource::Demo => ("demo", "none", 0),
    };

    Json(json!({
        "status": "ok",
        "mode": mode,
        "history": history,
        "historyCapacity": capacity,
    }))
}
