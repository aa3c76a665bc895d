pub mod generate_route;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/generate-route", post(generate_route::generate_route))
        .route("/api/health", get(health::health_check))
        .with_state(state)
}
