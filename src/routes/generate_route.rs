use crate::error::{AppError, Result};
use crate::models::{GenerateRouteBody, GenerateRouteResponse};
use crate::services::demo::demo_route;
use crate::{AppState, RouteSource};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// POST /api/generate-route
/// Generate one loop matching the requested duration and hilliness
#[instrument(skip(state, body), fields(request_id = %Uuid::new_v4()))]
pub async fn generate_route(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<GenerateRouteBody>, JsonRejection>,
) -> Result<Json<GenerateRouteResponse>> {
    let Json(body) = body.map_err(|e| {
        tracing::debug!("Rejected request body: {}", e);
        AppError::InvalidRequest("Invalid JSON body.".to_string())
    })?;

    let config = &state.route_config;
    let request = body
        .validate(config.min_walk_minutes, config.max_walk_minutes)
        .map_err(AppError::InvalidRequest)?;

    tracing::info!(
        lat = request.origin.lat,
        lng = request.origin.lng,
        minutes = request.minutes,
        preference = %request.preference,
        seed = ?request.seed,
        locked_seeds = request.avoid_seeds.len(),
        "Route request: ({:.4}, {:.4}), {} min, {}",
        request.origin.lat, request.origin.lng, request.minutes, request.preference
    );

    let result = match &state.source {
        RouteSource::Demo => {
            tracing::warn!("ORS_API_KEY not set, returning demo route");
            demo_route(config.target_distance_m(request.minutes))
        }
        RouteSource::Live(generator) => generator.generate_route(&request).await?,
    };

    Ok(Json(GenerateRouteResponse::success(result)))
}
