use randomwalk::config::Config;
use randomwalk::constants::REDIS_HISTORY_KEY;
use randomwalk::history::{FingerprintHistory, MemoryHistory, RedisHistory};
use randomwalk::services::ors::{DirectionsProvider, OrsClient};
use randomwalk::services::route_generator::RouteGenerator;
use randomwalk::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "randomwalk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting random walk API server");
    tracing::info!(app_env = %config.app_env, "Configuration loaded successfully");

    let state = match config.ors_api_key.clone() {
        Some(api_key) => {
            let history = build_history(&config).await;
            let provider: Arc<dyn DirectionsProvider> =
                Arc::new(OrsClient::with_base_url(api_key, config.ors_base_url.clone()));
            tracing::info!(
                provider = provider.provider_name(),
                history = history.backend_name(),
                candidates = config.route_generator.candidate_count,
                "Route generator ready"
            );
            AppState::live(RouteGenerator::new(
                provider,
                history,
                config.route_generator.clone(),
            ))
        }
        None => {
            tracing::warn!("ORS_API_KEY not set. Serving the demo route (development only).");
            AppState::demo(config.route_generator.clone())
        }
    };

    // Build router with CORS and tracing
    let app = randomwalk::routes::create_router(Arc::new(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Redis when configured and reachable, otherwise in-process.
async fn build_history(config: &Config) -> Arc<dyn FingerprintHistory> {
    let capacity = config.route_generator.fingerprint_history_capacity;

    if let Some(ref redis_url) = config.redis_url {
        tracing::info!("Connecting to Redis fingerprint history...");
        match RedisHistory::new(redis_url, REDIS_HISTORY_KEY, capacity).await {
            Ok(history) => return Arc::new(history),
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to Redis: {}. Falling back to in-memory history.",
                    e
                );
            }
        }
    } else {
        tracing::info!("Redis URL not configured. Using in-memory history.");
    }

    Arc::new(MemoryHistory::new(capacity))
}
