// Library exports for testing and reusability

pub mod config;
pub mod constants;
pub mod error;
pub mod history;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result, RouteError};

use config::RouteGeneratorConfig;
use services::route_generator::RouteGenerator;

/// Where routes come from for this process.
pub enum RouteSource {
    Live(RouteGenerator),
    /// Fixed fixture; development without a provider key
    Demo,
}

// App state for sharing across the application
pub struct AppState {
    pub source: RouteSource,
    pub route_config: RouteGeneratorConfig,
}

impl AppState {
    pub fn live(route_generator: RouteGenerator) -> Self {
        let route_config = route_generator.config().clone();
        AppState {
            source: RouteSource::Live(route_generator),
            route_config,
        }
    }

    pub fn demo(route_config: RouteGeneratorConfig) -> Self {
        AppState {
            source: RouteSource::Demo,
            route_config,
        }
    }
}
