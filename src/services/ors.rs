use crate::constants::ORS_DIRECTIONS_URL;
use crate::models::{Coordinates, LineString, RouteHints};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw failure from the routing provider, before classification.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Failed to parse response: {0}")]
    Malformed(String),
}

/// Parameters for one seeded round-trip request.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundTripRequest {
    pub origin: Coordinates,
    pub target_distance_m: f64,
    pub points: u32,
    pub seed: u32,
    pub hints: RouteHints,
}

/// Outbound seam to the walking-directions service.
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    async fn fetch_round_trip(
        &self,
        request: &RoundTripRequest,
    ) -> Result<DirectionsResponse, ProviderError>;

    fn provider_name(&self) -> &'static str;
}

#[derive(Clone)]
pub struct OrsClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OrsClient {
    pub fn new(api_key: String) -> Self {
        OrsClient {
            client: Client::new(),
            api_key,
            base_url: ORS_DIRECTIONS_URL.to_string(),
        }
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        OrsClient {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    fn build_body(request: &RoundTripRequest) -> OrsRequestBody {
        let avoid_features = if request.hints.avoid_steps {
            Some(vec!["steps"])
        } else {
            None
        };
        let profile_params = request
            .hints
            .steepness_difficulty
            .map(|steepness_difficulty| ProfileParams {
                weightings: Weightings {
                    steepness_difficulty,
                },
            });

        OrsRequestBody {
            coordinates: vec![[request.origin.lng, request.origin.lat]],
            options: RequestOptions {
                round_trip: RoundTripOptions {
                    length: request.target_distance_m,
                    points: request.points,
                    seed: request.seed,
                },
                avoid_features,
                profile_params,
            },
            elevation: true,
            instructions: true,
            instructions_format: "text",
            units: "m",
        }
    }
}

#[async_trait]
impl DirectionsProvider for OrsClient {
    /// Request a single round trip from openrouteservice.
    /// Returns the decoded GeoJSON feature collection; status handling is left
    /// to the caller's classifier.
    async fn fetch_round_trip(
        &self,
        request: &RoundTripRequest,
    ) -> Result<DirectionsResponse, ProviderError> {
        let body = Self::build_body(request);

        tracing::debug!(
            seed = request.seed,
            points = request.points,
            length_m = %format!("{:.0}", request.target_distance_m),
            "ORS round-trip request: seed {}, {} points, {:.0}m",
            request.seed, request.points, request.target_distance_m
        );

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                status = %status,
                seed = request.seed,
                "ORS HTTP error {}: {}",
                status, error_text
            );
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body: error_text,
            });
        }

        response
            .json::<DirectionsResponse>()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "openrouteservice"
    }
}

// ORS request body

#[derive(Debug, Serialize)]
struct OrsRequestBody {
    coordinates: Vec<[f64; 2]>,
    options: RequestOptions,
    elevation: bool,
    instructions: bool,
    instructions_format: &'static str,
    units: &'static str,
}

#[derive(Debug, Serialize)]
struct RequestOptions {
    round_trip: RoundTripOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    avoid_features: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile_params: Option<ProfileParams>,
}

#[derive(Debug, Serialize)]
struct RoundTripOptions {
    length: f64,
    points: u32,
    seed: u32,
}

#[derive(Debug, Serialize)]
struct ProfileParams {
    weightings: Weightings,
}

#[derive(Debug, Serialize)]
struct Weightings {
    steepness_difficulty: i32,
}

// ORS GeoJSON response types

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectionsResponse {
    /// 4 values, or 6 when elevation is requested
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
    #[serde(default)]
    pub features: Vec<RouteFeature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteFeature {
    pub geometry: LineString,
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureProperties {
    #[serde(default)]
    pub summary: Summary,
    #[serde(default)]
    pub ascent: Option<f64>,
    #[serde(default)]
    pub descent: Option<f64>,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

/// ORS omits zero-valued summary fields, hence the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub instruction: String,
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
}
