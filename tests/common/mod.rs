use async_trait::async_trait;
use randomwalk::config::RouteGeneratorConfig;
use randomwalk::models::{Coordinates, LineString, RoutePoint};
use randomwalk::services::ors::{
    DirectionsProvider, DirectionsResponse, FeatureProperties, ProviderError, RoundTripRequest,
    RouteFeature, Segment, Step, Summary,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const ORIGIN_LAT: f64 = 37.7749;
pub const ORIGIN_LNG: f64 = -122.4194;

/// Loop offsets (dlng, dlat) from the origin; closes back on the origin.
const LOOP_OFFSETS: [(f64, f64); 11] = [
    (0.0, 0.0),
    (0.0005, 0.0003),
    (0.0010, 0.0006),
    (0.0015, 0.0010),
    (0.0015, 0.0015),
    (0.0010, 0.0020),
    (0.0005, 0.0020),
    (0.0, 0.0015),
    (-0.0005, 0.0010),
    (-0.0003, 0.0005),
    (0.0, 0.0),
];

#[allow(dead_code)]
pub fn origin() -> Coordinates {
    Coordinates::new(ORIGIN_LAT, ORIGIN_LNG).unwrap()
}

/// What the fake provider knows about the call it is answering.
#[derive(Debug, Clone, Copy)]
pub struct Call {
    /// Global 0-based call number
    pub index: usize,
    /// 0-based attempt number for this seed
    pub attempt: usize,
}

type Script =
    dyn Fn(&RoundTripRequest, Call) -> Result<DirectionsResponse, ProviderError> + Send + Sync;

/// Fake directions provider driven by a closure. Records every call.
pub struct ScriptedProvider {
    script: Box<Script>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    seeds: Mutex<Vec<u32>>,
}

#[allow(dead_code)]
impl ScriptedProvider {
    pub fn new(
        script: impl Fn(&RoundTripRequest, Call) -> Result<DirectionsResponse, ProviderError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        ScriptedProvider {
            script: Box::new(script),
            delay: None,
            calls: AtomicUsize::new(0),
            seeds: Mutex::new(Vec::new()),
        }
    }

    /// Sleep this long before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seeds_seen(&self) -> Vec<u32> {
        self.seeds.lock().unwrap().clone()
    }

    pub fn calls_for(&self, seed: u32) -> usize {
        self.seeds_seen().iter().filter(|s| **s == seed).count()
    }
}

#[async_trait]
impl DirectionsProvider for ScriptedProvider {
    async fn fetch_round_trip(
        &self,
        request: &RoundTripRequest,
    ) -> Result<DirectionsResponse, ProviderError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let attempt = {
            let mut seeds = self.seeds.lock().unwrap();
            let attempt = seeds.iter().filter(|s| **s == request.seed).count();
            seeds.push(request.seed);
            attempt
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        (self.script)(request, Call { index, attempt })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// A small closed loop starting and ending at the origin. `variant` shifts the
/// interior points north so different variants fingerprint differently.
#[allow(dead_code)]
pub fn loop_response(variant: u32, distance_m: f64, ascent_m: f64) -> DirectionsResponse {
    let shift = variant as f64 * 0.0002;
    let last = LOOP_OFFSETS.len() - 1;
    let coordinates = LOOP_OFFSETS
        .iter()
        .enumerate()
        .map(|(i, (dlng, dlat))| {
            let dlat = if i == 0 || i == last { *dlat } else { dlat + shift };
            RoutePoint::with_elevation(ORIGIN_LNG + dlng, ORIGIN_LAT + dlat, 10.0)
        })
        .collect();

    DirectionsResponse {
        bbox: None,
        features: vec![RouteFeature {
            geometry: LineString::new(coordinates),
            properties: FeatureProperties {
                summary: Summary {
                    distance: distance_m,
                    duration: distance_m / 1.34,
                },
                ascent: Some(ascent_m),
                descent: Some(ascent_m),
                segments: vec![Segment {
                    steps: vec![
                        Step {
                            instruction: "Head northeast".to_string(),
                            distance: distance_m / 2.0,
                            duration: distance_m / 2.68,
                        },
                        Step {
                            instruction: "Arrive at destination".to_string(),
                            distance: distance_m / 2.0,
                            duration: distance_m / 2.68,
                        },
                    ],
                }],
            },
        }],
    }
}

/// Same loop, but with a provider bbox too wide for the strict pass and
/// narrow enough for the relaxed one (target ~2010 m).
#[allow(dead_code)]
pub fn wide_loop_response(distance_m: f64, ascent_m: f64) -> DirectionsResponse {
    let mut response = loop_response(0, distance_m, ascent_m);
    response.bbox = Some(vec![-122.4230, 37.7720, -122.4160, 37.7780]);
    response
}

/// A loop that starts ~1 km away from the origin.
#[allow(dead_code)]
pub fn far_away_response(distance_m: f64) -> DirectionsResponse {
    let mut response = loop_response(0, distance_m, 10.0);
    for point in &mut response.features[0].geometry.coordinates {
        point.lat += 0.01;
    }
    response
}

#[allow(dead_code)]
pub fn http_error(status: u16) -> ProviderError {
    ProviderError::Http {
        status,
        body: format!("status {}", status),
    }
}

/// Small batches and near-zero backoff so tests run fast.
#[allow(dead_code)]
pub fn test_config() -> RouteGeneratorConfig {
    RouteGeneratorConfig {
        candidate_count: 4,
        request_timeout_ms: 500,
        max_retries: 2,
        retry_backoff_ms: vec![1],
        ..RouteGeneratorConfig::default()
    }
}
