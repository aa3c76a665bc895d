use super::error_classifier;
use super::geometry::compute_ascent_descent;
use crate::config::RouteGeneratorConfig;
use crate::constants::*;
use crate::error::RouteError;
use crate::models::{BoundingBox, Coordinates, HillinessPreference, RouteCandidate, RouteStep};
use crate::services::ors::{DirectionsProvider, DirectionsResponse, ProviderError, RoundTripRequest};
use std::sync::Arc;
use std::time::Duration;

/// Timeout and retry schedule applied to every seeded request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchPolicy {
    /// Bound on a single attempt; the in-flight call is dropped when it elapses
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: usize,
    /// Sleep before retry N is `backoff[N - 1]`, or the last entry past the end
    pub backoff: Vec<Duration>,
}

impl FetchPolicy {
    pub fn from_config(config: &RouteGeneratorConfig) -> Self {
        FetchPolicy {
            timeout: Duration::from_millis(config.request_timeout_ms),
            max_retries: config.max_retries,
            backoff: config
                .retry_backoff_ms
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
        }
    }

    /// Sleep before the given attempt (0-based). The first attempt never waits.
    pub fn backoff_before(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.backoff
            .get(attempt - 1)
            .or_else(|| self.backoff.last())
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}

impl Default for FetchPolicy {
    fn default() -> Self {
        FetchPolicy::from_config(&RouteGeneratorConfig::default())
    }
}

/// Waypoint count for a round trip of the given length.
pub fn round_trip_points(target_distance_m: f64) -> u32 {
    ((target_distance_m / METERS_PER_ROUND_TRIP_POINT).round() as u32)
        .clamp(MIN_ROUND_TRIP_POINTS, MAX_ROUND_TRIP_POINTS)
}

/// Issues seeded round-trip requests and turns the responses into candidates.
#[derive(Clone)]
pub struct CandidateFetcher {
    provider: Arc<dyn DirectionsProvider>,
    policy: FetchPolicy,
}

impl CandidateFetcher {
    pub fn new(provider: Arc<dyn DirectionsProvider>, policy: FetchPolicy) -> Self {
        CandidateFetcher { provider, policy }
    }

    /// Fetch one candidate for a seed.
    ///
    /// Rate limits and empty results fail immediately. Anything else is
    /// retried with the policy's backoff until attempts run out, then the last
    /// failure is returned.
    pub async fn fetch_one(
        &self,
        origin: Coordinates,
        target_distance_m: f64,
        seed: u32,
        preference: HillinessPreference,
    ) -> Result<RouteCandidate, RouteError> {
        let request = RoundTripRequest {
            origin,
            target_distance_m,
            points: round_trip_points(target_distance_m),
            seed,
            hints: preference.hints(),
        };

        let mut last_error = None;

        for attempt in 0..=self.policy.max_retries {
            let delay = self.policy.backoff_before(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let outcome = match tokio::time::timeout(
                self.policy.timeout,
                self.provider.fetch_round_trip(&request),
            )
            .await
            {
                Ok(Ok(response)) => candidate_from_response(seed, response),
                Ok(Err(e)) => Err(error_classifier::classify(&e)),
                Err(_) => Err(error_classifier::classify(&ProviderError::Timeout)),
            };

            match outcome {
                Ok(candidate) => {
                    tracing::debug!(
                        seed,
                        attempt = attempt + 1,
                        distance_m = %format!("{:.0}", candidate.distance_m),
                        ascent_per_km = %format!("{:.1}", candidate.ascent_per_km),
                        "Seed {}: {:.0}m, {:.1}m/km ascent",
                        seed, candidate.distance_m, candidate.ascent_per_km
                    );
                    return Ok(candidate);
                }
                Err(e) if e.retry_in_task() => {
                    tracing::warn!(
                        seed,
                        attempt = attempt + 1,
                        max_attempts = self.policy.max_retries + 1,
                        error = %e,
                        "Seed {} attempt {}/{} failed: {}",
                        seed, attempt + 1, self.policy.max_retries + 1, e
                    );
                    last_error = Some(e);
                }
                Err(e) => {
                    tracing::info!(
                        seed,
                        kind = e.kind(),
                        "Seed {} failed without retry: {}",
                        seed,
                        e
                    );
                    return Err(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| RouteError::Unavailable("ORS request failed".to_string())))
    }

    /// Fetch candidates for every seed concurrently.
    ///
    /// All requests run to completion. Partial failures are dropped as long as
    /// one seed succeeded; otherwise the most significant failure is returned.
    pub async fn fetch_all(
        &self,
        origin: Coordinates,
        target_distance_m: f64,
        seeds: &[u32],
        preference: HillinessPreference,
    ) -> Result<Vec<RouteCandidate>, RouteError> {
        let fetches = seeds.iter().map(|&seed| async move {
            (
                seed,
                self.fetch_one(origin, target_distance_m, seed, preference)
                    .await,
            )
        });

        // Wait for all seeds to complete
        let results = futures::future::join_all(fetches).await;

        let mut candidates = Vec::with_capacity(results.len());
        let mut failures = Vec::new();

        for (seed, result) in results {
            match result {
                Ok(candidate) => candidates.push(candidate),
                Err(e) => {
                    tracing::debug!(seed, error = %e, "Dropping failed seed {}", seed);
                    failures.push(e);
                }
            }
        }

        tracing::info!(
            requested = seeds.len(),
            succeeded = candidates.len(),
            failed = failures.len(),
            "Candidate fetch: {}/{} seeds succeeded",
            candidates.len(),
            seeds.len()
        );

        if candidates.is_empty() {
            return Err(error_classifier::aggregate(&failures));
        }

        Ok(candidates)
    }
}

/// Convert the provider's feature collection into a candidate.
///
/// Takes the first feature. When the provider reports no elevation gain or
/// loss, both are derived from the geometry's elevation profile.
pub fn candidate_from_response(
    seed: u32,
    response: DirectionsResponse,
) -> Result<RouteCandidate, RouteError> {
    let DirectionsResponse { bbox, features } = response;
    let feature = features
        .into_iter()
        .next()
        .ok_or(RouteError::EmptyResult)?;

    let geometry = feature.geometry;
    if geometry.coordinates.len() < 2 {
        return Err(RouteError::Unavailable(format!(
            "Failed to parse response: route geometry has {} points",
            geometry.coordinates.len()
        )));
    }

    let bbox = match bbox {
        Some(values) => BoundingBox::from_provider(&values)
            .map_err(|e| RouteError::Unavailable(format!("Failed to parse response: {}", e)))?,
        None => BoundingBox::from_points(&geometry.coordinates).ok_or_else(|| {
            RouteError::Unavailable("Failed to parse response: empty geometry".to_string())
        })?,
    };

    let props = feature.properties;
    let mut ascent_m = props.ascent.unwrap_or(0.0);
    let mut descent_m = props.descent.unwrap_or(0.0);
    if ascent_m == 0.0 && descent_m == 0.0 {
        let totals = compute_ascent_descent(&geometry.coordinates);
        ascent_m = totals.ascent_m;
        descent_m = totals.descent_m;
    }

    let steps: Vec<RouteStep> = props
        .segments
        .into_iter()
        .flat_map(|segment| segment.steps)
        .map(|s| RouteStep {
            instruction: s.instruction,
            distance_m: s.distance,
            duration_s: s.duration,
        })
        .collect();

    Ok(RouteCandidate::new(
        seed,
        props.summary.distance,
        props.summary.duration,
        ascent_m,
        descent_m,
        geometry,
        bbox,
        steps,
    ))
}
