pub mod candidate_fetcher;
pub mod error_classifier;
pub mod fingerprint;
pub mod geometry;
pub mod route_scoring;
pub mod selection;

use crate::config::RouteGeneratorConfig;
use crate::constants::SEED_UPPER_BOUND;
use crate::error::RouteError;
use crate::history::FingerprintHistory;
use crate::models::{hilliness_label, RouteRequest, RouteResult};
use crate::services::ors::DirectionsProvider;
use std::collections::HashSet;
use std::sync::Arc;

pub use candidate_fetcher::{CandidateFetcher, FetchPolicy};
pub use fingerprint::compute_fingerprint;
pub use route_scoring::{RouteScorer, ScoringContext, ScoringThresholds};
pub use selection::{Selection, SelectionEngine, SelectionPass};

/// Pick the seeds for one batch: the fixed seed first (if any), then random
/// seeds in `[0, SEED_UPPER_BOUND)` that are neither avoided nor repeated.
pub fn plan_seeds(
    fixed: Option<u32>,
    avoid: &HashSet<u32>,
    count: usize,
    mut next_random: impl FnMut() -> u32,
) -> Vec<u32> {
    let mut seeds = Vec::with_capacity(count.max(1));
    if let Some(seed) = fixed {
        seeds.push(seed);
    }
    while seeds.len() < count {
        let seed = next_random() % SEED_UPPER_BOUND;
        if !avoid.contains(&seed) && !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }
    seeds
}

pub struct RouteGenerator {
    fetcher: CandidateFetcher,
    selection: SelectionEngine,
    history: Arc<dyn FingerprintHistory>,
    config: RouteGeneratorConfig,
}

impl RouteGenerator {
    pub fn new(
        provider: Arc<dyn DirectionsProvider>,
        history: Arc<dyn FingerprintHistory>,
        config: RouteGeneratorConfig,
    ) -> Self {
        let fetcher = CandidateFetcher::new(provider, FetchPolicy::from_config(&config));
        let selection = SelectionEngine::from_config(&config);

        RouteGenerator {
            fetcher,
            selection,
            history,
            config,
        }
    }

    pub fn config(&self) -> &RouteGeneratorConfig {
        &self.config
    }

    pub fn history(&self) -> &Arc<dyn FingerprintHistory> {
        &self.history
    }

    /// Generate one loop for the request.
    ///
    /// Runs fetch -> select -> fingerprint. When the winner was served
    /// recently and re-roll attempts remain, the cycle reruns with fresh
    /// random seeds. The final attempt is accepted even if it repeats.
    pub async fn generate_route(&self, request: &RouteRequest) -> Result<RouteResult, RouteError> {
        let minutes = self.config.clamp_minutes(request.minutes);
        let target_distance_m = self.config.target_distance_m(minutes);
        let context = ScoringContext {
            preference: request.preference,
            target_distance_m,
            origin: request.origin,
        };
        let max_attempts = self.config.dedup_retries + 1;

        tracing::info!(
            lat = request.origin.lat,
            lng = request.origin.lng,
            minutes = %format!("{:.0}", minutes),
            target_m = %format!("{:.0}", target_distance_m),
            preference = %request.preference,
            "Generating {:.0}m loop ({} min, {})",
            target_distance_m, minutes, request.preference
        );

        let mut avoid = request.avoid_seeds.clone();
        let mut duplicate: Option<RouteResult> = None;
        let mut attempt = 0;

        loop {
            let fixed_seed = if attempt == 0 { request.seed } else { None };
            let seeds = plan_seeds(fixed_seed, &avoid, self.config.candidate_count, rand::random);
            avoid.extend(seeds.iter().copied());

            let outcome = self.fetch_and_select(&seeds, &context).await;
            let is_last = attempt + 1 >= max_attempts;

            let result = match (outcome, duplicate.take()) {
                (Ok(result), _) => result,
                // A re-roll that fails outright still leaves the earlier route
                (Err(e), Some(previous)) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        error = %e,
                        "Re-roll failed ({}), keeping duplicate route",
                        e
                    );
                    self.record(&previous.fingerprint).await;
                    return Ok(previous);
                }
                (Err(e), None) => return Err(e),
            };

            if is_last {
                self.record(&result.fingerprint).await;
                return Ok(result);
            }

            match self.history.insert_if_absent(&result.fingerprint).await {
                Ok(true) => return Ok(result),
                Ok(false) => {
                    tracing::info!(
                        fingerprint = %result.fingerprint,
                        attempt = attempt + 1,
                        max_attempts,
                        "Route {} served recently, re-rolling seeds",
                        result.fingerprint
                    );
                    duplicate = Some(result);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Fingerprint history unavailable: {}", e);
                    return Ok(result);
                }
            }

            attempt += 1;
        }
    }

    async fn fetch_and_select(
        &self,
        seeds: &[u32],
        context: &ScoringContext,
    ) -> Result<RouteResult, RouteError> {
        let mut candidates = self
            .fetcher
            .fetch_all(
                context.origin,
                context.target_distance_m,
                seeds,
                context.preference,
            )
            .await?;

        let selection = self
            .selection
            .select(&mut candidates, context)
            .ok_or(RouteError::NoViableCandidate)?;

        let candidate = candidates.swap_remove(selection.index);
        let fingerprint = compute_fingerprint(&candidate.geometry.coordinates);

        Ok(RouteResult {
            hilliness_label: hilliness_label(candidate.ascent_per_km).to_string(),
            target_distance_m: context.target_distance_m,
            fingerprint,
            candidate,
        })
    }

    /// Store a fingerprint unconditionally. History failures never fail a request.
    async fn record(&self, fingerprint: &str) {
        if let Err(e) = self.history.append(fingerprint).await {
            tracing::warn!(error = %e, "Failed to record fingerprint {}: {}", fingerprint, e);
        }
    }
}
