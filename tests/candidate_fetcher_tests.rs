use randomwalk::models::HillinessPreference;
use randomwalk::services::ors::{DirectionsResponse, ProviderError};
use randomwalk::services::route_generator::{CandidateFetcher, FetchPolicy};
use randomwalk::RouteError;
use std::sync::Arc;
use std::time::{Duration, Instant};

mod common;

use common::{http_error, loop_response, origin, ScriptedProvider};

const TARGET_M: f64 = 2010.0;

fn policy(max_retries: usize, timeout_ms: u64) -> FetchPolicy {
    FetchPolicy {
        timeout: Duration::from_millis(timeout_ms),
        max_retries,
        backoff: vec![Duration::from_millis(1)],
    }
}

fn fetcher(provider: &Arc<ScriptedProvider>, policy: FetchPolicy) -> CandidateFetcher {
    CandidateFetcher::new(provider.clone(), policy)
}

#[tokio::test]
async fn test_all_rate_limited_fails_without_retry() {
    let provider = Arc::new(ScriptedProvider::new(|_, _| Err(http_error(429))));
    let fetcher = fetcher(&provider, policy(2, 500));

    let result = fetcher
        .fetch_all(origin(), TARGET_M, &[1, 2, 3], HillinessPreference::NoHill)
        .await;

    assert_eq!(result.unwrap_err(), RouteError::RateLimited);
    // One attempt per seed: 429 is never retried
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn test_partial_failures_are_dropped() {
    let provider = Arc::new(ScriptedProvider::new(|request, _| {
        if request.seed % 2 == 0 {
            Ok(loop_response(0, 2000.0, 10.0))
        } else {
            Err(http_error(500))
        }
    }));
    let fetcher = fetcher(&provider, policy(2, 500));

    let candidates = fetcher
        .fetch_all(origin(), TARGET_M, &[1, 2, 3, 4, 5, 6], HillinessPreference::NoHill)
        .await
        .unwrap();

    let mut seeds: Vec<u32> = candidates.iter().map(|c| c.seed).collect();
    seeds.sort_unstable();
    assert_eq!(seeds, vec![2, 4, 6]);

    // Failing seeds used every attempt, succeeding seeds only one
    assert_eq!(provider.calls_for(1), 3);
    assert_eq!(provider.calls_for(2), 1);
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let provider = Arc::new(ScriptedProvider::new(|_, call| {
        if call.attempt == 0 {
            Err(http_error(503))
        } else {
            Ok(loop_response(0, 2000.0, 10.0))
        }
    }));
    let fetcher = fetcher(&provider, policy(2, 500));

    let candidate = fetcher
        .fetch_one(origin(), TARGET_M, 9, HillinessPreference::LittleHill)
        .await
        .unwrap();

    assert_eq!(candidate.seed, 9);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_other_client_errors_are_retried_as_unavailable() {
    let provider = Arc::new(ScriptedProvider::new(|_, _| Err(http_error(404))));
    let fetcher = fetcher(&provider, policy(1, 500));

    let error = fetcher
        .fetch_one(origin(), TARGET_M, 1, HillinessPreference::NoHill)
        .await
        .unwrap_err();

    assert!(matches!(error, RouteError::Unavailable(_)));
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_empty_result_is_not_retried() {
    let provider = Arc::new(ScriptedProvider::new(|_, _| Ok(DirectionsResponse::default())));
    let fetcher = fetcher(&provider, policy(2, 500));

    let result = fetcher
        .fetch_all(origin(), TARGET_M, &[1, 2], HillinessPreference::NoHill)
        .await;

    assert_eq!(result.unwrap_err(), RouteError::EmptyResult);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_timeout_counts_as_unavailable() {
    let provider = Arc::new(
        ScriptedProvider::new(|_, _| Ok(loop_response(0, 2000.0, 10.0)))
            .with_delay(Duration::from_millis(500)),
    );
    let fetcher = fetcher(&provider, policy(1, 30));

    let error = fetcher
        .fetch_one(origin(), TARGET_M, 1, HillinessPreference::NoHill)
        .await
        .unwrap_err();

    assert!(matches!(error, RouteError::Unavailable(_)));
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_malformed_response_is_unavailable() {
    let provider = Arc::new(ScriptedProvider::new(|_, _| {
        Err(ProviderError::Malformed("expected value at line 1".to_string()))
    }));
    let fetcher = fetcher(&provider, policy(0, 500));

    let result = fetcher
        .fetch_all(origin(), TARGET_M, &[1], HillinessPreference::NoHill)
        .await;

    assert!(matches!(result, Err(RouteError::Unavailable(_))));
}

#[tokio::test]
async fn test_rate_limit_outranks_other_failures() {
    let provider = Arc::new(ScriptedProvider::new(|request, _| match request.seed {
        1 => Err(http_error(429)),
        2 => Ok(DirectionsResponse::default()),
        _ => Err(http_error(502)),
    }));
    let fetcher = fetcher(&provider, policy(0, 500));

    let result = fetcher
        .fetch_all(origin(), TARGET_M, &[3, 2, 1], HillinessPreference::NoHill)
        .await;

    assert_eq!(result.unwrap_err(), RouteError::RateLimited);
}

#[tokio::test]
async fn test_seeds_are_fetched_concurrently() {
    let provider = Arc::new(
        ScriptedProvider::new(|_, _| Ok(loop_response(0, 2000.0, 10.0)))
            .with_delay(Duration::from_millis(100)),
    );
    let fetcher = fetcher(&provider, policy(0, 2000));
    let seeds: Vec<u32> = (0..12).collect();

    let started = Instant::now();
    let candidates = fetcher
        .fetch_all(origin(), TARGET_M, &seeds, HillinessPreference::NoHill)
        .await
        .unwrap();

    assert_eq!(candidates.len(), 12);
    // Sequential would take ~1.2s
    assert!(started.elapsed() < Duration::from_millis(800));
}

#[tokio::test]
async fn test_request_carries_preference_hints() {
    let provider = Arc::new(ScriptedProvider::new(|request, _| {
        assert!(request.hints.avoid_steps);
        assert_eq!(request.hints.steepness_difficulty, Some(-2));
        assert_eq!(request.points, 4);
        Ok(loop_response(0, 2000.0, 10.0))
    }));
    let fetcher = fetcher(&provider, policy(0, 500));

    fetcher
        .fetch_one(origin(), TARGET_M, 1, HillinessPreference::NoHill)
        .await
        .unwrap();
}
