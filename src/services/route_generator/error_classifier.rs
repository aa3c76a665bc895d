//! Maps provider failures into the [`RouteError`] taxonomy and picks the
//! representative error when every seed in a batch failed.

use crate::error::RouteError;
use crate::services::ors::ProviderError;

const HTTP_TOO_MANY_REQUESTS: u16 = 429;

/// Classify one provider failure. Only a 429 is special-cased; everything else
/// (5xx, other statuses, transport, timeout, undecodable body) is treated as a
/// transient service failure.
pub fn classify(error: &ProviderError) -> RouteError {
    match error {
        ProviderError::Http { status, .. } if *status == HTTP_TOO_MANY_REQUESTS => {
            RouteError::RateLimited
        }
        other => RouteError::Unavailable(other.to_string()),
    }
}

/// Representative error for a batch with zero successes.
/// Priority: `RateLimited` > `EmptyResult` > `Unavailable`.
pub fn aggregate<'a, I>(failures: I) -> RouteError
where
    I: IntoIterator<Item = &'a RouteError>,
{
    let mut empty_result = false;
    let mut last_detail = None;

    for failure in failures {
        match failure {
            RouteError::RateLimited => return RouteError::RateLimited,
            RouteError::EmptyResult => empty_result = true,
            RouteError::Unavailable(detail) => last_detail = Some(detail.clone()),
            RouteError::NoViableCandidate => {}
        }
    }

    if empty_result {
        RouteError::EmptyResult
    } else {
        RouteError::Unavailable(
            last_detail.unwrap_or_else(|| "all candidate requests failed".to_string()),
        )
    }
}
