//! Backend seam.
//!
//! [`TrialsApi`] is the only way the workflows reach the network. Futures are not `Send`: the
//! browser runs everything on one thread, and the CLI drives them on a current-thread runtime.

use crate::constants::{SEARCH_FAILED_FALLBACK, SUMMARY_FAILED_FALLBACK};
use crate::{TrialsError, TrialsResult};
use async_trait::async_trait;
use trial_types::{SearchCriteria, SearchResponse, SummaryRequest, SummaryResponse, TrialRecord};

/// Client for the search and summary endpoints.
///
/// Implementations report transport failures (connection errors, non-success HTTP status,
/// undecodable bodies) as errors and return the decoded envelope otherwise, whatever its
/// `status`.
#[async_trait(?Send)]
pub trait TrialsApi {
    async fn search_trials(&self, criteria: &SearchCriteria) -> TrialsResult<SearchResponse>;

    async fn generate_summary(&self, request: &SummaryRequest) -> TrialsResult<SummaryResponse>;
}

/// Turn a search envelope into its trials, or the backend's reason for failing.
pub fn search_outcome(response: SearchResponse) -> TrialsResult<Vec<TrialRecord>> {
    if response.is_success() {
        return Ok(response.trials);
    }
    Err(TrialsError::Backend(non_empty_or(
        response.error,
        SEARCH_FAILED_FALLBACK,
    )))
}

/// Turn a summary envelope into its text, or the backend's reason for failing.
///
/// A success reply without a summary counts as a failure.
pub fn summary_outcome(response: SummaryResponse) -> TrialsResult<String> {
    let success = response.is_success();
    match response.summary {
        Some(summary) if success => Ok(summary),
        _ => Err(TrialsError::Backend(non_empty_or(
            response.error,
            SUMMARY_FAILED_FALLBACK,
        ))),
    }
}

fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
