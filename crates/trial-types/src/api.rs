//! Request and response envelopes for the two backend endpoints.

use crate::{null_as_empty, TrialId, TrialRecord};
use serde::{Deserialize, Serialize};

/// The `status` value the backend uses for a successful reply.
pub const STATUS_SUCCESS: &str = "success";

/// Body of `POST /api/search_trials`. Every field travels as a string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub age: String,
    pub condition: String,
    pub location: String,
    pub distance: String,
}

/// Reply from `POST /api/search_trials`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub trials: Vec<TrialRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn success(trials: Vec<TrialRecord>) -> Self {
        Self {
            status: STATUS_SUCCESS.into(),
            trials,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            status: "error".into(),
            trials: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// Body of `POST /api/generate_summary`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub trial_id: TrialId,
    pub trial_details: TrialRecord,
}

impl SummaryRequest {
    pub fn for_trial(trial: &TrialRecord) -> Self {
        Self {
            trial_id: trial.id.clone(),
            trial_details: trial.clone(),
        }
    }
}

/// Reply from `POST /api/generate_summary`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SummaryResponse {
    pub fn success(summary: impl Into<String>) -> Self {
        Self {
            status: STATUS_SUCCESS.into(),
            summary: Some(summary.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            status: "error".into(),
            summary: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}
