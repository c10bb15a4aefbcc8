//! # Trials API client
//!
//! HTTP implementation of [`TrialsApi`] on top of `reqwest`. The same code runs natively (CLI,
//! dev tooling) and in the browser, where `reqwest` is backed by `fetch`.
//!
//! Transport failures map onto [`TrialsError`]:
//! - non-success HTTP status → [`TrialsError::HttpStatus`]
//! - connection or request errors → [`TrialsError::Network`]
//! - bodies that are not the expected JSON → [`TrialsError::Decode`]
//!
//! Error envelopes (`{"status": "error", ...}`) are returned as-is; interpreting them is the
//! controller's job.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use trials_core::trial_types::{SearchCriteria, SearchResponse, SummaryRequest, SummaryResponse};
use trials_core::{ClientConfig, TrialsApi, TrialsError, TrialsResult};

/// Backend client posting JSON to the search and summary endpoints.
#[derive(Clone, Debug)]
pub struct HttpTrialsApi {
    client: reqwest::Client,
    search_url: String,
    summary_url: String,
}

impl HttpTrialsApi {
    /// Build a client for the endpoints named in `config`.
    pub fn new(config: &ClientConfig) -> TrialsResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TrialsError::InvalidConfig(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, config))
    }

    /// Use an existing `reqwest` client, for shared connection pools or custom settings.
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            search_url: config.search_url(),
            summary_url: config.summary_url(),
        }
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    pub fn summary_url(&self) -> &str {
        &self.summary_url
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> TrialsResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        tracing::debug!("POST {} -> {}", url, status);
        if !status.is_success() {
            return Err(TrialsError::HttpStatus(status.as_u16()));
        }

        response.json::<T>().await.map_err(transport_error)
    }
}

#[async_trait(?Send)]
impl TrialsApi for HttpTrialsApi {
    async fn search_trials(&self, criteria: &SearchCriteria) -> TrialsResult<SearchResponse> {
        self.post_json(&self.search_url, criteria).await
    }

    async fn generate_summary(&self, request: &SummaryRequest) -> TrialsResult<SummaryResponse> {
        self.post_json(&self.summary_url, request).await
    }
}

fn transport_error(err: reqwest::Error) -> TrialsError {
    if err.is_decode() {
        TrialsError::Decode(err.to_string())
    } else {
        TrialsError::Network(err.to_string())
    }
}
