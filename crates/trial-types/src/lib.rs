//! # Trial Types
//!
//! Wire models shared by every crate that talks to the clinical-trial search backend:
//! - [`TrialRecord`] and its eligibility, location and contact sub-records
//! - request/response envelopes for `/api/search_trials` and `/api/generate_summary`
//! - [`TrialId`], the opaque identifier used to look trials up in a result set
//!
//! No behaviour lives here beyond (de)serialisation and small accessors.

pub mod api;
pub mod trial;

pub use api::{SearchCriteria, SearchResponse, SummaryRequest, SummaryResponse, STATUS_SUCCESS};
pub use trial::{Contact, Coordinate, Eligibility, Location, TrialRecord};

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("trial id cannot be blank")]
    Blank,
}

/// Opaque trial identifier, unique within one search result set.
///
/// The value is kept exactly as the backend sent it. Construction only rejects input that is
/// empty or whitespace, which is what a missing `data-trial-id` attribute reads as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrialId(String);

impl TrialId {
    /// Creates a new `TrialId`, rejecting blank input.
    pub fn new(input: impl Into<String>) -> Result<Self, TextError> {
        let value = input.into();
        if value.trim().is_empty() {
            return Err(TextError::Blank);
        }
        Ok(Self(value))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TrialId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for TrialId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl serde::Serialize for TrialId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for TrialId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TrialId::new(s).map_err(serde::de::Error::custom)
    }
}

/// Deserialise a free-text field that the backend may send as a number or boolean.
///
/// Scalars are kept as their JSON text; objects and arrays read as absent.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Text(String),
        Number(serde_json::Number),
        Flag(bool),
        Other(serde_json::Value),
    }

    Ok(match Option::<Text>::deserialize(deserializer)? {
        Some(Text::Text(s)) => Some(s),
        Some(Text::Number(n)) => Some(n.to_string()),
        Some(Text::Flag(b)) => Some(b.to_string()),
        Some(Text::Other(_)) | None => None,
    })
}

/// Deserialise a sequence that the backend may send as `null`.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    use serde::Deserialize;
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
