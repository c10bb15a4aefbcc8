//! Trial record wire model.
//!
//! Every field except `id` is optional on the wire. Free-text fields also take numbers and
//! booleans, which are kept as their JSON text. Sequences sent as `null` read as empty, and
//! fields this crate does not know about are kept in [`TrialRecord::extra`] so a record can be
//! posted back to the summary endpoint unchanged.

use crate::{lenient_text, null_as_empty, TrialId};
use serde::{Deserialize, Serialize};

/// One clinical trial as returned by the search backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub id: TrialId,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub condition: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub phase: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<Eligibility>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub locations: Vec<Location>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub contacts: Vec<Contact>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TrialRecord {
    /// A record carrying only its identifier.
    pub fn new(id: TrialId) -> Self {
        Self {
            id,
            title: None,
            condition: None,
            phase: None,
            status: None,
            description: None,
            eligibility: None,
            locations: Vec::new(),
            contacts: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn min_age(&self) -> Option<&str> {
        self.eligibility.as_ref().and_then(|e| e.min_age.as_deref())
    }

    pub fn max_age(&self) -> Option<&str> {
        self.eligibility.as_ref().and_then(|e| e.max_age.as_deref())
    }

    pub fn gender(&self) -> Option<&str> {
        self.eligibility.as_ref().and_then(|e| e.gender.as_deref())
    }

    pub fn criteria(&self) -> Option<&str> {
        self.eligibility.as_ref().and_then(|e| e.criteria.as_deref())
    }
}

/// Eligibility restrictions. All fields are free text, so an age sent as `18` reads as `"18"`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_age: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_age: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub gender: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub criteria: Option<String>,
}

/// A trial site.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub facility: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub city: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub state: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Coordinate>,
}

/// A trial contact person.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
}

/// A latitude or longitude exactly as the backend sent it.
///
/// Backends send numbers, numeric strings, or occasionally junk; the raw value is preserved
/// and interpreted on demand with [`Coordinate::degrees`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl Coordinate {
    /// The value in degrees, if it is a finite number.
    pub fn degrees(&self) -> Option<f64> {
        let value = match self {
            Coordinate::Number(v) => Some(*v),
            Coordinate::Text(s) => s.trim().parse::<f64>().ok(),
            Coordinate::Other(_) => None,
        };
        value.filter(|v| v.is_finite())
    }
}
