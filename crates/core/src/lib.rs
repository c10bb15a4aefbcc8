//! # Trials Core
//!
//! Workflow logic for the clinical trial finder page.
//!
//! This crate holds everything that does not need a browser:
//! - rendering trial records into escaped HTML fragments ([`render`])
//! - projecting trial sites onto a map widget ([`map`])
//! - the search, detail and summary workflows ([`controller`])
//! - configuration and error types shared by the client crates
//!
//! **No DOM or HTTP code**: pages implement [`Page`], map libraries implement [`MapWidget`] and
//! backends implement [`TrialsApi`]. The `trials-web` crate wires real ones together; tests use
//! fakes.

pub mod api;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod map;
pub mod markup;
pub mod page;
pub mod render;

#[cfg(test)]
pub(crate) mod testing;

pub use api::TrialsApi;
pub use config::ClientConfig;
pub use controller::{SearchOutcome, SummaryOutcome, TrialsController};
pub use error::{TrialsError, TrialsResult};
pub use map::{GeoBounds, GeoPoint, MapAdapter, MapUpdate, MapWidget, MarkerSpec};
pub use page::{ControlState, Page, Region};

// Re-export the wire types so client crates need a single dependency.
pub use trial_types;
pub use trial_types::{SearchCriteria, TrialId, TrialRecord};
