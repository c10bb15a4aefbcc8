//! Page surface used by the workflows.
//!
//! The controller never touches the DOM directly. It reads the search form and writes into the
//! named regions below through a [`Page`]; the browser crate implements it with `web-sys`, tests
//! with an in-memory fake.

use crate::constants::{ids, SUMMARY_BUSY_LABEL, SUMMARY_IDLE_LABEL, VIEW_DETAILS_CLASS};
use crate::TrialsResult;
use trial_types::SearchCriteria;

/// Page regions the workflows write to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    ResultsSection,
    TrialsList,
    Modal,
    ModalTitle,
    ModalBody,
    SummarySection,
    SummaryContent,
}

impl Region {
    /// Identifier of the element backing this region.
    pub fn element_id(self) -> &'static str {
        match self {
            Region::ResultsSection => ids::RESULTS_SECTION,
            Region::TrialsList => ids::TRIALS_LIST,
            Region::Modal => ids::TRIAL_MODAL,
            Region::ModalTitle => ids::MODAL_TITLE,
            Region::ModalBody => ids::MODAL_DETAILS,
            Region::SummarySection => ids::SUMMARY_SECTION,
            Region::SummaryContent => ids::SUMMARY_CONTENT,
        }
    }
}

/// Visual state of the summary control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlState {
    Idle,
    Busy,
}

impl ControlState {
    pub fn label(self) -> &'static str {
        match self {
            ControlState::Idle => SUMMARY_IDLE_LABEL,
            ControlState::Busy => SUMMARY_BUSY_LABEL,
        }
    }

    pub fn disabled(self) -> bool {
        matches!(self, ControlState::Busy)
    }
}

/// The page the controller drives.
///
/// Every method fails with [`crate::TrialsError::MissingElement`] when the element it needs is
/// not on the page.
pub trait Page {
    /// Read the four search inputs.
    fn read_criteria(&self) -> TrialsResult<SearchCriteria>;

    /// Replace the markup of a region.
    fn set_html(&self, region: Region, html: &str) -> TrialsResult<()>;

    /// Replace the text content of a region.
    fn set_text(&self, region: Region, text: &str) -> TrialsResult<()>;

    fn set_visible(&self, region: Region, visible: bool) -> TrialsResult<()>;

    fn scroll_into_view(&self, region: Region) -> TrialsResult<()>;

    /// Store the trial the summary control acts on.
    fn set_active_trial(&self, trial_id: &str) -> TrialsResult<()>;

    /// The trial id stored on the summary control, if any.
    fn active_trial(&self) -> TrialsResult<Option<String>>;

    fn set_summary_control(&self, state: ControlState) -> TrialsResult<()>;

    /// Blocking notification.
    fn alert(&self, message: &str);
}

/// CSS selector matching a "View Details" control in the list or a map popup.
pub fn view_details_selector() -> String {
    format!(".{}", VIEW_DETAILS_CLASS)
}

/// Trial id read from a control's `data-trial-id` attribute. Blank values count as missing.
pub fn trial_id_from_attribute(value: Option<String>) -> Option<String> {
    value.filter(|id| !id.trim().is_empty())
}

/// Marker index carried in the `detail` of a marker-click event.
///
/// JS numbers arrive as `f64`; anything negative, fractional or non-finite is rejected.
pub fn marker_index_from_detail(detail: Option<f64>) -> Option<usize> {
    let detail = detail?;
    if !detail.is_finite() || detail < 0.0 || detail.fract() != 0.0 || detail > u32::MAX as f64 {
        return None;
    }
    Some(detail as usize)
}
