//! Constants used throughout the trials core crate.
//!
//! Page element identifiers, endpoint paths, control labels and map defaults live here so the
//! browser binding, the renderer and the tests agree on them.

/// Path of the trial search endpoint.
pub const SEARCH_TRIALS_PATH: &str = "/api/search_trials";

/// Path of the lay-summary endpoint.
pub const GENERATE_SUMMARY_PATH: &str = "/api/generate_summary";

/// Closest zoom the map may show after fitting markers.
pub const DEFAULT_MAX_ZOOM: u8 = 16;

/// Highest zoom level the mapping widget supports.
pub const WIDGET_MAX_ZOOM: u8 = 21;

/// Zoom used for the initial, empty map.
pub const DEFAULT_MAP_ZOOM: u8 = 4;

/// Centre of the contiguous United States.
pub const DEFAULT_MAP_CENTER: (f64, f64) = (39.8283, -98.5795);

/// Class that hides an element.
pub const HIDDEN_CLASS: &str = "hidden";

/// Attribute carrying a trial id on controls and list items.
pub const TRIAL_ID_ATTRIBUTE: &str = "data-trial-id";

/// Class of every "View Details" control.
pub const VIEW_DETAILS_CLASS: &str = "view-details-btn";

/// Summary control label while idle.
pub const SUMMARY_IDLE_LABEL: &str = "Generate Parent-Friendly Summary";

/// Summary control label while a request is in flight.
pub const SUMMARY_BUSY_LABEL: &str = "Generating Summary...";

/// Fallback reason when the search backend reports failure without one.
pub const SEARCH_FAILED_FALLBACK: &str = "Failed to retrieve clinical trials";

/// Fallback reason when the summary backend reports failure without one.
pub const SUMMARY_FAILED_FALLBACK: &str = "Failed to generate summary";

/// Page element identifiers.
pub mod ids {
    pub const SEARCH_FORM: &str = "clinical-trial-form";
    pub const SEARCH_BUTTON: &str = "search-button";
    pub const AGE_INPUT: &str = "age";
    pub const CONDITION_INPUT: &str = "condition";
    pub const LOCATION_INPUT: &str = "location";
    pub const DISTANCE_INPUT: &str = "distance";
    pub const RESULTS_SECTION: &str = "results-section";
    pub const TRIALS_LIST: &str = "trials-list";
    pub const MAP: &str = "map";
    pub const TRIAL_MODAL: &str = "trial-modal";
    pub const MODAL_TITLE: &str = "modal-trial-title";
    pub const MODAL_DETAILS: &str = "modal-trial-details";
    pub const SUMMARY_BUTTON: &str = "generate-summary-button";
    pub const SUMMARY_SECTION: &str = "summary-section";
    pub const SUMMARY_CONTENT: &str = "simplified-summary";

    /// Selector of the modal close control.
    pub const CLOSE_BUTTON_SELECTOR: &str = ".close-button";
}
