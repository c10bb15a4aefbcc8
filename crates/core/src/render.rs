//! Trial renderer.
//!
//! Pure projections from trial records to HTML fragments. Nothing here touches the page or
//! mutates its input; the controller decides where each fragment goes.
//!
//! Absent and empty fields are replaced by fixed fallback labels, and every backend value is
//! escaped with [`crate::markup::escape`]. Trial ids only appear inside quoted `data-trial-id`
//! attributes; the browser binding reads them through a delegated click handler.

use crate::constants::{TRIAL_ID_ATTRIBUTE, VIEW_DETAILS_CLASS};
use crate::markup::{escape, escape_with_breaks, or_fallback, text_or};
use trial_types::{Contact, Location, TrialRecord};

const UNNAMED_TRIAL: &str = "Unnamed Trial";
const NOT_SPECIFIED: &str = "Not specified";
const UNKNOWN: &str = "Unknown";
const NOT_AVAILABLE: &str = "N/A";

/// Title and body of the trial detail view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailView {
    /// Plain text, to be set as text content rather than markup.
    pub title: String,
    pub body_html: String,
}

/// Loading placeholder for the trials list.
pub fn loading_html() -> &'static str {
    r#"<div class="loading">Searching for clinical trials...</div>"#
}

/// Inline error for the trials list.
pub fn error_html(message: &str) -> String {
    format!(r#"<div class="error">Error: {}</div>"#, escape(message))
}

/// Placeholder shown in the map region before the first search.
pub fn map_placeholder_html() -> &'static str {
    r#"<div class="map-placeholder">
    <div class="map-placeholder-icon">&#128205;</div>
    <div class="map-placeholder-title">Map View</div>
    <div class="map-placeholder-note">(Trial locations will appear here)</div>
</div>"#
}

/// Placeholder shown in the map region when no result has usable coordinates.
pub fn no_locations_html() -> &'static str {
    r#"<div class="map-placeholder">
    <div class="map-placeholder-title">No trial locations found</div>
    <div class="map-placeholder-note">Try broadening your search criteria</div>
</div>"#
}

/// Render the result list.
pub fn render_list(trials: &[TrialRecord]) -> String {
    if trials.is_empty() {
        return r#"<div class="no-results">No clinical trials found matching your criteria.</div>"#
            .to_string();
    }

    let mut html = String::from(r#"<ul class="trials-list">"#);
    for trial in trials {
        html.push_str(&render_list_item(trial));
    }
    html.push_str("</ul>");
    html
}

fn render_list_item(trial: &TrialRecord) -> String {
    let id = escape(trial.id.as_str());
    let locations = trial
        .locations
        .iter()
        .map(list_location)
        .collect::<Vec<_>>()
        .join("; ");
    let contacts: String = trial.contacts.iter().map(list_contact).collect();

    format!(
        r#"
<li class="trial-item" {attr}="{id}">
    <h3>{title}</h3>
    <p><strong>Condition:</strong> {condition}</p>
    <p><strong>Phase:</strong> {phase}</p>
    <p><strong>Status:</strong> {status}</p>
    <p><strong>Age Range:</strong> {min_age} - {max_age}</p>
    <p><strong>Locations:</strong> {locations}</p>
    <div class="trial-contacts"><strong>Contacts:</strong> {contacts}</div>
    <p><strong>Eligibility Criteria:</strong> {criteria}</p>
    {button}
</li>"#,
        attr = TRIAL_ID_ATTRIBUTE,
        id = id,
        title = text_or(trial.title.as_deref(), UNNAMED_TRIAL),
        condition = text_or(trial.condition.as_deref(), NOT_SPECIFIED),
        phase = text_or(trial.phase.as_deref(), NOT_SPECIFIED),
        status = text_or(trial.status.as_deref(), UNKNOWN),
        min_age = text_or(trial.min_age(), NOT_AVAILABLE),
        max_age = text_or(trial.max_age(), NOT_AVAILABLE),
        locations = locations,
        contacts = contacts,
        criteria = text_or(trial.criteria(), "No criteria available."),
        button = view_details_button(trial),
    )
}

fn list_location(location: &Location) -> String {
    format!(
        "{}, {}",
        text_or(location.city.as_deref(), UNKNOWN),
        text_or(location.state.as_deref(), UNKNOWN)
    )
}

fn list_contact(contact: &Contact) -> String {
    format!(
        "<p><strong>{}:</strong> {} | {}</p>",
        text_or(contact.name.as_deref(), "Contact Name Not Available"),
        text_or(contact.phone.as_deref(), ""),
        text_or(contact.email.as_deref(), "")
    )
}

fn view_details_button(trial: &TrialRecord) -> String {
    format!(
        r#"<button type="button" class="{}" {}="{}">View Details</button>"#,
        VIEW_DETAILS_CLASS,
        TRIAL_ID_ATTRIBUTE,
        escape(trial.id.as_str())
    )
}

/// Render the detail view of one trial.
pub fn render_detail(trial: &TrialRecord) -> DetailView {
    let locations = if trial.locations.is_empty() {
        "<li>No location information available</li>".to_string()
    } else {
        trial.locations.iter().map(detail_location).collect()
    };

    let contacts = if trial.contacts.is_empty() {
        "<li>No contact information available</li>".to_string()
    } else {
        trial.contacts.iter().map(detail_contact).collect()
    };

    let body_html = format!(
        r#"
<div class="trial-detail-section">
    <h3>Description</h3>
    <p>{description}</p>
</div>
<div class="trial-detail-section">
    <h3>Eligibility</h3>
    <p><strong>Gender:</strong> {gender}</p>
    <p><strong>Age Range:</strong> {min_age} to {max_age}</p>
    <div class="criteria-box">
        <h4>Detailed Criteria:</h4>
        <p style="white-space: pre-line;">{criteria}</p>
    </div>
</div>
<div class="trial-detail-section">
    <h3>Locations</h3>
    <ul class="locations-list">{locations}</ul>
</div>
<div class="trial-detail-section">
    <h3>Contacts</h3>
    <ul class="contacts-list">{contacts}</ul>
</div>"#,
        description = text_or(trial.description.as_deref(), "No description available."),
        gender = text_or(trial.gender(), "All"),
        min_age = text_or(trial.min_age(), NOT_AVAILABLE),
        max_age = text_or(trial.max_age(), NOT_AVAILABLE),
        criteria = text_or(trial.criteria(), NOT_SPECIFIED),
        locations = locations,
        contacts = contacts,
    );

    DetailView {
        title: or_fallback(trial.title.as_deref(), "Trial Details").to_string(),
        body_html,
    }
}

fn detail_location(location: &Location) -> String {
    let street = match location.address.as_deref() {
        Some(address) if !address.is_empty() => format!("{}, ", escape(address)),
        _ => String::new(),
    };
    format!(
        "<li><strong>{}</strong><br>{}{}, {} {}</li>",
        text_or(location.facility.as_deref(), "Clinical Site"),
        street,
        text_or(location.city.as_deref(), "Unknown city"),
        text_or(location.state.as_deref(), "Unknown state"),
        text_or(location.zip.as_deref(), "")
    )
}

fn detail_contact(contact: &Contact) -> String {
    let email = match contact.email.as_deref() {
        Some(email) if !email.is_empty() => format!("| {}", escape(email)),
        _ => String::new(),
    };
    format!(
        "<li><strong>{}</strong><br>{}<br>{} {}</li>",
        text_or(contact.name.as_deref(), "Contact Name Not Available"),
        text_or(contact.role.as_deref(), "Role Not Specified"),
        text_or(contact.phone.as_deref(), ""),
        email
    )
}

/// Render the map popup for one trial site.
pub fn render_popup(trial: &TrialRecord, location: &Location) -> String {
    format!(
        r#"<div class="info-window">
    <h3>{}</h3>
    <p><strong>Facility:</strong> {}</p>
    <p><strong>Address:</strong> {}, {} {}</p>
    {}
</div>"#,
        text_or(trial.title.as_deref(), UNNAMED_TRIAL),
        text_or(location.facility.as_deref(), NOT_SPECIFIED),
        text_or(location.city.as_deref(), ""),
        text_or(location.state.as_deref(), ""),
        text_or(location.zip.as_deref(), ""),
        view_details_button(trial)
    )
}

/// Render the lay summary panel.
pub fn render_summary(trial: &TrialRecord, summary: &str) -> String {
    format!(
        r#"<h3>{}</h3>
<div class="summary-content">{}</div>
<p class="summary-note">This summary was generated to help explain the clinical trial in simpler terms.</p>"#,
        text_or(trial.title.as_deref(), "Trial Summary"),
        escape_with_breaks(summary)
    )
}
