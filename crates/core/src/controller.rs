//! Trials controller.
//!
//! One controller is built at start-up and shared on the UI thread. It owns the only workflow
//! state: the current result set, the map markers (through [`MapAdapter`]) and the sequence
//! number of the latest search. Every method takes `&self`; state sits behind `Cell`/`RefCell`
//! and no borrow is held across an `.await`.
//!
//! Searches are fenced: a response is applied only if no newer search was submitted while it
//! was in flight.

use crate::api::{search_outcome, summary_outcome, TrialsApi};
use crate::config::ClientConfig;
use crate::map::{MapAdapter, MapUpdate, MapWidget};
use crate::page::{ControlState, Page, Region};
use crate::{render, TrialsError, TrialsResult};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use trial_types::{SearchCriteria, SummaryRequest, TrialId, TrialRecord};

/// What a search submission ended up doing to the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Results were stored and rendered.
    Displayed { trials: usize, markers: usize },
    /// The backend answered with an error status.
    Rejected(String),
    /// The request failed in transport.
    Failed(String),
    /// A newer search was submitted before this one resolved.
    Stale,
    /// The search form could not be read.
    Aborted,
}

/// What a summary request ended up doing to the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SummaryOutcome {
    Displayed,
    Failed(String),
    /// No request was sent.
    Aborted,
}

pub struct TrialsController<A, P, W: MapWidget> {
    config: ClientConfig,
    api: A,
    page: P,
    map: MapAdapter<W>,
    results: RefCell<Rc<[TrialRecord]>>,
    latest_search: Cell<u64>,
}

impl<A, P, W> TrialsController<A, P, W>
where
    A: TrialsApi,
    P: Page,
    W: MapWidget,
{
    pub fn new(config: ClientConfig, api: A, page: P, widget: W) -> Self {
        let map = MapAdapter::new(widget, config.max_zoom());
        Self {
            config,
            api,
            page,
            map,
            results: RefCell::new(Rc::from(Vec::new())),
            latest_search: Cell::new(0),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn map(&self) -> &MapAdapter<W> {
        &self.map
    }

    /// The current result set.
    pub fn results(&self) -> Rc<[TrialRecord]> {
        Rc::clone(&self.results.borrow())
    }

    /// Look a trial up in the current result set.
    pub fn find_trial(&self, trial_id: &str) -> Option<TrialRecord> {
        self.results
            .borrow()
            .iter()
            .find(|t| t.id == *trial_id)
            .cloned()
    }

    /// Prepare the page: show the initial map placeholder.
    pub fn init(&self) {
        self.map.show_initial_placeholder();
    }

    /// Read the search form and submit it.
    pub async fn handle_search_submit(&self) -> SearchOutcome {
        match self.page.read_criteria() {
            Ok(criteria) => self.submit_search(criteria).await,
            Err(err) => {
                tracing::error!("cannot read search form: {}", err);
                SearchOutcome::Aborted
            }
        }
    }

    /// Run a search and render its results.
    pub async fn submit_search(&self, criteria: SearchCriteria) -> SearchOutcome {
        let seq = self.latest_search.get() + 1;
        self.latest_search.set(seq);

        tracing::info!(
            "search #{}: age={:?} condition={:?} location={:?} distance={:?}",
            seq,
            criteria.age,
            criteria.condition,
            criteria.location,
            criteria.distance
        );

        self.report(self.page.set_html(Region::TrialsList, render::loading_html()));
        self.report(self.page.set_visible(Region::ResultsSection, true));

        let result = self
            .api
            .search_trials(&criteria)
            .await
            .and_then(search_outcome);

        let latest = self.latest_search.get();
        if seq != latest {
            tracing::debug!("discarding response to search #{}, #{} is newer", seq, latest);
            return SearchOutcome::Stale;
        }

        match result {
            Ok(trials) => {
                let trials: Rc<[TrialRecord]> = Rc::from(trials);
                *self.results.borrow_mut() = Rc::clone(&trials);
                tracing::info!("search #{} returned {} trials", seq, trials.len());

                self.report(
                    self.page
                        .set_html(Region::TrialsList, &render::render_list(&trials)),
                );
                let markers = match self.map.render_map(&trials) {
                    MapUpdate::NoLocations => 0,
                    MapUpdate::Markers { count, .. } => count,
                };

                SearchOutcome::Displayed {
                    trials: trials.len(),
                    markers,
                }
            }
            Err(err) => {
                let message = err.to_string();
                if err.is_transport() {
                    tracing::error!("error fetching clinical trials: {}", message);
                } else {
                    tracing::warn!("search #{} rejected by backend: {}", seq, message);
                }

                self.report(
                    self.page
                        .set_html(Region::TrialsList, &render::error_html(&message)),
                );

                if err.is_transport() {
                    SearchOutcome::Failed(message)
                } else {
                    SearchOutcome::Rejected(message)
                }
            }
        }
    }

    /// Open the detail view for a trial in the current result set.
    pub fn view_details(&self, trial_id: &str) -> TrialsResult<()> {
        let Some(trial) = self.find_trial(trial_id) else {
            tracing::error!("trial not found: {}", trial_id);
            return Err(TrialsError::TrialNotFound(trial_id.to_string()));
        };

        let view = render::render_detail(&trial);
        self.page
            .set_text(Region::ModalTitle, &view.title)
            .and_then(|_| self.page.set_html(Region::ModalBody, &view.body_html))
            .inspect_err(|err| tracing::error!("cannot show trial details: {}", err))?;

        self.report(self.page.set_active_trial(trial.id.as_str()));
        self.report(self.page.set_visible(Region::Modal, true));
        Ok(())
    }

    /// Hide the detail view.
    pub fn close_details(&self) {
        self.report(self.page.set_visible(Region::Modal, false));
    }

    /// Summarise the trial stored on the summary control.
    pub async fn request_summary(&self) -> SummaryOutcome {
        let active = match self.page.active_trial() {
            Ok(active) => active,
            Err(err) => {
                tracing::error!("summary control unavailable: {}", err);
                return SummaryOutcome::Aborted;
            }
        };

        match active.map(TrialId::new) {
            Some(Ok(trial_id)) => self.request_summary_for(trial_id.as_str()).await,
            _ => {
                tracing::error!("{}", TrialsError::NoActiveTrial);
                SummaryOutcome::Aborted
            }
        }
    }

    /// Ask the backend for a lay summary of one trial and show it.
    pub async fn request_summary_for(&self, trial_id: &str) -> SummaryOutcome {
        let Some(trial) = self.find_trial(trial_id) else {
            tracing::error!("trial not found: {}", trial_id);
            return SummaryOutcome::Aborted;
        };

        tracing::info!("requesting summary for {}", trial.id);
        let _busy = BusyControl::engage(&self.page);

        let result = self
            .api
            .generate_summary(&SummaryRequest::for_trial(&trial))
            .await
            .and_then(summary_outcome);

        match result {
            Ok(summary) => {
                self.close_details();
                self.report(self.page.set_visible(Region::SummarySection, true));
                self.report(self.page.set_html(
                    Region::SummaryContent,
                    &render::render_summary(&trial, &summary),
                ));
                self.report(self.page.scroll_into_view(Region::SummarySection));
                SummaryOutcome::Displayed
            }
            Err(err) => {
                tracing::error!("error generating summary: {}", err);
                self.page
                    .alert(&format!("Error generating summary: {}", err));
                SummaryOutcome::Failed(err.to_string())
            }
        }
    }

    /// Open one marker's popup, closing any other.
    pub fn open_marker_popup(&self, index: usize) -> bool {
        self.map.open_popup(index)
    }

    fn report(&self, result: TrialsResult<()>) {
        if let Err(err) = result {
            tracing::warn!("page update skipped: {}", err);
        }
    }
}

/// Holds the summary control busy; dropping it restores the idle state.
struct BusyControl<'a, P: Page> {
    page: &'a P,
}

impl<'a, P: Page> BusyControl<'a, P> {
    fn engage(page: &'a P) -> Self {
        if let Err(err) = page.set_summary_control(ControlState::Busy) {
            tracing::warn!("cannot mark summary control busy: {}", err);
        }
        Self { page }
    }
}

impl<P: Page> Drop for BusyControl<'_, P> {
    fn drop(&mut self) {
        if let Err(err) = self.page.set_summary_control(ControlState::Idle) {
            tracing::warn!("cannot restore summary control: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ids;
    use crate::testing::{FakeApi, FakeMap, FakePage, MapCall};
    use crate::map::GeoPoint;
    use futures::poll;
    use serde_json::json;
    use std::pin::pin;
    use trial_types::{SearchResponse, SummaryResponse};

    type Controller = TrialsController<FakeApi, FakePage, FakeMap>;

    fn criteria(condition: &str) -> SearchCriteria {
        SearchCriteria {
            age: "10".into(),
            condition: condition.into(),
            location: "Philadelphia, PA".into(),
            distance: "25".into(),
        }
    }

    fn trial(id: &str, title: &str) -> TrialRecord {
        serde_json::from_value(json!({
            "id": id,
            "title": title,
            "locations": [{ "facility": "CHOP", "city": "Philadelphia", "state": "PA",
                            "latitude": "40.0", "longitude": "-75.0" }]
        }))
        .unwrap()
    }

    fn controller_with(api: FakeApi, page: FakePage) -> Controller {
        let config = ClientConfig::new("http://localhost:8080").unwrap();
        TrialsController::new(config, api, page, FakeMap::default())
    }

    fn controller(api: FakeApi) -> Controller {
        controller_with(api, FakePage::with_criteria(criteria("asthma")))
    }

    async fn loaded(trials: Vec<TrialRecord>) -> Controller {
        let api = FakeApi::default();
        api.push_search(Ok(SearchResponse::success(trials)));
        let controller = controller(api);
        controller.handle_search_submit().await;
        controller
    }

    fn result_ids(controller: &Controller) -> Vec<String> {
        controller
            .results()
            .iter()
            .map(|t| t.id.to_string())
            .collect()
    }

    #[tokio::test]
    async fn successful_search_renders_list_and_map() {
        let api = FakeApi::default();
        api.push_search(Ok(SearchResponse::success(vec![trial("NCT1", "Flu Vaccine Study")])));
        let controller = controller(api);

        let outcome = controller.handle_search_submit().await;

        assert_eq!(outcome, SearchOutcome::Displayed { trials: 1, markers: 1 });
        assert_eq!(controller.api().search_calls(), vec![criteria("asthma")]);
        assert_eq!(result_ids(&controller), vec!["NCT1"]);

        let page = controller.page();
        assert_eq!(page.visible(Region::ResultsSection), Some(true));
        assert!(page.html(Region::TrialsList).unwrap().contains("Flu Vaccine Study"));

        let map = controller.map().widget();
        assert_eq!(map.live_markers(), 1);
        assert_eq!(
            map.calls().last(),
            Some(&MapCall::CenterOn(GeoPoint { lat: 40.0, lng: -75.0 }, 16))
        );
    }

    #[tokio::test]
    async fn loading_state_is_shown_while_request_is_pending() {
        let api = FakeApi::default();
        let reply = api.push_gated_search();
        let controller = controller(api);

        let mut search = pin!(controller.handle_search_submit());
        assert!(poll!(search.as_mut()).is_pending());

        let page = controller.page();
        assert!(page
            .html(Region::TrialsList)
            .unwrap()
            .contains("Searching for clinical trials..."));
        assert_eq!(page.visible(Region::ResultsSection), Some(true));

        assert!(reply.send(Ok(SearchResponse::success(Vec::new()))).is_ok());
        assert_eq!(
            search.await,
            SearchOutcome::Displayed { trials: 0, markers: 0 }
        );
    }

    #[tokio::test]
    async fn empty_success_shows_no_results_and_no_locations() {
        let api = FakeApi::default();
        api.push_search(Ok(SearchResponse::success(Vec::new())));
        let controller = controller(api);

        controller.handle_search_submit().await;

        assert!(controller
            .page()
            .html(Region::TrialsList)
            .unwrap()
            .contains("No clinical trials found"));
        assert!(controller
            .map()
            .widget()
            .last_placeholder()
            .unwrap()
            .contains("No trial locations found"));
    }

    #[tokio::test]
    async fn backend_error_is_shown_and_results_are_kept() {
        let api = FakeApi::default();
        api.push_search(Ok(SearchResponse::success(vec![trial("NCT1", "Kept")])));
        api.push_search(Ok(SearchResponse::failure("too many results")));
        let controller = controller(api);

        controller.handle_search_submit().await;
        let outcome = controller.handle_search_submit().await;

        assert_eq!(outcome, SearchOutcome::Rejected("too many results".into()));
        assert!(controller
            .page()
            .html(Region::TrialsList)
            .unwrap()
            .contains("Error: too many results"));
        assert_eq!(result_ids(&controller), vec!["NCT1"]);
        assert!(controller.view_details("NCT1").is_ok());
    }

    #[tokio::test]
    async fn transport_error_is_shown_inline() {
        let api = FakeApi::default();
        api.push_search(Err(TrialsError::HttpStatus(500)));
        let controller = controller(api);

        let outcome = controller.handle_search_submit().await;

        assert_eq!(outcome, SearchOutcome::Failed("HTTP error! Status: 500".into()));
        assert_eq!(
            controller.page().html(Region::TrialsList).unwrap(),
            r#"<div class="error">Error: HTTP error! Status: 500</div>"#
        );
        assert!(controller.results().is_empty());
    }

    #[tokio::test]
    async fn missing_input_aborts_before_any_request() {
        let page = FakePage::with_criteria(criteria("asthma"));
        page.remove_element(ids::DISTANCE_INPUT);
        let controller = controller_with(FakeApi::default(), page);

        assert_eq!(controller.handle_search_submit().await, SearchOutcome::Aborted);
        assert!(controller.api().search_calls().is_empty());
        assert_eq!(controller.page().html(Region::TrialsList), None);
    }

    #[tokio::test]
    async fn missing_results_region_does_not_stop_the_search() {
        let page = FakePage::with_criteria(criteria("asthma"));
        page.remove_element(ids::RESULTS_SECTION);
        let api = FakeApi::default();
        api.push_search(Ok(SearchResponse::success(vec![trial("NCT1", "One")])));
        let controller = controller_with(api, page);

        assert_eq!(
            controller.handle_search_submit().await,
            SearchOutcome::Displayed { trials: 1, markers: 1 }
        );
    }

    #[tokio::test]
    async fn stale_search_response_is_discarded() {
        let api = FakeApi::default();
        let first_reply = api.push_gated_search();
        let second_reply = api.push_gated_search();
        let controller = controller(api);

        let mut first = pin!(controller.submit_search(criteria("old")));
        assert!(poll!(first.as_mut()).is_pending());
        let mut second = pin!(controller.submit_search(criteria("new")));
        assert!(poll!(second.as_mut()).is_pending());

        assert!(second_reply
            .send(Ok(SearchResponse::success(vec![trial("NEW", "Newer Trial")])))
            .is_ok());
        assert_eq!(
            second.await,
            SearchOutcome::Displayed { trials: 1, markers: 1 }
        );

        assert!(first_reply
            .send(Ok(SearchResponse::success(vec![trial("OLD", "Older Trial")])))
            .is_ok());
        assert_eq!(first.await, SearchOutcome::Stale);

        assert_eq!(result_ids(&controller), vec!["NEW"]);
        let list = controller.page().html(Region::TrialsList).unwrap();
        assert!(list.contains("Newer Trial"));
        assert!(!list.contains("Older Trial"));
    }

    #[tokio::test]
    async fn view_details_fills_and_opens_modal() {
        let controller = loaded(vec![trial("NCT1", "Detail Trial")]).await;

        controller.view_details("NCT1").unwrap();

        let page = controller.page();
        assert_eq!(page.text(Region::ModalTitle).as_deref(), Some("Detail Trial"));
        assert!(page.html(Region::ModalBody).unwrap().contains("CHOP"));
        assert_eq!(page.active_trial().unwrap().as_deref(), Some("NCT1"));
        assert_eq!(page.visible(Region::Modal), Some(true));

        controller.close_details();
        assert_eq!(controller.page().visible(Region::Modal), Some(false));
    }

    #[tokio::test]
    async fn view_details_for_unknown_trial_is_not_found() {
        let controller = loaded(vec![trial("NCT1", "Only")]).await;

        let err = controller.view_details("NCT404").unwrap_err();

        assert!(matches!(err, TrialsError::TrialNotFound(ref id) if id == "NCT404"));
        assert_eq!(controller.page().visible(Region::Modal), None);
    }

    #[tokio::test]
    async fn summary_for_unknown_trial_never_calls_backend() {
        let controller = loaded(vec![trial("NCT1", "Only")]).await;

        assert_eq!(
            controller.request_summary_for("NCT404").await,
            SummaryOutcome::Aborted
        );
        assert!(controller.api().summary_calls().is_empty());
        assert!(controller.page().control_states().is_empty());
    }

    #[tokio::test]
    async fn summary_without_active_trial_is_aborted() {
        let controller = loaded(vec![trial("NCT1", "Only")]).await;

        assert_eq!(controller.request_summary().await, SummaryOutcome::Aborted);
        assert!(controller.api().summary_calls().is_empty());
    }

    #[tokio::test]
    async fn summary_success_replaces_panel() {
        let controller = loaded(vec![trial("NCT1", "Summary Trial")]).await;
        controller
            .api()
            .push_summary(Ok(SummaryResponse::success("Para one.\nPara two.")));
        controller.view_details("NCT1").unwrap();

        assert_eq!(controller.request_summary().await, SummaryOutcome::Displayed);

        let calls = controller.api().summary_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].trial_id.as_str(), "NCT1");
        assert_eq!(calls[0].trial_details.title.as_deref(), Some("Summary Trial"));

        let page = controller.page();
        assert_eq!(page.visible(Region::Modal), Some(false));
        assert_eq!(page.visible(Region::SummarySection), Some(true));
        let content = page.html(Region::SummaryContent).unwrap();
        assert!(content.contains("<h3>Summary Trial</h3>"));
        assert!(content.contains("Para one.<br>Para two."));
        assert_eq!(page.scrolled(), vec![Region::SummarySection]);
        assert_eq!(
            page.control_states(),
            vec![ControlState::Busy, ControlState::Idle]
        );
    }

    #[tokio::test]
    async fn summary_transport_failure_alerts_and_restores_control() {
        let controller = loaded(vec![trial("NCT1", "Summary Trial")]).await;
        controller
            .api()
            .push_summary(Err(TrialsError::Network("connection refused".into())));

        let outcome = controller.request_summary_for("NCT1").await;

        assert_eq!(outcome, SummaryOutcome::Failed("connection refused".into()));
        let page = controller.page();
        assert_eq!(
            page.alerts(),
            vec!["Error generating summary: connection refused".to_string()]
        );
        assert_eq!(
            page.control_states(),
            vec![ControlState::Busy, ControlState::Idle]
        );
        assert_eq!(ControlState::Idle.label(), "Generate Parent-Friendly Summary");
        assert!(!ControlState::Idle.disabled());
        assert_eq!(page.html(Region::SummaryContent), None);
        assert_eq!(page.visible(Region::SummarySection), None);
    }

    #[tokio::test]
    async fn summary_backend_error_uses_reason_or_fallback() {
        let controller = loaded(vec![trial("NCT1", "Summary Trial")]).await;
        controller
            .api()
            .push_summary(Ok(SummaryResponse::failure("model unavailable")));
        controller.api().push_summary(Ok(SummaryResponse {
            status: "error".into(),
            summary: None,
            error: None,
        }));

        controller.request_summary_for("NCT1").await;
        controller.request_summary_for("NCT1").await;

        assert_eq!(
            controller.page().alerts(),
            vec![
                "Error generating summary: model unavailable".to_string(),
                "Error generating summary: Failed to generate summary".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn init_shows_map_placeholder() {
        let controller = controller(FakeApi::default());
        controller.init();
        assert!(controller
            .map()
            .widget()
            .last_placeholder()
            .unwrap()
            .contains("Trial locations will appear here"));
    }

    #[tokio::test]
    async fn marker_popups_are_exclusive() {
        let controller = loaded(vec![trial("NCT1", "One"), trial("NCT2", "Two")]).await;

        assert!(controller.open_marker_popup(0));
        assert!(controller.open_marker_popup(1));
        assert_eq!(controller.map().open_popup_index(), Some(1));
        assert!(controller
            .map()
            .widget()
            .calls()
            .contains(&MapCall::ClosePopup(0)));
    }
}
