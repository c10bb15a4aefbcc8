//! In-memory fakes for the page, map widget and backend.

use crate::api::TrialsApi;
use crate::map::{GeoBounds, GeoPoint, MapWidget, MarkerSpec};
use crate::page::{ControlState, Page, Region};
use crate::{TrialsError, TrialsResult};
use async_trait::async_trait;
use futures::channel::oneshot;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use trial_types::{SearchCriteria, SearchResponse, SummaryRequest, SummaryResponse};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum MapCall {
    Place(usize),
    Remove(usize),
    OpenPopup(usize),
    ClosePopup(usize),
    FitBounds(GeoBounds, u8),
    CenterOn(GeoPoint, u8),
    Placeholder(String),
}

#[derive(Default)]
pub(crate) struct FakeMap {
    calls: RefCell<Vec<MapCall>>,
    titles: RefCell<Vec<String>>,
}

impl FakeMap {
    pub(crate) fn calls(&self) -> Vec<MapCall> {
        self.calls.borrow().clone()
    }

    pub(crate) fn placed_titles(&self) -> Vec<String> {
        self.titles.borrow().clone()
    }

    pub(crate) fn last_placeholder(&self) -> Option<String> {
        self.calls.borrow().iter().rev().find_map(|c| match c {
            MapCall::Placeholder(html) => Some(html.clone()),
            _ => None,
        })
    }

    pub(crate) fn live_markers(&self) -> usize {
        let calls = self.calls.borrow();
        let placed = calls.iter().filter(|c| matches!(c, MapCall::Place(_))).count();
        let removed = calls.iter().filter(|c| matches!(c, MapCall::Remove(_))).count();
        placed - removed
    }
}

impl MapWidget for FakeMap {
    type Marker = usize;

    fn place_marker(&self, spec: &MarkerSpec) -> usize {
        self.calls.borrow_mut().push(MapCall::Place(spec.index));
        self.titles.borrow_mut().push(spec.title.clone());
        spec.index
    }

    fn remove_marker(&self, marker: usize) {
        self.calls.borrow_mut().push(MapCall::Remove(marker));
    }

    fn open_popup(&self, marker: &usize) {
        self.calls.borrow_mut().push(MapCall::OpenPopup(*marker));
    }

    fn close_popup(&self, marker: &usize) {
        self.calls.borrow_mut().push(MapCall::ClosePopup(*marker));
    }

    fn fit_bounds(&self, bounds: &GeoBounds, max_zoom: u8) {
        self.calls
            .borrow_mut()
            .push(MapCall::FitBounds(*bounds, max_zoom));
    }

    fn center_on(&self, point: GeoPoint, zoom: u8) {
        self.calls.borrow_mut().push(MapCall::CenterOn(point, zoom));
    }

    fn show_placeholder(&self, html: &str) {
        self.calls
            .borrow_mut()
            .push(MapCall::Placeholder(html.to_string()));
    }
}

#[derive(Default)]
pub(crate) struct FakePage {
    criteria: RefCell<SearchCriteria>,
    missing: RefCell<HashSet<&'static str>>,
    html: RefCell<HashMap<Region, String>>,
    text: RefCell<HashMap<Region, String>>,
    visible: RefCell<HashMap<Region, bool>>,
    scrolled: RefCell<Vec<Region>>,
    active_trial: RefCell<Option<String>>,
    control_states: RefCell<Vec<ControlState>>,
    alerts: RefCell<Vec<String>>,
}

impl FakePage {
    pub(crate) fn with_criteria(criteria: SearchCriteria) -> Self {
        let page = Self::default();
        *page.criteria.borrow_mut() = criteria;
        page
    }

    /// Pretend the element with `id` is not on the page.
    pub(crate) fn remove_element(&self, id: &'static str) {
        self.missing.borrow_mut().insert(id);
    }

    pub(crate) fn html(&self, region: Region) -> Option<String> {
        self.html.borrow().get(&region).cloned()
    }

    pub(crate) fn text(&self, region: Region) -> Option<String> {
        self.text.borrow().get(&region).cloned()
    }

    pub(crate) fn visible(&self, region: Region) -> Option<bool> {
        self.visible.borrow().get(&region).copied()
    }

    pub(crate) fn scrolled(&self) -> Vec<Region> {
        self.scrolled.borrow().clone()
    }

    pub(crate) fn control_states(&self) -> Vec<ControlState> {
        self.control_states.borrow().clone()
    }

    pub(crate) fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    fn require(&self, id: &'static str) -> TrialsResult<()> {
        if self.missing.borrow().contains(id) {
            return Err(TrialsError::MissingElement(id.to_string()));
        }
        Ok(())
    }
}

impl Page for FakePage {
    fn read_criteria(&self) -> TrialsResult<SearchCriteria> {
        use crate::constants::ids;
        for id in [
            ids::AGE_INPUT,
            ids::CONDITION_INPUT,
            ids::LOCATION_INPUT,
            ids::DISTANCE_INPUT,
        ] {
            self.require(id)?;
        }
        Ok(self.criteria.borrow().clone())
    }

    fn set_html(&self, region: Region, html: &str) -> TrialsResult<()> {
        self.require(region.element_id())?;
        self.html.borrow_mut().insert(region, html.to_string());
        Ok(())
    }

    fn set_text(&self, region: Region, text: &str) -> TrialsResult<()> {
        self.require(region.element_id())?;
        self.text.borrow_mut().insert(region, text.to_string());
        Ok(())
    }

    fn set_visible(&self, region: Region, visible: bool) -> TrialsResult<()> {
        self.require(region.element_id())?;
        self.visible.borrow_mut().insert(region, visible);
        Ok(())
    }

    fn scroll_into_view(&self, region: Region) -> TrialsResult<()> {
        self.require(region.element_id())?;
        self.scrolled.borrow_mut().push(region);
        Ok(())
    }

    fn set_active_trial(&self, trial_id: &str) -> TrialsResult<()> {
        self.require(crate::constants::ids::SUMMARY_BUTTON)?;
        *self.active_trial.borrow_mut() = Some(trial_id.to_string());
        Ok(())
    }

    fn active_trial(&self) -> TrialsResult<Option<String>> {
        self.require(crate::constants::ids::SUMMARY_BUTTON)?;
        Ok(self.active_trial.borrow().clone())
    }

    fn set_summary_control(&self, state: ControlState) -> TrialsResult<()> {
        self.require(crate::constants::ids::SUMMARY_BUTTON)?;
        self.control_states.borrow_mut().push(state);
        Ok(())
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}

/// A scripted backend reply.
pub(crate) enum Reply<T> {
    Ready(TrialsResult<T>),
    Gated(oneshot::Receiver<TrialsResult<T>>),
}

impl<T> Reply<T> {
    async fn resolve(self) -> TrialsResult<T> {
        match self {
            Reply::Ready(result) => result,
            Reply::Gated(rx) => rx
                .await
                .unwrap_or_else(|_| Err(TrialsError::Network("reply dropped".into()))),
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeApi {
    searches: RefCell<VecDeque<Reply<SearchResponse>>>,
    summaries: RefCell<VecDeque<Reply<SummaryResponse>>>,
    search_calls: RefCell<Vec<SearchCriteria>>,
    summary_calls: RefCell<Vec<SummaryRequest>>,
}

impl FakeApi {
    pub(crate) fn push_search(&self, reply: TrialsResult<SearchResponse>) {
        self.searches.borrow_mut().push_back(Reply::Ready(reply));
    }

    /// Queue a search reply that resolves when the returned sender fires.
    pub(crate) fn push_gated_search(&self) -> oneshot::Sender<TrialsResult<SearchResponse>> {
        let (tx, rx) = oneshot::channel();
        self.searches.borrow_mut().push_back(Reply::Gated(rx));
        tx
    }

    pub(crate) fn push_summary(&self, reply: TrialsResult<SummaryResponse>) {
        self.summaries.borrow_mut().push_back(Reply::Ready(reply));
    }

    pub(crate) fn search_calls(&self) -> Vec<SearchCriteria> {
        self.search_calls.borrow().clone()
    }

    pub(crate) fn summary_calls(&self) -> Vec<SummaryRequest> {
        self.summary_calls.borrow().clone()
    }
}

#[async_trait(?Send)]
impl TrialsApi for FakeApi {
    async fn search_trials(&self, criteria: &SearchCriteria) -> TrialsResult<SearchResponse> {
        self.search_calls.borrow_mut().push(criteria.clone());
        let reply = self.searches.borrow_mut().pop_front();
        match reply {
            Some(reply) => reply.resolve().await,
            None => Err(TrialsError::Network("no scripted search reply".into())),
        }
    }

    async fn generate_summary(&self, request: &SummaryRequest) -> TrialsResult<SummaryResponse> {
        self.summary_calls.borrow_mut().push(request.clone());
        let reply = self.summaries.borrow_mut().pop_front();
        match reply {
            Some(reply) => reply.resolve().await,
            None => Err(TrialsError::Network("no scripted summary reply".into())),
        }
    }
}
