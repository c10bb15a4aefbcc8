//! `web-sys` implementation of [`Page`].

use trials_core::constants::{ids, HIDDEN_CLASS, TRIAL_ID_ATTRIBUTE};
use trials_core::{ControlState, Page, Region, SearchCriteria, TrialsError, TrialsResult};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlInputElement, HtmlSelectElement, ScrollBehavior, ScrollIntoViewOptions,
    Window,
};

/// The live document.
pub struct DomPage {
    window: Window,
    document: Document,
}

impl DomPage {
    pub fn from_window() -> TrialsResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| TrialsError::Browser("no global window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| TrialsError::Browser("window has no document".into()))?;
        Ok(Self { window, document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn element(&self, id: &str) -> TrialsResult<Element> {
        self.document
            .get_element_by_id(id)
            .ok_or_else(|| TrialsError::MissingElement(id.to_string()))
    }

    /// Current value of a form control; text inputs and selects both work.
    fn field_value(&self, id: &str) -> TrialsResult<String> {
        let element = self.element(id)?;
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            return Ok(input.value());
        }
        if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            return Ok(select.value());
        }
        Err(TrialsError::MissingElement(format!("{} is not a form field", id)))
    }
}

pub(crate) fn js_error(err: JsValue) -> TrialsError {
    TrialsError::Browser(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

impl Page for DomPage {
    fn read_criteria(&self) -> TrialsResult<SearchCriteria> {
        Ok(SearchCriteria {
            age: self.field_value(ids::AGE_INPUT)?,
            condition: self.field_value(ids::CONDITION_INPUT)?,
            location: self.field_value(ids::LOCATION_INPUT)?,
            distance: self.field_value(ids::DISTANCE_INPUT)?,
        })
    }

    fn set_html(&self, region: Region, html: &str) -> TrialsResult<()> {
        self.element(region.element_id())?.set_inner_html(html);
        Ok(())
    }

    fn set_text(&self, region: Region, text: &str) -> TrialsResult<()> {
        self.element(region.element_id())?
            .set_text_content(Some(text));
        Ok(())
    }

    fn set_visible(&self, region: Region, visible: bool) -> TrialsResult<()> {
        let classes = self.element(region.element_id())?.class_list();
        if visible {
            classes.remove_1(HIDDEN_CLASS).map_err(js_error)
        } else {
            classes.add_1(HIDDEN_CLASS).map_err(js_error)
        }
    }

    fn scroll_into_view(&self, region: Region) -> TrialsResult<()> {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        self.element(region.element_id())?
            .scroll_into_view_with_scroll_into_view_options(&options);
        Ok(())
    }

    fn set_active_trial(&self, trial_id: &str) -> TrialsResult<()> {
        self.element(ids::SUMMARY_BUTTON)?
            .set_attribute(TRIAL_ID_ATTRIBUTE, trial_id)
            .map_err(js_error)
    }

    fn active_trial(&self) -> TrialsResult<Option<String>> {
        Ok(self
            .element(ids::SUMMARY_BUTTON)?
            .get_attribute(TRIAL_ID_ATTRIBUTE))
    }

    fn set_summary_control(&self, state: ControlState) -> TrialsResult<()> {
        let button = self.element(ids::SUMMARY_BUTTON)?;
        button.set_text_content(Some(state.label()));
        if state.disabled() {
            button.set_attribute("disabled", "").map_err(js_error)
        } else {
            button.remove_attribute("disabled").map_err(js_error)
        }
    }

    fn alert(&self, message: &str) {
        if let Err(err) = self.window.alert_with_message(message) {
            tracing::warn!("alert failed: {}", js_error(err));
        }
    }
}
