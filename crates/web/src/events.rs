//! Page event wiring.
//!
//! Every listener lives for the life of the page, so closures are leaked with `forget`. Async
//! workflows run on the browser's microtask queue through `spawn_local`.

use crate::dom::js_error;
use crate::google_maps::MARKER_CLICK_EVENT;
use crate::WebController;
use std::rc::Rc;
use trials_core::constants::{ids, TRIAL_ID_ATTRIBUTE};
use trials_core::page::{marker_index_from_detail, trial_id_from_attribute, view_details_selector};
use trials_core::{TrialsError, TrialsResult};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CustomEvent, Element, Event, EventTarget};

/// Attach every page listener to `controller`.
///
/// A missing form or control is logged and skipped; the rest of the page keeps working.
pub fn install(controller: &Rc<WebController>) -> TrialsResult<()> {
    let page = controller.page();
    let document: &EventTarget = page.document().as_ref();

    match page.element(ids::SEARCH_FORM) {
        Ok(form) => {
            listen(&form, "submit", search_handler(controller))?;
            // Also drive the search from the button itself, so the form never submits natively.
            match page.element(ids::SEARCH_BUTTON) {
                Ok(button) => listen(&button, "click", search_handler(controller))?,
                Err(err) => tracing::error!("{}", err),
            }
        }
        Err(err) => tracing::error!("search form unavailable: {}", err),
    }

    match page.document().query_selector(ids::CLOSE_BUTTON_SELECTOR) {
        Ok(Some(close)) => {
            let c = Rc::clone(controller);
            listen(&close, "click", move |_| c.close_details())?;
        }
        Ok(None) => tracing::warn!(
            "{}",
            TrialsError::MissingElement(ids::CLOSE_BUTTON_SELECTOR.into())
        ),
        Err(err) => return Err(js_error(err)),
    }

    match page.element(ids::SUMMARY_BUTTON) {
        Ok(button) => {
            let c = Rc::clone(controller);
            listen(&button, "click", move |_| {
                let c = Rc::clone(&c);
                spawn_local(async move {
                    c.request_summary().await;
                });
            })?;
        }
        Err(err) => tracing::warn!("{}", err),
    }

    // "View Details" controls are rendered on every search, in the list and in map popups.
    let c = Rc::clone(controller);
    listen(document, "click", move |event| {
        if let Some(trial_id) = view_details_target(&event) {
            event.prevent_default();
            // Failures are logged by the controller.
            let _ = c.view_details(&trial_id);
        }
    })?;

    let c = Rc::clone(controller);
    listen(document, MARKER_CLICK_EVENT, move |event| {
        let detail = event
            .dyn_ref::<CustomEvent>()
            .and_then(|custom| custom.detail().as_f64());
        match marker_index_from_detail(detail) {
            Some(index) => {
                c.open_marker_popup(index);
            }
            None => tracing::warn!("marker click without an index"),
        }
    })?;

    tracing::info!("page listeners installed");
    Ok(())
}

fn search_handler(controller: &Rc<WebController>) -> impl FnMut(Event) + 'static {
    let c = Rc::clone(controller);
    move |event: Event| {
        event.prevent_default();
        let c = Rc::clone(&c);
        spawn_local(async move {
            c.handle_search_submit().await;
        });
    }
}

/// Trial id of the "View Details" control an event came from, if any.
fn view_details_target(event: &Event) -> Option<String> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let control = target.closest(&view_details_selector()).ok().flatten()?;
    trial_id_from_attribute(control.get_attribute(TRIAL_ID_ATTRIBUTE))
}

fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> TrialsResult<()> {
    let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target
        .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
        .map_err(js_error)?;
    callback.forget();
    Ok(())
}
