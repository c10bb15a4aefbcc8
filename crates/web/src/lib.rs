//! Trial finder - browser bindings
//!
//! Wires the core controller to the live page: [`DomPage`] for the document, [`GoogleMapWidget`]
//! for the map and [`HttpTrialsApi`] for the backend, which is assumed to share the page's origin.
//! The map element may carry a `data-max-zoom` attribute to override the zoom cap.

pub mod dom;
pub mod events;
pub mod google_maps;

pub use dom::DomPage;
pub use google_maps::GoogleMapWidget;

use dom::js_error;
use std::rc::Rc;
use trials_api_client::HttpTrialsApi;
use trials_core::config::max_zoom_from_env_value;
use trials_core::constants::ids;
use trials_core::{ClientConfig, TrialsController, TrialsResult};

/// Attribute on the map element that overrides the maximum zoom.
pub const MAX_ZOOM_ATTRIBUTE: &str = "data-max-zoom";

pub type WebController = TrialsController<HttpTrialsApi, DomPage, GoogleMapWidget>;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    match boot() {
        Ok(_) => tracing::info!("clinical trial finder ready"),
        Err(err) => tracing::error!("clinical trial finder failed to start: {}", err),
    }
}

/// Build the controller for the current page and attach its listeners.
pub fn boot() -> TrialsResult<Rc<WebController>> {
    let page = DomPage::from_window()?;
    let origin = page.window().location().origin().map_err(js_error)?;
    let container = page.element(ids::MAP)?;

    let max_zoom = max_zoom_from_env_value(container.get_attribute(MAX_ZOOM_ATTRIBUTE))?;
    let config = ClientConfig::new(&origin)?.with_max_zoom(max_zoom)?;
    tracing::debug!("backend at {}", config.api_base_url());

    let widget = GoogleMapWidget::new(page.document().clone(), container, &config);
    let api = HttpTrialsApi::new(&config)?;
    let controller = Rc::new(TrialsController::new(config, api, page, widget));

    controller.init();
    events::install(&controller)?;
    Ok(controller)
}
