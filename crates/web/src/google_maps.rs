//! Google Maps implementation of [`MapWidget`].
//!
//! The JavaScript API is loaded by the page; this module only binds the handful of classes the
//! adapter needs. Marker clicks are not handled here: each marker dispatches a
//! [`MARKER_CLICK_EVENT`] on the document with its index as `detail`, and the event wiring hands
//! that index back to the controller so popup exclusivity stays in one place.
//!
//! Showing a placeholder replaces the map's DOM, so the map object is dropped with it and
//! rebuilt the next time a marker is placed.

use crate::dom::js_error;
use js_sys::{Object, Reflect};
use std::cell::RefCell;
use trials_core::{ClientConfig, GeoBounds, GeoPoint, MapWidget, MarkerSpec, TrialsResult};
use wasm_bindgen::prelude::*;
use web_sys::{CustomEvent, CustomEventInit, Document, Element};

/// Event dispatched on the document when a marker is clicked.
pub const MARKER_CLICK_EVENT: &str = "trial-marker-click";

mod gmaps {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen(js_namespace = ["google", "maps"])]
    extern "C" {
        #[derive(Clone)]
        pub type Map;

        #[wasm_bindgen(constructor, catch)]
        pub fn new(element: &web_sys::Element, options: &JsValue) -> Result<Map, JsValue>;

        #[wasm_bindgen(method, js_name = fitBounds)]
        pub fn fit_bounds(this: &Map, bounds: &LatLngBounds);

        #[wasm_bindgen(method, js_name = setCenter)]
        pub fn set_center(this: &Map, center: &JsValue);

        #[wasm_bindgen(method, js_name = setZoom)]
        pub fn set_zoom(this: &Map, zoom: f64);

        #[wasm_bindgen(method, js_name = getZoom)]
        pub fn get_zoom(this: &Map) -> Option<f64>;
    }

    #[wasm_bindgen(js_namespace = ["google", "maps"])]
    extern "C" {
        pub type Marker;

        #[wasm_bindgen(constructor, catch)]
        pub fn new(options: &JsValue) -> Result<Marker, JsValue>;

        #[wasm_bindgen(method, js_name = setMap)]
        pub fn set_map(this: &Marker, map: Option<&Map>);

        #[wasm_bindgen(method, js_name = addListener)]
        pub fn add_listener(this: &Marker, event: &str, handler: &js_sys::Function) -> JsValue;
    }

    #[wasm_bindgen(js_namespace = ["google", "maps"])]
    extern "C" {
        pub type InfoWindow;

        #[wasm_bindgen(constructor, catch)]
        pub fn new(options: &JsValue) -> Result<InfoWindow, JsValue>;

        #[wasm_bindgen(method)]
        pub fn open(this: &InfoWindow, map: &Map, anchor: &Marker);

        #[wasm_bindgen(method)]
        pub fn close(this: &InfoWindow);
    }

    #[wasm_bindgen(js_namespace = ["google", "maps"])]
    extern "C" {
        pub type LatLngBounds;

        #[wasm_bindgen(constructor, catch)]
        pub fn new() -> Result<LatLngBounds, JsValue>;

        #[wasm_bindgen(method)]
        pub fn extend(this: &LatLngBounds, point: &JsValue);
    }

    #[wasm_bindgen(js_namespace = ["google", "maps", "event"])]
    extern "C" {
        #[wasm_bindgen(js_name = addListenerOnce)]
        pub fn add_listener_once(instance: &Map, event: &str, handler: &JsValue) -> JsValue;

        #[wasm_bindgen(js_name = clearInstanceListeners)]
        pub fn clear_instance_listeners(instance: &Marker);
    }
}

/// A marker on the map with its popup.
pub struct PlacedMarker {
    marker: gmaps::Marker,
    popup: gmaps::InfoWindow,
    _on_click: Closure<dyn FnMut()>,
}

/// Map drawn into the `map` element.
pub struct GoogleMapWidget {
    document: Document,
    container: Element,
    center: GeoPoint,
    zoom: u8,
    map: RefCell<Option<gmaps::Map>>,
}

impl GoogleMapWidget {
    /// Bind to `container`. The map itself is created on the first marker.
    pub fn new(document: Document, container: Element, config: &ClientConfig) -> Self {
        Self {
            document,
            container,
            center: config.default_center(),
            zoom: config.default_zoom(),
            map: RefCell::new(None),
        }
    }

    fn map(&self) -> TrialsResult<gmaps::Map> {
        if let Some(map) = self.map.borrow().as_ref() {
            return Ok(map.clone());
        }

        self.container.set_inner_html("");
        let options = object(&[
            ("center", lat_lng(self.center)?),
            ("zoom", JsValue::from(self.zoom)),
            ("mapTypeId", JsValue::from_str("roadmap")),
        ])?;
        let map = gmaps::Map::new(&self.container, &options).map_err(js_error)?;
        tracing::debug!("created map centred on {:?}", self.center);
        *self.map.borrow_mut() = Some(map.clone());
        Ok(map)
    }

    fn try_place(&self, spec: &MarkerSpec) -> TrialsResult<PlacedMarker> {
        let map = self.map()?;
        let marker = gmaps::Marker::new(&object(&[
            ("position", lat_lng(spec.position)?),
            ("map", map.into()),
            ("title", JsValue::from_str(&spec.title)),
        ])?)
        .map_err(js_error)?;
        let popup = gmaps::InfoWindow::new(&object(&[(
            "content",
            JsValue::from_str(&spec.popup_html),
        )])?)
        .map_err(js_error)?;

        let document = self.document.clone();
        let index = spec.index;
        let on_click = Closure::wrap(Box::new(move || {
            if let Err(err) = dispatch_marker_click(&document, index) {
                tracing::error!("cannot route marker click: {}", err);
            }
        }) as Box<dyn FnMut()>);
        marker.add_listener("click", on_click.as_ref().unchecked_ref());

        Ok(PlacedMarker {
            marker,
            popup,
            _on_click: on_click,
        })
    }
}

impl MapWidget for GoogleMapWidget {
    type Marker = Option<PlacedMarker>;

    fn place_marker(&self, spec: &MarkerSpec) -> Self::Marker {
        self.try_place(spec)
            .inspect_err(|err| tracing::error!("cannot place marker {}: {}", spec.index, err))
            .ok()
    }

    fn remove_marker(&self, marker: Self::Marker) {
        if let Some(placed) = marker {
            placed.popup.close();
            placed.marker.set_map(None);
            gmaps::clear_instance_listeners(&placed.marker);
        }
    }

    fn open_popup(&self, marker: &Self::Marker) {
        let Some(placed) = marker else {
            return;
        };
        match self.map() {
            Ok(map) => placed.popup.open(&map, &placed.marker),
            Err(err) => tracing::error!("cannot open popup: {}", err),
        }
    }

    fn close_popup(&self, marker: &Self::Marker) {
        if let Some(placed) = marker {
            placed.popup.close();
        }
    }

    fn fit_bounds(&self, bounds: &GeoBounds, max_zoom: u8) {
        let result = self.map().and_then(|map| {
            let viewport = gmaps::LatLngBounds::new().map_err(js_error)?;
            viewport.extend(&lat_lng(GeoPoint {
                lat: bounds.south,
                lng: bounds.west,
            })?);
            viewport.extend(&lat_lng(GeoPoint {
                lat: bounds.north,
                lng: bounds.east,
            })?);
            map.fit_bounds(&viewport);

            // fitBounds settles asynchronously; cap the zoom once it has.
            let capped = map.clone();
            let clamp = Closure::once_into_js(move || {
                if capped.get_zoom().is_some_and(|zoom| zoom > f64::from(max_zoom)) {
                    capped.set_zoom(f64::from(max_zoom));
                }
            });
            gmaps::add_listener_once(&map, "idle", &clamp);
            Ok(())
        });
        if let Err(err) = result {
            tracing::error!("cannot fit map to markers: {}", err);
        }
    }

    fn center_on(&self, point: GeoPoint, zoom: u8) {
        let result = self.map().and_then(|map| {
            map.set_center(&lat_lng(point)?);
            map.set_zoom(f64::from(zoom));
            Ok(())
        });
        if let Err(err) = result {
            tracing::error!("cannot centre map: {}", err);
        }
    }

    fn show_placeholder(&self, html: &str) {
        self.map.borrow_mut().take();
        self.container.set_inner_html(html);
    }
}

fn dispatch_marker_click(document: &Document, index: usize) -> TrialsResult<()> {
    let init = CustomEventInit::new();
    init.set_detail(&JsValue::from(index as u32));
    let event = CustomEvent::new_with_event_init_dict(MARKER_CLICK_EVENT, &init)
        .map_err(js_error)?;
    document.dispatch_event(&event).map_err(js_error)?;
    Ok(())
}

/// Build a plain options object.
fn object(entries: &[(&str, JsValue)]) -> TrialsResult<JsValue> {
    let target = Object::new();
    for (key, value) in entries {
        Reflect::set(&target, &JsValue::from_str(key), value).map_err(js_error)?;
    }
    Ok(target.into())
}

fn lat_lng(point: GeoPoint) -> TrialsResult<JsValue> {
    object(&[
        ("lat", JsValue::from_f64(point.lat)),
        ("lng", JsValue::from_f64(point.lng)),
    ])
}
