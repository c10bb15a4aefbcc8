//! Map adapter.
//!
//! Projects trial locations onto a [`MapWidget`]. The adapter owns the current marker list and
//! the index of the open popup; the widget only knows how to draw. Every update removes all
//! markers and places the new set from scratch.

use crate::render;
use std::cell::{Cell, RefCell};
use trial_types::{Location, TrialId, TrialRecord};

/// Marker title used when a location has no facility name.
const DEFAULT_MARKER_TITLE: &str = "Clinical Trial Site";

/// A point in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Read a location's coordinates, if both are finite and in range.
    pub fn from_location(location: &Location) -> Option<Self> {
        let lat = location.latitude.as_ref()?.degrees()?;
        let lng = location.longitude.as_ref()?.degrees()?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return None;
        }
        Some(Self { lat, lng })
    }
}

/// Smallest latitude/longitude box containing a set of points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    pub fn around(point: GeoPoint) -> Self {
        Self {
            south: point.lat,
            west: point.lng,
            north: point.lat,
            east: point.lng,
        }
    }

    pub fn extend(&mut self, point: GeoPoint) {
        self.south = self.south.min(point.lat);
        self.north = self.north.max(point.lat);
        self.west = self.west.min(point.lng);
        self.east = self.east.max(point.lng);
    }

    /// True when every point the bounds were built from coincides.
    pub fn is_single_point(&self) -> bool {
        self.south == self.north && self.west == self.east
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lat: (self.south + self.north) / 2.0,
            lng: (self.west + self.east) / 2.0,
        }
    }
}

/// Everything a widget needs to draw one marker and its popup.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerSpec {
    /// Position in the adapter's marker list; marker click events report it back.
    pub index: usize,
    pub trial_id: TrialId,
    pub position: GeoPoint,
    pub title: String,
    pub popup_html: String,
}

/// Drawing surface for markers, popups and placeholders.
///
/// Implementations wrap a real mapping library in the browser and record calls in tests.
pub trait MapWidget {
    /// Handle to a placed marker.
    type Marker;

    fn place_marker(&self, spec: &MarkerSpec) -> Self::Marker;
    fn remove_marker(&self, marker: Self::Marker);
    fn open_popup(&self, marker: &Self::Marker);
    fn close_popup(&self, marker: &Self::Marker);
    /// Fit the viewport to `bounds`, never ending up closer than `max_zoom`.
    fn fit_bounds(&self, bounds: &GeoBounds, max_zoom: u8);
    fn center_on(&self, point: GeoPoint, zoom: u8);
    /// Replace the map with static markup.
    fn show_placeholder(&self, html: &str);
}

/// Result of one map update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MapUpdate {
    /// No location had usable coordinates; the placeholder is showing.
    NoLocations,
    Markers { count: usize, bounds: GeoBounds },
}

/// Build marker specs for every mappable location, in trial then location order.
pub fn marker_specs(trials: &[TrialRecord]) -> Vec<MarkerSpec> {
    trials
        .iter()
        .flat_map(|trial| {
            trial.locations.iter().filter_map(move |location| {
                GeoPoint::from_location(location).map(|position| (trial, location, position))
            })
        })
        .enumerate()
        .map(|(index, (trial, location, position))| MarkerSpec {
            index,
            trial_id: trial.id.clone(),
            position,
            title: match location.facility.as_deref() {
                Some(facility) if !facility.is_empty() => facility.to_string(),
                _ => DEFAULT_MARKER_TITLE.to_string(),
            },
            popup_html: render::render_popup(trial, location),
        })
        .collect()
}

/// Owns the markers drawn on a [`MapWidget`].
pub struct MapAdapter<W: MapWidget> {
    widget: W,
    max_zoom: u8,
    markers: RefCell<Vec<W::Marker>>,
    open_popup: Cell<Option<usize>>,
}

impl<W: MapWidget> MapAdapter<W> {
    pub fn new(widget: W, max_zoom: u8) -> Self {
        Self {
            widget,
            max_zoom,
            markers: RefCell::new(Vec::new()),
            open_popup: Cell::new(None),
        }
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn marker_count(&self) -> usize {
        self.markers.borrow().len()
    }

    pub fn open_popup_index(&self) -> Option<usize> {
        self.open_popup.get()
    }

    /// Show the start-up placeholder.
    pub fn show_initial_placeholder(&self) {
        self.clear();
        self.widget.show_placeholder(render::map_placeholder_html());
    }

    /// Replace every marker with the mappable locations of `trials`.
    pub fn render_map(&self, trials: &[TrialRecord]) -> MapUpdate {
        self.clear();

        let specs = marker_specs(trials);
        let Some(first) = specs.first() else {
            tracing::info!("no mappable trial locations in {} trials", trials.len());
            self.widget.show_placeholder(render::no_locations_html());
            return MapUpdate::NoLocations;
        };

        let mut bounds = GeoBounds::around(first.position);
        let mut markers = self.markers.borrow_mut();
        for spec in &specs {
            bounds.extend(spec.position);
            markers.push(self.widget.place_marker(spec));
        }
        drop(markers);

        if bounds.is_single_point() {
            self.widget.center_on(bounds.center(), self.max_zoom);
        } else {
            self.widget.fit_bounds(&bounds, self.max_zoom);
        }

        tracing::info!("placed {} trial location markers", specs.len());
        MapUpdate::Markers {
            count: specs.len(),
            bounds,
        }
    }

    /// Open the popup of marker `index`, closing whichever popup is open.
    ///
    /// Returns `false` when no such marker exists.
    pub fn open_popup(&self, index: usize) -> bool {
        let markers = self.markers.borrow();
        let Some(marker) = markers.get(index) else {
            tracing::warn!("marker {} does not exist", index);
            return false;
        };

        if let Some(open) = self.open_popup.get() {
            if let Some(previous) = markers.get(open) {
                self.widget.close_popup(previous);
            }
        }
        self.widget.open_popup(marker);
        self.open_popup.set(Some(index));
        true
    }

    /// Remove all markers.
    pub fn clear(&self) {
        self.open_popup.set(None);
        let markers = std::mem::take(&mut *self.markers.borrow_mut());
        for marker in markers {
            self.widget.remove_marker(marker);
        }
    }
}
