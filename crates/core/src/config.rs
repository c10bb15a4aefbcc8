//! Client runtime configuration.
//!
//! Configuration is resolved once at start-up (from the page origin in the browser, from the
//! environment in the CLI) and then handed to the controller and the HTTP client. Nothing in the
//! workflows reads settings after construction.

use crate::constants::{
    DEFAULT_MAP_CENTER, DEFAULT_MAP_ZOOM, DEFAULT_MAX_ZOOM, GENERATE_SUMMARY_PATH,
    SEARCH_TRIALS_PATH, WIDGET_MAX_ZOOM,
};
use crate::map::GeoPoint;
use crate::{TrialsError, TrialsResult};
use url::Url;

/// Client configuration resolved at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    api_base_url: String,
    search_path: String,
    summary_path: String,
    max_zoom: u8,
    default_center: GeoPoint,
    default_zoom: u8,
}

impl ClientConfig {
    /// Create a configuration for the backend at `api_base_url` with the default endpoint paths
    /// and map settings.
    pub fn new(api_base_url: &str) -> TrialsResult<Self> {
        let (lat, lng) = DEFAULT_MAP_CENTER;
        Ok(Self {
            api_base_url: normalise_api_base_url(api_base_url)?,
            search_path: SEARCH_TRIALS_PATH.into(),
            summary_path: GENERATE_SUMMARY_PATH.into(),
            max_zoom: DEFAULT_MAX_ZOOM,
            default_center: GeoPoint { lat, lng },
            default_zoom: DEFAULT_MAP_ZOOM,
        })
    }

    /// Override the closest zoom the map may reach after fitting markers.
    pub fn with_max_zoom(mut self, max_zoom: u8) -> TrialsResult<Self> {
        validate_zoom(max_zoom)?;
        self.max_zoom = max_zoom;
        Ok(self)
    }

    /// Override the endpoint paths. Both must start with `/`.
    pub fn with_paths(mut self, search_path: &str, summary_path: &str) -> TrialsResult<Self> {
        for path in [search_path, summary_path] {
            if !path.starts_with('/') {
                return Err(TrialsError::InvalidConfig(format!(
                    "endpoint path must start with '/': {}",
                    path
                )));
            }
        }
        self.search_path = search_path.into();
        self.summary_path = summary_path.into();
        Ok(self)
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn search_url(&self) -> String {
        format!("{}{}", self.api_base_url, self.search_path)
    }

    pub fn summary_url(&self) -> String {
        format!("{}{}", self.api_base_url, self.summary_path)
    }

    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    pub fn default_center(&self) -> GeoPoint {
        self.default_center
    }

    pub fn default_zoom(&self) -> u8 {
        self.default_zoom
    }
}

/// Check that `value` is an absolute http(s) URL with a host and no query or fragment, then
/// strip trailing slashes so endpoint paths can be appended.
pub fn normalise_api_base_url(value: &str) -> TrialsResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TrialsError::InvalidConfig("api base url cannot be empty".into()));
    }

    let url = Url::parse(value)
        .map_err(|e| TrialsError::InvalidConfig(format!("invalid api base url {}: {}", value, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(TrialsError::InvalidConfig(format!(
            "api base url must use http or https: {}",
            value
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(TrialsError::InvalidConfig(format!(
            "api base url has no host: {}",
            value
        )));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(TrialsError::InvalidConfig(format!(
            "api base url cannot carry a query or fragment: {}",
            value
        )));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Parse the maximum zoom from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_MAX_ZOOM`].
pub fn max_zoom_from_env_value(value: Option<String>) -> TrialsResult<u8> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(value) = value else {
        return Ok(DEFAULT_MAX_ZOOM);
    };

    let zoom = value
        .parse::<u8>()
        .map_err(|_| TrialsError::InvalidConfig(format!("invalid max zoom: {}", value)))?;
    validate_zoom(zoom)?;
    Ok(zoom)
}

fn validate_zoom(zoom: u8) -> TrialsResult<()> {
    if zoom == 0 || zoom > WIDGET_MAX_ZOOM {
        return Err(TrialsError::InvalidConfig(format!(
            "max zoom must be between 1 and {}, got {}",
            WIDGET_MAX_ZOOM, zoom
        )));
    }
    Ok(())
}
