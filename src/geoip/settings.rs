//! GeoIP settings file, e.g. ~/.config/geoip-resolver/geoip.json:
//!
//! ```json
//! { "style": "json", "url": "https://geoip.kde.org/v1/calamares", "selector": "time_zone" }
//! ```
//!
//! Missing keys default to empty strings, so an empty object yields a
//! resolver with style `none`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::resolver::Resolver;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse settings {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The three strings that configure a lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoIpSettings {
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub selector: String,
}

impl GeoIpSettings {
    pub fn new(style: impl Into<String>, url: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            url: url.into(),
            selector: selector.into(),
        }
    }

    /// Default settings location under the user's config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("geoip-resolver")
            .join("geoip.json")
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let data = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the default settings file if there is one.
    pub fn load_default() -> Result<Option<Self>, SettingsError> {
        let path = Self::default_path();
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    /// Replace fields with any overrides that are present.
    pub fn merge(mut self, style: Option<String>, url: Option<String>, selector: Option<String>) -> Self {
        if let Some(style) = style {
            self.style = style;
        }
        if let Some(url) = url {
            self.url = url;
        }
        if let Some(selector) = selector {
            self.selector = selector;
        }
        self
    }

    pub fn resolver(&self) -> Resolver {
        Resolver::new(&self.style, &self.url, &self.selector)
    }
}
