// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Tracker configuration.
//!
//! Supplied once when the tracker is constructed and immutable afterwards.
//! Missing optional fields take the documented defaults, both when built in
//! code and when loaded from TOML.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default path of the analytics event API, relative to `base_url`.
pub const DEFAULT_API_ENDPOINT: &str = "/api/event";

/// Configuration for the event tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Base URL of the analytics instance (script and API are served from here).
    pub base_url: String,

    /// Domain being tracked; also the marker on the injected script tag.
    pub domain: String,

    /// Emit lifecycle diagnostics through `tracing::debug!`.
    #[serde(default)]
    pub debug: bool,

    /// Event API path appended to `base_url` by HTTP beacons.
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,

    /// Hash-based routing mode.
    #[serde(default)]
    pub hash_mode: bool,

    /// Track even when the host is a local development address.
    #[serde(default)]
    pub track_localhost: bool,

    /// Optional cap on the pre-initialization queue. `None` keeps it unbounded.
    #[serde(default)]
    pub max_queue_size: Option<usize>,
}

fn default_api_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

impl TrackerConfig {
    /// Create a configuration with defaults for every optional field.
    pub fn new(base_url: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            domain: domain.into(),
            debug: false,
            api_endpoint: default_api_endpoint(),
            hash_mode: false,
            track_localhost: false,
            max_queue_size: None,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_api_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = endpoint.into();
        self
    }

    pub fn with_hash_mode(mut self, hash_mode: bool) -> Self {
        self.hash_mode = hash_mode;
        self
    }

    pub fn with_track_localhost(mut self, track_localhost: bool) -> Self {
        self.track_localhost = track_localhost;
        self
    }

    pub fn with_max_queue_size(mut self, max: usize) -> Self {
        self.max_queue_size = Some(max);
        self
    }

    /// URL of the analytics script for this instance.
    pub fn script_src(&self) -> String {
        format!("{}/js/script.js", self.base_url.trim_end_matches('/'))
    }

    /// Absolute URL of the event API.
    pub fn event_api_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.api_endpoint)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".into()));
        }
        if self.domain.trim().is_empty() {
            return Err(ConfigError::Invalid("domain must not be empty".into()));
        }
        if !self.api_endpoint.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "api_endpoint must start with '/', got {:?}",
                self.api_endpoint
            )));
        }
        if self.max_queue_size == Some(0) {
            return Err(ConfigError::Invalid(
                "max_queue_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
