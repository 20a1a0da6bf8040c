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

//! CLI configuration file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use trackline_core::{MiddlewareConfig, TrackerConfig};
use trackline_telemetry::LoggingConfig;

/// Top-level config: `[tracker]`, `[middleware]` and `[logging]` tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub tracker: Option<TrackerConfig>,

    #[serde(default)]
    pub middleware: MiddlewareConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        if let Some(tracker) = &config.tracker {
            tracker.validate()?;
        }
        config.middleware.validate()?;
        Ok(config)
    }

    pub fn tracker(&self) -> Result<&TrackerConfig> {
        self.tracker
            .as_ref()
            .context("No [tracker] table in config; pass --config with base_url and domain")
    }
}
