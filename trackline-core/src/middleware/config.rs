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

//! Declarative middleware chain assembly.

use super::builtin::{privacy, validation, Enrichment, LogLevel, Logging, Sampling, Timestamp};
use super::dedup::Deduplication;
use super::rate_limit::RateLimit;
use super::MiddlewareChain;
use crate::error::ConfigError;
use crate::event::Properties;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub max_events_per_window: u32,
    pub window_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeduplicationConfig {
    pub window_ms: u64,
}

/// Middleware selection, typically the `[middleware]` table of a config file.
///
/// [`build_chain`](Self::build_chain) assembles the enabled middleware in a
/// fixed order: validation, deduplication, rate limit, sampling, enrichment,
/// timestamp, privacy, logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    #[serde(default = "default_true")]
    pub validate: bool,

    #[serde(default = "default_true")]
    pub privacy: bool,

    #[serde(default)]
    pub timestamp: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<f64>,

    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub default_properties: Properties,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deduplication: Option<DeduplicationConfig>,
}

fn default_true() -> bool {
    true
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            validate: true,
            privacy: true,
            timestamp: false,
            sample_rate: None,
            default_properties: Properties::new(),
            log_level: None,
            rate_limit: None,
            deduplication: None,
        }
    }
}

impl MiddlewareConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(rate) = self.sample_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::Invalid(format!(
                    "sample_rate must be within [0, 1], got {rate}"
                )));
            }
        }

        if let Some(limit) = &self.rate_limit {
            if limit.max_events_per_window == 0 {
                return Err(ConfigError::Invalid(
                    "rate_limit.max_events_per_window must be greater than 0".into(),
                ));
            }
            if limit.window_ms == 0 {
                return Err(ConfigError::Invalid(
                    "rate_limit.window_ms must be greater than 0".into(),
                ));
            }
        }

        if let Some(dedup) = &self.deduplication {
            if dedup.window_ms == 0 {
                return Err(ConfigError::Invalid(
                    "deduplication.window_ms must be greater than 0".into(),
                ));
            }
        }

        Ok(())
    }

    pub fn build_chain(&self) -> MiddlewareChain {
        let mut chain = MiddlewareChain::new();

        if self.validate {
            chain.add(validation);
        }
        if let Some(dedup) = self.deduplication {
            chain.add(Deduplication::new(Duration::from_millis(dedup.window_ms)));
        }
        if let Some(limit) = self.rate_limit {
            chain.add(RateLimit::new(
                limit.max_events_per_window,
                Duration::from_millis(limit.window_ms),
            ));
        }
        if let Some(rate) = self.sample_rate {
            chain.add(Sampling::new(rate));
        }
        if !self.default_properties.is_empty() {
            chain.add(Enrichment::new(self.default_properties.clone()));
        }
        if self.timestamp {
            chain.add(Timestamp::new());
        }
        if self.privacy {
            chain.add(privacy);
        }
        if let Some(level) = self.log_level {
            chain.add(Logging::new(level));
        }

        tracing::debug!(middlewares = ?chain.names(), "Built middleware chain");
        chain
    }
}
