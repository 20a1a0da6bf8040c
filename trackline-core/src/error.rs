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

//! Error types for the tracking pipeline.
//!
//! Per-event failures (validation, delivery) are normally absorbed and logged
//! by the tracker. The only error surfaced to callers on the hot path is
//! [`TrackerError::Uninitialized`], which indicates a setup bug.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Top-level tracker error.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The global tracker was accessed before `initialize_tracker`.
    #[error("Event tracker not initialized. Call initialize_tracker() first.")]
    Uninitialized,

    #[error("Invalid event: {0}")]
    InvalidEvent(#[from] ValidationError),

    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Structural problems that make an event undeliverable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Event must have a category")]
    MissingCategory,

    #[error("Event must have an action")]
    MissingAction,

    #[error("Event properties must be serializable: {0}")]
    Unserializable(String),
}

/// Failures at the beacon boundary.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Analytics beacon not available")]
    BeaconUnavailable,

    #[error("Beacon rejected event: {0}")]
    Rejected(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Analytics API returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
