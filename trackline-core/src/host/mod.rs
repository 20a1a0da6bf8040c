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

//! Host environment and beacon abstractions.
//!
//! A [`Host`] models the page the tracker runs in: its location, the script
//! tags it carries and the analytics beacon the loaded script exposes. The
//! tracker only ever talks to the beacon through the [`Beacon`] trait.

mod http;
mod memory;

pub use http::HttpBeacon;
pub use memory::{BeaconCall, HeadlessHost, RecordingBeacon, StdoutBeacon};

use crate::error::DeliveryError;
use crate::event::Properties;
use std::sync::Arc;

/// Analytics script tag appended to the host during initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    /// Value of the `data-domain` attribute.
    pub domain: String,
    pub src: String,
    pub defer: bool,
}

impl ScriptTag {
    pub fn new(domain: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            src: src.into(),
            defer: true,
        }
    }
}

/// Options passed alongside an event name to the beacon.
#[derive(Default)]
pub struct SendOptions {
    pub props: Option<Properties>,
    /// Overrides the page URL reported with the event.
    pub url: Option<String>,
    /// Invoked once the beacon has accepted the event.
    pub callback: Option<Box<dyn FnOnce() + Send>>,
}

impl SendOptions {
    pub fn with_props(props: Properties) -> Self {
        Self {
            props: Some(props),
            ..Default::default()
        }
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn callback(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }
}

impl std::fmt::Debug for SendOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendOptions")
            .field("props", &self.props)
            .field("url", &self.url)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// The send function exposed by the loaded analytics script.
pub trait Beacon: Send + Sync {
    fn send(&self, name: &str, options: SendOptions) -> Result<(), DeliveryError>;
}

/// Page environment the tracker is attached to.
pub trait Host: Send + Sync {
    fn hostname(&self) -> String;

    fn pathname(&self) -> String;

    /// Whether an analytics script for `domain` is already present.
    fn has_script(&self, domain: &str) -> bool;

    fn append_script(&self, tag: ScriptTag);

    /// The beacon, once the analytics script has loaded.
    fn beacon(&self) -> Option<Arc<dyn Beacon>>;
}
