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

//! Event tracker: pre-initialization queue, validation and beacon delivery.

pub mod global;

use crate::config::TrackerConfig;
use crate::event::{format_event_name, validate_event, Event, EventTemplate, Properties, PropertyValue};
use crate::host::{Host, ScriptTag, SendOptions};
use crate::middleware::MiddlewareChain;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

/// Hostnames on which tracking is suppressed unless `track_localhost` is set.
pub const LOCALHOST_NAMES: &[&str] = &["localhost", "127.0.0.1", "[::1]"];

/// Lifecycle of an [`EventTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerPhase {
    Uninitialized,
    Initializing,
    Ready,
}

/// Snapshot returned by [`EventTracker::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrackerStatus {
    pub initialized: bool,
    pub queue_size: usize,
}

#[derive(Debug)]
struct TrackerState {
    phase: TrackerPhase,
    queue: VecDeque<Event>,
}

/// Emits only when `debug` is enabled in the tracker config.
macro_rules! debug_log {
    ($tracker:expr, $($arg:tt)+) => {
        if $tracker.config.debug {
            tracing::debug!($($arg)+);
        }
    };
}

/// Validates events and hands them to the host's beacon.
///
/// Events tracked before the tracker is ready are queued and delivered in
/// submission order once initialization succeeds. Delivery failures are
/// logged and dropped.
pub struct EventTracker {
    config: TrackerConfig,
    host: Arc<dyn Host>,
    state: Mutex<TrackerState>,
}

impl EventTracker {
    /// Create a tracker and attempt initialization immediately.
    pub fn new(config: TrackerConfig, host: Arc<dyn Host>) -> Self {
        let tracker = Self {
            config,
            host,
            state: Mutex::new(TrackerState {
                phase: TrackerPhase::Uninitialized,
                queue: VecDeque::new(),
            }),
        };
        tracker.initialize();
        tracker
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn phase(&self) -> TrackerPhase {
        self.state.lock().phase
    }

    /// True when running on a local host with `track_localhost` disabled.
    pub fn is_suppressed(&self) -> bool {
        !self.config.track_localhost && LOCALHOST_NAMES.contains(&self.host.hostname().as_str())
    }

    /// Load the analytics script and flush the queue. No-op once ready.
    ///
    /// The tracker stays in [`TrackerPhase::Initializing`] until the queue is
    /// empty, so events tracked while the backlog drains (from another thread
    /// or from a beacon) are appended behind it.
    pub fn initialize(&self) {
        {
            let mut state = self.state.lock();
            if state.phase != TrackerPhase::Uninitialized {
                return;
            }
            if self.is_suppressed() {
                debug_log!(self, hostname = %self.host.hostname(), "Tracking disabled on localhost");
                return;
            }

            state.phase = TrackerPhase::Initializing;
            self.load_script();
        }

        debug_log!(self, domain = %self.config.domain, "Event tracker initialized");

        loop {
            let pending = {
                let mut state = self.state.lock();
                if state.phase != TrackerPhase::Initializing {
                    // Disabled mid-drain; the rest stays queued.
                    return;
                }
                if state.queue.is_empty() {
                    state.phase = TrackerPhase::Ready;
                    return;
                }
                std::mem::take(&mut state.queue)
            };

            debug_log!(self, count = pending.len(), "Processing queued events");
            for event in &pending {
                self.send_event(event);
            }
        }
    }

    fn load_script(&self) {
        if self.host.has_script(&self.config.domain) {
            debug_log!(self, "Analytics script already loaded");
            return;
        }
        self.host
            .append_script(ScriptTag::new(&self.config.domain, self.config.script_src()));
        debug_log!(self, src = %self.config.script_src(), "Analytics script loaded");
    }

    /// Validate and deliver an event, queueing it if the tracker is not ready.
    ///
    /// Returns `false` when the event is rejected by validation or cannot be
    /// queued.
    pub fn track(&self, event: Event) -> bool {
        if !validate_event(&event) {
            return false;
        }

        {
            let mut state = self.state.lock();
            if state.phase != TrackerPhase::Ready {
                if let Some(max) = self.config.max_queue_size {
                    if max == 0 {
                        tracing::warn!(
                            event = %event.type_key(),
                            "Event queue has zero capacity, dropping event"
                        );
                        return false;
                    }
                    while state.queue.len() >= max {
                        let Some(evicted) = state.queue.pop_front() else {
                            break;
                        };
                        tracing::warn!(
                            event = %evicted.type_key(),
                            max_queue_size = max,
                            "Event queue full, dropping oldest event"
                        );
                    }
                }
                debug_log!(self, event = ?event, "Event queued (tracker not initialized)");
                state.queue.push_back(event);
                return true;
            }
        }

        self.send_event(&event);
        true
    }

    /// Track a template, with `properties` overriding the template's own.
    pub fn track_predefined(&self, template: &EventTemplate, properties: Option<Properties>) {
        self.track(template.to_event(properties));
    }

    /// Run `event` through `chain` and track whatever survives.
    ///
    /// Returns `true` only if the chain kept the event and [`track`](Self::track)
    /// accepted it.
    pub fn track_with(&self, chain: &MiddlewareChain, event: Event) -> bool {
        match chain.execute(event) {
            Some(event) => self.track(event),
            None => false,
        }
    }

    /// Send a page view directly to the beacon, bypassing queue and validation.
    pub fn track_page_view(&self, url: Option<&str>, properties: Option<Properties>) {
        let Some(beacon) = self.host.beacon() else {
            debug_log!(self, "Analytics beacon not available, page view not sent");
            return;
        };

        let page_url = url.map(str::to_string).unwrap_or_else(|| self.host.pathname());
        debug_log!(self, url = %page_url, "Tracking page view");

        let options = SendOptions {
            props: properties,
            url: Some(page_url),
            callback: None,
        };
        if let Err(e) = beacon.send("pageview", options) {
            tracing::error!(error = %e, "Error sending page view");
        }
    }

    /// Send a named event directly to the beacon, bypassing queue and validation.
    pub fn track_custom(&self, name: &str, properties: Option<Properties>) {
        let Some(beacon) = self.host.beacon() else {
            debug_log!(self, event = name, "Analytics beacon not available, custom event not sent");
            return;
        };

        debug_log!(self, event = name, properties = ?properties, "Tracking custom event");
        let options = SendOptions {
            props: properties,
            ..Default::default()
        };
        if let Err(e) = beacon.send(name, options) {
            tracing::error!(event = name, error = %e, "Error sending custom event");
        }
    }

    fn send_event(&self, event: &Event) {
        let Some(beacon) = self.host.beacon() else {
            tracing::warn!(event = %event.type_key(), "Analytics beacon not available, event not sent");
            return;
        };

        let name = format_event_name(event);
        let props = delivery_properties(event);
        debug_log!(self, event = %name, props = ?props, "Sending event");

        if let Err(e) = beacon.send(&name, SendOptions::with_props(props)) {
            tracing::error!(event = %name, error = %e, "Error sending event");
        }
    }

    /// Disabling returns the tracker to the uninitialized phase so new events
    /// queue. Enabling re-runs [`initialize`](Self::initialize), which drains
    /// anything queued in the meantime unless the host is suppressed.
    pub fn set_enabled(&self, enabled: bool) {
        if enabled {
            self.initialize();
        } else {
            self.state.lock().phase = TrackerPhase::Uninitialized;
            debug_log!(self, "Tracking disabled");
        }
    }

    pub fn status(&self) -> TrackerStatus {
        let state = self.state.lock();
        TrackerStatus {
            initialized: state.phase == TrackerPhase::Ready,
            queue_size: state.queue.len(),
        }
    }
}

impl std::fmt::Debug for EventTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventTracker")
            .field("config", &self.config)
            .field("status", &self.status())
            .finish()
    }
}

/// Label, then value, then the event's own properties. Later keys win.
fn delivery_properties(event: &Event) -> Properties {
    let mut props = Properties::new();
    if let Some(label) = event.label.as_ref().filter(|l| !l.is_empty()) {
        props.insert("label".to_string(), PropertyValue::String(label.clone()));
    }
    if let Some(value) = event.value {
        props.insert("value".to_string(), PropertyValue::Number(value));
    }
    if let Some(own) = &event.properties {
        props.extend(own.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    props
}
