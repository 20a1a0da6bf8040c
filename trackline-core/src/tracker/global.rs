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

//! Process-wide tracker holder with explicit init, get and reset.

use super::EventTracker;
use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::event::{Event, EventTemplate, Properties};
use crate::host::Host;
use parking_lot::RwLock;
use std::sync::Arc;

static TRACKER: RwLock<Option<Arc<EventTracker>>> = parking_lot::const_rwlock(None);

/// Install the global tracker.
///
/// A second call logs a warning and returns the existing tracker, ignoring
/// the new arguments.
pub fn initialize_tracker(config: TrackerConfig, host: Arc<dyn Host>) -> Arc<EventTracker> {
    let mut slot = TRACKER.write();
    if let Some(existing) = slot.as_ref() {
        tracing::warn!("Event tracker already initialized");
        return existing.clone();
    }

    let tracker = Arc::new(EventTracker::new(config, host));
    *slot = Some(tracker.clone());
    tracker
}

/// The global tracker, or [`TrackerError::Uninitialized`].
pub fn get_tracker() -> Result<Arc<EventTracker>> {
    TRACKER.read().clone().ok_or(TrackerError::Uninitialized)
}

/// Remove the global tracker. Existing handles keep working.
pub fn reset_tracker() -> Option<Arc<EventTracker>> {
    TRACKER.write().take()
}

fn current() -> Option<Arc<EventTracker>> {
    let tracker = TRACKER.read().clone();
    if tracker.is_none() {
        tracing::warn!("Event tracker not initialized");
    }
    tracker
}

pub fn track_event(event: Event) {
    if let Some(tracker) = current() {
        tracker.track(event);
    }
}

pub fn track_predefined_event(template: &EventTemplate, properties: Option<Properties>) {
    if let Some(tracker) = current() {
        tracker.track_predefined(template, properties);
    }
}

pub fn track_custom_event(name: &str, properties: Option<Properties>) {
    if let Some(tracker) = current() {
        tracker.track_custom(name, properties);
    }
}
