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

//! Duplicate suppression within a time window.

use super::Middleware;
use crate::clock::{Clock, SystemClock};
use crate::event::Event;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Once this many keys are tracked, expired entries are evicted.
pub const DEDUP_CLEANUP_THRESHOLD: usize = 1000;

/// Drop an event if the same `category.action.label` was seen within the window.
///
/// Only events that pass update the last-seen time.
pub struct Deduplication {
    window_ms: u64,
    clock: Arc<dyn Clock>,
    last_seen: Mutex<HashMap<String, u64>>,
}

impl Deduplication {
    pub fn new(window: Duration) -> Self {
        Self::with_clock(window, Arc::new(SystemClock))
    }

    pub fn with_clock(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            window_ms: window.as_millis() as u64,
            clock,
            last_seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn tracked_keys(&self) -> usize {
        self.last_seen.lock().len()
    }

    fn key(event: &Event) -> String {
        format!(
            "{}.{}.{}",
            event.category,
            event.action,
            event.label.as_deref().unwrap_or_default()
        )
    }
}

impl Middleware for Deduplication {
    fn process(&self, event: Event) -> Option<Event> {
        let now = self.clock.now_ms();
        let key = Self::key(&event);
        let mut last_seen = self.last_seen.lock();

        if let Some(&seen) = last_seen.get(&key) {
            if now.saturating_sub(seen) < self.window_ms {
                tracing::debug!(key = %key, "Duplicate event dropped");
                return None;
            }
        }

        last_seen.insert(key, now);

        if last_seen.len() > DEDUP_CLEANUP_THRESHOLD {
            let cutoff = now.saturating_sub(self.window_ms);
            last_seen.retain(|_, seen| *seen >= cutoff);
        }

        Some(event)
    }

    fn name(&self) -> &str {
        "deduplication"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn dedup(clock: &ManualClock) -> Deduplication {
        Deduplication::with_clock(Duration::from_millis(500), Arc::new(clock.clone()))
    }

    fn click() -> Event {
        Event::new("feedback", "click").with_label("Open Feedback Widget")
    }

    #[test]
    fn test_duplicate_within_window_dropped() {
        let clock = ManualClock::new(50_000);
        let dedup = dedup(&clock);

        assert!(dedup.process(click()).is_some());
        clock.advance(100);
        assert!(dedup.process(click()).is_none());
    }

    #[test]
    fn test_outside_window_passes() {
        let clock = ManualClock::new(50_000);
        let dedup = dedup(&clock);

        assert!(dedup.process(click()).is_some());
        clock.advance(600);
        assert!(dedup.process(click()).is_some());
    }

    #[test]
    fn test_dropped_event_does_not_extend_window() {
        let clock = ManualClock::new(0);
        let dedup = dedup(&clock);

        assert!(dedup.process(click()).is_some());
        clock.advance(400);
        assert!(dedup.process(click()).is_none());
        clock.advance(100);
        assert!(dedup.process(click()).is_some());
    }

    #[test]
    fn test_label_distinguishes_events() {
        let clock = ManualClock::new(0);
        let dedup = dedup(&clock);

        assert!(dedup.process(click()).is_some());
        assert!(dedup
            .process(Event::new("feedback", "click").with_label("Other"))
            .is_some());
        assert!(dedup.process(Event::new("feedback", "click")).is_some());
        assert!(dedup.process(Event::new("feedback", "click")).is_none());
    }

    #[test]
    fn test_cleanup_evicts_expired_entries() {
        let clock = ManualClock::new(0);
        let dedup = dedup(&clock);

        for i in 0..DEDUP_CLEANUP_THRESHOLD {
            dedup.process(Event::new("catalog", "view").with_label(format!("item {i}")));
        }
        assert_eq!(dedup.tracked_keys(), DEDUP_CLEANUP_THRESHOLD);

        clock.advance(1_000);
        dedup.process(Event::new("catalog", "view").with_label("fresh"));
        assert_eq!(dedup.tracked_keys(), 1);
    }
}
