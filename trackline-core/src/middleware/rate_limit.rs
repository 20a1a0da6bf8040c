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

//! Per-type fixed-window rate limiting.

use super::Middleware;
use crate::clock::{Clock, SystemClock};
use crate::event::Event;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
struct WindowRecord {
    count: u32,
    window_start_ms: u64,
}

/// Limit events per `category.action` key to `max_events_per_window` per window.
///
/// Windows are fixed-size and reset lazily on the first event after expiry.
/// Counters belong to this instance only.
pub struct RateLimit {
    max_events_per_window: u32,
    window_ms: u64,
    clock: Arc<dyn Clock>,
    windows: Mutex<HashMap<String, WindowRecord>>,
}

impl RateLimit {
    pub fn new(max_events_per_window: u32, window: Duration) -> Self {
        Self::with_clock(max_events_per_window, window, Arc::new(SystemClock))
    }

    pub fn with_clock(max_events_per_window: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            max_events_per_window,
            window_ms: window.as_millis() as u64,
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.lock().len()
    }
}

impl Middleware for RateLimit {
    fn process(&self, event: Event) -> Option<Event> {
        let now = self.clock.now_ms();
        let key = event.type_key();
        let mut windows = self.windows.lock();

        match windows.get_mut(&key) {
            Some(record) if now.saturating_sub(record.window_start_ms) <= self.window_ms => {
                if record.count >= self.max_events_per_window {
                    tracing::debug!(key = %key, count = record.count, "Event rate limited");
                    return None;
                }
                record.count += 1;
            }
            _ => {
                windows.insert(
                    key,
                    WindowRecord {
                        count: 1,
                        window_start_ms: now,
                    },
                );
            }
        }

        Some(event)
    }

    fn name(&self) -> &str {
        "rate_limit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn limiter(clock: &ManualClock) -> RateLimit {
        RateLimit::with_clock(3, Duration::from_millis(1000), Arc::new(clock.clone()))
    }

    #[test]
    fn test_fourth_event_in_window_dropped() {
        let clock = ManualClock::new(10_000);
        let limit = limiter(&clock);

        for _ in 0..3 {
            assert!(limit.process(Event::new("catalog", "view")).is_some());
            clock.advance(10);
        }
        assert!(limit.process(Event::new("catalog", "view")).is_none());
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let clock = ManualClock::new(10_000);
        let limit = limiter(&clock);

        for _ in 0..4 {
            limit.process(Event::new("catalog", "view"));
        }
        assert!(limit.process(Event::new("catalog", "view")).is_none());

        // Window is inclusive of its end
        clock.advance(1000);
        assert!(limit.process(Event::new("catalog", "view")).is_none());

        clock.advance(1);
        assert!(limit.process(Event::new("catalog", "view")).is_some());
        assert!(limit.process(Event::new("catalog", "view")).is_some());
        assert!(limit.process(Event::new("catalog", "view")).is_some());
        assert!(limit.process(Event::new("catalog", "view")).is_none());
    }

    #[test]
    fn test_keys_are_independent() {
        let clock = ManualClock::new(0);
        let limit = limiter(&clock);

        for _ in 0..3 {
            limit.process(Event::new("catalog", "view"));
        }
        assert!(limit.process(Event::new("catalog", "view")).is_none());
        assert!(limit.process(Event::new("catalog", "click")).is_some());
        // Label is not part of the key
        assert!(limit
            .process(Event::new("catalog", "view").with_label("Other"))
            .is_none());
        assert_eq!(limit.tracked_keys(), 2);
    }

    #[test]
    fn test_instances_do_not_share_state() {
        let clock = ManualClock::new(0);
        let a = limiter(&clock);
        let b = limiter(&clock);

        for _ in 0..3 {
            a.process(Event::new("search", "search"));
        }
        assert!(a.process(Event::new("search", "search")).is_none());
        assert!(b.process(Event::new("search", "search")).is_some());
    }
}
