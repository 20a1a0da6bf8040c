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

//! Stateless middleware.

use super::Middleware;
use crate::clock::{Clock, SystemClock};
use crate::event::{validate_event, Event, Properties, PropertyValue};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Property keys stripped by [`privacy`]. Exact, case-sensitive match.
pub const SENSITIVE_KEYS: &[&str] = &["email", "password", "token", "apiKey", "secret", "ssn"];

/// String properties longer than this many characters are truncated by [`privacy`].
pub const MAX_STRING_PROPERTY_LEN: usize = 500;

const TRUNCATION_MARKER: &str = "...";

/// Drop events that fail [`validate_event`].
pub fn validation(event: Event) -> Option<Event> {
    if !validate_event(&event) {
        tracing::error!(event = ?event, "Event validation failed");
        return None;
    }
    Some(event)
}

/// Strip sensitive keys and truncate long string values.
pub fn privacy(mut event: Event) -> Option<Event> {
    if let Some(properties) = event.properties.as_mut() {
        for key in SENSITIVE_KEYS {
            properties.remove(*key);
        }

        for value in properties.values_mut() {
            if let PropertyValue::String(s) = value {
                if s.chars().count() > MAX_STRING_PROPERTY_LEN {
                    let mut truncated: String =
                        s.chars().take(MAX_STRING_PROPERTY_LEN).collect();
                    truncated.push_str(TRUNCATION_MARKER);
                    *s = truncated;
                }
            }
        }
    }

    Some(event)
}

/// Keep a random fraction of events.
pub struct Sampling {
    sample_rate: f64,
    rng: Mutex<StdRng>,
}

impl Sampling {
    /// `sample_rate` is clamped into `[0, 1]`.
    pub fn new(sample_rate: f64) -> Self {
        Self::with_rng(sample_rate, StdRng::from_entropy())
    }

    /// Deterministic sampling for tests.
    pub fn with_seed(sample_rate: f64, seed: u64) -> Self {
        Self::with_rng(sample_rate, StdRng::seed_from_u64(seed))
    }

    fn with_rng(sample_rate: f64, rng: StdRng) -> Self {
        let sample_rate = if sample_rate.is_nan() {
            0.0
        } else {
            sample_rate.clamp(0.0, 1.0)
        };
        Self {
            sample_rate,
            rng: Mutex::new(rng),
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

impl Middleware for Sampling {
    fn process(&self, event: Event) -> Option<Event> {
        let draw: f64 = self.rng.lock().gen();
        if draw < self.sample_rate {
            Some(event)
        } else {
            None
        }
    }

    fn name(&self) -> &str {
        "sampling"
    }
}

/// Merge default properties underneath the event's own.
pub struct Enrichment {
    defaults: Properties,
}

impl Enrichment {
    pub fn new(defaults: Properties) -> Self {
        Self { defaults }
    }
}

impl Middleware for Enrichment {
    fn process(&self, mut event: Event) -> Option<Event> {
        let mut merged = self.defaults.clone();
        if let Some(own) = event.properties.take() {
            merged.extend(own);
        }
        event.properties = Some(merged);
        Some(event)
    }

    fn name(&self) -> &str {
        "enrichment"
    }
}

/// Drop events for which the predicate returns false.
pub struct Filter<P> {
    predicate: P,
}

impl<P> Filter<P>
where
    P: Fn(&Event) -> bool + Send + Sync,
{
    pub fn new(predicate: P) -> Self {
        Self { predicate }
    }
}

impl<P> Middleware for Filter<P>
where
    P: Fn(&Event) -> bool + Send + Sync,
{
    fn process(&self, event: Event) -> Option<Event> {
        if (self.predicate)(&event) {
            Some(event)
        } else {
            None
        }
    }

    fn name(&self) -> &str {
        "filter"
    }
}

/// Severity for [`Logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Pass-through that logs each event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logging {
    level: LogLevel,
}

impl Logging {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }
}

impl Middleware for Logging {
    fn process(&self, event: Event) -> Option<Event> {
        let message = format!("Event: {}.{}", event.category, event.action);
        match self.level {
            LogLevel::Debug => tracing::debug!(event = ?event, "{}", message),
            LogLevel::Info => tracing::info!(event = ?event, "{}", message),
            LogLevel::Warn => tracing::warn!(event = ?event, "{}", message),
            LogLevel::Error => tracing::error!(event = ?event, "{}", message),
        }
        Some(event)
    }

    fn name(&self) -> &str {
        "logging"
    }
}

/// Stamp `properties.timestamp` with the current time in milliseconds.
pub struct Timestamp {
    clock: Arc<dyn Clock>,
}

impl Timestamp {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for Timestamp {
    fn process(&self, event: Event) -> Option<Event> {
        Some(event.with_property("timestamp", self.clock.now_ms() as f64))
    }

    fn name(&self) -> &str {
        "timestamp"
    }
}

/// User attributes merged into every event by [`UserContext`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: Option<String>,
    pub team: Option<String>,
    pub role: Option<String>,
}

/// Merge user context over the event's properties. User context wins.
pub struct UserContext<F> {
    provider: F,
}

impl<F> UserContext<F>
where
    F: Fn() -> UserInfo + Send + Sync,
{
    pub fn new(provider: F) -> Self {
        Self { provider }
    }
}

impl<F> Middleware for UserContext<F>
where
    F: Fn() -> UserInfo + Send + Sync,
{
    fn process(&self, mut event: Event) -> Option<Event> {
        let info = (self.provider)();
        let properties = event.properties.get_or_insert_with(Properties::new);

        let fields = [("userId", info.user_id), ("team", info.team), ("role", info.role)];
        for (key, value) in fields {
            if let Some(value) = value {
                properties.insert(key.to_string(), PropertyValue::String(value));
            }
        }
        Some(event)
    }

    fn name(&self) -> &str {
        "user_context"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::props;

    #[test]
    fn test_validation_drops_invalid() {
        assert!(validation(Event::new("", "view")).is_none());
        assert!(validation(Event::new("navigation", "view")).is_some());
    }

    #[test]
    fn test_privacy_strips_sensitive_keys() {
        let event = Event::new("user", "update").with_properties(props! {
            "password" => "hunter2",
            "email" => "a@b.c",
            "apiKey" => "k",
            "Password" => "kept, case-sensitive",
            "team" => "platform",
        });

        let out = privacy(event).unwrap();
        let props = out.properties.unwrap();
        assert!(!props.contains_key("password"));
        assert!(!props.contains_key("email"));
        assert!(!props.contains_key("apiKey"));
        assert!(props.contains_key("Password"));
        assert!(props.contains_key("team"));
    }

    #[test]
    fn test_privacy_truncates_long_strings() {
        let long = "x".repeat(600);
        let event = Event::new("feedback", "submit").with_property("comment", long);

        let out = privacy(event).unwrap();
        let comment = out.property("comment").and_then(|v| v.as_str()).unwrap();
        assert_eq!(comment.len(), 503);
        assert!(comment.ends_with("..."));
        assert_eq!(&comment[..500], "x".repeat(500));
    }

    #[test]
    fn test_privacy_exact_limit_untouched() {
        let exact = "y".repeat(500);
        let event = Event::new("feedback", "submit").with_property("comment", exact.clone());
        let out = privacy(event).unwrap();
        assert_eq!(out.property("comment").and_then(|v| v.as_str()), Some(exact.as_str()));
    }

    #[test]
    fn test_privacy_without_properties() {
        let event = Event::new("navigation", "view");
        assert_eq!(privacy(event.clone()), Some(event));
    }

    #[test]
    fn test_sampling_extremes() {
        let all = Sampling::with_seed(1.0, 7);
        let none = Sampling::with_seed(0.0, 7);
        for _ in 0..200 {
            assert!(all.process(Event::new("a", "b")).is_some());
            assert!(none.process(Event::new("a", "b")).is_none());
        }
    }

    #[test]
    fn test_sampling_rate_is_roughly_honoured() {
        let half = Sampling::with_seed(0.5, 42);
        let kept = (0..2_000)
            .filter(|_| half.process(Event::new("a", "b")).is_some())
            .count();
        assert!((800..1_200).contains(&kept), "kept {kept}");
    }

    #[test]
    fn test_sampling_clamps() {
        assert_eq!(Sampling::new(3.0).sample_rate(), 1.0);
        assert_eq!(Sampling::new(-1.0).sample_rate(), 0.0);
        assert_eq!(Sampling::new(f64::NAN).sample_rate(), 0.0);
    }

    #[test]
    fn test_enrichment_event_wins() {
        let enrich = Enrichment::new(props! { "app" => "portal", "team" => "default" });
        let event = Event::new("catalog", "view").with_property("team", "payments");

        let out = enrich.process(event).unwrap();
        assert_eq!(out.property("app").and_then(|v| v.as_str()), Some("portal"));
        assert_eq!(out.property("team").and_then(|v| v.as_str()), Some("payments"));
    }

    #[test]
    fn test_filter() {
        let only_errors = Filter::new(|e: &Event| e.category.as_str() == "error");
        assert!(only_errors.process(Event::new("error", "error")).is_some());
        assert!(only_errors.process(Event::new("catalog", "view")).is_none());
    }

    #[test]
    fn test_logging_passes_through() {
        let event = Event::new("cicd", "build").with_label("Nightly");
        assert_eq!(Logging::new(LogLevel::Warn).process(event.clone()), Some(event));
    }

    #[test]
    fn test_timestamp_overwrites() {
        let clock = ManualClock::new(1_700_000_000_000);
        let stamp = Timestamp::with_clock(Arc::new(clock.clone()));
        let event = Event::new("metrics", "complete").with_property("timestamp", 1);

        let out = stamp.process(event).unwrap();
        assert_eq!(
            out.property("timestamp").and_then(|v| v.as_f64()),
            Some(1_700_000_000_000.0)
        );
    }

    #[test]
    fn test_user_context_wins_over_existing() {
        let ctx = UserContext::new(|| UserInfo {
            user_id: Some("u-1".into()),
            team: Some("platform".into()),
            role: None,
        });
        let event = Event::new("user", "view").with_properties(props! {
            "team" => "stale",
            "role" => "viewer",
        });

        let out = ctx.process(event).unwrap();
        assert_eq!(out.property("userId").and_then(|v| v.as_str()), Some("u-1"));
        assert_eq!(out.property("team").and_then(|v| v.as_str()), Some("platform"));
        assert_eq!(out.property("role").and_then(|v| v.as_str()), Some("viewer"));
    }
}
