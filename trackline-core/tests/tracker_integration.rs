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

//! Integration tests for the tracker pipeline

use std::sync::Arc;
use std::time::Duration;
use trackline_core::clock::ManualClock;
use trackline_core::middleware::{self, Deduplication, MiddlewareChain, RateLimit};
use trackline_core::{
    predefined, props, Event, EventTracker, HeadlessHost, RecordingBeacon, TrackerConfig,
};

fn config() -> TrackerConfig {
    TrackerConfig::new("https://plausible.example.com", "portal.example.com")
}

/// Test events queued before the beacon host is ready drain in order, once
#[test]
fn test_queue_drains_in_order_exactly_once() {
    let beacon = Arc::new(RecordingBeacon::new());
    let host = Arc::new(HeadlessHost::new("portal.example.com").with_beacon(beacon.clone()));
    let tracker = EventTracker::new(config(), host.clone());

    tracker.set_enabled(false);
    for step in ["one", "two", "three"] {
        tracker.track(Event::new("scaffolding", "start").with_label(step));
    }
    assert_eq!(tracker.status().queue_size, 3);
    assert!(beacon.is_empty());

    tracker.set_enabled(true);
    assert_eq!(
        beacon.names(),
        vec![
            "scaffolding.start.one",
            "scaffolding.start.two",
            "scaffolding.start.three"
        ]
    );

    tracker.initialize();
    tracker.set_enabled(true);
    assert_eq!(beacon.len(), 3);
    assert_eq!(host.scripts().len(), 1);
}

/// Test a suppressed tracker never becomes ready and never drains
#[test]
fn test_localhost_suppression_is_stable() {
    let beacon = Arc::new(RecordingBeacon::new());
    let host = Arc::new(HeadlessHost::new("[::1]").with_beacon(beacon.clone()));
    let tracker = EventTracker::new(config(), host);

    for i in 0..10 {
        tracker.track(Event::new("catalog", "view").with_value(i as f64));
        tracker.initialize();
    }

    let status = tracker.status();
    assert!(!status.initialized);
    assert_eq!(status.queue_size, 10);
    assert!(beacon.is_empty());
}

/// Test the rate limit and dedup middleware in front of a tracker
#[test]
fn test_chain_in_front_of_tracker() {
    let clock = ManualClock::new(1_000_000);
    let chain = MiddlewareChain::new()
        .with(middleware::validation)
        .with(Deduplication::with_clock(
            Duration::from_millis(500),
            Arc::new(clock.clone()),
        ))
        .with(RateLimit::with_clock(
            3,
            Duration::from_millis(1000),
            Arc::new(clock.clone()),
        ))
        .with(middleware::privacy);

    let beacon = Arc::new(RecordingBeacon::new());
    let host = Arc::new(HeadlessHost::new("portal.example.com").with_beacon(beacon.clone()));
    let tracker = EventTracker::new(config(), host);

    // Duplicate within 100ms is dropped
    assert!(tracker.track_with(&chain, Event::new("search", "search").with_label("a")));
    clock.advance(100);
    assert!(!tracker.track_with(&chain, Event::new("search", "search").with_label("a")));

    // Distinct labels count toward the same rate limit key
    assert!(tracker.track_with(&chain, Event::new("search", "search").with_label("b")));
    assert!(tracker.track_with(&chain, Event::new("search", "search").with_label("c")));
    assert!(!tracker.track_with(&chain, Event::new("search", "search").with_label("d")));

    clock.advance(1_000);
    assert!(tracker.track_with(
        &chain,
        Event::new("search", "search")
            .with_label("e")
            .with_property("token", "secret-token")
    ));

    let calls = beacon.calls();
    assert_eq!(calls.len(), 4);
    assert!(!calls[3].props.as_ref().unwrap().contains_key("token"));
}

/// Test predefined templates flow through to the beacon with merged properties
#[test]
fn test_predefined_catalog_delivery() {
    let beacon = Arc::new(RecordingBeacon::new());
    let host = Arc::new(HeadlessHost::new("portal.example.com").with_beacon(beacon.clone()));
    let tracker = EventTracker::new(config(), host);

    for (name, template) in predefined::CATALOG.iter() {
        tracker.track_predefined(template, Some(props! { "template" => *name }));
    }

    let calls = beacon.calls();
    assert_eq!(calls.len(), predefined::CATALOG.len());
    for (call, (name, template)) in calls.iter().zip(predefined::CATALOG.iter()) {
        assert_eq!(call.name, template.to_event(None).name());
        let props = call.props.as_ref().unwrap();
        assert_eq!(props.get("template").and_then(|v| v.as_str()), Some(*name));
    }
}
