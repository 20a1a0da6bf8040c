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

//! Trackline Core
//!
//! Typed product-analytics events, a composable middleware chain, a queueing
//! tracker that delivers to an analytics beacon, and lifecycle helpers for UI
//! code.

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod hooks;
pub mod host;
pub mod middleware;
pub mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{TrackerConfig, DEFAULT_API_ENDPOINT};
pub use error::{ConfigError, DeliveryError, Result, TrackerError, ValidationError};
pub use event::{
    check_event, format_event_name, merge_properties, predefined, validate_event, Event,
    EventAction, EventCategory, EventTemplate, Properties, PropertyValue,
};
pub use hooks::{
    ButtonClick, ComponentTracking, ErrorTracking, EventTracking, FormTracking,
    NavigationTracking, PageViewTracking, PerformanceTimer, PerformanceTracking, SearchTracking,
};
pub use host::{
    Beacon, BeaconCall, HeadlessHost, Host, HttpBeacon, RecordingBeacon, ScriptTag, SendOptions,
    StdoutBeacon,
};
pub use middleware::{Middleware, MiddlewareChain, MiddlewareConfig};
pub use tracker::global::{
    get_tracker, initialize_tracker, reset_tracker, track_custom_event, track_event,
    track_predefined_event,
};
pub use tracker::{EventTracker, TrackerPhase, TrackerStatus};
