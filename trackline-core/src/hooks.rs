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

//! Lifecycle helpers for UI code.
//!
//! Each helper holds the tracker it was created with. `new` takes a tracker
//! explicitly; `attach` fetches the global one and fails with
//! [`TrackerError::Uninitialized`](crate::error::TrackerError::Uninitialized)
//! if none is installed. Caller-supplied properties are applied after the
//! helper's own keys and win on collision.

use crate::error::Result;
use crate::event::{merge_properties, predefined, Event, EventTemplate, Properties, PropertyValue};
use crate::props;
use crate::tracker::global::get_tracker;
use crate::tracker::EventTracker;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Instant;

/// Longest error source chain forwarded with [`ErrorTracking::track_error`].
pub const MAX_ERROR_STACK_LEN: usize = 500;

fn spread(own: Properties, caller: Option<Properties>) -> Properties {
    merge_properties(Some(&own), caller.as_ref())
}

/// Direct access to the tracker's event methods.
#[derive(Debug, Clone)]
pub struct EventTracking {
    tracker: Arc<EventTracker>,
}

impl EventTracking {
    pub fn new(tracker: Arc<EventTracker>) -> Self {
        Self { tracker }
    }

    pub fn attach() -> Result<Self> {
        Ok(Self::new(get_tracker()?))
    }

    pub fn track(&self, event: Event) {
        self.tracker.track(event);
    }

    pub fn track_predefined(&self, template: &EventTemplate, properties: Option<Properties>) {
        self.tracker.track_predefined(template, properties);
    }

    pub fn track_custom(&self, name: &str, properties: Option<Properties>) {
        self.tracker.track_custom(name, properties);
    }
}

/// Page view on mount and whenever the dependency value changes.
#[derive(Debug)]
pub struct PageViewTracking<D> {
    tracker: Arc<EventTracker>,
    deps: Option<D>,
}

impl<D: PartialEq> PageViewTracking<D> {
    pub fn new(tracker: Arc<EventTracker>) -> Self {
        Self {
            tracker,
            deps: None,
        }
    }

    pub fn attach() -> Result<Self> {
        Ok(Self::new(get_tracker()?))
    }

    pub fn mount(&mut self, deps: D) {
        self.deps = Some(deps);
        self.tracker.track_page_view(None, None);
    }

    /// Returns true if a page view was sent.
    pub fn update(&mut self, deps: D) -> bool {
        if self.deps.as_ref() == Some(&deps) {
            return false;
        }
        self.mount(deps);
        true
    }
}

/// Sends `component.mount` on creation and `component.unmount` on drop.
#[derive(Debug)]
pub struct ComponentTracking {
    tracker: Arc<EventTracker>,
    properties: Properties,
}

impl ComponentTracking {
    pub fn new(tracker: Arc<EventTracker>, component: &str, properties: Option<Properties>) -> Self {
        let properties = spread(props! { "component" => component }, properties);
        tracker.track_custom("component.mount", Some(properties.clone()));
        Self {
            tracker,
            properties,
        }
    }

    pub fn attach(component: &str, properties: Option<Properties>) -> Result<Self> {
        Ok(Self::new(get_tracker()?, component, properties))
    }
}

impl Drop for ComponentTracking {
    fn drop(&mut self) {
        self.tracker
            .track_custom("component.unmount", Some(std::mem::take(&mut self.properties)));
    }
}

#[derive(Debug, Clone)]
pub struct ButtonClick {
    tracker: Arc<EventTracker>,
    properties: Properties,
}

impl ButtonClick {
    pub fn new(tracker: Arc<EventTracker>, button: &str, properties: Option<Properties>) -> Self {
        Self {
            tracker,
            properties: spread(props! { "button" => button }, properties),
        }
    }

    pub fn attach(button: &str, properties: Option<Properties>) -> Result<Self> {
        Ok(Self::new(get_tracker()?, button, properties))
    }

    pub fn click(&self) {
        self.tracker
            .track_custom("button.click", Some(self.properties.clone()));
    }
}

#[derive(Debug, Clone)]
pub struct FormTracking {
    tracker: Arc<EventTracker>,
    form: String,
}

impl FormTracking {
    pub fn new(tracker: Arc<EventTracker>, form: impl Into<String>) -> Self {
        Self {
            tracker,
            form: form.into(),
        }
    }

    pub fn attach(form: impl Into<String>) -> Result<Self> {
        Ok(Self::new(get_tracker()?, form))
    }

    pub fn start(&self) {
        self.tracker
            .track_custom("form.start", Some(props! { "form" => &self.form }));
    }

    pub fn submit(&self, properties: Option<Properties>) {
        let properties = spread(props! { "form" => &self.form }, properties);
        self.tracker.track_custom("form.submit", Some(properties));
    }

    pub fn error(&self, message: &str, properties: Option<Properties>) {
        let properties = spread(
            props! { "form" => &self.form, "error" => message },
            properties,
        );
        self.tracker.track_custom("form.error", Some(properties));
    }
}

#[derive(Debug, Clone)]
pub struct SearchTracking {
    tracker: Arc<EventTracker>,
    context: String,
}

impl SearchTracking {
    pub fn new(tracker: Arc<EventTracker>, context: impl Into<String>) -> Self {
        Self {
            tracker,
            context: context.into(),
        }
    }

    pub fn attach(context: impl Into<String>) -> Result<Self> {
        Ok(Self::new(get_tracker()?, context))
    }

    pub fn track_search(&self, query: &str, results: Option<usize>) {
        let mut properties = props! { "context" => &self.context, "query" => query };
        if let Some(results) = results {
            properties.insert("results".to_string(), PropertyValue::from(results));
        }
        self.tracker
            .track_predefined(&predefined::SEARCH_CATALOG, Some(properties));
    }
}

#[derive(Debug, Clone)]
pub struct NavigationTracking {
    tracker: Arc<EventTracker>,
}

impl NavigationTracking {
    pub fn new(tracker: Arc<EventTracker>) -> Self {
        Self { tracker }
    }

    pub fn attach() -> Result<Self> {
        Ok(Self::new(get_tracker()?))
    }

    pub fn track_navigation(&self, destination: &str, properties: Option<Properties>) {
        let properties = spread(props! { "destination" => destination }, properties);
        self.tracker
            .track_predefined(&predefined::VIEW_HOMEPAGE, Some(properties));
    }
}

#[derive(Debug, Clone)]
pub struct ErrorTracking {
    tracker: Arc<EventTracker>,
}

impl ErrorTracking {
    pub fn new(tracker: Arc<EventTracker>) -> Self {
        Self { tracker }
    }

    pub fn attach() -> Result<Self> {
        Ok(Self::new(get_tracker()?))
    }

    /// Report an error with its source chain as `errorStack`.
    pub fn track_error(&self, error: &(dyn StdError + 'static), context: Option<Properties>) {
        let mut own = props! { "errorMessage" => error.to_string() };
        if let Some(stack) = error_stack(error) {
            own.insert("errorStack".to_string(), PropertyValue::String(stack));
        }
        self.tracker
            .track_predefined(&predefined::PAGE_ERROR, Some(spread(own, context)));
    }

    pub fn track_api_error(&self, endpoint: &str, status_code: u16, message: &str) {
        let properties = props! {
            "endpoint" => endpoint,
            "statusCode" => status_code.to_string(),
            "errorMessage" => message,
        };
        self.tracker
            .track_predefined(&predefined::API_ERROR, Some(properties));
    }
}

/// `caused by:` lines for each source, capped at [`MAX_ERROR_STACK_LEN`] chars.
fn error_stack(error: &(dyn StdError + 'static)) -> Option<String> {
    let mut lines = Vec::new();
    let mut source = error.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {cause}"));
        source = cause.source();
    }
    if lines.is_empty() {
        return None;
    }
    Some(lines.join("\n").chars().take(MAX_ERROR_STACK_LEN).collect())
}

#[derive(Debug, Clone)]
pub struct PerformanceTracking {
    tracker: Arc<EventTracker>,
    metric: String,
}

impl PerformanceTracking {
    pub fn new(tracker: Arc<EventTracker>, metric: impl Into<String>) -> Self {
        Self {
            tracker,
            metric: metric.into(),
        }
    }

    pub fn attach(metric: impl Into<String>) -> Result<Self> {
        Ok(Self::new(get_tracker()?, metric))
    }

    pub fn track_performance(&self, duration_ms: f64, properties: Option<Properties>) {
        let properties = spread(
            props! { "metric" => &self.metric, "duration" => duration_ms },
            properties,
        );
        self.tracker
            .track_predefined(&predefined::PAGE_LOAD, Some(properties));
    }

    /// Reports the elapsed time when the returned guard is dropped.
    pub fn start_timer(&self) -> PerformanceTimer<'_> {
        PerformanceTimer {
            tracking: self,
            started: Instant::now(),
            properties: None,
        }
    }
}

#[must_use = "the duration is reported when the timer is dropped"]
pub struct PerformanceTimer<'a> {
    tracking: &'a PerformanceTracking,
    started: Instant,
    properties: Option<Properties>,
}

impl PerformanceTimer<'_> {
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = Some(properties);
        self
    }
}

impl Drop for PerformanceTimer<'_> {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        self.tracking
            .track_performance(elapsed_ms, self.properties.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::host::{HeadlessHost, RecordingBeacon};

    fn setup() -> (Arc<EventTracker>, Arc<RecordingBeacon>) {
        let beacon = Arc::new(RecordingBeacon::new());
        let host = Arc::new(HeadlessHost::new("portal.example.com").with_beacon(beacon.clone()));
        let tracker = Arc::new(EventTracker::new(
            TrackerConfig::new("https://plausible.example.com", "portal.example.com"),
            host,
        ));
        (tracker, beacon)
    }

    fn prop<'a>(props: &'a Option<Properties>, key: &str) -> Option<&'a PropertyValue> {
        props.as_ref().and_then(|p| p.get(key))
    }

    #[derive(Debug)]
    struct Wrapped {
        inner: std::io::Error,
    }

    impl std::fmt::Display for Wrapped {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "failed to load catalog")
        }
    }

    impl StdError for Wrapped {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.inner)
        }
    }

    #[test]
    fn test_component_mount_and_unmount() {
        let (tracker, beacon) = setup();
        {
            let _guard = ComponentTracking::new(
                tracker,
                "ServiceCard",
                Some(props! { "variant" => "compact" }),
            );
            assert_eq!(beacon.names(), vec!["component.mount"]);
        }

        let calls = beacon.calls();
        assert_eq!(calls[1].name, "component.unmount");
        assert_eq!(prop(&calls[1].props, "component").and_then(|v| v.as_str()), Some("ServiceCard"));
        assert_eq!(prop(&calls[1].props, "variant").and_then(|v| v.as_str()), Some("compact"));
    }

    #[test]
    fn test_button_click_caller_wins() {
        let (tracker, beacon) = setup();
        let click = ButtonClick::new(tracker, "Deploy", Some(props! { "button" => "Deploy v2" }));
        click.click();
        click.click();

        let calls = beacon.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(prop(&calls[0].props, "button").and_then(|v| v.as_str()), Some("Deploy v2"));
    }

    #[test]
    fn test_form_lifecycle() {
        let (tracker, beacon) = setup();
        let form = FormTracking::new(tracker, "create-service");
        form.start();
        form.submit(Some(props! { "template" => "java" }));
        form.error("name is required", None);

        let calls = beacon.calls();
        assert_eq!(beacon.names(), vec!["form.start", "form.submit", "form.error"]);
        assert_eq!(calls[0].props.as_ref().map(|p| p.len()), Some(1));
        assert_eq!(prop(&calls[1].props, "template").and_then(|v| v.as_str()), Some("java"));
        assert_eq!(
            prop(&calls[2].props, "error").and_then(|v| v.as_str()),
            Some("name is required")
        );
    }

    #[test]
    fn test_search_uses_catalog_template() {
        let (tracker, beacon) = setup();
        let search = SearchTracking::new(tracker, "catalog");
        search.track_search("payments", Some(12));
        search.track_search("billing", None);

        let calls = beacon.calls();
        assert_eq!(calls[0].name, predefined::SEARCH_CATALOG.to_event(None).name());
        assert_eq!(prop(&calls[0].props, "results").and_then(|v| v.as_f64()), Some(12.0));
        assert_eq!(prop(&calls[0].props, "context").and_then(|v| v.as_str()), Some("catalog"));
        assert!(prop(&calls[1].props, "results").is_none());
    }

    #[test]
    fn test_navigation() {
        let (tracker, beacon) = setup();
        NavigationTracking::new(tracker).track_navigation("/docs", Some(props! { "from" => "/" }));

        let calls = beacon.calls();
        assert_eq!(calls[0].name, predefined::VIEW_HOMEPAGE.to_event(None).name());
        assert_eq!(prop(&calls[0].props, "destination").and_then(|v| v.as_str()), Some("/docs"));
    }

    #[test]
    fn test_error_with_source_chain() {
        let (tracker, beacon) = setup();
        let error = Wrapped {
            inner: std::io::Error::new(std::io::ErrorKind::TimedOut, "upstream timed out"),
        };
        ErrorTracking::new(tracker).track_error(&error, Some(props! { "page" => "/catalog" }));

        let calls = beacon.calls();
        assert_eq!(calls[0].name, predefined::PAGE_ERROR.to_event(None).name());
        assert_eq!(
            prop(&calls[0].props, "errorMessage").and_then(|v| v.as_str()),
            Some("failed to load catalog")
        );
        assert_eq!(
            prop(&calls[0].props, "errorStack").and_then(|v| v.as_str()),
            Some("caused by: upstream timed out")
        );
        assert_eq!(prop(&calls[0].props, "page").and_then(|v| v.as_str()), Some("/catalog"));
    }

    #[test]
    fn test_error_without_source_omits_stack() {
        let (tracker, beacon) = setup();
        let error = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        ErrorTracking::new(tracker).track_error(&error, None);
        assert!(prop(&beacon.calls()[0].props, "errorStack").is_none());
    }

    #[test]
    fn test_api_error_status_is_string() {
        let (tracker, beacon) = setup();
        ErrorTracking::new(tracker).track_api_error("/api/services", 503, "Service Unavailable");

        let calls = beacon.calls();
        assert_eq!(calls[0].name, predefined::API_ERROR.to_event(None).name());
        assert_eq!(prop(&calls[0].props, "statusCode").and_then(|v| v.as_str()), Some("503"));
    }

    #[test]
    fn test_performance_timer_reports_on_drop() {
        let (tracker, beacon) = setup();
        let perf = PerformanceTracking::new(tracker, "catalog_render");
        {
            let _timer = perf
                .start_timer()
                .with_properties(props! { "items" => 40 });
        }
        perf.track_performance(125.0, None);

        let calls = beacon.calls();
        assert_eq!(calls.len(), 2);
        assert!(prop(&calls[0].props, "duration").and_then(|v| v.as_f64()).is_some());
        assert_eq!(prop(&calls[0].props, "items").and_then(|v| v.as_f64()), Some(40.0));
        assert_eq!(prop(&calls[1].props, "duration").and_then(|v| v.as_f64()), Some(125.0));
        assert_eq!(
            prop(&calls[1].props, "metric").and_then(|v| v.as_str()),
            Some("catalog_render")
        );
    }

    #[test]
    fn test_page_view_fires_on_change_only() {
        let (tracker, beacon) = setup();
        let mut page = PageViewTracking::new(tracker);
        page.mount("/catalog");
        assert!(!page.update("/catalog"));
        assert!(page.update("/docs"));
        assert_eq!(beacon.names(), vec!["pageview", "pageview"]);
    }
}
