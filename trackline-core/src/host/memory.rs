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

//! In-process host and beacon implementations.

use super::{Beacon, Host, ScriptTag, SendOptions};
use crate::error::DeliveryError;
use crate::event::Properties;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;

/// Page without a browser.
///
/// Script tags are recorded rather than loaded, so the beacon is whatever
/// was passed to [`with_beacon`](Self::with_beacon) or
/// [`install_beacon`](Self::install_beacon).
pub struct HeadlessHost {
    hostname: String,
    pathname: String,
    scripts: Mutex<Vec<ScriptTag>>,
    beacon: RwLock<Option<Arc<dyn Beacon>>>,
}

impl HeadlessHost {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            pathname: "/".to_string(),
            scripts: Mutex::new(Vec::new()),
            beacon: RwLock::new(None),
        }
    }

    pub fn with_pathname(mut self, pathname: impl Into<String>) -> Self {
        self.pathname = pathname.into();
        self
    }

    pub fn with_beacon(self, beacon: Arc<dyn Beacon>) -> Self {
        *self.beacon.write() = Some(beacon);
        self
    }

    /// Make a beacon available after construction, as when the script loads.
    pub fn install_beacon(&self, beacon: Arc<dyn Beacon>) {
        *self.beacon.write() = Some(beacon);
    }

    pub fn scripts(&self) -> Vec<ScriptTag> {
        self.scripts.lock().clone()
    }
}

impl Host for HeadlessHost {
    fn hostname(&self) -> String {
        self.hostname.clone()
    }

    fn pathname(&self) -> String {
        self.pathname.clone()
    }

    fn has_script(&self, domain: &str) -> bool {
        self.scripts.lock().iter().any(|tag| tag.domain == domain)
    }

    fn append_script(&self, tag: ScriptTag) {
        self.scripts.lock().push(tag);
    }

    fn beacon(&self) -> Option<Arc<dyn Beacon>> {
        self.beacon.read().clone()
    }
}

/// A single call captured by [`RecordingBeacon`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeaconCall {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<Properties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl BeaconCall {
    fn from_options(name: &str, options: &SendOptions) -> Self {
        Self {
            name: name.to_string(),
            props: options.props.clone(),
            url: options.url.clone(),
        }
    }
}

/// Beacon that records every call.
#[derive(Debug, Default)]
pub struct RecordingBeacon {
    calls: Mutex<Vec<BeaconCall>>,
    failing: bool,
}

impl RecordingBeacon {
    pub fn new() -> Self {
        Self::default()
    }

    /// A beacon whose every send fails after recording the call.
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    pub fn calls(&self) -> Vec<BeaconCall> {
        self.calls.lock().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl Beacon for RecordingBeacon {
    fn send(&self, name: &str, options: SendOptions) -> Result<(), DeliveryError> {
        self.calls.lock().push(BeaconCall::from_options(name, &options));

        if self.failing {
            return Err(DeliveryError::Rejected(format!("refused {name}")));
        }
        if let Some(callback) = options.callback {
            callback();
        }
        Ok(())
    }
}

/// Beacon that writes one JSON line per event to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutBeacon;

impl Beacon for StdoutBeacon {
    fn send(&self, name: &str, options: SendOptions) -> Result<(), DeliveryError> {
        let line = serde_json::to_string(&BeaconCall::from_options(name, &options))?;

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "{line}").map_err(|e| DeliveryError::Rejected(e.to_string()))?;

        if let Some(callback) = options.callback {
            callback();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_headless_host_scripts() {
        let host = HeadlessHost::new("portal.example.com").with_pathname("/catalog");
        assert_eq!(host.pathname(), "/catalog");
        assert!(!host.has_script("portal.example.com"));

        host.append_script(ScriptTag::new("portal.example.com", "https://a.example.com/js/script.js"));
        assert!(host.has_script("portal.example.com"));
        assert!(!host.has_script("other.example.com"));
        assert_eq!(host.scripts().len(), 1);
        assert!(host.scripts()[0].defer);
    }

    #[test]
    fn test_install_beacon_later() {
        let host = HeadlessHost::new("portal.example.com");
        assert!(host.beacon().is_none());

        host.install_beacon(Arc::new(RecordingBeacon::new()));
        assert!(host.beacon().is_some());
    }

    #[test]
    fn test_recording_beacon_runs_callback() {
        let beacon = RecordingBeacon::new();
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();

        beacon
            .send(
                "search.search",
                SendOptions::with_props(props! { "query" => "payments" })
                    .url("https://portal.example.com/search")
                    .callback(move || flag.store(true, Ordering::SeqCst)),
            )
            .unwrap();

        assert!(called.load(Ordering::SeqCst));
        let calls = beacon.calls();
        assert_eq!(calls[0].name, "search.search");
        assert_eq!(calls[0].url.as_deref(), Some("https://portal.example.com/search"));
    }

    #[test]
    fn test_failing_beacon_records_then_errors() {
        let beacon = RecordingBeacon::failing();
        let result = beacon.send("error.error", SendOptions::default());
        assert!(matches!(result, Err(DeliveryError::Rejected(_))));
        assert_eq!(beacon.len(), 1);
    }

    #[test]
    fn test_beacon_call_json_shape() {
        let call = BeaconCall {
            name: "pageview".into(),
            props: None,
            url: None,
        };
        assert_eq!(serde_json::to_string(&call).unwrap(), r#"{"name":"pageview"}"#);
    }
}
