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

//! Beacon that posts events straight to the analytics event API.

use super::{Beacon, SendOptions};
use crate::config::TrackerConfig;
use crate::error::DeliveryError;
use crate::event::Properties;
use parking_lot::Mutex;
use reqwest::Client as HttpClient;
use serde::Serialize;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct EventPayload<'a> {
    name: &'a str,
    url: String,
    domain: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    props: Option<Properties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    h: Option<u8>,
}

/// Fire-and-forget HTTP delivery.
///
/// Each send is spawned onto the given runtime and returns immediately.
/// Failures are logged from the task. Call [`flush`](Self::flush) before
/// shutting the runtime down.
pub struct HttpBeacon {
    client: HttpClient,
    endpoint: String,
    domain: String,
    hash_mode: bool,
    runtime: Handle,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl HttpBeacon {
    pub fn new(config: &TrackerConfig, runtime: Handle) -> Result<Self, DeliveryError> {
        let client = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("trackline/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.event_api_url(),
            domain: config.domain.clone(),
            hash_mode: config.hash_mode,
            runtime,
            in_flight: Mutex::new(Vec::new()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Number of sends not yet known to have finished.
    pub fn pending(&self) -> usize {
        let mut in_flight = self.in_flight.lock();
        in_flight.retain(|handle| !handle.is_finished());
        in_flight.len()
    }

    /// Wait for every send spawned so far.
    pub async fn flush(&self) {
        let handles = std::mem::take(&mut *self.in_flight.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Analytics send task aborted");
            }
        }
    }

    /// Bare paths are resolved against the tracked domain.
    fn page_url(&self, url: Option<&str>) -> String {
        match url {
            None => format!("app://{}/", self.domain),
            Some(path) if path.starts_with('/') => format!("app://{}{}", self.domain, path),
            Some(url) => url.to_string(),
        }
    }

    fn payload(&self, name: &str, options: &SendOptions) -> Result<Vec<u8>, DeliveryError> {
        let payload = EventPayload {
            name,
            url: self.page_url(options.url.as_deref()),
            domain: &self.domain,
            props: options.props.clone(),
            h: self.hash_mode.then_some(1),
        };
        Ok(serde_json::to_vec(&payload)?)
    }
}

async fn post(client: HttpClient, endpoint: String, body: Vec<u8>) -> Result<(), DeliveryError> {
    let response = client
        .post(&endpoint)
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(DeliveryError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(())
}

impl Beacon for HttpBeacon {
    fn send(&self, name: &str, options: SendOptions) -> Result<(), DeliveryError> {
        let body = self.payload(name, &options)?;
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let event_name = name.to_string();
        let callback = options.callback;

        let handle = self.runtime.spawn(async move {
            match post(client, endpoint, body).await {
                Ok(()) => {
                    tracing::trace!(event = %event_name, "Analytics event delivered");
                    if let Some(callback) = callback {
                        callback();
                    }
                }
                Err(e) => tracing::warn!(event = %event_name, error = %e, "Analytics delivery failed"),
            }
        });

        let mut in_flight = self.in_flight.lock();
        in_flight.retain(|handle| !handle.is_finished());
        in_flight.push(handle);
        Ok(())
    }
}
