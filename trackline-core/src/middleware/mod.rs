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

//! Composable event middleware.
//!
//! A middleware receives an event and returns either a (possibly modified)
//! event to continue with, or `None` to drop it. A [`MiddlewareChain`] runs
//! its middleware strictly left to right and stops at the first `None`.
//!
//! # Example
//!
//! ```
//! use trackline_core::event::Event;
//! use trackline_core::middleware::{self, MiddlewareChain, RateLimit};
//! use std::time::Duration;
//!
//! let chain = MiddlewareChain::new()
//!     .with(middleware::validation)
//!     .with(RateLimit::new(3, Duration::from_secs(1)))
//!     .with(middleware::privacy);
//!
//! let out = chain.execute(Event::new("catalog", "view"));
//! assert!(out.is_some());
//! ```

mod builtin;
mod config;
mod dedup;
mod rate_limit;

pub use builtin::{
    privacy, validation, Enrichment, Filter, LogLevel, Logging, Sampling, Timestamp, UserContext,
    UserInfo, MAX_STRING_PROPERTY_LEN, SENSITIVE_KEYS,
};
pub use config::{DeduplicationConfig, MiddlewareConfig, RateLimitConfig};
pub use dedup::{Deduplication, DEDUP_CLEANUP_THRESHOLD};
pub use rate_limit::RateLimit;

use crate::event::Event;

/// A single transform/filter step.
pub trait Middleware: Send + Sync {
    /// Return the event to continue, or `None` to drop it.
    fn process(&self, event: Event) -> Option<Event>;

    /// Name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> Middleware for F
where
    F: Fn(Event) -> Option<Event> + Send + Sync,
{
    fn process(&self, event: Event) -> Option<Event> {
        self(event)
    }
}

/// Ordered, append-only sequence of middleware.
#[derive(Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Box<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware to the end of the chain.
    pub fn add(&mut self, middleware: impl Middleware + 'static) {
        self.middlewares.push(Box::new(middleware));
    }

    /// Builder-style [`add`](Self::add).
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.add(middleware);
        self
    }

    /// Run the event through every middleware, stopping at the first drop.
    pub fn execute(&self, event: Event) -> Option<Event> {
        self.middlewares.iter().try_fold(event, |current, middleware| {
            let next = middleware.process(current);
            if next.is_none() {
                tracing::trace!(middleware = middleware.name(), "Event dropped by middleware");
            }
            next
        })
    }

    /// Remove all middleware.
    pub fn clear(&mut self) {
        self.middlewares.clear();
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Names of the middleware in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.middlewares.iter().map(|m| m.name()).collect()
    }
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("middlewares", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recorder(id: u32, calls: Arc<Mutex<Vec<u32>>>) -> impl Middleware {
        move |event: Event| {
            calls.lock().push(id);
            Some(event)
        }
    }

    #[test]
    fn test_empty_chain_passes_through() {
        let chain = MiddlewareChain::new();
        let event = Event::new("navigation", "view");
        assert_eq!(chain.execute(event.clone()), Some(event));
        assert!(chain.is_empty());
    }

    #[test]
    fn test_runs_in_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let chain = MiddlewareChain::new()
            .with(recorder(1, calls.clone()))
            .with(recorder(2, calls.clone()))
            .with(recorder(3, calls.clone()));

        chain.execute(Event::new("navigation", "view"));
        assert_eq!(*calls.lock(), vec![1, 2, 3]);
    }

    #[test]
    fn test_short_circuits_on_drop() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let dropper = {
            let calls = calls.clone();
            move |_event: Event| -> Option<Event> {
                calls.lock().push(2);
                None
            }
        };

        let chain = MiddlewareChain::new()
            .with(recorder(1, calls.clone()))
            .with(dropper)
            .with(recorder(3, calls.clone()))
            .with(recorder(4, calls.clone()));

        assert_eq!(chain.execute(Event::new("navigation", "view")), None);
        assert_eq!(*calls.lock(), vec![1, 2]);
    }

    #[test]
    fn test_transforms_compose() {
        let chain = MiddlewareChain::new()
            .with(|e: Event| Some(e.with_property("a", 1)))
            .with(|e: Event| Some(e.with_property("b", 2)));

        let out = chain.execute(Event::new("metrics", "complete")).unwrap();
        assert_eq!(out.properties.unwrap().len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut chain = MiddlewareChain::new();
        chain.add(|_e: Event| -> Option<Event> { None });
        assert_eq!(chain.len(), 1);
        assert!(chain.execute(Event::new("a", "b")).is_none());

        chain.clear();
        assert!(chain.is_empty());
        assert!(chain.execute(Event::new("a", "b")).is_some());
    }
}
