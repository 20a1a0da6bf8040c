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

//! Event shape, name formatting and structural validation.

use super::properties::{Properties, PropertyValue};
use super::taxonomy::{EventAction, EventCategory};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// The unit of telemetry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub category: EventCategory,

    #[serde(default)]
    pub action: EventAction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

impl Event {
    pub fn new(category: impl Into<EventCategory>, action: impl Into<EventAction>) -> Self {
        Self {
            category: category.into(),
            action: action.into(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Insert a single property, creating the map if needed.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties
            .get_or_insert_with(Properties::new)
            .insert(key.into(), value.into());
        self
    }

    /// Look up a property by key.
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.as_ref().and_then(|p| p.get(key))
    }

    /// `category.action`, the key used for per-type rate limiting.
    pub fn type_key(&self) -> String {
        format!("{}.{}", self.category, self.action)
    }

    /// Formatted delivery name, see [`format_event_name`].
    pub fn name(&self) -> String {
        format_event_name(self)
    }
}

/// Format an event name as `category.action[.label]`.
///
/// The label is lower-cased and each run of whitespace becomes `_`.
pub fn format_event_name(event: &Event) -> String {
    let mut name = format!("{}.{}", event.category, event.action);
    if let Some(label) = event.label.as_deref().filter(|l| !l.is_empty()) {
        name.push('.');
        name.push_str(&normalize_label(label));
    }
    name
}

fn normalize_label(label: &str) -> String {
    let lower = label.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut in_whitespace = false;
    for c in lower.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
                in_whitespace = true;
            }
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}

/// Check an event's structure, returning the first problem found.
///
/// Properties must survive a JSON round trip unchanged; non-finite numbers
/// serialize to `null` and therefore fail.
pub fn check_event(event: &Event) -> Result<(), ValidationError> {
    if event.category.is_empty() {
        return Err(ValidationError::MissingCategory);
    }
    if event.action.is_empty() {
        return Err(ValidationError::MissingAction);
    }

    if let Some(properties) = &event.properties {
        let encoded = serde_json::to_string(properties)
            .map_err(|e| ValidationError::Unserializable(e.to_string()))?;
        let decoded: Properties = serde_json::from_str(&encoded)
            .map_err(|e| ValidationError::Unserializable(e.to_string()))?;
        if &decoded != properties {
            return Err(ValidationError::Unserializable(
                "properties changed after serialization round trip".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validate an event, logging the reason on failure.
///
/// This is the gate every event passes before delivery.
pub fn validate_event(event: &Event) -> bool {
    match check_event(event) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(
                category = %event.category,
                action = %event.action,
                error = %e,
                "Event failed validation"
            );
            false
        }
    }
}
