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

//! Scalar property bag attached to events.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Contextual metadata for an event (entity ids, durations, error codes, ...).
///
/// Ordered so delivery payloads are deterministic.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A single property value. Only scalars are permitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Number(f64),
    Bool(bool),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => f.write_str(s),
            // Integral values print without a trailing ".0"
            PropertyValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            PropertyValue::Number(n) => write!(f, "{}", n),
            PropertyValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<&String> for PropertyValue {
    fn from(value: &String) -> Self {
        PropertyValue::String(value.clone())
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for PropertyValue {
                fn from(value: $ty) -> Self {
                    PropertyValue::Number(value as f64)
                }
            }
        )+
    };
}

impl_from_number!(f64, f32, i64, i32, i16, u64, u32, u16, usize);

/// Build a [`Properties`] map from `key => value` pairs.
///
/// ```
/// use trackline_core::props;
///
/// let props = props! { "component" => "Header", "duration" => 12.5, "cached" => true };
/// assert_eq!(props.len(), 3);
/// ```
#[macro_export]
macro_rules! props {
    () => {
        $crate::event::Properties::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::event::Properties::new();
        $(
            map.insert(
                ::std::string::String::from($key),
                $crate::event::PropertyValue::from($value),
            );
        )+
        map
    }};
}

/// Merge `overlay` on top of `base`. Keys in `overlay` win.
pub fn merge_properties(base: Option<&Properties>, overlay: Option<&Properties>) -> Properties {
    let mut merged = base.cloned().unwrap_or_default();
    if let Some(overlay) = overlay {
        for (key, value) in overlay {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}
