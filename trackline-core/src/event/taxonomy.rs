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

//! Category and action taxonomy.
//!
//! Both enumerations are open: any string outside the built-in set parses to
//! the `Other` variant, so callers can extend the taxonomy without a release.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! taxonomy {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $value:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// Value outside the built-in taxonomy.
            Other(String),
        }

        impl $name {
            /// Every built-in variant, in declaration order.
            pub const KNOWN: &'static [$name] = &[$($name::$variant,)+];

            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $value,)+
                    $name::Other(value) => value.as_str(),
                }
            }

            pub fn is_empty(&self) -> bool {
                self.as_str().is_empty()
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                match value {
                    $($value => $name::$variant,)+
                    other => $name::Other(other.to_string()),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $($value => $name::$variant,)+
                    _ => $name::Other(value),
                }
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(value) => value,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

taxonomy! {
    /// Groups of related events.
    pub enum EventCategory {
        // Navigation & discovery
        Navigation => "navigation",
        Catalog => "catalog",
        Search => "search",

        // Service creation & management
        Scaffolding => "scaffolding",
        ServiceManagement => "service_management",

        Documentation => "documentation",
        Techdocs => "techdocs",

        // CI/CD & deployment
        Cicd => "cicd",
        Deployment => "deployment",
        Pipeline => "pipeline",

        Feedback => "feedback",
        Collaboration => "collaboration",

        FeatureUsage => "feature_usage",
        PluginInteraction => "plugin_interaction",

        Error => "error",
        Validation => "validation",

        Performance => "performance",
        Metrics => "metrics",

        Security => "security",
        Compliance => "compliance",

        User => "user",
        Authentication => "authentication",
    }
}

taxonomy! {
    /// Standard actions shared across categories.
    pub enum EventAction {
        View => "view",
        Click => "click",
        Submit => "submit",
        Cancel => "cancel",

        // CRUD
        Create => "create",
        Read => "read",
        Update => "update",
        Delete => "delete",

        Navigate => "navigate",
        Search => "search",
        Filter => "filter",
        Sort => "sort",

        // CI/CD
        Build => "build",
        Deploy => "deploy",
        Sync => "sync",
        Rollback => "rollback",

        Expand => "expand",
        Collapse => "collapse",
        Download => "download",
        Upload => "upload",

        // Status
        Start => "start",
        Complete => "complete",
        Fail => "fail",
        Timeout => "timeout",

        Error => "error",
        Warning => "warning",
        Retry => "retry",
    }
}

impl Default for EventCategory {
    fn default() -> Self {
        EventCategory::Other(String::new())
    }
}

impl Default for EventAction {
    fn default() -> Self {
        EventAction::Other(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_strings_parse_to_variants() {
        assert_eq!(EventCategory::from("cicd"), EventCategory::Cicd);
        assert_eq!(
            EventCategory::from("feature_usage"),
            EventCategory::FeatureUsage
        );
        assert_eq!(EventAction::from("rollback"), EventAction::Rollback);
    }

    #[test]
    fn test_unknown_strings_are_preserved() {
        let category = EventCategory::from("billing");
        assert_eq!(category, EventCategory::Other("billing".to_string()));
        assert_eq!(category.as_str(), "billing");
    }

    #[test]
    fn test_every_known_variant_round_trips_through_str() {
        for category in EventCategory::KNOWN {
            assert_eq!(&EventCategory::from(category.as_str()), category);
        }
        for action in EventAction::KNOWN {
            assert_eq!(&EventAction::from(action.as_str()), action);
        }
        assert_eq!(EventCategory::KNOWN.len(), 22);
        assert_eq!(EventAction::KNOWN.len(), 27);
    }

    #[test]
    fn test_serde_as_plain_string() {
        let json = serde_json::to_string(&EventAction::Deploy).unwrap();
        assert_eq!(json, "\"deploy\"");

        let parsed: EventCategory = serde_json::from_str("\"authentication\"").unwrap();
        assert_eq!(parsed, EventCategory::Authentication);
    }

    #[test]
    fn test_default_is_empty() {
        assert!(EventCategory::default().is_empty());
        assert!(EventAction::default().is_empty());
        assert!(!EventAction::View.is_empty());
    }
}
