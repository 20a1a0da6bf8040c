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

//! Predefined event templates for common platform actions.
//!
//! Templates are defined once as constants and never mutated. Callers merge
//! their own properties in at track time via [`EventTemplate::to_event`].

use super::properties::{merge_properties, Properties};
use super::schema::Event;
use super::taxonomy::{EventAction, EventCategory};
use std::borrow::Cow;

/// Partial event: taxonomy constants plus optional label/value/properties.
#[derive(Debug, Clone, PartialEq)]
pub struct EventTemplate {
    pub category: EventCategory,
    pub action: EventAction,
    pub label: Option<Cow<'static, str>>,
    pub value: Option<f64>,
    pub properties: Option<Properties>,
}

impl EventTemplate {
    pub const fn new(category: EventCategory, action: EventAction, label: &'static str) -> Self {
        Self {
            category,
            action,
            label: Some(Cow::Borrowed(label)),
            value: None,
            properties: None,
        }
    }

    /// Template built at runtime, without a label.
    pub fn custom(category: impl Into<EventCategory>, action: impl Into<EventAction>) -> Self {
        Self {
            category: category.into(),
            action: action.into(),
            label: None,
            value: None,
            properties: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(Cow::Owned(label.into()));
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

    /// Materialize an event, merging caller properties over the template's.
    ///
    /// An empty category or action becomes `"unknown"`.
    pub fn to_event(&self, properties: Option<Properties>) -> Event {
        let category = if self.category.is_empty() {
            EventCategory::from("unknown")
        } else {
            self.category.clone()
        };
        let action = if self.action.is_empty() {
            EventAction::from("unknown")
        } else {
            self.action.clone()
        };

        Event {
            category,
            action,
            label: self.label.as_ref().map(|l| l.to_string()),
            value: self.value,
            properties: Some(merge_properties(
                self.properties.as_ref(),
                properties.as_ref(),
            )),
        }
    }
}

use super::taxonomy::EventAction as A;
use super::taxonomy::EventCategory as C;

// Navigation
pub const VIEW_HOMEPAGE: EventTemplate = EventTemplate::new(C::Navigation, A::View, "Homepage");
pub const VIEW_CATALOG: EventTemplate = EventTemplate::new(C::Catalog, A::View, "Service Catalog");
pub const SEARCH_CATALOG: EventTemplate = EventTemplate::new(C::Search, A::Search, "Catalog Search");
pub const VIEW_SERVICE: EventTemplate = EventTemplate::new(C::Catalog, A::View, "Service Detail");
pub const VIEW_COMPONENT: EventTemplate =
    EventTemplate::new(C::Catalog, A::View, "Component Detail");

// Scaffolding
pub const START_SCAFFOLDING: EventTemplate =
    EventTemplate::new(C::Scaffolding, A::Start, "Start Service Creation");
pub const SELECT_TEMPLATE: EventTemplate =
    EventTemplate::new(C::Scaffolding, A::Click, "Select Template");
pub const COMPLETE_SCAFFOLDING: EventTemplate =
    EventTemplate::new(C::Scaffolding, A::Complete, "Service Created");
pub const CANCEL_SCAFFOLDING: EventTemplate =
    EventTemplate::new(C::Scaffolding, A::Cancel, "Cancel Service Creation");
pub const VALIDATE_INPUT: EventTemplate =
    EventTemplate::new(C::Validation, A::Submit, "Validate Form Input");
pub const TEMPLATE_JAVA: EventTemplate =
    EventTemplate::new(C::Scaffolding, A::Create, "Java Service Template");
pub const TEMPLATE_NODEJS: EventTemplate =
    EventTemplate::new(C::Scaffolding, A::Create, "Node.js Service Template");
pub const TEMPLATE_PYTHON: EventTemplate =
    EventTemplate::new(C::Scaffolding, A::Create, "Python Service Template");
pub const TEMPLATE_GOLANG: EventTemplate =
    EventTemplate::new(C::Scaffolding, A::Create, "Go Service Template");
pub const TEMPLATE_REACT: EventTemplate =
    EventTemplate::new(C::Scaffolding, A::Create, "React App Template");

// Documentation
pub const VIEW_DOCS: EventTemplate =
    EventTemplate::new(C::Documentation, A::View, "View Documentation");
pub const SEARCH_DOCS: EventTemplate =
    EventTemplate::new(C::Search, A::Search, "Search Documentation");
pub const VIEW_TECHDOCS: EventTemplate = EventTemplate::new(C::Techdocs, A::View, "View TechDocs");
pub const VIEW_API_DOCS: EventTemplate =
    EventTemplate::new(C::Documentation, A::View, "View API Documentation");
pub const VIEW_GETTING_STARTED: EventTemplate =
    EventTemplate::new(C::Documentation, A::View, "View Getting Started Guide");
pub const DOWNLOAD_DOCS: EventTemplate =
    EventTemplate::new(C::Documentation, A::Download, "Download Documentation");

// CI/CD
pub const VIEW_PIPELINE: EventTemplate = EventTemplate::new(C::Cicd, A::View, "View Pipeline");
pub const TRIGGER_BUILD: EventTemplate = EventTemplate::new(C::Cicd, A::Start, "Trigger Build");
pub const BUILD_COMPLETE: EventTemplate =
    EventTemplate::new(C::Cicd, A::Complete, "Build Complete");
pub const BUILD_FAILED: EventTemplate = EventTemplate::new(C::Cicd, A::Fail, "Build Failed");
pub const DEPLOY_APPLICATION: EventTemplate =
    EventTemplate::new(C::Deployment, A::Deploy, "Deploy Application");
pub const DEPLOYMENT_COMPLETE: EventTemplate =
    EventTemplate::new(C::Deployment, A::Complete, "Deployment Complete");
pub const DEPLOYMENT_FAILED: EventTemplate =
    EventTemplate::new(C::Deployment, A::Fail, "Deployment Failed");
pub const ARGOCD_SYNC: EventTemplate = EventTemplate::new(C::Deployment, A::Sync, "ArgoCD Sync");
pub const ARGOCD_ROLLBACK: EventTemplate =
    EventTemplate::new(C::Deployment, A::Rollback, "ArgoCD Rollback");
pub const VIEW_BUILD_LOGS: EventTemplate = EventTemplate::new(C::Cicd, A::View, "View Build Logs");
pub const VIEW_DEPLOYMENT_STATUS: EventTemplate =
    EventTemplate::new(C::Deployment, A::View, "View Deployment Status");
pub const CANCEL_DEPLOYMENT: EventTemplate =
    EventTemplate::new(C::Deployment, A::Cancel, "Cancel Deployment");

// Feedback
pub const SUBMIT_FEEDBACK: EventTemplate =
    EventTemplate::new(C::Feedback, A::Submit, "Submit Feedback");
pub const REPORT_BUG: EventTemplate = EventTemplate::new(C::Feedback, A::Submit, "Report Bug");
pub const REQUEST_FEATURE: EventTemplate =
    EventTemplate::new(C::Feedback, A::Submit, "Request Feature");
pub const OPEN_FEEDBACK_WIDGET: EventTemplate =
    EventTemplate::new(C::Feedback, A::Click, "Open Feedback Widget");
pub const CLOSE_FEEDBACK_WIDGET: EventTemplate =
    EventTemplate::new(C::Feedback, A::Cancel, "Close Feedback Widget");
pub const FRICTION_LOG: EventTemplate =
    EventTemplate::new(C::Feedback, A::Submit, "Log Friction Point");
pub const VIEW_FEEDBACK: EventTemplate = EventTemplate::new(C::Feedback, A::View, "View Feedback");
pub const RESPOND_TO_FEEDBACK: EventTemplate =
    EventTemplate::new(C::Feedback, A::Submit, "Respond to Feedback");

// Feature usage
pub const USE_KUBERNETES_PLUGIN: EventTemplate =
    EventTemplate::new(C::PluginInteraction, A::Click, "Kubernetes Plugin");
pub const USE_ARGOCD_PLUGIN: EventTemplate =
    EventTemplate::new(C::PluginInteraction, A::Click, "ArgoCD Plugin");
pub const USE_GRAFANA_PLUGIN: EventTemplate =
    EventTemplate::new(C::PluginInteraction, A::Click, "Grafana Plugin");
pub const USE_SONARQUBE_PLUGIN: EventTemplate =
    EventTemplate::new(C::PluginInteraction, A::Click, "SonarQube Plugin");
pub const EXPORT_DATA: EventTemplate =
    EventTemplate::new(C::FeatureUsage, A::Download, "Export Data");
pub const SHARE_RESOURCE: EventTemplate =
    EventTemplate::new(C::FeatureUsage, A::Click, "Share Resource");

// Errors
pub const PAGE_ERROR: EventTemplate = EventTemplate::new(C::Error, A::Error, "Page Load Error");
pub const API_ERROR: EventTemplate = EventTemplate::new(C::Error, A::Error, "API Error");
pub const VALIDATION_ERROR: EventTemplate =
    EventTemplate::new(C::Validation, A::Error, "Validation Error");
pub const AUTHENTICATION_ERROR: EventTemplate =
    EventTemplate::new(C::Authentication, A::Error, "Authentication Error");
pub const AUTHORIZATION_ERROR: EventTemplate =
    EventTemplate::new(C::Security, A::Error, "Authorization Error");

// Performance
pub const PAGE_LOAD: EventTemplate = EventTemplate::new(C::Performance, A::Complete, "Page Load");
pub const API_RESPONSE: EventTemplate =
    EventTemplate::new(C::Performance, A::Complete, "API Response");
pub const SLOW_OPERATION: EventTemplate =
    EventTemplate::new(C::Performance, A::Warning, "Slow Operation");
pub const TIMEOUT: EventTemplate =
    EventTemplate::new(C::Performance, A::Timeout, "Operation Timeout");

// User
pub const LOGIN: EventTemplate = EventTemplate::new(C::Authentication, A::Complete, "User Login");
pub const LOGOUT: EventTemplate =
    EventTemplate::new(C::Authentication, A::Complete, "User Logout");
pub const UPDATE_PROFILE: EventTemplate = EventTemplate::new(C::User, A::Update, "Update Profile");
pub const VIEW_PROFILE: EventTemplate = EventTemplate::new(C::User, A::View, "View Profile");

/// Symbolic name to template, in definition order.
pub static CATALOG: [(&str, EventTemplate); 60] = [
    ("VIEW_HOMEPAGE", VIEW_HOMEPAGE),
    ("VIEW_CATALOG", VIEW_CATALOG),
    ("SEARCH_CATALOG", SEARCH_CATALOG),
    ("VIEW_SERVICE", VIEW_SERVICE),
    ("VIEW_COMPONENT", VIEW_COMPONENT),
    ("START_SCAFFOLDING", START_SCAFFOLDING),
    ("SELECT_TEMPLATE", SELECT_TEMPLATE),
    ("COMPLETE_SCAFFOLDING", COMPLETE_SCAFFOLDING),
    ("CANCEL_SCAFFOLDING", CANCEL_SCAFFOLDING),
    ("VALIDATE_INPUT", VALIDATE_INPUT),
    ("TEMPLATE_JAVA", TEMPLATE_JAVA),
    ("TEMPLATE_NODEJS", TEMPLATE_NODEJS),
    ("TEMPLATE_PYTHON", TEMPLATE_PYTHON),
    ("TEMPLATE_GOLANG", TEMPLATE_GOLANG),
    ("TEMPLATE_REACT", TEMPLATE_REACT),
    ("VIEW_DOCS", VIEW_DOCS),
    ("SEARCH_DOCS", SEARCH_DOCS),
    ("VIEW_TECHDOCS", VIEW_TECHDOCS),
    ("VIEW_API_DOCS", VIEW_API_DOCS),
    ("VIEW_GETTING_STARTED", VIEW_GETTING_STARTED),
    ("DOWNLOAD_DOCS", DOWNLOAD_DOCS),
    ("VIEW_PIPELINE", VIEW_PIPELINE),
    ("TRIGGER_BUILD", TRIGGER_BUILD),
    ("BUILD_COMPLETE", BUILD_COMPLETE),
    ("BUILD_FAILED", BUILD_FAILED),
    ("DEPLOY_APPLICATION", DEPLOY_APPLICATION),
    ("DEPLOYMENT_COMPLETE", DEPLOYMENT_COMPLETE),
    ("DEPLOYMENT_FAILED", DEPLOYMENT_FAILED),
    ("ARGOCD_SYNC", ARGOCD_SYNC),
    ("ARGOCD_ROLLBACK", ARGOCD_ROLLBACK),
    ("VIEW_BUILD_LOGS", VIEW_BUILD_LOGS),
    ("VIEW_DEPLOYMENT_STATUS", VIEW_DEPLOYMENT_STATUS),
    ("CANCEL_DEPLOYMENT", CANCEL_DEPLOYMENT),
    ("SUBMIT_FEEDBACK", SUBMIT_FEEDBACK),
    ("REPORT_BUG", REPORT_BUG),
    ("REQUEST_FEATURE", REQUEST_FEATURE),
    ("OPEN_FEEDBACK_WIDGET", OPEN_FEEDBACK_WIDGET),
    ("CLOSE_FEEDBACK_WIDGET", CLOSE_FEEDBACK_WIDGET),
    ("FRICTION_LOG", FRICTION_LOG),
    ("VIEW_FEEDBACK", VIEW_FEEDBACK),
    ("RESPOND_TO_FEEDBACK", RESPOND_TO_FEEDBACK),
    ("USE_KUBERNETES_PLUGIN", USE_KUBERNETES_PLUGIN),
    ("USE_ARGOCD_PLUGIN", USE_ARGOCD_PLUGIN),
    ("USE_GRAFANA_PLUGIN", USE_GRAFANA_PLUGIN),
    ("USE_SONARQUBE_PLUGIN", USE_SONARQUBE_PLUGIN),
    ("EXPORT_DATA", EXPORT_DATA),
    ("SHARE_RESOURCE", SHARE_RESOURCE),
    ("PAGE_ERROR", PAGE_ERROR),
    ("API_ERROR", API_ERROR),
    ("VALIDATION_ERROR", VALIDATION_ERROR),
    ("AUTHENTICATION_ERROR", AUTHENTICATION_ERROR),
    ("AUTHORIZATION_ERROR", AUTHORIZATION_ERROR),
    ("PAGE_LOAD", PAGE_LOAD),
    ("API_RESPONSE", API_RESPONSE),
    ("SLOW_OPERATION", SLOW_OPERATION),
    ("TIMEOUT", TIMEOUT),
    ("LOGIN", LOGIN),
    ("LOGOUT", LOGOUT),
    ("UPDATE_PROFILE", UPDATE_PROFILE),
    ("VIEW_PROFILE", VIEW_PROFILE),
];

/// Find a template by its symbolic name (e.g. `"BUILD_FAILED"`).
pub fn lookup(name: &str) -> Option<&'static EventTemplate> {
    CATALOG
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, template)| template)
}
