//! User-Facing Messages
//!
//! Validation and conversion failures queue messages keyed by the field's
//! client id; the bundle maps message keys to localized templates with
//! positional substitution (`{0}` is the field label).

use std::collections::HashMap;

/// Message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warn,
    Error,
    Fatal,
}

/// One queued user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub severity: Severity,
    pub summary: String,
}

impl Message {
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
        }
    }
}

/// Framework message keys
pub mod keys {
    pub const REQUIRED: &str = "required";
    pub const CONVERSION: &str = "conversion";
}

/// Key-to-template map with positional substitution
///
/// Ships with the framework defaults; applications overlay entries at
/// configuration time for localization.
#[derive(Debug, Clone)]
pub struct MessageBundle {
    templates: HashMap<String, String>,
}

impl Default for MessageBundle {
    fn default() -> Self {
        let mut templates = HashMap::new();
        let defaults = [
            (keys::REQUIRED, "{0}: a value is required"),
            (keys::CONVERSION, "{0}: the submitted value could not be converted"),
            ("length_min", "{0}: value is shorter than the minimum length of {1}"),
            ("length_max", "{0}: value is longer than the maximum length of {1}"),
            ("range_min", "{0}: value is below the minimum of {1}"),
            ("range_max", "{0}: value is above the maximum of {1}"),
            ("range_type", "{0}: value is not of the correct type"),
        ];
        for (key, template) in defaults {
            templates.insert(key.to_string(), template.to_string());
        }
        Self { templates }
    }
}

impl MessageBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override a template (localization hook)
    pub fn set(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(key.into(), template.into());
    }

    /// Format the template for `key`: `{0}` is the label, `{1}`.. the args
    pub fn format(&self, key: &str, label: &str, args: &[String]) -> String {
        let Some(template) = self.templates.get(key) else {
            tracing::warn!("no message template for key '{}'", key);
            return format!("{label}: invalid value");
        };

        let mut text = template.replace("{0}", label);
        for (i, arg) in args.iter().enumerate() {
            text = text.replace(&format!("{{{}}}", i + 1), arg);
        }
        text
    }
}
