//! Event records returned by the analyzer's indexed lookup.

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Which analyzer queue a lookup reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Gps,
    Alert,
}

impl EventKind {
    /// Returns the display label for this kind.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Gps => "GPS",
            EventKind::Alert => "Alert",
        }
    }

    /// Fixed text shown in place of a record when a lookup fails.
    pub fn lookup_error_text(&self) -> &'static str {
        match self {
            EventKind::Gps => "Error fetching GPS event",
            EventKind::Alert => "Error fetching Alert event",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An arbitrary JSON object returned by a lookup.
///
/// Field order follows the backend response.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(transparent)]
pub struct EventRecord(pub Map<String, Value>);

impl EventRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Render the record as one `key: value` line per field.
    pub fn render(&self) -> String {
        self.0
            .iter()
            .map(|(key, value)| format!("{}: {}", key, display_value(value)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Text for a single JSON value.
///
/// Strings are shown without quotes; arrays and objects as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
