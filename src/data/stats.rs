//! Stats snapshots for the processing and analyzer services.
//!
//! Each poll replaces the previous snapshot wholesale. Fields the backend
//! omits (or sends as null) fall back to `0` or `N/A`.

use serde::Deserialize;
use serde_json::Value;

use super::event::display_value;
use super::time::format_timestamp;

const NOT_AVAILABLE: &str = "N/A";

/// Body of the processing service's stats endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProcessingStats {
    #[serde(default)]
    pub num_gps_events: Option<u64>,
    #[serde(default)]
    pub num_alert_events: Option<u64>,
    #[serde(default)]
    pub max_alerts_per_day: Option<Value>,
    #[serde(default)]
    pub peak_gps_activity_day: Option<Value>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Body of the analyzer service's stats endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalyzerStats {
    #[serde(default)]
    pub num_gps_events: Option<u64>,
    #[serde(default)]
    pub num_alert_events: Option<u64>,
}

/// Which stats panel a snapshot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsPanel {
    Processing,
    Analyzer,
}

impl StatsPanel {
    pub fn title(&self) -> &'static str {
        match self {
            StatsPanel::Processing => "Processing Stats",
            StatsPanel::Analyzer => "Analyzer Stats",
        }
    }
}

/// Ordered label → value mapping ready for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    entries: Vec<(String, String)>,
}

impl StatsSnapshot {
    fn push(&mut self, label: &str, value: String) {
        self.entries.push((label.to_string(), value));
    }

    pub fn from_processing(stats: &ProcessingStats) -> Self {
        let mut snapshot = Self::default();
        snapshot.push("Number of GPS Events Stored", count(stats.num_gps_events));
        snapshot.push("Number of Alert Events Stored", count(stats.num_alert_events));
        snapshot.push("Max Alerts Per Day", or_na(stats.max_alerts_per_day.as_ref()));
        snapshot.push(
            "Peak GPS Activity Day",
            or_na(stats.peak_gps_activity_day.as_ref()),
        );
        snapshot.push(
            "Last Updated",
            stats
                .last_updated
                .as_deref()
                .map(format_timestamp)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        );
        snapshot
    }

    pub fn from_analyzer(stats: &AnalyzerStats) -> Self {
        let mut snapshot = Self::default();
        snapshot.push("GPS Events Count", count(stats.num_gps_events));
        snapshot.push("Alert Events Count", count(stats.num_alert_events));
        snapshot
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Look up a value by its label.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    /// Render as one `key: value` line per entry.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(label, value)| format!("{}: {}", label, value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn count(value: Option<u64>) -> String {
    value.unwrap_or(0).to_string()
}

fn or_na(value: Option<&Value>) -> String {
    match value {
        Some(Value::Null) | None => NOT_AVAILABLE.to_string(),
        Some(v) => display_value(v),
    }
}
