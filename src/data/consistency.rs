//! Consistency-check results.
//!
//! The consistency service compares event counts across the database, the
//! message queue and the processing service. Two contracts exist: a stored
//! report (GET) and a run acknowledgement (POST).

use std::fmt::Write;

use serde::Deserialize;
use serde_json::Value;

/// Alert and GPS counts held by one data store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct CategoryCounts {
    pub alerts: i64,
    pub gps: i64,
}

/// Counts for every store the check compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct StoreCounts {
    pub db: CategoryCounts,
    pub queue: CategoryCounts,
    pub processing: CategoryCounts,
}

/// Full result of the last consistency check.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ConsistencyReport {
    pub counts: StoreCounts,
    #[serde(default)]
    pub not_in_db: Option<Vec<Value>>,
    #[serde(default)]
    pub not_in_queue: Option<Vec<Value>>,
    #[serde(default)]
    pub processing_time_ms: Option<u64>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Acknowledgement returned after triggering a new check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UpdateAck {
    pub processing_time_ms: u64,
}

impl UpdateAck {
    pub fn render(&self) -> String {
        format!(
            "Consistency check completed in {} ms",
            self.processing_time_ms
        )
    }
}

/// Result of a consistency request in either contract.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsistencyOutcome {
    Report(ConsistencyReport),
    Update(UpdateAck),
}

impl ConsistencyOutcome {
    pub fn render(&self) -> String {
        match self {
            ConsistencyOutcome::Report(report) => report.render(),
            ConsistencyOutcome::Update(ack) => ack.render(),
        }
    }
}

/// Text shown while a check is running.
pub const RUNNING_TEXT: &str = "Running consistency check...";

/// Text shown when a check fails.
pub fn error_text(message: &str) -> String {
    format!("Error running consistency check: {}", message)
}

/// `a - b`, with a leading `+` when positive.
pub fn signed_diff(a: i64, b: i64) -> String {
    let diff = a.saturating_sub(b);
    if diff > 0 {
        format!("+{}", diff)
    } else {
        diff.to_string()
    }
}

impl ConsistencyReport {
    /// Entries present in the queue but missing from the database.
    pub fn missing_from_db(&self) -> usize {
        self.not_in_db.as_ref().map_or(0, Vec::len)
    }

    /// Entries present in the database but missing from the queue.
    pub fn missing_from_queue(&self) -> usize {
        self.not_in_queue.as_ref().map_or(0, Vec::len)
    }

    pub fn render(&self) -> String {
        let c = &self.counts;
        let mut out = String::from("Consistency Check Results:\n\n");

        for (title, counts) in [
            ("MySQL Database", c.db),
            ("Queue in Kafka", c.queue),
            ("Processing Service", c.processing),
        ] {
            let _ = write!(
                out,
                "{}:\n  Alerts: {}\n  GPS: {}\n\n",
                title, counts.alerts, counts.gps
            );
        }

        for (title, other) in [
            ("Database vs Queue", c.queue),
            ("Database vs Processing", c.processing),
        ] {
            let _ = write!(
                out,
                "{}:\n  Alerts: {}\n  GPS: {}\n\n",
                title,
                signed_diff(c.db.alerts, other.alerts),
                signed_diff(c.db.gps, other.gps)
            );
        }

        out.push_str("Missing events:\n");
        let _ = writeln!(
            out,
            "Events in queue but not in database: {}",
            self.missing_from_db()
        );
        let _ = writeln!(
            out,
            "Events in database but not in queue: {}\n",
            self.missing_from_queue()
        );

        let processing_time = self
            .processing_time_ms
            .map(|ms| ms.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let _ = writeln!(out, "Processing Time: {} ms", processing_time);
        let _ = write!(
            out,
            "Last checked: {}",
            self.last_updated.as_deref().unwrap_or("N/A")
        );

        out
    }
}
