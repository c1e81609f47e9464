//! Backend access for the dashboard.
//!
//! The [`DashboardApi`] trait is the seam between the dashboard and the
//! services it watches. [`HttpSource`] talks to the real services over their
//! JSON APIs; tests substitute in-memory implementations.

mod error;
mod http;
#[cfg(test)]
pub(crate) mod mock;

pub use error::SourceError;
pub use http::HttpSource;

use std::fmt::Debug;

use async_trait::async_trait;

use crate::data::{
    AnalyzerStats, ConsistencyReport, EventKind, EventRecord, ProcessingStats, UpdateAck,
};

/// Requests the dashboard can make against the backend services.
///
/// Every method issues exactly one request. Nothing is retried.
#[async_trait]
pub trait DashboardApi: Send + Sync + Debug {
    /// Fetch stored-event stats from the processing service.
    async fn processing_stats(&self) -> Result<ProcessingStats, SourceError>;

    /// Fetch live event counts from the analyzer service.
    async fn analyzer_stats(&self) -> Result<AnalyzerStats, SourceError>;

    /// Look up the event at `index` in the analyzer's GPS or alert queue.
    async fn track_event(&self, kind: EventKind, index: u64) -> Result<EventRecord, SourceError>;

    /// Fetch the stored consistency-check report.
    async fn consistency_report(&self) -> Result<ConsistencyReport, SourceError>;

    /// Run a new consistency check.
    async fn run_consistency_update(&self) -> Result<UpdateAck, SourceError>;

    /// Returns a human-readable description of the backend.
    ///
    /// Used for display in the TUI header.
    fn description(&self) -> &str;
}
