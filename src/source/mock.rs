//! In-memory [`DashboardApi`] for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{DashboardApi, SourceError};
use crate::data::{
    AnalyzerStats, ConsistencyReport, EventKind, EventRecord, ProcessingStats, UpdateAck,
};

/// Canned responses plus call counters.
#[derive(Debug, Default)]
pub(crate) struct MockApi {
    pub processing: Option<ProcessingStats>,
    pub analyzer: Option<AnalyzerStats>,
    pub report: Option<ConsistencyReport>,
    pub ack: Option<UpdateAck>,
    pub processing_calls: AtomicUsize,
    pub analyzer_calls: AtomicUsize,
    pub lookups: Mutex<Vec<(EventKind, u64)>>,
}

fn unavailable() -> SourceError {
    SourceError::Connection("connection refused".to_string())
}

#[async_trait]
impl DashboardApi for MockApi {
    async fn processing_stats(&self) -> Result<ProcessingStats, SourceError> {
        self.processing_calls.fetch_add(1, Ordering::SeqCst);
        self.processing.clone().ok_or_else(unavailable)
    }

    async fn analyzer_stats(&self) -> Result<AnalyzerStats, SourceError> {
        self.analyzer_calls.fetch_add(1, Ordering::SeqCst);
        self.analyzer.clone().ok_or_else(unavailable)
    }

    async fn track_event(&self, kind: EventKind, index: u64) -> Result<EventRecord, SourceError> {
        self.lookups.lock().unwrap().push((kind, index));
        if index == 404 {
            return Err(SourceError::Http {
                status: 404,
                message: format!("No message at index {}", index),
            });
        }
        let mut record = serde_json::Map::new();
        record.insert("kind".to_string(), kind.label().into());
        record.insert("index".to_string(), index.into());
        Ok(EventRecord(record))
    }

    async fn consistency_report(&self) -> Result<ConsistencyReport, SourceError> {
        self.report.clone().ok_or_else(unavailable)
    }

    async fn run_consistency_update(&self) -> Result<UpdateAck, SourceError> {
        self.ack.ok_or_else(unavailable)
    }

    fn description(&self) -> &str {
        "mock"
    }
}
