//! Data models and formatting for backend responses.
//!
//! This module turns raw JSON bodies into display-ready text.
//!
//! ## Submodules
//!
//! - [`stats`]: Processing/analyzer stats and the label → value [`StatsSnapshot`]
//! - [`event`]: Records from the indexed GPS/alert lookup
//! - [`consistency`]: Consistency-check report and acknowledgement
//! - [`notice`]: Auto-expiring error notices
//! - [`time`]: Local timestamp formatting
//!
//! ## Data Flow
//!
//! ```text
//! JSON body (reqwest)
//!        │
//!        ▼
//! ProcessingStats / AnalyzerStats / EventRecord / ConsistencyReport
//!        │
//!        ▼
//! render() ──▶ panel text
//! ```

pub mod consistency;
pub mod event;
pub mod notice;
pub mod stats;
pub mod time;

pub use consistency::{ConsistencyOutcome, ConsistencyReport, UpdateAck};
pub use event::{EventKind, EventRecord};
pub use notice::{FailureTime, Notice, NoticeIds, Notices};
pub use stats::{AnalyzerStats, ProcessingStats, StatsPanel, StatsSnapshot};
