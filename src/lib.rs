//! # trackwatch
//!
//! A terminal dashboard for a GPS/alert event-tracking pipeline.
//!
//! The dashboard polls the processing service and the analyzer service for
//! stats on a fixed timer, looks up individual GPS/alert events by queue
//! index on demand, triggers consistency checks across the database, queue
//! and processing service, and shows failed requests in an auto-expiring
//! error banner.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐  │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│  │
//! │  │ (state) │    │(formatting)   │(rendering)   │         │  │
//! │  └────▲────┘    └──────────┘    └─────────┘    └─────────┘  │
//! │       │ Update (mpsc)                                       │
//! │  ┌────┴─────┐    ┌─────────┐                                │
//! │  │ dispatch │───▶│ source  │◀── HttpSource (reqwest)        │
//! │  │ (timer)  │    │ (input) │                                │
//! │  └──────────┘    └─────────┘                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`config`]**: Layered [`Settings`] (defaults, file, environment)
//! - **[`source`]**: The [`DashboardApi`] trait and its HTTP implementation
//! - **[`dispatch`]**: Poll loop and request tasks, tagged with generations
//! - **[`data`]**: Response models and their text rendering
//! - **[`app`]**: Application state; applies updates and drops stale ones
//! - **[`ui`]**: Terminal rendering using ratatui
//! - **[`report`]**: Plain-text output for the one-shot modes
//!
//! ## Usage
//!
//! ```bash
//! # Watch a deployment
//! trackwatch --host 34.234.232.11
//!
//! # Print the stats once and exit
//! trackwatch --host 34.234.232.11 --once
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use trackwatch::{ConsistencyMode, Dispatcher, HttpSource, Settings};
//!
//! # fn main() -> anyhow::Result<()> {
//! let rt = tokio::runtime::Runtime::new()?;
//! let settings = Settings::load(None)?;
//! let source = HttpSource::from_settings(&settings)?;
//! let (dispatcher, mut updates) =
//!     Dispatcher::new(Arc::new(source), ConsistencyMode::Report, rt.handle().clone());
//!
//! dispatcher.poll_stats();
//! let first = rt.block_on(updates.recv());
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod dispatch;
pub mod events;
pub mod report;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::{ConsistencyMode, Endpoints, Settings};
pub use data::{
    AnalyzerStats, ConsistencyOutcome, ConsistencyReport, EventKind, EventRecord, Notices,
    ProcessingStats, StatsPanel, StatsSnapshot, UpdateAck,
};
pub use dispatch::{Dispatcher, Failure, Update};
pub use source::{DashboardApi, HttpSource, SourceError};
