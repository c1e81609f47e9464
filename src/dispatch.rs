//! Request dispatch and the stats poll loop.
//!
//! Every request runs in its own task and reports back through an unbounded
//! channel of [`Update`]s, which the TUI drains once per frame. Requests are
//! independent: a slow or failed one never holds up another.
//!
//! Each request is tagged with a generation number from a per-panel counter.
//! The receiver uses it to discard responses that were overtaken by a newer
//! request for the same panel.
//!
//! ```text
//! interval tick ──▶ poll_stats() ──┬──▶ task: processing_stats ──┐
//!                                  └──▶ task: analyzer_stats ────┤
//! Enter ─────────▶ lookup() ──────────▶ task: track_event ───────┼──▶ mpsc ──▶ App
//! 'c' ───────────▶ consistency_check() ▶ task: report/update ────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::ConsistencyMode;
use crate::data::time::local_now;
use crate::data::{
    ConsistencyOutcome, EventKind, EventRecord, FailureTime, NoticeIds, StatsPanel, StatsSnapshot,
};
use crate::source::{DashboardApi, SourceError};

/// A failed background request and when it failed.
#[derive(Debug)]
pub struct Failure {
    pub error: SourceError,
    pub at: FailureTime,
}

/// A finished (or started) request, tagged with its generation.
#[derive(Debug)]
pub enum Update {
    /// A poll tick fired.
    Tick { generation: u64, stamp: String },
    Stats {
        panel: StatsPanel,
        generation: u64,
        result: Result<StatsSnapshot, Failure>,
    },
    Lookup {
        kind: EventKind,
        generation: u64,
        result: Result<EventRecord, SourceError>,
    },
    Consistency {
        generation: u64,
        result: Result<ConsistencyOutcome, SourceError>,
    },
}

#[derive(Debug, Default)]
struct Generations {
    poll: AtomicU64,
    gps: AtomicU64,
    alert: AtomicU64,
    consistency: AtomicU64,
    failures: NoticeIds,
}

impl Generations {
    fn next(counter: &AtomicU64) -> u64 {
        counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn lookup(&self, kind: EventKind) -> &AtomicU64 {
        match kind {
            EventKind::Gps => &self.gps,
            EventKind::Alert => &self.alert,
        }
    }
}

/// Spawns backend requests and forwards their results.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    api: Arc<dyn DashboardApi>,
    updates: mpsc::UnboundedSender<Update>,
    runtime: Handle,
    consistency_mode: ConsistencyMode,
    generations: Arc<Generations>,
}

impl Dispatcher {
    /// Create a dispatcher and the receiving end of its update channel.
    pub fn new(
        api: Arc<dyn DashboardApi>,
        consistency_mode: ConsistencyMode,
        runtime: Handle,
    ) -> (Self, mpsc::UnboundedReceiver<Update>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            api,
            updates,
            runtime,
            consistency_mode,
            generations: Arc::new(Generations::default()),
        };
        (dispatcher, rx)
    }

    /// Returns a description of the backend.
    pub fn source_description(&self) -> &str {
        self.api.description()
    }

    pub fn consistency_mode(&self) -> ConsistencyMode {
        self.consistency_mode
    }

    fn stats_failure(&self, error: SourceError) -> Failure {
        Failure {
            error,
            at: self.generations.failures.now(),
        }
    }

    fn send(&self, update: Update) {
        // Receiver gone means the UI has shut down
        let _ = self.updates.send(update);
    }

    /// Fire one stats poll: two independent requests.
    ///
    /// Returns the generation assigned to this tick.
    pub fn poll_stats(&self) -> u64 {
        let generation = Generations::next(&self.generations.poll);
        debug!(generation, "Polling stats");
        self.send(Update::Tick {
            generation,
            stamp: local_now(),
        });

        let this = self.clone();
        self.runtime.spawn(async move {
            let result = this
                .api
                .processing_stats()
                .await
                .map(|stats| StatsSnapshot::from_processing(&stats))
                .map_err(|e| this.stats_failure(e));
            if let Err(ref failed) = result {
                warn!(generation, error = %failed.error, "Processing stats request failed");
            }
            this.send(Update::Stats {
                panel: StatsPanel::Processing,
                generation,
                result,
            });
        });

        let this = self.clone();
        self.runtime.spawn(async move {
            let result = this
                .api
                .analyzer_stats()
                .await
                .map(|stats| StatsSnapshot::from_analyzer(&stats))
                .map_err(|e| this.stats_failure(e));
            if let Err(ref failed) = result {
                warn!(generation, error = %failed.error, "Analyzer stats request failed");
            }
            this.send(Update::Stats {
                panel: StatsPanel::Analyzer,
                generation,
                result,
            });
        });

        generation
    }

    /// Look up one event by queue index.
    pub fn lookup(&self, kind: EventKind, index: u64) -> u64 {
        let generation = Generations::next(self.generations.lookup(kind));
        info!(%kind, index, generation, "Looking up event");

        let this = self.clone();
        self.runtime.spawn(async move {
            let result = this.api.track_event(kind, index).await;
            if let Err(ref e) = result {
                warn!(%kind, index, error = %e, "Event lookup failed");
            }
            this.send(Update::Lookup {
                kind,
                generation,
                result,
            });
        });

        generation
    }

    /// Run the consistency request for the configured contract.
    pub fn consistency_check(&self) -> u64 {
        let generation = Generations::next(&self.generations.consistency);
        info!(mode = ?self.consistency_mode, generation, "Running consistency check");

        let this = self.clone();
        self.runtime.spawn(async move {
            let result = match this.consistency_mode {
                ConsistencyMode::Report => this
                    .api
                    .consistency_report()
                    .await
                    .map(ConsistencyOutcome::Report),
                ConsistencyMode::Update => this
                    .api
                    .run_consistency_update()
                    .await
                    .map(ConsistencyOutcome::Update),
            };
            if let Err(ref e) = result {
                warn!(error = %e, "Consistency check failed");
            }
            this.send(Update::Consistency { generation, result });
        });

        generation
    }

    /// Poll stats immediately and then every `period` until the receiver is dropped.
    pub fn spawn_poll_loop(&self, period: Duration) -> JoinHandle<()> {
        let this = self.clone();
        self.runtime.spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if this.updates.is_closed() {
                    debug!("Update receiver closed, stopping poll loop");
                    break;
                }
                this.poll_stats();
            }
        })
    }
}
