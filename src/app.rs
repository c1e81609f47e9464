//! Application state and interaction logic.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::debug;

use crate::data::consistency::{error_text, RUNNING_TEXT};
use crate::data::{EventKind, Notices, StatsPanel};
use crate::dispatch::{Dispatcher, Update};
use crate::ui::Theme;

/// Which index input has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    GpsIndex,
    AlertIndex,
}

impl Focus {
    /// Cycle to the other input.
    pub fn next(self) -> Self {
        match self {
            Focus::GpsIndex => Focus::AlertIndex,
            Focus::AlertIndex => Focus::GpsIndex,
        }
    }

    pub fn kind(self) -> EventKind {
        match self {
            Focus::GpsIndex => EventKind::Gps,
            Focus::AlertIndex => EventKind::Alert,
        }
    }
}

/// Text of a stats panel and the generation it was rendered from.
#[derive(Debug, Clone, Default)]
pub struct StatsView {
    pub text: Option<String>,
    rendered: u64,
}

/// An index input plus the latest lookup result.
#[derive(Debug, Clone)]
pub struct LookupView {
    pub kind: EventKind,
    pub input: String,
    pub text: String,
    requested: u64,
    received: u64,
}

impl LookupView {
    fn new(kind: EventKind) -> Self {
        Self {
            kind,
            input: String::new(),
            text: String::new(),
            requested: 0,
            received: 0,
        }
    }

    /// Whether a lookup is still outstanding.
    pub fn in_flight(&self) -> bool {
        self.requested > self.received
    }
}

/// Latest consistency-check text.
#[derive(Debug, Clone, Default)]
pub struct ConsistencyView {
    pub text: String,
    requested: u64,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub focus: Focus,

    dispatcher: Dispatcher,
    updates: mpsc::UnboundedReceiver<Update>,

    /// Local time of the most recent poll tick.
    pub last_updated: Option<String>,
    last_tick: u64,
    pub processing: StatsView,
    pub analyzer: StatsView,
    pub gps: LookupView,
    pub alert: LookupView,
    pub consistency: ConsistencyView,
    pub notices: Notices,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App, detecting the terminal theme.
    pub fn new(
        dispatcher: Dispatcher,
        updates: mpsc::UnboundedReceiver<Update>,
        error_ttl: Duration,
    ) -> Self {
        Self::with_theme(dispatcher, updates, error_ttl, Theme::auto_detect())
    }

    pub fn with_theme(
        dispatcher: Dispatcher,
        updates: mpsc::UnboundedReceiver<Update>,
        error_ttl: Duration,
        theme: Theme,
    ) -> Self {
        Self {
            running: true,
            show_help: false,
            focus: Focus::default(),
            dispatcher,
            updates,
            last_updated: None,
            last_tick: 0,
            processing: StatsView::default(),
            analyzer: StatsView::default(),
            gps: LookupView::new(EventKind::Gps),
            alert: LookupView::new(EventKind::Alert),
            consistency: ConsistencyView::default(),
            notices: Notices::new(error_ttl),
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the backend.
    pub fn source_description(&self) -> &str {
        self.dispatcher.source_description()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    pub fn stats(&self, panel: StatsPanel) -> &StatsView {
        match panel {
            StatsPanel::Processing => &self.processing,
            StatsPanel::Analyzer => &self.analyzer,
        }
    }

    fn stats_mut(&mut self, panel: StatsPanel) -> &mut StatsView {
        match panel {
            StatsPanel::Processing => &mut self.processing,
            StatsPanel::Analyzer => &mut self.analyzer,
        }
    }

    pub fn lookup_view(&self, kind: EventKind) -> &LookupView {
        match kind {
            EventKind::Gps => &self.gps,
            EventKind::Alert => &self.alert,
        }
    }

    fn lookup_view_mut(&mut self, kind: EventKind) -> &mut LookupView {
        match kind {
            EventKind::Gps => &mut self.gps,
            EventKind::Alert => &mut self.alert,
        }
    }

    /// The input that currently has focus.
    pub fn focused_input(&self) -> &LookupView {
        self.lookup_view(self.focus.kind())
    }

    /// Apply every update received since the last frame and expire notices.
    ///
    /// Returns the number of updates applied.
    pub fn drain_updates(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.updates.try_recv() {
            self.apply(update);
            applied += 1;
        }
        self.notices.prune();
        applied
    }

    /// Apply a single update, discarding it if it was overtaken.
    pub fn apply(&mut self, update: Update) {
        match update {
            Update::Tick { generation, stamp } => {
                if generation > self.last_tick {
                    self.last_tick = generation;
                    self.last_updated = Some(stamp);
                }
            }
            Update::Stats {
                panel,
                generation,
                result,
            } => match result {
                Ok(snapshot) => {
                    let view = self.stats_mut(panel);
                    if generation < view.rendered {
                        debug!(?panel, generation, "Discarding stale stats response");
                        return;
                    }
                    view.rendered = generation;
                    view.text = Some(snapshot.render());
                }
                Err(failed) => self
                    .notices
                    .push_failure(failed.at, failed.error.to_string()),
            },
            Update::Lookup {
                kind,
                generation,
                result,
            } => {
                let view = self.lookup_view_mut(kind);
                if generation != view.requested {
                    debug!(%kind, generation, "Discarding superseded lookup response");
                    return;
                }
                view.received = generation;
                view.text = match result {
                    Ok(record) => record.render(),
                    Err(_) => kind.lookup_error_text().to_string(),
                };
            }
            Update::Consistency { generation, result } => {
                if generation != self.consistency.requested {
                    debug!(generation, "Discarding superseded consistency response");
                    return;
                }
                self.consistency.text = match result {
                    Ok(outcome) => outcome.render(),
                    Err(e) => error_text(&e.to_string()),
                };
            }
        }
    }

    /// Poll both stats endpoints now, outside the regular schedule.
    pub fn refresh_stats(&mut self) {
        self.dispatcher.poll_stats();
    }

    /// Run the lookup for the focused input.
    pub fn submit_lookup(&mut self) {
        let kind = self.focus.kind();
        let input = self.lookup_view(kind).input.trim().to_string();
        match input.parse::<u64>() {
            Ok(index) => {
                let generation = self.dispatcher.lookup(kind, index);
                let view = self.lookup_view_mut(kind);
                view.requested = generation;
                view.text.clear();
            }
            Err(_) => {
                self.set_status_message(format!(
                    "{} index must be a non-negative integer",
                    kind.label()
                ));
            }
        }
    }

    /// Trigger the consistency check.
    pub fn run_consistency_check(&mut self) {
        let generation = self.dispatcher.consistency_check();
        self.consistency.requested = generation;
        self.consistency.text = RUNNING_TEXT.to_string();
    }

    /// Move focus to the other index input.
    pub fn cycle_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Append a digit to the focused input.
    pub fn input_push(&mut self, c: char) {
        if c.is_ascii_digit() {
            let kind = self.focus.kind();
            self.lookup_view_mut(kind).input.push(c);
        }
    }

    /// Remove the last character from the focused input.
    pub fn input_pop(&mut self) {
        let kind = self.focus.kind();
        self.lookup_view_mut(kind).input.pop();
    }

    pub fn dismiss_notices(&mut self) {
        self.notices.dismiss_all();
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tokio::runtime::Handle;

    use crate::config::ConsistencyMode;
    use crate::data::{AnalyzerStats, ConsistencyReport, EventRecord, NoticeIds, StatsSnapshot};
    use crate::dispatch::Failure;
    use crate::source::mock::MockApi;
    use crate::source::SourceError;

    fn test_app(api: MockApi) -> App {
        let (dispatcher, rx) =
            Dispatcher::new(Arc::new(api), ConsistencyMode::Report, Handle::current());
        App::with_theme(dispatcher, rx, Duration::from_millis(7000), Theme::dark())
    }

    async fn settle(app: &mut App, expected: usize) {
        let mut applied = 0;
        for _ in 0..100 {
            applied += app.drain_updates();
            if applied >= expected {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("expected {} updates, got {}", expected, applied);
    }

    fn analyzer_snapshot(gps: u64) -> StatsSnapshot {
        StatsSnapshot::from_analyzer(&AnalyzerStats {
            num_gps_events: Some(gps),
            num_alert_events: None,
        })
    }

    #[tokio::test]
    async fn test_stale_stats_do_not_overwrite_newer() {
        let mut app = test_app(MockApi::default());

        app.apply(Update::Stats {
            panel: StatsPanel::Analyzer,
            generation: 2,
            result: Ok(analyzer_snapshot(20)),
        });
        app.apply(Update::Stats {
            panel: StatsPanel::Analyzer,
            generation: 1,
            result: Ok(analyzer_snapshot(10)),
        });

        let text = app.analyzer.text.as_deref().unwrap();
        assert!(text.contains("GPS Events Count: 20"));
    }

    #[tokio::test]
    async fn test_stats_failure_raises_notice_and_keeps_text() {
        let mut app = test_app(MockApi::default());
        app.apply(Update::Stats {
            panel: StatsPanel::Processing,
            generation: 1,
            result: Err(Failure {
                error: SourceError::Timeout,
                at: NoticeIds::default().now(),
            }),
        });

        assert!(app.processing.text.is_none());
        assert_eq!(app.notices.len(), 1);
        assert_eq!(app.notices.iter().next().unwrap().message, "Request timed out");
    }

    #[tokio::test]
    async fn test_both_stats_failing_raises_two_notices() {
        let mut app = test_app(MockApi::default());
        app.refresh_stats();

        // Tick plus both failed stats requests, applied in one frame
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(app.drain_updates(), 3);

        assert_eq!(app.notices.len(), 2);
        let ids: Vec<u64> = app.notices.iter().map(|n| n.id).collect();
        assert_ne!(ids[0], ids[1]);
    }

    #[tokio::test]
    async fn test_tick_sets_last_updated() {
        let mut app = test_app(MockApi::default());
        app.apply(Update::Tick {
            generation: 2,
            stamp: "later".to_string(),
        });
        app.apply(Update::Tick {
            generation: 1,
            stamp: "earlier".to_string(),
        });
        assert_eq!(app.last_updated.as_deref(), Some("later"));
    }

    #[tokio::test]
    async fn test_lookup_renders_only_its_panel() {
        let mut app = test_app(MockApi::default());

        app.gps.input = "3".to_string();
        app.submit_lookup();
        app.cycle_focus();
        app.alert.input = "5".to_string();
        app.submit_lookup();

        settle(&mut app, 2).await;

        assert_eq!(app.gps.text, "kind: GPS\nindex: 3");
        assert_eq!(app.alert.text, "kind: Alert\nindex: 5");
        assert!(app.notices.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failure_shows_fixed_text_without_notice() {
        let mut app = test_app(MockApi::default());
        app.gps.input = "404".to_string();
        app.submit_lookup();

        settle(&mut app, 1).await;

        assert_eq!(app.gps.text, "Error fetching GPS event");
        assert!(app.notices.is_empty());
    }

    #[tokio::test]
    async fn test_superseded_lookup_discarded() {
        let mut app = test_app(MockApi::default());
        app.gps.input = "1".to_string();
        app.submit_lookup();
        app.gps.input = "2".to_string();
        app.submit_lookup();

        // Older response arriving last must not win
        let mut record = serde_json::Map::new();
        record.insert("index".to_string(), 1.into());
        app.apply(Update::Lookup {
            kind: EventKind::Gps,
            generation: 1,
            result: Ok(EventRecord(record)),
        });
        assert!(app.gps.text.is_empty());
        assert!(app.gps.in_flight());

        settle(&mut app, 2).await;
        assert_eq!(app.gps.text, "kind: GPS\nindex: 2");
    }

    #[tokio::test]
    async fn test_invalid_index_is_rejected_locally() {
        let mut app = test_app(MockApi::default());
        app.input_push('x');
        assert!(app.gps.input.is_empty());

        app.gps.input = "-1".to_string();
        app.submit_lookup();
        assert!(app.get_status_message().unwrap().contains("non-negative integer"));
        assert!(!app.gps.in_flight());
    }

    #[tokio::test]
    async fn test_consistency_report_flow() {
        let report: ConsistencyReport = serde_json::from_str(
            r#"{"counts": {
                "db": {"alerts": 10, "gps": 5},
                "queue": {"alerts": 7, "gps": 9},
                "processing": {"alerts": 10, "gps": 5}
            }}"#,
        )
        .unwrap();
        let mut app = test_app(MockApi {
            report: Some(report),
            ..MockApi::default()
        });

        app.run_consistency_check();
        assert_eq!(app.consistency.text, "Running consistency check...");

        settle(&mut app, 1).await;
        assert!(app.consistency.text.contains("Database vs Queue:\n  Alerts: +3\n  GPS: -4"));
    }

    #[tokio::test]
    async fn test_consistency_failure_text() {
        let mut app = test_app(MockApi::default());
        app.run_consistency_check();
        settle(&mut app, 1).await;
        assert_eq!(
            app.consistency.text,
            "Error running consistency check: Connection failed: connection refused"
        );
    }

    #[test]
    fn test_focus_cycles() {
        assert_eq!(Focus::GpsIndex.next(), Focus::AlertIndex);
        assert_eq!(Focus::AlertIndex.next(), Focus::GpsIndex);
        assert_eq!(Focus::AlertIndex.kind(), EventKind::Alert);
    }
}
