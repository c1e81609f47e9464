//! One-shot text reports for `--once` and `--check`.

use tracing::error;

use crate::config::ConsistencyMode;
use crate::data::consistency::error_text;
use crate::data::{ConsistencyOutcome, StatsPanel, StatsSnapshot};
use crate::source::DashboardApi;

/// Text to print plus whether the run counts as failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Printout {
    pub text: String,
    pub failed: bool,
}

/// Fetch both stats panels once.
///
/// Fails only when both requests fail; one good panel is still useful output.
pub async fn stats(api: &dyn DashboardApi) -> Printout {
    let (processing, analyzer) = tokio::join!(api.processing_stats(), api.analyzer_stats());

    let processing = processing.map(|s| StatsSnapshot::from_processing(&s));
    let analyzer = analyzer.map(|s| StatsSnapshot::from_analyzer(&s));
    let failed = processing.is_err() && analyzer.is_err();

    let mut sections = Vec::new();
    for (panel, result) in [
        (StatsPanel::Processing, processing),
        (StatsPanel::Analyzer, analyzer),
    ] {
        let body = match result {
            Ok(snapshot) => snapshot.render(),
            Err(e) => {
                error!(panel = panel.title(), error = %e, "Stats request failed");
                format!("Error: {}", e)
            }
        };
        sections.push(format!("== {} ==\n{}", panel.title(), body));
    }

    Printout {
        text: sections.join("\n\n"),
        failed,
    }
}

/// Run the consistency check once for the given contract.
pub async fn consistency(api: &dyn DashboardApi, mode: ConsistencyMode) -> Printout {
    let result = match mode {
        ConsistencyMode::Report => api.consistency_report().await.map(ConsistencyOutcome::Report),
        ConsistencyMode::Update => api
            .run_consistency_update()
            .await
            .map(ConsistencyOutcome::Update),
    };

    match result {
        Ok(outcome) => Printout {
            text: outcome.render(),
            failed: false,
        },
        Err(e) => {
            error!(error = %e, "Consistency check failed");
            Printout {
                text: error_text(&e.to_string()),
                failed: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AnalyzerStats, UpdateAck};
    use crate::source::mock::MockApi;

    #[tokio::test]
    async fn test_one_panel_failing_is_not_a_failure() {
        let api = MockApi {
            analyzer: Some(AnalyzerStats {
                num_gps_events: Some(3),
                num_alert_events: None,
            }),
            ..MockApi::default()
        };
        let out = stats(&api).await;
        assert!(!out.failed);
        assert_eq!(
            out.text,
            "== Processing Stats ==\nError: Connection failed: connection refused\n\n\
             == Analyzer Stats ==\nGPS Events Count: 3\nAlert Events Count: 0"
        );
    }

    #[tokio::test]
    async fn test_both_panels_failing_is_a_failure() {
        let out = stats(&MockApi::default()).await;
        assert!(out.failed);
    }

    #[tokio::test]
    async fn test_consistency_update_printout() {
        let api = MockApi {
            ack: Some(UpdateAck {
                processing_time_ms: 7,
            }),
            ..MockApi::default()
        };
        let out = consistency(&api, ConsistencyMode::Update).await;
        assert_eq!(
            out,
            Printout {
                text: "Consistency check completed in 7 ms".to_string(),
                failed: false,
            }
        );

        let out = consistency(&api, ConsistencyMode::Report).await;
        assert!(out.failed);
        assert!(out.text.starts_with("Error running consistency check: "));
    }
}
