//! HTTP implementation of [`DashboardApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{DashboardApi, SourceError};
use crate::config::{Endpoints, Settings};
use crate::data::{
    AnalyzerStats, ConsistencyReport, EventKind, EventRecord, ProcessingStats, UpdateAck,
};

/// Dashboard backend reached over HTTP JSON.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    endpoints: Endpoints,
    description: String,
}

/// Error body the services return alongside non-success statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl HttpSource {
    /// Create a source for the given endpoints.
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        let description = format!("http: {}", host_of(&endpoints.processing_stats));
        Ok(Self {
            client,
            endpoints,
            description,
        })
    }

    /// Create a source from resolved settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, SourceError> {
        Self::new(settings.endpoints(), settings.request_timeout())
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SourceError> {
        let request = request.build()?;
        let url = request.url().to_string();
        debug!(method = %request.method(), %url, "Sending request");

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_string()
                });
            warn!(%url, status = status.as_u16(), %message, "Request failed");
            return Err(SourceError::Http {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(%url, error = %e, "Unexpected response body");
            SourceError::Parse(e.to_string())
        })
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }
}

#[async_trait]
impl DashboardApi for HttpSource {
    async fn processing_stats(&self) -> Result<ProcessingStats, SourceError> {
        self.fetch(self.get(&self.endpoints.processing_stats)).await
    }

    async fn analyzer_stats(&self) -> Result<AnalyzerStats, SourceError> {
        self.fetch(self.get(&self.endpoints.analyzer_stats)).await
    }

    async fn track_event(&self, kind: EventKind, index: u64) -> Result<EventRecord, SourceError> {
        let url = match kind {
            EventKind::Gps => &self.endpoints.track_gps,
            EventKind::Alert => &self.endpoints.track_alerts,
        };
        self.fetch(self.get(url).query(&[("index", index)])).await
    }

    async fn consistency_report(&self) -> Result<ConsistencyReport, SourceError> {
        self.fetch(self.get(&self.endpoints.consistency_checks)).await
    }

    async fn run_consistency_update(&self) -> Result<UpdateAck, SourceError> {
        self.fetch(self.client.post(&self.endpoints.consistency_update)).await
    }

    fn description(&self) -> &str {
        &self.description
    }
}

// Origin of a URL, for display. Unparseable URLs are shown as given.
fn host_of(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) if parsed.origin().is_tuple() => parsed.origin().ascii_serialization(),
        _ => url.to_string(),
    }
}
