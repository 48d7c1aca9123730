// REST transport for the sensor API
use crate::application::errors::SyncError;
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::telemetry::{AlertEvent, HistoryRecord, Sample, StatsSnapshot, TimeRange};
use crate::infrastructure::http_fetch::{HttpFetch, HttpRequest};
use crate::infrastructure::request_observer::{RequestEvent, RequestObserver};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;

/// Longest body excerpt carried in a status error.
const BODY_EXCERPT_LEN: usize = 200;

#[derive(Clone)]
pub struct HttpTelemetryClient {
    base_url: String,
    fetcher: Arc<dyn HttpFetch>,
    observer: Arc<dyn RequestObserver>,
}

impl HttpTelemetryClient {
    pub fn new(
        base_url: impl Into<String>,
        fetcher: Arc<dyn HttpFetch>,
        observer: Arc<dyn RequestObserver>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            fetcher,
            observer,
        }
    }

    fn endpoint_url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, SyncError> {
        let url = self.endpoint_url(path_and_query);
        let started = Instant::now();

        let response = match self.fetcher.get(&HttpRequest::json(&url)).await {
            Ok(response) => response,
            Err(error) => {
                self.observer.on_request(&RequestEvent {
                    url: &url,
                    status: error.status(),
                    latency: started.elapsed(),
                    headers: None,
                    error: Some(&error),
                });
                return Err(error);
            }
        };

        let status = response.status.as_u16();
        let result = if !response.status.is_success() {
            let body = String::from_utf8_lossy(&response.body);
            let excerpt: String = body.chars().take(BODY_EXCERPT_LEN).collect();
            Err(SyncError::transport(
                &url,
                Some(status),
                format!("unexpected status {}: {}", response.status, excerpt),
            ))
        } else {
            serde_json::from_slice::<T>(&response.body).map_err(|source| SyncError::Decode {
                url: url.clone(),
                source,
            })
        };

        self.observer.on_request(&RequestEvent {
            url: &url,
            status: Some(status),
            latency: started.elapsed(),
            headers: Some(&response.headers),
            error: result.as_ref().err(),
        });
        result
    }
}

#[async_trait]
impl TelemetryRepository for HttpTelemetryClient {
    async fn fetch_current(&self) -> Result<Sample, SyncError> {
        self.fetch_json("/temperature/current").await
    }

    async fn fetch_stats(&self) -> Result<StatsSnapshot, SyncError> {
        self.fetch_json("/temperature/stats").await
    }

    async fn fetch_history(&self, range: TimeRange) -> Result<Vec<Sample>, SyncError> {
        let path = format!(
            "/temperature/history?timerange={}",
            urlencoding::encode(range.as_str())
        );
        let records: Vec<HistoryRecord> = self.fetch_json(&path).await?;
        Ok(records.into_iter().map(Sample::from).collect())
    }

    async fn fetch_recent_alerts(&self) -> Result<Vec<AlertEvent>, SyncError> {
        self.fetch_json("/alerts/recent").await
    }
}
