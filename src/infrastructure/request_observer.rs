// Structured request diagnostics
use crate::application::errors::SyncError;
use reqwest::header::HeaderMap;
use std::time::Duration;

/// One finished request, successful or not.
#[derive(Debug)]
pub struct RequestEvent<'a> {
    pub url: &'a str,
    pub status: Option<u16>,
    pub latency: Duration,
    pub headers: Option<&'a HeaderMap>,
    pub error: Option<&'a SyncError>,
}

pub trait RequestObserver: Send + Sync {
    fn on_request(&self, event: &RequestEvent<'_>);
}

/// Emits one `tracing` event per request.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn on_request(&self, event: &RequestEvent<'_>) {
        let latency_ms = event.latency.as_millis() as u64;
        match event.error {
            Some(error) => tracing::warn!(
                url = event.url,
                status = ?event.status,
                latency_ms,
                error_kind = error.kind(),
                headers = ?event.headers,
                error = %error,
                "request failed"
            ),
            None => tracing::debug!(
                url = event.url,
                status = ?event.status,
                latency_ms,
                "request completed"
            ),
        }
    }
}
