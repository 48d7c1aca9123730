// Outbound GET seam shared by the telemetry transport and asset loads
use crate::application::errors::SyncError;
use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::StatusCode;
use std::time::Duration;

pub const JSON: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub accept: Option<&'static str>,
}

impl HttpRequest {
    pub fn json(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            accept: Some(JSON),
        }
    }

    pub fn asset(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            accept: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub url: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(url: impl Into<String>, status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            url: url.into(),
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// Issue a GET. Only failures to obtain a response are errors; status
    /// interpretation is left to the caller.
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, SyncError>;
}

/// Plain network access through a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct NetworkFetcher {
    client: reqwest::Client,
}

impl NetworkFetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetch for NetworkFetcher {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, SyncError> {
        let mut builder = self.client.get(&request.url);
        if let Some(accept) = request.accept {
            builder = builder.header(ACCEPT, accept);
        }

        let response = builder.send().await.map_err(|e| {
            SyncError::transport(&request.url, e.status().map(|s| s.as_u16()), e.to_string())
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| {
            SyncError::transport(&request.url, Some(status.as_u16()), e.to_string())
        })?;

        Ok(HttpResponse {
            url: request.url.clone(),
            status,
            headers,
            body,
        })
    }
}
