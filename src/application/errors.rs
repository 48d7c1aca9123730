// Error taxonomy for sync cycles and the asset cache
use crate::application::cadence::Cadence;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Network failure, or a response outside 2xx.
    #[error("request to {url} failed: {message}")]
    Transport {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// At least one member fetch of a cycle failed, voiding the whole cycle.
    #[error("{cadence} cycle failed: {} of {total} fetches failed", .failures.len())]
    PartialCycle {
        cadence: Cadence,
        total: usize,
        failures: Vec<SyncError>,
    },
}

impl SyncError {
    pub fn transport(url: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        SyncError::Transport {
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Transport { .. } => "transport",
            SyncError::Decode { .. } => "decode",
            SyncError::PartialCycle { .. } => "partial_cycle",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to precache {url} for {generation}: {source}")]
    ManifestFetch {
        generation: String,
        url: String,
        #[source]
        source: SyncError,
    },

    #[error("precache of {url} for {generation} returned status {status}")]
    ManifestStatus {
        generation: String,
        url: String,
        status: u16,
    },
}
