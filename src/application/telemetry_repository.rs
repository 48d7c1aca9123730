// Repository trait for the sensor REST API
use crate::application::errors::SyncError;
use crate::domain::telemetry::{AlertEvent, Sample, StatsSnapshot, TimeRange};
use async_trait::async_trait;

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// Latest reading
    async fn fetch_current(&self) -> Result<Sample, SyncError>;

    /// Aggregate min/max and the alert threshold
    async fn fetch_stats(&self) -> Result<StatsSnapshot, SyncError>;

    /// Time-ascending samples covering `range`
    async fn fetch_history(&self, range: TimeRange) -> Result<Vec<Sample>, SyncError>;

    /// Most recent alerts, newest first
    async fn fetch_recent_alerts(&self) -> Result<Vec<AlertEvent>, SyncError>;
}
