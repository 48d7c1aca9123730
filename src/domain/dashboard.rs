// Dashboard session domain model
use super::series_buffer::SeriesBuffer;
use super::telemetry::{StatsSnapshot, TimeRange};

/// Everything the live dashboard shows for one time-range selection.
///
/// A new session is created for every successful range refresh; the fast
/// cadence only ever mutates the current one.
#[derive(Debug, Clone)]
pub struct DashboardSession {
    pub range: TimeRange,
    pub buffer: SeriesBuffer,
    pub stats: Option<StatsSnapshot>,
    /// Set once the renderer has drawn this session's chart from scratch.
    pub chart_initialized: bool,
}

impl DashboardSession {
    pub fn new(range: TimeRange, capacity: usize) -> Self {
        Self {
            range,
            buffer: SeriesBuffer::new(capacity),
            stats: None,
            chart_initialized: false,
        }
    }

    /// Threshold line shown on the chart, taken from the latest stats.
    pub fn alert_threshold(&self) -> Option<f64> {
        self.stats.as_ref().map(|s| s.alert_threshold)
    }
}
