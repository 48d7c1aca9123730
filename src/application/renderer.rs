// Renderer port - the chart widget and display fields are external
use crate::domain::telemetry::{TemperatureUnit, TimeRange};

/// The `{labels[], values[]}` series plus the threshold reference line.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartInput {
    pub range: TimeRange,
    pub unit: TemperatureUnit,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadingView {
    pub celsius: f64,
    pub fahrenheit: f64,
    pub updated_at: String,
    /// The sensor has not reported for longer than the configured max age.
    pub stale: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsView {
    pub unit: TemperatureUnit,
    pub min: f64,
    pub max: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertView {
    pub id: i64,
    pub kind: String,
    pub message: String,
    pub time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayField {
    Reading,
    Stats,
    Chart,
    Alerts,
}

pub trait Renderer: Send {
    /// Build the chart from scratch, discarding whatever was drawn before.
    fn initialize_chart(&mut self, chart: &ChartInput);

    /// Redraw an already initialized chart with new data.
    fn update_chart(&mut self, chart: &ChartInput);

    fn show_reading(&mut self, reading: &ReadingView);

    fn show_stats(&mut self, stats: &StatsView);

    fn show_alerts(&mut self, alerts: &[AlertView]);

    /// Flag a field as stale/errored while leaving its last value visible.
    fn mark_stale(&mut self, field: DisplayField, reason: &str);
}
