// Presentation adapter - projects samples and sessions onto the renderer
use crate::application::renderer::{AlertView, ChartInput, ReadingView, Renderer, StatsView};
use crate::domain::dashboard::DashboardSession;
use crate::domain::telemetry::{
    AlertEvent, Sample, SeriesPoint, StatsSnapshot, TemperatureUnit, TimeRange,
};
use chrono::{DateTime, Duration, FixedOffset, Utc};

/// Resolution of chart labels. Two samples in the same bucket share a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelGranularity {
    Minute,
    Hour,
    Day,
}

impl LabelGranularity {
    pub fn for_range(range: TimeRange) -> Self {
        match range {
            TimeRange::Day => LabelGranularity::Minute,
            TimeRange::Week | TimeRange::Month => LabelGranularity::Hour,
            TimeRange::Year => LabelGranularity::Day,
        }
    }

    fn pattern(&self) -> &'static str {
        match self {
            LabelGranularity::Minute => "%Y-%m-%d, %I:%M %p",
            LabelGranularity::Hour => "%Y-%m-%d, %I:00 %p",
            LabelGranularity::Day => "%Y-%m-%d",
        }
    }
}

/// Unit the stats endpoint reports in.
const STATS_UNIT: TemperatureUnit = TemperatureUnit::Fahrenheit;

const TIMESTAMP_PATTERN: &str = "%Y-%m-%d, %I:%M:%S %p";

#[derive(Debug, Clone)]
pub struct PresentationAdapter {
    offset: FixedOffset,
    unit: TemperatureUnit,
    max_reading_age: Duration,
}

impl PresentationAdapter {
    pub fn new(offset: FixedOffset, unit: TemperatureUnit, max_reading_age: Duration) -> Self {
        Self {
            offset,
            unit,
            max_reading_age,
        }
    }

    pub fn format_label(&self, timestamp: DateTime<Utc>, granularity: LabelGranularity) -> String {
        timestamp
            .with_timezone(&self.offset)
            .format(granularity.pattern())
            .to_string()
    }

    fn format_timestamp(&self, timestamp: DateTime<Utc>) -> String {
        timestamp
            .with_timezone(&self.offset)
            .format(TIMESTAMP_PATTERN)
            .to_string()
    }

    pub fn to_point(&self, sample: &Sample, range: TimeRange) -> SeriesPoint {
        SeriesPoint::new(
            self.format_label(sample.timestamp, LabelGranularity::for_range(range)),
            sample.temperature(self.unit),
        )
    }

    pub fn history_points(&self, samples: &[Sample], range: TimeRange) -> Vec<SeriesPoint> {
        samples.iter().map(|s| self.to_point(s, range)).collect()
    }

    pub fn chart_input(&self, session: &DashboardSession) -> ChartInput {
        let (labels, values): (Vec<String>, Vec<f64>) = session
            .buffer
            .iter()
            .map(|p| (p.label.clone(), p.value))
            .unzip();

        ChartInput {
            range: session.range,
            unit: self.unit,
            labels,
            values,
            threshold: session
                .alert_threshold()
                .map(|t| self.unit.from_fahrenheit(t)),
        }
    }

    /// Draw the session's chart, initializing it if this session never drew.
    pub fn render_chart(&self, session: &mut DashboardSession, renderer: &mut dyn Renderer) {
        let chart = self.chart_input(session);
        if session.chart_initialized {
            renderer.update_chart(&chart);
        } else {
            renderer.initialize_chart(&chart);
            session.chart_initialized = true;
        }
    }

    pub fn reading_view(&self, sample: &Sample, now: DateTime<Utc>) -> ReadingView {
        ReadingView {
            celsius: sample.temperature_c,
            fahrenheit: sample.temperature_f,
            updated_at: self.format_timestamp(sample.timestamp),
            stale: now.signed_duration_since(sample.timestamp) > self.max_reading_age,
        }
    }

    pub fn stats_view(&self, stats: &StatsSnapshot) -> StatsView {
        StatsView {
            unit: STATS_UNIT,
            min: stats.min_temperature,
            max: stats.max_temperature,
            threshold: stats.alert_threshold,
        }
    }

    pub fn alert_views(&self, alerts: &[AlertEvent]) -> Vec<AlertView> {
        alerts
            .iter()
            .map(|a| AlertView {
                id: a.id,
                kind: a.kind.clone(),
                message: a.message.clone(),
                time: self.format_timestamp(a.timestamp),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::renderer::DisplayField;
    use crate::domain::telemetry::parse_api_timestamp;
    use chrono::TimeZone;

    fn adapter(offset_hours: i32) -> PresentationAdapter {
        PresentationAdapter::new(
            FixedOffset::east_opt(offset_hours * 3600).unwrap(),
            TemperatureUnit::Fahrenheit,
            Duration::hours(8),
        )
    }

    #[derive(Default)]
    struct CountingRenderer {
        initialized: usize,
        updated: usize,
        last: Option<ChartInput>,
    }

    impl Renderer for CountingRenderer {
        fn initialize_chart(&mut self, chart: &ChartInput) {
            self.initialized += 1;
            self.last = Some(chart.clone());
        }
        fn update_chart(&mut self, chart: &ChartInput) {
            self.updated += 1;
            self.last = Some(chart.clone());
        }
        fn show_reading(&mut self, _: &ReadingView) {}
        fn show_stats(&mut self, _: &StatsView) {}
        fn show_alerts(&mut self, _: &[AlertView]) {}
        fn mark_stale(&mut self, _: DisplayField, _: &str) {}
    }

    #[test]
    fn test_naive_timestamp_converted_to_display_zone() {
        let ts = parse_api_timestamp("2024-01-01T00:00:00").unwrap();
        let label = adapter(-5).format_label(ts, LabelGranularity::Minute);
        assert_eq!(label, "2023-12-31, 07:00 PM");
    }

    #[test]
    fn test_granularity_per_range() {
        let ts = Utc.with_ymd_and_hms(2024, 7, 4, 15, 42, 10).unwrap();
        let adapter = adapter(0);
        assert_eq!(adapter.format_label(ts, LabelGranularity::for_range(TimeRange::Day)), "2024-07-04, 03:42 PM");
        assert_eq!(adapter.format_label(ts, LabelGranularity::for_range(TimeRange::Week)), "2024-07-04, 03:00 PM");
        assert_eq!(adapter.format_label(ts, LabelGranularity::for_range(TimeRange::Year)), "2024-07-04");
    }

    #[test]
    fn test_chart_uses_session_threshold() {
        let adapter = adapter(0);
        let mut session = DashboardSession::new(TimeRange::Day, 10);
        session.stats = Some(StatsSnapshot {
            min_temperature: 98.0,
            max_temperature: 104.0,
            alert_threshold: 101.0,
        });
        let sample = Sample::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(), 39.0, 102.2);
        session.buffer.append_if_new(adapter.to_point(&sample, session.range));

        let chart = adapter.chart_input(&session);
        assert_eq!(chart.labels, vec!["2024-01-01, 12:00 PM"]);
        assert_eq!(chart.values, vec![102.2]);
        assert_eq!(chart.threshold, Some(101.0));
    }

    #[test]
    fn test_celsius_chart_converts_threshold() {
        let adapter = PresentationAdapter::new(
            FixedOffset::east_opt(0).unwrap(),
            TemperatureUnit::Celsius,
            Duration::hours(8),
        );
        let mut session = DashboardSession::new(TimeRange::Day, 10);
        let stats = StatsSnapshot {
            min_temperature: 98.0,
            max_temperature: 104.0,
            alert_threshold: 101.0,
        };
        session.stats = Some(stats.clone());
        let sample = Sample::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(), 38.3, 101.0);
        session.buffer.append_if_new(adapter.to_point(&sample, session.range));

        let chart = adapter.chart_input(&session);
        assert_eq!(chart.values, vec![38.3]);
        let threshold = chart.threshold.unwrap();
        assert!((threshold - 38.333).abs() < 0.01);

        let view = adapter.stats_view(&stats);
        assert_eq!(view.unit, TemperatureUnit::Fahrenheit);
        assert_eq!(view.min, 98.0);
        assert_eq!(view.threshold, 101.0);
    }

    #[test]
    fn test_first_render_initializes_then_updates() {
        let adapter = adapter(0);
        let mut session = DashboardSession::new(TimeRange::Day, 10);
        let mut renderer = CountingRenderer::default();

        adapter.render_chart(&mut session, &mut renderer);
        adapter.render_chart(&mut session, &mut renderer);

        assert_eq!(renderer.initialized, 1);
        assert_eq!(renderer.updated, 1);
        assert!(renderer.last.unwrap().threshold.is_none());
    }

    #[test]
    fn test_old_reading_is_stale() {
        let adapter = adapter(0);
        let taken = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let sample = Sample::new(taken, 38.0, 100.4);

        assert!(!adapter.reading_view(&sample, taken + Duration::hours(1)).stale);
        assert!(adapter.reading_view(&sample, taken + Duration::hours(9)).stale);
    }
}
