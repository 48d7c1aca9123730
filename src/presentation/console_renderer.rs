// Terminal renderer - draws the dashboard as plain text
use crate::application::renderer::{AlertView, ChartInput, DisplayField, ReadingView, Renderer, StatsView};
use std::collections::HashSet;
use std::io::Write;

/// Widest sparkline drawn for a chart.
const SPARK_WIDTH: usize = 60;
const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub struct ConsoleRenderer<W: Write + Send> {
    out: W,
    stale: HashSet<DisplayField>,
    chart_ready: bool,
}

impl ConsoleRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            stale: HashSet::new(),
            chart_ready: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            tracing::warn!(error = %e, "failed to write dashboard output");
        }
    }

    fn draw_chart(&mut self, chart: &ChartInput, heading: &str) {
        self.stale.remove(&DisplayField::Chart);
        let unit = chart.unit.symbol();
        let (first, last) = match (chart.labels.first(), chart.labels.last()) {
            (Some(first), Some(last)) => (first.clone(), last.clone()),
            _ => {
                self.line(&format!("[{}] {} chart: no data", heading, chart.range));
                return;
            }
        };

        let threshold = chart
            .threshold
            .map(|t| format!(", threshold {:.1}{}", t, unit))
            .unwrap_or_default();
        self.line(&format!(
            "[{}] {} chart: {} points, {} .. {}{}",
            heading,
            chart.range,
            chart.values.len(),
            first,
            last,
            threshold
        ));
        self.line(&format!("  {}", sparkline(&chart.values, SPARK_WIDTH)));
    }
}

/// Downsample `values` to at most `width` glyphs scaled between min and max.
pub fn sparkline(values: &[f64], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }

    let step = values.len().div_ceil(width);
    let sampled: Vec<f64> = values
        .chunks(step)
        .map(|chunk| chunk.iter().sum::<f64>() / chunk.len() as f64)
        .collect();

    let min = sampled.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = sampled.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    sampled
        .iter()
        .map(|v| {
            if span <= f64::EPSILON {
                SPARKS[SPARKS.len() / 2]
            } else {
                let idx = ((v - min) / span * (SPARKS.len() - 1) as f64).round() as usize;
                SPARKS[idx.min(SPARKS.len() - 1)]
            }
        })
        .collect()
}

impl<W: Write + Send> Renderer for ConsoleRenderer<W> {
    fn initialize_chart(&mut self, chart: &ChartInput) {
        self.chart_ready = true;
        self.draw_chart(chart, "new");
    }

    fn update_chart(&mut self, chart: &ChartInput) {
        if !self.chart_ready {
            self.initialize_chart(chart);
            return;
        }
        self.draw_chart(chart, "update");
    }

    fn show_reading(&mut self, reading: &ReadingView) {
        self.stale.remove(&DisplayField::Reading);
        let marker = if reading.stale { " (sensor silent)" } else { "" };
        self.line(&format!(
            "Current: {:.1}°C / {:.1}°F at {}{}",
            reading.celsius, reading.fahrenheit, reading.updated_at, marker
        ));
    }

    fn show_stats(&mut self, stats: &StatsView) {
        self.stale.remove(&DisplayField::Stats);
        let unit = stats.unit.symbol();
        self.line(&format!(
            "24h: min {:.1}{} max {:.1}{} (alert below {:.1}{})",
            stats.min, unit, stats.max, unit, stats.threshold, unit
        ));
    }

    fn show_alerts(&mut self, alerts: &[AlertView]) {
        self.stale.remove(&DisplayField::Alerts);
        if alerts.is_empty() {
            self.line("Alerts: none");
            return;
        }
        self.line(&format!("Alerts ({}):", alerts.len()));
        for alert in alerts {
            self.line(&format!("  {} [{}] {}", alert.time, alert.kind, alert.message));
        }
    }

    fn mark_stale(&mut self, field: DisplayField, reason: &str) {
        if self.stale.insert(field) {
            self.line(&format!("! {:?} is stale: {}", field, reason));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::{TemperatureUnit, TimeRange};

    fn output(renderer: ConsoleRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn test_sparkline_scales_and_downsamples() {
        assert_eq!(sparkline(&[1.0, 2.0, 3.0], 10), "▁▅█");
        assert_eq!(sparkline(&[5.0; 100], 10).chars().count(), 10);
        assert_eq!(sparkline(&[], 10), "");
    }

    #[test]
    fn test_stale_marked_once_until_refreshed() {
        let mut renderer = ConsoleRenderer::new(Vec::new());
        renderer.mark_stale(DisplayField::Stats, "timeout");
        renderer.mark_stale(DisplayField::Stats, "timeout");
        renderer.show_stats(&StatsView {
            unit: TemperatureUnit::Fahrenheit,
            min: 99.0,
            max: 103.0,
            threshold: 101.0,
        });
        renderer.mark_stale(DisplayField::Stats, "timeout");

        let text = output(renderer);
        assert_eq!(text.matches("Stats is stale").count(), 2);
        assert!(text.contains("min 99.0°F max 103.0°F"));
    }

    #[test]
    fn test_chart_summary() {
        let mut renderer = ConsoleRenderer::new(Vec::new());
        renderer.update_chart(&ChartInput {
            range: TimeRange::Day,
            unit: TemperatureUnit::Fahrenheit,
            labels: vec!["a".to_string(), "b".to_string()],
            values: vec![100.0, 102.0],
            threshold: Some(101.0),
        });

        let text = output(renderer);
        assert!(text.starts_with("[new] day chart: 2 points, a .. b, threshold 101.0°F"));
    }
}
