// Telemetry data domain models
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// Zone-less layouts the API emits. `%.f` also accepts a missing fraction.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an API timestamp. Values without a zone marker are taken as UTC.
pub fn parse_api_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_api_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_api_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp `{}`", raw)))
}

/// A single reading from `/temperature/current`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sample {
    #[serde(deserialize_with = "deserialize_api_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f64,
    pub temperature_f: f64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, temperature_c: f64, temperature_f: f64) -> Self {
        Self {
            timestamp,
            temperature_c,
            temperature_f,
        }
    }

    pub fn temperature(&self, unit: TemperatureUnit) -> f64 {
        match unit {
            TemperatureUnit::Celsius => self.temperature_c,
            TemperatureUnit::Fahrenheit => self.temperature_f,
        }
    }
}

/// Row shape of `/temperature/history`; `temperature` is Celsius.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryRecord {
    #[serde(deserialize_with = "deserialize_api_timestamp")]
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub temperature_f: f64,
}

impl From<HistoryRecord> for Sample {
    fn from(record: HistoryRecord) -> Self {
        Sample::new(record.time, record.temperature, record.temperature_f)
    }
}

/// Server-side aggregates. All three values are Fahrenheit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatsSnapshot {
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub alert_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlertEvent {
    pub id: i64,
    #[serde(deserialize_with = "deserialize_api_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub temperature: f64,
    pub threshold: f64,
    pub message: String,
}

/// One plotted point: a pre-formatted time label and its value.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    #[default]
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    /// Express a Fahrenheit value in this unit.
    pub fn from_fahrenheit(&self, fahrenheit: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => (fahrenheit - 32.0) / 1.8,
            TemperatureUnit::Fahrenheit => fahrenheit,
        }
    }
}

/// History window selectable by the user, named as the `timerange` query value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown time range `{0}` (expected day, week, month or year)")]
pub struct UnknownTimeRange(pub String);

impl FromStr for TimeRange {
    type Err = UnknownTimeRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(TimeRange::Day),
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "year" => Ok(TimeRange::Year),
            other => Err(UnknownTimeRange(other.to_string())),
        }
    }
}
