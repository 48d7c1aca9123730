use crate::domain::cache_manifest::{CacheGeneration, CacheManifest};
use crate::domain::series_buffer::DEFAULT_CAPACITY;
use crate::domain::telemetry::{TemperatureUnit, TimeRange};
use anyhow::Context;
use chrono::FixedOffset;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub sync: SyncSettings,
    pub series: SeriesSettings,
    pub display: DisplaySettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SyncSettings {
    pub fast_period_secs: u64,
    pub initial_range: TimeRange,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            fast_period_secs: 60,
            initial_range: TimeRange::Day,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SeriesSettings {
    pub capacity: usize,
}

impl Default for SeriesSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DisplaySettings {
    /// Civil time offset of the deployment, east of UTC.
    pub utc_offset_minutes: i32,
    pub unit: TemperatureUnit,
    pub max_reading_age_mins: i64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            unit: TemperatureUnit::Fahrenheit,
            max_reading_age_mins: 8 * 60,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheSettings {
    pub name: String,
    pub version: String,
    /// Origin that relative asset paths are resolved against.
    pub origin: String,
    pub assets: Vec<String>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        let assets = [
            "/",
            "/index.html",
            "/manifest.json",
            "/styles.css",
            "/app.js",
            "/env.js",
            "https://cdn.jsdelivr.net/npm/chart.js",
            "https://cdn.jsdelivr.net/npm/chartjs-plugin-annotation",
            "/icons/icon-72x72.png",
            "/icons/icon-192x192.png",
            "/icons/icon-512x512.png",
        ];
        Self {
            name: "iotsync".to_string(),
            version: "v1".to_string(),
            origin: "http://localhost:3000".to_string(),
            assets: assets.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn fast_period(&self) -> Duration {
        Duration::from_secs(self.sync.fast_period_secs.max(1))
    }

    pub fn display_offset(&self) -> anyhow::Result<FixedOffset> {
        let minutes = self.display.utc_offset_minutes;
        FixedOffset::east_opt(minutes * 60)
            .with_context(|| format!("display.utc_offset_minutes out of range: {}", minutes))
    }

    pub fn series_capacity(&self) -> anyhow::Result<usize> {
        if self.series.capacity == 0 {
            anyhow::bail!("series.capacity must be at least 1");
        }
        Ok(self.series.capacity)
    }

    pub fn max_reading_age(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.display.max_reading_age_mins)
    }

    pub fn manifest(&self) -> CacheManifest {
        CacheManifest::from_assets(
            CacheGeneration::new(&self.cache.name, &self.cache.version),
            &self.cache.origin,
            &self.cache.assets,
        )
    }
}

/// Layer `config/iotsync.*` (optional) under `IOTSYNC_*` environment
/// variables, e.g. `IOTSYNC_API__BASE_URL` for the API base URL.
pub fn load_settings() -> anyhow::Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/iotsync").required(false))
        .add_source(
            config::Environment::with_prefix("IOTSYNC")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
