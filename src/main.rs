// Main entry point - Dependency injection and sync loop
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::application::sync_scheduler::{SchedulerOptions, SyncScheduler};
use crate::infrastructure::cache_interceptor::CacheInterceptor;
use crate::infrastructure::cache_storage::MemoryCacheStorage;
use crate::infrastructure::config::load_settings;
use crate::infrastructure::http_fetch::NetworkFetcher;
use crate::infrastructure::http_transport::HttpTelemetryClient;
use crate::infrastructure::request_observer::TracingObserver;
use crate::presentation::adapter::PresentationAdapter;
use crate::presentation::console_renderer::ConsoleRenderer;
use crate::presentation::range_input::spawn_stdin_ranges;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let settings = load_settings()?;
    let offset = settings.display_offset()?;
    let capacity = settings.series_capacity()?;

    // Network access goes through the asset cache (infrastructure layer)
    let network = Arc::new(NetworkFetcher::new(settings.request_timeout())?);
    let interceptor = Arc::new(CacheInterceptor::new(
        network,
        Arc::new(MemoryCacheStorage::new()),
    ));
    if let Err(e) = interceptor.install(&settings.manifest()).await {
        tracing::warn!(error = %e, "continuing without an active asset cache");
    }
    tracing::debug!(state = ?interceptor.state().await, "asset cache");

    let repository = Arc::new(HttpTelemetryClient::new(
        settings.api.base_url.clone(),
        interceptor,
        Arc::new(TracingObserver),
    ));

    // Create scheduler (application layer)
    let adapter = PresentationAdapter::new(
        offset,
        settings.display.unit,
        settings.max_reading_age(),
    );
    let scheduler = Arc::new(SyncScheduler::new(
        repository,
        adapter,
        Box::new(ConsoleRenderer::stdout()),
        SchedulerOptions {
            fast_period: settings.fast_period(),
            capacity,
        },
    ));

    // Range selections typed on stdin (presentation layer)
    let (range_tx, range_rx) = mpsc::channel(8);
    let _input = spawn_stdin_ranges(range_tx);

    tracing::info!(
        base_url = %settings.api.base_url,
        range = %settings.sync.initial_range,
        "starting iotsync client (type day/week/month/year to switch range)"
    );

    scheduler
        .run(settings.sync.initial_range, range_rx, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await;

    Ok(())
}
