// Sync scheduler - fast and range cadences over one dashboard session
use crate::application::cadence::{Cadence, CadenceGate, CadenceState};
use crate::application::errors::SyncError;
use crate::application::renderer::{DisplayField, Renderer};
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::dashboard::DashboardSession;
use crate::domain::series_buffer::DEFAULT_CAPACITY;
use crate::domain::telemetry::TimeRange;
use crate::presentation::adapter::PresentationAdapter;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    pub fast_period: Duration,
    pub capacity: usize,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            fast_period: Duration::from_secs(60),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug)]
pub enum CycleOutcome {
    Applied,
    /// Another cycle of the same cadence was in flight.
    Skipped,
    Failed(SyncError),
}

impl CycleOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CycleOutcome::Applied)
    }
}

struct DashboardView {
    session: DashboardSession,
    renderer: Box<dyn Renderer>,
}

pub struct SyncScheduler {
    repository: Arc<dyn TelemetryRepository>,
    adapter: PresentationAdapter,
    options: SchedulerOptions,
    fast_gate: CadenceGate,
    range_gate: CadenceGate,
    // Only locked from synchronous sections; never held across a fetch.
    view: Mutex<DashboardView>,
}

impl SyncScheduler {
    pub fn new(
        repository: Arc<dyn TelemetryRepository>,
        adapter: PresentationAdapter,
        renderer: Box<dyn Renderer>,
        options: SchedulerOptions,
    ) -> Self {
        let session = DashboardSession::new(TimeRange::default(), options.capacity);
        Self {
            repository,
            adapter,
            options,
            fast_gate: CadenceGate::new(),
            range_gate: CadenceGate::new(),
            view: Mutex::new(DashboardView { session, renderer }),
        }
    }

    pub fn cadence_state(&self, cadence: Cadence) -> CadenceState {
        match cadence {
            Cadence::Fast => self.fast_gate.state(),
            Cadence::Range => self.range_gate.state(),
        }
    }

    /// Copy of the session currently on display.
    pub async fn session(&self) -> DashboardSession {
        self.view.lock().await.session.clone()
    }

    /// Fetch the current reading and stats, then merge the reading into the
    /// live series. Nothing is mutated unless both fetches succeed.
    pub async fn run_fast_cycle(&self) -> CycleOutcome {
        let Some(_guard) = self.fast_gate.try_enter() else {
            tracing::debug!("fast cycle still in flight, dropping tick");
            return CycleOutcome::Skipped;
        };

        let (current, stats) = tokio::join!(
            self.repository.fetch_current(),
            self.repository.fetch_stats()
        );

        let (sample, stats) = match (current, stats) {
            (Ok(sample), Ok(stats)) => (sample, stats),
            (current, stats) => {
                let error = cycle_failure(Cadence::Fast, [current.err(), stats.err()]);
                self.surface_failure(&error, &[DisplayField::Reading, DisplayField::Stats])
                    .await;
                return CycleOutcome::Failed(error);
            }
        };

        let reading = self.adapter.reading_view(&sample, Utc::now());
        let stats_view = self.adapter.stats_view(&stats);
        if reading.stale {
            tracing::warn!(timestamp = %sample.timestamp, "sensor reading is stale");
        }

        let mut guard = self.view.lock().await;
        let view = &mut *guard;
        let point = self.adapter.to_point(&sample, view.session.range);
        let appended = view.session.buffer.append_if_new(point);
        view.session.stats = Some(stats);

        view.renderer.show_reading(&reading);
        view.renderer.show_stats(&stats_view);
        self.adapter
            .render_chart(&mut view.session, view.renderer.as_mut());

        tracing::debug!(
            appended,
            points = view.session.buffer.len(),
            "fast cycle applied"
        );
        CycleOutcome::Applied
    }

    /// Fetch history, alerts and stats for `range` and rebuild the session
    /// from scratch. On failure the previous chart stays on display.
    pub async fn select_range(&self, range: TimeRange) -> CycleOutcome {
        let Some(_guard) = self.range_gate.try_enter() else {
            tracing::debug!(%range, "range refresh still in flight, dropping selection");
            return CycleOutcome::Skipped;
        };

        tracing::info!(%range, "refreshing history");
        let (history, alerts, stats) = tokio::join!(
            self.repository.fetch_history(range),
            self.repository.fetch_recent_alerts(),
            self.repository.fetch_stats()
        );

        let (history, alerts, stats) = match (history, alerts, stats) {
            (Ok(history), Ok(alerts), Ok(stats)) => (history, alerts, stats),
            (history, alerts, stats) => {
                let error = cycle_failure(Cadence::Range, [history.err(), alerts.err(), stats.err()]);
                self.surface_failure(&error, &[DisplayField::Chart, DisplayField::Alerts])
                    .await;
                return CycleOutcome::Failed(error);
            }
        };

        let mut session = DashboardSession::new(range, self.options.capacity);
        session
            .buffer
            .replace(self.adapter.history_points(&history, range));
        let stats_view = self.adapter.stats_view(&stats);
        session.stats = Some(stats);
        let alert_views = self.adapter.alert_views(&alerts);

        let mut guard = self.view.lock().await;
        let view = &mut *guard;
        view.session = session;

        view.renderer.show_stats(&stats_view);
        view.renderer.show_alerts(&alert_views);
        self.adapter
            .render_chart(&mut view.session, view.renderer.as_mut());

        tracing::info!(
            %range,
            points = view.session.buffer.len(),
            alerts = alert_views.len(),
            "range refresh applied"
        );
        CycleOutcome::Applied
    }

    /// Drive both cadences until `shutdown` resolves: a range refresh for
    /// `initial_range` at startup, a fast cycle every period, and a range
    /// refresh per received selection.
    pub async fn run<F>(
        self: Arc<Self>,
        initial_range: TimeRange,
        mut range_requests: mpsc::Receiver<TimeRange>,
        shutdown: F,
    ) where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut ticker = tokio::time::interval(self.options.fast_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.spawn_range_cycle(initial_range);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("sync scheduler stopping");
                    break;
                }
                _ = ticker.tick() => self.spawn_fast_cycle(),
                Some(range) = range_requests.recv() => self.spawn_range_cycle(range),
            }
        }
    }

    fn spawn_fast_cycle(self: &Arc<Self>) {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            scheduler.run_fast_cycle().await;
        });
    }

    fn spawn_range_cycle(self: &Arc<Self>, range: TimeRange) {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            scheduler.select_range(range).await;
        });
    }

    async fn surface_failure(&self, error: &SyncError, fields: &[DisplayField]) {
        if let SyncError::PartialCycle { cadence, failures, .. } = error {
            for failure in failures {
                tracing::warn!(
                    %cadence,
                    error_kind = failure.kind(),
                    status = ?failure.status(),
                    error = %failure,
                    "cycle fetch failed"
                );
            }
        }

        let reason = error.to_string();
        let mut view = self.view.lock().await;
        for field in fields {
            view.renderer.mark_stale(*field, &reason);
        }
    }
}

fn cycle_failure<const N: usize>(cadence: Cadence, results: [Option<SyncError>; N]) -> SyncError {
    SyncError::PartialCycle {
        cadence,
        total: N,
        failures: results.into_iter().flatten().collect(),
    }
}
