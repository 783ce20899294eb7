//! Active-host sampling scheduler.
//!
//! [`Scheduler`] owns at most one recurring job. Each tick of the job reads
//! the IP addresses of all active servers and hands them to a
//! [`SampleSink`]. Start and stop are idempotent: starting a running
//! scheduler or stopping an idle one is a reported no-op, not an error.
//!
//! Every job carries a generation number. A tick acts only while its
//! generation is the one registered in the scheduler state, and the sample
//! is reported under the state lock, so nothing is reported once `stop`
//! has cleared the state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;
use crate::registry::ServerRegistry;
use crate::store::ServerStore;

/// How often the sampling job runs unless configured otherwise.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of a start or stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerOutcome {
    Started,
    AlreadyRunning,
    Stopped,
    NotRunning,
}

impl SchedulerOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SchedulerOutcome::Started => "Sampling job started",
            SchedulerOutcome::AlreadyRunning => "Sampling job is already running",
            SchedulerOutcome::Stopped => "Sampling job stopped",
            SchedulerOutcome::NotRunning => "No active sampling job to stop",
        }
    }

    /// Whether the request changed the scheduler state.
    pub fn changed_state(&self) -> bool {
        matches!(self, SchedulerOutcome::Started | SchedulerOutcome::Stopped)
    }
}

/// Point-in-time view of the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulerStatus {
    pub running: bool,
    pub interval_secs: u64,
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// IP addresses of the active servers at one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveHostSample {
    pub ips: Vec<String>,
}

/// Receives the output of every tick.
pub trait SampleSink: Send + Sync + 'static {
    fn record(&self, sample: &ActiveHostSample);

    fn record_failure(&self, error: &CoreError);
}

/// Sink that emits structured log events.
#[derive(Debug, Default)]
pub struct LogSink;

impl SampleSink for LogSink {
    fn record(&self, sample: &ActiveHostSample) {
        tracing::info!(count = sample.ips.len(), ips = ?sample.ips, "Active hosts sampled");
    }

    fn record_failure(&self, error: &CoreError) {
        tracing::error!(error = %error, "Active host sampling failed");
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

struct Job {
    generation: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

struct Inner<S> {
    registry: ServerRegistry<S>,
    sink: Arc<dyn SampleSink>,
    interval: Duration,
    job: Mutex<Option<Job>>,
    generations: AtomicU64,
}

/// Owner of the recurring sampling job. Clones share the same state.
pub struct Scheduler<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for Scheduler<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ServerStore> Scheduler<S> {
    /// Create an idle scheduler that reports samples to the log.
    pub fn new(registry: ServerRegistry<S>, interval: Duration) -> Self {
        Self::with_sink(registry, interval, Arc::new(LogSink))
    }

    /// Create an idle scheduler with a custom sink. A zero interval falls
    /// back to [`DEFAULT_SAMPLE_INTERVAL`].
    pub fn with_sink(
        registry: ServerRegistry<S>,
        interval: Duration,
        sink: Arc<dyn SampleSink>,
    ) -> Self {
        let interval = if interval.is_zero() {
            DEFAULT_SAMPLE_INTERVAL
        } else {
            interval
        };

        Self {
            inner: Arc::new(Inner {
                registry,
                sink,
                interval,
                job: Mutex::new(None),
                generations: AtomicU64::new(0),
            }),
        }
    }

    /// Register and start the sampling job unless one is already running.
    ///
    /// A job whose task has exited on its own is replaced.
    pub async fn start(&self) -> SchedulerOutcome {
        let mut job = self.inner.job.lock().await;

        if let Some(current) = job.as_ref() {
            if !current.handle.is_finished() {
                tracing::info!(generation = current.generation, "Sampling job already running");
                return SchedulerOutcome::AlreadyRunning;
            }
            tracing::warn!(
                generation = current.generation,
                "Sampling job exited unexpectedly, replacing it"
            );
        }

        let generation = self.inner.generations.fetch_add(1, Ordering::Relaxed) + 1;
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_job(
            Arc::clone(&self.inner),
            generation,
            cancel.clone(),
        ));

        *job = Some(Job {
            generation,
            cancel,
            handle,
        });

        tracing::info!(
            generation,
            interval_secs = self.inner.interval.as_secs(),
            "Sampling job started"
        );
        SchedulerOutcome::Started
    }

    /// Deregister the sampling job and wait for its task to finish.
    pub async fn stop(&self) -> SchedulerOutcome {
        let job = {
            let mut state = self.inner.job.lock().await;
            let job = state.take();
            if let Some(job) = job.as_ref() {
                job.cancel.cancel();
            }
            job
        };

        let Some(job) = job else {
            tracing::info!("No sampling job to stop");
            return SchedulerOutcome::NotRunning;
        };

        if let Err(e) = job.handle.await {
            tracing::warn!(generation = job.generation, error = %e, "Sampling job ended abnormally");
        }

        tracing::info!(generation = job.generation, "Sampling job stopped");
        SchedulerOutcome::Stopped
    }

    pub async fn status(&self) -> SchedulerStatus {
        let job = self.inner.job.lock().await;
        SchedulerStatus {
            running: job.as_ref().is_some_and(|j| !j.handle.is_finished()),
            interval_secs: self.inner.interval.as_secs(),
        }
    }

    pub async fn is_running(&self) -> bool {
        self.status().await.running
    }

    /// Stop the job, if any, as part of process shutdown.
    pub async fn shutdown(&self) {
        if self.stop().await == SchedulerOutcome::Stopped {
            tracing::info!("Sampling job stopped for shutdown");
        }
    }
}

impl<S: ServerStore> Inner<S> {
    async fn is_current(&self, generation: u64) -> bool {
        self.job
            .lock()
            .await
            .as_ref()
            .is_some_and(|job| job.generation == generation)
    }

    async fn tick(&self, generation: u64) {
        if !self.is_current(generation).await {
            tracing::debug!(generation, "Tick skipped, job no longer active");
            return;
        }

        let result = self.registry.active_ips().await;

        let job = self.job.lock().await;
        if !job.as_ref().is_some_and(|j| j.generation == generation) {
            tracing::debug!(generation, "Discarding sample from stopped job");
            return;
        }
        match result {
            Ok(ips) => self.sink.record(&ActiveHostSample { ips }),
            Err(e) => self.sink.record_failure(&e),
        }
    }
}

async fn run_job<S: ServerStore>(inner: Arc<Inner<S>>, generation: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(inner.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(generation, "Sampling job cancelled");
                break;
            }
            _ = interval.tick() => {
                inner.tick(generation).await;
            }
        }
    }
}
