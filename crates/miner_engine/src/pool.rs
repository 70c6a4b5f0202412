use std::collections::VecDeque;
use std::time::{Duration, Instant};

use miner_logging::{miner_debug, miner_warn};
use serde::{Deserialize, Serialize};

use crate::config::duration_ms;
use crate::{UnitStatus, WorkUnit};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    pub max_concurrency: usize,
    /// Sleep between liveness checks while waiting for a slot or draining.
    #[serde(with = "duration_ms")]
    pub poll_interval: Duration,
    /// A worker still running after this long is killed and counted as failed.
    #[serde(with = "duration_ms")]
    pub unit_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 20,
            poll_interval: Duration::from_millis(500),
            unit_timeout: Duration::from_secs(600),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to start worker for {unit}: {message}")]
pub struct SpawnError {
    pub unit: String,
    pub message: String,
}

/// What a worker left behind once it stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedWork {
    pub success: bool,
    pub message: String,
    pub output: String,
}

pub trait WorkerHandle {
    fn is_running(&mut self) -> bool;
    fn kill(&mut self);
    /// Collect exit status and captured output. Only called once the worker stopped.
    fn finish(self) -> FinishedWork;
}

pub trait Spawner {
    type Handle: WorkerHandle;
    fn start(&mut self, unit: &WorkUnit) -> Result<Self::Handle, SpawnError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEvent {
    Started { unit_id: String, running: usize },
    Finished { unit: WorkUnit, running: usize },
}

pub trait PoolProgress: Send + Sync {
    fn emit(&self, event: PoolEvent);
}

struct NullProgress;

impl PoolProgress for NullProgress {
    fn emit(&self, _event: PoolEvent) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PoolSummary {
    pub units: Vec<WorkUnit>,
    pub succeeded: usize,
    pub failed: usize,
    pub peak_running: usize,
}

impl PoolSummary {
    pub fn total(&self) -> usize {
        self.units.len()
    }
}

struct InFlight<H> {
    unit: WorkUnit,
    handle: H,
    started: Instant,
}

/// Bounded fan-out of work units onto worker processes.
///
/// All bookkeeping happens on the caller's task; handles never leave the pool.
pub struct WorkerPool<S: Spawner> {
    spawner: S,
    settings: PoolSettings,
    progress: Box<dyn PoolProgress>,
    pending: VecDeque<WorkUnit>,
    in_flight: Vec<InFlight<S::Handle>>,
    finished: Vec<WorkUnit>,
    peak_running: usize,
}

impl<S: Spawner> WorkerPool<S> {
    pub fn new(spawner: S, mut settings: PoolSettings) -> Self {
        settings.max_concurrency = settings.max_concurrency.max(1);
        Self {
            spawner,
            settings,
            progress: Box::new(NullProgress),
            pending: VecDeque::new(),
            in_flight: Vec::new(),
            finished: Vec::new(),
            peak_running: 0,
        }
    }

    pub fn with_progress(mut self, progress: Box<dyn PoolProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    pub fn submit(&mut self, unit_id: impl Into<String>) {
        self.pending.push_back(WorkUnit::new(unit_id));
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn running(&self) -> usize {
        self.in_flight.len()
    }

    /// Start pending units, waiting for a free slot before each one.
    pub async fn pump(&mut self) {
        while let Some(unit) = self.pending.pop_front() {
            self.wait_for_slot().await;
            self.start(unit);
        }
    }

    /// Wait until every started unit has stopped.
    pub async fn drain(&mut self) {
        loop {
            self.reap();
            if self.in_flight.is_empty() {
                return;
            }
            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }

    /// Run every submitted unit to a terminal state and report the totals.
    pub async fn run(&mut self) -> PoolSummary {
        self.pump().await;
        self.drain().await;
        self.take_summary()
    }

    fn take_summary(&mut self) -> PoolSummary {
        let units = std::mem::take(&mut self.finished);
        let succeeded = units
            .iter()
            .filter(|unit| unit.status == UnitStatus::Done)
            .count();
        PoolSummary {
            failed: units.len() - succeeded,
            succeeded,
            units,
            peak_running: self.peak_running,
        }
    }

    async fn wait_for_slot(&mut self) {
        loop {
            self.reap();
            if self.in_flight.len() < self.settings.max_concurrency {
                return;
            }
            miner_debug!(
                "Max workers reached ({}). Waiting for one to finish...",
                self.settings.max_concurrency
            );
            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }

    fn start(&mut self, mut unit: WorkUnit) {
        match self.spawner.start(&unit) {
            Ok(handle) => {
                unit.mark_running();
                let unit_id = unit.id.clone();
                self.in_flight.push(InFlight {
                    unit,
                    handle,
                    started: Instant::now(),
                });
                let running = self.in_flight.len();
                self.peak_running = self.peak_running.max(running);
                miner_debug!("Started worker for {} (active: {})", unit_id, running);
                self.progress.emit(PoolEvent::Started { unit_id, running });
            }
            Err(err) => {
                miner_warn!("{}", err);
                unit.complete(false, err.to_string());
                self.record(unit);
            }
        }
    }

    /// Collect every stopped (or timed out) worker, freeing its slot.
    fn reap(&mut self) -> usize {
        let timeout = self.settings.unit_timeout;
        let mut reaped = 0;
        let mut index = 0;
        while index < self.in_flight.len() {
            let entry = &mut self.in_flight[index];
            let timed_out = if entry.handle.is_running() {
                if entry.started.elapsed() < timeout {
                    index += 1;
                    continue;
                }
                entry.handle.kill();
                true
            } else {
                false
            };

            let InFlight {
                mut unit, handle, ..
            } = self.in_flight.remove(index);
            let work = handle.finish();
            unit.output = work.output;
            if timed_out {
                miner_warn!("{} timed out after {:?}", unit.id, timeout);
                unit.complete(false, format!("timed out after {timeout:?}"));
            } else {
                unit.complete(work.success, work.message);
            }
            self.record(unit);
            reaped += 1;
        }
        reaped
    }

    fn record(&mut self, unit: WorkUnit) {
        miner_debug!("{} finished as {:?}", unit.id, unit.status);
        self.progress.emit(PoolEvent::Finished {
            unit: unit.clone(),
            running: self.in_flight.len(),
        });
        self.finished.push(unit);
    }
}
