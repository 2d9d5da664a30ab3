//! Background tick workers, one OS thread per station category.
//!
//! A worker takes the current instant as its first deadline, then loops:
//! run one pass over its category, advance the deadline by the category
//! interval, and wait on a condition variable until the deadline or until
//! it is told to stop. Stopping sets the flag under the mutex and signals
//! the condition variable, so a waiting worker wakes at once; a worker in
//! the middle of a pass finishes the pass first.
//!
//! The iteration counter wraps at the category's ticks per day.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use starbase_types::StationKind;
use starbase_world::Universe;
use tracing::{debug, error, info, warn};

use crate::config::EconomyConfig;
use crate::economy::run_pass;

/// Shortest interval a worker waits between passes.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Errors raised when starting a worker.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The category already has a live worker.
    #[error("{0} ticker is already running")]
    AlreadyRunning(StationKind),

    /// The category is configured with zero ticks per day.
    #[error("{0} ticker has zero ticks per day")]
    InvalidTicksPerDay(StationKind),

    /// The OS refused to create the thread.
    #[error("failed to spawn {kind} ticker: {source}")]
    Spawn {
        /// The category being started.
        kind: StationKind,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// What a worker did before it was stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    /// The worker's category.
    pub kind: StationKind,
    /// Passes completed.
    pub passes: u64,
    /// Why the worker ended early, if it did.
    pub error: Option<String>,
}

/// Stop flag plus the condition variable a waiting worker sleeps on.
#[derive(Debug, Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    /// Lock the flag. Only a `bool` lives behind the mutex, so a poisoned
    /// lock still holds a usable value.
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.stopped.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn raise(&self) {
        *self.lock() = true;
        self.wake.notify_all();
    }

    /// Sleep until `deadline` or until stopped. Returns `true` if stopped.
    fn wait_until(&self, deadline: Instant) -> bool {
        let mut stopped = self.lock();
        loop {
            if *stopped {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            stopped = match self.wake.wait_timeout(stopped, remaining) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }
}

struct Worker {
    signal: Arc<StopSignal>,
    handle: JoinHandle<WorkerReport>,
}

impl Worker {
    fn stop(self, kind: StationKind) -> WorkerReport {
        self.signal.raise();
        self.handle.join().unwrap_or_else(|_| WorkerReport {
            kind,
            passes: 0,
            error: Some("worker thread panicked".to_owned()),
        })
    }
}

/// Owner of the tick workers for one universe.
pub struct Scheduler {
    universe: Arc<Universe>,
    economy: EconomyConfig,
    ports: Option<Worker>,
    bases: Option<Worker>,
}

impl Scheduler {
    /// Create a scheduler with no running workers.
    pub fn new(universe: Arc<Universe>, economy: &EconomyConfig) -> Self {
        Self {
            universe,
            economy: economy.clone(),
            ports: None,
            bases: None,
        }
    }

    const fn slot(&mut self, kind: StationKind) -> &mut Option<Worker> {
        match kind {
            StationKind::Port => &mut self.ports,
            StationKind::Base => &mut self.bases,
        }
    }

    /// Spawn the worker for `kind`. A worker that already ended on its own
    /// is reaped and replaced.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::AlreadyRunning`] if a live worker exists,
    /// [`SchedulerError::InvalidTicksPerDay`] for a zero-tick day, or
    /// [`SchedulerError::Spawn`] if the thread cannot be created.
    pub fn start(&mut self, kind: StationKind) -> Result<(), SchedulerError> {
        let ticks_per_day = self.economy.ticks_per_day(kind);
        if ticks_per_day == 0 {
            return Err(SchedulerError::InvalidTicksPerDay(kind));
        }
        let interval = self.economy.interval(kind).max(MIN_INTERVAL);

        let slot = self.slot(kind);
        if let Some(worker) = slot.take() {
            if !worker.handle.is_finished() {
                *slot = Some(worker);
                return Err(SchedulerError::AlreadyRunning(kind));
            }
            let report = worker.stop(kind);
            warn!(
                kind = %kind,
                passes = report.passes,
                error = ?report.error,
                "reaped finished ticker"
            );
        }

        let signal = Arc::new(StopSignal::default());
        let universe = Arc::clone(&self.universe);
        let worker_signal = Arc::clone(&signal);
        let handle = thread::Builder::new()
            .name(format!("{kind}-ticker"))
            .spawn(move || run_worker(&universe, kind, interval, ticks_per_day, &worker_signal))
            .map_err(|source| SchedulerError::Spawn { kind, source })?;

        *self.slot(kind) = Some(Worker { signal, handle });
        info!(kind = %kind, interval_ms = interval.as_millis(), ticks_per_day, "ticker started");
        Ok(())
    }

    /// Stop and join the worker for `kind`. Returns `None` if no worker was
    /// started, so stopping twice or before starting is harmless.
    pub fn stop(&mut self, kind: StationKind) -> Option<WorkerReport> {
        let worker = self.slot(kind).take()?;
        let report = worker.stop(kind);
        info!(kind = %kind, passes = report.passes, "ticker stopped");
        Some(report)
    }

    /// Whether `kind` has a live worker.
    pub fn is_running(&self, kind: StationKind) -> bool {
        let slot = match kind {
            StationKind::Port => &self.ports,
            StationKind::Base => &self.bases,
        };
        slot.as_ref().is_some_and(|w| !w.handle.is_finished())
    }

    /// Stop every worker, ports first.
    pub fn shutdown(&mut self) -> Vec<WorkerReport> {
        StationKind::ALL
            .into_iter()
            .filter_map(|kind| self.stop(kind))
            .collect()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        let reports = self.shutdown();
        if !reports.is_empty() {
            debug!(workers = reports.len(), "scheduler dropped with running tickers");
        }
    }
}

fn run_worker(
    universe: &Universe,
    kind: StationKind,
    interval: Duration,
    ticks_per_day: u32,
    signal: &StopSignal,
) -> WorkerReport {
    let mut report = WorkerReport {
        kind,
        passes: 0,
        error: None,
    };
    let mut deadline = Instant::now();
    let mut iteration = 0_u32;

    while !*signal.lock() {
        if let Err(e) = run_pass(universe, kind, iteration, ticks_per_day) {
            error!(kind = %kind, iteration, error = %e, "tick pass failed, ticker exiting");
            report.error = Some(e.to_string());
            return report;
        }
        report.passes = report.passes.saturating_add(1);
        iteration = iteration
            .saturating_add(1)
            .checked_rem(ticks_per_day)
            .unwrap_or(0);

        deadline = deadline.checked_add(interval).unwrap_or_else(Instant::now);
        let now = Instant::now();
        if deadline < now {
            let behind_ms = now.duration_since(deadline).as_millis();
            warn!(kind = %kind, behind_ms, "ticker fell behind");
            deadline = now;
        }
        if signal.wait_until(deadline) {
            break;
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use starbase_types::{Position, StationId, SystemId};
    use starbase_world::{Anchor, Cargo, Inventory, Item, Station, System};

    use super::*;
    use crate::config::TickCategoryConfig;

    fn universe() -> Arc<Universe> {
        let mut universe = Universe::default();
        let system = System::new(SystemId::new(1), "Sol".to_owned(), 0, Position::ORIGIN);
        assert!(universe.sectors_mut().insert(system).is_ok());
        let fuel = Item::new("Fuel", 1, 10);
        let cargo = Cargo::new(&fuel, 1_000_000, 0).with_daily_change(10);
        let inventory = Inventory::from(vec![cargo]);
        let station = Station::new(
            StationId::new(7),
            StationKind::Base,
            "Sol Depot".to_owned(),
            "Depot".to_owned(),
            Anchor::System(SystemId::new(1)),
            inventory,
        );
        assert!(universe.build_station(station).is_ok());
        Arc::new(universe)
    }

    fn economy(day_length_ms: u64) -> EconomyConfig {
        EconomyConfig {
            day_length_ms,
            ports: TickCategoryConfig { ticks_per_day: 10 },
            bases: TickCategoryConfig { ticks_per_day: 10 },
            ..EconomyConfig::default()
        }
    }

    #[test]
    fn stop_without_start_is_a_no_op() {
        let mut scheduler = Scheduler::new(universe(), &economy(1_000));
        assert!(!scheduler.is_running(StationKind::Port));
        assert!(scheduler.stop(StationKind::Port).is_none());
        assert!(scheduler.shutdown().is_empty());
    }

    #[test]
    fn second_start_is_rejected() {
        let mut scheduler = Scheduler::new(universe(), &economy(3_600_000));
        assert!(scheduler.start(StationKind::Base).is_ok());
        assert!(matches!(
            scheduler.start(StationKind::Base),
            Err(SchedulerError::AlreadyRunning(StationKind::Base))
        ));
        assert!(scheduler.is_running(StationKind::Base));
        let report = scheduler.stop(StationKind::Base);
        assert!(report.is_some_and(|r| r.error.is_none()));
        assert!(!scheduler.is_running(StationKind::Base));
    }

    #[test]
    fn zero_ticks_per_day_is_rejected() {
        let mut config = economy(1_000);
        config.ports.ticks_per_day = 0;
        let mut scheduler = Scheduler::new(universe(), &config);
        assert!(matches!(
            scheduler.start(StationKind::Port),
            Err(SchedulerError::InvalidTicksPerDay(StationKind::Port))
        ));
    }

    #[test]
    fn stop_interrupts_a_long_wait() {
        // One pass, then a six-minute wait.
        let mut scheduler = Scheduler::new(universe(), &economy(3_600_000));
        assert!(scheduler.start(StationKind::Base).is_ok());
        thread::sleep(Duration::from_millis(50));
        let started = Instant::now();
        let report = scheduler.stop(StationKind::Base);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(report.map(|r| r.passes), Some(1));
    }

    #[test]
    fn workers_tick_the_universe() {
        let universe = universe();
        let mut scheduler = Scheduler::new(Arc::clone(&universe), &economy(100));
        assert!(scheduler.start(StationKind::Base).is_ok());
        thread::sleep(Duration::from_millis(120));
        let reports = scheduler.shutdown();
        assert_eq!(reports.len(), 1);
        let passes = reports.first().map_or(0, |r| r.passes);
        assert!(passes >= 2);

        // One unit per pass.
        let station = universe.station(StationKind::Base, StationId::new(7)).ok();
        let amount = station.and_then(|s| {
            let inventory = s.read().ok()?;
            inventory.find("Fuel").map(Cargo::amount)
        });
        assert_eq!(amount, i64::try_from(passes).ok());
    }

    #[test]
    fn thread_names_follow_the_category() {
        let mut scheduler = Scheduler::new(universe(), &economy(3_600_000));
        assert!(scheduler.start(StationKind::Port).is_ok());
        let name = scheduler
            .ports
            .as_ref()
            .and_then(|w| w.handle.thread().name().map(str::to_owned));
        assert_eq!(name.as_deref(), Some("port-ticker"));
    }
}
