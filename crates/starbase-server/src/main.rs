//! Galaxy server binary for the Starbase simulation.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `STARBASE_CONFIG` or `starbase-config.yaml`
//!    (defaults when the file is absent), applying `STARBASE_SEED`
//! 2. Initialize structured logging (tracing), text or JSON
//! 3. Validate the configuration and resolve the catalog
//! 4. Generate the galaxy and log its statistics
//! 5. Start the port and base tick workers
//! 6. Wait for Ctrl-C or a dead worker, then stop and join the workers; a
//!    worker that failed makes the process exit with an error

mod error;

use std::sync::Arc;
use std::time::Duration;

use starbase_core::config::{LoggingConfig, SimulationConfig};
use starbase_core::generation;
use starbase_core::scheduler::{Scheduler, WorkerReport};
use starbase_types::StationKind;
use starbase_world::Universe;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::ServerError;

/// How often the server checks that every tick worker is still alive.
const WORKER_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Application entry point for the galaxy server.
///
/// # Errors
///
/// Returns an error if any startup step fails or the shutdown signal
/// cannot be awaited.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("starbase-server starting");
    if !from_file {
        let path = SimulationConfig::path_from_env();
        warn!(path = %path.display(), "config file not found, using defaults");
    }

    // 3-4. Validate, resolve, and generate the galaxy.
    let universe = Arc::new(build_universe(&config)?);
    log_civilizations(&universe);

    // 5. Start the tick workers.
    let mut scheduler = Scheduler::new(Arc::clone(&universe), &config.economy);
    for kind in StationKind::ALL {
        scheduler.start(kind)?;
    }
    info!("tick workers running, press Ctrl-C to stop");

    // 6. Wait for shutdown.
    let reports = wait_for_shutdown(scheduler, WORKER_CHECK_INTERVAL).await?;
    check_reports(&reports)?;

    let stats = universe.stats()?;
    info!(
        ports = stats.ports,
        bases = stats.bases,
        owned = stats.owned_systems,
        "starbase-server shutdown complete"
    );
    Ok(())
}

/// Load the configuration file named by the environment, or defaults when
/// it does not exist. Returns the configuration and whether it came from a
/// file.
fn load_config() -> Result<(SimulationConfig, bool), ServerError> {
    let path = SimulationConfig::path_from_env();
    if path.exists() {
        Ok((SimulationConfig::from_file(&path)?, true))
    } else {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}

/// Validate the configuration, resolve the catalog, and generate the
/// galaxy it describes.
fn build_universe(config: &SimulationConfig) -> Result<Universe, ServerError> {
    config.validate()?;
    let catalog = config.catalog.resolve();
    info!(
        seed = config.galaxy.seed,
        constellations = config.galaxy.constellations,
        items = catalog.items.len(),
        ships = catalog.ships.len(),
        civilizations = catalog.civilizations.len(),
        "Configuration loaded"
    );
    Ok(generation::generate(config, &catalog)?)
}

/// Wait for Ctrl-C or for a worker to end on its own, then stop and join
/// every worker on a blocking task.
async fn wait_for_shutdown(
    mut scheduler: Scheduler,
    check_every: Duration,
) -> Result<Vec<WorkerReport>, ServerError> {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut check = tokio::time::interval(check_every);

    loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                signal?;
                info!("shutdown requested");
                break;
            }
            _ = check.tick() => {
                let stopped = StationKind::ALL
                    .into_iter()
                    .find(|kind| !scheduler.is_running(*kind));
                if let Some(kind) = stopped {
                    error!(kind = %kind, "tick worker ended on its own, shutting down");
                    break;
                }
            }
        }
    }
    Ok(tokio::task::spawn_blocking(move || scheduler.shutdown()).await?)
}

/// Log every worker report. The first worker that ended with an error
/// fails the server.
fn check_reports(reports: &[WorkerReport]) -> Result<(), ServerError> {
    let mut failure = None;
    for report in reports {
        match &report.error {
            Some(message) => {
                error!(
                    kind = %report.kind,
                    passes = report.passes,
                    error = %message,
                    "ticker failed"
                );
                failure.get_or_insert_with(|| ServerError::WorkerFailed {
                    kind: report.kind,
                    message: message.clone(),
                });
            }
            None => info!(kind = %report.kind, passes = report.passes, "ticker stopped"),
        }
    }
    failure.map_or(Ok(()), Err)
}

/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

fn log_civilizations(universe: &Universe) {
    for civ in universe.civilizations().iter() {
        let home = civ
            .home()
            .and_then(|id| universe.system(id))
            .map_or("none", |s| s.name.as_str());
        info!(
            civilization = %civ.name,
            power = civ.power,
            home,
            owned = civ.owned_count(),
            "civilization"
        );
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::thread;

    use starbase_core::config::EconomyConfig;
    use starbase_types::{Position, StationId, SystemId};
    use starbase_world::{Anchor, Cargo, Inventory, Item, Station, System};

    use super::*;

    const DEPOT: StationId = StationId::new(3);

    fn depot_universe() -> Universe {
        let mut universe = Universe::default();
        let system = System::new(SystemId::new(1), "Kelmos".to_owned(), 0, Position::ORIGIN);
        assert!(universe.sectors_mut().insert(system).is_ok());
        let fuel = Item::new("Fuel", 1, 12);
        let station = Station::new(
            DEPOT,
            StationKind::Base,
            "Kelmos Depot".to_owned(),
            "Depot".to_owned(),
            Anchor::System(SystemId::new(1)),
            Inventory::from(vec![Cargo::new(&fuel, 1_000, 500).with_daily_change(-24)]),
        );
        assert!(universe.build_station(station).is_ok());
        universe
    }

    /// Panic while holding the depot's inventory write lock.
    fn poison_depot(universe: &Universe) {
        let station = universe.station(StationKind::Base, DEPOT).ok();
        assert!(station.is_some());
        let outcome = thread::spawn(move || {
            if let Some(station) = station.as_deref() {
                let _guard = station.write();
                panic!("depot inventory poisoned on purpose");
            }
        })
        .join();
        assert!(outcome.is_err());
    }

    fn slow_economy() -> EconomyConfig {
        EconomyConfig {
            day_length_ms: 86_400_000,
            ..EconomyConfig::default()
        }
    }

    #[tokio::test]
    async fn dead_worker_ends_the_wait_and_fails_the_server() {
        let universe = Arc::new(depot_universe());
        poison_depot(&universe);

        let mut scheduler = Scheduler::new(Arc::clone(&universe), &slow_economy());
        for kind in StationKind::ALL {
            assert!(scheduler.start(kind).is_ok());
        }
        let waited = tokio::time::timeout(
            Duration::from_secs(10),
            wait_for_shutdown(scheduler, Duration::from_millis(10)),
        )
        .await;
        assert!(waited.is_ok(), "wait did not notice the dead worker");

        let reports = waited.ok().and_then(Result::ok).unwrap_or_default();
        assert_eq!(reports.len(), 2);
        assert!(matches!(
            check_reports(&reports),
            Err(ServerError::WorkerFailed {
                kind: StationKind::Base,
                ..
            })
        ));
    }

    #[test]
    fn clean_reports_let_the_server_exit() {
        let reports: Vec<WorkerReport> = StationKind::ALL
            .into_iter()
            .map(|kind| WorkerReport {
                kind,
                passes: 12,
                error: None,
            })
            .collect();
        assert!(check_reports(&reports).is_ok());
    }

    #[test]
    fn any_failed_report_fails_the_server() {
        let reports = vec![
            WorkerReport {
                kind: StationKind::Port,
                passes: 40,
                error: None,
            },
            WorkerReport {
                kind: StationKind::Base,
                passes: 2,
                error: Some("station inventory lock poisoned".to_owned()),
            },
        ];
        let result = check_reports(&reports);
        assert!(matches!(
            result,
            Err(ServerError::WorkerFailed {
                kind: StationKind::Base,
                ref message,
            }) if message.contains("poisoned")
        ));
    }
}
