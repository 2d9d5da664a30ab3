//! Integration tests for the background tick scheduler.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use starbase_core::config::{EconomyConfig, SimulationConfig, TickCategoryConfig};
use starbase_core::generation::generate;
use starbase_core::scheduler::{Scheduler, SchedulerError};
use starbase_types::{CargoView, Position, StationId, StationKind, SystemId};
use starbase_world::{Anchor, Cargo, Hold, Inventory, Item, Station, System, Universe};

fn slow_economy() -> EconomyConfig {
    // Ten minutes or more between passes.
    EconomyConfig {
        day_length_ms: 86_400_000,
        ..EconomyConfig::default()
    }
}

const SMELTER: StationId = StationId::new(5);

/// One base that smelts ore into alloy at 100 units per pass.
fn smelter_universe() -> Option<Arc<Universe>> {
    let mut universe = Universe::default();
    let system = System::new(SystemId::new(1), "Tarsis".to_owned(), 0, Position::ORIGIN);
    universe.sectors_mut().insert(system).ok()?;
    let ore = Item::new("Ore", 1, 4);
    let alloy = Item::new("Alloy", 1, 10);
    let mut inventory = Inventory::from(vec![
        Cargo::new(&ore, 100_000, 5_000),
        Cargo::new(&alloy, 100_000, 0).with_daily_change(2_400),
    ]);
    inventory.add_requirement(1, 0).ok()?;
    let station = Station::new(
        SMELTER,
        StationKind::Base,
        "Tarsis Smelter".to_owned(),
        "Smelter".to_owned(),
        Anchor::System(SystemId::new(1)),
        inventory,
    );
    universe.build_station(station).ok()?;
    Some(Arc::new(universe))
}

fn amount_of(view: &[CargoView], item: &str) -> Option<i64> {
    view.iter().find(|c| c.item == item).map(|c| c.amount)
}

#[test]
fn stop_before_start_is_harmless() {
    let mut scheduler = Scheduler::new(Arc::new(Universe::default()), &slow_economy());
    for kind in StationKind::ALL {
        assert!(scheduler.stop(kind).is_none());
        assert!(scheduler.stop(kind).is_none());
        assert!(!scheduler.is_running(kind));
    }
    assert!(scheduler.shutdown().is_empty());
}

#[test]
fn shutdown_is_prompt_while_workers_wait() {
    let mut scheduler = Scheduler::new(Arc::new(Universe::default()), &slow_economy());
    for kind in StationKind::ALL {
        assert!(scheduler.start(kind).is_ok());
    }
    thread::sleep(Duration::from_millis(30));

    let started = Instant::now();
    let reports = scheduler.shutdown();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(reports.len(), 2);
    for report in &reports {
        assert_eq!(report.passes, 1);
        assert!(report.error.is_none());
    }
    for kind in StationKind::ALL {
        assert!(!scheduler.is_running(kind));
    }
}

#[test]
fn restart_after_stop() {
    let mut scheduler = Scheduler::new(Arc::new(Universe::default()), &slow_economy());
    assert!(scheduler.start(StationKind::Port).is_ok());
    assert!(matches!(
        scheduler.start(StationKind::Port),
        Err(SchedulerError::AlreadyRunning(StationKind::Port))
    ));
    assert!(scheduler.stop(StationKind::Port).is_some());
    assert!(scheduler.start(StationKind::Port).is_ok());
    assert!(scheduler.is_running(StationKind::Port));
    assert!(!scheduler.is_running(StationKind::Base));
}

#[test]
fn dropping_the_scheduler_joins_its_workers() {
    let universe = Arc::new(Universe::default());
    {
        let mut scheduler = Scheduler::new(Arc::clone(&universe), &slow_economy());
        assert!(scheduler.start(StationKind::Base).is_ok());
        let started = Instant::now();
        drop(scheduler);
        assert!(started.elapsed() < Duration::from_secs(2));
    }
    // Worker threads released their handles.
    assert_eq!(Arc::strong_count(&universe), 1);
}

#[test]
fn generated_galaxy_ticks_in_the_background() {
    let yaml = r"
galaxy:
  constellations: 3
  max_systems_per_constellation: 6
economy:
  day_length_ms: 240
  ports:
    ticks_per_day: 24
  bases:
    ticks_per_day: 24
catalog:
  items:
    - { name: Water, price: 2 }
  bases:
    - name: Ice Mine
      cargo:
        - { item: Water, max: 100000, amount: 0, daily_change: 2400 }
";
    let Ok(config) = SimulationConfig::parse(yaml) else {
        return;
    };
    assert!(config.validate().is_ok());
    let catalog = config.catalog.resolve();
    let universe = generate(&config, &catalog);
    assert!(universe.is_ok());
    let Ok(universe) = universe else {
        return;
    };
    let universe = Arc::new(universe);

    let mut scheduler = Scheduler::new(Arc::clone(&universe), &config.economy);
    assert!(scheduler.start(StationKind::Base).is_ok());
    thread::sleep(Duration::from_millis(100));
    let report = scheduler.stop(StationKind::Base);
    let passes = report.map_or(0, |r| r.passes);
    assert!(passes >= 2);

    // Every base made 100 water per pass.
    let expected = i64::try_from(passes).unwrap_or_default().saturating_mul(100);
    let bases = universe.stations(StationKind::Base);
    assert!(bases.is_ok_and(|bases| {
        !bases.is_empty()
            && bases.iter().all(|base| {
                base.cargo_view()
                    .is_ok_and(|view| view.first().is_some_and(|c| c.amount == expected))
            })
    }));
}

#[test]
fn trades_interleave_with_ticks_without_losing_units() {
    let Some(universe) = smelter_universe() else {
        return;
    };
    let economy = EconomyConfig {
        day_length_ms: 240,
        bases: TickCategoryConfig { ticks_per_day: 24 },
        ..EconomyConfig::default()
    };
    let mut scheduler = Scheduler::new(Arc::clone(&universe), &economy);
    assert!(scheduler.start(StationKind::Base).is_ok());

    let mut hold = Hold::new("Ore Barge", 1_000_000, 1_000_000_000);
    let mut bought = 0_i64;
    for _ in 0..200 {
        let receipt = universe.buy_cargo(StationKind::Base, SMELTER, &mut hold, "Alloy", 3);
        assert!(receipt.is_ok());
        bought = bought.saturating_add(receipt.map_or(0, |r| r.quantity));

        let view = universe.cargo_view(StationKind::Base, SMELTER).unwrap_or_default();
        let ore = amount_of(&view, "Ore").unwrap_or_default();
        let alloy = amount_of(&view, "Alloy").unwrap_or_default();
        // Every alloy unit ever made came out of the ore stock.
        assert_eq!(5_000_i64.saturating_sub(ore), alloy.saturating_add(bought));
        thread::sleep(Duration::from_millis(1));
    }

    let report = scheduler.stop(StationKind::Base);
    assert!(report.as_ref().is_some_and(|r| r.error.is_none()));
    assert!(report.map_or(0, |r| r.passes) >= 2);
    assert!(bought > 0);
}
