// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use gridlock_core::infrastructure::{names, RecordingSink};
use gridlock_core::{
    AgentId, AreaBounds, AreaSpec, Cell, CellReadError, CellSample, CoordinationError,
    CoordinatorConfig, LabelSet, ManualClock, ScanOptions, ScanStatus, ZoneKind,
};
use gridlock_swarm::{CleanupReport, CoordinatorSnapshot, MaintenanceLoop, SwarmCoordinator};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn seeded_coordinator() -> (Arc<SwarmCoordinator>, ManualClock, Arc<RecordingSink>) {
    let clock = ManualClock::default();
    let sink = Arc::new(RecordingSink::new());
    let config = CoordinatorConfig {
        rng_seed: Some(42),
        ..CoordinatorConfig::default()
    };
    let coordinator = SwarmCoordinator::with_parts(config, Arc::new(clock.clone()), sink.clone());
    (Arc::new(coordinator), clock, sink)
}

/// Small world: an L-shaped iron vein in stone, air above y = 20.
struct TestWorld {
    cells: HashMap<Cell, CellSample>,
}

impl TestWorld {
    fn new() -> Self {
        let mut cells = HashMap::new();
        for x in 0..4 {
            cells.insert(Cell::new(x, 10, 0), CellSample::new("iron_ore", true));
        }
        cells.insert(Cell::new(3, 11, 0), CellSample::new("iron_ore", true));
        Self { cells }
    }

    fn sample(&self, cell: Cell) -> Result<CellSample, CellReadError> {
        if cell.x.abs() > 100 {
            return Err(CellReadError::Unloaded(cell));
        }
        Ok(self.cells.get(&cell).cloned().unwrap_or_else(|| {
            if cell.y > 20 {
                CellSample::new("air", false)
            } else {
                CellSample::new("stone", true)
            }
        }))
    }
}

#[test]
fn test_two_miners_split_a_quarry() {
    init_tracing();
    let (coordinator, _, _) = seeded_coordinator();
    let quarry = ZoneKind::from("quarry");
    let miners = [AgentId::from("miner-1"), AgentId::from("miner-2")];
    for miner in &miners {
        assert!(coordinator.register_agent(miner));
    }

    let area = AreaSpec::new(Cell::new(0, 60, 0), Cell::new(15, 63, 7));
    let slices = coordinator.partition_area(&area, miners.len());
    assert_eq!(slices.len(), 2);

    for (miner, slice) in miners.iter().zip(&slices) {
        assert!(coordinator.assign_zone_exclusive(&quarry, miner, *slice));
    }
    assert_eq!(coordinator.get_zone(&quarry, &miners[0]), Some(slices[0]));
    assert_eq!(
        coordinator.zone_holder_at(&quarry, &slices[1].start()),
        Some(miners[1].clone())
    );

    // The second miner cannot grab the first miner's half.
    assert!(!coordinator.assign_zone_exclusive(&quarry, &miners[1], slices[0]));
    assert!(coordinator.release_zone(&quarry, &miners[0]));
    assert!(coordinator.assign_zone_exclusive(&quarry, &miners[1], slices[0]));
}

#[test]
fn test_plain_zone_assignment_does_not_consult_other_agents() {
    let (coordinator, _, _) = seeded_coordinator();
    let quarry = ZoneKind::from("quarry");
    let (a, b) = (AgentId::from("A"), AgentId::from("B"));
    let bounds = AreaBounds::new(Cell::new(0, 0, 0), Cell::new(9, 0, 9));

    coordinator.assign_zone(&quarry, &a, bounds);
    coordinator.assign_zone(&quarry, &b, bounds);

    assert_eq!(coordinator.get_zone(&quarry, &a), Some(bounds));
    assert_eq!(coordinator.get_zone(&quarry, &b), Some(bounds));
}

#[test]
fn test_shared_coordinator_across_threads() {
    let (coordinator, _, sink) = seeded_coordinator();
    let candidates: Vec<Cell> = (0..6).map(|x| Cell::new(x, 64, 0)).collect();

    let claimed: Vec<Option<Cell>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..10)
            .map(|i| {
                let coordinator = coordinator.clone();
                let candidates = &candidates;
                scope.spawn(move || {
                    let agent = AgentId::new(format!("agent-{i}"));
                    coordinator.register_agent(&agent);
                    coordinator.claim_first_available(&agent, candidates, "mining")
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let winners: Vec<Cell> = claimed.iter().flatten().copied().collect();
    assert_eq!(winners.len(), candidates.len());
    let mut unique = winners.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), winners.len());
    assert_eq!(claimed.iter().filter(|c| c.is_none()).count(), 4);
    assert_eq!(sink.counter_total(names::CLAIMS_GRANTED), 6);
}

#[test]
fn test_owned_release_rejects_other_agents() {
    let (coordinator, _, _) = seeded_coordinator();
    let a = AgentId::from("A");
    let b = AgentId::from("B");
    let cell = Cell::new(10, 64, 10);

    assert!(coordinator.claim_cell(&a, cell, "mining"));
    assert!(matches!(
        coordinator.release_cell_owned(&b, &cell),
        Err(CoordinationError::NotOwner { .. })
    ));
    assert!(coordinator.release_cell_owned(&a, &cell).is_ok());
    assert_eq!(
        coordinator.release_cell_owned(&a, &cell),
        Err(CoordinationError::ClaimNotFound(cell))
    );
}

#[test]
fn test_vein_scan_and_tour() {
    let (coordinator, _, _) = seeded_coordinator();
    let world = TestWorld::new();
    let miner = AgentId::from("miner-1");
    coordinator.register_agent(&miner);
    coordinator.refresh_agent(&miner, Some(Cell::new(5, 10, 0)));

    let accessor = |cell: Cell| world.sample(cell);
    let vein = coordinator.scan_component(
        Cell::new(0, 10, 0),
        &accessor,
        &LabelSet::new(["iron_ore"]),
        None,
    );
    assert_eq!(vein.count, 5);
    assert_eq!(vein.status, ScanStatus::Exhausted);
    assert!(vein.frontier.iter().all(|cell| !vein.contains(cell)));

    let tour = coordinator.order_for_agent(&miner, &vein.cells());
    assert_eq!(tour.len(), 5);
    assert_eq!(tour[0], Cell::new(3, 10, 0));

    let capped = ScanOptions {
        max_cells: 2,
        ..ScanOptions::default()
    };
    let partial = coordinator.scan_component(
        Cell::new(0, 10, 0),
        &accessor,
        &LabelSet::new(["iron_ore"]),
        Some(&capped),
    );
    assert_eq!(partial.count, 2);
    assert_eq!(partial.status, ScanStatus::CellLimit);
}

#[test]
fn test_stale_agents_leave_active_set() {
    let (coordinator, clock, _) = seeded_coordinator();
    let a = AgentId::from("A");
    let b = AgentId::from("B");
    coordinator.register_agent(&a);
    coordinator.register_agent(&b);
    coordinator.refresh_agent(&a, Some(Cell::new(0, 64, 0)));
    coordinator.refresh_agent(&b, Some(Cell::new(3, 64, 4)));

    clock.advance(Duration::from_secs(4));
    coordinator.refresh_agent(&b, None);
    clock.advance(Duration::from_secs(2));

    let active: Vec<AgentId> = coordinator.active_agents().into_iter().map(|r| r.id).collect();
    assert_eq!(active, vec![b.clone()]);

    let near = coordinator.agents_near(&Cell::new(0, 64, 0), 5.0, Some(&a));
    assert_eq!(near, vec![(b, Cell::new(3, 64, 4))]);
}

#[test]
fn test_diagnostics_serialize_to_json() {
    let (coordinator, _, _) = seeded_coordinator();
    let a = AgentId::from("A");
    coordinator.register_agent(&a);
    coordinator.claim_cell(&a, Cell::new(2, 64, 2), "mining");
    coordinator.claim_cell(&a, Cell::new(1, 64, 2), "mining");
    coordinator.assign_zone(
        &ZoneKind::from("farm"),
        &a,
        AreaBounds::new(Cell::new(0, 64, 0), Cell::new(8, 64, 8)),
    );
    coordinator.register_goal(&a, Cell::new(30, 64, 30), "walk");

    let snapshot = coordinator.diagnostics();
    assert_eq!(
        snapshot.sizes(),
        CleanupReport {
            block_claims: 2,
            zones: 1,
            goals: 1
        }
    );
    assert_eq!(snapshot.block_claims[0].cell, Cell::new(1, 64, 2));
    assert_eq!(snapshot.active_agents, 1);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["block_claims"][0]["owner"], "A");
    assert_eq!(json["zones"][0]["kind"], "farm");
    assert_eq!(json["goals"][0]["task"], "walk");

    let restored: CoordinatorSnapshot = serde_json::from_value(json).unwrap();
    assert_eq!(restored, snapshot);
}

#[test]
fn test_cleanup_after_every_lease_expires() {
    let (coordinator, clock, sink) = seeded_coordinator();
    let a = AgentId::from("A");
    coordinator.claim_cell(&a, Cell::new(0, 0, 0), "mining");
    coordinator.assign_zone(
        &ZoneKind::from("quarry"),
        &a,
        AreaBounds::new(Cell::new(0, 0, 0), Cell::new(1, 1, 1)),
    );
    coordinator.register_goal(&a, Cell::new(9, 0, 9), "walk");

    clock.advance(Duration::from_secs(16));
    assert_eq!(coordinator.cleanup().goals, 1);

    clock.advance(Duration::from_secs(15));
    assert_eq!(coordinator.cleanup().block_claims, 1);

    clock.advance(Duration::from_secs(300));
    let last = coordinator.cleanup();
    assert_eq!(last.zones, 1);
    assert_eq!(last.total(), 1);
    assert!(coordinator.cleanup().is_empty());
    assert_eq!(sink.counter_total(names::CLEANUP_ZONES), 1);
}

#[tokio::test]
async fn test_maintenance_loop_keeps_agents_active() {
    init_tracing();
    let config = CoordinatorConfig {
        refresh_interval: Duration::from_millis(10),
        cleanup_interval: Duration::from_millis(10),
        agent_stale_after: Duration::from_millis(200),
        rng_seed: Some(3),
        ..CoordinatorConfig::default()
    };
    let coordinator = Arc::new(SwarmCoordinator::new(config));
    let agent = AgentId::from("farmer-1");
    coordinator.register_agent(&agent);

    let maintenance = Arc::new(MaintenanceLoop::new(
        coordinator.clone(),
        Arc::new(|_: &AgentId| Some(Cell::new(0, 64, 0))),
    ));
    let token = maintenance.shutdown_token();
    let handle = maintenance.start();

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(coordinator.active_agents().len(), 1);

    token.cancel();
    handle.await.unwrap();
}
