// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Swarm coordinator facade.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, info, warn};

use gridlock_core::application::{
    order_for_visiting, AgentRegistry, ClaimLedger, GoalArbitrator, VeinScanner, ZoneLedger,
};
use gridlock_core::infrastructure::{names, CoordinationSink, TracingSink};
use gridlock_core::{
    partition, AgentId, AgentPositionSource, AgentRecord, AreaBounds, AreaSpec, BlockClaim, Cell,
    CellAccessor, Clock, CoordinationError, CoordinatorConfig, LabelSet, PathGoal, ScanOptions,
    SystemClock, VeinComponent, ZoneKind,
};

use crate::domain::{BlockClaimView, CleanupReport, CoordinatorSnapshot, GoalView, ZoneView};

/// Shared coordination state for one world.
///
/// All methods take `&self`; wrap the coordinator in an `Arc` and hand a clone
/// to every agent and to the [`crate::MaintenanceLoop`].
pub struct SwarmCoordinator {
    config: CoordinatorConfig,
    registry: AgentRegistry,
    claims: ClaimLedger,
    zones: ZoneLedger,
    goals: GoalArbitrator,
    scanner: VeinScanner,
    /// Drives `claim_first_available`; the goal arbitrator owns its own stream.
    rng: Mutex<StdRng>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn CoordinationSink>,
}

impl SwarmCoordinator {
    /// Coordinator on the system clock, reporting through `tracing`/`metrics`.
    pub fn new(config: CoordinatorConfig) -> Self {
        Self::with_parts(config, Arc::new(SystemClock), Arc::new(TracingSink))
    }

    /// Coordinator with an explicit clock and sink.
    ///
    /// When `config.rng_seed` is set, both random streams are seeded from it
    /// and every randomized choice is reproducible.
    pub fn with_parts(
        config: CoordinatorConfig,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn CoordinationSink>,
    ) -> Self {
        let (goal_rng, claim_rng) = match config.rng_seed {
            Some(seed) => (
                StdRng::seed_from_u64(seed),
                StdRng::seed_from_u64(seed.wrapping_add(1)),
            ),
            None => (StdRng::from_os_rng(), StdRng::from_os_rng()),
        };

        Self {
            registry: AgentRegistry::new(config.agent_stale_after, clock.clone()),
            claims: ClaimLedger::new(config.block_claim_duration, clock.clone(), sink.clone()),
            zones: ZoneLedger::new(config.area_claim_duration, clock.clone(), sink.clone()),
            goals: GoalArbitrator::new(
                config.goal_claim_duration,
                config.goal_occupancy_radius,
                goal_rng,
                clock.clone(),
                sink.clone(),
            ),
            scanner: VeinScanner::new(config.scan.to_options(), sink.clone()),
            rng: Mutex::new(claim_rng),
            config,
            clock,
            sink,
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    // ========================================================================
    // Agents
    // ========================================================================

    /// Register `agent`. Re-registering keeps the original registration time
    /// and returns `false`.
    pub fn register_agent(&self, agent: &AgentId) -> bool {
        let added = self.registry.register(agent);
        if added {
            info!(agent = %agent, "Agent registered");
        }
        added
    }

    /// Remove `agent` and every claim, zone and goal it holds.
    pub fn unregister_agent(&self, agent: &AgentId) -> CleanupReport {
        let known = self.registry.unregister(agent).is_some();
        let released = CleanupReport {
            block_claims: self.claims.release_all_for(agent),
            zones: self.zones.release_all_for(agent),
            goals: self.goals.release_all_for(agent),
        };
        if known {
            info!(
                agent = %agent,
                block_claims = released.block_claims,
                zones = released.zones,
                goals = released.goals,
                "Agent unregistered"
            );
        } else {
            self.sink
                .warn(&format!("unregister of unknown agent {agent}"));
        }
        released
    }

    /// Mark `agent` as alive, optionally with a fresh position. Unknown agents
    /// are reported through the sink and yield `false`.
    pub fn refresh_agent(&self, agent: &AgentId, position: Option<Cell>) -> bool {
        match self.registry.refresh(agent, position) {
            Ok(()) => true,
            Err(err) => {
                self.sink.warn(&err.to_string());
                false
            }
        }
    }

    /// Refresh every agent `source` reports a position for. Agents it has no
    /// position for are left to go stale. Returns how many were refreshed.
    pub fn refresh_all(&self, source: &dyn AgentPositionSource) -> usize {
        self.registry.refresh_all(source)
    }

    pub fn agent(&self, agent: &AgentId) -> Option<AgentRecord> {
        self.registry.record(agent)
    }

    /// Agents refreshed within `agent_stale_after`, sorted by id.
    pub fn active_agents(&self) -> Vec<AgentRecord> {
        self.registry.active_agents()
    }

    /// Agents with a known position within `radius` of `cell`, nearest first.
    pub fn agents_near(
        &self,
        cell: &Cell,
        radius: f64,
        exclude: Option<&AgentId>,
    ) -> Vec<(AgentId, Cell)> {
        self.registry.agents_near(cell, radius, exclude)
    }

    // ========================================================================
    // Cells
    // ========================================================================

    /// Floor raw world coordinates to a cell; non-finite or out-of-range input
    /// is reported and yields `None`.
    pub fn resolve_cell(&self, x: f64, y: f64, z: f64) -> Option<Cell> {
        let cell = Cell::from_coords(x, y, z);
        if cell.is_none() {
            self.sink.warn(
                &CoordinationError::InvalidCoordinate(format!("{x},{y},{z}")).to_string(),
            );
        }
        cell
    }

    pub fn claim_cell(&self, agent: &AgentId, cell: Cell, task: &str) -> bool {
        self.claims.claim(agent, cell, task)
    }

    /// [`Self::claim_cell`] from raw coordinates; invalid input yields `false`.
    pub fn claim_cell_at(&self, agent: &AgentId, x: f64, y: f64, z: f64, task: &str) -> bool {
        self.resolve_cell(x, y, z)
            .is_some_and(|cell| self.claims.claim(agent, cell, task))
    }

    /// Drop the claim on `cell` regardless of who holds it.
    pub fn release_cell(&self, cell: &Cell) -> bool {
        self.claims.release(cell)
    }

    /// Drop the claim on `cell` only if `agent` holds it.
    pub fn release_cell_owned(&self, agent: &AgentId, cell: &Cell) -> Result<(), CoordinationError> {
        self.claims.release_owned(agent, cell)
    }

    pub fn is_cell_claimed(&self, cell: &Cell, exclude: Option<&AgentId>) -> bool {
        self.claims.is_claimed(cell, exclude)
    }

    pub fn cell_holder(&self, cell: &Cell) -> Option<BlockClaim> {
        self.claims.holder(cell)
    }

    /// Claim the first free cell among `candidates`, tried in random order.
    pub fn claim_first_available(
        &self,
        agent: &AgentId,
        candidates: &[Cell],
        task: &str,
    ) -> Option<Cell> {
        let mut rng = self.rng.lock();
        self.claims
            .claim_first_available(agent, candidates, task, &mut *rng)
    }

    // ========================================================================
    // Zones
    // ========================================================================

    /// Split the box described by `spec` into `worker_count` slices. A missing
    /// corner is reported and yields an empty list.
    pub fn partition_area(&self, spec: &AreaSpec, worker_count: usize) -> Vec<AreaBounds> {
        match AreaBounds::try_from(*spec) {
            Ok(bounds) => {
                let slices = partition(&bounds, worker_count);
                debug!(bounds = %bounds, workers = worker_count, slices = slices.len(), "Area partitioned");
                slices
            }
            Err(err) => {
                self.sink.warn(&format!("cannot partition area: {err}"));
                Vec::new()
            }
        }
    }

    /// Lease `bounds` to `agent` for `kind`, replacing the agent's previous
    /// zone of that kind. Other agents' zones are not consulted.
    pub fn assign_zone(&self, kind: &ZoneKind, agent: &AgentId, bounds: AreaBounds) {
        self.zones.assign(kind, agent, bounds);
    }

    /// [`Self::assign_zone`] that is denied while a different agent holds a
    /// live, intersecting zone of the same kind.
    pub fn assign_zone_exclusive(
        &self,
        kind: &ZoneKind,
        agent: &AgentId,
        bounds: AreaBounds,
    ) -> bool {
        self.zones.assign_exclusive(kind, agent, bounds)
    }

    pub fn get_zone(&self, kind: &ZoneKind, agent: &AgentId) -> Option<AreaBounds> {
        self.zones.get(kind, agent)
    }

    pub fn release_zone(&self, kind: &ZoneKind, agent: &AgentId) -> bool {
        self.zones.release(kind, agent)
    }

    /// Agent holding a live zone of `kind` that contains `cell`.
    pub fn zone_holder_at(&self, kind: &ZoneKind, cell: &Cell) -> Option<AgentId> {
        self.zones.holder_at(kind, cell)
    }

    // ========================================================================
    // Goals
    // ========================================================================

    pub fn register_goal(&self, agent: &AgentId, target: Cell, task: &str) {
        self.goals.register(agent, target, task);
    }

    pub fn clear_goal(&self, agent: &AgentId) -> bool {
        self.goals.clear(agent)
    }

    pub fn goal_of(&self, agent: &AgentId) -> Option<PathGoal> {
        self.goals.goal_of(agent)
    }

    /// Whether a live goal of another agent lies within `radius` of `target`.
    pub fn is_goal_occupied(&self, target: Cell, exclude: Option<&AgentId>, radius: f64) -> bool {
        self.goals.is_occupied(target, exclude, radius)
    }

    /// `desired` if it is free, otherwise a free cell on the nearest ring
    /// within `search_radius` (or a random nearby fallback). `None` uses the
    /// configured `goal_search_radius`.
    pub fn find_alternative_goal(
        &self,
        desired: Cell,
        exclude: Option<&AgentId>,
        search_radius: Option<u32>,
    ) -> Cell {
        let search_radius = search_radius.unwrap_or(self.config.goal_search_radius);
        self.goals.find_alternative(desired, exclude, search_radius)
    }

    // ========================================================================
    // Veins
    // ========================================================================

    /// Flood-fill the vein at `seed`. `options` falls back to the configured
    /// scan defaults.
    pub fn scan_component<A>(
        &self,
        seed: Cell,
        accessor: &A,
        match_set: &LabelSet,
        options: Option<&ScanOptions>,
    ) -> VeinComponent
    where
        A: CellAccessor + ?Sized,
    {
        match options {
            Some(options) => self.scanner.scan_with(seed, accessor, match_set, options),
            None => self.scanner.scan(seed, accessor, match_set),
        }
    }

    /// Greedy nearest-neighbour tour over `members` starting at `start`.
    pub fn order_for_visiting(&self, members: &[Cell], start: Cell) -> Vec<Cell> {
        order_for_visiting(members, start)
    }

    /// Tour starting at the last known position of `agent`. Without a
    /// position the members are returned in their given order.
    pub fn order_for_agent(&self, agent: &AgentId, members: &[Cell]) -> Vec<Cell> {
        match self.registry.position_of(agent) {
            Some(start) => order_for_visiting(members, start),
            None => {
                debug!(agent = %agent, "No known position, keeping member order");
                members.to_vec()
            }
        }
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Sweep expired entries from every ledger.
    pub fn cleanup(&self) -> CleanupReport {
        let report = CleanupReport {
            block_claims: self.claims.cleanup(),
            zones: self.zones.cleanup(),
            goals: self.goals.cleanup(),
        };
        self.sink
            .counter(names::CLEANUP_BLOCKS, report.block_claims as u64);
        self.sink.counter(names::CLEANUP_ZONES, report.zones as u64);
        self.sink.counter(names::CLEANUP_GOALS, report.goals as u64);
        if !report.is_empty() {
            self.sink.debug(&format!(
                "cleanup removed {} block claims, {} zones, {} goals",
                report.block_claims, report.zones, report.goals
            ));
        }
        report
    }

    /// Read-only copy of every ledger.
    pub fn diagnostics(&self) -> CoordinatorSnapshot {
        let mut block_claims: Vec<BlockClaimView> = self
            .claims
            .snapshot()
            .into_iter()
            .map(|(cell, claim)| BlockClaimView {
                cell,
                owner: claim.owner,
                task: claim.task,
                acquired_at: claim.acquired_at,
            })
            .collect();
        block_claims.sort_by_key(|view| view.cell);

        let mut zones: Vec<ZoneView> = self
            .zones
            .snapshot()
            .into_iter()
            .map(|(kind, agent, zone)| ZoneView {
                kind,
                agent,
                bounds: zone.bounds,
                acquired_at: zone.acquired_at,
            })
            .collect();
        zones.sort_by(|a, b| (&a.kind, &a.agent).cmp(&(&b.kind, &b.agent)));

        let mut goals: Vec<GoalView> = self
            .goals
            .snapshot()
            .into_iter()
            .map(|(agent, goal)| GoalView {
                agent,
                target: goal.target,
                task: goal.task,
                acquired_at: goal.acquired_at,
            })
            .collect();
        goals.sort_by(|a, b| a.agent.cmp(&b.agent));

        let mut agents = self.registry.snapshot();
        agents.sort_by(|a, b| a.id.cmp(&b.id));

        if agents.is_empty() && !block_claims.is_empty() {
            warn!(claims = block_claims.len(), "Claims held with no registered agents");
        }

        CoordinatorSnapshot {
            taken_at: self.clock.now(),
            active_agents: self.registry.active_agents().len(),
            agents,
            block_claims,
            zones,
            goals,
        }
    }
}
