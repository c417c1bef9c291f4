// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Goal Arbitrator
//!
//! Keeps agents from pathing to the same destination. Each agent registers
//! the cell it is heading for; before choosing a destination an agent asks
//! whether anyone else is already headed there and, if so, asks for a nearby
//! free cell instead.
//!
//! Arbitration is advisory. [`GoalArbitrator::find_alternative`] always
//! returns a cell; when every ring is contested it falls back to a random
//! offset of up to two cells, which may itself be contested.

use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

use crate::domain::{AgentId, Cell, Clock, LeaseTerm, PathGoal};
use crate::infrastructure::observability::{names, CoordinationSink};

/// Largest horizontal offset used when every searched ring is occupied.
const FALLBACK_SPREAD: i32 = 2;

pub struct GoalArbitrator {
    goals: RwLock<HashMap<AgentId, PathGoal>>,
    term: LeaseTerm,
    occupancy_radius: f64,
    rng: Mutex<StdRng>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn CoordinationSink>,
}

impl GoalArbitrator {
    pub fn new(
        duration: Duration,
        occupancy_radius: f64,
        rng: StdRng,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn CoordinationSink>,
    ) -> Self {
        Self {
            goals: RwLock::new(HashMap::new()),
            term: LeaseTerm::new(duration),
            occupancy_radius,
            rng: Mutex::new(rng),
            clock,
            sink,
        }
    }

    /// Record (or replace) the destination of `agent`.
    pub fn register(&self, agent: &AgentId, target: Cell, task: &str) {
        let goal = PathGoal {
            target,
            acquired_at: self.clock.now(),
            task: task.to_string(),
        };
        trace!(agent = %agent, target = %target, task = task, "Path goal registered");
        self.goals.write().insert(agent.clone(), goal);
    }

    pub fn clear(&self, agent: &AgentId) -> bool {
        self.goals.write().remove(agent).is_some()
    }

    /// Live goal of `agent`, if any.
    pub fn goal_of(&self, agent: &AgentId) -> Option<PathGoal> {
        let now = self.clock.now();
        self.goals
            .read()
            .get(agent)
            .filter(|goal| self.term.is_live(*goal, now))
            .cloned()
    }

    /// Whether any agent other than `exclude` has a live goal within
    /// `radius` (inclusive) of `target`.
    pub fn is_occupied(&self, target: Cell, exclude: Option<&AgentId>, radius: f64) -> bool {
        let targets = self.live_targets(exclude);
        is_near_any(&targets, &target, radius)
    }

    /// `desired` if it is free, otherwise the first free cell found on the
    /// square rings around it (randomized order within each ring), otherwise
    /// a random offset of up to two cells on both horizontal axes.
    pub fn find_alternative(&self, desired: Cell, exclude: Option<&AgentId>, search_radius: u32) -> Cell {
        let targets = self.live_targets(exclude);
        if !is_near_any(&targets, &desired, self.occupancy_radius) {
            return desired;
        }

        let mut rng = self.rng.lock();
        for radius in 1..=search_radius {
            let Ok(radius) = i32::try_from(radius) else {
                break;
            };
            let mut ring = square_ring(desired, radius);
            ring.shuffle(&mut *rng);
            if let Some(free) = ring
                .into_iter()
                .find(|cell| !is_near_any(&targets, cell, self.occupancy_radius))
            {
                trace!(desired = %desired, chosen = %free, ring = radius, "Alternative goal found");
                return free;
            }
        }

        let fallback = desired.offset(
            rng.random_range(-FALLBACK_SPREAD..=FALLBACK_SPREAD),
            0,
            rng.random_range(-FALLBACK_SPREAD..=FALLBACK_SPREAD),
        );
        drop(rng);
        debug!(
            desired = %desired,
            fallback = %fallback,
            search_radius,
            "Every ring occupied, falling back to random offset"
        );
        self.sink.counter(names::GOAL_FALLBACKS, 1);
        fallback
    }

    /// Remove the goal of `agent`; alias of [`GoalArbitrator::clear`] used on
    /// unregister.
    pub fn release_all_for(&self, agent: &AgentId) -> usize {
        usize::from(self.clear(agent))
    }

    /// Sweep expired goals. Returns how many were removed.
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now();
        let mut goals = self.goals.write();
        let before = goals.len();
        goals.retain(|_, goal| self.term.is_live(&*goal, now));
        before - goals.len()
    }

    pub fn len(&self) -> usize {
        self.goals.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.read().is_empty()
    }

    /// Copy of every entry, ordered by agent.
    pub fn snapshot(&self) -> Vec<(AgentId, PathGoal)> {
        let mut entries: Vec<(AgentId, PathGoal)> = self
            .goals
            .read()
            .iter()
            .map(|(agent, goal)| (agent.clone(), goal.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Targets of every live goal not owned by `exclude`. Expired goals are
    /// evicted on the way.
    fn live_targets(&self, exclude: Option<&AgentId>) -> Vec<Cell> {
        let now = self.clock.now();
        let mut goals = self.goals.write();
        goals.retain(|_, goal| self.term.is_live(&*goal, now));
        goals
            .iter()
            .filter(|(agent, _)| Some(*agent) != exclude)
            .map(|(_, goal)| goal.target)
            .collect()
    }
}

fn is_near_any(targets: &[Cell], cell: &Cell, radius: f64) -> bool {
    targets.iter().any(|target| target.distance(cell) <= radius)
}

/// Perimeter of the `(2r+1) x (2r+1)` square centred on `center` at the same
/// height. Holds `8r` cells for `r >= 1`.
pub fn square_ring(center: Cell, radius: i32) -> Vec<Cell> {
    if radius <= 0 {
        return vec![center];
    }
    let mut ring = Vec::with_capacity(8 * radius as usize);
    for dx in -radius..=radius {
        ring.push(center.offset(dx, 0, -radius));
        ring.push(center.offset(dx, 0, radius));
    }
    for dz in (-radius + 1)..radius {
        ring.push(center.offset(-radius, 0, dz));
        ring.push(center.offset(radius, 0, dz));
    }
    ring
}
