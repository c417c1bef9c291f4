// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Reports and read-only views produced by [`crate::SwarmCoordinator`].

use chrono::{DateTime, Utc};
use gridlock_core::{AgentId, AgentRecord, AreaBounds, Cell, ZoneKind};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Number of entries removed from each ledger by one sweep (or by an
/// unregister cascade).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    pub block_claims: usize,
    pub zones: usize,
    pub goals: usize,
}

impl CleanupReport {
    pub fn total(&self) -> usize {
        self.block_claims + self.zones + self.goals
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl AddAssign for CleanupReport {
    fn add_assign(&mut self, rhs: Self) {
        self.block_claims += rhs.block_claims;
        self.zones += rhs.zones;
        self.goals += rhs.goals;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockClaimView {
    pub cell: Cell,
    pub owner: AgentId,
    pub task: String,
    pub acquired_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneView {
    pub kind: ZoneKind,
    pub agent: AgentId,
    pub bounds: AreaBounds,
    pub acquired_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalView {
    pub agent: AgentId,
    pub target: Cell,
    pub task: String,
    pub acquired_at: DateTime<Utc>,
}

/// Point-in-time copy of every ledger, sorted for stable output.
///
/// Entries are copied as stored; expired leases that no sweep has removed
/// yet still appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorSnapshot {
    pub taken_at: DateTime<Utc>,
    pub agents: Vec<AgentRecord>,
    pub active_agents: usize,
    pub block_claims: Vec<BlockClaimView>,
    pub zones: Vec<ZoneView>,
    pub goals: Vec<GoalView>,
}

impl CoordinatorSnapshot {
    /// Ledger sizes in the same shape as a sweep report.
    pub fn sizes(&self) -> CleanupReport {
        CleanupReport {
            block_claims: self.block_claims.len(),
            zones: self.zones.len(),
            goals: self.goals.len(),
        }
    }
}
