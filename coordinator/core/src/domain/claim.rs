// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Ledger entries: block claims, zone claims and pathfinding goals.
//!
//! Each entry names its owner only by [`AgentId`]. Ownership of the entry
//! itself sits with the ledger that stores it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::agent::AgentId;
use crate::domain::cell::{AreaBounds, Cell};
use crate::domain::lease::Leased;

/// Exclusive lease on one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockClaim {
    pub owner: AgentId,
    pub acquired_at: DateTime<Utc>,
    /// Free-form label of the work the claim protects (e.g. `"mining"`).
    pub task: String,
}

impl Leased for BlockClaim {
    fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }
}

/// Category of work region (e.g. `"quarry"`, `"farm"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneKind(String);

impl ZoneKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZoneKind {
    fn from(kind: &str) -> Self {
        Self(kind.to_string())
    }
}

/// Lease on a rectangular work region, keyed by `(kind, agent)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneClaim {
    pub acquired_at: DateTime<Utc>,
    pub bounds: AreaBounds,
}

impl Leased for ZoneClaim {
    fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }
}

/// Destination an agent is currently pathing toward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathGoal {
    pub target: Cell,
    pub acquired_at: DateTime<Utc>,
    pub task: String,
}

impl Leased for PathGoal {
    fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }
}
