// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Coordination errors.
//!
//! Contention (a claim held by someone else) is an expected outcome and is
//! reported as `false`, not through these types. Errors here describe invalid
//! input, ownership violations on the checked release path, and faults
//! raised by the world accessor.

use thiserror::Error;

use crate::domain::agent::AgentId;
use crate::domain::cell::Cell;

/// Errors that can occur during spatial coordination.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordinationError {
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Area bounds missing {0} corner")]
    MissingCorner(&'static str),

    #[error("No live claim on cell {0}")]
    ClaimNotFound(Cell),

    #[error("Agent {agent} does not hold cell {cell} (held by {holder})")]
    NotOwner {
        agent: AgentId,
        cell: Cell,
        holder: AgentId,
    },

    #[error("Unknown agent {0}")]
    UnknownAgent(AgentId),
}

/// Failure reported by a [`CellAccessor`](crate::domain::vein::CellAccessor).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CellReadError {
    #[error("Cell {0} is not loaded")]
    Unloaded(Cell),

    #[error("World backend error: {0}")]
    Backend(String),
}
