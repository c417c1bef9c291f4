// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # `gridlock-core`: Spatial Coordination Primitives
//!
//! Lease ledgers, area partitioning, goal arbitration and vein scanning for
//! autonomous agents that share one voxel grid.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | `Cell`, `AreaBounds`, leases, `partition`, config, errors |
//! | [`application`] | Application | `ClaimLedger`, `ZoneLedger`, `GoalArbitrator`, `AgentRegistry`, `VeinScanner` |
//! | [`infrastructure`] | Infrastructure | `CoordinationSink` implementations |
//!
//! ## Phase Notes
//!
//! All state is in memory. A restart begins with empty ledgers; agents
//! re-register and re-claim as they resume work.

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
