// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # `gridlock-swarm`: Shared Coordinator for Agent Swarms
//!
//! One [`SwarmCoordinator`] is shared (behind an `Arc`) by every agent working
//! the same world. Agents register, claim cells and zones, announce path
//! goals and scan veins through it; the coordinator never calls back into
//! agent code.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | `CleanupReport`, `CoordinatorSnapshot` |
//! | [`application`] | Application | `SwarmCoordinator` facade |
//! | [`infrastructure`] | Infrastructure | `MaintenanceLoop` (tokio) |
//!
//! ## Key Concepts
//!
//! - **Lease**: every claim, zone and goal expires on its own; nothing has to
//!   be released for the swarm to make progress after an agent dies.
//! - **Maintenance**: a single background task refreshes agent positions and
//!   sweeps expired leases; shutting it down is one cancel.

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use application::SwarmCoordinator;
pub use domain::*;
pub use infrastructure::maintenance::MaintenanceLoop;
