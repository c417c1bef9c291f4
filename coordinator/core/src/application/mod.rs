// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Coordination Application Layer
//!
//! Stateful services built on the domain types. Each is safe to share
//! between threads; the swarm facade composes them.
//!
//! | Module | Service | Lock |
//! |--------|---------|------|
//! | [`claim_ledger`] | `ClaimLedger` | one mutex over the whole table |
//! | [`zone_ledger`] | `ZoneLedger` | `RwLock` |
//! | [`goal_arbitrator`] | `GoalArbitrator` | `RwLock` + mutex-guarded RNG |
//! | [`agent_registry`] | `AgentRegistry` | `DashMap` |
//! | [`scanner`] | `VeinScanner` | stateless |

pub mod agent_registry;
pub mod claim_ledger;
pub mod goal_arbitrator;
pub mod scanner;
pub mod zone_ledger;

pub use agent_registry::AgentRegistry;
pub use claim_ledger::ClaimLedger;
pub use goal_arbitrator::{square_ring, GoalArbitrator};
pub use scanner::{order_for_visiting, VeinScanner};
pub use zone_ledger::ZoneLedger;
