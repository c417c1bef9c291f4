// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Swarm Application Layer
//!
//! [`SwarmCoordinator`] is the single entry point agents talk to. It owns one
//! instance of each core service and wires them to a shared clock and sink:
//!
//! | Field | Service | Lease |
//! |-------|---------|-------|
//! | `registry` | `AgentRegistry` | `agent_stale_after` |
//! | `claims` | `ClaimLedger` | `block_claim_duration` |
//! | `zones` | `ZoneLedger` | `area_claim_duration` |
//! | `goals` | `GoalArbitrator` | `goal_claim_duration` |
//! | `scanner` | `VeinScanner` | none |

pub mod coordinator;

pub use coordinator::SwarmCoordinator;
