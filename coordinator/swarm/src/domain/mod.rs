// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Swarm Domain Layer
//!
//! Value types returned by the coordinator facade. No I/O dependencies.
//!
//! | Module | Key Types |
//! |--------|-----------|
//! | [`snapshot`] | `CleanupReport`, `CoordinatorSnapshot`, ledger entry views |

pub mod snapshot;

pub use snapshot::*;
