// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Runtime adapters.
//!
//! - [`maintenance`]: tokio task that refreshes agents and sweeps leases.

pub mod maintenance;
