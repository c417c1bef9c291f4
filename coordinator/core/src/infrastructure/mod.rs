// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Infrastructure adapters.
//!
//! - [`observability`]: `CoordinationSink` with no-op, tracing/metrics and
//!   recording implementations.

pub mod observability;

pub use observability::*;
