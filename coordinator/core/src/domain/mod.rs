// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Coordination Domain Layer
//!
//! Pure domain types for spatial coordination. No I/O dependencies apart from
//! configuration loading.
//!
//! | Module | Key Types |
//! |--------|-----------|
//! | [`cell`] | `Cell`, `AreaBounds`, `AreaSpec` |
//! | [`agent`] | `AgentId`, `AgentRecord`, `AgentPositionSource` |
//! | [`lease`] | `Clock`, `SystemClock`, `ManualClock`, `LeaseTerm` |
//! | [`claim`] | `BlockClaim`, `ZoneKind`, `ZoneClaim`, `PathGoal` |
//! | [`partition`] | `partition` |
//! | [`vein`] | `CellAccessor`, `CellSample`, `LabelSet`, `ScanOptions`, `VeinComponent` |
//! | [`config`] | `CoordinatorConfig`, `ScanConfig` |
//! | [`error`] | `CoordinationError`, `CellReadError` |

pub mod agent;
pub mod cell;
pub mod claim;
pub mod config;
pub mod error;
pub mod lease;
pub mod partition;
pub mod vein;

pub use agent::*;
pub use cell::*;
pub use claim::*;
pub use config::*;
pub use error::*;
pub use lease::*;
pub use partition::*;
pub use vein::*;
