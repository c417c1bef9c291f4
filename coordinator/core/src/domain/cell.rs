// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Grid Geometry
//!
//! - [`Cell`]: one addressable voxel, the key of every ledger.
//! - [`AreaBounds`]: normalized axis-aligned box of cells.
//! - [`AreaSpec`]: loosely-typed box as supplied by callers and config files;
//!   either corner may be missing.
//!
//! Any fractional coordinate maps to the cell containing it by component-wise
//! floor, so `(10.2, 64.9, 10.7)` and `(10.0, 64.0, 10.0)` address the same cell.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::CoordinationError;

/// A single unit of the 3D grid addressed by integer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Quantize a world-space coordinate to the cell containing it.
    ///
    /// Returns `None` for non-finite input or coordinates outside the `i32`
    /// range.
    pub fn from_coords(x: f64, y: f64, z: f64) -> Option<Self> {
        Some(Self {
            x: floor_component(x)?,
            y: floor_component(y)?,
            z: floor_component(z)?,
        })
    }

    /// Pack the cell into one `i64` (26 bits x, 26 bits z, 12 bits y).
    ///
    /// Injective only for `|x|, |z| < 2^25` and `|y| < 2^11`, which covers any
    /// loaded world. Outside that range distinct cells may collide.
    pub fn packed_key(&self) -> i64 {
        ((self.x as i64 & 0x3FF_FFFF) << 38)
            | ((self.z as i64 & 0x3FF_FFFF) << 12)
            | (self.y as i64 & 0xFFF)
    }

    /// Inverse of [`Cell::packed_key`].
    pub fn from_packed_key(key: i64) -> Self {
        Self {
            x: (key >> 38) as i32,
            y: ((key << 52) >> 52) as i32,
            z: ((key << 26) >> 38) as i32,
        }
    }

    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            z: self.z.saturating_add(dz),
        }
    }

    pub fn distance_squared(&self, other: &Cell) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        let dz = self.z as i64 - other.z as i64;
        dx * dx + dy * dy + dz * dz
    }

    /// Straight-line distance between cell corners.
    pub fn distance(&self, other: &Cell) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }

    /// The six face-adjacent cells (no diagonals).
    pub fn neighbors(&self) -> [Cell; 6] {
        [
            self.offset(1, 0, 0),
            self.offset(-1, 0, 0),
            self.offset(0, 1, 0),
            self.offset(0, -1, 0),
            self.offset(0, 0, 1),
            self.offset(0, 0, -1),
        ]
    }
}

fn floor_component(value: f64) -> Option<i32> {
    if !value.is_finite() {
        return None;
    }
    let floored = value.floor();
    if floored < i32::MIN as f64 || floored > i32::MAX as f64 {
        return None;
    }
    Some(floored as i32)
}

impl From<(i32, i32, i32)> for Cell {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

impl FromStr for Cell {
    type Err = CoordinationError;

    /// Parse `"x,y,z"`. Fractional components are floored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoordinationError::InvalidCoordinate(s.to_string());
        let parts: Vec<&str> = s.trim().split(',').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }
        let mut values = [0f64; 3];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.trim().parse::<f64>().map_err(|_| invalid())?;
        }
        Cell::from_coords(values[0], values[1], values[2]).ok_or_else(invalid)
    }
}

/// Axis-aligned box of cells, inclusive on both corners.
///
/// # Invariants
///
/// - `start <= end` componentwise; [`AreaBounds::new`] normalizes any pair of
///   corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AreaSpec", into = "AreaSpec")]
pub struct AreaBounds {
    start: Cell,
    end: Cell,
}

impl AreaBounds {
    pub fn new(a: Cell, b: Cell) -> Self {
        Self {
            start: Cell::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            end: Cell::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn end(&self) -> Cell {
        self.end
    }

    /// Extent along X.
    pub fn width(&self) -> u64 {
        span(self.start.x, self.end.x)
    }

    /// Extent along Y.
    pub fn height(&self) -> u64 {
        span(self.start.y, self.end.y)
    }

    /// Extent along Z.
    pub fn depth(&self) -> u64 {
        span(self.start.z, self.end.z)
    }

    pub fn volume(&self) -> u64 {
        self.width()
            .saturating_mul(self.height())
            .saturating_mul(self.depth())
    }

    pub fn contains(&self, cell: &Cell) -> bool {
        (self.start.x..=self.end.x).contains(&cell.x)
            && (self.start.y..=self.end.y).contains(&cell.y)
            && (self.start.z..=self.end.z).contains(&cell.z)
    }

    pub fn intersects(&self, other: &AreaBounds) -> bool {
        self.start.x <= other.end.x
            && other.start.x <= self.end.x
            && self.start.y <= other.end.y
            && other.start.y <= self.end.y
            && self.start.z <= other.end.z
            && other.start.z <= self.end.z
    }

    /// Every cell in the box, X fastest then Z then Y.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (self.start.y..=self.end.y).flat_map(move |y| {
            (self.start.z..=self.end.z).flat_map(move |z| {
                (self.start.x..=self.end.x).map(move |x| Cell::new(x, y, z))
            })
        })
    }
}

fn span(lo: i32, hi: i32) -> u64 {
    (hi as i64 - lo as i64 + 1) as u64
}

impl fmt::Display for AreaBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", self.start, self.end)
    }
}

/// Area as supplied by callers. Either corner may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Cell>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Cell>,
}

impl AreaSpec {
    pub fn new(start: Cell, end: Cell) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }
}

impl TryFrom<AreaSpec> for AreaBounds {
    type Error = CoordinationError;

    fn try_from(spec: AreaSpec) -> Result<Self, Self::Error> {
        let start = spec.start.ok_or(CoordinationError::MissingCorner("start"))?;
        let end = spec.end.ok_or(CoordinationError::MissingCorner("end"))?;
        Ok(AreaBounds::new(start, end))
    }
}

impl From<AreaBounds> for AreaSpec {
    fn from(bounds: AreaBounds) -> Self {
        AreaSpec::new(bounds.start, bounds.end)
    }
}
