// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Vein Scanning Types
//!
//! The scanner never touches the world directly. Callers hand it a
//! [`CellAccessor`] and a [`LabelSet`] of labels worth extracting; the result
//! is a [`VeinComponent`] built fresh for each call.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::cell::Cell;
use crate::domain::error::CellReadError;

/// What the world layer reports for one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSample {
    /// Block label, e.g. `"iron_ore"`.
    pub label: String,
    pub solid: bool,
}

impl CellSample {
    pub fn new(label: impl Into<String>, solid: bool) -> Self {
        Self {
            label: label.into(),
            solid,
        }
    }
}

/// Read access to the world grid.
pub trait CellAccessor {
    fn cell_at(&self, cell: Cell) -> Result<CellSample, CellReadError>;
}

impl<F> CellAccessor for F
where
    F: Fn(Cell) -> Result<CellSample, CellReadError>,
{
    fn cell_at(&self, cell: Cell) -> Result<CellSample, CellReadError> {
        self(cell)
    }
}

/// Set of block labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeSet<String>);

impl LabelSet {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(labels.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(label)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Bounds and output shaping for one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Stop once this many members have been collected.
    pub max_cells: usize,
    /// Cells farther than this (Euclidean, from the seed) are never read.
    pub max_radius: f64,
    /// Sort members by ascending distance from the seed.
    pub sort_by_distance: bool,
    /// Labels treated as open space; never reported as frontier.
    pub empty_labels: LabelSet,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_cells: 64,
            max_radius: 16.0,
            sort_by_distance: true,
            empty_labels: LabelSet::new(["air", "cave_air", "void_air"]),
        }
    }
}

/// Why a scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// The seed was unreadable or not in the match set.
    NoMatch,
    /// The flood fill ran out of connected cells.
    Exhausted,
    /// `max_cells` members were collected; more may exist.
    CellLimit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VeinMember {
    pub cell: Cell,
    /// Straight-line distance from the seed.
    pub distance: f64,
}

/// Connected cells sharing the seed's label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VeinComponent {
    /// Label of the seed cell; `None` for an empty component.
    pub ore_type: Option<String>,
    pub members: Vec<VeinMember>,
    /// Solid, non-matching cells touching at least one member.
    pub frontier: BTreeSet<Cell>,
    pub count: usize,
    pub status: ScanStatus,
    /// At least one candidate was dropped for lying beyond `max_radius`.
    pub radius_limited: bool,
}

impl VeinComponent {
    pub fn empty() -> Self {
        Self {
            ore_type: None,
            members: Vec::new(),
            frontier: BTreeSet::new(),
            count: 0,
            status: ScanStatus::NoMatch,
            radius_limited: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn cells(&self) -> Vec<Cell> {
        self.members.iter().map(|m| m.cell).collect()
    }

    pub fn contains(&self, cell: &Cell) -> bool {
        self.members.iter().any(|m| &m.cell == cell)
    }
}
