// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Vein Scanner
//!
//! Bounded breadth-first flood fill that discovers the connected cluster of
//! cells sharing the seed's label (an ore vein, a tree, a sand bank).
//!
//! ## Scan Rules
//! | Step | Rule |
//! |------|------|
//! | Seed | Must carry a label in the match set, else an empty component |
//! | Connectivity | Six face neighbours, no diagonals |
//! | Radius | Cells farther than `max_radius` from the seed are never read |
//! | Member | Label equals the seed's label; its neighbours are queued |
//! | Frontier | Solid, not an empty label, not a member |
//! | Stop | Queue drained (`Exhausted`) or `max_cells` members (`CellLimit`) |
//!
//! A cell the accessor cannot read is skipped; the scan carries on with
//! whatever it can see.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

use crate::domain::{
    Cell, CellAccessor, LabelSet, ScanOptions, ScanStatus, VeinComponent, VeinMember,
};
use crate::infrastructure::observability::{names, CoordinationSink};

pub struct VeinScanner {
    defaults: ScanOptions,
    sink: Arc<dyn CoordinationSink>,
}

impl VeinScanner {
    pub fn new(defaults: ScanOptions, sink: Arc<dyn CoordinationSink>) -> Self {
        Self { defaults, sink }
    }

    pub fn defaults(&self) -> &ScanOptions {
        &self.defaults
    }

    /// Scan from `seed` with the default options.
    pub fn scan<A>(&self, seed: Cell, accessor: &A, match_set: &LabelSet) -> VeinComponent
    where
        A: CellAccessor + ?Sized,
    {
        self.scan_with(seed, accessor, match_set, &self.defaults)
    }

    pub fn scan_with<A>(
        &self,
        seed: Cell,
        accessor: &A,
        match_set: &LabelSet,
        options: &ScanOptions,
    ) -> VeinComponent
    where
        A: CellAccessor + ?Sized,
    {
        let started = Instant::now();
        let component = self.flood_fill(seed, accessor, match_set, options);
        self.sink.timer(names::SCAN_DURATION, started.elapsed());
        debug!(
            seed = %seed,
            ore = component.ore_type.as_deref().unwrap_or("-"),
            count = component.count,
            frontier = component.frontier.len(),
            status = ?component.status,
            "Vein scan finished"
        );
        component
    }

    fn flood_fill<A>(
        &self,
        seed: Cell,
        accessor: &A,
        match_set: &LabelSet,
        options: &ScanOptions,
    ) -> VeinComponent
    where
        A: CellAccessor + ?Sized,
    {
        let ore = match accessor.cell_at(seed) {
            Ok(sample) if match_set.contains(&sample.label) => sample.label,
            Ok(_) => return VeinComponent::empty(),
            Err(err) => {
                self.sink.warn(&format!("Vein scan seed {} unreadable: {}", seed, err));
                self.sink.counter(names::SCAN_READ_FAULTS, 1);
                return VeinComponent::empty();
            }
        };

        let mut members = vec![VeinMember {
            cell: seed,
            distance: 0.0,
        }];
        let mut frontier = BTreeSet::new();
        let mut visited: HashSet<Cell> = HashSet::from([seed]);
        let mut queue: VecDeque<Cell> = VecDeque::new();
        let mut radius_limited = false;
        let mut read_faults = 0u64;
        let mut status = ScanStatus::Exhausted;

        enqueue_neighbors(seed, &mut visited, &mut queue);
        if members.len() >= options.max_cells {
            status = ScanStatus::CellLimit;
            queue.clear();
        }

        while let Some(cell) = queue.pop_front() {
            let distance = cell.distance(&seed);
            if distance > options.max_radius {
                radius_limited = true;
                continue;
            }

            let sample = match accessor.cell_at(cell) {
                Ok(sample) => sample,
                Err(err) => {
                    trace!(cell = %cell, error = %err, "Skipping unreadable cell");
                    read_faults += 1;
                    continue;
                }
            };

            if sample.label == ore {
                members.push(VeinMember { cell, distance });
                if members.len() >= options.max_cells {
                    status = ScanStatus::CellLimit;
                    break;
                }
                enqueue_neighbors(cell, &mut visited, &mut queue);
            } else if sample.solid && !options.empty_labels.contains(&sample.label) {
                frontier.insert(cell);
            }
        }

        if read_faults > 0 {
            self.sink.counter(names::SCAN_READ_FAULTS, read_faults);
        }

        if options.sort_by_distance {
            members.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        }

        VeinComponent {
            ore_type: Some(ore),
            count: members.len(),
            members,
            frontier,
            status,
            radius_limited,
        }
    }
}

fn enqueue_neighbors(cell: Cell, visited: &mut HashSet<Cell>, queue: &mut VecDeque<Cell>) {
    for neighbor in cell.neighbors() {
        if visited.insert(neighbor) {
            queue.push_back(neighbor);
        }
    }
}

/// Order `members` as a greedy nearest-neighbour tour starting at `start`.
///
/// Each step moves to the closest unvisited member (ties go to the earlier
/// one in `members`). This is a heuristic tour, not an optimal one: on
/// unlucky layouts it can be noticeably longer than the shortest route.
pub fn order_for_visiting(members: &[Cell], start: Cell) -> Vec<Cell> {
    let mut remaining = members.to_vec();
    let mut tour = Vec::with_capacity(remaining.len());
    let mut current = start;

    while !remaining.is_empty() {
        let next = nearest_index(&remaining, &current);
        current = remaining.remove(next);
        tour.push(current);
    }
    tour
}

fn nearest_index(cells: &[Cell], from: &Cell) -> usize {
    cells
        .iter()
        .enumerate()
        .min_by_key(|(_, cell)| cell.distance_squared(from))
        .map_or(0, |(index, _)| index)
}
