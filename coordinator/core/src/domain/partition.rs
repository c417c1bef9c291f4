// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Area Partitioner
//!
//! Splits a work area into contiguous, non-overlapping slices so that several
//! agents can be assigned disjoint parts of one job.
//!
//! ## Slicing Rule
//! | Step | Rule |
//! |------|------|
//! | Axis | Longer horizontal axis; X when width == depth |
//! | Slice length | `ceil(axis_len / workers)` |
//! | Other axes | Every slice spans their full extent |
//! | Remainder | Last slice is short; empty trailing slices are omitted |
//! | `workers == 0` | Original box returned as the only slice |

use serde::{Deserialize, Serialize};

use crate::domain::cell::{AreaBounds, Cell};

/// Horizontal axis a box is cut along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitAxis {
    X,
    Z,
}

impl SplitAxis {
    /// Longer horizontal axis of `bounds`, ties broken toward X.
    pub fn for_bounds(bounds: &AreaBounds) -> Self {
        if bounds.depth() > bounds.width() {
            SplitAxis::Z
        } else {
            SplitAxis::X
        }
    }

    fn range(&self, bounds: &AreaBounds) -> (i64, i64) {
        match self {
            SplitAxis::X => (bounds.start().x as i64, bounds.end().x as i64),
            SplitAxis::Z => (bounds.start().z as i64, bounds.end().z as i64),
        }
    }

    fn slice(&self, bounds: &AreaBounds, lo: i32, hi: i32) -> AreaBounds {
        let (start, end) = (bounds.start(), bounds.end());
        match self {
            SplitAxis::X => AreaBounds::new(Cell::new(lo, start.y, start.z), Cell::new(hi, end.y, end.z)),
            SplitAxis::Z => AreaBounds::new(Cell::new(start.x, start.y, lo), Cell::new(end.x, end.y, hi)),
        }
    }
}

/// Split `bounds` into at most `worker_count` slices along its longer
/// horizontal axis.
///
/// Fewer than `worker_count` slices come back when the axis is shorter than
/// the worker count.
pub fn partition(bounds: &AreaBounds, worker_count: usize) -> Vec<AreaBounds> {
    if worker_count < 1 {
        return vec![*bounds];
    }

    let axis = SplitAxis::for_bounds(bounds);
    let (lo, hi) = axis.range(bounds);
    let axis_len = hi - lo + 1;
    let workers = i64::try_from(worker_count).unwrap_or(i64::MAX);
    let slice_len = axis_len / workers + i64::from(axis_len % workers != 0);

    let mut slices = Vec::with_capacity(worker_count.min(axis_len as usize));
    let mut slice_start = lo;
    for _ in 0..workers {
        if slice_start > hi {
            break;
        }
        let slice_end = (slice_start + slice_len - 1).min(hi);
        // Both ends lie within the original i32 range.
        slices.push(axis.slice(bounds, slice_start as i32, slice_end as i32));
        slice_start = slice_end + 1;
    }
    slices
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn bounds(a: (i32, i32, i32), b: (i32, i32, i32)) -> AreaBounds {
        AreaBounds::new(a.into(), b.into())
    }

    fn assert_exact_cover(original: &AreaBounds, slices: &[AreaBounds]) {
        let mut seen = HashSet::new();
        for slice in slices {
            for cell in slice.cells() {
                assert!(original.contains(&cell), "{cell} escapes {original}");
                assert!(seen.insert(cell), "{cell} covered twice");
            }
        }
        assert_eq!(seen.len() as u64, original.volume());
    }

    #[test]
    fn test_ten_wide_row_into_three_workers() {
        let area = bounds((0, 0, 0), (9, 0, 0));
        let slices = partition(&area, 3);

        let x_ranges: Vec<(i32, i32)> = slices.iter().map(|s| (s.start().x, s.end().x)).collect();
        assert_eq!(x_ranges, vec![(0, 3), (4, 7), (8, 9)]);
        let widths: Vec<u64> = slices.iter().map(|s| s.width()).collect();
        assert_eq!(widths, vec![4, 4, 2]);
    }

    #[test]
    fn test_splits_along_longer_horizontal_axis() {
        let area = bounds((0, 60, 0), (3, 70, 11));
        let slices = partition(&area, 4);
        assert_eq!(SplitAxis::for_bounds(&area), SplitAxis::Z);
        assert_eq!(slices.len(), 4);
        for slice in &slices {
            assert_eq!(slice.width(), 4);
            assert_eq!(slice.height(), 11);
            assert_eq!(slice.depth(), 3);
        }
        assert_exact_cover(&area, &slices);
    }

    #[test]
    fn test_square_ties_break_toward_x() {
        let area = bounds((0, 0, 0), (5, 2, 5));
        assert_eq!(SplitAxis::for_bounds(&area), SplitAxis::X);
        let slices = partition(&area, 2);
        assert_eq!(slices[0].end().x, 2);
        assert_eq!(slices[0].depth(), 6);
    }

    #[test]
    fn test_more_workers_than_columns_yields_fewer_slices() {
        let area = bounds((0, 0, 0), (2, 0, 0));
        let slices = partition(&area, 8);
        assert_eq!(slices.len(), 3);
        assert_exact_cover(&area, &slices);
    }

    #[test]
    fn test_uneven_division_omits_empty_trailing_slices() {
        // ceil(10 / 4) = 3 -> [0..2],[3..5],[6..8],[9..9]
        let area = bounds((0, 0, 0), (9, 1, 1));
        assert_eq!(partition(&area, 4).len(), 4);
        // ceil(10 / 6) = 2 -> five slices cover the row, the sixth would start past the end
        let slices = partition(&area, 6);
        assert_eq!(slices.len(), 5);
        assert_exact_cover(&area, &slices);
    }

    #[test]
    fn test_zero_workers_returns_original_box() {
        let area = bounds((-4, 10, 7), (4, 12, 9));
        assert_eq!(partition(&area, 0), vec![area]);
    }

    #[test]
    fn test_exact_cover_for_many_shapes() {
        let shapes = [
            bounds((0, 0, 0), (0, 0, 0)),
            bounds((-7, 5, 3), (6, 9, 4)),
            bounds((10, 64, -20), (13, 64, 5)),
            bounds((-1, 0, -1), (1, 3, 1)),
        ];
        for area in &shapes {
            for workers in 1..=12 {
                let slices = partition(area, workers);
                assert!(!slices.is_empty());
                assert!(slices.len() <= workers);
                assert_exact_cover(area, &slices);
            }
        }
    }
}
