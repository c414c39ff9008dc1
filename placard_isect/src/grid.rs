// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform grid broad phase for 2D AABBs.
//!
//! The grid covers `[0, extent]` on both axes with a fixed number of cells
//! per axis. Every AABB is bucketed into each cell it overlaps; boxes outside
//! the extent are clamped into the border cells so nothing is lost. Pairs are
//! only generated between boxes that share a cell, which keeps the work close
//! to linear for the roughly uniform label densities found on map tiles.

use alloc::vec::Vec;
use core::fmt::Debug;

use hashbrown::HashSet;
use smallvec::SmallVec;

use crate::types::{Aabb2D, Scalar};

/// Default ceiling on same-cell comparisons for a single [`Isect2D::intersect`] call.
pub const DEFAULT_MAX_CHECKS: usize = 1 << 20;

/// Scalar types supported by the grid.
///
/// This is kept separate from [`Scalar`] so that the grid implementation can
/// use type-specific logic for mapping coordinates to cells.
pub trait GridScalar: Scalar {
    /// Map a scalar coordinate to a grid coordinate along one axis.
    ///
    /// The mapping is based on an origin and uniform cell size. Implementations
    /// are expected to be monotonic in `value` for fixed `origin` and
    /// `cell_size`.
    fn cell_coord(value: Self, origin: Self, cell_size: Self) -> i32;

    /// Size of one cell when `extent` is split into `n` cells.
    fn cell_size(extent: Self, n: usize) -> Self;

    /// The unit cell size used when an extent is degenerate.
    fn unit() -> Self;
}

impl GridScalar for f32 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Grid cell indices are intentionally i32; out-of-range values are saturated."
    )]
    #[inline]
    fn cell_coord(value: Self, origin: Self, cell_size: Self) -> i32 {
        debug_assert!(
            cell_size > 0.0,
            "grid cell_size must be strictly positive (f32)"
        );
        let t = (value - origin) / cell_size;
        let coord = t as i32;

        // Round towards -∞ (the cast above has already truncated).
        if t < 0.0 && (coord as Self) > t {
            coord.saturating_sub(1)
        } else {
            coord
        }
    }

    #[allow(
        clippy::cast_precision_loss,
        reason = "Split counts are small (a few dozen cells per axis)."
    )]
    #[inline]
    fn cell_size(extent: Self, n: usize) -> Self {
        extent / n as Self
    }

    #[inline(always)]
    fn unit() -> Self {
        1.0
    }
}

impl GridScalar for f64 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Grid cell indices are intentionally i32; out-of-range values are saturated."
    )]
    #[inline]
    fn cell_coord(value: Self, origin: Self, cell_size: Self) -> i32 {
        debug_assert!(
            cell_size > 0.0,
            "grid cell_size must be strictly positive (f64)"
        );
        let t = (value - origin) / cell_size;
        let coord = t as i32;

        // Round towards -∞ (the cast above has already truncated).
        if t < 0.0 && (coord as Self) > t {
            coord.saturating_sub(1)
        } else {
            coord
        }
    }

    #[allow(
        clippy::cast_precision_loss,
        reason = "Split counts are small (a few dozen cells per axis)."
    )]
    #[inline]
    fn cell_size(extent: Self, n: usize) -> Self {
        extent / n as Self
    }

    #[inline(always)]
    fn unit() -> Self {
        1.0
    }
}

#[derive(Clone, Default)]
struct Cell {
    slots: SmallVec<[usize; 8]>,
}

/// Uniform grid that reports candidate pairs of overlapping AABBs.
///
/// ```
/// use placard_isect::{Aabb2D, Isect2D};
///
/// let mut isect = Isect2D::<f64>::new();
/// isect.resize((4, 4), (256.0, 256.0));
///
/// let boxes = [
///     Aabb2D::new(10.0, 10.0, 30.0, 30.0),
///     Aabb2D::new(20.0, 20.0, 40.0, 40.0),
///     Aabb2D::new(200.0, 200.0, 210.0, 210.0),
/// ];
/// isect.intersect(&boxes);
/// assert_eq!(isect.pairs(), &[(0, 1)]);
/// assert_eq!(isect.aborted(), 0);
/// ```
pub struct Isect2D<T: GridScalar> {
    split_x: usize,
    split_y: usize,
    cell_w: T,
    cell_h: T,
    max_checks: usize,
    cells: Vec<Cell>,
    seen: HashSet<(usize, usize)>,
    pairs: Vec<(usize, usize)>,
    aborted: usize,
}

impl<T: GridScalar> Debug for Isect2D<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let occupied = self.cells.iter().filter(|c| !c.slots.is_empty()).count();
        f.debug_struct("Isect2D")
            .field("split_x", &self.split_x)
            .field("split_y", &self.split_y)
            .field("cell_w", &self.cell_w)
            .field("cell_h", &self.cell_h)
            .field("max_checks", &self.max_checks)
            .field("occupied_cells", &occupied)
            .field("pairs", &self.pairs.len())
            .field("aborted", &self.aborted)
            .finish_non_exhaustive()
    }
}

impl<T: GridScalar> Default for Isect2D<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: GridScalar> Isect2D<T> {
    /// Create a 1×1 grid over a unit extent with the default comparison ceiling.
    pub fn new() -> Self {
        Self {
            split_x: 1,
            split_y: 1,
            cell_w: T::unit(),
            cell_h: T::unit(),
            max_checks: DEFAULT_MAX_CHECKS,
            cells: alloc::vec![Cell::default()],
            seen: HashSet::new(),
            pairs: Vec::new(),
            aborted: 0,
        }
    }

    /// Create a grid with a custom ceiling on same-cell comparisons.
    pub fn with_max_checks(max_checks: usize) -> Self {
        Self {
            max_checks,
            ..Self::new()
        }
    }

    /// Set the ceiling on same-cell comparisons.
    pub fn set_max_checks(&mut self, max_checks: usize) {
        self.max_checks = max_checks;
    }

    /// The ceiling on same-cell comparisons.
    pub fn max_checks(&self) -> usize {
        self.max_checks
    }

    /// Number of cells per axis.
    pub fn split(&self) -> (usize, usize) {
        (self.split_x, self.split_y)
    }

    /// Re-partition `[0, extent.0] × [0, extent.1]` into `split.0 × split.1` cells.
    ///
    /// Split counts below one are raised to one. A non-positive extent falls back
    /// to unit cells.
    pub fn resize(&mut self, split: (usize, usize), extent: (T, T)) {
        self.split_x = split.0.max(1);
        self.split_y = split.1.max(1);
        self.cell_w = Self::checked_cell(T::cell_size(extent.0, self.split_x));
        self.cell_h = Self::checked_cell(T::cell_size(extent.1, self.split_y));
        self.cells.clear();
        self.cells
            .resize_with(self.split_x * self.split_y, Cell::default);
    }

    fn checked_cell(size: T) -> T {
        if size > T::zero() { size } else { T::unit() }
    }

    /// Candidate pairs found by the last [`intersect`][Self::intersect] call.
    ///
    /// Each pair is reported once, with the lower index first.
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    /// Mutable access to the candidate pairs, for callers that reorder them in place.
    pub fn pairs_mut(&mut self) -> &mut Vec<(usize, usize)> {
        &mut self.pairs
    }

    /// Number of cells left unscanned because the comparison ceiling was hit.
    pub fn aborted(&self) -> usize {
        self.aborted
    }

    /// Drop all pairs and cell contents, keeping allocations.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.slots.clear();
        }
        self.seen.clear();
        self.pairs.clear();
        self.aborted = 0;
    }

    fn cell_range(&self, min: T, max: T, cell_size: T, split: usize) -> (usize, usize) {
        let hi = i32::try_from(split - 1).unwrap_or(i32::MAX);
        let c0 = T::cell_coord(min, T::zero(), cell_size).clamp(0, hi);
        let c1 = T::cell_coord(max, T::zero(), cell_size).clamp(0, hi);
        let (c0, c1) = if c0 <= c1 { (c0, c1) } else { (c1, c0) };
        (
            usize::try_from(c0).unwrap_or(0),
            usize::try_from(c1).unwrap_or(0),
        )
    }

    /// Bucket `aabbs` and collect every pair of overlapping boxes that share a cell.
    ///
    /// Results replace those of the previous call. Cells are scanned in row-major
    /// order, so the pair order only depends on the input. When the comparison
    /// ceiling is reached the scan stops early and [`aborted`][Self::aborted]
    /// reports how many non-trivial cells were skipped.
    pub fn intersect(&mut self, aabbs: &[Aabb2D<T>]) {
        self.clear();

        for (slot, aabb) in aabbs.iter().enumerate() {
            let (ix0, ix1) = self.cell_range(aabb.min_x, aabb.max_x, self.cell_w, self.split_x);
            let (iy0, iy1) = self.cell_range(aabb.min_y, aabb.max_y, self.cell_h, self.split_y);
            for iy in iy0..=iy1 {
                for ix in ix0..=ix1 {
                    self.cells[iy * self.split_x + ix].slots.push(slot);
                }
            }
        }

        let mut checks = 0_usize;
        for ci in 0..self.cells.len() {
            let slots = &self.cells[ci].slots;
            for a in 0..slots.len() {
                for b in (a + 1)..slots.len() {
                    if checks >= self.max_checks {
                        self.aborted = self.cells[ci..]
                            .iter()
                            .filter(|c| c.slots.len() > 1)
                            .count();
                        return;
                    }
                    checks += 1;

                    // Slots are pushed in input order, so `i < j` always holds.
                    let (i, j) = (slots[a], slots[b]);
                    if aabbs[i].overlaps(&aabbs[j]) && self.seen.insert((i, j)) {
                        self.pairs.push((i, j));
                    }
                }
            }
        }
    }
}

/// Grid broad phase over `f32` coordinates.
pub type Isect2DF32 = Isect2D<f32>;
/// Grid broad phase over `f64` coordinates.
pub type Isect2DF64 = Isect2D<f64>;
