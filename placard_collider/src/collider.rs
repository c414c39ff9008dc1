// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-tile collision resolution.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::ops::Range;

use glam::DVec3;
use kurbo::Size;
use placard_isect::{Aabb2D, DEFAULT_MAX_CHECKS, Isect2D};
use placard_obb::Obb;
use placard_obb::group::{any_intersect, union_extent};

use crate::label::Label;
use crate::order::{compare, dominates};
use crate::repeat::filter_repeat_groups;
use crate::transform::{ObbBuffer, ScreenTransform, exp2i, rect_to_aabb, tile_mvp};
use crate::types::{LabelFlags, LabelId, OcclusionState, TileId, ViewState};

/// Tunables for [`LabelCollider`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColliderParams {
    /// Zoom levels added to the tile's style zoom when sizing the synthetic view.
    ///
    /// Labels are measured as they would appear this many levels deeper, which
    /// drops candidates unlikely to fit anywhere in the tile's zoom range.
    pub overzoom: i32,
    /// Above this many candidates, repeat groups are thinned in model space
    /// before projection.
    pub prefilter_threshold: usize,
    /// Target broad-phase cell size in pixels.
    pub grid_cell_size: f64,
    /// Upper bound on broad-phase cells per axis.
    pub max_grid_splits: usize,
    /// Upper bound on same-cell comparisons in the broad phase.
    pub max_pair_checks: usize,
}

impl Default for ColliderParams {
    fn default() -> Self {
        Self {
            overzoom: 2,
            prefilter_threshold: 4096,
            grid_cell_size: 128.0,
            max_grid_splits: 64,
            max_pair_checks: DEFAULT_MAX_CHECKS,
        }
    }
}

/// Counters describing one [`LabelCollider::process`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Labels taking part in collision.
    pub candidates: usize,
    /// Labels removed by the model-space prefilter.
    pub prefiltered: usize,
    /// Labels that could not be projected; their state is left as it was.
    pub unprojected: usize,
    /// Candidate pairs produced by the broad phase.
    pub pairs: usize,
    /// Broad-phase cells left unscanned. Non-zero means some overlaps may
    /// have gone unresolved.
    pub aborted: usize,
    /// Projected labels that ended the pass hidden.
    pub occluded: usize,
}

/// A label in the working set, with its windows into the scratch buffers.
#[derive(Clone, Debug)]
pub(crate) struct LabelEntry {
    pub(crate) label: LabelId,
    pub(crate) transform: Range<usize>,
    pub(crate) obbs: Range<usize>,
}

impl LabelEntry {
    pub(crate) fn new(label: LabelId) -> Self {
        Self {
            label,
            transform: 0..0,
            obbs: 0..0,
        }
    }
}

/// Resolves label overlaps for one tile at a time.
///
/// The collider only holds scratch buffers, reused across calls. Use one per
/// worker; it carries no state from one tile to the next.
pub struct LabelCollider {
    params: ColliderParams,
    entries: Vec<LabelEntry>,
    transforms: Vec<DVec3>,
    obbs: Vec<Obb>,
    aabbs: Vec<Aabb2D<f64>>,
    isect: Isect2D<f64>,
}

impl Debug for LabelCollider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LabelCollider")
            .field("params", &self.params)
            .field("entries", &self.entries.len())
            .field("isect", &self.isect)
            .finish_non_exhaustive()
    }
}

impl Default for LabelCollider {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelCollider {
    /// Create a collider with default parameters.
    pub fn new() -> Self {
        Self::with_params(ColliderParams::default())
    }

    /// Create a collider with custom parameters.
    pub fn with_params(params: ColliderParams) -> Self {
        Self {
            params,
            entries: Vec::new(),
            transforms: Vec::new(),
            obbs: Vec::new(),
            aabbs: Vec::new(),
            isect: Isect2D::with_max_checks(params.max_pair_checks),
        }
    }

    /// Current parameters.
    pub fn params(&self) -> &ColliderParams {
        &self.params
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.transforms.clear();
        self.obbs.clear();
        self.aabbs.clear();
        self.isect.clear();
    }

    /// Resolve overlaps among `labels`, the labels of tile `tile_id`.
    ///
    /// `tile_size` is the tile's edge in pixels. Every label with
    /// [`LabelFlags::COLLIDE`] that can be projected ends the pass in
    /// [`OcclusionState::None`] or [`OcclusionState::Dead`]. Labels without the
    /// flag, and labels that fail to project, keep their state.
    ///
    /// The outcome only depends on the labels, their order in the slice, the
    /// tile, and the parameters.
    pub fn process<L: Label>(
        &mut self,
        labels: &mut [L],
        tile_id: TileId,
        tile_size: f64,
    ) -> CollisionReport {
        self.clear();
        let mut report = CollisionReport::default();

        for (index, label) in labels.iter_mut().enumerate() {
            if label.can_occlude() {
                label.reset_occlusion();
                self.entries.push(LabelEntry::new(LabelId::new(index)));
            }
        }
        // Relatives outside the working set can still be occluded by `commit`.
        for entry in &self.entries {
            if let Some(relative) = relative_of(labels, entry.label) {
                labels[relative.index()].reset_occlusion();
            }
        }
        report.candidates = self.entries.len();
        self.entries
            .sort_by(|a, b| compare(&labels[a.label.index()], &labels[b.label.index()]));

        // Render the tile as if viewed `overzoom` levels deeper.
        let tile_scale = exp2i(tile_id.s - tile_id.z + self.params.overzoom);
        let screen_size = tile_size * tile_scale;

        if self.entries.len() > self.params.prefilter_threshold {
            let before = self.entries.len();
            filter_repeat_groups(labels, &self.entries, 0, before - 1, screen_size);
            commit(labels, &self.entries);
            self.entries
                .retain(|entry| !labels[entry.label.index()].is_occluded());
            report.prefiltered = before - self.entries.len();
            log::debug!(
                "prefiltered {before} labels to {} for tile {tile_id}",
                self.entries.len()
            );
        }

        self.project(labels, tile_id, tile_size, screen_size, &mut report);
        if self.entries.is_empty() {
            log::trace!("no labels to collide for tile {tile_id}: {report:?}");
            self.clear();
            return report;
        }

        let split = grid_splits(
            screen_size,
            self.params.grid_cell_size,
            self.params.max_grid_splits,
        );
        self.isect.set_max_checks(self.params.max_pair_checks);
        self.isect.resize((split, split), (screen_size, screen_size));
        self.isect.intersect(&self.aabbs);
        report.pairs = self.isect.pairs().len();
        report.aborted = self.isect.aborted();
        if report.aborted > 0 {
            log::warn!(
                "too many label collisions (x{}) for tile {tile_id}",
                report.aborted
            );
        }

        self.order_pairs(labels);
        let last_filtered = self.resolve_pairs(labels);

        let last = self.entries.len() - 1;
        filter_repeat_groups(labels, &self.entries, last_filtered, last, 0.0);
        commit(labels, &self.entries);

        report.occluded = self
            .entries
            .iter()
            .filter(|entry| labels[entry.label.index()].is_occluded())
            .count();
        log::trace!("collided tile {tile_id}: {report:?}");

        self.clear();
        report
    }

    /// Project the working set, keeping only entries that produced boxes.
    fn project<L: Label>(
        &mut self,
        labels: &mut [L],
        tile_id: TileId,
        tile_size: f64,
        screen_size: f64,
        report: &mut CollisionReport,
    ) {
        let mvp = tile_mvp();
        let view = ViewState {
            zoom_scale: exp2i(tile_id.s + self.params.overzoom),
            fract_zoom: 0.0,
            viewport_size: Size::new(screen_size, screen_size),
            tile_size,
        };

        let mut kept = 0;
        for pos in 0..self.entries.len() {
            let id = self.entries[pos].label;
            let label = &mut labels[id.index()];

            let mut transform = ScreenTransform::new(&mut self.transforms);
            if !label.update_screen_transform(&mvp, &view, None, &mut transform) {
                transform.discard();
                report.unprojected += 1;
                continue;
            }
            let transform = transform.range();

            let mut out = ObbBuffer::new(&mut self.obbs);
            label.obbs(&self.transforms[transform.clone()], &mut out);
            let obbs = out.range();

            let Some(extent) = union_extent(&self.obbs[obbs.clone()]) else {
                self.transforms.truncate(transform.start);
                report.unprojected += 1;
                continue;
            };
            self.aabbs.push(rect_to_aabb(extent));
            let entry = LabelEntry {
                label: id,
                transform,
                obbs,
            };
            debug_assert!(
                !entry.transform.is_empty(),
                "projected label wrote no transform records"
            );
            self.entries[kept] = entry;
            kept += 1;
        }
        self.entries.truncate(kept);
    }

    /// Put the better-priority label first in every pair, then sort pairs by
    /// their first label.
    fn order_pairs<L: Label>(&mut self, labels: &mut [L]) {
        let entries = &self.entries;
        for pair in self.isect.pairs_mut().iter_mut() {
            let (a, b) = (entries[pair.0].label, entries[pair.1].label);
            let (pa, pb) = (
                labels[a.index()].options().priority,
                labels[b.index()].options().priority,
            );
            if pa > pb {
                *pair = (pair.1, pair.0);
                labels[a.index()].enter_state(OcclusionState::Sleep, 0.0);
            } else if pa < pb {
                labels[b.index()].enter_state(OcclusionState::Sleep, 0.0);
            }
        }

        let labels = &*labels;
        self.isect.pairs_mut().sort_by(|a, b| {
            if a.0 == b.0 {
                return a.1.cmp(&b.1);
            }
            compare(
                &labels[entries[a.0].label.index()],
                &labels[entries[b.0].label.index()],
            )
            .then(a.0.cmp(&b.0))
        });
    }

    /// Narrow phase over the ordered pairs. Returns the last position covered
    /// by the incremental repeat-group filter.
    fn resolve_pairs<L: Label>(&self, labels: &mut [L]) -> usize {
        let mut group = 0;
        let mut last_filtered = 0;

        for &(first, second) in self.isect.pairs() {
            let (e1, e2) = (&self.entries[first], &self.entries[second]);
            let (a, b) = (e1.label, e2.label);

            // Thin out a group before its members can occlude anyone else.
            let first_group = labels[a.index()].options().repeat_group;
            if first_group != group {
                group = first_group;
                if group != 0 {
                    last_filtered =
                        filter_repeat_groups(labels, &self.entries, last_filtered, first, 0.0);
                }
            }

            if relative_of(labels, a) == Some(b) || relative_of(labels, b) == Some(a) {
                continue;
            }
            for id in [a, b] {
                if labels[id.index()].is_child() && relative_occluded(labels, id) {
                    labels[id.index()].occlude();
                }
            }
            if labels[a.index()].is_occluded() || labels[b.index()].is_occluded() {
                continue;
            }

            if !any_intersect(&self.obbs[e1.obbs.clone()], &self.obbs[e2.obbs.clone()]) {
                continue;
            }
            if dominates(&labels[a.index()], &labels[b.index()], false) {
                labels[b.index()].occlude();
            } else {
                labels[a.index()].occlude();
            }
        }
        last_filtered
    }
}

/// The label's relative, if it points inside `labels`.
fn relative_of<L: Label>(labels: &[L], id: LabelId) -> Option<LabelId> {
    labels[id.index()]
        .relative()
        .filter(|relative| relative.index() < labels.len())
}

fn relative_occluded<L: Label>(labels: &[L], id: LabelId) -> bool {
    relative_of(labels, id).is_some_and(|relative| labels[relative.index()].is_occluded())
}

/// Apply the hierarchy rules and write the terminal state of every entry.
///
/// A label whose relative is occluded is occluded too. A non-optional label
/// that is occluded takes its relative down with it.
fn commit<L: Label>(labels: &mut [L], entries: &[LabelEntry]) {
    for entry in entries {
        let id = entry.label;
        if let Some(relative) = relative_of(labels, id) {
            if labels[relative.index()].is_occluded() {
                labels[id.index()].occlude();
            } else {
                let label = &labels[id.index()];
                if label.is_occluded() && !label.options().flags.contains(LabelFlags::OPTIONAL) {
                    let relative = &mut labels[relative.index()];
                    relative.occlude();
                    relative.enter_state(OcclusionState::Dead, 0.0);
                }
            }
        }

        let label = &mut labels[id.index()];
        let state = if label.is_occluded() {
            OcclusionState::Dead
        } else {
            OcclusionState::None
        };
        label.enter_state(state, 0.0);
    }
}

/// Broad-phase cells per axis for a square viewport of `extent` pixels.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "The float-to-int cast saturates; the result is clamped to `max_splits`."
)]
fn grid_splits(extent: f64, cell_size: f64, max_splits: usize) -> usize {
    ((extent / cell_size) as usize).clamp(1, max_splits.max(1))
}
