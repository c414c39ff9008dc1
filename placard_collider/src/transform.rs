// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Projection helpers and the per-pass scratch buffers labels write into.
//!
//! A collision pass owns two flat buffers: projected screen data
//! ([`ScreenTransform`]) and collision boxes ([`ObbBuffer`]). Each label gets
//! an append-only window into both, recorded as an index range so the buffers
//! can be reused across passes without per-label allocations.

use alloc::vec::Vec;
use core::ops::Range;

use glam::{DMat4, DVec3, DVec4};
use kurbo::{Point, Rect, Size};
use placard_isect::Aabb2D;
use placard_obb::Obb;

/// Append-only window into the shared screen transform buffer.
#[derive(Debug)]
pub struct ScreenTransform<'a> {
    points: &'a mut Vec<DVec3>,
    start: usize,
}

impl<'a> ScreenTransform<'a> {
    /// Open a window at the end of `points`.
    pub fn new(points: &'a mut Vec<DVec3>) -> Self {
        let start = points.len();
        Self { points, start }
    }

    /// Append one record.
    pub fn push(&mut self, p: DVec3) {
        self.points.push(p);
    }

    /// Records written through this window.
    pub fn as_slice(&self) -> &[DVec3] {
        &self.points[self.start..]
    }

    /// Range of this window in the shared buffer.
    pub fn range(&self) -> Range<usize> {
        self.start..self.points.len()
    }

    /// Drop everything written through this window.
    pub fn discard(&mut self) {
        self.points.truncate(self.start);
    }
}

/// Append-only window into the shared OBB buffer.
#[derive(Debug)]
pub struct ObbBuffer<'a> {
    obbs: &'a mut Vec<Obb>,
    start: usize,
}

impl<'a> ObbBuffer<'a> {
    /// Open a window at the end of `obbs`.
    pub fn new(obbs: &'a mut Vec<Obb>) -> Self {
        let start = obbs.len();
        Self { obbs, start }
    }

    /// Append one box.
    pub fn append(&mut self, obb: Obb) {
        self.obbs.push(obb);
    }

    /// Boxes written through this window.
    pub fn as_slice(&self) -> &[Obb] {
        &self.obbs[self.start..]
    }

    /// Range of this window in the shared buffer.
    pub fn range(&self) -> Range<usize> {
        self.start..self.obbs.len()
    }
}

/// The synthetic tile projection: tile-local `(x, y)` in `[0, 1]` maps to NDC
/// `(x - 0.5, 0.5 - y)`, so the tile lands centered in the viewport with y down.
pub fn tile_mvp() -> DMat4 {
    DMat4::from_cols(
        DVec4::X,
        DVec4::NEG_Y,
        DVec4::Z,
        DVec4::new(-0.5, 0.5, 0.0, 1.0),
    )
}

/// Project a homogeneous model-space position into clip space.
#[inline]
pub fn world_to_clip(mvp: &DMat4, p: DVec4) -> DVec4 {
    *mvp * p
}

/// Whether a clip-space position lies behind the camera.
#[inline]
pub fn clip_is_behind_camera(clip: DVec4) -> bool {
    clip.w <= 0.0
}

/// Perspective divide.
#[inline]
pub fn clip_to_ndc(clip: DVec4) -> DVec3 {
    clip.truncate() / clip.w
}

/// Map NDC (`[-1, 1]`, y up) to pixels (`[0, size]`, y down).
#[inline]
pub fn ndc_to_screen(ndc: DVec3, viewport: Size) -> Point {
    Point::new(
        (ndc.x + 1.0) * 0.5 * viewport.width,
        (1.0 - ndc.y) * 0.5 * viewport.height,
    )
}

pub(crate) fn rect_to_aabb(r: Rect) -> Aabb2D<f64> {
    Aabb2D::new(r.x0, r.y0, r.x1, r.y1)
}

/// `2^n` for small integer `n`.
pub(crate) fn exp2i(n: i32) -> f64 {
    let base = if n >= 0 { 2.0 } else { 0.5 };
    (0..n.unsigned_abs()).fold(1.0, |acc, _| acc * base)
}
