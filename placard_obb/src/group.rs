// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A footprint made of several boxes (a curved label, a multi-glyph run) is a
//! single unit: it collides with another footprint as soon as any of its
//! boxes does.

use kurbo::Rect;

use crate::Obb;

/// Whether any box of `a` intersects any box of `b`.
///
/// Empty footprints never intersect anything.
pub fn any_intersect(a: &[Obb], b: &[Obb]) -> bool {
    a.iter().any(|oa| b.iter().any(|ob| oa.intersects(ob)))
}

/// Union of the axis-aligned extents of all boxes, or `None` for an empty footprint.
pub fn union_extent(boxes: &[Obb]) -> Option<Rect> {
    let mut it = boxes.iter().map(Obb::extent);
    let first = it.next()?;
    Some(it.fold(first, |acc, r| acc.union(r)))
}
