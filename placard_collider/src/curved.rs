// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text laid along a line.
//!
//! The run is centered on the midpoint of the projected path. Each path
//! segment under the run contributes one box aligned to that segment, so a
//! label bending around a corner is covered by several boxes that collide as
//! one.
//!
//! Transform layout: one `(x, y, 0)` screen point per path vertex.

use alloc::vec::Vec;

use glam::{DMat4, DVec3};
use kurbo::{Point, Rect, Size};
use placard_obb::Obb;

use crate::label::{Label, LabelCore};
use crate::sprite::overlaps;
use crate::transform::{
    ObbBuffer, ScreenTransform, clip_is_behind_camera, clip_to_ndc, ndc_to_screen, world_to_clip,
};
use crate::types::{LabelOptions, LabelType, ViewState};

/// A text run following a tile-local polyline.
#[derive(Clone, Debug)]
pub struct CurvedLabel {
    core: LabelCore,
    line: Vec<DVec3>,
    model_center: DVec3,
}

impl CurvedLabel {
    /// Create a label of `size` pixels (run length by line height) along `line`.
    pub fn new(line: Vec<DVec3>, size: Size, options: LabelOptions) -> Self {
        let model_center = model_midpoint(&line);
        Self {
            core: LabelCore::new(size, options),
            line,
            model_center,
        }
    }
}

/// Point halfway along `line` by arc length.
fn model_midpoint(line: &[DVec3]) -> DVec3 {
    let Some(&first) = line.first() else {
        return DVec3::ZERO;
    };
    let total: f64 = line.windows(2).map(|w| w[0].distance(w[1])).sum();
    let mut remaining = total * 0.5;
    for w in line.windows(2) {
        let len = w[0].distance(w[1]);
        if len > 0.0 && remaining <= len {
            return w[0].lerp(w[1], remaining / len);
        }
        remaining -= len;
    }
    line.last().copied().unwrap_or(first)
}

fn to_point(p: &DVec3) -> Point {
    Point::new(p.x, p.y)
}

/// Point halfway along a screen path, with the path's total length.
fn screen_midpoint(path: &[Point]) -> (Point, f64) {
    let total: f64 = path.windows(2).map(|w| w[0].distance(w[1])).sum();
    let mut remaining = total * 0.5;
    for w in path.windows(2) {
        let len = w[0].distance(w[1]);
        if len > 0.0 && remaining <= len {
            return (w[0].lerp(w[1], remaining / len), total);
        }
        remaining -= len;
    }
    (path.first().copied().unwrap_or(Point::ORIGIN), total)
}

impl Label for CurvedLabel {
    fn core(&self) -> &LabelCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LabelCore {
        &mut self.core
    }

    fn label_type(&self) -> LabelType {
        LabelType::Curved
    }

    fn update_screen_transform(
        &mut self,
        mvp: &DMat4,
        view: &ViewState,
        bounds: Option<Rect>,
        transform: &mut ScreenTransform<'_>,
    ) -> bool {
        if self.line.len() < 2 {
            return false;
        }

        let mut path = Vec::with_capacity(self.line.len());
        for p in &self.line {
            let clip = world_to_clip(mvp, p.extend(1.0));
            if clip_is_behind_camera(clip) {
                return false;
            }
            let ndc = clip_to_ndc(clip);
            if ndc.z > 1.0 {
                return false;
            }
            path.push(ndc_to_screen(ndc, view.viewport_size));
        }

        let (center, length) = screen_midpoint(&path);
        if length < self.core.size().width {
            return false;
        }

        if let Some(bounds) = bounds {
            let visible = path
                .windows(2)
                .any(|w| overlaps(Rect::from_points(w[0], w[1]), bounds));
            if !visible {
                return false;
            }
        }

        self.core.set_screen_center(center);
        for p in &path {
            transform.push(DVec3::new(p.x, p.y, 0.0));
        }
        true
    }

    fn obbs(&self, transform: &[DVec3], out: &mut ObbBuffer<'_>) {
        let total: f64 = transform
            .windows(2)
            .map(|w| to_point(&w[0]).distance(to_point(&w[1])))
            .sum();
        let size = self.core.size();
        let pad = self.core.options().buffer * 2.0;
        let run_start = (total - size.width) * 0.5;
        let run_end = run_start + size.width;

        let mut at = 0.0;
        for w in transform.windows(2) {
            let (a, b) = (to_point(&w[0]), to_point(&w[1]));
            let len = a.distance(b);
            let lo = run_start.max(at);
            let hi = run_end.min(at + len);
            if len > 0.0 && hi > lo {
                let mid = a.lerp(b, ((lo + hi) * 0.5 - at) / len);
                out.append(Obb::from_size(mid, b - a, hi - lo + pad, size.height + pad));
            }
            at += len;
        }
    }

    fn model_center(&self) -> DVec3 {
        self.model_center
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::tile_mvp;
    use alloc::vec;
    use kurbo::Vec2;
    use placard_obb::group::union_extent;

    const EPSILON: f64 = 1e-9;

    fn view() -> ViewState {
        ViewState {
            zoom_scale: 1024.0,
            fract_zoom: 0.0,
            viewport_size: Size::new(1024.0, 1024.0),
            tile_size: 256.0,
        }
    }

    fn project(label: &mut CurvedLabel, bounds: Option<Rect>) -> Option<Vec<Obb>> {
        let mut points = Vec::new();
        let mut t = ScreenTransform::new(&mut points);
        if !label.update_screen_transform(&tile_mvp(), &view(), bounds, &mut t) {
            return None;
        }
        let mut obbs = Vec::new();
        let mut out = ObbBuffer::new(&mut obbs);
        label.obbs(&points, &mut out);
        Some(obbs)
    }

    #[test]
    fn run_is_centered_on_path_midpoint() {
        let mut label = CurvedLabel::new(
            vec![
                DVec3::new(0.25, 0.5, 0.0),
                DVec3::new(0.5, 0.5, 0.0),
                DVec3::new(0.75, 0.5, 0.0),
            ],
            Size::new(100.0, 10.0),
            LabelOptions::default(),
        );
        assert_eq!(label.model_center(), DVec3::new(0.5, 0.5, 0.0));

        // Screen path runs 384..640 at y = 512; the run covers 462..562.
        let obbs = project(&mut label, None).expect("path long enough");
        assert_eq!(obbs.len(), 2);
        assert_eq!(label.screen_center(), Point::new(512.0, 512.0));
        assert_eq!(union_extent(&obbs), Some(Rect::new(462.0, 507.0, 562.0, 517.0)));
    }

    #[test]
    fn boxes_follow_each_segment() {
        let mut label = CurvedLabel::new(
            vec![
                DVec3::new(0.25, 0.5, 0.0),
                DVec3::new(0.5, 0.5, 0.0),
                DVec3::new(0.5, 0.75, 0.0),
            ],
            Size::new(100.0, 10.0),
            LabelOptions::default(),
        );
        let obbs = project(&mut label, None).expect("path long enough");
        assert_eq!(obbs.len(), 2);
        assert_eq!(obbs[0].axis(), Vec2::new(1.0, 0.0));
        assert_eq!(obbs[1].axis(), Vec2::new(0.0, 1.0));
        assert!((obbs[0].half_width() - 25.0).abs() < EPSILON);
        assert!((obbs[1].center().y - 537.0).abs() < EPSILON);
    }

    #[test]
    fn short_path_cannot_carry_label() {
        let mut label = CurvedLabel::new(
            vec![DVec3::new(0.25, 0.5, 0.0), DVec3::new(0.75, 0.5, 0.0)],
            Size::new(300.0, 10.0),
            LabelOptions::default(),
        );
        assert!(project(&mut label, None).is_none());

        let mut degenerate = CurvedLabel::new(
            vec![DVec3::new(0.5, 0.5, 0.0)],
            Size::new(1.0, 1.0),
            LabelOptions::default(),
        );
        assert!(project(&mut degenerate, None).is_none());
    }

    #[test]
    fn path_outside_bounds_fails() {
        let mut label = CurvedLabel::new(
            vec![DVec3::new(0.25, 0.5, 0.0), DVec3::new(0.75, 0.5, 0.0)],
            Size::new(50.0, 10.0),
            LabelOptions::default(),
        );
        assert!(project(&mut label, Some(Rect::new(0.0, 0.0, 100.0, 100.0))).is_none());
        assert!(project(&mut label, Some(Rect::new(500.0, 500.0, 520.0, 520.0))).is_some());
    }
}
