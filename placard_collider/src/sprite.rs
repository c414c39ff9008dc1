// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point icons.
//!
//! A billboard icon faces the viewer: its box is screen-aligned and keeps its
//! pixel size. A flat icon ([`LabelFlags::FLAT`]) lies on the ground plane:
//! its four corners are projected individually and the collision box is the
//! axis-aligned hull of the result.
//!
//! Transform layout:
//! - billboard: `[position, ndc, (viewport_w, viewport_h, fract_zoom)]`
//! - flat: four `(x, y, w)` screen corners followed by four projected corners

use glam::{DMat4, DVec3};
use kurbo::{Point, Rect, Size, Vec2};
use placard_obb::Obb;

use crate::label::{Label, LabelCore};
use crate::transform::{
    ObbBuffer, ScreenTransform, clip_is_behind_camera, clip_to_ndc, exp2i, ndc_to_screen,
    world_to_clip,
};
use crate::types::{LabelFlags, LabelOptions, LabelType, ViewState};

/// An icon anchored at a single tile-local point.
#[derive(Clone, Debug)]
pub struct SpriteLabel {
    core: LabelCore,
    coordinates: DVec3,
    zoom: i32,
    extrude_scale: f64,
    anchor: Vec2,
}

impl SpriteLabel {
    /// Create an icon of `size` pixels at tile-local `coordinates`.
    pub fn new(coordinates: DVec3, size: Size, options: LabelOptions) -> Self {
        let anchor = options.anchor().offset(size);
        Self {
            core: LabelCore::new(size, options),
            coordinates,
            zoom: 0,
            extrude_scale: 0.0,
            anchor,
        }
    }

    /// Zoom level the icon was styled for; scales flat icons.
    pub fn with_zoom(mut self, zoom: i32) -> Self {
        self.zoom = zoom;
        self
    }

    /// Growth of the box per unit of fractional zoom.
    pub fn with_extrude_scale(mut self, extrude_scale: f64) -> Self {
        self.extrude_scale = extrude_scale;
        self
    }

    fn is_flat(&self) -> bool {
        self.core.options().flags.contains(LabelFlags::FLAT)
    }

    fn update_flat(
        &self,
        mvp: &DMat4,
        view: &ViewState,
        w: f64,
        bounds: Option<Rect>,
        transform: &mut ScreenTransform<'_>,
    ) -> bool {
        let size = self.core.size();
        let scale = exp2i(self.zoom) / (view.zoom_scale / w * view.tile_size);
        let grow = self.extrude_scale * view.fract_zoom;
        let dim = Vec2::new(size.width + grow, size.height + grow) * (scale * 0.5);

        let mut corners = [
            Vec2::new(-dim.x, -dim.y),
            Vec2::new(dim.x, -dim.y),
            Vec2::new(-dim.x, dim.y),
            Vec2::new(dim.x, dim.y),
        ];

        let angle = self.core.options().angle;
        if angle != 0.0 {
            let r = Vec2::from_angle(angle.to_radians());
            for c in &mut corners {
                *c = Vec2::new(c.x * r.x - c.y * r.y, c.x * r.y + c.y * r.x);
            }
        }

        let mut screen = [Point::ORIGIN; 4];
        let mut projected = [DVec3::ZERO; 4];
        let mut ws = [0.0; 4];
        let mut hull: Option<Rect> = None;
        for i in 0..4 {
            let p = self.coordinates + DVec3::new(corners[i].x, corners[i].y, 0.0);
            let clip = world_to_clip(mvp, p.extend(1.0));
            if clip_is_behind_camera(clip) {
                return false;
            }
            screen[i] = ndc_to_screen(clip_to_ndc(clip), view.viewport_size);
            projected[i] = clip.truncate();
            ws[i] = clip.w;
            let pt = Rect::from_points(screen[i], screen[i]);
            hull = Some(hull.map_or(pt, |h| h.union(pt)));
        }

        if let (Some(bounds), Some(hull)) = (bounds, hull) {
            if !overlaps(hull, bounds) {
                return false;
            }
        }

        for i in 0..4 {
            transform.push(DVec3::new(screen[i].x, screen[i].y, ws[i]));
        }
        for p in projected {
            transform.push(p);
        }
        true
    }
}

/// Inclusive rectangle overlap, matching the broad phase.
pub(crate) fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

impl Label for SpriteLabel {
    fn core(&self) -> &LabelCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LabelCore {
        &mut self.core
    }

    fn label_type(&self) -> LabelType {
        LabelType::Icon
    }

    fn update_screen_transform(
        &mut self,
        mvp: &DMat4,
        view: &ViewState,
        bounds: Option<Rect>,
        transform: &mut ScreenTransform<'_>,
    ) -> bool {
        let clip = world_to_clip(mvp, self.coordinates.extend(1.0));
        if clip_is_behind_camera(clip) {
            return false;
        }
        let ndc = clip_to_ndc(clip);
        if ndc.z > 1.0 {
            // Beyond the far plane.
            return false;
        }

        let center = ndc_to_screen(ndc, view.viewport_size);
        self.core.set_screen_center(center);

        if self.is_flat() {
            return self.update_flat(mvp, view, clip.w, bounds, transform);
        }

        let pos = center + self.core.options().offset;
        if let Some(bounds) = bounds {
            let half = self.core.size().to_vec2() * 0.5;
            let at = pos + self.anchor;
            if !overlaps(Rect::from_points(at - half, at + half), bounds) {
                return false;
            }
        }

        transform.push(DVec3::new(pos.x, pos.y, 0.0));
        transform.push(ndc);
        transform.push(DVec3::new(
            view.viewport_size.width,
            view.viewport_size.height,
            view.fract_zoom,
        ));
        true
    }

    fn obbs(&self, transform: &[DVec3], out: &mut ObbBuffer<'_>) {
        if self.is_flat() {
            let Some(first) = transform.first() else {
                return;
            };
            let mut hull = Rect::new(first.x, first.y, first.x, first.y);
            for p in transform.iter().take(4).skip(1) {
                hull = hull.union_pt(Point::new(p.x, p.y));
            }
            out.append(Obb::from_rect(hull));
            return;
        }

        let (Some(position), Some(view)) = (transform.first(), transform.get(2)) else {
            return;
        };
        let size = self.core.size();
        let grow = self.extrude_scale * view.z;
        let center = Point::new(position.x, position.y) + self.anchor;
        out.append(Obb::from_size(
            center,
            Vec2::new(1.0, 0.0),
            size.width + grow,
            size.height + grow,
        ));
    }

    fn model_center(&self) -> DVec3 {
        self.coordinates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::tile_mvp;
    use crate::types::Anchor;
    use alloc::vec::Vec;
    use glam::DVec4;

    fn view() -> ViewState {
        ViewState {
            zoom_scale: 1024.0,
            fract_zoom: 0.0,
            viewport_size: Size::new(1024.0, 1024.0),
            tile_size: 256.0,
        }
    }

    fn project(label: &mut SpriteLabel, mvp: &DMat4, bounds: Option<Rect>) -> Option<Vec<Obb>> {
        let mut points = Vec::new();
        let mut t = ScreenTransform::new(&mut points);
        if !label.update_screen_transform(mvp, &view(), bounds, &mut t) {
            return None;
        }
        let range = t.range();
        let mut obbs = Vec::new();
        let mut out = ObbBuffer::new(&mut obbs);
        label.obbs(&points[range], &mut out);
        Some(obbs)
    }

    #[test]
    fn billboard_box_is_centered_on_anchor() {
        let mut label = SpriteLabel::new(
            DVec3::new(0.5, 0.5, 0.0),
            Size::new(20.0, 10.0),
            LabelOptions::default().with_anchor(Anchor::Top),
        );
        let obbs = project(&mut label, &tile_mvp(), None).expect("projectable");
        assert_eq!(obbs.len(), 1);
        assert_eq!(label.screen_center(), Point::new(512.0, 512.0));
        assert_eq!(obbs[0].extent(), Rect::new(502.0, 502.0, 522.0, 512.0));
    }

    #[test]
    fn behind_camera_and_far_plane_fail() {
        let mut label = SpriteLabel::new(
            DVec3::new(0.5, 0.5, 0.0),
            Size::new(8.0, 8.0),
            LabelOptions::default(),
        );

        // Flip w so every point ends up behind the camera.
        let mut behind = tile_mvp();
        behind.w_axis = DVec4::new(-0.5, 0.5, 0.0, -1.0);
        assert!(project(&mut label, &behind, None).is_none());

        let mut far = SpriteLabel::new(
            DVec3::new(0.5, 0.5, 2.0),
            Size::new(8.0, 8.0),
            LabelOptions::default(),
        );
        assert!(project(&mut far, &tile_mvp(), None).is_none());
    }

    #[test]
    fn clip_bounds_reject_outside_labels() {
        let mut label = SpriteLabel::new(
            DVec3::new(0.5, 0.5, 0.0),
            Size::new(8.0, 8.0),
            LabelOptions::default(),
        );
        let inside = Rect::new(500.0, 500.0, 600.0, 600.0);
        let outside = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(project(&mut label, &tile_mvp(), Some(inside)).is_some());
        assert!(project(&mut label, &tile_mvp(), Some(outside)).is_none());
    }

    #[test]
    fn flat_icon_covers_projected_corners() {
        let mut label = SpriteLabel::new(
            DVec3::new(0.5, 0.5, 0.0),
            Size::new(16.0, 16.0),
            LabelOptions::default().with_flags(LabelFlags::FLAT),
        )
        .with_zoom(10);

        // scale = 2^10 / (1024 / 1 * 256) = 1/256 model units per pixel.
        let obbs = project(&mut label, &tile_mvp(), None).expect("projectable");
        assert_eq!(obbs.len(), 1);
        let ext = obbs[0].extent();
        assert!((ext.width() - 32.0).abs() < 1e-9);
        assert!((ext.center().x - 512.0).abs() < 1e-9);
    }

    #[test]
    fn extrude_grows_billboard_with_fract_zoom() {
        let label = SpriteLabel::new(DVec3::ZERO, Size::new(10.0, 10.0), LabelOptions::default())
            .with_extrude_scale(4.0);
        let transform = [
            DVec3::new(100.0, 100.0, 0.0),
            DVec3::ZERO,
            DVec3::new(512.0, 512.0, 0.5),
        ];
        let mut obbs = Vec::new();
        let mut out = ObbBuffer::new(&mut obbs);
        label.obbs(&transform, &mut out);
        assert_eq!(obbs[0].half_width(), 6.0);
    }
}
