// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point text.
//!
//! Shaping happens upstream; here a text label is a box of known pixel size,
//! padded by [`LabelOptions::buffer`] and rotated by [`LabelOptions::angle`].
//!
//! Transform layout: `[position, ndc]`.

use glam::{DMat4, DVec3};
use kurbo::{Point, Rect, Size, Vec2};
use placard_obb::Obb;

use crate::label::{Label, LabelCore};
use crate::sprite::overlaps;
use crate::transform::{
    ObbBuffer, ScreenTransform, clip_is_behind_camera, clip_to_ndc, ndc_to_screen, world_to_clip,
};
use crate::types::{LabelOptions, LabelType, ViewState};

/// A text label anchored at a single tile-local point.
#[derive(Clone, Debug)]
pub struct TextLabel {
    core: LabelCore,
    coordinates: DVec3,
    anchor: Vec2,
    axis: Vec2,
}

impl TextLabel {
    /// Create a text label of `size` pixels at tile-local `coordinates`.
    pub fn new(coordinates: DVec3, size: Size, options: LabelOptions) -> Self {
        let anchor = options.anchor().offset(size);
        let axis = if options.angle == 0.0 {
            Vec2::new(1.0, 0.0)
        } else {
            Vec2::from_angle(options.angle.to_radians())
        };
        Self {
            core: LabelCore::new(size, options),
            coordinates,
            anchor,
            axis,
        }
    }

    fn padded_size(&self) -> Size {
        let pad = self.core.options().buffer * 2.0;
        let size = self.core.size();
        Size::new(size.width + pad, size.height + pad)
    }

    fn footprint(&self, position: Point) -> Obb {
        let size = self.padded_size();
        Obb::from_size(position + self.anchor, self.axis, size.width, size.height)
    }
}

impl Label for TextLabel {
    fn core(&self) -> &LabelCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LabelCore {
        &mut self.core
    }

    fn label_type(&self) -> LabelType {
        LabelType::Text
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
            return false;
        }

        let center = ndc_to_screen(ndc, view.viewport_size);
        self.core.set_screen_center(center);
        let pos = center + self.core.options().offset;

        if let Some(bounds) = bounds {
            if !overlaps(self.footprint(pos).extent(), bounds) {
                return false;
            }
        }

        transform.push(DVec3::new(pos.x, pos.y, 0.0));
        transform.push(ndc);
        true
    }

    fn obbs(&self, transform: &[DVec3], out: &mut ObbBuffer<'_>) {
        if let Some(p) = transform.first() {
            out.append(self.footprint(Point::new(p.x, p.y)));
        }
    }

    fn model_center(&self) -> DVec3 {
        self.coordinates
    }
}
