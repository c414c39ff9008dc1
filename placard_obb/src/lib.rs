// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Oriented bounding boxes for narrow-phase label collision.
//!
//! This crate provides a small [`Obb`] primitive, built on top of [`kurbo`],
//! and an exact overlap test based on the separating axis theorem. It is
//! intentionally decoupled from labels: anything that can describe its
//! footprint as one or more rotated rectangles can use it.
//!
//! # Typical usage
//!
//! - Use a broad phase (e.g., `placard_isect`) to cull candidate pairs using
//!   the axis-aligned [`Obb::extent`] of each box.
//! - Confirm each candidate with [`Obb::intersects`], or with
//!   [`group::any_intersect`] when a footprint is made of several boxes.
//!
//! ## Overlap semantics
//!
//! Boxes that only touch (share an edge or a corner) do **not** intersect.
//! Labels laid out edge to edge are considered compatible.

#![no_std]

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect, Vec2};

/// Helpers for footprints made of several boxes.
pub mod group;

/// An oriented rectangle: center, unit axis and half extents.
///
/// The axis is the direction of the box's width; the height runs along the
/// axis rotated by 90°.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obb {
    center: Point,
    axis: Vec2,
    half_width: f64,
    half_height: f64,
}

impl Obb {
    /// Create a box from its center, width direction and half extents.
    ///
    /// `axis` is normalized; a zero-length axis falls back to +X. Negative
    /// extents are clamped to zero.
    pub fn new(center: Point, axis: Vec2, half_width: f64, half_height: f64) -> Self {
        let len = axis.hypot();
        let axis = if len > 0.0 && len.is_finite() {
            axis / len
        } else {
            Vec2::new(1.0, 0.0)
        };
        Self {
            center,
            axis,
            half_width: half_width.max(0.0),
            half_height: half_height.max(0.0),
        }
    }

    /// Create a box from its center, width direction and full size.
    pub fn from_size(center: Point, axis: Vec2, width: f64, height: f64) -> Self {
        Self::new(center, axis, width * 0.5, height * 0.5)
    }

    /// Create an unrotated box covering `rect`.
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::from_size(rect.center(), Vec2::new(1.0, 0.0), rect.width(), rect.height())
    }

    /// Center of the box.
    pub fn center(&self) -> Point {
        self.center
    }

    /// Unit direction of the box's width.
    pub fn axis(&self) -> Vec2 {
        self.axis
    }

    /// Unit direction of the box's height.
    pub fn perp(&self) -> Vec2 {
        Vec2::new(-self.axis.y, self.axis.x)
    }

    /// Half of the box's extent along [`axis`][Self::axis].
    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    /// Half of the box's extent along [`perp`][Self::perp].
    pub fn half_height(&self) -> f64 {
        self.half_height
    }

    /// The four corners in counter-clockwise order (for a y-up frame).
    pub fn corners(&self) -> [Point; 4] {
        let w = self.axis * self.half_width;
        let h = self.perp() * self.half_height;
        [
            self.center - w - h,
            self.center + w - h,
            self.center + w + h,
            self.center - w + h,
        ]
    }

    /// Axis-aligned bounding box of the oriented box.
    pub fn extent(&self) -> Rect {
        let ax = self.axis.x.abs();
        let ay = self.axis.y.abs();
        let hx = ax * self.half_width + ay * self.half_height;
        let hy = ay * self.half_width + ax * self.half_height;
        Rect::new(
            self.center.x - hx,
            self.center.y - hy,
            self.center.x + hx,
            self.center.y + hy,
        )
    }

    /// Whether `pt` lies inside the box (boundary included).
    pub fn contains(&self, pt: Point) -> bool {
        let d = pt - self.center;
        d.dot(self.axis).abs() <= self.half_width && d.dot(self.perp()).abs() <= self.half_height
    }

    /// Half of the box's projected length on the unit direction `n`.
    fn radius_on(&self, n: Vec2) -> f64 {
        self.half_width * self.axis.dot(n).abs() + self.half_height * self.perp().dot(n).abs()
    }

    /// Exact overlap test using the separating axis theorem.
    ///
    /// Only the two face normals of each box need to be tested. Touching boxes
    /// do not intersect.
    pub fn intersects(&self, other: &Self) -> bool {
        let d = other.center - self.center;
        for n in [self.axis, self.perp(), other.axis, other.perp()] {
            if d.dot(n).abs() >= self.radius_on(n) + other.radius_on(n) {
                return false;
            }
        }
        true
    }
}
