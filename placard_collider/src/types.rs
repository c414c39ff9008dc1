// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for labels: identifiers, flags, options, and tile/view parameters.

use core::fmt;

use kurbo::{Size, Vec2};
use smallvec::{SmallVec, smallvec};

/// Index of a label in the slice handed to [`LabelCollider::process`](crate::LabelCollider::process).
///
/// Relatives are linked through these indices rather than references, so a
/// link is only a lookup key and never keeps anything alive.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct LabelId(u32);

impl LabelId {
    /// Create an id for the label at `index`.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Label ids are intentionally 32-bit; a tile never carries 2^32 labels."
    )]
    pub const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Position of the label in its slice.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Per-label behavior flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct LabelFlags: u8 {
        /// Label takes part in collision. Labels without it are left untouched.
        const COLLIDE  = 0b0000_0001;
        /// Label is optional: losing it does not take its relative down.
        const OPTIONAL = 0b0000_0010;
        /// Icon is laid flat on the ground plane instead of facing the viewer.
        const FLAT     = 0b0000_0100;
    }
}

impl Default for LabelFlags {
    fn default() -> Self {
        Self::COLLIDE
    }
}

/// Kind of label. The ordinal order is used as a tie-break between kinds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum LabelType {
    /// Point icon (sprite).
    Icon,
    /// Point text.
    Text,
    /// Text following a line.
    Curved,
}

/// Terminal display state of a label after a collision pass.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum OcclusionState {
    /// Visible.
    #[default]
    None,
    /// Possibly occluded; a hint set while pairs are triaged, never final.
    Sleep,
    /// Suppressed for this tile.
    Dead,
}

/// Where a label sits relative to its anchor point.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Anchor {
    /// Centered on the point.
    #[default]
    Center,
    /// Above the point.
    Top,
    /// Below the point.
    Bottom,
    /// Left of the point.
    Left,
    /// Right of the point.
    Right,
    /// Above and to the left.
    TopLeft,
    /// Above and to the right.
    TopRight,
    /// Below and to the left.
    BottomLeft,
    /// Below and to the right.
    BottomRight,
}

impl Anchor {
    /// Unit direction in screen space (y down).
    pub const fn direction(self) -> Vec2 {
        let (x, y) = match self {
            Self::Center => (0.0, 0.0),
            Self::Top => (0.0, -1.0),
            Self::Bottom => (0.0, 1.0),
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
            Self::TopLeft => (-1.0, -1.0),
            Self::TopRight => (1.0, -1.0),
            Self::BottomLeft => (-1.0, 1.0),
            Self::BottomRight => (1.0, 1.0),
        };
        Vec2::new(x, y)
    }

    /// Offset of the label center from the anchor point for a label of `size`.
    pub fn offset(self, size: Size) -> Vec2 {
        let dir = self.direction();
        Vec2::new(dir.x * size.width * 0.5, dir.y * size.height * 0.5)
    }
}

/// Placement options shared by every label kind.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelOptions {
    /// Lower is more important.
    pub priority: f32,
    /// Repeat group id; `0` means the label is in no group.
    pub repeat_group: u32,
    /// Minimum spacing between labels of the same group.
    pub repeat_distance: f32,
    /// Behavior flags.
    pub flags: LabelFlags,
    /// Screen-space offset applied after projection.
    pub offset: Vec2,
    /// Anchor candidates, most preferred first. The first one is applied.
    pub anchors: SmallVec<[Anchor; 4]>,
    /// Padding added on every side of the collision box.
    pub buffer: f64,
    /// Rotation in degrees (screen space for text, ground plane for flat icons).
    pub angle: f64,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            priority: f32::MAX,
            repeat_group: 0,
            repeat_distance: 0.0,
            flags: LabelFlags::default(),
            offset: Vec2::ZERO,
            anchors: smallvec![Anchor::Center],
            buffer: 0.0,
            angle: 0.0,
        }
    }
}

impl LabelOptions {
    /// Set the priority.
    pub fn with_priority(mut self, priority: f32) -> Self {
        self.priority = priority;
        self
    }

    /// Put the label in a repeat group with the given minimum spacing.
    pub fn in_repeat_group(mut self, group: u32, distance: f32) -> Self {
        self.repeat_group = group;
        self.repeat_distance = distance;
        self
    }

    /// Add flags.
    pub fn with_flags(mut self, flags: LabelFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Mark the label optional.
    pub fn optional(self) -> Self {
        self.with_flags(LabelFlags::OPTIONAL)
    }

    /// Replace the anchor candidates with a single anchor.
    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchors = smallvec![anchor];
        self
    }

    /// The anchor applied to the label.
    pub fn anchor(&self) -> Anchor {
        self.anchors.first().copied().unwrap_or_default()
    }
}

/// Address of a tile: column, row, zoom, and the style zoom its labels were built for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TileId {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Data zoom.
    pub z: i32,
    /// Style zoom; at least `z` for overzoomed tiles.
    pub s: i32,
}

impl TileId {
    /// A tile whose style zoom equals its data zoom.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z, s: z }
    }

    /// The same tile built for style zoom `s`.
    pub const fn with_style_zoom(self, s: i32) -> Self {
        Self { s, ..self }
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/{}", self.x, self.y, self.z, self.s)
    }
}

/// View parameters a label needs to size itself on screen.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewState {
    /// `2^zoom` of the (synthetic) camera.
    pub zoom_scale: f64,
    /// Fractional part of the camera zoom.
    pub fract_zoom: f64,
    /// Viewport size in pixels.
    pub viewport_size: Size,
    /// Size of one tile in pixels.
    pub tile_size: f64,
}
