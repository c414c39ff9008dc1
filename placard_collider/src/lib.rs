// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placard Collider: deterministic label collision for vector map tiles.
//!
//! Given the candidate labels of one tile, the collider decides which ones
//! stay visible. It renders the tile through a synthetic camera a couple of
//! zoom levels deeper than the tile's own (see [`ColliderParams::overzoom`]),
//! finds overlapping labels, and hides the lower-ranked label of every
//! conflict.
//!
//! - [`Label`] is the capability surface the collider needs: projection,
//!   collision boxes, priority fields, hierarchy, and occlusion state.
//! - [`SpriteLabel`], [`TextLabel`] and [`CurvedLabel`] are the built-in
//!   kinds; [`MapLabel`] wraps any of them so a tile can carry a mixed set.
//! - [`LabelCollider::process`] resolves one tile and returns a
//!   [`CollisionReport`].
//!
//! ## Pipeline
//!
//! 1. Candidates are sorted with the priority order in [`order`].
//! 2. Very large tiles are first thinned by repeat group in model space.
//! 3. Labels are projected; those that cannot be placed are dropped.
//! 4. A grid broad phase (`placard_isect`) yields candidate pairs.
//! 5. Pairs are confirmed with exact oriented-box tests (`placard_obb`) and
//!    the loser is occluded, while repeat groups are thinned in screen space.
//! 6. Parent/child links are applied and every label gets its final
//!    [`OcclusionState`].
//!
//! The result only depends on the input: no hashing of addresses, no
//! unordered iteration.
//!
//! # Example
//!
//! ```rust
//! use glam::DVec3;
//! use kurbo::Size;
//! use placard_collider::{Label, LabelCollider, LabelOptions, MapLabel, OcclusionState, SpriteLabel, TileId};
//!
//! let icon = |x: f64, priority: f32| -> MapLabel {
//!     SpriteLabel::new(
//!         DVec3::new(x, 0.5, 0.0),
//!         Size::new(24.0, 24.0),
//!         LabelOptions::default().with_priority(priority),
//!     )
//!     .into()
//! };
//!
//! // Two icons a few pixels apart: the better ranked one (lower priority) wins.
//! let mut labels = vec![icon(0.5, 2.0), icon(0.51, 1.0), icon(0.9, 3.0)];
//! let mut collider = LabelCollider::new();
//! let report = collider.process(&mut labels, TileId::new(0, 0, 0), 256.0);
//!
//! assert_eq!(report.occluded, 1);
//! assert_eq!(labels[0].state(), OcclusionState::Dead);
//! assert_eq!(labels[1].state(), OcclusionState::None);
//! assert_eq!(labels[2].state(), OcclusionState::None);
//! ```
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`](https://docs.rs/log) facade: prefilter
//! statistics at debug level, broad-phase overload as a warning, and a
//! per-tile summary at trace level.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod collider;
mod curved;
mod label;
pub mod order;
mod repeat;
mod sprite;
mod text;
mod transform;
mod types;

pub use collider::{ColliderParams, CollisionReport, LabelCollider};
pub use curved::CurvedLabel;
pub use label::{Label, LabelCore, MapLabel};
pub use sprite::SpriteLabel;
pub use text::TextLabel;
pub use transform::{
    ObbBuffer, ScreenTransform, clip_is_behind_camera, clip_to_ndc, ndc_to_screen, tile_mvp,
    world_to_clip,
};
pub use types::{
    Anchor, LabelFlags, LabelId, LabelOptions, LabelType, OcclusionState, TileId, ViewState,
};
