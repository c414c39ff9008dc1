// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placard Isect: a uniform-grid broad phase for 2D AABBs.
//!
//! Placard Isect answers one question cheaply: which pairs of boxes in a set
//! *might* overlap? It is the broad phase of the label collider, but nothing in
//! it is label specific.
//!
//! - [`Aabb2D`] is a plain axis-aligned box, generic over the scalar type.
//! - [`Isect2D`] partitions a fixed extent into a grid, buckets every box into
//!   the cells it covers, and emits each overlapping pair once.
//! - A ceiling on same-cell comparisons bounds the worst case. When it is hit,
//!   the pairs found so far are kept and [`Isect2D::aborted`] becomes non-zero;
//!   callers treat that as a degraded result, not a failure.
//!
//! # Example
//!
//! ```rust
//! use placard_isect::{Aabb2D, Isect2D};
//!
//! let mut isect = Isect2D::<f32>::with_max_checks(1_000);
//! isect.resize((2, 2), (512.0, 512.0));
//!
//! let boxes = [
//!     Aabb2D::new(0.0, 0.0, 100.0, 40.0),
//!     Aabb2D::new(90.0, 30.0, 180.0, 60.0),
//!     Aabb2D::new(400.0, 400.0, 420.0, 410.0),
//! ];
//! isect.intersect(&boxes);
//!
//! assert_eq!(isect.pairs(), &[(0, 1)]);
//! assert_eq!(isect.aborted(), 0);
//! ```
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates. Debug builds may assert.

#![no_std]

extern crate alloc;

mod grid;
mod types;

pub use grid::{DEFAULT_MAX_CHECKS, GridScalar, Isect2D, Isect2DF32, Isect2DF64};
pub use types::{Aabb2D, Scalar};
