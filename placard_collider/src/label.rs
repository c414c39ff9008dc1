// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The label capability surface consumed by the collider.

use glam::{DMat4, DVec3};
use kurbo::{Point, Rect, Size};

use crate::curved::CurvedLabel;
use crate::sprite::SpriteLabel;
use crate::text::TextLabel;
use crate::transform::{ObbBuffer, ScreenTransform};
use crate::types::{LabelFlags, LabelId, LabelOptions, LabelType, OcclusionState, ViewState};

/// State shared by every label kind.
///
/// Variants embed one of these and expose it through [`Label::core`]; all the
/// priority, hierarchy and occlusion queries are answered from it.
#[derive(Clone, Debug)]
pub struct LabelCore {
    options: LabelOptions,
    size: Size,
    relative: Option<LabelId>,
    is_child: bool,
    hash: u64,
    candidate_priority: u32,
    occluded: bool,
    state: OcclusionState,
    transition: f32,
    screen_center: Point,
}

impl LabelCore {
    /// Create the shared state for a label of `size` (in pixels).
    pub fn new(size: Size, options: LabelOptions) -> Self {
        Self {
            options,
            size,
            relative: None,
            is_child: false,
            hash: 0,
            candidate_priority: 0,
            occluded: false,
            state: OcclusionState::None,
            transition: 0.0,
            screen_center: Point::ORIGIN,
        }
    }

    /// Placement options.
    pub fn options(&self) -> &LabelOptions {
        &self.options
    }

    /// Unpadded label size in pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Set the stable hash used as the last tie-break.
    pub fn set_hash(&mut self, hash: u64) {
        self.hash = hash;
    }

    /// Set the ordering between candidates of the same kind (lower is better).
    pub fn set_candidate_priority(&mut self, candidate_priority: u32) {
        self.candidate_priority = candidate_priority;
    }

    /// Link this label to `relative`.
    ///
    /// A child depends on its relative: it is hidden whenever the relative is.
    /// A mutual pair is two labels linked to each other with `is_child == false`
    /// on at least one side.
    pub fn set_relative(&mut self, relative: Option<LabelId>, is_child: bool) {
        self.relative = relative;
        self.is_child = is_child && relative.is_some();
    }

    /// Record the screen position of the label's anchor.
    pub fn set_screen_center(&mut self, center: Point) {
        self.screen_center = center;
    }
}

/// A placeable label, as seen by the collider.
///
/// Implementors provide the geometry (`update_screen_transform`, `obbs`,
/// `model_center`) and a [`LabelCore`]; everything else has a default built
/// on the core.
pub trait Label {
    /// Shared label state.
    fn core(&self) -> &LabelCore;

    /// Shared label state, mutably.
    fn core_mut(&mut self) -> &mut LabelCore;

    /// Kind of label.
    fn label_type(&self) -> LabelType;

    /// Project the label into screen space, appending records to `transform`.
    ///
    /// Returns `false` when the label cannot be placed: behind the camera,
    /// beyond the far plane, entirely outside `bounds`, or otherwise not
    /// representable at this view. The caller then drops the label for the
    /// pass and discards whatever was written.
    fn update_screen_transform(
        &mut self,
        mvp: &DMat4,
        view: &ViewState,
        bounds: Option<Rect>,
        transform: &mut ScreenTransform<'_>,
    ) -> bool;

    /// Append the collision boxes for the label's current `transform`.
    ///
    /// All boxes of one label are tested as a unit.
    fn obbs(&self, transform: &[DVec3], out: &mut ObbBuffer<'_>);

    /// Position in tile-local model space.
    fn model_center(&self) -> DVec3;

    /// Placement options.
    fn options(&self) -> &LabelOptions {
        self.core().options()
    }

    /// Whether the label depends on its relative.
    fn is_child(&self) -> bool {
        self.core().is_child
    }

    /// The linked label, if any.
    fn relative(&self) -> Option<LabelId> {
        self.core().relative
    }

    /// Stable tie-break key.
    fn hash(&self) -> u64 {
        self.core().hash
    }

    /// Ordering between candidates of the same kind.
    fn candidate_priority(&self) -> u32 {
        self.core().candidate_priority
    }

    /// Screen position recorded by the last projection.
    fn screen_center(&self) -> Point {
        self.core().screen_center
    }

    /// Whether the label takes part in collision.
    fn can_occlude(&self) -> bool {
        self.options().flags.contains(LabelFlags::COLLIDE)
    }

    /// Mark the label as losing a conflict in the current pass.
    fn occlude(&mut self) {
        self.core_mut().occluded = true;
    }

    /// Whether the label lost a conflict in the current pass.
    fn is_occluded(&self) -> bool {
        self.core().occluded
    }

    /// Clear the per-pass occlusion flag.
    fn reset_occlusion(&mut self) {
        self.core_mut().occluded = false;
    }

    /// Set the display state, with a transition hint for the renderer.
    fn enter_state(&mut self, state: OcclusionState, transition: f32) {
        let core = self.core_mut();
        core.state = state;
        core.transition = transition;
    }

    /// Display state.
    fn state(&self) -> OcclusionState {
        self.core().state
    }

    /// Transition hint passed with the last state change.
    fn transition(&self) -> f32 {
        self.core().transition
    }

    /// Whether the label should be drawn.
    fn is_visible(&self) -> bool {
        self.state() != OcclusionState::Dead
    }
}

/// Any of the built-in label kinds.
#[derive(Clone, Debug)]
pub enum MapLabel {
    /// Point icon.
    Icon(SpriteLabel),
    /// Point text.
    Text(TextLabel),
    /// Text along a line.
    Curved(CurvedLabel),
}

impl From<SpriteLabel> for MapLabel {
    fn from(label: SpriteLabel) -> Self {
        Self::Icon(label)
    }
}

impl From<TextLabel> for MapLabel {
    fn from(label: TextLabel) -> Self {
        Self::Text(label)
    }
}

impl From<CurvedLabel> for MapLabel {
    fn from(label: CurvedLabel) -> Self {
        Self::Curved(label)
    }
}

impl Label for MapLabel {
    fn core(&self) -> &LabelCore {
        match self {
            Self::Icon(l) => l.core(),
            Self::Text(l) => l.core(),
            Self::Curved(l) => l.core(),
        }
    }

    fn core_mut(&mut self) -> &mut LabelCore {
        match self {
            Self::Icon(l) => l.core_mut(),
            Self::Text(l) => l.core_mut(),
            Self::Curved(l) => l.core_mut(),
        }
    }

    fn label_type(&self) -> LabelType {
        match self {
            Self::Icon(l) => l.label_type(),
            Self::Text(l) => l.label_type(),
            Self::Curved(l) => l.label_type(),
        }
    }

    fn update_screen_transform(
        &mut self,
        mvp: &DMat4,
        view: &ViewState,
        bounds: Option<Rect>,
        transform: &mut ScreenTransform<'_>,
    ) -> bool {
        match self {
            Self::Icon(l) => l.update_screen_transform(mvp, view, bounds, transform),
            Self::Text(l) => l.update_screen_transform(mvp, view, bounds, transform),
            Self::Curved(l) => l.update_screen_transform(mvp, view, bounds, transform),
        }
    }

    fn obbs(&self, transform: &[DVec3], out: &mut ObbBuffer<'_>) {
        match self {
            Self::Icon(l) => l.obbs(transform, out),
            Self::Text(l) => l.obbs(transform, out),
            Self::Curved(l) => l.obbs(transform, out),
        }
    }

    fn model_center(&self) -> DVec3 {
        match self {
            Self::Icon(l) => l.model_center(),
            Self::Text(l) => l.model_center(),
            Self::Curved(l) => l.model_center(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Anchor;

    fn icon(priority: f32) -> MapLabel {
        SpriteLabel::new(
            DVec3::new(0.5, 0.5, 0.0),
            Size::new(10.0, 10.0),
            LabelOptions::default().with_priority(priority),
        )
        .into()
    }

    #[test]
    fn occlusion_flag_is_separate_from_state() {
        let mut label = icon(1.0);
        assert!(!label.is_occluded());
        label.occlude();
        assert!(label.is_occluded());
        assert_eq!(label.state(), OcclusionState::None);

        label.enter_state(OcclusionState::Dead, 0.25);
        assert!(!label.is_visible());
        assert_eq!(label.transition(), 0.25);

        label.reset_occlusion();
        assert!(!label.is_occluded());
        assert_eq!(label.state(), OcclusionState::Dead);
    }

    #[test]
    fn child_requires_relative() {
        let mut label = icon(1.0);
        label.core_mut().set_relative(None, true);
        assert!(!label.is_child());

        label.core_mut().set_relative(Some(LabelId::new(3)), true);
        assert!(label.is_child());
        assert_eq!(label.relative(), Some(LabelId::new(3)));
    }

    #[test]
    fn enum_dispatches_to_variant() {
        let text: MapLabel = TextLabel::new(
            DVec3::ZERO,
            Size::new(20.0, 8.0),
            LabelOptions::default().with_anchor(Anchor::Top),
        )
        .into();
        assert_eq!(text.label_type(), LabelType::Text);
        assert_eq!(icon(0.0).label_type(), LabelType::Icon);
        assert!(text.can_occlude());
    }
}
