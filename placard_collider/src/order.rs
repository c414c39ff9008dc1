// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic priority order between labels.
//!
//! Labels are ranked by the key
//! `(priority, is_child, repeat_group, label_type, candidate_priority, hash)`,
//! compared lexicographically with the smaller key winning:
//!
//! - lower `priority` first (NaN sorts after every number),
//! - parents before children,
//! - lower repeat group first, which keeps each group contiguous after a sort,
//! - kinds in [`LabelType`](crate::LabelType) order, then `candidate_priority`,
//! - finally the stable `hash`.
//!
//! `candidate_priority` only ranks labels of the same kind. Ordering kinds
//! first keeps the relation transitive on mixed sets.

use core::cmp::Ordering;

use crate::label::Label;

/// Compare two labels; [`Ordering::Less`] means `a` dominates `b`.
///
/// Falling back to `hash` across kinds would cycle: icons `i1` (candidate 0,
/// hash 9) and `i2` (candidate 1, hash 1) with a text `t` (hash 5) give
/// `i1 < i2` by candidate priority, then `i2 < t < i1` by hash.
pub fn compare<A: Label + ?Sized, B: Label + ?Sized>(a: &A, b: &B) -> Ordering {
    let (oa, ob) = (a.options(), b.options());
    oa.priority
        .total_cmp(&ob.priority)
        .then_with(|| a.is_child().cmp(&b.is_child()))
        .then_with(|| oa.repeat_group.cmp(&ob.repeat_group))
        .then_with(|| a.label_type().cmp(&b.label_type()))
        .then_with(|| a.candidate_priority().cmp(&b.candidate_priority()))
        .then_with(|| a.hash().cmp(&b.hash()))
}

/// Whether `a` strictly dominates `b`, or `default` when they rank equal.
pub fn dominates<A: Label + ?Sized, B: Label + ?Sized>(a: &A, b: &B, default: bool) -> bool {
    match compare(a, b) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::MapLabel;
    use crate::sprite::SpriteLabel;
    use crate::text::TextLabel;
    use crate::types::{LabelId, LabelOptions};
    use alloc::vec::Vec;
    use glam::DVec3;
    use kurbo::Size;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn label(icon: bool, options: LabelOptions) -> MapLabel {
        let size = Size::new(10.0, 10.0);
        if icon {
            SpriteLabel::new(DVec3::ZERO, size, options).into()
        } else {
            TextLabel::new(DVec3::ZERO, size, options).into()
        }
    }

    #[test]
    fn priority_then_hierarchy_then_group() {
        let a = label(true, LabelOptions::default().with_priority(1.0));
        let b = label(true, LabelOptions::default().with_priority(2.0));
        assert_eq!(compare(&a, &b), Ordering::Less);
        assert!(dominates(&a, &b, false));
        assert!(!dominates(&b, &a, true));

        let parent = label(true, LabelOptions::default().with_priority(1.0));
        let mut child = label(false, LabelOptions::default().with_priority(1.0));
        child.core_mut().set_relative(Some(LabelId::new(0)), true);
        assert!(dominates(&parent, &child, false));

        let g1 = label(true, LabelOptions::default().in_repeat_group(1, 10.0));
        let g2 = label(true, LabelOptions::default().in_repeat_group(2, 10.0));
        assert!(dominates(&g1, &g2, false));
    }

    #[test]
    fn nan_priority_sorts_last() {
        let nan = label(true, LabelOptions::default().with_priority(f32::NAN));
        let max = label(true, LabelOptions::default());
        assert_eq!(compare(&max, &nan), Ordering::Less);
        assert_eq!(compare(&nan, &nan), Ordering::Equal);
    }

    #[test]
    fn equal_labels_fall_back_to_default() {
        let a = label(true, LabelOptions::default());
        let b = label(true, LabelOptions::default());
        assert!(dominates(&a, &b, true));
        assert!(!dominates(&a, &b, false));
    }

    #[test]
    fn candidate_priority_within_kind_only() {
        let mut icon = label(true, LabelOptions::default());
        let mut text = label(false, LabelOptions::default());
        icon.core_mut().set_candidate_priority(9);
        text.core_mut().set_candidate_priority(0);
        // Icons rank before text regardless of candidate priority.
        assert!(dominates(&icon, &text, false));

        let mut other = label(true, LabelOptions::default());
        other.core_mut().set_candidate_priority(3);
        assert!(dominates(&other, &icon, false));
    }

    #[test]
    fn random_labels_form_a_strict_weak_order() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let labels: Vec<MapLabel> = (0..48)
            .map(|_| {
                let options = LabelOptions::default()
                    .with_priority(f32::from(rng.random_range(0_u8..3)))
                    .in_repeat_group(rng.random_range(0..3), 0.0);
                let mut l = label(rng.random_bool(0.5), options);
                if rng.random_bool(0.3) {
                    l.core_mut().set_relative(Some(LabelId::new(0)), true);
                }
                l.core_mut().set_candidate_priority(rng.random_range(0..3));
                l.core_mut().set_hash(rng.random_range(0..3));
                l
            })
            .collect();

        for a in &labels {
            assert_eq!(compare(a, a), Ordering::Equal);
            for b in &labels {
                assert_eq!(compare(a, b), compare(b, a).reverse());
                for c in &labels {
                    if compare(a, b) == Ordering::Less && compare(b, c) == Ordering::Less {
                        assert_eq!(compare(a, c), Ordering::Less);
                    }
                    if compare(a, b) == Ordering::Equal && compare(b, c) == Ordering::Equal {
                        assert_eq!(compare(a, c), Ordering::Equal);
                    }
                }
            }
        }
    }
}
