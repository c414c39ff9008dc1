// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimum spacing between labels of the same repeat group.
//!
//! Works on a priority-sorted entry list, where each group occupies a
//! contiguous run. Inside a run, any label closer to an earlier (better
//! ranked) surviving label than the group's threshold is occluded.

use crate::collider::LabelEntry;
use crate::label::Label;

/// Filter the groups covering positions `start..=cur` of `order`.
///
/// A nonzero `tile_size` selects model space: centers are compared in
/// tile-local units and the threshold is `max(10, repeat_distance / 10) /
/// tile_size`. With `tile_size == 0` screen centers are compared against
/// `repeat_distance` in pixels, and the scan ends with the group holding
/// `cur`.
///
/// Each group is scanned to its real end, even past `cur`. Returns the last
/// position examined so the next call can resume from there; when `start`
/// is already past `cur` nothing is scanned and `start` is returned.
/// Group `0` means "no group" and is never filtered.
pub(crate) fn filter_repeat_groups<L: Label>(
    labels: &mut [L],
    order: &[LabelEntry],
    start: usize,
    cur: usize,
    tile_size: f64,
) -> usize {
    let Some(last) = order.len().checked_sub(1) else {
        return 0;
    };
    let cur = cur.min(last);
    if start > cur {
        return start;
    }

    let end_group = group_at(labels, order, cur);
    let screen_space = tile_size == 0.0;

    let mut pos = start;
    let mut end = cur;
    while pos <= cur {
        let group = group_at(labels, order, pos);
        let distance = f64::from(labels[order[pos].label.index()].options().repeat_distance);
        let threshold = if screen_space {
            distance
        } else {
            (distance / 10.0).max(10.0) / tile_size
        };
        let threshold2 = threshold * threshold;

        end = pos;
        while end < last && group_at(labels, order, end + 1) == group {
            end += 1;
        }

        if group != 0 {
            for i in pos..end {
                let first = &labels[order[i].label.index()];
                if first.is_occluded() {
                    continue;
                }
                let (model, screen) = (first.model_center(), first.screen_center());
                for entry in &order[i + 1..=end] {
                    let other = &mut labels[entry.label.index()];
                    if other.is_occluded() {
                        continue;
                    }
                    let d2 = if screen_space {
                        (screen - other.screen_center()).hypot2()
                    } else {
                        model.distance_squared(other.model_center())
                    };
                    if d2 < threshold2 {
                        other.occlude();
                    }
                }
            }
        }

        if screen_space && group == end_group {
            break;
        }
        pos = end + 1;
    }
    end
}

fn group_at<L: Label>(labels: &[L], order: &[LabelEntry], pos: usize) -> u32 {
    labels[order[pos].label.index()].options().repeat_group
}
