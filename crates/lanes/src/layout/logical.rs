//! Logical vertical placement of groups.
//!
//! Uniform-height layers are packed level by level through one
//! [`SpaceAllocator`] per layer. Fill layers are deferred until every uniform
//! layer is placed and then span `[0, max(1, total.end)]`.

use log::{debug, trace};

use lanes_core::geometry::{LOGICAL_EPSILON, LogicalInterval};

use super::{
    allocator::{Growth, SpaceAllocator},
    grouping::{Grouping, LayerKind},
};

/// Graph-wide totals produced by logical placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogicalSummary {
    total_range: LogicalInterval,
    minimal_fragment_height: Option<f64>,
}

impl Default for LogicalSummary {
    fn default() -> Self {
        Self {
            total_range: LogicalInterval::new(0.0, 1.0),
            minimal_fragment_height: None,
        }
    }
}

impl LogicalSummary {
    /// Union of every logical range used, always covering `[0, 1]`.
    pub fn total_range(&self) -> LogicalInterval {
        self.total_range
    }

    /// Smallest positive fractional remainder among positive heights, if any
    /// height is fractional.
    pub fn minimal_fragment_height(&self) -> Option<f64> {
        self.minimal_fragment_height
    }
}

/// Assigns a logical interval to every group of `grouping`.
pub fn assign_logical_y(grouping: &mut Grouping) -> LogicalSummary {
    let mut total = LogicalInterval::new(0.0, 1.0);
    let mut minimal_fragment_height: Option<f64> = None;

    for bucket in grouping.layers_mut() {
        if bucket.kind() != LayerKind::Uniform {
            continue;
        }

        let layer = bucket.layer();
        let mut allocator = SpaceAllocator::new();
        for level in bucket.levels_mut() {
            allocator.start_level();
            let growth = Growth::for_level(level.level());

            for group in level.groups_mut() {
                let height = group.height().unwrap_or(0.0);
                let allocation = allocator.find_space(group.time(), height, growth);
                group.place(allocation.interval(), allocation.occupies());

                if height > 0.0 {
                    minimal_fragment_height = smaller_fragment(minimal_fragment_height, height);
                }
                trace!(
                    group:% = group.key(),
                    low = allocation.interval().begin(),
                    high = allocation.interval().end(),
                    drawable = allocation.occupies();
                    "Group placed"
                );
            }
        }

        trace!(layer, low = allocator.used().begin(), high = allocator.used().end(); "Layer packed");
        total = total.union(allocator.used());
    }

    let fill = LogicalInterval::new(0.0, total.end().max(1.0));
    for bucket in grouping.layers_mut() {
        if bucket.kind() != LayerKind::Fill {
            continue;
        }
        for level in bucket.levels_mut() {
            for group in level.groups_mut() {
                let drawable = group.time().is_valid();
                group.place(fill, drawable);
            }
        }
    }

    debug!(
        low = total.begin(),
        high = total.end(),
        fragment:? = minimal_fragment_height;
        "Logical placement finished"
    );

    LogicalSummary {
        total_range: total,
        minimal_fragment_height,
    }
}

fn smaller_fragment(current: Option<f64>, height: f64) -> Option<f64> {
    let remainder = height.fract();
    if remainder <= LOGICAL_EPSILON || remainder >= 1.0 - LOGICAL_EPSILON {
        return current;
    }
    Some(current.map_or(remainder, |fragment| fragment.min(remainder)))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
    use float_cmp::assert_approx_eq;

    use lanes_core::{
        identifier::{GroupId, ItemId},
        item::Item,
        time::TimeRange,
    };

    use super::*;
    use crate::layout::grouping::build_groups;

    fn at(minutes: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
            + TimeDelta::minutes(minutes)
    }

    fn item(id: i64, from: i64, to: i64, height: Option<f64>) -> Item {
        Item::new(ItemId::new(id))
            .with_time(TimeRange::bounded(at(from), at(to)))
            .with_height(height)
    }

    fn placed(items: &[Item]) -> (Grouping, LogicalSummary) {
        let mut grouping = build_groups(items).unwrap();
        let summary = assign_logical_y(&mut grouping);
        (grouping, summary)
    }

    fn logical_of(grouping: &Grouping, id: i64) -> LogicalInterval {
        grouping.group_of(ItemId::new(id)).unwrap().logical()
    }

    #[test]
    fn test_overlapping_items_get_disjoint_rows() {
        let items = vec![item(1, 0, 60, Some(1.0)), item(2, 30, 90, Some(1.0))];
        let (grouping, summary) = placed(&items);

        let a = logical_of(&grouping, 1);
        let b = logical_of(&grouping, 2);
        assert_approx_eq!(f64, a.begin(), 0.0);
        assert_approx_eq!(f64, a.end(), 1.0);
        assert_approx_eq!(f64, b.begin(), 1.0);
        assert_approx_eq!(f64, b.end(), 2.0);
        assert!(!a.overlaps(b));
        assert_approx_eq!(f64, summary.total_range().end(), 2.0);
    }

    #[test]
    fn test_fill_layer_alone_spans_unit() {
        let items = vec![item(1, 0, 60, None)];
        let (grouping, summary) = placed(&items);

        let fill = logical_of(&grouping, 1);
        assert_approx_eq!(f64, fill.begin(), 0.0);
        assert_approx_eq!(f64, fill.end(), 1.0);
        assert!(grouping.group_of(ItemId::new(1)).unwrap().is_drawable());
        assert_eq!(summary.total_range(), LogicalInterval::new(0.0, 1.0));
    }

    #[test]
    fn test_fill_layer_spans_used_height() {
        let items = vec![
            item(1, 0, 60, Some(2.0)),
            item(2, 0, 60, Some(1.5)),
            item(3, 0, 60, None).with_layer(-1),
        ];
        let (grouping, _) = placed(&items);

        let fill = logical_of(&grouping, 3);
        assert_approx_eq!(f64, fill.begin(), 0.0);
        assert_approx_eq!(f64, fill.end(), 3.5);
    }

    #[test]
    fn test_negative_levels_grow_down() {
        let items = vec![
            item(1, 0, 60, Some(1.0)).with_level(-1),
            item(2, 0, 60, Some(1.0)),
        ];
        let (grouping, summary) = placed(&items);

        let below = logical_of(&grouping, 1);
        assert_approx_eq!(f64, below.begin(), -1.0);
        assert_approx_eq!(f64, below.end(), 0.0);

        let above = logical_of(&grouping, 2);
        assert_approx_eq!(f64, above.begin(), 0.0);
        assert_approx_eq!(f64, above.end(), 1.0);

        assert_eq!(summary.total_range(), LogicalInterval::new(-1.0, 1.0));
    }

    #[test]
    fn test_layers_do_not_share_space() {
        let items = vec![
            item(1, 0, 60, Some(1.0)),
            item(2, 0, 60, Some(1.0)).with_layer(1),
        ];
        let (grouping, _) = placed(&items);

        assert_eq!(logical_of(&grouping, 1), logical_of(&grouping, 2));
    }

    #[test]
    fn test_group_placed_as_one_unit() {
        let items = vec![
            item(1, 0, 10, Some(1.0)).with_group(GroupId::new(3)),
            item(2, 50, 60, Some(1.0)).with_group(GroupId::new(3)),
            item(3, 20, 30, Some(1.0)),
        ];
        let (grouping, _) = placed(&items);

        // The group spans 0..60 and therefore blocks the singleton in between.
        let group = logical_of(&grouping, 1);
        assert_eq!(group, logical_of(&grouping, 2));
        assert_approx_eq!(f64, logical_of(&grouping, 3).begin(), 1.0);
    }

    #[test]
    fn test_degenerate_group_not_drawable() {
        let items = vec![
            item(1, 0, 60, Some(1.0)),
            item(2, 30, 30, Some(1.0)),
            item(3, 0, 60, Some(0.0)),
        ];
        let (grouping, _) = placed(&items);

        assert!(grouping.group_of(ItemId::new(1)).unwrap().is_drawable());
        for id in [2, 3] {
            let group = grouping.group_of(ItemId::new(id)).unwrap();
            assert!(!group.is_drawable());
            assert!(group.logical().is_empty());
        }
    }

    #[test]
    fn test_minimal_fragment_height() {
        let items = vec![
            item(1, 0, 10, Some(1.0)),
            item(2, 20, 30, Some(2.75)),
            item(3, 40, 50, Some(0.5)),
        ];
        let (_, summary) = placed(&items);
        assert_approx_eq!(f64, summary.minimal_fragment_height().unwrap(), 0.5);

        let whole = vec![item(1, 0, 10, Some(1.0)), item(2, 20, 30, Some(3.0))];
        let (_, summary) = placed(&whole);
        assert!(summary.minimal_fragment_height().is_none());
    }
}
