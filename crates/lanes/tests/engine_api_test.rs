//! Integration tests for the TimelineGraph API
//!
//! These tests drive the engine through its public surface only: items go in,
//! laid out groups come out.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use float_cmp::assert_approx_eq;
use proptest::prelude::*;

use lanes::{
    AxisMode, FixedViewport, GraphArena, Invalidation, LanesError, TimeAxis, TimelineGraph,
    Viewport, WindowAxis,
    config::EngineConfig,
    identifier::{GroupId, ItemId},
    item::Item,
    layout::GroupKey,
    time::TimeRange,
};

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

struct Fixture {
    graph: TimelineGraph,
    axis: Arc<WindowAxis>,
    viewport: Arc<FixedViewport>,
}

/// A graph showing 10:00 to 12:00 across 1200 pixels.
fn fixture(mode: AxisMode) -> Fixture {
    let axis = Arc::new(WindowAxis::new(at(0), at(120), 1200).with_mode(mode));
    let viewport = Arc::new(FixedViewport::new(1200, 300));
    let graph = TimelineGraph::new(
        EngineConfig::default(),
        Arc::clone(&axis) as Arc<dyn TimeAxis>,
        Arc::clone(&viewport) as Arc<dyn Viewport>,
    );
    Fixture {
        graph,
        axis,
        viewport,
    }
}

fn logical_of(graph: &TimelineGraph, id: i64) -> (f64, f64) {
    let groups = graph.groups().expect("valid layout");
    let group = groups
        .iter()
        .find(|group| group.group().members().contains(&ItemId::new(id)))
        .expect("item is grouped");
    let logical = group.group().logical();
    (logical.begin(), logical.end())
}

#[test]
fn test_overlapping_items_stack() {
    let mut fixture = fixture(AxisMode::Standard);
    fixture.graph.add_item(item(1, 0, 60, Some(1.0)), false).unwrap();
    fixture.graph.add_item(item(2, 30, 90, Some(1.0)), false).unwrap();

    let (a_begin, a_end) = logical_of(&fixture.graph, 1);
    let (b_begin, b_end) = logical_of(&fixture.graph, 2);
    assert_approx_eq!(f64, a_begin, 0.0);
    assert_approx_eq!(f64, a_end, 1.0);
    assert_approx_eq!(f64, b_begin, 1.0);
    assert_approx_eq!(f64, b_end, 2.0);

    let children = fixture.graph.visible_children().unwrap();
    let first = children[0].bounds().unwrap();
    let second = children[1].bounds().unwrap();
    assert!(second.bottom() <= first.y(), "rows must not overlap on screen");
}

#[test]
fn test_fill_layer_spans_unit_range() {
    let mut fixture = fixture(AxisMode::Standard);
    fixture.graph.add_item(item(1, 0, 60, None), false).unwrap();

    let (begin, end) = logical_of(&fixture.graph, 1);
    assert_approx_eq!(f64, begin, 0.0);
    assert_approx_eq!(f64, end, 1.0);
    assert_eq!(fixture.graph.visible_children().unwrap().len(), 1);
}

#[test]
fn test_fill_layer_follows_other_layers() {
    let mut fixture = fixture(AxisMode::Standard);
    fixture.graph.add_item(item(1, 0, 60, None).with_layer(-1), false).unwrap();
    for id in 2..5 {
        fixture.graph.add_item(item(id, 0, 60, Some(1.0)), false).unwrap();
    }

    let (begin, end) = logical_of(&fixture.graph, 1);
    assert_approx_eq!(f64, begin, 0.0);
    assert_approx_eq!(f64, end, 3.0);

    // Background layer first in paint order.
    let children = fixture.graph.visible_children().unwrap();
    assert_eq!(children[0].key(), GroupKey::Single(ItemId::new(1)));
    assert_eq!(children[0].bounds().unwrap().height(), 60);
}

#[test]
fn test_logarithmic_mode_shows_items_outside_window() {
    let outside = item(1, -600, -540, Some(1.0));

    let mut standard = fixture(AxisMode::Standard);
    standard.graph.add_item(outside.clone(), false).unwrap();
    assert!(standard.graph.visible_children().unwrap().is_empty());

    let mut logarithmic = fixture(AxisMode::Logarithmic);
    logarithmic.graph.add_item(outside, false).unwrap();
    let children = logarithmic.graph.visible_children().unwrap();
    assert_eq!(children.len(), 1);
    assert!(children[0].bounds().unwrap().width() >= 3);
}

#[test]
fn test_switching_mode_revalidates_visibility() {
    let mut fixture = fixture(AxisMode::Standard);
    fixture.graph.add_item(item(1, -600, -540, Some(1.0)), false).unwrap();
    assert!(fixture.graph.visible_children().unwrap().is_empty());

    fixture.axis.set_mode(AxisMode::Logarithmic);
    assert_eq!(fixture.graph.visible_children().unwrap().len(), 1);
    assert_eq!(fixture.graph.stats().grouping, 1);
}

#[test]
fn test_height_mixing_is_rejected() {
    let mut fixture = fixture(AxisMode::Standard);
    fixture.graph.add_item(item(1, 0, 60, None), false).unwrap();
    fixture.graph.add_item(item(2, 0, 60, Some(2.0)), false).unwrap();

    assert_eq!(
        fixture.graph.visible_children().unwrap_err(),
        LanesError::HeightMixing { layer: 0 }
    );
}

#[test]
fn test_group_spanning_levels_is_rejected() {
    let mut fixture = fixture(AxisMode::Standard);
    let group = GroupId::new(2);
    fixture
        .graph
        .add_item(item(1, 0, 60, Some(1.0)).with_group(group), false)
        .unwrap();
    fixture
        .graph
        .add_item(item(2, 0, 60, Some(1.0)).with_group(group).with_level(1), false)
        .unwrap();

    assert_eq!(
        fixture.graph.check_valid(),
        Err(LanesError::GroupSpansLevels { group, layer: 0 })
    );
}

#[test]
fn test_validation_is_idempotent() {
    let mut fixture = fixture(AxisMode::Standard);
    fixture.graph.add_item(item(1, 0, 60, Some(1.0)), false).unwrap();
    fixture.graph.add_item(item(2, 30, 90, Some(0.5)), false).unwrap();

    let first = fixture.graph.groups().unwrap();
    let stats = fixture.graph.stats();
    let second = fixture.graph.groups().unwrap();

    assert_eq!(first, second);
    assert_eq!(fixture.graph.stats(), stats);
}

#[test]
fn test_grouping_invalidation_recomputes_all_stages() {
    let mut fixture = fixture(AxisMode::Standard);
    fixture.graph.add_item(item(1, 0, 60, Some(1.0)), false).unwrap();
    fixture.graph.check_valid().unwrap();
    let before = fixture.graph.stats();

    fixture.graph.invalidate(Invalidation::GROUPING);
    fixture.graph.visible_children().unwrap();
    let after = fixture.graph.stats();

    assert_eq!(after.grouping, before.grouping + 1);
    assert_eq!(after.coordinate_x, before.coordinate_x + 1);
    assert_eq!(after.coordinate_y_virtual, before.coordinate_y_virtual + 1);
    assert_eq!(after.coordinate_y_real, before.coordinate_y_real + 1);
    assert_eq!(after.bounds, before.bounds + 1);
    assert_eq!(after.child_list, before.child_list + 1);
}

#[test]
fn test_invalidation_from_another_thread() {
    let mut fixture = fixture(AxisMode::Standard);
    fixture.graph.add_item(item(1, 0, 60, Some(1.0)), false).unwrap();
    fixture.graph.check_valid().unwrap();

    let graph = &fixture.graph;
    std::thread::scope(|scope| {
        scope.spawn(|| graph.invalidate(Invalidation::COORDINATE_Y_VIRTUAL));
    });
    graph.check_valid().unwrap();

    let stats = graph.stats();
    assert_eq!(stats.coordinate_y_virtual, 2);
    assert_eq!(stats.coordinate_x, 1);
    assert_eq!(stats.grouping, 1);
}

#[test]
fn test_concurrent_invalidation_never_exposes_partial_layout() {
    let mut fixture = fixture(AxisMode::Standard);
    fixture.graph.add_item(item(1, 0, 60, Some(1.0)), false).unwrap();
    fixture.graph.add_item(item(2, 30, 90, Some(1.0)), false).unwrap();
    fixture.graph.add_item(item(3, 200, 260, Some(1.0)), false).unwrap();

    let bounds_of = |graph: &TimelineGraph| {
        graph
            .visible_children()
            .expect("valid layout")
            .iter()
            .map(|child| child.bounds())
            .collect::<Vec<_>>()
    };
    let expected = bounds_of(&fixture.graph);
    assert_eq!(expected.len(), 2);

    let graph = &fixture.graph;
    let expected = &expected;
    std::thread::scope(|scope| {
        for _ in 0..2 {
            scope.spawn(move || {
                for _ in 0..200 {
                    graph.invalidate(Invalidation::GROUPING | Invalidation::COORDINATE_Y_REAL);
                }
            });
        }
        for _ in 0..3 {
            scope.spawn(move || {
                for _ in 0..200 {
                    assert_eq!(&bounds_of(graph), expected);
                    assert_eq!(graph.pixel_height().unwrap(), 40);
                }
            });
        }
    });

    assert_eq!(&bounds_of(graph), expected);
    let stats = graph.stats();
    assert_eq!(stats.grouping, stats.child_list);
    assert!(stats.grouping >= 2);
}

#[test]
fn test_viewport_resize_moves_rows() {
    let mut fixture = fixture(AxisMode::Proportional);
    fixture.graph.add_item(item(1, 0, 60, Some(1.0)), false).unwrap();
    let before = fixture.graph.visible_children().unwrap()[0].bounds().unwrap();

    fixture.viewport.set_size(600, 100);
    let after = fixture.graph.visible_children().unwrap()[0].bounds().unwrap();

    assert_eq!(before.width(), 600);
    assert_eq!(after.width(), 300);
    assert_eq!(after.bottom(), 100);
    assert_eq!(after.height(), before.height());
}

#[test]
fn test_duplicate_and_missing_policies() {
    let mut fixture = fixture(AxisMode::Standard);
    assert_eq!(fixture.graph.add_item(item(1, 0, 60, Some(1.0)), false), Ok(true));
    assert_eq!(
        fixture.graph.add_item(item(1, 0, 60, Some(1.0)), false),
        Err(LanesError::DuplicateItem(ItemId::new(1)))
    );
    assert_eq!(fixture.graph.add_item(item(1, 0, 60, Some(1.0)), true), Ok(false));

    assert_eq!(
        fixture.graph.remove_item(ItemId::new(9), false),
        Err(LanesError::MissingItem(ItemId::new(9)))
    );
    assert_eq!(fixture.graph.remove_item(ItemId::new(9), true), Ok(None));
    assert_eq!(fixture.graph.len(), 1);
}

#[test]
fn test_degenerate_items_are_not_drawn() {
    let mut fixture = fixture(AxisMode::Standard);
    fixture.graph.add_item(item(1, 0, 60, Some(1.0)), false).unwrap();
    fixture.graph.add_item(item(2, 30, 30, Some(1.0)), false).unwrap();
    fixture.graph.add_item(item(3, 10, 20, Some(0.0)), false).unwrap();
    fixture
        .graph
        .add_item(Item::new(ItemId::new(4)).with_height(Some(1.0)), false)
        .unwrap();

    let children = fixture.graph.visible_children().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].key(), GroupKey::Single(ItemId::new(1)));
    assert_eq!(fixture.graph.groups().unwrap().len(), 4);
}

#[test]
fn test_arena_transfer_relayouts_both_graphs() {
    let mut arena = GraphArena::new();
    let first = arena.insert(fixture(AxisMode::Standard).graph);
    let second = arena.insert(fixture(AxisMode::Standard).graph);
    arena
        .get_mut(first)
        .unwrap()
        .add_item(item(1, 0, 60, Some(1.0)), false)
        .unwrap();
    assert_eq!(arena.get(first).unwrap().visible_children().unwrap().len(), 1);

    arena.transfer_item(first, second, ItemId::new(1)).unwrap();

    assert!(arena.get(first).unwrap().visible_children().unwrap().is_empty());
    assert_eq!(arena.get(second).unwrap().visible_children().unwrap().len(), 1);
}

#[test]
fn test_resize_group_moves_bounds() {
    let mut fixture = fixture(AxisMode::Standard);
    let group = GroupId::new(1);
    fixture
        .graph
        .add_item(item(1, 0, 10, Some(1.0)).with_group(group), false)
        .unwrap();
    fixture
        .graph
        .add_item(item(2, 20, 30, Some(1.0)).with_group(group), false)
        .unwrap();

    let key = GroupKey::Cluster { layer: 0, group };
    fixture
        .graph
        .resize_group(key, TimeRange::bounded(at(60), at(120)))
        .unwrap();

    let children = fixture.graph.visible_children().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].x().unwrap().begin(), 600);
    assert_eq!(children[0].x().unwrap().size(), 600);
    assert_eq!(
        fixture.graph.item(ItemId::new(2)).unwrap().time(),
        TimeRange::bounded(at(100), at(120))
    );
}

#[test]
fn test_pixel_height_prefers_fine_line_height() {
    let mut whole = fixture(AxisMode::Standard);
    whole.graph.add_item(item(1, 0, 60, Some(2.0)), false).unwrap();
    assert_eq!(whole.graph.pixel_height().unwrap(), 40);

    let mut fractional = fixture(AxisMode::Standard);
    fractional.graph.add_item(item(1, 0, 60, Some(1.5)), false).unwrap();
    assert_eq!(fractional.graph.pixel_height().unwrap(), 60);
}

fn check_standard_round_trip(x: i32) -> Result<(), TestCaseError> {
    let fixture = fixture(AxisMode::Standard);
    let time = fixture
        .graph
        .time_for_position(x)
        .ok_or_else(|| TestCaseError::fail("pixel inside the window has a time"))?;
    let back = fixture
        .graph
        .position_for_time(time)
        .ok_or_else(|| TestCaseError::fail("time maps back to a pixel"))?;
    prop_assert!((back - x).abs() <= 1, "x = {x}, back = {back}");
    Ok(())
}

proptest! {
    #[test]
    fn standard_time_pixel_round_trip(x in 0i32..1200) {
        check_standard_round_trip(x)?;
    }
}
