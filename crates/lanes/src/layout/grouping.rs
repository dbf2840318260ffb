//! Grouping of items into layers, levels and groups.
//!
//! Items are bucketed by layer (ascending), each layer is classified as
//! uniform-height (every item has an explicit height) or fill (no item has
//! one), then bucketed by level (ascending). Within a level, items sharing a
//! non-zero [`GroupId`] are clustered into one [`Group`]; ungrouped items form
//! singleton groups.
//!
//! Groups are rebuilt from scratch on every call; nothing here is updated
//! incrementally.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use indexmap::IndexMap;
use log::{debug, warn};

use lanes_core::{
    geometry::LogicalInterval,
    identifier::{GroupId, ItemId},
    item::Item,
    time::TimeRange,
};

use crate::error::LanesError;

/// Identity of a derived group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Items of one layer sharing a non-zero group id.
    Cluster { layer: i32, group: GroupId },
    /// An ungrouped item on its own.
    Single(ItemId),
}

impl GroupKey {
    /// Returns the key of the group `item` belongs to.
    pub fn for_item(item: &Item) -> Self {
        if item.group().is_ungrouped() {
            Self::Single(item.id())
        } else {
            Self::Cluster {
                layer: item.layer(),
                group: item.group(),
            }
        }
    }

    /// Returns true when `item` is a member of the group with this key.
    pub fn matches(&self, item: &Item) -> bool {
        *self == Self::for_item(item)
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cluster { layer, group } => write!(f, "{group} on layer {layer}"),
            Self::Single(item) => write!(f, "{item}"),
        }
    }
}

/// One or more items laid out and drawn as a single unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    key: GroupKey,
    layer: i32,
    level: i32,
    order: i32,
    time: TimeRange,
    height: Option<f64>,
    members: Vec<ItemId>,
    logical: LogicalInterval,
    drawable: bool,
}

impl Group {
    fn from_members(key: GroupKey, layer: i32, level: i32, mut members: Vec<&Item>) -> Self {
        members.sort_by(|a, b| {
            a.time()
                .begin()
                .cmp(&b.time().begin())
                .then_with(|| a.id().cmp(&b.id()))
        });

        let time = members
            .iter()
            .map(|item| item.time())
            .reduce(TimeRange::union)
            .unwrap_or_default();
        let height = members
            .iter()
            .try_fold(f64::NEG_INFINITY, |max, item| item.height().map(|h| max.max(h)));
        let order = members.iter().map(|item| item.order()).min().unwrap_or(0);

        Self {
            key,
            layer,
            level,
            order,
            time,
            height,
            members: members.iter().map(|item| item.id()).collect(),
            logical: LogicalInterval::default(),
            drawable: false,
        }
    }

    pub fn key(&self) -> GroupKey {
        self.key
    }

    pub fn layer(&self) -> i32 {
        self.layer
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    /// Smallest sort order among the members.
    pub fn order(&self) -> i32 {
        self.order
    }

    /// Aggregate time: earliest member begin to latest member end.
    pub fn time(&self) -> TimeRange {
        self.time
    }

    /// Largest member height, or `None` in a fill layer.
    pub fn height(&self) -> Option<f64> {
        self.height
    }

    /// Member item ids sorted by begin time.
    pub fn members(&self) -> &[ItemId] {
        &self.members
    }

    /// Assigned logical interval.
    pub fn logical(&self) -> LogicalInterval {
        self.logical
    }

    /// False when the group was placed without claiming space (invalid time
    /// or non-positive height); such groups are never drawn.
    pub fn is_drawable(&self) -> bool {
        self.drawable
    }

    pub(crate) fn place(&mut self, logical: LogicalInterval, drawable: bool) {
        self.logical = logical;
        self.drawable = drawable;
    }
}

/// Whether a layer's items carry explicit heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// Every item has an explicit height; groups are packed by the allocator.
    Uniform,
    /// No item has a height; groups span the full used height.
    Fill,
}

/// Groups of one level, in layout order.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelBucket {
    level: i32,
    groups: Vec<Group>,
}

impl LevelBucket {
    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub(crate) fn groups_mut(&mut self) -> &mut [Group] {
        &mut self.groups
    }
}

/// Levels of one layer, ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerBucket {
    layer: i32,
    kind: LayerKind,
    levels: Vec<LevelBucket>,
}

impl LayerBucket {
    pub fn layer(&self) -> i32 {
        self.layer
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn levels(&self) -> &[LevelBucket] {
        &self.levels
    }

    pub(crate) fn levels_mut(&mut self) -> &mut [LevelBucket] {
        &mut self.levels
    }
}

/// Result of grouping: layers in ascending draw order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grouping {
    layers: Vec<LayerBucket>,
}

impl Grouping {
    pub fn layers(&self) -> &[LayerBucket] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [LayerBucket] {
        &mut self.layers
    }

    /// Iterates groups in paint order: layer, then level, then group order.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.layers
            .iter()
            .flat_map(|layer| layer.levels.iter())
            .flat_map(|level| level.groups.iter())
    }

    /// Consumes the grouping, returning groups in paint order.
    pub fn into_groups(self) -> Vec<Group> {
        self.layers
            .into_iter()
            .flat_map(|layer| layer.levels)
            .flat_map(|level| level.groups)
            .collect()
    }

    /// Returns the group containing `item`, if any.
    pub fn group_of(&self, item: ItemId) -> Option<&Group> {
        self.groups().find(|group| group.members.contains(&item))
    }
}

/// Partitions `items` into layers, levels and groups.
///
/// # Errors
///
/// - [`LanesError::HeightMixing`] when a layer mixes explicit and absent
///   heights.
/// - [`LanesError::GroupSpansLevels`] when items of one group sit on
///   different levels of the same layer.
pub fn build_groups<'a, I>(items: I) -> Result<Grouping, LanesError>
where
    I: IntoIterator<Item = &'a Item>,
{
    let mut by_layer: BTreeMap<i32, Vec<&Item>> = BTreeMap::new();
    for item in items {
        by_layer.entry(item.layer()).or_default().push(item);
    }

    let mut layers = Vec::with_capacity(by_layer.len());
    for (layer, members) in by_layer {
        let kind = classify_layer(layer, &members)?;
        check_group_levels(layer, &members)?;

        let mut by_level: BTreeMap<i32, Vec<&Item>> = BTreeMap::new();
        for item in members {
            by_level.entry(item.level()).or_default().push(item);
        }

        let levels = by_level
            .into_iter()
            .map(|(level, items)| LevelBucket {
                level,
                groups: cluster(layer, level, items),
            })
            .collect();

        layers.push(LayerBucket {
            layer,
            kind,
            levels,
        });
    }

    let grouping = Grouping { layers };
    debug!(
        layers = grouping.layers.len(),
        groups = grouping.groups().count();
        "Items grouped"
    );
    Ok(grouping)
}

fn classify_layer(layer: i32, members: &[&Item]) -> Result<LayerKind, LanesError> {
    let explicit = members
        .iter()
        .filter(|item| item.height().is_some())
        .count();

    if explicit == members.len() {
        Ok(LayerKind::Uniform)
    } else if explicit == 0 {
        Ok(LayerKind::Fill)
    } else {
        warn!(layer, explicit, total = members.len(); "Layer mixes explicit and absent heights");
        Err(LanesError::HeightMixing { layer })
    }
}

fn check_group_levels(layer: i32, members: &[&Item]) -> Result<(), LanesError> {
    let mut levels: HashMap<GroupId, i32> = HashMap::new();
    for item in members.iter().filter(|item| !item.group().is_ungrouped()) {
        let level = *levels.entry(item.group()).or_insert(item.level());
        if level != item.level() {
            warn!(layer, group = item.group().value(); "Group spans several levels");
            return Err(LanesError::GroupSpansLevels {
                group: item.group(),
                layer,
            });
        }
    }
    Ok(())
}

/// Clusters the items of one level and sorts the resulting groups by order,
/// then by begin time. The sort is stable, so remaining ties keep first-seen
/// order.
fn cluster(layer: i32, level: i32, items: Vec<&Item>) -> Vec<Group> {
    let mut clusters: IndexMap<GroupKey, Vec<&Item>> = IndexMap::new();
    for item in items {
        clusters.entry(GroupKey::for_item(item)).or_default().push(item);
    }

    let mut groups: Vec<Group> = clusters
        .into_iter()
        .map(|(key, members)| Group::from_members(key, layer, level, members))
        .collect();
    groups.sort_by(|a, b| {
        a.order
            .cmp(&b.order)
            .then_with(|| a.time.begin().cmp(&b.time.begin()))
    });
    groups
}
