//! The input work item.

use serde::Deserialize;

use crate::{
    identifier::{GraphHandle, GroupId, ItemId},
    time::TimeRange,
};

/// A time-stamped work item placed on the timeline.
///
/// The identifier is fixed at construction. Every other attribute can be
/// changed; the owning graph is told about such changes through its update
/// operation so the layout is recomputed.
///
/// # Example
///
/// ```
/// # use lanes_core::{identifier::{GroupId, ItemId}, item::Item};
/// let item = Item::new(ItemId::new(1))
///     .with_layer(0)
///     .with_level(-1)
///     .with_group(GroupId::new(4))
///     .with_height(Some(1.5));
///
/// assert_eq!(item.level(), -1);
/// assert!(item.owner().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Item {
    id: ItemId,
    #[serde(default)]
    time: TimeRange,
    #[serde(default)]
    layer: i32,
    #[serde(default)]
    level: i32,
    #[serde(default)]
    group: GroupId,
    #[serde(default)]
    height: Option<f64>,
    #[serde(default)]
    order: i32,
    #[serde(skip)]
    owner: Option<GraphHandle>,
}

impl Item {
    /// Creates an ungrouped item on layer 0, level 0 with no time and no
    /// explicit height.
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            time: TimeRange::default(),
            layer: 0,
            level: 0,
            group: GroupId::NONE,
            height: None,
            order: 0,
            owner: None,
        }
    }

    /// Sets the time range (builder style).
    pub fn with_time(mut self, time: TimeRange) -> Self {
        self.time = time;
        self
    }

    /// Sets the layer (builder style).
    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    /// Sets the level (builder style).
    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    /// Sets the group (builder style).
    pub fn with_group(mut self, group: GroupId) -> Self {
        self.group = group;
        self
    }

    /// Sets the explicit height; `None` makes the item fill the used height.
    pub fn with_height(mut self, height: Option<f64>) -> Self {
        self.height = height;
        self
    }

    /// Sets the sort order (builder style).
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn time(&self) -> TimeRange {
        self.time
    }

    /// Draw-order partition; negative layers are background.
    pub fn layer(&self) -> i32 {
        self.layer
    }

    /// Band within the layer; negative levels grow downward.
    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn height(&self) -> Option<f64> {
        self.height
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    /// Returns the graph currently owning this item.
    pub fn owner(&self) -> Option<GraphHandle> {
        self.owner
    }

    pub fn set_time(&mut self, time: TimeRange) {
        self.time = time;
    }

    pub fn set_layer(&mut self, layer: i32) {
        self.layer = layer;
    }

    pub fn set_level(&mut self, level: i32) {
        self.level = level;
    }

    pub fn set_group(&mut self, group: GroupId) {
        self.group = group;
    }

    pub fn set_height(&mut self, height: Option<f64>) {
        self.height = height;
    }

    pub fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    /// Records `owner` as the owning graph.
    ///
    /// Graph registries call this on insertion. Move items between graphs
    /// with `GraphArena::transfer_item` instead.
    #[doc(hidden)]
    pub fn attach(&mut self, owner: GraphHandle) {
        self.owner = Some(owner);
    }

    /// Clears the owning graph. Graph registries call this on removal.
    #[doc(hidden)]
    pub fn detach(&mut self) {
        self.owner = None;
    }
}
