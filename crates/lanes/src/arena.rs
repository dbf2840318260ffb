//! Ownership of several graphs by handle.

use indexmap::IndexMap;
use log::{debug, warn};

use lanes_core::{
    identifier::{GraphHandle, ItemId},
    item::Item,
};

use crate::{LanesError, graph::TimelineGraph};

/// Owns graphs keyed by their [`GraphHandle`].
///
/// Items refer to their owning graph by handle only, so tearing a graph down
/// never leaves an item pointing at freed state.
#[derive(Default)]
pub struct GraphArena {
    graphs: IndexMap<GraphHandle, TimelineGraph>,
}

impl GraphArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `graph`, returning its handle.
    pub fn insert(&mut self, graph: TimelineGraph) -> GraphHandle {
        let handle = graph.handle();
        self.graphs.insert(handle, graph);
        handle
    }

    pub fn get(&self, handle: GraphHandle) -> Option<&TimelineGraph> {
        self.graphs.get(&handle)
    }

    pub fn get_mut(&mut self, handle: GraphHandle) -> Option<&mut TimelineGraph> {
        self.graphs.get_mut(&handle)
    }

    pub fn handles(&self) -> impl Iterator<Item = GraphHandle> + '_ {
        self.graphs.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Adds `item` to graph `to`, returning whether it was inserted.
    ///
    /// # Errors
    ///
    /// - [`LanesError::UnknownGraph`] when `to` is not in the arena.
    /// - [`LanesError::ItemOwned`] when another graph of the arena already
    ///   holds an item with the same id.
    /// - The errors of [`TimelineGraph::add_item`].
    pub fn add_item(
        &mut self,
        to: GraphHandle,
        item: Item,
        ignore_duplicate: bool,
    ) -> Result<bool, LanesError> {
        let id = item.id();
        if let Some(owner) = self.holder_of(id).filter(|&owner| owner != to) {
            warn!(item:% = id, owner:%, to:%; "Rejected item held by another graph");
            return Err(LanesError::ItemOwned { item: id, owner });
        }
        self.graph_mut(to)?.add_item(item, ignore_duplicate)
    }

    /// Returns the graph holding an item with `id`, if any.
    pub fn holder_of(&self, id: ItemId) -> Option<GraphHandle> {
        self.graphs
            .iter()
            .find(|(_, graph)| graph.item(id).is_some())
            .map(|(&handle, _)| handle)
    }

    /// Removes a graph, releasing its items with their owner cleared.
    pub fn teardown(&mut self, handle: GraphHandle) -> Result<Vec<Item>, LanesError> {
        let graph = self
            .graphs
            .shift_remove(&handle)
            .ok_or(LanesError::UnknownGraph(handle))?;
        Ok(graph.into_items())
    }

    /// Moves item `id` from graph `from` to graph `to`.
    ///
    /// Either the item ends up in `to` or both graphs are left unchanged.
    pub fn transfer_item(
        &mut self,
        from: GraphHandle,
        to: GraphHandle,
        id: ItemId,
    ) -> Result<(), LanesError> {
        if !self.graphs.contains_key(&to) {
            return Err(LanesError::UnknownGraph(to));
        }
        if self.graph_mut(from)?.item(id).is_none() {
            return Err(LanesError::MissingItem(id));
        }
        if from == to {
            return Ok(());
        }
        if self.graphs[&to].item(id).is_some() {
            return Err(LanesError::DuplicateItem(id));
        }

        let Some(item) = self.graph_mut(from)?.remove_item(id, false)? else {
            return Err(LanesError::MissingItem(id));
        };
        if let Err(error) = self.graph_mut(to)?.add_item(item.clone(), false) {
            warn!(item:% = id, from:%, to:%, error:%; "Transfer failed, restoring item");
            self.graph_mut(from)?.add_item(item, true)?;
            return Err(error);
        }
        debug!(item:% = id, from:%, to:%; "Item transferred");
        Ok(())
    }

    fn graph_mut(&mut self, handle: GraphHandle) -> Result<&mut TimelineGraph, LanesError> {
        self.graphs
            .get_mut(&handle)
            .ok_or(LanesError::UnknownGraph(handle))
    }
}
