//! Flat item storage owned by one graph.

use indexmap::IndexMap;
use log::{debug, warn};

use lanes_core::{
    identifier::{GraphHandle, ItemId},
    item::Item,
};

use crate::error::LanesError;

/// Items of one graph keyed by id, in insertion order.
///
/// Every stored item is attached to the registry's owner handle; removed
/// items are detached before they are handed back.
#[derive(Debug)]
pub(crate) struct ItemRegistry {
    owner: GraphHandle,
    items: IndexMap<ItemId, Item>,
}

impl ItemRegistry {
    pub fn new(owner: GraphHandle) -> Self {
        Self {
            owner,
            items: IndexMap::new(),
        }
    }

    /// Adds `item`, returning whether it was inserted.
    ///
    /// A duplicate id is an error unless `ignore_duplicate` is set, in which
    /// case the existing item is kept and `Ok(false)` returned.
    pub fn add(&mut self, mut item: Item, ignore_duplicate: bool) -> Result<bool, LanesError> {
        let id = item.id();
        match item.owner() {
            Some(owner) if owner != self.owner => {
                warn!(item:% = id, owner:%; "Rejected item owned by another graph");
                return Err(LanesError::ItemOwned { item: id, owner });
            }
            _ => {}
        }
        if self.items.contains_key(&id) {
            if ignore_duplicate {
                return Ok(false);
            }
            return Err(LanesError::DuplicateItem(id));
        }

        item.attach(self.owner);
        self.items.insert(id, item);
        debug!(item:% = id, graph:% = self.owner; "Item added");
        Ok(true)
    }

    /// Removes the item with `id`, returning it detached.
    ///
    /// A missing id is an error unless `ignore_missing` is set, in which case
    /// `Ok(None)` is returned.
    pub fn remove(&mut self, id: ItemId, ignore_missing: bool) -> Result<Option<Item>, LanesError> {
        match self.items.shift_remove(&id) {
            Some(mut item) => {
                item.detach();
                debug!(item:% = id, graph:% = self.owner; "Item removed");
                Ok(Some(item))
            }
            None if ignore_missing => Ok(None),
            None => Err(LanesError::MissingItem(id)),
        }
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Detaches and returns every item.
    pub fn into_items(self) -> Vec<Item> {
        self.items
            .into_values()
            .map(|mut item| {
                item.detach();
                item
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ItemRegistry {
        ItemRegistry::new(GraphHandle::allocate())
    }

    #[test]
    fn test_add_attaches_owner() {
        let mut registry = registry();
        assert_eq!(registry.add(Item::new(ItemId::new(1)), false), Ok(true));

        let stored = registry.get(ItemId::new(1)).unwrap();
        assert_eq!(stored.owner(), Some(registry.owner));
    }

    #[test]
    fn test_duplicate_policy() {
        let mut registry = registry();
        registry.add(Item::new(ItemId::new(1)), false).unwrap();

        assert_eq!(
            registry.add(Item::new(ItemId::new(1)).with_order(9), false),
            Err(LanesError::DuplicateItem(ItemId::new(1)))
        );
        assert_eq!(registry.add(Item::new(ItemId::new(1)).with_order(9), true), Ok(false));
        assert_eq!(registry.get(ItemId::new(1)).unwrap().order(), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_missing_policy() {
        let mut registry = registry();
        assert_eq!(
            registry.remove(ItemId::new(4), false),
            Err(LanesError::MissingItem(ItemId::new(4)))
        );
        assert_eq!(registry.remove(ItemId::new(4), true), Ok(None));
    }

    #[test]
    fn test_remove_detaches_and_keeps_order() {
        let mut registry = registry();
        for id in 1..=3 {
            registry.add(Item::new(ItemId::new(id)), false).unwrap();
        }

        let removed = registry.remove(ItemId::new(2), false).unwrap().unwrap();
        assert_eq!(removed.owner(), None);

        let ids: Vec<_> = registry.iter().map(Item::id).collect();
        assert_eq!(ids, vec![ItemId::new(1), ItemId::new(3)]);
    }

    #[test]
    fn test_rejects_item_owned_elsewhere() {
        let mut source = registry();
        let mut target = registry();
        source.add(Item::new(ItemId::new(1)), false).unwrap();
        let held = source.get(ItemId::new(1)).unwrap().clone();

        assert_eq!(
            target.add(held, false),
            Err(LanesError::ItemOwned {
                item: ItemId::new(1),
                owner: source.owner,
            })
        );
        assert_eq!(target.len(), 0);
    }

    #[test]
    fn test_into_items_detaches() {
        let mut registry = registry();
        registry.add(Item::new(ItemId::new(1)), false).unwrap();
        let items = registry.into_items();
        assert_eq!(items.len(), 1);
        assert!(items[0].owner().is_none());
    }
}
