//! Error types for Lanes operations.
//!
//! This module provides the main error type [`LanesError`]. Every variant is
//! a data-integrity error reported to the immediate caller; the operation
//! that returns it performs no structural mutation.

use thiserror::Error;

use lanes_core::identifier::{GraphHandle, GroupId, ItemId};

use crate::layout::GroupKey;

/// The main error type for Lanes operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LanesError {
    #[error("item {0} is already registered")]
    DuplicateItem(ItemId),

    #[error("item {0} is not registered")]
    MissingItem(ItemId),

    #[error("item {item} is owned by {owner}")]
    ItemOwned { item: ItemId, owner: GraphHandle },

    #[error("layer {layer} mixes items with explicit and absent heights")]
    HeightMixing { layer: i32 },

    #[error("group {group} on layer {layer} spans more than one level")]
    GroupSpansLevels { group: GroupId, layer: i32 },

    #[error("group {0} does not exist")]
    MissingGroup(GroupKey),

    #[error("cannot resize group {group}: {reason}")]
    InvalidResize { group: GroupKey, reason: String },

    #[error("graph {0} does not exist")]
    UnknownGraph(GraphHandle),
}

impl LanesError {
    /// Create a new `InvalidResize` error.
    pub fn invalid_resize(group: GroupKey, reason: impl Into<String>) -> Self {
        Self::InvalidResize {
            group,
            reason: reason.into(),
        }
    }
}
