//! Identifier types for items, groups and graphs.
//!
//! All identifiers are small `Copy` newtypes so they can be used freely as
//! map keys and passed by value.

use std::{
    fmt,
    sync::atomic::{AtomicU32, Ordering},
};

use serde::{Deserialize, Serialize};

/// Unique identifier of an input item.
///
/// The identity of an item never changes after construction; uniqueness is
/// enforced per graph by the item registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(i64);

impl ItemId {
    /// Creates an item identifier from its raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Clustering key shared by items that are laid out as one unit.
///
/// The zero value means "ungrouped": such an item always forms its own
/// singleton group.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GroupId(i64);

impl GroupId {
    /// The "ungrouped" identifier.
    pub const NONE: GroupId = GroupId(0);

    /// Creates a group identifier from its raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    pub fn value(self) -> i64 {
        self.0
    }

    /// Returns true when this is the "ungrouped" identifier.
    pub fn is_ungrouped(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

static NEXT_GRAPH_HANDLE: AtomicU32 = AtomicU32::new(1);

/// Non-owning handle of a timeline graph.
///
/// Items refer to their owning graph through a handle instead of a pointer,
/// so an item that outlives its graph holds a stale handle rather than a
/// dangling reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphHandle(u32);

impl GraphHandle {
    /// Allocates a handle that is unique for the lifetime of the process.
    pub fn allocate() -> Self {
        Self(NEXT_GRAPH_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value.
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for GraphHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "graph-{}", self.0)
    }
}
