//! Layout stages of the timeline engine.
//!
//! Each stage is a plain function or value type; the [`TimelineGraph`]
//! decides when a stage needs to run again.
//!
//! - [`allocator`]: sweep-line search for free vertical space per layer
//! - [`grouping`]: partition items into layers, levels and groups
//! - [`logical`]: assign logical vertical intervals to groups
//! - [`position`]: map logical intervals to virtual and real pixels
//! - [`projector`]: map time ranges to horizontal pixels and decide visibility
//!
//! [`TimelineGraph`]: crate::TimelineGraph

pub mod allocator;
pub mod grouping;
pub mod logical;
pub mod position;
pub mod projector;

pub use allocator::{Allocation, Growth, OccupiedSet, SpaceAllocator};
pub use grouping::{Group, GroupKey, Grouping, LayerBucket, LayerKind, LevelBucket, build_groups};
pub use logical::{LogicalSummary, assign_logical_y};
pub use position::{PositionCalculator, PreparedPositions};
pub use projector::{ProjectedX, TimeAxisProjector};

use lanes_core::geometry::PIXEL_LIMIT;

/// Rounds a pixel coordinate to the nearest integer, halves away from zero,
/// clamped into `[-PIXEL_LIMIT, PIXEL_LIMIT]`.
pub(crate) fn round_pixel(value: f64) -> i32 {
    let limit = f64::from(PIXEL_LIMIT);
    value.round().clamp(-limit, limit) as i32
}
