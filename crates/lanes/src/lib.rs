//! Lanes - a layout engine for timeline ("Gantt-style") views.
//!
//! Items with optional time ranges are grouped by layer, level and group id,
//! packed into free vertical space and projected onto pixels. The layout is
//! cached in stages and recomputed lazily when items, the time axis or the
//! viewport change.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use chrono::NaiveDate;
//! use lanes::{
//!     FixedViewport, TimelineGraph, WindowAxis, config::EngineConfig,
//!     identifier::ItemId, item::Item, time::TimeRange,
//! };
//!
//! let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let begin = day.and_hms_opt(10, 0, 0).unwrap();
//! let end = day.and_hms_opt(11, 0, 0).unwrap();
//!
//! let mut graph = TimelineGraph::new(
//!     EngineConfig::default(),
//!     Arc::new(WindowAxis::new(begin, end, 600)),
//!     Arc::new(FixedViewport::new(600, 200)),
//! );
//! let item = Item::new(ItemId::new(1))
//!     .with_time(TimeRange::bounded(begin, end))
//!     .with_height(Some(1.0));
//! graph.add_item(item, false).expect("new id");
//!
//! let children = graph.visible_children().expect("valid layout");
//! assert_eq!(children.len(), 1);
//! ```

pub mod config;
pub mod layout;

mod arena;
mod axis;
mod error;
mod graph;
mod invalidation;
mod registry;
mod viewport;

pub use lanes_core::{geometry, identifier, item, time};

pub use arena::GraphArena;
pub use axis::{AxisMode, TimeAxis, WindowAxis};
pub use error::LanesError;
pub use graph::{LaidOutGroup, RecomputeStats, TimelineGraph};
pub use invalidation::Invalidation;
pub use viewport::{FixedViewport, Viewport};
