//! Lanes Core Types
//!
//! This crate provides the plain value types shared by the Lanes timeline
//! layout engine. It includes:
//!
//! - **Identifiers**: Item, group and graph handles ([`identifier`] module)
//! - **Time**: Optional-ended time ranges ([`time::TimeRange`])
//! - **Geometry**: Logical and pixel intervals, pixel bounds ([`geometry`] module)
//! - **Items**: The input work item record ([`item::Item`])

pub mod geometry;
pub mod identifier;
pub mod item;
pub mod time;
