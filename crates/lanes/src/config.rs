//! Configuration types for the Lanes layout engine.
//!
//! This module provides configuration structures that control how rows are
//! scaled to pixels and how time ranges are projected. All types implement
//! [`serde::Deserialize`] with every field defaulted, so a partial TOML
//! document is a valid configuration.
//!
//! # Overview
//!
//! - [`EngineConfig`] - Top-level configuration combining layout and axis settings.
//! - [`LayoutConfig`] - Vertical scaling: line heights, pixel height limits, margins.
//! - [`AxisConfig`] - Horizontal projection: minimum group width, logarithmic band ratio.
//!
//! # Example
//!
//! ```
//! # use lanes::config::EngineConfig;
//! let config = EngineConfig::default();
//! assert_eq!(config.layout().min_pixel_height(), 10);
//! assert_eq!(config.layout().max_pixel_height(), 300);
//! ```

use serde::Deserialize;

/// Top-level engine configuration combining layout and axis settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Axis configuration section.
    #[serde(default)]
    axis: AxisConfig,
}

impl EngineConfig {
    /// Creates a new [`EngineConfig`] with the specified sections.
    ///
    /// # Arguments
    ///
    /// * `layout` - Vertical scaling settings.
    /// * `axis` - Time projection settings.
    pub fn new(layout: LayoutConfig, axis: AxisConfig) -> Self {
        Self { layout, axis }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the axis configuration.
    pub fn axis(&self) -> &AxisConfig {
        &self.axis
    }
}

/// Vertical scaling configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Pixels per logical unit when every height is a whole number.
    line_height: f64,

    /// Pixels per logical unit when fractional heights are present.
    fine_line_height: f64,

    /// Smallest pixel height requested for a graph.
    min_pixel_height: i32,

    /// Largest pixel height requested for a graph.
    max_pixel_height: i32,

    /// Pixels kept free below the baseline.
    bottom_margin: i32,

    /// Pixels kept free above the topmost row.
    top_margin: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_height: 20.0,
            fine_line_height: 40.0,
            min_pixel_height: 10,
            max_pixel_height: 300,
            bottom_margin: 0,
            top_margin: 0,
        }
    }
}

impl LayoutConfig {
    /// Returns the coarse pixel-per-unit ratio.
    pub fn line_height(&self) -> f64 {
        self.line_height
    }

    /// Returns the fine pixel-per-unit ratio.
    pub fn fine_line_height(&self) -> f64 {
        self.fine_line_height
    }

    /// Picks the pixel-per-unit ratio for the smallest fractional height
    /// remainder found in a graph.
    pub fn line_height_for(&self, minimal_fragment_height: Option<f64>) -> f64 {
        match minimal_fragment_height {
            Some(_) => self.fine_line_height.max(self.line_height),
            None => self.line_height,
        }
    }

    pub fn min_pixel_height(&self) -> i32 {
        self.min_pixel_height
    }

    pub fn max_pixel_height(&self) -> i32 {
        self.max_pixel_height.max(self.min_pixel_height)
    }

    pub fn bottom_margin(&self) -> i32 {
        self.bottom_margin
    }

    pub fn top_margin(&self) -> i32 {
        self.top_margin
    }

    /// Returns a copy with the given pixel height limits (builder style).
    pub fn with_pixel_height_limits(mut self, min: i32, max: i32) -> Self {
        self.min_pixel_height = min;
        self.max_pixel_height = max;
        self
    }

    /// Returns a copy with the given line heights (builder style).
    pub fn with_line_heights(mut self, coarse: f64, fine: f64) -> Self {
        self.line_height = coarse;
        self.fine_line_height = fine;
        self
    }

    /// Returns a copy with the given margins (builder style).
    pub fn with_margins(mut self, top: i32, bottom: i32) -> Self {
        self.top_margin = top;
        self.bottom_margin = bottom;
        self
    }
}

/// Time projection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    /// Groups narrower than this are widened about their center.
    min_group_pixel_width: i32,

    /// Share of the viewport width given to the linear center band in
    /// logarithmic mode. Applied when an axis is built with
    /// `WindowAxis::from_config`; the graph projects through whatever axis
    /// it was given.
    log_center_ratio: f64,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            min_group_pixel_width: 3,
            log_center_ratio: 0.6,
        }
    }
}

impl AxisConfig {
    pub fn min_group_pixel_width(&self) -> i32 {
        self.min_group_pixel_width.max(0)
    }

    /// Returns the center band ratio clamped to `(0, 1]`.
    pub fn log_center_ratio(&self) -> f64 {
        if self.log_center_ratio.is_finite() && self.log_center_ratio > 0.0 {
            self.log_center_ratio.min(1.0)
        } else {
            AxisConfig::default().log_center_ratio
        }
    }

    /// Returns a copy with the given minimum group width (builder style).
    pub fn with_min_group_pixel_width(mut self, width: i32) -> Self {
        self.min_group_pixel_width = width;
        self
    }

    /// Returns a copy with the given logarithmic center band ratio (builder
    /// style).
    pub fn with_log_center_ratio(mut self, ratio: f64) -> Self {
        self.log_center_ratio = ratio;
        self
    }
}
