//! Scenario files: a viewport, a time axis and the items to lay out.
//!
//! ```toml
//! [viewport]
//! width = 1200
//! height = 300
//!
//! [axis]
//! mode = "standard"
//! begin = "2024-03-01T10:00:00"
//! end = "2024-03-01T12:00:00"
//!
//! [[items]]
//! id = 1
//! height = 1.0
//! time = { begin = "2024-03-01T10:00:00", end = "2024-03-01T11:00:00" }
//! ```

use std::sync::Arc;

use chrono::NaiveDateTime;
use log::{debug, info};
use serde::Deserialize;

use lanes::{
    AxisMode, FixedViewport, TimeAxis, TimelineGraph, Viewport, WindowAxis,
    config::EngineConfig, item::Item,
};

use crate::error::CliError;

/// A parsed scenario file.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    viewport: ViewportSection,
    axis: AxisSection,
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ViewportSection {
    width: i32,
    height: i32,
}

impl Default for ViewportSection {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct AxisSection {
    #[serde(default)]
    mode: AxisMode,
    begin: NaiveDateTime,
    end: NaiveDateTime,
    /// Width the window spans in standard mode; defaults to the viewport
    /// width.
    reference_width: Option<i32>,
}

impl Scenario {
    /// Parses a scenario from TOML source.
    pub fn parse(source: &str) -> Result<Self, CliError> {
        let scenario: Scenario =
            toml::from_str(source).map_err(|err| CliError::toml("scenario", source, &err))?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), CliError> {
        if self.viewport.width <= 0 || self.viewport.height <= 0 {
            return Err(CliError::Scenario(format!(
                "viewport must have a positive size, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if self.axis.end <= self.axis.begin {
            return Err(CliError::Scenario(String::from(
                "axis end must be after axis begin",
            )));
        }
        Ok(())
    }

    pub fn width(&self) -> i32 {
        self.viewport.width
    }

    pub fn height(&self) -> i32 {
        self.viewport.height
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Builds a graph holding every scenario item.
    ///
    /// # Errors
    ///
    /// Fails on duplicate item ids.
    pub fn into_graph(self, config: EngineConfig) -> Result<TimelineGraph, CliError> {
        let axis = WindowAxis::from_config(
            self.axis.begin,
            self.axis.end,
            self.axis.reference_width.unwrap_or(self.viewport.width),
            config.axis(),
        )
        .with_mode(self.axis.mode)
        .with_name("scenario");
        let viewport = FixedViewport::new(self.viewport.width, self.viewport.height);

        let mut graph = TimelineGraph::new(
            config,
            Arc::new(axis) as Arc<dyn TimeAxis>,
            Arc::new(viewport) as Arc<dyn Viewport>,
        );
        let count = self.items.len();
        for item in self.items {
            graph.add_item(item, false)?;
        }
        info!(items = count, mode:% = self.axis.mode; "Scenario loaded");
        debug!(graph:% = graph.handle(); "Scenario graph ready");
        Ok(graph)
    }
}
