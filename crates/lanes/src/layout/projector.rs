//! Horizontal projection of group time ranges.

use lanes_core::{geometry::PixelInterval, time::TimeRange};

use super::round_pixel;
use crate::{
    axis::{AxisMode, TimeAxis},
    config::AxisConfig,
};

/// Horizontal placement of one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectedX {
    range: PixelInterval,
    visible: bool,
}

impl ProjectedX {
    pub fn range(&self) -> PixelInterval {
        self.range
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Projects time ranges through a [`TimeAxis`] at a fixed viewport width.
pub struct TimeAxisProjector<'a> {
    axis: &'a dyn TimeAxis,
    width: i32,
    mode: AxisMode,
    window: TimeRange,
    min_width: i32,
}

impl<'a> TimeAxisProjector<'a> {
    /// Snapshots the axis mode and displayed window for `width` pixels.
    pub fn new(axis: &'a dyn TimeAxis, width: i32, config: &AxisConfig) -> Self {
        Self {
            axis,
            width,
            mode: axis.mode(),
            window: axis.window(width),
            min_width: config.min_group_pixel_width(),
        }
    }

    /// Maps `time` to a pixel range of at least the minimum group width.
    ///
    /// Returns `None` for an invalid time range. In logarithmic mode every
    /// drawable group is visible; otherwise it must intersect the displayed
    /// window.
    pub fn project(&self, time: TimeRange, drawable: bool) -> Option<ProjectedX> {
        let (begin, end) = time.bounds()?;
        let low = round_pixel(self.axis.time_to_pixel(begin, self.width));
        let high = round_pixel(self.axis.time_to_pixel(end, self.width));
        let range = PixelInterval::from_ends(low, high).widen_to(self.min_width);

        let in_window = match self.mode {
            AxisMode::Logarithmic => true,
            AxisMode::Standard | AxisMode::Proportional => time.intersects(self.window),
        };

        Some(ProjectedX {
            range,
            visible: drawable && in_window,
        })
    }
}
