//! Logical to pixel mapping for the vertical axis.
//!
//! Virtual pixels are bottom-anchored and independent of the viewport
//! height. Real pixels are top-anchored and flip the virtual axis against the
//! current viewport height.

use log::debug;

use lanes_core::geometry::{LOGICAL_EPSILON, LogicalInterval, PixelInterval};

use super::round_pixel;
use crate::{config::LayoutConfig, viewport::Viewport};

/// Vertical scaling policy taken from [`LayoutConfig`].
#[derive(Debug, Clone, Copy)]
pub struct PositionCalculator {
    min_pixel_height: i32,
    max_pixel_height: i32,
    top_margin: i32,
    bottom_margin: i32,
}

impl PositionCalculator {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            min_pixel_height: config.min_pixel_height(),
            max_pixel_height: config.max_pixel_height(),
            top_margin: config.top_margin(),
            bottom_margin: config.bottom_margin(),
        }
    }

    /// Fixes the logical to virtual mapping for `total` at `line_height`
    /// pixels per logical unit.
    ///
    /// The pixel height needed for the data, plus margins, is clamped into
    /// the configured limits and offered to `viewport`. When the granted
    /// height is smaller than needed, the scale shrinks so the data still
    /// fits.
    pub fn prepare(
        &self,
        total: LogicalInterval,
        line_height: f64,
        viewport: &dyn Viewport,
    ) -> PreparedPositions {
        let margins = self.top_margin + self.bottom_margin;
        let data_pixels = round_pixel(total.size() * line_height);
        let requested = data_pixels
            .saturating_add(margins)
            .clamp(self.min_pixel_height, self.max_pixel_height);
        let granted = viewport.accept_height(requested).max(0);

        let available = f64::from((granted - margins).max(0));
        let scale = if total.size() > LOGICAL_EPSILON {
            line_height.min(available / total.size())
        } else {
            line_height
        };

        debug!(
            data_pixels,
            requested,
            granted,
            scale;
            "Prepared vertical positions"
        );

        PreparedPositions {
            offset: total.begin(),
            scale,
            pixel_height: granted,
            bottom_margin: self.bottom_margin,
        }
    }
}

/// Affine logical to virtual pixel map fixed by [`PositionCalculator::prepare`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PreparedPositions {
    offset: f64,
    scale: f64,
    pixel_height: i32,
    bottom_margin: i32,
}

impl PreparedPositions {
    /// Pixel height granted for the graph.
    pub fn pixel_height(&self) -> i32 {
        self.pixel_height
    }

    /// Pixels per logical unit actually used.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Maps a logical interval to bottom-anchored pixels, clamped at zero.
    pub fn virtual_range(&self, logical: LogicalInterval) -> PixelInterval {
        let low = self.virtual_pixel(logical.begin());
        let high = self.virtual_pixel(logical.end());
        PixelInterval::from_ends(low, high)
    }

    /// Flips a virtual interval into top-anchored pixels for a viewport of
    /// `height` pixels, preserving its size.
    ///
    /// The bottom edge lands at `height - bottom_margin - virtual.begin`.
    pub fn real_range(&self, virtual_range: PixelInterval, height: i32) -> PixelInterval {
        let bottom = height - self.bottom_margin - virtual_range.begin();
        PixelInterval::new(bottom - virtual_range.size(), virtual_range.size())
    }

    fn virtual_pixel(&self, logical: f64) -> i32 {
        round_pixel(self.scale * (logical - self.offset)).max(0)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::viewport::FixedViewport;

    fn calculator() -> PositionCalculator {
        PositionCalculator::new(&LayoutConfig::default())
    }

    #[test]
    fn test_prepare_within_limits() {
        let viewport = FixedViewport::new(800, 600);
        let prepared = calculator().prepare(LogicalInterval::new(0.0, 2.0), 20.0, &viewport);

        assert_eq!(prepared.pixel_height(), 40);
        assert_approx_eq!(f64, prepared.scale(), 20.0);
        assert_eq!(
            prepared.virtual_range(LogicalInterval::new(1.0, 2.0)),
            PixelInterval::new(20, 20)
        );
    }

    #[test]
    fn test_prepare_clamps_to_floor_and_ceiling() {
        let viewport = FixedViewport::new(800, 600);

        let small = calculator().prepare(LogicalInterval::new(0.0, 0.25), 20.0, &viewport);
        assert_eq!(small.pixel_height(), 10);
        assert_approx_eq!(f64, small.scale(), 20.0);

        let large = calculator().prepare(LogicalInterval::new(0.0, 30.0), 20.0, &viewport);
        assert_eq!(large.pixel_height(), 300);
        assert_approx_eq!(f64, large.scale(), 10.0);
    }

    #[test]
    fn test_viewport_overrides_height() {
        let viewport = FixedViewport::new(800, 600).with_height_limits(0, 30);
        let prepared = calculator().prepare(LogicalInterval::new(0.0, 2.0), 20.0, &viewport);

        assert_eq!(prepared.pixel_height(), 30);
        assert_approx_eq!(f64, prepared.scale(), 15.0);
    }

    #[test]
    fn test_negative_logical_offsets_to_zero() {
        let viewport = FixedViewport::new(800, 600);
        let prepared = calculator().prepare(LogicalInterval::new(-1.0, 1.0), 20.0, &viewport);

        assert_eq!(
            prepared.virtual_range(LogicalInterval::new(-1.0, 0.0)),
            PixelInterval::new(0, 20)
        );
        assert_eq!(
            prepared.virtual_range(LogicalInterval::new(0.0, 1.0)),
            PixelInterval::new(20, 20)
        );
    }

    #[test]
    fn test_real_range_flips_axis() {
        let config = LayoutConfig::default().with_margins(0, 5);
        let viewport = FixedViewport::new(800, 600);
        let prepared =
            PositionCalculator::new(&config).prepare(LogicalInterval::new(0.0, 2.0), 20.0, &viewport);

        let bottom_row = prepared.virtual_range(LogicalInterval::new(0.0, 1.0));
        let top_row = prepared.virtual_range(LogicalInterval::new(1.0, 2.0));
        assert_eq!(prepared.real_range(bottom_row, 100), PixelInterval::new(75, 20));
        assert_eq!(prepared.real_range(top_row, 100), PixelInterval::new(55, 20));
    }

    #[test]
    fn test_fractional_rows_round() {
        let viewport = FixedViewport::new(800, 600);
        let prepared = calculator().prepare(LogicalInterval::new(0.0, 1.5), 40.0, &viewport);

        assert_eq!(prepared.pixel_height(), 60);
        assert_eq!(
            prepared.virtual_range(LogicalInterval::new(1.0, 1.5)),
            PixelInterval::new(40, 20)
        );
    }
}
