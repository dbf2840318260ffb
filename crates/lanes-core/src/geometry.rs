//! Interval and rectangle types for the layout coordinate spaces.
//!
//! - [`LogicalInterval`]: unitless vertical span, `0` is the baseline and
//!   positive values grow "up".
//! - [`PixelInterval`]: integer pixel span used for horizontal ranges and
//!   for both virtual (bottom-anchored) and real (top-anchored) vertical
//!   ranges.
//! - [`Bounds`]: the final pixel rectangle of a group in real coordinates.

/// Tolerance used when comparing logical coordinates.
pub const LOGICAL_EPSILON: f64 = 1e-9;

/// A closed vertical interval in logical units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LogicalInterval {
    begin: f64,
    end: f64,
}

impl LogicalInterval {
    /// Creates an interval; the ends are swapped if given in reverse order.
    pub fn new(begin: f64, end: f64) -> Self {
        if begin <= end {
            Self { begin, end }
        } else {
            Self {
                begin: end,
                end: begin,
            }
        }
    }

    /// Creates a zero-size interval at `value`.
    pub fn point(value: f64) -> Self {
        Self {
            begin: value,
            end: value,
        }
    }

    /// Returns the lower end.
    pub fn begin(self) -> f64 {
        self.begin
    }

    /// Returns the upper end.
    pub fn end(self) -> f64 {
        self.end
    }

    /// Returns the size of the interval.
    pub fn size(self) -> f64 {
        self.end - self.begin
    }

    /// Returns true when the interval has no measurable size.
    pub fn is_empty(self) -> bool {
        self.size() <= LOGICAL_EPSILON
    }

    /// Returns the smallest interval covering both intervals.
    pub fn union(self, other: LogicalInterval) -> Self {
        Self {
            begin: self.begin.min(other.begin),
            end: self.end.max(other.end),
        }
    }

    /// Returns true when the interiors of both intervals overlap.
    ///
    /// Intervals that merely touch do not overlap.
    pub fn overlaps(self, other: LogicalInterval) -> bool {
        self.begin + LOGICAL_EPSILON < other.end && other.begin + LOGICAL_EPSILON < self.end
    }
}

/// Largest pixel coordinate magnitude the layout produces.
///
/// Projected coordinates are clamped into `[-PIXEL_LIMIT, PIXEL_LIMIT]` so
/// sizes and far edges stay representable as `i32`.
pub const PIXEL_LIMIT: i32 = i32::MAX / 4;

/// A horizontal or vertical pixel span described by its start and size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PixelInterval {
    begin: i32,
    size: i32,
}

impl PixelInterval {
    /// Creates a pixel interval; negative sizes are clamped to zero.
    pub fn new(begin: i32, size: i32) -> Self {
        Self {
            begin,
            size: size.max(0),
        }
    }

    /// Creates a pixel interval from its two ends, in any order.
    pub fn from_ends(a: i32, b: i32) -> Self {
        Self {
            begin: a.min(b),
            size: a.abs_diff(b).min(i32::MAX as u32) as i32,
        }
    }

    /// Returns the first pixel.
    pub fn begin(self) -> i32 {
        self.begin
    }

    /// Returns the size in pixels.
    pub fn size(self) -> i32 {
        self.size
    }

    /// Returns the pixel just past the interval.
    pub fn end(self) -> i32 {
        self.begin.saturating_add(self.size)
    }

    /// Widens the interval symmetrically about its center to at least
    /// `min_size` pixels.
    ///
    /// When the missing amount is odd the extra pixel goes to the end.
    pub fn widen_to(self, min_size: i32) -> Self {
        if self.size >= min_size {
            return self;
        }
        let missing = min_size - self.size;
        Self {
            begin: self.begin.saturating_sub(missing / 2),
            size: min_size,
        }
    }
}

/// A pixel rectangle in real (top-anchored) coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bounds {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl Bounds {
    /// Creates bounds from a horizontal and a vertical pixel interval.
    pub fn from_intervals(horizontal: PixelInterval, vertical: PixelInterval) -> Self {
        Self {
            x: horizontal.begin(),
            y: vertical.begin(),
            width: horizontal.size(),
            height: vertical.size(),
        }
    }

    /// Returns the left edge.
    pub fn x(self) -> i32 {
        self.x
    }

    /// Returns the top edge.
    pub fn y(self) -> i32 {
        self.y
    }

    /// Returns the width.
    pub fn width(self) -> i32 {
        self.width
    }

    /// Returns the height.
    pub fn height(self) -> i32 {
        self.height
    }

    /// Returns the right edge (exclusive).
    pub fn right(self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Returns the bottom edge (exclusive).
    pub fn bottom(self) -> i32 {
        self.y.saturating_add(self.height)
    }
}
