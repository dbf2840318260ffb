//! Viewport collaborator: current pixel size and height negotiation.

use std::sync::atomic::{AtomicI32, Ordering};

/// Supplies the current viewport size and negotiates the graph height.
///
/// Implementations are read from whichever thread validates the graph.
pub trait Viewport: Send + Sync {
    /// Current width in pixels.
    fn width(&self) -> i32;

    /// Current height in pixels.
    fn height(&self) -> i32;

    /// Accepts a requested graph height, returning the height granted.
    ///
    /// The default grants every request unchanged.
    fn accept_height(&self, requested: i32) -> i32 {
        requested
    }
}

/// A viewport with an explicitly set size.
///
/// The size can be changed from any thread; an optional height limit turns
/// it into a clamping negotiator.
#[derive(Debug)]
pub struct FixedViewport {
    width: AtomicI32,
    height: AtomicI32,
    height_limits: Option<(i32, i32)>,
}

impl FixedViewport {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: AtomicI32::new(width.max(0)),
            height: AtomicI32::new(height.max(0)),
            height_limits: None,
        }
    }

    /// Clamps every granted height into `[min, max]`.
    pub fn with_height_limits(mut self, min: i32, max: i32) -> Self {
        self.height_limits = Some((min.min(max), max.max(min)));
        self
    }

    pub fn set_size(&self, width: i32, height: i32) {
        self.set_width(width);
        self.set_height(height);
    }

    pub fn set_width(&self, width: i32) {
        self.width.store(width.max(0), Ordering::Release);
    }

    pub fn set_height(&self, height: i32) {
        self.height.store(height.max(0), Ordering::Release);
    }
}

impl Viewport for FixedViewport {
    fn width(&self) -> i32 {
        self.width.load(Ordering::Acquire)
    }

    fn height(&self) -> i32 {
        self.height.load(Ordering::Acquire)
    }

    fn accept_height(&self, requested: i32) -> i32 {
        match self.height_limits {
            Some((min, max)) => requested.clamp(min, max),
            None => requested,
        }
    }
}
