//! Invalidation flags of the cached layout stages.
//!
//! The six layout stages form a fixed dependency order. Invalidating a stage
//! invalidates every stage derived from it; [`Invalidation::closure`] applies
//! the propagation table in a single ordered pass.
//!
//! ```text
//! GROUPING             -> COORDINATE_X | COORDINATE_Y_VIRTUAL | COORDINATE_Y_REAL
//! COORDINATE_Y_VIRTUAL -> COORDINATE_Y_REAL
//! COORDINATE_X         -> BOUNDS
//! COORDINATE_Y_REAL    -> BOUNDS
//! BOUNDS               -> CHILD_LIST
//! ```
//!
//! [`Invalidation::REPAINT`] is not a layout stage and is never implied.

use bitflags::bitflags;

bitflags! {
    /// A set of stale layout stages, plus the repaint request.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Invalidation: u8 {
        /// Layer, level and group partition.
        const GROUPING             = 0b0000_0001;
        /// Horizontal pixel ranges and visibility.
        const COORDINATE_X         = 0b0000_0010;
        /// Logical placement and the bottom-anchored pixel map.
        const COORDINATE_Y_VIRTUAL = 0b0000_0100;
        /// Top-anchored pixel ranges for the current viewport height.
        const COORDINATE_Y_REAL    = 0b0000_1000;
        /// Pixel bounds of each group.
        const BOUNDS               = 0b0001_0000;
        /// Ordered list of visible groups.
        const CHILD_LIST           = 0b0010_0000;
        /// Host should redraw. Set only on explicit request.
        const REPAINT              = 0b0100_0000;

        /// Every layout stage.
        const LAYOUT = Self::GROUPING.bits()
            | Self::COORDINATE_X.bits()
            | Self::COORDINATE_Y_VIRTUAL.bits()
            | Self::COORDINATE_Y_REAL.bits()
            | Self::BOUNDS.bits()
            | Self::CHILD_LIST.bits();
    }
}

/// `(stage, dependents)` in upstream to downstream order.
const PROPAGATION: [(Invalidation, Invalidation); 5] = [
    (
        Invalidation::GROUPING,
        Invalidation::COORDINATE_X
            .union(Invalidation::COORDINATE_Y_VIRTUAL)
            .union(Invalidation::COORDINATE_Y_REAL),
    ),
    (
        Invalidation::COORDINATE_Y_VIRTUAL,
        Invalidation::COORDINATE_Y_REAL,
    ),
    (Invalidation::COORDINATE_X, Invalidation::BOUNDS),
    (Invalidation::COORDINATE_Y_REAL, Invalidation::BOUNDS),
    (Invalidation::BOUNDS, Invalidation::CHILD_LIST),
];

impl Invalidation {
    /// Returns `self` together with every stage depending on it.
    pub fn closure(self) -> Self {
        PROPAGATION
            .iter()
            .fold(self, |flags, &(stage, dependents)| {
                if flags.intersects(stage) {
                    flags | dependents
                } else {
                    flags
                }
            })
    }

    /// Returns only the layout stages of `self`.
    pub fn layout_stages(self) -> Self {
        self & Self::LAYOUT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping_invalidates_every_stage() {
        assert_eq!(Invalidation::GROUPING.closure(), Invalidation::LAYOUT);
    }

    #[test]
    fn test_virtual_reaches_child_list_but_not_x() {
        let closure = Invalidation::COORDINATE_Y_VIRTUAL.closure();
        assert_eq!(
            closure,
            Invalidation::COORDINATE_Y_VIRTUAL
                | Invalidation::COORDINATE_Y_REAL
                | Invalidation::BOUNDS
                | Invalidation::CHILD_LIST
        );
        assert!(!closure.contains(Invalidation::COORDINATE_X));
    }

    #[test]
    fn test_x_leaves_vertical_stages() {
        assert_eq!(
            Invalidation::COORDINATE_X.closure(),
            Invalidation::COORDINATE_X | Invalidation::BOUNDS | Invalidation::CHILD_LIST
        );
    }

    #[test]
    fn test_repaint_is_never_implied() {
        assert!(!Invalidation::LAYOUT.closure().contains(Invalidation::REPAINT));
        assert_eq!(Invalidation::REPAINT.closure(), Invalidation::REPAINT);
        assert_eq!(
            (Invalidation::REPAINT | Invalidation::BOUNDS).layout_stages(),
            Invalidation::BOUNDS
        );
    }

    #[test]
    fn test_closure_is_idempotent() {
        for bits in 0..=Invalidation::all().bits() {
            let flags = Invalidation::from_bits_truncate(bits);
            assert_eq!(flags.closure().closure(), flags.closure());
        }
    }
}
