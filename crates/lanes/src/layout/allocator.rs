//! Sweep-line allocation of vertical space over the time axis.
//!
//! A [`SpaceAllocator`] belongs to one layer. It keeps an ordered map from
//! time breakpoints to the set of logical intervals occupied from that
//! breakpoint until the next one. Finding space for a new group merges every
//! slice its time range touches and scans that summary outward from the
//! level's frontier for the first gap that is large enough.
//!
//! Levels of the same layer share one allocator: each level starts scanning
//! from the space used by all previous levels, so levels stack strictly
//! outward and never reuse gaps left by an earlier level.

use std::{
    collections::BTreeMap,
    ops::Bound::{Excluded, Unbounded},
};

use chrono::NaiveDateTime;
use log::trace;

use lanes_core::{
    geometry::{LOGICAL_EPSILON, LogicalInterval},
    time::TimeRange,
};

/// Direction in which a level claims vertical space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
    /// Toward positive logical values.
    Upward,
    /// Toward negative logical values.
    Downward,
}

impl Growth {
    /// Returns the growth direction of a level: negative levels grow down.
    pub fn for_level(level: i32) -> Self {
        if level < 0 {
            Self::Downward
        } else {
            Self::Upward
        }
    }
}

/// Sorted set of disjoint occupied intervals.
///
/// Touching or overlapping intervals are merged on insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OccupiedSet {
    intervals: Vec<LogicalInterval>,
}

impl OccupiedSet {
    /// Returns the occupied intervals in ascending order.
    pub fn intervals(&self) -> &[LogicalInterval] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Marks `interval` as occupied.
    pub fn insert(&mut self, interval: LogicalInterval) {
        if interval.is_empty() {
            return;
        }

        // First interval that could touch the new one.
        let start = self
            .intervals
            .partition_point(|existing| existing.end() + LOGICAL_EPSILON < interval.begin());
        let mut merged = interval;
        let mut stop = start;
        while stop < self.intervals.len()
            && self.intervals[stop].begin() <= merged.end() + LOGICAL_EPSILON
        {
            merged = merged.union(self.intervals[stop]);
            stop += 1;
        }
        self.intervals.splice(start..stop, [merged]);
    }

    /// Marks every interval of `other` as occupied.
    pub fn merge(&mut self, other: &OccupiedSet) {
        for interval in &other.intervals {
            self.insert(*interval);
        }
    }

    /// Returns the lowest free interval of `size` whose begin is at or above
    /// `from`.
    fn first_gap_upward(&self, from: f64, size: f64) -> LogicalInterval {
        let mut candidate = from;
        for occupied in &self.intervals {
            if occupied.end() <= candidate + LOGICAL_EPSILON {
                continue;
            }
            if occupied.begin() + LOGICAL_EPSILON >= candidate + size {
                break;
            }
            candidate = candidate.max(occupied.end());
        }
        LogicalInterval::new(candidate, candidate + size)
    }

    /// Returns the highest free interval of `size` whose end is at or below
    /// `from`.
    fn first_gap_downward(&self, from: f64, size: f64) -> LogicalInterval {
        let mut candidate = from;
        for occupied in self.intervals.iter().rev() {
            if occupied.begin() + LOGICAL_EPSILON >= candidate {
                continue;
            }
            if occupied.end() <= candidate - size + LOGICAL_EPSILON {
                break;
            }
            candidate = candidate.min(occupied.begin());
        }
        LogicalInterval::new(candidate - size, candidate)
    }
}

/// Result of a space request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation {
    interval: LogicalInterval,
    occupies: bool,
}

impl Allocation {
    /// Returns the assigned logical interval.
    pub fn interval(self) -> LogicalInterval {
        self.interval
    }

    /// Returns false for degenerate placements that claim no space and must
    /// not be drawn at a real extent.
    pub fn occupies(self) -> bool {
        self.occupies
    }
}

/// Per-layer sweep-line allocator.
#[derive(Debug, Clone, Default)]
pub struct SpaceAllocator {
    /// Occupancy from each breakpoint until the next one.
    history: BTreeMap<NaiveDateTime, OccupiedSet>,
    /// Union of everything allocated in this layer.
    used: LogicalInterval,
    /// Snapshot of `used` when the current level started.
    frontier: LogicalInterval,
}

impl SpaceAllocator {
    /// Creates an empty allocator anchored at the baseline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the union of all space allocated so far.
    pub fn used(&self) -> LogicalInterval {
        self.used
    }

    /// Starts a new level: subsequent requests scan outward from the space
    /// used by all previous levels.
    pub fn start_level(&mut self) {
        self.frontier = self.used;
    }

    fn frontier_for(&self, growth: Growth) -> f64 {
        match growth {
            Growth::Upward => self.frontier.end(),
            Growth::Downward => self.frontier.begin(),
        }
    }

    /// Finds and claims the nearest free span of `size` logical units for
    /// `time`, growing in `growth` direction from the level frontier.
    ///
    /// An invalid time range or a non-positive size yields a zero-size
    /// interval at the frontier that claims no space.
    pub fn find_space(&mut self, time: TimeRange, size: f64, growth: Growth) -> Allocation {
        let frontier = self.frontier_for(growth);
        let Some((begin, end)) = time.bounds() else {
            return Self::degenerate(frontier);
        };
        if !size.is_finite() || size <= 0.0 {
            return Self::degenerate(frontier);
        }

        let occupied = self.occupied_during(begin, end);
        let interval = match growth {
            Growth::Upward => occupied.first_gap_upward(frontier, size),
            Growth::Downward => occupied.first_gap_downward(frontier, size),
        };

        self.record(begin, end, interval);
        trace!(
            begin:? = begin,
            end:? = end,
            low = interval.begin(),
            high = interval.end();
            "Allocated space"
        );

        Allocation {
            interval,
            occupies: true,
        }
    }

    fn degenerate(frontier: f64) -> Allocation {
        Allocation {
            interval: LogicalInterval::point(frontier),
            occupies: false,
        }
    }

    /// Merges every slice overlapping `[begin, end)`.
    fn occupied_during(&self, begin: NaiveDateTime, end: NaiveDateTime) -> OccupiedSet {
        let mut summary = OccupiedSet::default();
        if let Some((_, slice)) = self.history.range(..=begin).next_back() {
            summary.merge(slice);
        }
        for (_, slice) in self.history.range((Excluded(begin), Excluded(end))) {
            summary.merge(slice);
        }
        summary
    }

    /// Claims `interval` for every slice inside `[begin, end)`.
    fn record(&mut self, begin: NaiveDateTime, end: NaiveDateTime, interval: LogicalInterval) {
        self.split_at(begin);
        self.split_at(end);
        for (_, slice) in self.history.range_mut(begin..end) {
            slice.insert(interval);
        }
        self.used = self.used.union(interval);
    }

    /// Ensures a breakpoint exists at `time`, inheriting the occupancy of
    /// the slice it splits.
    fn split_at(&mut self, time: NaiveDateTime) {
        if self.history.contains_key(&time) {
            return;
        }
        let inherited = self
            .history
            .range((Unbounded, Excluded(time)))
            .next_back()
            .map(|(_, slice)| slice.clone())
            .unwrap_or_default();
        self.history.insert(time, inherited);
    }
}
