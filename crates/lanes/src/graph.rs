//! The timeline graph: item storage plus the lazily validated layout cache.
//!
//! A [`TimelineGraph`] owns its items and six cached layout stages. Mutations
//! and external changes only mark stages stale; [`TimelineGraph::check_valid`]
//! re-derives the stale stages in dependency order under one lock:
//!
//! 1. grouping ([`build_groups`])
//! 2. virtual Y ([`assign_logical_y`] and [`PositionCalculator::prepare`])
//! 3. X ([`TimeAxisProjector`])
//! 4. real Y ([`PreparedPositions::real_range`])
//! 5. pixel bounds
//! 6. visible child list
//!
//! Changes of the axis identity, axis mode or viewport width mark X stale;
//! a viewport height change marks real Y stale.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, AtomicU8, Ordering},
};

use chrono::NaiveDateTime;
use log::{debug, trace};

use lanes_core::{
    geometry::{Bounds, LogicalInterval, PixelInterval},
    identifier::{GraphHandle, ItemId},
    item::Item,
    time::{TimeRange, offset_by_seconds, seconds_between},
};

use crate::{
    axis::{AxisMode, TimeAxis},
    config::EngineConfig,
    error::LanesError,
    invalidation::Invalidation,
    layout::{
        Group, GroupKey, Grouping, LogicalSummary, PositionCalculator, PreparedPositions,
        ProjectedX, TimeAxisProjector, assign_logical_y, build_groups, round_pixel,
    },
    registry::ItemRegistry,
    viewport::Viewport,
};

/// Number of times each layout stage has been recomputed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecomputeStats {
    pub grouping: u64,
    pub coordinate_x: u64,
    pub coordinate_y_virtual: u64,
    pub coordinate_y_real: u64,
    pub bounds: u64,
    pub child_list: u64,
}

/// A group with its derived pixel geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutGroup {
    group: Group,
    x: Option<PixelInterval>,
    visible: bool,
    y_virtual: PixelInterval,
    y_real: PixelInterval,
    bounds: Option<Bounds>,
}

impl LaidOutGroup {
    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn key(&self) -> GroupKey {
        self.group.key()
    }

    /// Horizontal pixel range, absent for an invalid time range.
    pub fn x(&self) -> Option<PixelInterval> {
        self.x
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Bottom-anchored vertical pixel range.
    pub fn y_virtual(&self) -> PixelInterval {
        self.y_virtual
    }

    /// Top-anchored vertical pixel range.
    pub fn y_real(&self) -> PixelInterval {
        self.y_real
    }

    /// Pixel rectangle, present only for drawable groups with an X range.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }
}

/// External inputs observed by the last successful validation.
#[derive(Debug, Clone, PartialEq)]
struct Environment {
    axis_identity: String,
    axis_mode: AxisMode,
    width: i32,
    height: i32,
}

impl Environment {
    fn capture(axis: &dyn TimeAxis, viewport: &dyn Viewport) -> Self {
        Self {
            axis_identity: axis.identity(),
            axis_mode: axis.mode(),
            width: viewport.width(),
            height: viewport.height(),
        }
    }
}

#[derive(Debug)]
struct LayoutCache {
    stale: Invalidation,
    environment: Option<Environment>,
    grouping: Grouping,
    summary: LogicalSummary,
    positions: PreparedPositions,
    y_virtual: Vec<PixelInterval>,
    x: Vec<Option<ProjectedX>>,
    y_real: Vec<PixelInterval>,
    laid_out: Vec<LaidOutGroup>,
    children: Arc<[LaidOutGroup]>,
    stats: RecomputeStats,
}

impl LayoutCache {
    fn new() -> Self {
        Self {
            stale: Invalidation::LAYOUT,
            environment: None,
            grouping: Grouping::default(),
            summary: LogicalSummary::default(),
            positions: PreparedPositions::default(),
            y_virtual: Vec::new(),
            x: Vec::new(),
            y_real: Vec::new(),
            laid_out: Vec::new(),
            children: Arc::from(Vec::new()),
            stats: RecomputeStats::default(),
        }
    }

    fn environment_changes(&self, current: &Environment) -> Invalidation {
        let Some(previous) = &self.environment else {
            return Invalidation::LAYOUT;
        };

        let mut changes = Invalidation::empty();
        if previous.axis_identity != current.axis_identity
            || previous.axis_mode != current.axis_mode
            || previous.width != current.width
        {
            changes |= Invalidation::COORDINATE_X;
        }
        if previous.height != current.height {
            changes |= Invalidation::COORDINATE_Y_REAL;
        }
        changes
    }
}

/// A set of timeline items with a lazily validated layout.
///
/// Structural mutation takes `&mut self`. Validation, invalidation and reads
/// take `&self` and may run on any thread; the layout cache is guarded by a
/// single lock per graph.
pub struct TimelineGraph {
    handle: GraphHandle,
    config: EngineConfig,
    axis: Arc<dyn TimeAxis>,
    viewport: Arc<dyn Viewport>,
    items: ItemRegistry,
    pending: AtomicU8,
    repaint: AtomicBool,
    cache: Mutex<LayoutCache>,
}

impl TimelineGraph {
    /// Creates an empty graph laid out against `axis` and `viewport`.
    pub fn new(config: EngineConfig, axis: Arc<dyn TimeAxis>, viewport: Arc<dyn Viewport>) -> Self {
        let handle = GraphHandle::allocate();
        debug!(graph:% = handle; "Graph created");
        Self {
            handle,
            config,
            axis,
            viewport,
            items: ItemRegistry::new(handle),
            pending: AtomicU8::new(0),
            repaint: AtomicBool::new(false),
            cache: Mutex::new(LayoutCache::new()),
        }
    }

    pub fn handle(&self) -> GraphHandle {
        self.handle
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn axis(&self) -> &Arc<dyn TimeAxis> {
        &self.axis
    }

    pub fn viewport(&self) -> &Arc<dyn Viewport> {
        &self.viewport
    }

    /// Marks `flags` and everything derived from them stale.
    ///
    /// [`Invalidation::REPAINT`] only raises the repaint request; it never
    /// invalidates a layout stage.
    pub fn invalidate(&self, flags: Invalidation) {
        if flags.contains(Invalidation::REPAINT) {
            self.repaint.store(true, Ordering::Release);
        }
        let stages = flags.layout_stages().closure();
        if !stages.is_empty() {
            self.pending.fetch_or(stages.bits(), Ordering::AcqRel);
            trace!(graph:% = self.handle, flags:? = stages; "Invalidated");
        }
    }

    /// Returns and clears the repaint request.
    pub fn take_repaint(&self) -> bool {
        self.repaint.swap(false, Ordering::AcqRel)
    }

    /// Re-derives every stale layout stage.
    ///
    /// # Errors
    ///
    /// Returns the grouping error when the items cannot be grouped; the
    /// previous layout is kept and every stage stays stale.
    pub fn check_valid(&self) -> Result<(), LanesError> {
        self.validated().map(drop)
    }

    /// Locks the cache and brings it up to date, returning the guard so
    /// readers see the layout they just validated.
    fn validated(&self) -> Result<MutexGuard<'_, LayoutCache>, LanesError> {
        let mut guard = self.lock_cache();
        self.revalidate(&mut guard)?;
        Ok(guard)
    }

    fn revalidate(&self, cache: &mut LayoutCache) -> Result<(), LanesError> {
        let pending = Invalidation::from_bits_truncate(self.pending.swap(0, Ordering::AcqRel));
        let environment = Environment::capture(self.axis.as_ref(), self.viewport.as_ref());
        let stale = (cache.stale | pending | cache.environment_changes(&environment)).closure();
        if stale.is_empty() {
            return Ok(());
        }
        cache.stale = stale;
        debug!(graph:% = self.handle, stale:?; "Validating layout");

        if stale.contains(Invalidation::GROUPING) {
            cache.grouping = build_groups(self.items.iter())?;
            cache.stats.grouping += 1;
        }

        if stale.contains(Invalidation::COORDINATE_Y_VIRTUAL) {
            let summary = assign_logical_y(&mut cache.grouping);
            let line_height = self
                .config
                .layout()
                .line_height_for(summary.minimal_fragment_height());
            let positions = PositionCalculator::new(self.config.layout()).prepare(
                summary.total_range(),
                line_height,
                self.viewport.as_ref(),
            );
            cache.y_virtual = cache
                .grouping
                .groups()
                .map(|group| positions.virtual_range(group.logical()))
                .collect();
            cache.summary = summary;
            cache.positions = positions;
            cache.stats.coordinate_y_virtual += 1;
        }

        if stale.contains(Invalidation::COORDINATE_X) {
            let projector =
                TimeAxisProjector::new(self.axis.as_ref(), environment.width, self.config.axis());
            cache.x = cache
                .grouping
                .groups()
                .map(|group| projector.project(group.time(), group.is_drawable()))
                .collect();
            cache.stats.coordinate_x += 1;
        }

        if stale.contains(Invalidation::COORDINATE_Y_REAL) {
            let positions = cache.positions;
            cache.y_real = cache
                .y_virtual
                .iter()
                .map(|&range| positions.real_range(range, environment.height))
                .collect();
            cache.stats.coordinate_y_real += 1;
        }

        if stale.contains(Invalidation::BOUNDS) {
            cache.laid_out = cache
                .grouping
                .groups()
                .zip(&cache.x)
                .zip(cache.y_virtual.iter().zip(&cache.y_real))
                .map(|((group, &projected), (&y_virtual, &y_real))| {
                    let x = projected.map(|projected| projected.range());
                    let bounds = x
                        .filter(|_| group.is_drawable())
                        .map(|x| Bounds::from_intervals(x, y_real));
                    LaidOutGroup {
                        group: group.clone(),
                        x,
                        visible: projected.is_some_and(|projected| projected.is_visible()),
                        y_virtual,
                        y_real,
                        bounds,
                    }
                })
                .collect();
            cache.stats.bounds += 1;
        }

        if stale.contains(Invalidation::CHILD_LIST) {
            cache.children = cache
                .laid_out
                .iter()
                .filter(|group| group.visible && group.bounds.is_some())
                .cloned()
                .collect();
            cache.stats.child_list += 1;
        }

        debug!(
            graph:% = self.handle,
            groups = cache.laid_out.len(),
            visible = cache.children.len(),
            pixel_height = cache.positions.pixel_height();
            "Layout validated"
        );
        cache.environment = Some(environment);
        cache.stale = Invalidation::empty();
        Ok(())
    }

    /// Returns the visible groups in bottom to top paint order.
    pub fn visible_children(&self) -> Result<Arc<[LaidOutGroup]>, LanesError> {
        Ok(Arc::clone(&self.validated()?.children))
    }

    /// Returns every group, visible or not, in paint order.
    pub fn groups(&self) -> Result<Vec<LaidOutGroup>, LanesError> {
        Ok(self.validated()?.laid_out.clone())
    }

    /// Returns the pixel height granted for the graph.
    pub fn pixel_height(&self) -> Result<i32, LanesError> {
        Ok(self.validated()?.positions.pixel_height())
    }

    /// Returns the logical placement totals.
    pub fn logical_summary(&self) -> Result<LogicalSummary, LanesError> {
        Ok(self.validated()?.summary)
    }

    pub fn logical_range(&self) -> Result<LogicalInterval, LanesError> {
        self.logical_summary().map(|summary| summary.total_range())
    }

    /// Returns the time shown at horizontal pixel `x`.
    pub fn time_for_position(&self, x: i32) -> Option<NaiveDateTime> {
        self.axis.pixel_to_time(f64::from(x), self.viewport.width())
    }

    /// Returns the horizontal pixel of `time`.
    pub fn position_for_time(&self, time: NaiveDateTime) -> Option<i32> {
        let x = self.axis.time_to_pixel(time, self.viewport.width());
        x.is_finite().then(|| round_pixel(x))
    }

    pub fn stats(&self) -> RecomputeStats {
        self.lock_cache().stats
    }

    /// Adds `item` to the graph, returning whether it was inserted.
    ///
    /// # Errors
    ///
    /// - [`LanesError::DuplicateItem`] unless `ignore_duplicate` is set.
    /// - [`LanesError::ItemOwned`] when the item belongs to another graph.
    pub fn add_item(&mut self, item: Item, ignore_duplicate: bool) -> Result<bool, LanesError> {
        let added = self.items.add(item, ignore_duplicate)?;
        if added {
            self.invalidate(Invalidation::GROUPING);
        }
        Ok(added)
    }

    /// Removes the item with `id`, returning it detached from this graph.
    ///
    /// # Errors
    ///
    /// [`LanesError::MissingItem`] unless `ignore_missing` is set.
    pub fn remove_item(&mut self, id: ItemId, ignore_missing: bool) -> Result<Option<Item>, LanesError> {
        let removed = self.items.remove(id, ignore_missing)?;
        if removed.is_some() {
            self.invalidate(Invalidation::GROUPING);
        }
        Ok(removed)
    }

    /// Edits the item with `id` in place. The id and owner cannot change.
    pub fn update_item<F>(&mut self, id: ItemId, edit: F) -> Result<(), LanesError>
    where
        F: FnOnce(&mut Item),
    {
        let handle = self.handle;
        let item = self.items.get_mut(id).ok_or(LanesError::MissingItem(id))?;
        edit(item);
        item.attach(handle);
        self.invalidate(Invalidation::GROUPING);
        Ok(())
    }

    /// Moves and stretches every member of a group so the group spans
    /// `target`.
    ///
    /// Each member keeps its relative position within the group's current
    /// span.
    ///
    /// # Errors
    ///
    /// - [`LanesError::MissingGroup`] when no item belongs to `key`.
    /// - [`LanesError::InvalidResize`] when `target` is empty or unbounded, a
    ///   member lacks a complete time range, or a rescaled time falls outside
    ///   the representable range.
    pub fn resize_group(&mut self, key: GroupKey, target: TimeRange) -> Result<(), LanesError> {
        let (target_begin, target_end) = target
            .bounds()
            .ok_or_else(|| LanesError::invalid_resize(key, "target range is empty or unbounded"))?;

        let members: Vec<(ItemId, NaiveDateTime, NaiveDateTime)> = self
            .items
            .iter()
            .filter(|item| key.matches(item))
            .map(|item| match (item.time().begin(), item.time().end()) {
                (Some(begin), Some(end)) => Ok((item.id(), begin, end)),
                _ => Err(LanesError::invalid_resize(
                    key,
                    format!("member {} has no complete time range", item.id()),
                )),
            })
            .collect::<Result<_, _>>()?;
        if members.is_empty() {
            return Err(LanesError::MissingGroup(key));
        }

        let span = members
            .iter()
            .map(|&(_, begin, end)| TimeRange::bounded(begin, end))
            .reduce(TimeRange::union)
            .unwrap_or_default();
        let Some((span_begin, span_end)) = span.bounds() else {
            return Err(LanesError::invalid_resize(key, "group has an empty time span"));
        };
        let ratio = seconds_between(target_begin, target_end) / seconds_between(span_begin, span_end);

        let rescale = |time: NaiveDateTime| {
            offset_by_seconds(target_begin, seconds_between(span_begin, time) * ratio)
                .ok_or_else(|| LanesError::invalid_resize(key, "rescaled time is out of range"))
        };
        let rescaled = members
            .iter()
            .map(|&(id, begin, end)| Ok((id, TimeRange::bounded(rescale(begin)?, rescale(end)?))))
            .collect::<Result<Vec<_>, LanesError>>()?;
        debug_assert_eq!(rescaled.len(), members.len(), "resize lost group members");

        for (id, time) in rescaled {
            if let Some(item) = self.items.get_mut(id) {
                item.set_time(time);
            }
        }
        debug!(group:% = key, members = members.len(); "Group resized");
        self.invalidate(Invalidation::GROUPING);
        Ok(())
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Tears the graph down, returning its items detached.
    pub fn into_items(self) -> Vec<Item> {
        debug!(graph:% = self.handle, items = self.items.len(); "Graph torn down");
        self.items.into_items()
    }

    fn lock_cache(&self) -> MutexGuard<'_, LayoutCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
