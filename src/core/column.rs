//! One mounted column: bucket, window, driver, and the listeners that keep
//! them consistent.
//!
//! A `Column` is the lifecycle object for everything that belongs to a single
//! drifting column.  Mounting attaches the resize observer and the input
//! suppressor and starts the scroll driver; unmounting (or dropping) stops the
//! driver, detaches the surface, and releases both listeners.  No state is
//! shared between columns.

use super::bucket::{Bucket, Slot};
use super::clock::Tick;
use super::driver::{Motion, ScrollDriver};
use super::recycler;
use super::resize::{LoopPolicy, ResizeSubscription};
use super::suppress::{Disposition, InputSuppression, ScrollInput};
use super::viewport::{ScrollSurface, Viewport};
use super::window::Virtualizer;

/// A card positioned relative to the column's top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedCard {
    /// Render key (the virtual index).
    pub key: usize,
    /// Row of the card's first line relative to the viewport top.  Negative
    /// when the card is partly scrolled out above.
    pub top: f64,
    pub height: f64,
    pub slot: Slot,
}

impl RenderedCard {
    pub fn contains(&self, row: f64) -> bool {
        row >= self.top && row < self.top + self.height
    }
}

#[derive(Debug)]
pub struct Column {
    index: usize,
    bucket: Bucket,
    policy: LoopPolicy,
    virtualizer: Virtualizer,
    driver: ScrollDriver,
    surface: ScrollSurface,
    /// Extent the virtual length and offset were last reconciled against.
    laid_out_extent: f64,
    resize: Option<ResizeSubscription>,
    suppression: Option<InputSuppression>,
}

impl Column {
    pub fn mount(
        index: usize,
        bucket: Bucket,
        motion: Motion,
        policy: LoopPolicy,
        card_height: f64,
        overscan: usize,
    ) -> Self {
        let surface = ScrollSurface::new(0.0);
        let resize = Some(surface.observe_resize());
        let suppression = Some(surface.suppress_input());
        let virtualizer = Virtualizer::new(policy.virtual_length(bucket.len()), card_height, overscan);

        let mut column = Self {
            index,
            bucket,
            policy,
            virtualizer,
            driver: ScrollDriver::new(motion),
            surface,
            laid_out_extent: 0.0,
            resize,
            suppression,
        };
        column
            .surface
            .set_content_extent(column.virtualizer.total_extent());
        column.driver.start(column.max_scroll());

        tracing::debug!(
            column = index,
            bucket = column.bucket.len(),
            virtual_length = column.virtualizer.virtual_length(),
            speed = motion.speed,
            direction = ?motion.direction,
            "column mounted"
        );
        column
    }

    /// Stop the frame loop and release listeners.  Idempotent.
    pub fn unmount(&mut self) {
        if !self.is_mounted() {
            return;
        }
        self.driver.stop();
        self.surface.detach();
        self.resize = None;
        self.suppression = None;
        tracing::debug!(
            column = self.index,
            travelled = self.driver.travelled(),
            "column unmounted"
        );
    }

    pub fn is_mounted(&self) -> bool {
        self.resize.is_some() && self.suppression.is_some()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    pub fn virtual_length(&self) -> usize {
        self.virtualizer.virtual_length()
    }

    pub fn card_height(&self) -> f64 {
        self.virtualizer.item_extent()
    }

    pub fn motion(&self) -> Motion {
        self.driver.motion()
    }

    #[cfg(test)]
    pub fn driver_state(&self) -> super::driver::DriverState {
        self.driver.state()
    }

    /// Offset currently applied to the viewport.
    pub fn scroll_offset(&self) -> f64 {
        self.surface.scroll_offset()
    }

    pub fn viewport_extent(&self) -> f64 {
        self.surface.extent()
    }

    /// Scroll range for the current layout.  Zero until the column has a
    /// height, so the driver doesn't place itself against a phantom range.
    pub fn max_scroll(&self) -> f64 {
        self.max_scroll_for(self.surface.extent())
    }

    fn max_scroll_for(&self, extent: f64) -> f64 {
        if extent > 0.0 {
            self.virtualizer.max_scroll(extent)
        } else {
            0.0
        }
    }

    /// Report the layout height of this column.  A mounted column adopts
    /// the new size right away, so the next render never sees an offset
    /// outside the new range.
    pub fn set_viewport_extent(&mut self, extent: f64) {
        self.surface.set_extent(extent);
        if self.is_mounted() {
            self.apply_pending_resize();
        }
    }

    /// Take the latest size from the resize subscription, if it changed.
    fn apply_pending_resize(&mut self) {
        let resized = self.resize.as_ref().and_then(ResizeSubscription::poll);
        if let Some(extent) = resized.filter(|&e| e != self.laid_out_extent) {
            let previous = self.laid_out_extent;
            self.laid_out_extent = extent;
            self.reconcile(previous);
        }
    }

    /// Swap in a new bucket (items or column assignment changed).
    pub fn rebucket(&mut self, bucket: Bucket) {
        if bucket == self.bucket {
            return;
        }
        self.bucket = bucket;
        self.reconcile(self.laid_out_extent);
    }

    /// Change speed or direction.  The driver's loop restarts from the new
    /// direction's boundary; an unchanged motion is a no-op.
    pub fn set_motion(&mut self, motion: Motion) {
        if motion == self.driver.motion() {
            return;
        }
        let max = self.max_scroll();
        self.driver.set_motion(motion, max);
        self.write_offset(max);
    }

    /// One frame: deliver pending resizes, then advance the driver.
    pub fn tick(&mut self, dt: f64) -> Tick {
        if !self.is_mounted() {
            return Tick::Stop;
        }
        self.apply_pending_resize();
        let max = self.max_scroll();
        self.driver.tick(dt, max, &mut self.surface)
    }

    /// Recompute the virtual length and pull the offset back into range.
    /// `previous_extent` is the viewport size the current offset was valid for.
    fn reconcile(&mut self, previous_extent: f64) {
        let old_max = self.max_scroll_for(previous_extent);
        let virtual_length = self.policy.virtual_length(self.bucket.len());
        self.virtualizer.set_virtual_length(virtual_length);
        self.surface.set_content_extent(self.virtualizer.total_extent());

        let new_max = self.max_scroll();
        self.driver.reclamp(old_max, new_max);
        self.write_offset(new_max);
        tracing::debug!(
            column = self.index,
            extent = self.surface.extent(),
            virtual_length,
            max_scroll = new_max,
            "column reconciled"
        );
    }

    /// Push the driver's offset to the surface outside a frame, so the
    /// visible position follows even when the clock is paused.
    fn write_offset(&mut self, max_scroll: f64) {
        if !(max_scroll > 0.0) {
            return;
        }
        let offset = self.driver.offset();
        if let Err(err) = self.surface.set_scroll_offset(offset) {
            tracing::trace!(%err, offset, "scroll write skipped");
        }
    }

    /// Deliver pointer input to the column's surface.
    pub fn dispatch_input(&mut self, input: ScrollInput) -> Disposition {
        self.surface.dispatch_input(input)
    }

    /// The cards intersecting the viewport (plus overscan), top to bottom.
    pub fn visible_cards(&self) -> Vec<RenderedCard> {
        let offset = self.surface.scroll_offset();
        let mut cards = Vec::new();
        self.virtualizer
            .for_each_item(offset, self.surface.extent(), |item| {
                cards.push(RenderedCard {
                    key: item.key(),
                    top: item.start - offset,
                    height: item.size,
                    slot: recycler::resolve(item.index, &self.bucket),
                });
            });
        cards
    }

    /// The card under `row` (relative to the column top).
    pub fn card_at(&self, row: f64) -> Option<RenderedCard> {
        if row < 0.0 || row >= self.surface.extent() {
            return None;
        }
        self.visible_cards().into_iter().find(|c| c.contains(row))
    }
}

impl Drop for Column {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bucket::assign;
    use crate::core::driver::{Direction, DriverState};

    fn column(bucket: Bucket, direction: Direction) -> Column {
        Column::mount(
            0,
            bucket,
            Motion::new(4.0, direction),
            LoopPolicy::default(),
            6.0,
            2,
        )
    }

    #[test]
    fn nothing_renders_before_layout() {
        let mut col = column(assign(5, 2)[0].clone(), Direction::Up);
        assert_eq!(col.tick(0.1), Tick::Continue);
        assert!(col.visible_cards().is_empty());
        assert_eq!(col.scroll_offset(), 0.0);
    }

    #[test]
    fn first_layout_sizes_the_loop_and_starts_moving() {
        let mut col = column(assign(5, 2)[0].clone(), Direction::Up);
        assert_eq!(col.virtual_length(), 900);
        col.set_viewport_extent(30.0);
        col.tick(0.0);
        assert_eq!(col.max_scroll(), 900.0 * 6.0 - 30.0);
        col.tick(0.5);
        assert_eq!(col.scroll_offset(), 2.0);

        let cards = col.visible_cards();
        // Rows [-10, 44) at offset 2 → slots 0..8 (overscan below only).
        assert_eq!(cards.first().map(|c| c.key), Some(0));
        assert_eq!(cards.len(), 8);
        assert_eq!(cards[1].slot, Slot::Item(2));
        assert_eq!(cards[1].top, 4.0);
    }

    #[test]
    fn downward_column_starts_at_the_bottom() {
        let mut col = column(assign(5, 2)[1].clone(), Direction::Down);
        col.set_viewport_extent(30.0);
        col.tick(0.0);
        assert_eq!(col.scroll_offset(), 600.0 * 6.0 - 30.0);
        let last = col.visible_cards().last().copied();
        assert_eq!(last.map(|c| c.key), Some(599));
        // 599 % 2 == 1 → item 3 (D).
        assert_eq!(last.map(|c| c.slot), Some(Slot::Item(3)));
    }

    #[test]
    fn keys_are_stable_across_frames() {
        let mut col = column(assign(9, 1)[0].clone(), Direction::Up);
        col.set_viewport_extent(24.0);
        col.tick(0.0);
        let before = col.visible_cards();
        col.tick(0.25);
        let after = col.visible_cards();
        for card in &after {
            if let Some(prev) = before.iter().find(|c| c.key == card.key) {
                assert_eq!(prev.slot, card.slot);
                assert!((prev.top - card.top - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn shrinking_the_viewport_keeps_offset_in_range() {
        let mut col = column(assign(1, 1)[0].clone(), Direction::Down);
        col.set_viewport_extent(10.0);
        col.tick(0.0);
        let max_before = col.max_scroll();
        assert_eq!(col.scroll_offset(), max_before);

        col.set_viewport_extent(60.0);
        col.tick(0.0);
        let max_after = col.max_scroll();
        assert!(max_after < max_before);
        assert!(col.scroll_offset() >= 0.0 && col.scroll_offset() <= max_after);
    }

    #[test]
    fn resize_is_applied_before_the_next_frame() {
        let mut col = column(assign(1, 1)[0].clone(), Direction::Down);
        col.set_viewport_extent(10.0);
        col.tick(0.0);

        // No tick in between: the very next render must already fit.
        col.set_viewport_extent(60.0);
        let max = col.max_scroll();
        assert!(col.scroll_offset() >= 0.0 && col.scroll_offset() <= max);
        let bottom = col
            .visible_cards()
            .iter()
            .map(|c| c.top + c.height)
            .fold(f64::MIN, f64::max);
        assert!(bottom >= 60.0);
    }

    #[test]
    fn first_layout_places_the_driver_immediately() {
        let mut col = column(assign(5, 2)[1].clone(), Direction::Down);
        col.set_viewport_extent(30.0);
        assert_eq!(col.scroll_offset(), col.max_scroll());
        assert!(!col.visible_cards().is_empty());
    }

    #[test]
    fn motion_change_restarts_from_the_new_boundary() {
        let mut col = column(assign(3, 1)[0].clone(), Direction::Up);
        col.set_viewport_extent(20.0);
        col.tick(0.0);
        col.tick(2.0);
        assert_eq!(col.scroll_offset(), 8.0);

        col.set_motion(Motion::new(4.0, Direction::Down));
        assert_eq!(col.motion().direction, Direction::Down);
        assert_eq!(col.scroll_offset(), col.max_scroll());
        col.tick(1.0);
        assert_eq!(col.scroll_offset(), col.max_scroll() - 4.0);

        // Same motion again: no restart.
        col.set_motion(Motion::new(4.0, Direction::Down));
        assert_eq!(col.scroll_offset(), col.max_scroll() - 4.0);
    }

    #[test]
    fn writes_to_a_detached_surface_are_skipped() {
        let mut col = column(assign(2, 1)[0].clone(), Direction::Up);
        col.set_viewport_extent(30.0);
        col.tick(1.0);
        let frozen = col.scroll_offset();
        col.unmount();
        // Reconciling against a dead surface must neither panic nor move it.
        col.rebucket(assign(7, 1)[0].clone());
        assert_eq!(col.scroll_offset(), frozen);
    }

    #[test]
    fn resize_bursts_are_tolerated() {
        let mut col = column(assign(4, 1)[0].clone(), Direction::Up);
        for extent in [10.0, 80.0, 0.0, 35.0, 35.0, 12.0] {
            col.set_viewport_extent(extent);
        }
        col.tick(0.1);
        col.tick(0.1);
        assert!(col.scroll_offset() >= 0.0 && col.scroll_offset() <= col.max_scroll());
    }

    #[test]
    fn wheel_input_is_suppressed_but_frames_move() {
        let mut col = column(assign(3, 1)[0].clone(), Direction::Up);
        col.set_viewport_extent(20.0);
        col.tick(0.0);
        col.tick(1.0);
        let before = col.scroll_offset();

        assert_eq!(
            col.dispatch_input(ScrollInput::Wheel { delta: 6.0 }),
            Disposition::Suppressed
        );
        assert_eq!(
            col.dispatch_input(ScrollInput::TouchMove { delta: 3.0 }),
            Disposition::Suppressed
        );
        assert_eq!(col.scroll_offset(), before);

        col.tick(1.0);
        assert!(col.scroll_offset() > before);
    }

    #[test]
    fn unmount_stops_the_loop_and_releases_listeners() {
        let mut col = column(assign(3, 1)[0].clone(), Direction::Up);
        col.set_viewport_extent(20.0);
        col.tick(1.0);
        let frozen = col.scroll_offset();

        col.unmount();
        assert!(!col.is_mounted());
        assert_eq!(col.tick(1.0), Tick::Stop);
        assert_eq!(col.scroll_offset(), frozen);
        assert_eq!(col.driver_state(), DriverState::Stopped);
        // Listeners are gone: native scroll works again on the dead surface.
        assert_eq!(
            col.dispatch_input(ScrollInput::Wheel { delta: 1.0 }),
            Disposition::Scrolled
        );
        col.unmount();
    }

    #[test]
    fn empty_bucket_loops_placeholders_only() {
        let buckets = assign(0, 3);
        for bucket in &buckets[1..] {
            let mut col = column(bucket.clone(), Direction::Up);
            assert_eq!(col.virtual_length(), LoopPolicy::default().min_count);
            col.set_viewport_extent(40.0);
            col.tick(0.5);
            let cards = col.visible_cards();
            assert!(!cards.is_empty());
            assert!(cards.iter().all(|c| c.slot == Slot::Placeholder));
            assert_eq!(col.scroll_offset(), 2.0);
        }
    }

    #[test]
    fn placeholder_bucket_repeats_the_empty_state() {
        let mut col = column(assign(0, 3)[0].clone(), Direction::Up);
        assert_eq!(col.virtual_length(), 600);
        col.set_viewport_extent(40.0);
        col.tick(0.5);
        let cards = col.visible_cards();
        assert!(!cards.is_empty());
        assert!(cards.iter().all(|c| c.slot == Slot::Placeholder));
    }

    #[test]
    fn card_hit_testing() {
        let mut col = column(assign(5, 1)[0].clone(), Direction::Up);
        col.set_viewport_extent(30.0);
        col.tick(0.0);
        let card = col.card_at(7.0);
        assert_eq!(card.map(|c| c.key), Some(1));
        assert_eq!(card.map(|c| c.slot), Some(Slot::Item(1)));
        assert_eq!(col.card_at(-1.0), None);
        assert_eq!(col.card_at(30.0), None);
    }

    #[test]
    fn rebucket_resizes_the_loop() {
        let mut col = column(assign(2, 1)[0].clone(), Direction::Up);
        col.set_viewport_extent(30.0);
        col.tick(2.0);
        assert_eq!(col.virtual_length(), 600);
        col.rebucket(assign(5, 1)[0].clone());
        assert_eq!(col.virtual_length(), 1500);
        assert!(col.scroll_offset() <= col.max_scroll());
    }
}
