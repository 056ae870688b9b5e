//! Autonomous scroll driver — one per column.
//!
//! The driver owns its column's scroll offset.  Each frame it advances the
//! offset by `speed × dt` in its drift direction and wraps it around the
//! scrollable range, then writes the result to the viewport.  The wrap is
//! modular, so no distance is lost or counted twice across the seam.

use serde::{Deserialize, Serialize};

use super::clock::{sanitize_dt, CancelToken, Tick};
use super::viewport::Viewport;

/// Which way the content drifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Content moves up; the offset grows and new cards appear at the bottom.
    Up,
    /// Content moves down; the offset shrinks.
    Down,
}

impl Direction {
    /// Alternate per column so neighbours drift against each other.
    pub fn for_column(index: usize) -> Self {
        if index % 2 == 0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    /// Boundary the column starts from, so the first frame never jump-cuts.
    fn start_offset(self, max_scroll: f64) -> f64 {
        match self {
            Direction::Up => 0.0,
            Direction::Down => max_scroll,
        }
    }
}

/// Speed (rows per second) and direction of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub speed: f64,
    pub direction: Direction,
}

impl Motion {
    pub fn new(speed: f64, direction: Direction) -> Self {
        let speed = if speed.is_finite() { speed.max(0.0) } else { 0.0 };
        Self { speed, direction }
    }

    /// Deterministic per-column speed: `base + spread × frac(index × φ)`.
    /// The golden-ratio stride keeps neighbouring columns visibly out of step.
    pub fn for_column(index: usize, base: f64, spread: f64) -> Self {
        const PHI: f64 = 0.618_033_988_749_895;
        let jitter = (index as f64 * PHI + 0.5).fract();
        Self::new(base + spread * jitter, Direction::for_column(index))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Uninitialized,
    Running,
    Stopped,
}

#[derive(Debug)]
pub struct ScrollDriver {
    state: DriverState,
    motion: Motion,
    offset: f64,
    /// Whether the offset has been placed at its starting boundary.  Waits
    /// for the first frame with a positive scroll range.
    placed: bool,
    /// Total distance travelled, ignoring wraps.
    travelled: f64,
    cancel: CancelToken,
}

impl ScrollDriver {
    pub fn new(motion: Motion) -> Self {
        Self {
            state: DriverState::Uninitialized,
            motion,
            offset: 0.0,
            placed: false,
            travelled: 0.0,
            cancel: CancelToken::new(),
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn travelled(&self) -> f64 {
        self.travelled
    }

    /// Token that stops this driver's loop when cancelled.
    #[cfg(test)]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Enter `Running`.  With a known scroll range the offset is placed at the
    /// direction's boundary right away; otherwise on the first usable frame.
    pub fn start(&mut self, max_scroll: f64) {
        if self.state == DriverState::Stopped {
            return;
        }
        self.state = DriverState::Running;
        self.placed = false;
        if max_scroll > 0.0 && max_scroll.is_finite() {
            self.place(max_scroll);
        }
    }

    pub fn stop(&mut self) {
        self.cancel.cancel();
        self.state = DriverState::Stopped;
    }

    /// Change speed or direction.  The running loop is cancelled and a fresh
    /// one started from the new direction's boundary.
    pub fn set_motion(&mut self, motion: Motion, max_scroll: f64) {
        if motion == self.motion || self.state == DriverState::Stopped {
            return;
        }
        self.cancel.cancel();
        self.cancel = CancelToken::new();
        self.motion = motion;
        self.state = DriverState::Uninitialized;
        self.start(max_scroll);
    }

    /// Pull the offset back inside `[0, new_max]` after the range changed.
    /// A running driver that was still waiting for a range is placed at its
    /// boundary instead.
    pub fn reclamp(&mut self, old_max: f64, new_max: f64) {
        if !self.placed {
            if self.state == DriverState::Running && new_max > 0.0 && new_max.is_finite() {
                self.place(new_max);
            }
            return;
        }
        self.offset = super::resize::reclamp_offset(self.offset, old_max, new_max);
    }

    /// One animation frame.
    pub fn tick(&mut self, dt: f64, max_scroll: f64, viewport: &mut dyn Viewport) -> Tick {
        if self.cancel.is_cancelled() {
            self.state = DriverState::Stopped;
        }
        match self.state {
            DriverState::Stopped => return Tick::Stop,
            DriverState::Uninitialized => return Tick::Continue,
            DriverState::Running => {}
        }
        // Content fits the viewport: nothing to move, nothing to write.
        if !(max_scroll > 0.0) || !max_scroll.is_finite() {
            return Tick::Continue;
        }

        if !self.placed {
            self.place(max_scroll);
        } else if self.offset > max_scroll || self.offset < 0.0 {
            self.offset = self.offset.clamp(0.0, max_scroll);
        }

        let delta = self.motion.speed * sanitize_dt(dt);
        self.offset = advance(self.offset, delta, max_scroll, self.motion.direction);
        self.travelled += delta;

        if let Err(err) = viewport.set_scroll_offset(self.offset) {
            tracing::trace!(%err, offset = self.offset, "scroll write skipped");
        }
        Tick::Continue
    }

    fn place(&mut self, max_scroll: f64) {
        self.offset = self.motion.direction.start_offset(max_scroll);
        self.placed = true;
    }
}

/// Move `offset` by `delta` and wrap into range.  Upward columns live in
/// `[0, max)`, downward ones in `(0, max]`; both boundaries show the same
/// seam position.
fn advance(offset: f64, delta: f64, max_scroll: f64, direction: Direction) -> f64 {
    match direction {
        Direction::Up => {
            let next = offset + delta;
            if next >= max_scroll {
                next.rem_euclid(max_scroll)
            } else {
                next
            }
        }
        Direction::Down => {
            let next = offset - delta;
            if next <= 0.0 {
                let wrapped = next.rem_euclid(max_scroll);
                if wrapped == 0.0 {
                    max_scroll
                } else {
                    wrapped
                }
            } else {
                next
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::viewport::ScrollSurface;
    use proptest::prelude::*;

    fn running(direction: Direction, speed: f64, max: f64) -> ScrollDriver {
        let mut d = ScrollDriver::new(Motion::new(speed, direction));
        d.start(max);
        d
    }

    /// Distance between two points on a circle of circumference `m`.
    fn circular_gap(a: f64, b: f64, m: f64) -> f64 {
        let d = (a - b).rem_euclid(m);
        d.min(m - d)
    }

    #[test]
    fn upward_column_starts_at_zero_and_grows() {
        let mut surface = ScrollSurface::new(20.0);
        let mut d = running(Direction::Up, 10.0, 100.0);
        assert_eq!(d.offset(), 0.0);
        assert_eq!(d.tick(0.5, 100.0, &mut surface), Tick::Continue);
        assert_eq!(d.offset(), 5.0);
        assert_eq!(surface.scroll_offset(), 5.0);
    }

    #[test]
    fn downward_column_starts_at_max_and_shrinks() {
        let mut surface = ScrollSurface::new(20.0);
        let mut d = running(Direction::Down, 10.0, 100.0);
        assert_eq!(d.offset(), 100.0);
        d.tick(1.0, 100.0, &mut surface);
        assert_eq!(d.offset(), 90.0);
    }

    #[test]
    fn wrap_happens_before_the_write() {
        let mut surface = ScrollSurface::new(20.0);
        let mut d = running(Direction::Up, 30.0, 100.0);
        for _ in 0..3 {
            d.tick(1.0, 100.0, &mut surface);
        }
        assert_eq!(d.offset(), 90.0);
        d.tick(1.0, 100.0, &mut surface);
        assert_eq!(d.offset(), 20.0);
        assert_eq!(surface.scroll_offset(), 20.0);

        let mut d = running(Direction::Down, 30.0, 100.0);
        for _ in 0..4 {
            d.tick(1.0, 100.0, &mut surface);
            assert!(surface.scroll_offset() > 0.0 && surface.scroll_offset() <= 100.0);
        }
        assert_eq!(d.offset(), 80.0);
    }

    #[test]
    fn no_motion_without_scroll_room() {
        let mut surface = ScrollSurface::new(20.0);
        let mut d = running(Direction::Up, 50.0, 0.0);
        for _ in 0..100 {
            assert_eq!(d.tick(0.016, 0.0, &mut surface), Tick::Continue);
            d.tick(0.016, -30.0, &mut surface);
        }
        assert_eq!(d.offset(), 0.0);
        assert_eq!(surface.scroll_offset(), 0.0);
    }

    #[test]
    fn placement_waits_for_layout() {
        let mut surface = ScrollSurface::new(0.0);
        let mut d = running(Direction::Down, 10.0, 0.0);
        d.tick(0.1, 0.0, &mut surface);
        assert_eq!(d.offset(), 0.0);
        d.tick(0.1, 50.0, &mut surface);
        assert_eq!(d.offset(), 49.0);
    }

    #[test]
    fn bad_frame_deltas_pause_instead_of_jumping() {
        let mut surface = ScrollSurface::new(20.0);
        let mut d = running(Direction::Up, 10.0, 100.0);
        d.tick(f64::NAN, 100.0, &mut surface);
        d.tick(-3.0, 100.0, &mut surface);
        d.tick(f64::INFINITY, 100.0, &mut surface);
        assert_eq!(d.offset(), 0.0);
    }

    #[test]
    fn write_failures_are_ignored_and_retried() {
        let mut surface = ScrollSurface::new(20.0);
        let mut d = running(Direction::Up, 10.0, 100.0);
        surface.detach();
        assert_eq!(d.tick(1.0, 100.0, &mut surface), Tick::Continue);
        assert_eq!(d.offset(), 10.0);
        assert_eq!(surface.scroll_offset(), 0.0);
    }

    #[test]
    fn cancelled_driver_stops_and_stays_stopped() {
        let mut surface = ScrollSurface::new(20.0);
        let mut d = running(Direction::Up, 10.0, 100.0);
        d.tick(1.0, 100.0, &mut surface);
        d.cancel_token().cancel();
        assert_eq!(d.tick(1.0, 100.0, &mut surface), Tick::Stop);
        assert_eq!(d.state(), DriverState::Stopped);
        assert_eq!(surface.scroll_offset(), 10.0);
        d.start(100.0);
        assert_eq!(d.tick(1.0, 100.0, &mut surface), Tick::Stop);
    }

    #[test]
    fn motion_change_restarts_from_the_new_boundary() {
        let mut surface = ScrollSurface::new(20.0);
        let mut d = running(Direction::Up, 10.0, 100.0);
        d.tick(2.0, 100.0, &mut surface);
        let old_token = d.cancel_token();

        d.set_motion(Motion::new(10.0, Direction::Down), 100.0);
        assert!(old_token.is_cancelled());
        assert_eq!(d.state(), DriverState::Running);
        assert_eq!(d.offset(), 100.0);
        assert_eq!(d.tick(1.0, 100.0, &mut surface), Tick::Continue);
        assert_eq!(d.offset(), 90.0);
    }

    #[test]
    fn reclamp_places_a_driver_still_waiting_for_layout() {
        let mut d = running(Direction::Down, 10.0, 0.0);
        d.reclamp(0.0, 80.0);
        assert_eq!(d.offset(), 80.0);

        let mut stopped = running(Direction::Down, 10.0, 0.0);
        stopped.stop();
        stopped.reclamp(0.0, 80.0);
        assert_eq!(stopped.offset(), 0.0);
    }

    #[test]
    fn reclamp_pulls_offset_into_a_smaller_range() {
        let mut surface = ScrollSurface::new(20.0);
        let mut d = running(Direction::Up, 10.0, 100.0);
        d.tick(8.0, 100.0, &mut surface);
        d.reclamp(100.0, 40.0);
        assert!((d.offset() - 32.0).abs() < 1e-9);
    }

    #[test]
    fn column_motion_is_deterministic_and_alternates() {
        let a = Motion::for_column(0, 1.0, 0.5);
        let b = Motion::for_column(1, 1.0, 0.5);
        assert_eq!(a, Motion::for_column(0, 1.0, 0.5));
        assert_eq!(a.direction, Direction::Up);
        assert_eq!(b.direction, Direction::Down);
        assert!(a.speed >= 1.0 && a.speed < 1.5);
        assert_ne!(a.speed, b.speed);
    }

    proptest! {
        #[test]
        fn wrapping_conserves_distance(
            speed in 0.5f64..40.0,
            max in 1.0f64..500.0,
            frames in 1usize..2_000,
            dt in 0.001f64..0.1,
        ) {
            let mut surface = ScrollSurface::new(10.0);
            let mut d = running(Direction::Up, speed, max);
            for _ in 0..frames {
                d.tick(dt, max, &mut surface);
            }
            let expected = (speed * dt * frames as f64).rem_euclid(max);
            prop_assert!(d.offset() >= 0.0 && d.offset() < max);
            prop_assert!(circular_gap(d.offset(), expected, max) < 1e-6 * (1.0 + frames as f64));
        }

        #[test]
        fn downward_wrapping_conserves_distance(
            speed in 0.5f64..40.0,
            max in 1.0f64..500.0,
            frames in 1usize..2_000,
            dt in 0.001f64..0.1,
        ) {
            let mut surface = ScrollSurface::new(10.0);
            let mut d = running(Direction::Down, speed, max);
            for _ in 0..frames {
                d.tick(dt, max, &mut surface);
            }
            let expected = (max - speed * dt * frames as f64).rem_euclid(max);
            prop_assert!(d.offset() > 0.0 && d.offset() <= max);
            prop_assert!(circular_gap(d.offset(), expected, max) < 1e-6 * (1.0 + frames as f64));
        }
    }
}
