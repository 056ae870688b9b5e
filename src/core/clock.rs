//! Frame scheduling primitives.
//!
//! Every animated thing on the wall is a tick function: it receives the time
//! elapsed since its previous frame and answers whether it wants another.
//! The event loop owns the timer; a [`CancelToken`] lets a column's owner stop
//! its loop synchronously.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Result of one frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Stop,
}

/// Longest frame gap fed into motion integration.  Longer stalls (suspended
/// terminal, debugger) would otherwise teleport every column.
pub const MAX_FRAME_GAP: Duration = Duration::from_millis(250);

/// Shared stop flag for one frame loop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Produces per-frame `dt` values in seconds.
#[derive(Debug, Clone)]
pub struct FrameClock {
    prev: Option<Instant>,
    paused: bool,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            prev: None,
            paused: false,
        }
    }

    /// Seconds since the previous call.  The first call, and every call while
    /// paused, yields `0.0`.
    pub fn tick(&mut self, now: Instant) -> f64 {
        let dt = match self.prev {
            Some(prev) => now.saturating_duration_since(prev).min(MAX_FRAME_GAP),
            None => Duration::ZERO,
        };
        self.prev = Some(now);
        if self.paused {
            0.0
        } else {
            dt.as_secs_f64()
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

/// Turn a raw delta into something safe to integrate: non-finite and
/// negative values become `0.0`.
pub fn sanitize_dt(dt: f64) -> f64 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}
