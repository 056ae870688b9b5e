//! The scrollable surface a column renders into.
//!
//! [`Viewport`] is the seam between the scroll driver and whatever actually
//! shows the column.  [`ScrollSurface`] is the in-process implementation the
//! terminal renderer reads from: it remembers its extent and scroll offset,
//! applies native scroll input unless a suppressor is attached, and queues
//! size changes for attached resize observers.

use std::cell::Cell;
use std::rc::Rc;

use thiserror::Error;

use super::suppress::{Disposition, InputSuppression, ScrollInput};
use super::resize::ResizeSubscription;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ViewportError {
    #[error("viewport has been detached")]
    Detached,
    #[error("scroll offset is not a finite number")]
    NonFinite,
}

/// Anything the scroll driver can write a position to.
pub trait Viewport {
    /// Visible extent along the scroll axis (rows).  Zero until laid out.
    fn extent(&self) -> f64;

    fn scroll_offset(&self) -> f64;

    /// Apply a scroll position.  Failures are transient: the driver ignores
    /// them and tries again on the next frame.
    fn set_scroll_offset(&mut self, offset: f64) -> Result<(), ViewportError>;
}

/// Listener bookkeeping shared between a surface and the guards that
/// register against it.
#[derive(Debug, Default)]
pub(crate) struct Hooks {
    pub(crate) suppressors: Cell<usize>,
    pub(crate) observers: Cell<usize>,
    pub(crate) pending_resize: Cell<Option<f64>>,
}

#[derive(Debug)]
pub struct ScrollSurface {
    extent: f64,
    content_extent: f64,
    offset: f64,
    detached: bool,
    hooks: Rc<Hooks>,
}

impl Default for ScrollSurface {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl ScrollSurface {
    pub fn new(extent: f64) -> Self {
        Self {
            extent: sanitize(extent),
            content_extent: 0.0,
            offset: 0.0,
            detached: false,
            hooks: Rc::new(Hooks::default()),
        }
    }

    /// Report a new layout size.  Attached observers see the latest value
    /// on their next poll; bursts coalesce into one notification.
    pub fn set_extent(&mut self, extent: f64) {
        let extent = sanitize(extent);
        if extent == self.extent {
            return;
        }
        self.extent = extent;
        if self.hooks.observers.get() > 0 {
            self.hooks.pending_resize.set(Some(extent));
        }
    }

    /// Height of the scrollable content.  Native scrolling is bounded by it.
    pub fn set_content_extent(&mut self, content_extent: f64) {
        self.content_extent = sanitize(content_extent);
    }

    pub fn content_extent(&self) -> f64 {
        self.content_extent
    }

    /// Stop accepting writes.  Used when the owning column unmounts.
    pub fn detach(&mut self) {
        self.detached = true;
    }

    /// Register a resize observer.  Observation begins with the current
    /// size, so the first layout is reported like any other change.
    pub fn observe_resize(&self) -> ResizeSubscription {
        ResizeSubscription::attach(Rc::clone(&self.hooks), self.extent)
    }

    /// Start cancelling wheel and touch-drag input on this surface.
    pub fn suppress_input(&self) -> InputSuppression {
        InputSuppression::attach(Rc::clone(&self.hooks))
    }

    pub fn is_input_suppressed(&self) -> bool {
        self.hooks.suppressors.get() > 0
    }

    /// Deliver pointer input.  Scroll-inducing input either gets its default
    /// prevented or moves the surface natively.
    pub fn dispatch_input(&mut self, input: ScrollInput) -> Disposition {
        let Some(delta) = input.scroll_delta() else {
            return Disposition::Ignored;
        };
        if self.is_input_suppressed() {
            return Disposition::Suppressed;
        }
        let max = (self.content_extent - self.extent).max(0.0);
        self.offset = (self.offset + delta).clamp(0.0, max);
        Disposition::Scrolled
    }
}

impl Viewport for ScrollSurface {
    fn extent(&self) -> f64 {
        self.extent
    }

    fn scroll_offset(&self) -> f64 {
        self.offset
    }

    fn set_scroll_offset(&mut self, offset: f64) -> Result<(), ViewportError> {
        if self.detached {
            return Err(ViewportError::Detached);
        }
        if !offset.is_finite() {
            return Err(ViewportError::NonFinite);
        }
        self.offset = offset;
        Ok(())
    }
}

fn sanitize(extent: f64) -> f64 {
    if extent.is_finite() {
        extent.max(0.0)
    } else {
        0.0
    }
}
