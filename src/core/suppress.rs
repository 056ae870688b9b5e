//! Input suppression — keep the scroll driver the only writer of a column's
//! scroll position.
//!
//! Attaching an [`InputSuppression`] to a surface cancels wheel and
//! touch-drag input on it.  Dropping the guard detaches it, so attach and
//! detach always pair up with the column's mount lifecycle.

use std::rc::Rc;

use super::viewport::Hooks;

/// Pointer input that reaches a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollInput {
    /// Mouse wheel; positive delta scrolls content up (offset grows).
    Wheel { delta: f64 },
    /// Touch / button drag; the delta is the finger movement, so content
    /// follows it in the opposite direction.
    TouchMove { delta: f64 },
    /// Press without movement.
    Click,
}

impl ScrollInput {
    /// How far this input would scroll natively, if at all.
    pub fn scroll_delta(self) -> Option<f64> {
        match self {
            ScrollInput::Wheel { delta } => Some(delta),
            ScrollInput::TouchMove { delta } => Some(-delta),
            ScrollInput::Click => None,
        }
    }
}

/// What happened to a dispatched input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Default action prevented.
    Suppressed,
    /// Applied as a native scroll.
    Scrolled,
    /// Not scroll-inducing.
    Ignored,
}

/// Scoped registration of the suppressing listeners.
#[derive(Debug)]
pub struct InputSuppression {
    hooks: Rc<Hooks>,
}

impl InputSuppression {
    pub(crate) fn attach(hooks: Rc<Hooks>) -> Self {
        hooks.suppressors.set(hooks.suppressors.get() + 1);
        Self { hooks }
    }
}

impl Drop for InputSuppression {
    fn drop(&mut self) {
        let n = self.hooks.suppressors.get();
        self.hooks.suppressors.set(n.saturating_sub(1));
    }
}
