//! Resize adaptation — keep each column's virtual length large enough that
//! the loop never shows its seam, and small enough to stay cheap.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::viewport::Hooks;

/// Bounds for the looped index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopPolicy {
    pub repeat_factor: usize,
    pub min_count: usize,
    pub max_count: usize,
}

impl Default for LoopPolicy {
    fn default() -> Self {
        Self {
            repeat_factor: 300,
            min_count: 600,
            max_count: 2400,
        }
    }
}

impl LoopPolicy {
    /// Repair inconsistent bounds (e.g. from a hand-edited config).
    pub fn normalized(self) -> Self {
        let min_count = self.min_count.max(1);
        Self {
            repeat_factor: self.repeat_factor.max(1),
            min_count,
            max_count: self.max_count.max(min_count),
        }
    }

    /// `clamp(repeat_factor × bucket_len, min_count, max_count)`.
    ///
    /// An empty bucket counts as one slot, so it still gets `min_count`
    /// slots, all resolving to the placeholder.
    pub fn virtual_length(&self, bucket_len: usize) -> usize {
        let p = self.normalized();
        p.repeat_factor
            .saturating_mul(bucket_len.max(1))
            .clamp(p.min_count, p.max_count)
    }
}

/// Scoped registration of a resize observer on a surface.
///
/// Dropping it disconnects the observer and discards any undelivered
/// notification.
#[derive(Debug)]
pub struct ResizeSubscription {
    hooks: Rc<Hooks>,
}

impl ResizeSubscription {
    pub(crate) fn attach(hooks: Rc<Hooks>, current_extent: f64) -> Self {
        hooks.observers.set(hooks.observers.get() + 1);
        if current_extent > 0.0 {
            hooks.pending_resize.set(Some(current_extent));
        }
        Self { hooks }
    }

    /// Latest size reported since the previous poll, if any.
    pub fn poll(&self) -> Option<f64> {
        self.hooks.pending_resize.take()
    }
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        let remaining = self.hooks.observers.get().saturating_sub(1);
        self.hooks.observers.set(remaining);
        if remaining == 0 {
            self.hooks.pending_resize.set(None);
        }
    }
}

/// Where to put the scroll offset after the extent changed.
///
/// Offsets already inside the new range stay put; anything beyond it is
/// scaled proportionally so the column keeps its relative position.
pub fn reclamp_offset(offset: f64, old_max: f64, new_max: f64) -> f64 {
    if !(new_max > 0.0) || !offset.is_finite() {
        return 0.0;
    }
    if offset <= new_max {
        return offset.max(0.0);
    }
    if old_max > 0.0 && old_max.is_finite() {
        (offset / old_max * new_max).clamp(0.0, new_max)
    } else {
        new_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::viewport::ScrollSurface;
    use proptest::prelude::*;

    #[test]
    fn tiny_buckets_are_lifted_to_the_minimum() {
        let p = LoopPolicy::default();
        assert_eq!(p.virtual_length(1), 600);
        assert_eq!(p.virtual_length(2), 600);
    }

    #[test]
    fn mid_sized_buckets_scale_with_the_repeat_factor() {
        let p = LoopPolicy::default();
        assert_eq!(p.virtual_length(3), 900);
        assert_eq!(p.virtual_length(7), 2100);
    }

    #[test]
    fn large_buckets_are_capped() {
        assert_eq!(LoopPolicy::default().virtual_length(50), 2400);
    }

    #[test]
    fn empty_bucket_still_gets_the_minimum() {
        let p = LoopPolicy::default();
        assert_eq!(p.virtual_length(0), p.min_count);
    }

    #[test]
    fn inverted_bounds_do_not_panic() {
        let p = LoopPolicy {
            repeat_factor: 0,
            min_count: 500,
            max_count: 10,
        };
        assert_eq!(p.virtual_length(3), 500);
    }

    #[test]
    fn first_layout_is_reported() {
        let surface = ScrollSurface::new(24.0);
        let sub = surface.observe_resize();
        assert_eq!(sub.poll(), Some(24.0));
        assert_eq!(sub.poll(), None);
    }

    #[test]
    fn bursts_coalesce_to_the_last_size() {
        let mut surface = ScrollSurface::new(0.0);
        let sub = surface.observe_resize();
        assert_eq!(sub.poll(), None);
        surface.set_extent(10.0);
        surface.set_extent(12.0);
        surface.set_extent(30.0);
        assert_eq!(sub.poll(), Some(30.0));
    }

    #[test]
    fn dropped_subscription_hears_nothing() {
        let mut surface = ScrollSurface::new(10.0);
        let sub = surface.observe_resize();
        drop(sub);
        surface.set_extent(40.0);
        let again = surface.observe_resize();
        // Only the size at registration time, not the change made while detached.
        assert_eq!(again.poll(), Some(40.0));
    }

    #[test]
    fn reclamp_keeps_in_range_offsets() {
        assert_eq!(reclamp_offset(30.0, 100.0, 50.0), 30.0);
        assert_eq!(reclamp_offset(80.0, 100.0, 50.0), 40.0);
        assert_eq!(reclamp_offset(80.0, 0.0, 50.0), 50.0);
        assert_eq!(reclamp_offset(80.0, 100.0, 0.0), 0.0);
        assert_eq!(reclamp_offset(f64::NAN, 100.0, 10.0), 0.0);
    }

    proptest! {
        #[test]
        fn virtual_length_stays_in_bounds(len in 0usize..10_000) {
            let p = LoopPolicy::default();
            let n = p.virtual_length(len);
            prop_assert!((p.min_count..=p.max_count).contains(&n));
            prop_assert!(n >= len.min(p.max_count));
            let raw = p.repeat_factor * len;
            if (p.min_count..=p.max_count).contains(&raw) {
                prop_assert_eq!(n, raw);
            }
        }

        #[test]
        fn reclamped_offset_is_valid(
            offset in 0.0f64..10_000.0,
            old_max in 0.0f64..10_000.0,
            new_max in 1.0f64..10_000.0,
        ) {
            let r = reclamp_offset(offset.min(old_max), old_max, new_max);
            prop_assert!(r >= 0.0 && r <= new_max);
        }
    }
}
