//! Window calculation over a uniform-extent virtual list.
//!
//! Every virtual slot has the same estimated extent (fixed-height cards), so
//! the visible range is pure arithmetic: no prefix sums, no measurement.
//! Offsets and extents are in rows of the rendering surface.

/// A slot inside the current window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualItem {
    /// Virtual index.  Doubles as the render key: stable for a given
    /// position, reused as items recycle through it.
    pub index: usize,
    /// Start offset along the scroll axis (`index × extent`).
    pub start: f64,
    pub size: f64,
}

impl VirtualItem {
    pub fn end(&self) -> f64 {
        self.start + self.size
    }

    pub fn key(&self) -> usize {
        self.index
    }
}

/// Half-open index range `[start_index, end_index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VirtualRange {
    pub start_index: usize,
    pub end_index: usize,
}

impl VirtualRange {
    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }
}

/// Headless windowing engine for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Virtualizer {
    virtual_length: usize,
    item_extent: f64,
    overscan: usize,
}

impl Virtualizer {
    pub fn new(virtual_length: usize, item_extent: f64, overscan: usize) -> Self {
        Self {
            virtual_length,
            item_extent: sanitize_extent(item_extent),
            overscan,
        }
    }

    pub fn virtual_length(&self) -> usize {
        self.virtual_length
    }

    pub fn set_virtual_length(&mut self, virtual_length: usize) {
        self.virtual_length = virtual_length;
    }

    pub fn item_extent(&self) -> f64 {
        self.item_extent
    }

    pub fn overscan(&self) -> usize {
        self.overscan
    }

    /// `virtual_length × item_extent`.
    pub fn total_extent(&self) -> f64 {
        self.virtual_length as f64 * self.item_extent
    }

    /// Largest valid scroll offset for a viewport of `viewport_extent`.
    /// Zero or negative means the content fits and nothing should move.
    pub fn max_scroll(&self, viewport_extent: f64) -> f64 {
        if !viewport_extent.is_finite() {
            return 0.0;
        }
        self.total_extent() - viewport_extent.max(0.0)
    }

    /// Slots intersecting the viewport widened by `overscan` slots on each side.
    pub fn range_for(&self, scroll_offset: f64, viewport_extent: f64) -> VirtualRange {
        if self.virtual_length == 0
            || self.item_extent <= 0.0
            || !(viewport_extent > 0.0)
            || !viewport_extent.is_finite()
            || !scroll_offset.is_finite()
        {
            return VirtualRange::default();
        }

        let margin = self.overscan as f64 * self.item_extent;
        let lo = scroll_offset - margin;
        let hi = scroll_offset + viewport_extent + margin;

        let start = (lo / self.item_extent).floor().max(0.0);
        let end = (hi / self.item_extent).ceil().max(0.0);

        let start_index = (start as usize).min(self.virtual_length);
        let end_index = (end as usize).min(self.virtual_length);
        VirtualRange {
            start_index,
            end_index: end_index.max(start_index),
        }
    }

    pub fn item(&self, index: usize) -> VirtualItem {
        VirtualItem {
            index,
            start: index as f64 * self.item_extent,
            size: self.item_extent,
        }
    }

    /// Zero-allocation iteration over the window.
    pub fn for_each_item(
        &self,
        scroll_offset: f64,
        viewport_extent: f64,
        mut f: impl FnMut(VirtualItem),
    ) {
        let range = self.range_for(scroll_offset, viewport_extent);
        for index in range.start_index..range.end_index {
            f(self.item(index));
        }
    }

    pub fn items(&self, scroll_offset: f64, viewport_extent: f64) -> Vec<VirtualItem> {
        let range = self.range_for(scroll_offset, viewport_extent);
        let mut out = Vec::with_capacity(range.len());
        self.for_each_item(scroll_offset, viewport_extent, |item| out.push(item));
        out
    }
}

fn sanitize_extent(extent: f64) -> f64 {
    if extent.is_finite() && extent > 0.0 {
        extent
    } else {
        0.0
    }
}
