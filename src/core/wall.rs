//! The wall — all columns together.
//!
//! Owns the bucket assignment and one mounted [`Column`] per bucket.  Items
//! themselves stay with the store; the wall only needs their count to lay out
//! columns and a slice of them to build selection events.

use serde::{Deserialize, Serialize};

use super::bucket::{self, Bucket, Slot};
use super::column::{Column, RenderedCard};
use super::driver::Motion;
use super::item::Item;
use super::resize::LoopPolicy;
use super::suppress::{Disposition, ScrollInput};

/// Tunables for how the wall looks and moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallTuning {
    /// Rows per card slot, including the one-row gap below the card.
    pub card_height: u16,
    /// Extra cards rendered past each viewport edge.
    pub overscan: usize,
    #[serde(flatten)]
    pub loop_policy: LoopPolicy,
    /// Slowest column speed, rows per second.
    pub base_speed: f64,
    /// Added on top of `base_speed`, scaled per column.
    pub speed_spread: f64,
    pub frame_ms: u64,
    /// Terminal widths at which the wall goes from 2→3, 3→4 and 4→5 columns.
    pub breakpoints: [u16; 3],
}

impl Default for WallTuning {
    fn default() -> Self {
        Self {
            card_height: 6,
            overscan: 6,
            loop_policy: LoopPolicy::default(),
            base_speed: 1.2,
            speed_spread: 0.7,
            frame_ms: 33,
            breakpoints: [60, 100, 140],
        }
    }
}

impl WallTuning {
    pub fn motion_for(&self, column: usize) -> Motion {
        Motion::for_column(column, self.base_speed, self.speed_spread)
    }
}

/// Column count for a terminal `width`.
pub fn columns_for_width(width: u16, breakpoints: [u16; 3]) -> usize {
    let [two, three, four] = breakpoints;
    if width < two {
        2
    } else if width < three {
        3
    } else if width < four {
        4
    } else {
        5
    }
}

/// Payload sent to the preview when a card is activated.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub text: String,
    pub color: Option<String>,
    pub gradient: bool,
    pub signature: Option<String>,
    /// Real item index.
    pub index: usize,
}

impl Selection {
    pub fn from_item(index: usize, item: &Item) -> Self {
        Self {
            text: item.text.clone(),
            color: item.color.clone(),
            gradient: item.is_gradient(),
            signature: item.signature.clone(),
            index,
        }
    }
}

/// Outputs of the wall towards its collaborators.
#[derive(Debug, Clone, PartialEq)]
pub enum WallEvent {
    Selected(Selection),
    LikeRequested { index: usize },
}

pub struct Wall {
    tuning: WallTuning,
    item_count: usize,
    column_count: usize,
    loading: bool,
    buckets: Vec<Bucket>,
    columns: Vec<Column>,
    extents: Vec<f64>,
}

impl Wall {
    pub fn new(tuning: WallTuning) -> Self {
        Self {
            tuning,
            item_count: 0,
            column_count: 0,
            loading: false,
            buckets: Vec::new(),
            columns: Vec::new(),
            extents: Vec::new(),
        }
    }

    pub fn tuning(&self) -> &WallTuning {
        &self.tuning
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Re-run bucket assignment after the item list or column count changed.
    ///
    /// A changed column count remounts every column; a changed item count
    /// hands each existing column its new bucket and keeps it moving.
    pub fn sync(&mut self, item_count: usize, column_count: usize) {
        let column_count = column_count.max(1);
        if !self.buckets.is_empty()
            && item_count == self.item_count
            && column_count == self.column_count
        {
            return;
        }

        self.buckets = bucket::assign(item_count, column_count);
        self.item_count = item_count;
        self.column_count = column_count;
        tracing::debug!(item_count, column_count, "buckets assigned");

        if self.loading {
            return;
        }
        if self.columns.len() != column_count {
            self.remount();
        } else {
            for (i, (column, bucket)) in self.columns.iter_mut().zip(&self.buckets).enumerate() {
                column.rebucket(bucket.clone());
                column.set_motion(self.tuning.motion_for(i));
            }
        }
    }

    /// While loading the wall shows skeleton cards only, so every column is
    /// unmounted; finishing the load mounts them fresh.
    pub fn set_loading(&mut self, loading: bool) {
        if loading == self.loading {
            return;
        }
        self.loading = loading;
        if loading {
            self.unmount_all();
        } else if !self.buckets.is_empty() {
            self.remount();
        }
    }

    /// Report each column's layout height, left to right.
    pub fn set_viewport_extents(&mut self, extents: &[f64]) {
        self.extents.clear();
        self.extents.extend_from_slice(extents);
        for (column, &extent) in self.columns.iter_mut().zip(extents) {
            column.set_viewport_extent(extent);
        }
    }

    /// Advance every column by one frame.  Columns whose loop has stopped
    /// are dropped.
    pub fn tick(&mut self, dt: f64) {
        for column in &mut self.columns {
            column.tick(dt);
        }
        self.columns.retain(Column::is_mounted);
    }

    pub fn dispatch_input(&mut self, column: usize, input: ScrollInput) -> Option<Disposition> {
        self.columns
            .get_mut(column)
            .map(|c| c.dispatch_input(input))
    }

    /// The card under `row` in `column`, if any.
    pub fn hit(&self, column: usize, row: f64) -> Option<RenderedCard> {
        self.columns.get(column)?.card_at(row)
    }

    /// Activate the card under the pointer.  Placeholders are inert.
    pub fn select(&self, column: usize, row: f64, items: &[Item]) -> Option<WallEvent> {
        let index = self.hit(column, row)?.slot.item_index()?;
        let item = items.get(index)?;
        Some(WallEvent::Selected(Selection::from_item(index, item)))
    }

    /// Like the card under the pointer.  Placeholders are inert.
    pub fn like(&self, column: usize, row: f64) -> Option<WallEvent> {
        match self.hit(column, row)?.slot {
            Slot::Item(index) => Some(WallEvent::LikeRequested { index }),
            Slot::Placeholder => None,
        }
    }

    fn remount(&mut self) {
        self.unmount_all();
        let tuning = &self.tuning;
        self.columns = self
            .buckets
            .iter()
            .enumerate()
            .map(|(i, bucket)| {
                Column::mount(
                    i,
                    bucket.clone(),
                    tuning.motion_for(i),
                    tuning.loop_policy,
                    f64::from(tuning.card_height.max(1)),
                    tuning.overscan,
                )
            })
            .collect();
        for (column, &extent) in self.columns.iter_mut().zip(&self.extents) {
            column.set_viewport_extent(extent);
        }
    }

    fn unmount_all(&mut self) {
        for column in &mut self.columns {
            column.unmount();
        }
        self.columns.clear();
    }
}

impl Drop for Wall {
    fn drop(&mut self) {
        self.unmount_all();
    }
}
