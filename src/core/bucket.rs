//! Bucket assignment — distribute a flat item list across columns.
//!
//! Item `i` lands in column `i % columns`, so each bucket keeps the original
//! order restricted to its residue class.  An empty item list yields a single
//! placeholder slot in bucket 0 so the first column can show an empty-state
//! card.

use std::sync::Arc;

/// One entry of a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Index into the shared item list.
    Item(usize),
    /// Empty-state card.  Never selectable or likeable.
    Placeholder,
}

impl Slot {
    pub fn item_index(self) -> Option<usize> {
        match self {
            Slot::Item(i) => Some(i),
            Slot::Placeholder => None,
        }
    }
}

/// The ordered slots assigned to one column.  Immutable once built; shared
/// with the column that renders it.
pub type Bucket = Arc<[Slot]>;

/// Partition `item_count` items into `columns` buckets.
///
/// A column count of 0 is treated as 1.
pub fn assign(item_count: usize, columns: usize) -> Vec<Bucket> {
    let columns = columns.max(1);
    let mut buckets: Vec<Vec<Slot>> = (0..columns)
        .map(|c| Vec::with_capacity(item_count / columns + usize::from(c < item_count % columns)))
        .collect();

    for index in 0..item_count {
        buckets[index % columns].push(Slot::Item(index));
    }
    if item_count == 0 {
        buckets[0].push(Slot::Placeholder);
    }

    buckets.into_iter().map(Bucket::from).collect()
}
