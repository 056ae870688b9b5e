//! Map a virtual index onto a real slot of a column's bucket.

use super::bucket::Slot;

/// `bucket[virtual_index % bucket.len()]`, or the placeholder for an empty
/// bucket.  Total: never panics.
pub fn resolve(virtual_index: usize, bucket: &[Slot]) -> Slot {
    if bucket.is_empty() {
        return Slot::Placeholder;
    }
    bucket[virtual_index % bucket.len()]
}
