use maze_common::db::indices::CellIdx;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Copy, Clone, Eq, PartialEq)]
struct Entry {
    priority: u32,
    seq: u64,
    item: CellIdx,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; invert to pop the smallest
        // (priority, seq) first.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The expansion list driving one segment search: a min-priority queue
/// of cells with stable FIFO order among equal priorities.
///
/// Each `add` stamps the entry with a strictly increasing sequence
/// number, so equal-priority entries extract in insertion order. The
/// search never deletes stale entries; its label check filters
/// duplicates at extraction time.
pub struct ExpansionList {
    heap: BinaryHeap<Entry>,
    counter: u64,
}

impl ExpansionList {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            counter: 0,
        }
    }

    pub fn add(&mut self, item: CellIdx, priority: u32) {
        let seq = self.counter;
        self.counter += 1;
        self.heap.push(Entry {
            priority,
            seq,
            item,
        });
    }

    /// Remove and return the item with the smallest (priority, seq),
    /// or `None` when the queue is exhausted.
    pub fn extract_min(&mut self) -> Option<CellIdx> {
        self.heap.pop().map(|e| e.item)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl Default for ExpansionList {
    fn default() -> Self {
        Self::new()
    }
}
