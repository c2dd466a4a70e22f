//! Priority frontier for best-first search

use crate::page::Page;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A page queued with its estimated total cost
#[derive(Debug, Clone)]
pub(crate) struct QueuedPage {
    /// g + h
    pub cost: f64,

    /// Hops from the start page
    pub hops: u32,

    /// Insertion order, used to break cost ties
    pub seq: u64,

    pub page: Page,
}

// Lower cost pops first; equal costs pop in insertion order
impl Ord for QueuedPage {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedPage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedPage {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedPage {}

/// Min-priority queue with stable tie-breaking
#[derive(Debug, Default)]
pub(crate) struct Frontier {
    heap: BinaryHeap<QueuedPage>,
    next_seq: u64,
}

impl Frontier {
    pub(crate) fn push(&mut self, page: Page, hops: u32, cost: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueuedPage {
            cost,
            hops,
            seq,
            page,
        });
    }

    pub(crate) fn pop(&mut self) -> Option<QueuedPage> {
        self.heap.pop()
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}
