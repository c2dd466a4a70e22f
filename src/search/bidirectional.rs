//! Bidirectional breadth-first search
//!
//! The forward side follows outbound links from the start page. The backward
//! side follows inbound links (backlinks) from the finish page, so every page
//! it records is known to reach the finish page through real edges. The two
//! sides alternate one page expansion each.

use super::path::{join_at_meeting, ParentMap};
use super::{SearchEngine, SearchResult, StopReason, Strategy, Tally};
use crate::page::Page;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// One side of the search: its discovered pages and its queue
struct Side {
    direction: Direction,
    parents: ParentMap,
    queue: VecDeque<Page>,
}

impl Side {
    fn new(direction: Direction, root: &Page) -> Self {
        Self {
            direction,
            parents: ParentMap::with_root(root.clone()),
            queue: VecDeque::from([root.clone()]),
        }
    }
}

/// What one expansion step produced
enum Step {
    Continue,
    Met(Page),
    Stopped(StopReason),
}

impl SearchEngine<'_> {
    /// Bidirectional breadth-first search between `start` and `finish`
    ///
    /// Returns the first connecting path found, which is valid but not
    /// necessarily the shortest. Inbound links may be truncated or
    /// unavailable, so when the backward side runs out the forward side
    /// carries on alone. When the forward side runs out first no path exists;
    /// the backward side is still drained so the discovered count covers the
    /// component around each origin.
    pub async fn bidirectional(&self, start: &Page, finish: &Page) -> SearchResult {
        let mut tally = Tally::start(Strategy::Bidirectional);
        if start == finish {
            self.log_trivial();
            return tally.trivial(start);
        }

        let mut forward = Side::new(Direction::Forward, start);
        let mut backward = Side::new(Direction::Backward, finish);

        while !forward.queue.is_empty() || !backward.queue.is_empty() {
            let mut step = self.expand(&mut forward, &backward, &mut tally).await;
            if matches!(step, Step::Continue) {
                step = self.expand(&mut backward, &forward, &mut tally).await;
            }

            match step {
                Step::Continue => {}
                Step::Met(meeting) => {
                    let path = join_at_meeting(&forward.parents, &backward.parents, &meeting);
                    // The meeting page is recorded on both sides
                    let discovered = forward.parents.len() + backward.parents.len() - 1;
                    self.emit(format!("Frontiers met at: {}", meeting));
                    self.log_found(&path);
                    return tally.found(path, discovered);
                }
                Step::Stopped(reason) => {
                    let discovered = forward.parents.len() + backward.parents.len();
                    return tally.stopped(reason, discovered);
                }
            }
        }

        self.log_exhausted();
        tally.exhausted(forward.parents.len() + backward.parents.len())
    }

    /// Expands the next page of `side`, checking new pages against `other`
    async fn expand(&self, side: &mut Side, other: &Side, tally: &mut Tally) -> Step {
        let Some(current) = side.queue.pop_front() else {
            return Step::Continue;
        };
        if let Some(reason) = self.should_stop() {
            return Step::Stopped(reason);
        }

        let links = match side.direction {
            Direction::Forward => {
                self.emit(format!("Dequeued (forward): {}", current));
                self.source.links(&current).await
            }
            Direction::Backward => {
                self.emit(format!("Dequeued (backward): {}", current));
                self.source.backlinks(&current).await
            }
        };
        tally.add_links(links.total_count());

        for next in links.pages() {
            if !side.parents.discover(next, &current) {
                continue;
            }
            if other.parents.contains(next) {
                return Step::Met(next.clone());
            }
            side.queue.push_back(next.clone());
        }

        Step::Continue
    }
}
