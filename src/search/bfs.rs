//! Single-directed breadth-first search

use super::path::ParentMap;
use super::{SearchEngine, SearchResult, Strategy, Tally};
use crate::page::Page;
use std::collections::VecDeque;

impl SearchEngine<'_> {
    /// Breadth-first search from `start`
    ///
    /// The finish page is recognized as soon as it appears among the links of
    /// an expanded page, which is the first time it is discovered and so at
    /// minimum hop distance. No page is expanded twice.
    pub async fn breadth_first(&self, start: &Page, finish: &Page) -> SearchResult {
        let mut tally = Tally::start(Strategy::BreadthFirst);
        if start == finish {
            self.log_trivial();
            return tally.trivial(start);
        }

        let mut parents = ParentMap::with_root(start.clone());
        let mut queue = VecDeque::from([(start.clone(), 0u32)]);

        while let Some((current, depth)) = queue.pop_front() {
            if let Some(reason) = self.should_stop() {
                return tally.stopped(reason, parents.len());
            }

            self.emit(format!("Dequeued: {} (depth {})", current, depth));
            let links = self.source.links(&current).await;
            tally.add_links(links.total_count());

            for next in links.pages() {
                if !parents.discover(next, &current) {
                    continue;
                }

                if next == finish {
                    let path = parents.path_to(finish);
                    self.emit(format!("Finish page found: {}", next));
                    self.log_found(&path);
                    return tally.found(path, parents.len());
                }

                queue.push_back((next.clone(), depth + 1));
            }
        }

        self.log_exhausted();
        tally.exhausted(parents.len())
    }
}
