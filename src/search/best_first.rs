//! Best-first (A*-style) search guided by a heuristic

use super::frontier::Frontier;
use super::path::ParentMap;
use super::{SearchEngine, SearchResult, Strategy, Tally};
use crate::heuristic::Heuristic;
use crate::page::Page;
use crate::SearchError;
use std::collections::{HashMap, HashSet};

impl SearchEngine<'_> {
    /// Best-first search ordered by hops so far plus `heuristic`
    ///
    /// The heuristic is evaluated once per freshly discovered or improved
    /// page; the finish page always gets 0. Stale queue entries are skipped
    /// when popped rather than removed. The path is only guaranteed shortest
    /// when the heuristic never overestimates, which the content heuristic
    /// does not promise.
    ///
    /// # Errors
    ///
    /// Returns an error if the heuristic cannot produce estimates at all,
    /// such as a content heuristic whose target was never precomputed.
    pub async fn best_first(
        &self,
        start: &Page,
        finish: &Page,
        heuristic: &dyn Heuristic,
    ) -> Result<SearchResult, SearchError> {
        let mut tally = Tally::start(Strategy::BestFirst);
        if start == finish {
            self.log_trivial();
            return Ok(tally.trivial(start));
        }

        let mut parents = ParentMap::with_root(start.clone());
        let mut best_hops: HashMap<Page, u32> = HashMap::from([(start.clone(), 0)]);
        let mut closed: HashSet<Page> = HashSet::new();
        let mut frontier = Frontier::default();

        let estimate = heuristic.estimate(start).await?;
        frontier.push(start.clone(), 0, estimate);

        while let Some(entry) = frontier.pop() {
            if let Some(reason) = self.should_stop() {
                return Ok(tally.stopped(reason, best_hops.len()));
            }

            let current = entry.page;
            if closed.contains(&current) {
                continue;
            }
            if best_hops.get(&current).is_some_and(|&hops| hops < entry.hops) {
                continue;
            }

            if &current == finish {
                let path = parents.path_to(finish);
                self.log_found(&path);
                return Ok(tally.found(path, best_hops.len()));
            }
            closed.insert(current.clone());

            self.emit(format!(
                "Dequeued: {} (cost {:.3}, queued {})",
                current,
                entry.cost,
                frontier.len()
            ));
            let links = self.source.links(&current).await;
            tally.add_links(links.total_count());

            let hops = entry.hops + 1;
            for next in links.pages() {
                if closed.contains(next) {
                    continue;
                }
                if best_hops.get(next).is_some_and(|&known| known <= hops) {
                    continue;
                }

                best_hops.insert(next.clone(), hops);
                parents.set_parent(next, &current);

                let estimate = if next == finish {
                    self.emit(format!("Finish page found: {}", next));
                    0.0
                } else {
                    heuristic.estimate(next).await?
                };
                frontier.push(next.clone(), hops, f64::from(hops) + estimate);
            }
        }

        self.log_exhausted();
        Ok(tally.exhausted(best_hops.len()))
    }
}
