//! Parent links and path reconstruction
//!
//! Strategies record, for every discovered page, the page it was reached
//! from. Paths are rebuilt by walking those links back to the root rather
//! than copying a path into every frontier entry.

use crate::page::Page;
use std::collections::HashMap;

/// Discovered pages of one search side, each with its predecessor
#[derive(Debug, Clone)]
pub(crate) struct ParentMap {
    parents: HashMap<Page, Option<Page>>,
}

impl ParentMap {
    /// A map holding only `root`
    pub(crate) fn with_root(root: Page) -> Self {
        let mut parents = HashMap::new();
        parents.insert(root, None);
        Self { parents }
    }

    pub(crate) fn contains(&self, page: &Page) -> bool {
        self.parents.contains_key(page)
    }

    /// Records `child` as reached from `parent`; false if already known
    pub(crate) fn discover(&mut self, child: &Page, parent: &Page) -> bool {
        if self.parents.contains_key(child) {
            return false;
        }
        self.parents.insert(child.clone(), Some(parent.clone()));
        true
    }

    /// Records or replaces the predecessor of `child`
    ///
    /// Callers must only re-parent onto strictly cheaper routes, which keeps
    /// the links acyclic.
    pub(crate) fn set_parent(&mut self, child: &Page, parent: &Page) {
        self.parents.insert(child.clone(), Some(parent.clone()));
    }

    pub(crate) fn len(&self) -> usize {
        self.parents.len()
    }

    /// Pages from `from` back to the root, inclusive
    pub(crate) fn chain_to_root(&self, from: &Page) -> Vec<Page> {
        let mut chain = vec![from.clone()];
        let mut current = from;

        while let Some(Some(parent)) = self.parents.get(current) {
            // Guard against a corrupted map rather than spinning forever
            if chain.len() > self.parents.len() {
                break;
            }
            chain.push(parent.clone());
            current = parent;
        }

        chain
    }

    /// Pages from the root to `to`, inclusive
    pub(crate) fn path_to(&self, to: &Page) -> Vec<Page> {
        let mut path = self.chain_to_root(to);
        path.reverse();
        path
    }
}

/// Joins a forward and a backward search at `meeting`
///
/// `forward` is rooted at the start page and maps pages to the page linking
/// to them; `backward` is rooted at the finish page and maps pages to the page
/// they link to. The result runs start -> meeting -> finish with the meeting
/// page appearing exactly once.
pub(crate) fn join_at_meeting(forward: &ParentMap, backward: &ParentMap, meeting: &Page) -> Vec<Page> {
    let mut path = forward.path_to(meeting);
    path.extend(backward.chain_to_root(meeting).into_iter().skip(1));
    path
}
