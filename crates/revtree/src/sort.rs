//! Index-stable sorting.
//!
//! Sorting permutes the node vector, but parent links are vector indices, so
//! the permutation has to be observable. Instead of sorting a separate index
//! vector, each node's `parent` field is overwritten with its own pre-sort
//! index for the duration of the sort; afterwards that stashed index and a
//! sidecar table are enough to rebuild every parent link in two passes.

use crate::node::NO_PARENT;
use crate::RevTree;

impl RevTree {
    /// Reorders nodes into the canonical order: leaves first, live before
    /// deleted, higher rev ID first within a rank. After this, index 0 is the
    /// current revision and parent links are renumbered to match. No-op when
    /// already sorted.
    pub fn sort(&mut self) {
        if self.is_sorted() {
            return;
        }
        let len = self.len();

        // Stash the real parent of slot i in old_parents[i], and plant i
        // itself in the node so the sort tells us where everything went.
        let mut old_parents = vec![0u16; len];
        for (i, node) in self.nodes_mut().iter_mut().enumerate() {
            old_parents[i] = node.parent;
            node.parent = i as u16;
        }

        self.nodes_mut().sort_by(|a, b| a.compare_for_sort(b));

        // old index -> new index, read back from the planted values.
        let mut old_to_new = vec![0u16; len];
        for (new, node) in self.nodes().iter().enumerate() {
            old_to_new[usize::from(node.parent)] = new as u16;
        }

        for node in self.nodes_mut().iter_mut() {
            let old_self = usize::from(node.parent);
            let old_parent = old_parents[old_self];
            node.parent = if old_parent == NO_PARENT {
                NO_PARENT
            } else {
                old_to_new[usize::from(old_parent)]
            };
        }

        self.set_sorted(true);
    }
}
