//! Shrinking the tree: depth-based pruning, explicit purging, and the
//! compaction pass both feed into.
//!
//! Pruning and purging mark doomed nodes by clearing their rev ID (a valid
//! ID is never empty), then `compact()` slides the survivors down and
//! renumbers parent links.

use crate::node::{FLAG_LEAF, NO_PARENT};
use crate::RevTree;

impl RevTree {
    /// Discards revisions deeper than `max_depth` below any leaf.
    ///
    /// Each leaf's ancestor chain is walked, counting the leaf itself as
    /// depth 1; ancestors past `max_depth` are marked. A node within reach of
    /// one leaf but beyond `max_depth` of a deeper leaf is still discarded —
    /// the bound is the maximum depth across all leaves, not a per-node
    /// minimum. Returns the number of revisions removed.
    pub fn prune(&mut self, max_depth: usize) -> usize {
        if max_depth == 0 || self.len() <= max_depth {
            return 0;
        }

        let mut pruned = 0;
        for i in 0..self.len() {
            if !self.nodes()[i].is_leaf() {
                if self.is_sorted() {
                    // leaves are packed first in sort order
                    break;
                }
                continue;
            }
            let mut depth = 0;
            let mut ancestor = Some(i);
            while let Some(a) = ancestor {
                depth += 1;
                if depth > max_depth && !self.nodes()[a].rev_id.is_empty() {
                    self.nodes_mut()[a].rev_id.clear();
                    pruned += 1;
                }
                ancestor = self.nodes()[a].parent_index();
            }
        }

        if pruned > 0 {
            self.compact();
        }
        pruned
    }

    /// Removes the named revisions from the tree.
    ///
    /// Only leaves can be removed directly, so purging runs in passes: each
    /// pass removes every named revision that is currently a leaf and
    /// promotes its parent back to leaf status. Named interior revisions
    /// become purgeable once their descendants are gone; the loop keeps going
    /// while a pass removed something and a named interior revision remains.
    /// Returns the number of revisions removed.
    pub fn purge(&mut self, rev_ids: &[&[u8]]) -> usize {
        let mut consumed = vec![false; rev_ids.len()];
        let mut purged = 0;

        // Each continuing pass purges at least one node, so node count bounds
        // the passes even if the parent graph were corrupt.
        for _ in 0..=self.len() {
            let mut progress = false;
            let mut found_interior = false;
            for (k, &rev_id) in rev_ids.iter().enumerate() {
                if consumed[k] {
                    continue;
                }
                let Some(i) = self.find(rev_id) else { continue };
                if !self.nodes()[i].is_leaf() {
                    found_interior = true;
                    continue;
                }
                purged += 1;
                progress = true;
                consumed[k] = true;
                self.nodes_mut()[i].rev_id.clear();
                if let Some(p) = self.nodes()[i].parent_index() {
                    // promote the parent once its last surviving child goes
                    let p = p as u16;
                    let referenced = self
                        .nodes()
                        .iter()
                        .any(|n| !n.rev_id.is_empty() && n.parent == p);
                    if !referenced {
                        self.nodes_mut()[usize::from(p)].flags |= FLAG_LEAF;
                        // the promoted parent may rank ahead of nodes before it
                        self.set_sorted(false);
                    }
                }
            }
            if !(progress && found_interior) {
                break;
            }
        }

        if purged > 0 {
            self.compact();
        }
        purged
    }

    /// Drops every node marked for removal (empty rev ID), sliding survivors
    /// down in order and renumbering their parent links. A survivor whose
    /// parent was dropped becomes a root.
    pub fn compact(&mut self) {
        // old index -> new index; dropped entries map to NO_PARENT
        let mut remap = vec![NO_PARENT; self.len()];
        let mut next = 0u16;
        for (i, node) in self.nodes().iter().enumerate() {
            if !node.rev_id.is_empty() {
                remap[i] = next;
                next += 1;
            }
        }

        for node in self.nodes_mut().iter_mut() {
            if node.parent != NO_PARENT {
                node.parent = remap[usize::from(node.parent)];
            }
        }
        self.nodes_mut().retain(|n| !n.rev_id.is_empty());
        self.mark_changed();
    }
}
