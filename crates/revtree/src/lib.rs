//! # RevTree — Document Revision Trees
//!
//! The revision-history core of the Tidepool document store. Every stored
//! document carries a tree of revisions: leaves are the live versions (more
//! than one live leaf means the document is in conflict, as happens under
//! multi-master replication), interior nodes are their shared ancestry.
//!
//! ```text
//!                  1-aa
//!                    |
//!                  2-bb
//!                 /    \
//!             3-cc      3-dd        <- conflicting leaf
//!               |
//!             4-ee                  <- current revision after sort()
//! ```
//!
//! A `RevTree` is decoded from a document blob, queried and mutated in
//! memory, and re-encoded in full when the document is saved. It is a plain
//! value with no interior locking; the store serializes access by owning one
//! tree per document.
//!
//! ## Module responsibilities
//!
//! | Module       | Purpose                                                 |
//! |--------------|---------------------------------------------------------|
//! | [`lib.rs`]   | `RevTree` struct, accessors, conflict check             |
//! | [`node`]     | `RevNode` record, flag bits, sort comparator            |
//! | [`insert`]   | `insert()`, `insert_at()`, `insert_history()`           |
//! | [`prune`]    | `prune()`, `purge()`, `compact()`                       |
//! | [`sort`]     | index-stable in-place sort                              |
//! | [`codec`]    | binary encode/decode of the on-disk blob                |
//! | [`query`]    | replicator-facing queries (ancestors, changes, history) |
//!
//! Revision IDs are handled by the [`revid`] crate; the tree accepts both
//! textual and compacted forms.

mod codec;
mod insert;
mod node;
mod prune;
mod query;
mod sort;

pub use codec::DecodeError;
pub use insert::InsertError;
pub use node::{RevNode, NO_PARENT};
pub use query::MAX_POSSIBLE_ANCESTORS;

/// The revision history of one document.
///
/// Holds the node vector plus bookkeeping: the fallback body offset used
/// when encoding deferred bodies, whether the vector is currently in sort
/// order, and whether anything changed since decode (so the store knows the
/// document needs saving).
#[derive(Debug)]
pub struct RevTree {
    nodes: Vec<RevNode>,
    body_offset: u64,
    sorted: bool,
    changed: bool,
}

impl Default for RevTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RevTree {
    /// Creates an empty tree for a brand-new document.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            body_offset: 0,
            sorted: true,
            changed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when the tree was mutated since it was created or decoded.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Resets the changed flag, typically after the store saves the blob.
    pub fn clear_changed(&mut self) {
        self.changed = false;
    }

    /// The file offset recorded for this document's previous saved version,
    /// used as the deferred-body target when internal bodies are pruned at
    /// encode time.
    pub fn body_offset(&self) -> u64 {
        self.body_offset
    }

    pub fn set_body_offset(&mut self, offset: u64) {
        self.body_offset = offset;
    }

    /// The node at `index`, or `None` out of range.
    pub fn node(&self, index: usize) -> Option<&RevNode> {
        self.nodes.get(index)
    }

    /// Linear scan for a revision by ID.
    pub fn get(&self, rev_id: &[u8]) -> Option<&RevNode> {
        self.find(rev_id).map(|i| &self.nodes[i])
    }

    /// Index of a revision by ID.
    pub fn find(&self, rev_id: &[u8]) -> Option<usize> {
        if rev_id.is_empty() {
            // empty is the marked-for-removal state, never a real ID
            return None;
        }
        self.nodes.iter().position(|n| n.rev_id == rev_id)
    }

    /// Index of a node's parent, or `None` for a root.
    pub fn parent_index(&self, index: usize) -> Option<usize> {
        self.nodes.get(index).and_then(RevNode::parent_index)
    }

    /// Sorts, then returns the current revision: the best-ranked leaf (live
    /// preferred over deleted, higher rev ID at equal rank). `None` only for
    /// an empty tree.
    pub fn current(&mut self) -> Option<&RevNode> {
        self.sort();
        self.nodes.first()
    }

    /// True when two or more live leaves exist.
    ///
    /// When the tree is sorted this needs only one probe: the sort order
    /// packs leaves first and live before deleted, so a second active leaf
    /// can only sit at index 1.
    pub fn has_conflict(&self) -> bool {
        if self.nodes.len() < 2 {
            false
        } else if self.sorted {
            self.nodes[1].is_active()
        } else {
            self.nodes.iter().filter(|n| n.is_active()).take(2).count() > 1
        }
    }

    /// All leaves, in current vector order.
    pub fn leaves(&self) -> impl Iterator<Item = &RevNode> {
        self.nodes.iter().filter(|n| n.is_leaf())
    }

    /// All nodes, in current vector order.
    pub fn iter(&self) -> impl Iterator<Item = &RevNode> {
        self.nodes.iter()
    }

    // ---- internal access shared by the operation modules ----

    pub(crate) fn nodes(&self) -> &[RevNode] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut Vec<RevNode> {
        &mut self.nodes
    }

    pub(crate) fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub(crate) fn set_sorted(&mut self, sorted: bool) {
        self.sorted = sorted;
    }

    pub(crate) fn mark_changed(&mut self) {
        self.changed = true;
    }

    pub(crate) fn from_parts(nodes: Vec<RevNode>, body_offset: u64) -> Self {
        Self {
            nodes,
            body_offset,
            sorted: true,
            changed: false,
        }
    }
}

#[cfg(test)]
mod tests;
