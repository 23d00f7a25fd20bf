//! Replication-facing queries.
//!
//! The pull side of a replication negotiates deltas by asking which
//! revisions a tree already knows and which ancestors it could accept; the
//! push side enumerates revisions past a checkpoint sequence and builds the
//! ancestry path sent alongside a revision.

use crate::RevTree;

/// Default cap on the ancestor list offered to a peer for an unknown
/// revision.
pub const MAX_POSSIBLE_ANCESTORS: usize = 10;

impl RevTree {
    /// Membership test by revision ID.
    pub fn contains(&self, rev_id: &[u8]) -> bool {
        self.find(rev_id).is_some()
    }

    /// Revisions a peer could send an unknown revision on top of: every
    /// known revision with a generation below the target's, best-ranked
    /// first, at most `max`.
    ///
    /// Returns an empty list when the target revision is already known (there
    /// is nothing to negotiate) or its ID does not parse.
    pub fn possible_ancestors(&mut self, rev_id: &[u8], max: usize) -> Vec<Vec<u8>> {
        if self.contains(rev_id) {
            return Vec::new();
        }
        let Some((gen, _)) = revid::parse_compacted(rev_id) else {
            return Vec::new();
        };
        self.sort();
        self.iter()
            .filter(|n| revid::generation(n.rev_id()) < gen)
            .map(|n| n.rev_id().to_vec())
            .take(max)
            .collect()
    }

    /// Revisions persisted after `sequence`, in vector order. Revisions not
    /// yet saved (sequence 0) are excluded.
    pub fn revs_since(&self, sequence: u64) -> impl Iterator<Item = &crate::RevNode> {
        self.iter()
            .filter(move |n| n.sequence() > 0 && n.sequence() > sequence)
    }

    /// The ancestry path sent with a revision: parent-chain rev IDs starting
    /// at the revision's parent, newest first, at most `max` entries. The
    /// walk stops early — inclusively — at the first ID in `stop_at`, since
    /// the peer can reconstruct the rest from there.
    ///
    /// Returns `None` when the revision itself is not in the tree.
    pub fn history(&self, rev_id: &[u8], max: usize, stop_at: &[&[u8]]) -> Option<Vec<Vec<u8>>> {
        let start = self.find(rev_id)?;
        let mut path = Vec::new();
        let mut current = self.parent_index(start);
        while let Some(i) = current {
            if path.len() == max {
                break;
            }
            let node = &self.nodes()[i];
            path.push(node.rev_id().to_vec());
            if stop_at.contains(&node.rev_id()) {
                break;
            }
            current = self.parent_index(i);
        }
        Some(path)
    }
}
