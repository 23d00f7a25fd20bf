//! Insertion: single revisions and spliced remote history.
//!
//! All growth of a revision tree flows through here. A rejected insert
//! returns an error and leaves the tree exactly as it was.

use thiserror::Error;

use crate::node::{RevNode, FLAG_DELETED, FLAG_LEAF, FLAG_NEW, NO_PARENT};
use crate::RevTree;

/// Why an insertion was rejected. The tree is unchanged in every case.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    /// The revision ID is empty, malformed, or longer than 255 bytes.
    #[error("invalid revision id")]
    InvalidRevId,

    /// The revision is already in the tree.
    #[error("revision already exists")]
    AlreadyExists,

    /// The named parent revision is not in the tree.
    #[error("parent revision not found")]
    ParentNotFound,

    /// Inserting here would create a conflicting branch, and the caller did
    /// not allow one.
    #[error("insertion would create a conflict")]
    Conflict,

    /// The new revision's generation is not exactly one above its parent's.
    #[error("generation out of sequence")]
    GenerationMismatch,

    /// The tree is at its 65 535-node capacity.
    #[error("revision tree full")]
    TreeFull,
}

impl RevTree {
    /// Inserts a revision whose parent is named by ID.
    ///
    /// `parent_id` of `None` makes the new revision a root, which an existing
    /// tree only accepts with `allow_conflict`. Returns the index of the new
    /// node.
    pub fn insert(
        &mut self,
        rev_id: &[u8],
        body: &[u8],
        deleted: bool,
        parent_id: Option<&[u8]>,
        allow_conflict: bool,
    ) -> Result<usize, InsertError> {
        if self.find(rev_id).is_some() {
            return Err(InsertError::AlreadyExists);
        }
        let parent = match parent_id {
            Some(id) => Some(self.find(id).ok_or(InsertError::ParentNotFound)?),
            None => None,
        };
        self.insert_at(rev_id, body, deleted, parent, allow_conflict)
    }

    /// Inserts a revision whose parent is named by node index.
    ///
    /// Validates the revision ID, the parent's leaf status (unless
    /// `allow_conflict`), and that the generation goes up by exactly one from
    /// the parent (from zero for a root). Returns the index of the new node.
    pub fn insert_at(
        &mut self,
        rev_id: &[u8],
        body: &[u8],
        deleted: bool,
        parent: Option<usize>,
        allow_conflict: bool,
    ) -> Result<usize, InsertError> {
        let (new_gen, _) = revid::parse_compacted(rev_id).ok_or(InsertError::InvalidRevId)?;
        if rev_id.len() > usize::from(u8::MAX) {
            return Err(InsertError::InvalidRevId);
        }
        if self.find(rev_id).is_some() {
            return Err(InsertError::AlreadyExists);
        }
        if self.len() >= usize::from(NO_PARENT) {
            return Err(InsertError::TreeFull);
        }

        let parent_gen = match parent {
            Some(p) => {
                let parent_node = self.node(p).ok_or(InsertError::ParentNotFound)?;
                if !allow_conflict && !parent_node.is_leaf() {
                    return Err(InsertError::Conflict);
                }
                revid::parse_compacted(parent_node.rev_id())
                    .ok_or(InsertError::InvalidRevId)?
                    .0
            }
            None => {
                if !allow_conflict && !self.is_empty() {
                    return Err(InsertError::Conflict);
                }
                0
            }
        };

        if new_gen != parent_gen + 1 {
            return Err(InsertError::GenerationMismatch);
        }

        Ok(self.push_node(rev_id, body, deleted, parent))
    }

    /// Splices a remote revision history into the tree.
    ///
    /// `history` is newest-first, generations decreasing by exactly one per
    /// step. The scan stops at the first entry already present — the common
    /// ancestor. Everything newer is inserted oldest-to-newest, each node
    /// parented on the previous one and the chain rooted on the common
    /// ancestor (or parentless when the whole history is new). Only the tip
    /// carries `body` and `deleted`; intermediate nodes get empty bodies.
    ///
    /// Returns the index *within `history`* of the common ancestor:
    /// 0 means the tip was already known and nothing was inserted,
    /// `history.len()` means no entry was known.
    pub fn insert_history(
        &mut self,
        history: &[&[u8]],
        body: &[u8],
        deleted: bool,
    ) -> Result<usize, InsertError> {
        if history.is_empty() {
            return Err(InsertError::InvalidRevId);
        }

        // Preflight every ID and the generation arithmetic up to (and
        // including) the common ancestor, before touching the tree.
        let mut last_gen = 0u32;
        let mut ancestor: Option<usize> = None;
        let mut common = history.len();
        for (i, &rev_id) in history.iter().enumerate() {
            let (gen, _) = revid::parse_compacted(rev_id).ok_or(InsertError::InvalidRevId)?;
            if rev_id.len() > usize::from(u8::MAX) {
                return Err(InsertError::InvalidRevId);
            }
            if last_gen > 0 && gen != last_gen - 1 {
                return Err(InsertError::GenerationMismatch);
            }
            last_gen = gen;

            if let Some(idx) = self.find(rev_id) {
                ancestor = Some(idx);
                common = i;
                break;
            }
        }

        if self.len() + common > usize::from(NO_PARENT) {
            return Err(InsertError::TreeFull);
        }

        // Insert the unknown revisions in chronological order.
        let mut parent = ancestor;
        for i in (0..common).rev() {
            let tip = i == 0;
            let idx = self.push_node(
                history[i],
                if tip { body } else { &[] },
                tip && deleted,
                parent,
            );
            parent = Some(idx);
        }
        Ok(common)
    }

    /// Appends a pre-validated node: flags it `Leaf | New`, demotes the
    /// parent from leaf, and invalidates the sort order.
    fn push_node(&mut self, rev_id: &[u8], body: &[u8], deleted: bool, parent: Option<usize>) -> usize {
        let mut flags = FLAG_LEAF | FLAG_NEW;
        if deleted {
            flags |= FLAG_DELETED;
        }
        let parent_slot = match parent {
            Some(p) => {
                self.nodes_mut()[p].flags &= !FLAG_LEAF;
                p as u16
            }
            None => NO_PARENT,
        };
        self.nodes_mut().push(RevNode {
            rev_id: rev_id.to_vec(),
            parent: parent_slot,
            flags,
            sequence: 0,
            body: body.to_vec(),
            old_body_offset: 0,
        });
        self.mark_changed();
        if self.len() > 1 {
            self.set_sorted(false);
        }
        self.len() - 1
    }
}
