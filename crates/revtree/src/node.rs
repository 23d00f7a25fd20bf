use std::cmp::Ordering;

/// Sentinel parent index meaning "this revision is a root".
pub const NO_PARENT: u16 = 0xFFFF;

// Flag bits. The low bits persist to disk; `NEW` is in-memory only and is
// masked out by the codec.
pub(crate) const FLAG_LEAF: u8 = 0x01;
pub(crate) const FLAG_DELETED: u8 = 0x02;
pub(crate) const FLAG_NEW: u8 = 0x04;
pub(crate) const PERSISTENT_FLAGS: u8 = FLAG_LEAF | FLAG_DELETED;

/// One revision in a document's history graph.
///
/// The rev ID and body are owned by the node. A node marked for removal by
/// `prune`/`purge` has an empty rev ID until the next `compact` drops it;
/// every valid revision ID is at least one byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevNode {
    pub(crate) rev_id: Vec<u8>,
    /// Index of the parent revision in the tree's node vector, or
    /// [`NO_PARENT`].
    pub(crate) parent: u16,
    pub(crate) flags: u8,
    /// Ordinal assigned by the enclosing store when the document is saved;
    /// 0 means "not yet sequenced".
    pub(crate) sequence: u64,
    /// Inline revision body. Empty when the body is absent or deferred.
    pub(crate) body: Vec<u8>,
    /// File position of an older document version that still holds this
    /// revision's body. Mutually exclusive with an inline body.
    pub(crate) old_body_offset: u64,
}

impl RevNode {
    /// The revision ID, in whichever form (textual or compacted) it was
    /// inserted with.
    pub fn rev_id(&self) -> &[u8] {
        &self.rev_id
    }

    /// Parent slot in the tree's node vector, or `None` for a root.
    pub fn parent_index(&self) -> Option<usize> {
        (self.parent != NO_PARENT).then(|| usize::from(self.parent))
    }

    /// Inline body bytes; empty when the body is absent or lives at
    /// [`old_body_offset`](Self::old_body_offset).
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// File offset of the older document version holding this revision's
    /// body, or 0.
    pub fn old_body_offset(&self) -> u64 {
        self.old_body_offset
    }

    /// Store sequence of the save that persisted this revision (0 if not yet
    /// saved).
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// A leaf has no children; it is either the current revision or a
    /// conflicting sibling.
    pub fn is_leaf(&self) -> bool {
        self.flags & FLAG_LEAF != 0
    }

    /// Deleted revisions are tombstones left by a document deletion.
    pub fn is_deleted(&self) -> bool {
        self.flags & FLAG_DELETED != 0
    }

    /// Inserted since this tree was created or decoded, i.e. not yet saved.
    pub fn is_new(&self) -> bool {
        self.flags & FLAG_NEW != 0
    }

    /// Active revisions are the candidates for "current": live leaves.
    pub fn is_active(&self) -> bool {
        self.is_leaf() && !self.is_deleted()
    }

    /// Total order placing the most interesting revision first: leaves before
    /// non-leaves, live before deleted, then higher rev ID first.
    pub(crate) fn compare_for_sort(&self, other: &RevNode) -> Ordering {
        self.is_leaf()
            .cmp(&other.is_leaf())
            .reverse()
            .then(self.is_deleted().cmp(&other.is_deleted()))
            .then_with(|| revid::compare(&other.rev_id, &self.rev_id))
    }
}
