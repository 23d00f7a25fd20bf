//! In-memory document store backing the shell.
//!
//! Plays the page store's part in the revision-tree contract without any
//! disk: it hands out opaque blob offsets, assigns a store-wide sequence to
//! each save, and round-trips every saved document through the binary codec.
//! Saving a document prunes it to the configured revision depth, encodes it,
//! and reloads the live tree from the blob — which is how new revisions pick
//! up their sequence number and how the tree learns where its previous
//! version's bodies live.

use anyhow::{anyhow, Result};
use revtree::RevTree;
use std::collections::BTreeMap;

/// Metadata of a document's latest save.
pub struct Saved {
    pub blob: Vec<u8>,
    pub sequence: u64,
    pub offset: u64,
}

struct Doc {
    tree: RevTree,
    saved: Option<Saved>,
}

/// What a save did, for reporting.
pub struct SaveInfo {
    pub sequence: u64,
    pub offset: u64,
    pub bytes: usize,
    pub pruned: usize,
}

pub struct Store {
    docs: BTreeMap<String, Doc>,
    next_seq: u64,
    next_offset: u64,
    max_depth: usize,
}

/// Blobs are laid out after a notional header page; offset 0 is the
/// tree format's "no offset" sentinel and must never address a document.
const BASE_OFFSET: u64 = 4096;

impl Store {
    /// An empty store that prunes each document to `max_depth` revisions at
    /// save time (0 disables pruning).
    pub fn new(max_depth: usize) -> Self {
        Self {
            docs: BTreeMap::new(),
            next_seq: 0,
            next_offset: BASE_OFFSET,
            max_depth,
        }
    }

    pub fn doc_count(&self) -> usize {
        self.docs.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn last_sequence(&self) -> u64 {
        self.next_seq
    }

    /// The live tree for `id`, created empty on first touch.
    pub fn tree_mut(&mut self, id: &str) -> &mut RevTree {
        &mut self
            .docs
            .entry(id.to_string())
            .or_insert_with(|| Doc {
                tree: RevTree::new(),
                saved: None,
            })
            .tree
    }

    pub fn tree(&self, id: &str) -> Option<&RevTree> {
        self.docs.get(id).map(|d| &d.tree)
    }

    pub fn saved(&self, id: &str) -> Option<&Saved> {
        self.docs.get(id).and_then(|d| d.saved.as_ref())
    }

    /// Saves a document: prune to the depth limit, encode, allocate a
    /// sequence and a blob offset, then reload the live tree from the blob so
    /// fresh revisions take on the save's sequence and the tree records where
    /// this version's bodies now live.
    pub fn save(&mut self, id: &str) -> Result<SaveInfo> {
        let doc = self
            .docs
            .get_mut(id)
            .ok_or_else(|| anyhow!("unknown doc: {}", id))?;

        let pruned = doc.tree.prune(self.max_depth);
        let blob = doc.tree.encode();
        let sequence = self.next_seq + 1;
        let offset = self.next_offset;

        doc.tree = RevTree::decode(&blob, sequence, offset)?;
        self.next_seq = sequence;
        self.next_offset += blob.len() as u64;
        let bytes = blob.len();
        doc.saved = Some(Saved {
            blob,
            sequence,
            offset,
        });

        Ok(SaveInfo {
            sequence,
            offset,
            bytes,
            pruned,
        })
    }

    /// Reloads a document from its last saved blob, replacing the live tree
    /// and discarding any unsaved changes. Fails when the document was never
    /// saved.
    pub fn load(&mut self, id: &str) -> Result<&RevTree> {
        let doc = self
            .docs
            .get_mut(id)
            .ok_or_else(|| anyhow!("unknown doc: {}", id))?;
        let saved = doc
            .saved
            .as_ref()
            .ok_or_else(|| anyhow!("doc never saved: {}", id))?;
        doc.tree = RevTree::decode(&saved.blob, saved.sequence, saved.offset)?;
        Ok(&doc.tree)
    }

    /// Documents saved after `since`, oldest first: `(doc id, sequence)`.
    pub fn changes_since(&self, since: u64) -> Vec<(&str, u64)> {
        let mut changes: Vec<(&str, u64)> = self
            .docs
            .iter()
            .filter_map(|(id, doc)| doc.saved.as_ref().map(|s| (id.as_str(), s.sequence)))
            .filter(|&(_, seq)| seq > since)
            .collect();
        changes.sort_by_key(|&(_, seq)| seq);
        changes
    }
}
