//! Binary codec for the stored form of a revision tree.
//!
//! A document's tree is saved as one blob: a run of variable-length records,
//! one per revision, terminated by a 32-bit zero. Records are packed with no
//! padding; fixed-width integers are big-endian, varints are unsigned LEB128
//! (7 data bits per byte, continuation bit in the MSB, least-significant
//! group first).
//!
//! ```text
//! size         u32   total bytes of this record, including this field
//! parent       u16   index of the parent record (0xFFFF = root)
//! flags        u8    Leaf=0x01 Deleted=0x02 HasData=0x80 HasBodyOffset=0x40
//! rev_id_len   u8
//! rev_id       rev_id_len bytes
//! sequence     varint
//! body         rest of record            (only if HasData)
//! body_offset  varint                    (only if HasBodyOffset)
//!
//! terminator   u32 zero after the last record
//! ```
//!
//! `HasData` and `HasBodyOffset` are mutually exclusive; a record with
//! neither simply has no body. Encoding always sorts first, so the record at
//! offset 0 is the current revision, and it drops the inline bodies of
//! revisions that are neither leaves nor new, pointing them at the previous
//! saved version of the document instead.

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

use crate::node::{RevNode, PERSISTENT_FLAGS};
use crate::RevTree;

const FLAG_HAS_DATA: u8 = 0x80;
const FLAG_HAS_BODY_OFFSET: u8 = 0x40;

/// Fixed prefix of every record: size, parent, flags, rev_id_len.
const RECORD_HEADER: usize = 8;
/// The 32-bit zero terminator.
const TRAILER: usize = 4;
/// Records are indexed by `u16` with 0xFFFF reserved for "no parent".
const MAX_NODES: usize = u16::MAX as usize;

/// Corruption detected while decoding a stored revision tree. Any partial
/// state is discarded; the caller must treat the document as unreadable.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// More than 65 535 records.
    #[error("revision tree has too many nodes")]
    TooManyNodes,

    /// A record overruns the blob, or is smaller than its own header.
    #[error("truncated revision tree record")]
    Truncated,

    /// The record walk did not land exactly on a 4-byte zero terminator at
    /// the end of the blob.
    #[error("revision tree blob is missing its terminator")]
    BadTrailer,

    /// A varint ran past the end of its record.
    #[error("unterminated varint in revision tree record")]
    BadVarint,

    /// A record claims both an inline body and a deferred body offset.
    #[error("record has both inline body and body offset")]
    ConflictingBodyFlags,
}

// -------------------- Varints (unsigned LEB128) --------------------

pub(crate) fn varint_len(value: u64) -> usize {
    let mut len = 1;
    let mut rest = value >> 7;
    while rest != 0 {
        len += 1;
        rest >>= 7;
    }
    len
}

fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Reads a varint from the front of `buf`, returning the value and the number
/// of bytes consumed. `None` when the continuation bit runs past the end of
/// the buffer or the value overflows 64 bits.
fn read_varint(buf: &[u8]) -> Option<(u64, usize)> {
    let mut value = 0u64;
    for (i, &byte) in buf.iter().enumerate() {
        if i == 9 && byte > 1 {
            return None;
        }
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}

// -------------------- Decode --------------------

impl RevTree {
    /// Decodes a stored tree blob.
    ///
    /// `default_seq` is the sequence of the save that wrote this blob;
    /// records persisted with sequence 0 (new at save time) take it on.
    /// `body_offset` is the file position of the document's previous saved
    /// version, remembered for deferred-body pruning at the next encode.
    pub fn decode(data: &[u8], default_seq: u64, body_offset: u64) -> Result<Self, DecodeError> {
        let mut nodes = Vec::new();
        let mut pos = 0usize;
        loop {
            if data.len() - pos < TRAILER {
                return Err(DecodeError::Truncated);
            }
            let size = BigEndian::read_u32(&data[pos..]) as usize;
            if size == 0 {
                break;
            }
            if nodes.len() == MAX_NODES {
                return Err(DecodeError::TooManyNodes);
            }
            if size < RECORD_HEADER || size > data.len() - pos {
                return Err(DecodeError::Truncated);
            }
            nodes.push(decode_record(&data[pos..pos + size], default_seq)?);
            pos += size;
        }
        if pos != data.len() - TRAILER {
            return Err(DecodeError::BadTrailer);
        }
        Ok(RevTree::from_parts(nodes, body_offset))
    }

    /// Encodes the tree into its stored form.
    ///
    /// Sorts first (the current revision leads the blob), then prunes the
    /// inline bodies of already-saved interior revisions — only leaves and
    /// revisions new in this session keep data inline; pruned ones point at
    /// the tree's body offset instead. Ends with the 4-byte zero terminator.
    pub fn encode(&mut self) -> Vec<u8> {
        self.sort();

        let fallback = self.body_offset();
        for node in self.nodes_mut().iter_mut() {
            if !node.body.is_empty() && !(node.is_leaf() || node.is_new()) {
                node.body.clear();
                node.old_body_offset = fallback;
            }
        }

        let total: usize = self.nodes().iter().map(encoded_size).sum::<usize>() + TRAILER;
        let mut out = Vec::with_capacity(total);
        for node in self.nodes() {
            let mut flags = node.flags & PERSISTENT_FLAGS;
            if !node.body.is_empty() {
                flags |= FLAG_HAS_DATA;
            } else if node.old_body_offset > 0 {
                flags |= FLAG_HAS_BODY_OFFSET;
            }

            let mut header = [0u8; RECORD_HEADER];
            BigEndian::write_u32(&mut header[..4], encoded_size(node) as u32);
            BigEndian::write_u16(&mut header[4..6], node.parent);
            header[6] = flags;
            header[7] = node.rev_id.len() as u8;
            out.extend_from_slice(&header);
            out.extend_from_slice(&node.rev_id);
            write_varint(&mut out, node.sequence);
            if flags & FLAG_HAS_DATA != 0 {
                out.extend_from_slice(&node.body);
            } else if flags & FLAG_HAS_BODY_OFFSET != 0 {
                write_varint(&mut out, node.old_body_offset);
            }
        }
        out.extend_from_slice(&[0u8; TRAILER]);
        debug_assert_eq!(out.len(), total);
        out
    }
}

fn decode_record(rec: &[u8], default_seq: u64) -> Result<RevNode, DecodeError> {
    let parent = BigEndian::read_u16(&rec[4..]);
    let flags = rec[6];
    if flags & FLAG_HAS_DATA != 0 && flags & FLAG_HAS_BODY_OFFSET != 0 {
        return Err(DecodeError::ConflictingBodyFlags);
    }
    let id_len = usize::from(rec[7]);
    if RECORD_HEADER + id_len > rec.len() {
        return Err(DecodeError::Truncated);
    }
    let rev_id = rec[RECORD_HEADER..RECORD_HEADER + id_len].to_vec();

    let rest = &rec[RECORD_HEADER + id_len..];
    let (sequence, seq_len) = read_varint(rest).ok_or(DecodeError::BadVarint)?;
    let tail = &rest[seq_len..];

    let (body, old_body_offset) = if flags & FLAG_HAS_DATA != 0 {
        (tail.to_vec(), 0)
    } else if flags & FLAG_HAS_BODY_OFFSET != 0 {
        let (offset, _) = read_varint(tail).ok_or(DecodeError::BadVarint)?;
        (Vec::new(), offset)
    } else {
        (Vec::new(), 0)
    };

    Ok(RevNode {
        rev_id,
        parent,
        flags: flags & PERSISTENT_FLAGS,
        sequence: if sequence == 0 { default_seq } else { sequence },
        body,
        old_body_offset,
    })
}

fn encoded_size(node: &RevNode) -> usize {
    let mut size = RECORD_HEADER + node.rev_id.len() + varint_len(node.sequence);
    if !node.body.is_empty() {
        size += node.body.len();
    } else if node.old_body_offset > 0 {
        size += varint_len(node.old_body_offset);
    }
    size
}
