//! # RevID — Revision Identifiers
//!
//! Parsing, comparison, and compact encoding of Tidepool revision IDs.
//!
//! A revision ID names one version of a document. Its textual form is
//! `"<generation>-<suffix>"`: a decimal generation number (1 to 99,999,999,
//! at most 8 digits) followed by a dash and an arbitrary non-empty suffix.
//!
//! There is also a **compacted** form used inside stored revision trees: the
//! generation is packed into a single leading byte, followed by the raw
//! suffix. The first byte doubles as a discriminator — ASCII digits
//! (`0x30..=0x39`) can only start a textual ID, so compact generations skip
//! that range:
//!
//! ```text
//! byte b        generation
//! 0x01..=0x2F   b          (1..=47)
//! 0x30..=0x39   textual form, parse "<gen>-<suffix>"
//! 0x3A..=0xFF   b - 10     (48..=245)
//! ```
//!
//! Generations above 245 cannot be compacted and stay textual.

use std::cmp::Ordering;

/// Maximum number of generation digits in a textual revision ID.
pub const MAX_GEN_DIGITS: usize = 8;

/// Largest generation representable in the compacted single-byte form.
pub const MAX_COMPACT_GEN: u32 = 0xFF - 10;

/// Parses bytes as an ASCII decimal number. Returns 0 on any non-digit, so 0
/// doubles as the failure signal (a valid generation is never 0).
fn parse_digits(digits: &[u8]) -> u32 {
    let mut result: u32 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return 0;
        }
        result = 10 * result + u32::from(b - b'0');
    }
    result
}

/// Parses a textual revision ID into `(generation, suffix)`.
///
/// Returns `None` when the dash is missing, leading, past the 8th byte, or
/// trailing, or when the prefix is not a positive decimal number.
pub fn parse(rev: &[u8]) -> Option<(u32, &[u8])> {
    let dash = rev.iter().position(|&b| b == b'-')?;
    if dash == 0 || dash > MAX_GEN_DIGITS || dash == rev.len() - 1 {
        return None;
    }
    let gen = parse_digits(&rev[..dash]);
    if gen == 0 {
        return None;
    }
    Some((gen, &rev[dash + 1..]))
}

/// Parses a revision ID that may be in either compacted or textual form.
///
/// Succeeds for any non-empty input: a leading ASCII digit means textual
/// form (delegated to [`parse`], which can still reject it), anything else is
/// a packed generation byte followed by the raw suffix.
pub fn parse_compacted(rev: &[u8]) -> Option<(u32, &[u8])> {
    let &first = rev.first()?;
    if first.is_ascii_digit() {
        return parse(rev);
    }
    let gen = if first > b'9' {
        u32::from(first) - 10
    } else {
        u32::from(first)
    };
    Some((gen, &rev[1..]))
}

/// Total order over textual revision IDs.
///
/// Both sides parse: compare generations numerically, then suffixes
/// byte-lexicographically. Either side fails to parse: compare the whole IDs
/// byte-lexicographically.
pub fn compare(a: &[u8], b: &[u8]) -> Ordering {
    match (parse(a), parse(b)) {
        (Some((gen_a, suffix_a)), Some((gen_b, suffix_b))) => {
            gen_a.cmp(&gen_b).then_with(|| suffix_a.cmp(suffix_b))
        }
        _ => a.cmp(b),
    }
}

/// Converts a textual revision ID to its compacted form.
///
/// Returns `None` when the ID does not parse or its generation exceeds
/// [`MAX_COMPACT_GEN`].
pub fn compact(rev: &[u8]) -> Option<Vec<u8>> {
    let (gen, suffix) = parse(rev)?;
    if gen > MAX_COMPACT_GEN {
        return None;
    }
    let lead = if gen < u32::from(b'0') {
        gen as u8
    } else {
        (gen + 10) as u8
    };
    let mut out = Vec::with_capacity(1 + suffix.len());
    out.push(lead);
    out.extend_from_slice(suffix);
    Some(out)
}

/// Converts a revision ID in either form to its textual form.
///
/// Textual input comes back unchanged. Returns `None` only for input that
/// parses in neither form (empty, or textual with a malformed prefix).
pub fn expand(rev: &[u8]) -> Option<Vec<u8>> {
    let first = *rev.first()?;
    if first.is_ascii_digit() {
        parse(rev)?;
        return Some(rev.to_vec());
    }
    let (gen, suffix) = parse_compacted(rev)?;
    let mut out = gen.to_string().into_bytes();
    out.push(b'-');
    out.extend_from_slice(suffix);
    Some(out)
}

/// Returns the generation of a revision ID in either form, or 0 when it does
/// not parse.
pub fn generation(rev: &[u8]) -> u32 {
    parse_compacted(rev).map_or(0, |(gen, _)| gen)
}

#[cfg(test)]
mod tests;
