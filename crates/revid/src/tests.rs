use super::*;

// -------------------- Textual parsing --------------------

#[test]
fn parse_simple() {
    assert_eq!(parse(b"1-aa"), Some((1, b"aa".as_slice())));
    assert_eq!(parse(b"42-deadbeef"), Some((42, b"deadbeef".as_slice())));
    assert_eq!(parse(b"99999999-x"), Some((99_999_999, b"x".as_slice())));
}

#[test]
fn parse_rejects_missing_or_misplaced_dash() {
    assert_eq!(parse(b"1aa"), None); // no dash
    assert_eq!(parse(b"-aa"), None); // dash leading
    assert_eq!(parse(b"1-"), None); // dash trailing
    assert_eq!(parse(b"123456789-x"), None); // 9 digits
}

#[test]
fn parse_rejects_bad_generation() {
    assert_eq!(parse(b"0-aa"), None); // zero generation
    assert_eq!(parse(b"1x-aa"), None); // non-digit in prefix
    assert_eq!(parse(b"x1-aa"), None);
}

#[test]
fn parse_eight_digit_boundary() {
    // dash at position 8 is the last accepted spot
    assert_eq!(parse(b"12345678-s"), Some((12_345_678, b"s".as_slice())));
}

#[test]
fn parse_empty() {
    assert_eq!(parse(b""), None);
    assert_eq!(parse_compacted(b""), None);
}

// -------------------- Compacted parsing --------------------

#[test]
fn parse_compacted_low_byte() {
    // bytes below the digit range carry the generation directly
    assert_eq!(parse_compacted(b"\x05abc"), Some((5, b"abc".as_slice())));
    assert_eq!(parse_compacted(b"\x2Fq"), Some((47, b"q".as_slice())));
}

#[test]
fn parse_compacted_high_byte() {
    // bytes above the digit range are shifted down by 10
    assert_eq!(parse_compacted(b"\x3Aabc"), Some((48, b"abc".as_slice())));
    assert_eq!(parse_compacted(b"\xFFq"), Some((245, b"q".as_slice())));
}

#[test]
fn parse_compacted_delegates_textual() {
    assert_eq!(parse_compacted(b"3-cc"), Some((3, b"cc".as_slice())));
    // a leading digit that is not a well-formed textual ID still fails
    assert_eq!(parse_compacted(b"3cc"), None);
}

// -------------------- Compact / expand round-trip --------------------

#[test]
fn compact_round_trips_for_representable_generations() {
    for gen in [1u32, 2, 9, 10, 47, 48, 57, 58, 100, 245] {
        let textual = format!("{}-cafebabe", gen).into_bytes();
        let packed = compact(&textual).expect("representable generation");
        assert_eq!(
            parse_compacted(&packed),
            Some((gen, b"cafebabe".as_slice())),
            "gen {}",
            gen
        );
        assert_eq!(expand(&packed).unwrap(), textual, "gen {}", gen);
    }
}

#[test]
fn compact_never_emits_a_digit_lead_byte() {
    for gen in 1..=MAX_COMPACT_GEN {
        let textual = format!("{}-s", gen).into_bytes();
        let packed = compact(&textual).unwrap();
        assert!(!packed[0].is_ascii_digit(), "gen {} packed to digit", gen);
    }
}

#[test]
fn compact_rejects_overlarge_generation() {
    assert_eq!(compact(b"246-s"), None);
    assert_eq!(compact(b"not-a-number-really"), None);
}

#[test]
fn expand_keeps_textual_input() {
    assert_eq!(expand(b"7-abc").unwrap(), b"7-abc".to_vec());
}

// -------------------- Comparison --------------------

#[test]
fn compare_orders_by_generation_then_suffix() {
    assert_eq!(compare(b"1-aa", b"2-aa"), Ordering::Less);
    assert_eq!(compare(b"10-aa", b"2-zz"), Ordering::Greater);
    assert_eq!(compare(b"2-aa", b"2-bb"), Ordering::Less);
    assert_eq!(compare(b"2-bb", b"2-bb"), Ordering::Equal);
}

#[test]
fn compare_falls_back_to_lexicographic() {
    // "10" < "9" lexicographically; both unparseable (no dash)
    assert_eq!(compare(b"10", b"9"), Ordering::Less);
    // one side unparseable forces the fallback for the pair
    assert_eq!(compare(b"2-aa", b"10"), Ordering::Greater);
}

#[test]
fn compare_is_antisymmetric_and_transitive() {
    let ids: &[&[u8]] = &[
        b"1-aa", b"1-ab", b"2-aa", b"2-bb", b"10-aa", b"10-zz", b"junk", b"also-junk", b"9",
    ];
    for &a in ids {
        assert_eq!(compare(a, a), Ordering::Equal);
        for &b in ids {
            assert_eq!(compare(a, b), compare(b, a).reverse(), "{:?} vs {:?}", a, b);
            for &c in ids {
                if compare(a, b) == Ordering::Less && compare(b, c) == Ordering::Less {
                    assert_eq!(compare(a, c), Ordering::Less, "{:?} {:?} {:?}", a, b, c);
                }
            }
        }
    }
}

#[test]
fn generation_helper() {
    assert_eq!(generation(b"12-x"), 12);
    assert_eq!(generation(b"\x20x"), 0x20);
    // leading digit but malformed: textual parse fails
    assert_eq!(generation(b"3cc"), 0);
    assert_eq!(generation(b""), 0);
}
