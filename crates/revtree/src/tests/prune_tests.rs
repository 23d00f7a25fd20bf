use super::helpers::{chain, check_invariants, rev};
use crate::RevTree;
use anyhow::Result;

// -------------------- prune --------------------

#[test]
fn prune_linear_chain() {
    let mut tree = chain(10);
    let pruned = tree.prune(3);
    assert_eq!(pruned, 7);

    assert_eq!(tree.len(), 3);
    assert_eq!(tree.leaves().count(), 1);
    let tip = tree.current().unwrap().rev_id().to_vec();
    assert_eq!(tip, rev(10, "r"));

    // the surviving chain ends at a root where its ancestry was cut
    let path = tree.history(&tip, 10, &[]).unwrap();
    assert_eq!(path, vec![rev(9, "r"), rev(8, "r")]);
    check_invariants(&tree);
}

#[test]
fn prune_noop_cases() {
    let mut tree = chain(5);
    assert_eq!(tree.prune(0), 0);
    assert_eq!(tree.prune(5), 0);
    assert_eq!(tree.prune(100), 0);
    assert_eq!(tree.len(), 5);
}

#[test]
fn prune_uses_max_depth_across_leaves() -> Result<()> {
    // 1-a .. 5-a linear, plus a short branch 2-b off the root
    let mut tree = RevTree::new();
    tree.insert(b"1-aa", b"", false, None, false)?;
    tree.insert(b"2-aa", b"", false, Some(b"1-aa"), false)?;
    tree.insert(b"3-aa", b"", false, Some(b"2-aa"), false)?;
    tree.insert(b"4-aa", b"", false, Some(b"3-aa"), false)?;
    tree.insert(b"5-aa", b"", false, Some(b"4-aa"), false)?;
    tree.insert(b"2-bb", b"", false, Some(b"1-aa"), true)?;

    // 1-aa is depth 2 from leaf 2-bb, but depth 5 from leaf 5-aa: it goes.
    let pruned = tree.prune(3);
    assert_eq!(pruned, 2); // 1-aa and 2-aa

    assert!(!tree.contains(b"1-aa"));
    assert!(!tree.contains(b"2-aa"));
    assert!(tree.contains(b"2-bb"));

    // survivors cut loose from pruned ancestry become roots
    assert_eq!(tree.get(b"2-bb").unwrap().parent_index(), None);
    assert_eq!(tree.get(b"3-aa").unwrap().parent_index(), None);
    check_invariants(&tree);
    Ok(())
}

#[test]
fn prune_counts_shared_ancestors_once() -> Result<()> {
    // two equal-depth leaves above a shared over-depth chain
    let mut tree = chain(4);
    tree.insert(&rev(5, "a"), b"", false, Some(&rev(4, "r")), false)?;
    tree.insert(&rev(5, "b"), b"", false, Some(&rev(4, "r")), true)?;

    let pruned = tree.prune(2);
    assert_eq!(pruned, 3); // 1-r, 2-r, 3-r, each counted once
    assert_eq!(tree.len(), 3);
    assert!(tree.contains(&rev(4, "r")));
    check_invariants(&tree);
    Ok(())
}

// -------------------- purge --------------------

#[test]
fn purge_leaf_promotes_parent() -> Result<()> {
    let mut tree = chain(3);
    let purged = tree.purge(&[&rev(3, "r")]);
    assert_eq!(purged, 1);

    assert_eq!(tree.len(), 2);
    assert!(tree.get(&rev(2, "r")).unwrap().is_leaf());
    assert_eq!(tree.current().unwrap().rev_id(), rev(2, "r").as_slice());
    check_invariants(&tree);
    Ok(())
}

#[test]
fn purge_interior_after_its_leaf() {
    // 2-r only becomes purgeable once 3-r is gone; one call, two passes
    let mut tree = chain(3);
    let purged = tree.purge(&[&rev(2, "r"), &rev(3, "r")]);
    assert_eq!(purged, 2);

    assert_eq!(tree.len(), 1);
    assert!(tree.get(&rev(1, "r")).unwrap().is_leaf());
    check_invariants(&tree);
}

#[test]
fn purge_interior_alone_is_refused() {
    let mut tree = chain(3);
    let purged = tree.purge(&[&rev(2, "r")]);
    assert_eq!(purged, 0);
    assert_eq!(tree.len(), 3);
    check_invariants(&tree);
}

#[test]
fn purge_ignores_unknown_ids() {
    let mut tree = chain(2);
    let purged = tree.purge(&[b"9-zz", b""]);
    assert_eq!(purged, 0);
    assert_eq!(tree.len(), 2);
}

#[test]
fn purge_both_conflict_leaves() -> Result<()> {
    let mut tree = RevTree::new();
    tree.insert(b"1-aa", b"", false, None, false)?;
    tree.insert(b"2-bb", b"", false, Some(b"1-aa"), false)?;
    tree.insert(b"2-cc", b"", false, Some(b"1-aa"), true)?;

    assert_eq!(tree.purge(&[b"2-bb", b"2-cc"]), 2);
    assert_eq!(tree.len(), 1);
    // the root only becomes a leaf again once both children are gone
    assert!(tree.get(b"1-aa").unwrap().is_leaf());
    check_invariants(&tree);
    Ok(())
}

#[test]
fn purge_resolves_a_conflict() -> Result<()> {
    let mut tree = RevTree::new();
    tree.insert(b"1-aa", b"", false, None, false)?;
    tree.insert(b"2-bb", b"keep", false, Some(b"1-aa"), false)?;
    tree.insert(b"2-cc", b"lose", false, Some(b"1-aa"), true)?;
    assert!(tree.has_conflict());

    assert_eq!(tree.purge(&[b"2-cc"]), 1);
    assert!(!tree.has_conflict());
    assert_eq!(tree.current().unwrap().rev_id(), b"2-bb");
    // 2-bb still references 1-aa, so it stays interior
    assert!(!tree.get(b"1-aa").unwrap().is_leaf());
    check_invariants(&tree);
    Ok(())
}
