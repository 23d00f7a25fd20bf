use crate::RevTree;

/// Asserts the structural invariants every operation must preserve: parent
/// indices in range, acyclic parent chains, the leaf flag on exactly the
/// unreferenced nodes, and child generation = parent generation + 1.
pub fn check_invariants(tree: &RevTree) {
    let len = tree.len();
    assert!(len <= usize::from(u16::MAX), "node count over capacity");

    let mut referenced = vec![false; len];
    for i in 0..len {
        let node = tree.node(i).unwrap();
        assert!(!node.rev_id().is_empty(), "node {} has an empty rev id", i);

        if let Some(p) = node.parent_index() {
            assert!(p < len, "node {} parent {} out of range", i, p);
            referenced[p] = true;
            let parent = tree.node(p).unwrap();
            assert_eq!(
                revid::generation(node.rev_id()),
                revid::generation(parent.rev_id()) + 1,
                "generation step broken between node {} and parent {}",
                i,
                p
            );
        }

        // a parent chain longer than the tree means a cycle
        let mut steps = 0;
        let mut cursor = Some(i);
        while let Some(c) = cursor {
            steps += 1;
            assert!(steps <= len, "parent cycle reachable from node {}", i);
            cursor = tree.parent_index(c);
        }
    }

    for i in 0..len {
        assert_eq!(
            tree.node(i).unwrap().is_leaf(),
            !referenced[i],
            "leaf flag disagrees with references at node {}",
            i
        );
    }
}

/// A linear history `1-r01 -> 2-r02 -> ... -> n-r..`, single leaf at the tip.
pub fn chain(n: usize) -> RevTree {
    let mut tree = RevTree::new();
    let mut parent: Option<Vec<u8>> = None;
    for gen in 1..=n {
        let id = rev(gen, "r");
        tree.insert(&id, b"", false, parent.as_deref(), false)
            .unwrap();
        parent = Some(id);
    }
    tree
}

/// Builds `"{gen}-{suffix}{gen:02}"`, e.g. `rev(3, "r")` is `3-r03`.
pub fn rev(gen: usize, suffix: &str) -> Vec<u8> {
    format!("{}-{}{:02}", gen, suffix, gen).into_bytes()
}
