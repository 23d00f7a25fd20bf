//! # CLI — Tidepool Revision-Tree Shell
//!
//! A REPL for poking at document revision trees. Reads commands from stdin,
//! applies them to an in-memory document store, and prints results to
//! stdout. Designed for both interactive use and scripted testing (pipe
//! commands via stdin).
//!
//! ## Commands
//!
//! ```text
//! INSERT doc rev parent [body..]   Insert a revision (parent "-" = root)
//! BRANCH doc rev parent [body..]   Insert allowing a conflicting branch
//! DELETE doc rev parent            Insert a deletion tombstone
//! HIST   doc r1,r2,.. [body..]     Splice a newest-first remote history
//! CUR    doc                       Show the current revision
//! LEAVES doc                       List leaf revisions
//! CONFLICT doc                     Report whether the doc is in conflict
//! HISTORY doc rev                  Ancestry path of a revision
//! ANCESTORS doc rev                Known ancestors to offer for a remote rev
//! PRUNE  doc depth                 Discard revisions beyond a depth
//! PURGE  doc r1,r2,..              Remove revisions outright
//! SAVE   doc                       Encode, assign a sequence, reload
//! LOAD   doc                       Re-decode the last saved blob
//! CHANGES since                    Docs saved after a sequence number
//! STATS  [doc]                     Store or tree debug info
//! EXIT / QUIT                      Leave the shell
//! ```
//!
//! ## Configuration
//!
//! ```text
//! TIDEPOOL_MAX_DEPTH      revisions kept per doc at save  (default: 20)
//! TIDEPOOL_MAX_ANCESTORS  cap on the ANCESTORS list       (default: 10)
//! ```

mod store;

use anyhow::Result;
use revtree::MAX_POSSIBLE_ANCESTORS;
use std::io::{self, BufRead, Write};
use store::Store;

/// Reads a configuration value from the environment, falling back to `default`.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Splits a comma-separated revision list into byte slices.
fn split_revs(arg: &str) -> Vec<&[u8]> {
    arg.split(',')
        .filter(|r| !r.is_empty())
        .map(str::as_bytes)
        .collect()
}

fn show_rev(id: &[u8]) -> String {
    String::from_utf8_lossy(id).into_owned()
}

fn main() -> Result<()> {
    let max_depth: usize = env_or("TIDEPOOL_MAX_DEPTH", "20").parse().unwrap_or(20);
    let max_ancestors: usize = env_or("TIDEPOOL_MAX_ANCESTORS", "10")
        .parse()
        .unwrap_or(MAX_POSSIBLE_ANCESTORS);

    let mut store = Store::new(max_depth);

    println!(
        "Tidepool shell started (max_depth={}, max_ancestors={})",
        max_depth, max_ancestors
    );
    println!("Commands: INSERT doc rev parent [body] | BRANCH .. | DELETE doc rev parent");
    println!("          HIST doc revs [body] | CUR doc | LEAVES doc | CONFLICT doc");
    println!("          HISTORY doc rev | ANCESTORS doc rev | PRUNE doc n | PURGE doc revs");
    println!("          SAVE doc | LOAD doc | CHANGES since | STATS [doc] | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            match cmd.to_uppercase().as_str() {
                "INSERT" | "BRANCH" => {
                    let allow_conflict = cmd.eq_ignore_ascii_case("BRANCH");
                    match (parts.next(), parts.next(), parts.next()) {
                        (Some(doc), Some(rev), Some(parent)) => {
                            let body: String = parts.collect::<Vec<&str>>().join(" ");
                            let parent = (parent != "-").then(|| parent.as_bytes());
                            match store.tree_mut(doc).insert(
                                rev.as_bytes(),
                                body.as_bytes(),
                                false,
                                parent,
                                allow_conflict,
                            ) {
                                Ok(_) => println!("OK"),
                                Err(e) => println!("ERR insert failed: {}", e),
                            }
                        }
                        _ => println!("ERR usage: {} doc rev parent [body]", cmd),
                    }
                }
                "DELETE" => match (parts.next(), parts.next(), parts.next()) {
                    (Some(doc), Some(rev), Some(parent)) => {
                        let parent = (parent != "-").then(|| parent.as_bytes());
                        match store
                            .tree_mut(doc)
                            .insert(rev.as_bytes(), b"", true, parent, false)
                        {
                            Ok(_) => println!("OK"),
                            Err(e) => println!("ERR delete failed: {}", e),
                        }
                    }
                    _ => println!("ERR usage: DELETE doc rev parent"),
                },
                "HIST" => match (parts.next(), parts.next()) {
                    (Some(doc), Some(revs)) => {
                        let body: String = parts.collect::<Vec<&str>>().join(" ");
                        let history = split_revs(revs);
                        match store
                            .tree_mut(doc)
                            .insert_history(&history, body.as_bytes(), false)
                        {
                            Ok(ancestor) if ancestor == history.len() => {
                                println!("OK (no common ancestor)")
                            }
                            Ok(ancestor) => println!("OK (common ancestor at {})", ancestor),
                            Err(e) => println!("ERR hist failed: {}", e),
                        }
                    }
                    _ => println!("ERR usage: HIST doc rev1,rev2,.. [body]"),
                },
                "CUR" => match parts.next() {
                    Some(doc) => match store.tree_mut(doc).current() {
                        Some(node) => {
                            let mut out = show_rev(node.rev_id());
                            if node.is_deleted() {
                                out.push_str(" (deleted)");
                            }
                            if !node.body().is_empty() {
                                out.push_str(" -> ");
                                out.push_str(&String::from_utf8_lossy(node.body()));
                            }
                            println!("{}", out);
                        }
                        None => println!("(empty)"),
                    },
                    None => println!("ERR usage: CUR doc"),
                },
                "LEAVES" => match parts.next() {
                    Some(doc) => {
                        let tree = store.tree_mut(doc);
                        let mut count = 0;
                        for leaf in tree.leaves() {
                            count += 1;
                            if leaf.is_deleted() {
                                println!("{} (deleted)", show_rev(leaf.rev_id()));
                            } else {
                                println!("{}", show_rev(leaf.rev_id()));
                            }
                        }
                        println!("({} leaves)", count);
                    }
                    None => println!("ERR usage: LEAVES doc"),
                },
                "CONFLICT" => match parts.next() {
                    Some(doc) => {
                        if store.tree_mut(doc).has_conflict() {
                            println!("conflict");
                        } else {
                            println!("no conflict");
                        }
                    }
                    None => println!("ERR usage: CONFLICT doc"),
                },
                "HISTORY" => match (parts.next(), parts.next()) {
                    (Some(doc), Some(rev)) => {
                        match store.tree_mut(doc).history(rev.as_bytes(), usize::MAX, &[]) {
                            Some(path) if path.is_empty() => println!("(root)"),
                            Some(path) => {
                                let joined: Vec<String> = path.iter().map(|r| show_rev(r)).collect();
                                println!("{}", joined.join(","));
                            }
                            None => println!("ERR unknown revision: {}", rev),
                        }
                    }
                    _ => println!("ERR usage: HISTORY doc rev"),
                },
                "ANCESTORS" => match (parts.next(), parts.next()) {
                    (Some(doc), Some(rev)) => {
                        let offered = store
                            .tree_mut(doc)
                            .possible_ancestors(rev.as_bytes(), max_ancestors);
                        if offered.is_empty() {
                            println!("(none)");
                        } else {
                            let joined: Vec<String> = offered.iter().map(|r| show_rev(r)).collect();
                            println!("{}", joined.join(","));
                        }
                    }
                    _ => println!("ERR usage: ANCESTORS doc rev"),
                },
                "PRUNE" => match (parts.next(), parts.next().and_then(|d| d.parse().ok())) {
                    (Some(doc), Some(depth)) => {
                        let pruned = store.tree_mut(doc).prune(depth);
                        println!("OK (pruned {})", pruned);
                    }
                    _ => println!("ERR usage: PRUNE doc depth"),
                },
                "PURGE" => match (parts.next(), parts.next()) {
                    (Some(doc), Some(revs)) => {
                        let purged = store.tree_mut(doc).purge(&split_revs(revs));
                        println!("OK (purged {})", purged);
                    }
                    _ => println!("ERR usage: PURGE doc rev1,rev2,.."),
                },
                "SAVE" => match parts.next() {
                    Some(doc) => match store.save(doc) {
                        Ok(info) => println!(
                            "OK (seq={}, offset={}, bytes={}, pruned={})",
                            info.sequence, info.offset, info.bytes, info.pruned
                        ),
                        Err(e) => println!("ERR save failed: {}", e),
                    },
                    None => println!("ERR usage: SAVE doc"),
                },
                "LOAD" => match parts.next() {
                    Some(doc) => match store.load(doc).map(|tree| tree.len()) {
                        Ok(revisions) => {
                            let sequence = store.saved(doc).map_or(0, |s| s.sequence);
                            println!("OK ({} revisions, seq={})", revisions, sequence);
                        }
                        Err(e) => println!("ERR load failed: {}", e),
                    },
                    None => println!("ERR usage: LOAD doc"),
                },
                "CHANGES" => {
                    let since: u64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
                    let changes = store.changes_since(since);
                    for (doc, seq) in &changes {
                        println!("{} {}", seq, doc);
                    }
                    println!("({} changes)", changes.len());
                }
                "STATS" => match parts.next() {
                    Some(doc) => match store.tree(doc) {
                        Some(tree) => println!("{:?}", tree),
                        None => println!("ERR unknown doc: {}", doc),
                    },
                    None => println!(
                        "docs={} last_seq={} max_depth={}",
                        store.doc_count(),
                        store.last_sequence(),
                        store.max_depth()
                    ),
                },
                "EXIT" | "QUIT" => {
                    println!("bye");
                    break;
                }
                other => {
                    println!("unknown command: {}", other);
                }
            }
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    Ok(())
}
