//! merge::tree
//!
//! The subtree tree merger: a pure N-way merge over flattened, already
//! path-prefixed entry lists, one per source in config order.
//!
//! # Algorithm
//!
//! Output paths are visited in ascending lexicographic order. At each path:
//!
//! - exactly one contributor: the entry goes into the merged output;
//! - more than one contributor: one [`Overlap`] per contributor pair, no
//!   entry is emitted, and the walk **continues**, so a single pass
//!   reports every colliding path for the ref rather than just the first.
//!
//! A second class of hard collision is detected alongside exact-path
//! matches: a file at path `p` from one source while another source
//! contributes entries under `p/`. Such a pair cannot coexist in a git
//! tree (blob and directory with the same name), so it is reported as an
//! overlap between `p` and the first entry under `p/`.
//!
//! # Purity
//!
//! This function touches no repository state and accumulates nothing
//! outside its return value. Success and conflict are the two variants of
//! [`TreeMergeOutcome`]; the caller decides what to do with either.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::git::TreeEntry;

/// One pair of sources colliding at an output path.
///
/// Sources are identified by their index into the input slice (config
/// order); the caller maps indices back to display names. For exact-path
/// collisions `path_a == path_b`; for file-vs-directory collisions
/// `path_b` is a path under `path_a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap {
    /// Index of the first colliding source.
    pub source_a: usize,
    /// Colliding path contributed by the first source.
    pub path_a: String,
    /// Index of the second colliding source.
    pub source_b: usize,
    /// Colliding path contributed by the second source.
    pub path_b: String,
}

/// Result of merging N entry lists: a usable tree or a conflict report,
/// never both.
#[derive(Debug)]
pub enum TreeMergeOutcome {
    /// No collisions; the combined entries, sorted by path.
    Merged(Vec<TreeEntry>),
    /// At least one collision; every colliding pair, in path order.
    Overlapping(Vec<Overlap>),
}

/// Merge N flattened entry lists into one.
///
/// `sources` holds one entry list per source, in config order, with
/// target-directory prefixes already applied.
pub fn merge_entries(sources: &[Vec<TreeEntry>]) -> TreeMergeOutcome {
    // N-way merge of sorted streams, realized as an ordered index from
    // output path to its contributors.
    let mut by_path: BTreeMap<&str, Vec<(usize, &TreeEntry)>> = BTreeMap::new();
    for (index, entries) in sources.iter().enumerate() {
        for entry in entries {
            by_path
                .entry(entry.path.as_str())
                .or_default()
                .push((index, entry));
        }
    }

    let mut merged = Vec::new();
    let mut overlaps = Vec::new();

    for (&path, contributors) in &by_path {
        let mut conflicted = false;

        if contributors.len() > 1 {
            conflicted = true;
            for (i, &(source_a, _)) in contributors.iter().enumerate() {
                for &(source_b, _) in &contributors[i + 1..] {
                    overlaps.push(Overlap {
                        source_a,
                        path_a: path.to_string(),
                        source_b,
                        path_b: path.to_string(),
                    });
                }
            }
        }

        // A single git tree cannot hold both a blob `p` and entries under
        // `p/`, so any such pair here necessarily crosses sources. Checked
        // for contested paths as well, so exact and file-vs-directory
        // collisions at the same path are all reported.
        let child_prefix = format!("{}/", path);
        let child = by_path
            .range::<str, _>((Bound::Included(child_prefix.as_str()), Bound::Unbounded))
            .next()
            .filter(|(key, _)| key.starts_with(child_prefix.as_str()));

        if let Some((&child_path, child_contributors)) = child {
            conflicted = true;
            let (source_b, _) = child_contributors[0];
            for &(source_a, _) in contributors {
                overlaps.push(Overlap {
                    source_a,
                    path_a: path.to_string(),
                    source_b,
                    path_b: child_path.to_string(),
                });
            }
        }

        if !conflicted {
            merged.push(contributors[0].1.clone());
        }
    }

    if overlaps.is_empty() {
        TreeMergeOutcome::Merged(merged)
    } else {
        TreeMergeOutcome::Overlapping(overlaps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Oid;

    fn entry(path: &str) -> TreeEntry {
        TreeEntry {
            path: path.to_string(),
            mode: 0o100644,
            id: Oid::new("a".repeat(40)).unwrap(),
        }
    }

    fn entries(paths: &[&str]) -> Vec<TreeEntry> {
        paths.iter().map(|p| entry(p)).collect()
    }

    #[test]
    fn disjoint_sources_merge_completely() {
        let sources = vec![
            entries(&["a.txt", "src/lib.rs"]),
            entries(&["libs/b/b.txt", "libs/b/src/lib.rs"]),
        ];

        match merge_entries(&sources) {
            TreeMergeOutcome::Merged(merged) => {
                let paths: Vec<_> = merged.iter().map(|e| e.path.as_str()).collect();
                assert_eq!(
                    paths,
                    ["a.txt", "libs/b/b.txt", "libs/b/src/lib.rs", "src/lib.rs"]
                );
            }
            TreeMergeOutcome::Overlapping(overlaps) => {
                panic!("unexpected overlaps: {:?}", overlaps)
            }
        }
    }

    #[test]
    fn merged_count_is_sum_of_inputs() {
        let sources = vec![
            entries(&["x/a", "x/b", "x/c"]),
            entries(&["y/a", "y/b"]),
            entries(&["z/only"]),
        ];

        match merge_entries(&sources) {
            TreeMergeOutcome::Merged(merged) => assert_eq!(merged.len(), 6),
            TreeMergeOutcome::Overlapping(_) => panic!("expected a clean merge"),
        }
    }

    #[test]
    fn exact_collision_yields_single_pair() {
        let sources = vec![entries(&["x/f", "x/only1"]), entries(&["x/f", "x/only2"])];

        match merge_entries(&sources) {
            TreeMergeOutcome::Overlapping(overlaps) => {
                assert_eq!(overlaps.len(), 1);
                assert_eq!(overlaps[0].path_a, "x/f");
                assert_eq!(overlaps[0].path_b, "x/f");
                assert_eq!((overlaps[0].source_a, overlaps[0].source_b), (0, 1));
            }
            TreeMergeOutcome::Merged(_) => panic!("expected overlap at x/f"),
        }
    }

    #[test]
    fn three_way_collision_yields_all_pairs() {
        let sources = vec![
            entries(&["README.md"]),
            entries(&["README.md"]),
            entries(&["README.md"]),
        ];

        match merge_entries(&sources) {
            TreeMergeOutcome::Overlapping(overlaps) => {
                let pairs: Vec<_> = overlaps
                    .iter()
                    .map(|o| (o.source_a, o.source_b))
                    .collect();
                assert_eq!(pairs, [(0, 1), (0, 2), (1, 2)]);
            }
            TreeMergeOutcome::Merged(_) => panic!("expected overlaps"),
        }
    }

    #[test]
    fn all_collisions_found_in_one_pass() {
        let sources = vec![
            entries(&["a.txt", "b.txt", "c.txt"]),
            entries(&["a.txt", "c.txt", "d.txt"]),
        ];

        match merge_entries(&sources) {
            TreeMergeOutcome::Overlapping(overlaps) => {
                let paths: Vec<_> = overlaps.iter().map(|o| o.path_a.as_str()).collect();
                assert_eq!(paths, ["a.txt", "c.txt"]);
            }
            TreeMergeOutcome::Merged(_) => panic!("expected overlaps"),
        }
    }

    #[test]
    fn file_vs_directory_is_an_overlap() {
        // Source 0 has a file `libs`, source 1 contributes under `libs/`.
        let sources = vec![entries(&["libs"]), entries(&["libs/b/b.txt"])];

        match merge_entries(&sources) {
            TreeMergeOutcome::Overlapping(overlaps) => {
                assert_eq!(overlaps.len(), 1);
                assert_eq!(overlaps[0].path_a, "libs");
                assert_eq!(overlaps[0].path_b, "libs/b/b.txt");
            }
            TreeMergeOutcome::Merged(_) => panic!("expected a file/directory overlap"),
        }
    }

    #[test]
    fn contested_file_with_directory_child_reports_every_pair() {
        // `x` is contested between sources 0 and 1 while source 2
        // contributes under `x/`; both collision classes are reported.
        let sources = vec![entries(&["x"]), entries(&["x"]), entries(&["x/a"])];

        match merge_entries(&sources) {
            TreeMergeOutcome::Overlapping(overlaps) => {
                let pairs: Vec<_> = overlaps
                    .iter()
                    .map(|o| (o.source_a, o.source_b, o.path_b.as_str()))
                    .collect();
                assert_eq!(pairs, [(0, 1, "x"), (0, 2, "x/a"), (1, 2, "x/a")]);
            }
            TreeMergeOutcome::Merged(_) => panic!("expected overlaps"),
        }
    }

    #[test]
    fn name_prefix_without_separator_is_not_a_collision() {
        // `lib` vs `libs/...` and `lib.rs` share a string prefix but not a
        // path prefix.
        let sources = vec![entries(&["lib", "lib.rs"]), entries(&["libs/x"])];

        match merge_entries(&sources) {
            TreeMergeOutcome::Merged(merged) => assert_eq!(merged.len(), 3),
            TreeMergeOutcome::Overlapping(overlaps) => {
                panic!("unexpected overlaps: {:?}", overlaps)
            }
        }
    }

    #[test]
    fn empty_sources_merge_to_empty() {
        let sources: Vec<Vec<TreeEntry>> = vec![vec![], vec![]];
        match merge_entries(&sources) {
            TreeMergeOutcome::Merged(merged) => assert!(merged.is_empty()),
            TreeMergeOutcome::Overlapping(_) => panic!("expected empty merge"),
        }
    }
}
