use rustc_hash::{FxBuildHasher, FxHashMap};
use tracing::{debug, trace};

use crate::node::{Node, NodeKey};
use crate::tree::Tree;

/// A record addressed by a `/`-delimited relative path.
pub trait PathRecord {
    fn path(&self) -> &str;
}

impl PathRecord for String {
    fn path(&self) -> &str {
        self
    }
}

impl PathRecord for &str {
    fn path(&self) -> &str {
        self
    }
}

/// Payload of a node built by [`build_tree`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathEntry<R> {
    /// Synthesized for a path prefix.
    Directory,
    /// The original input record.
    File(R),
}

impl<R> PathEntry<R> {
    pub const fn is_dir(&self) -> bool {
        matches!(self, Self::Directory)
    }

    pub const fn file(&self) -> Option<&R> {
        match self {
            Self::Directory => None,
            Self::File(record) => Some(record),
        }
    }

    pub const fn file_mut(&mut self) -> Option<&mut R> {
        match self {
            Self::Directory => None,
            Self::File(record) => Some(record),
        }
    }
}

/// Builds a forest from flat relative paths.
///
/// Records are sorted by normalized path first, so any permutation of the same input yields the same
/// tree. Every path prefix becomes a directory node (id = the prefix, name = its last
/// segment) and every record a leaf (id = its normalized path). Top-level entries become
/// the tree's roots; all nodes start collapsed.
///
/// Empty paths are skipped, empty segments (`a//b`, `./a`, trailing `/`) are ignored, and a
/// repeated path keeps the first record. A file whose path is also a prefix of later
/// paths is reused as their directory node.
pub fn build_tree<R, I>(records: I) -> Tree<PathEntry<R>>
where
    R: PathRecord,
    I: IntoIterator<Item = R>,
{
    let mut skipped = 0usize;
    let mut entries: Vec<(String, R)> = Vec::new();
    for record in records {
        let normalized = normalize(record.path());
        if normalized.is_empty() {
            trace!(path = record.path(), "skipping empty path");
            skipped += 1;
            continue;
        }
        entries.push((normalized, record));
    }
    // Ties on the normalized path fall back to the raw path so the kept record is stable.
    entries.sort_by(|(a, ra), (b, rb)| a.cmp(b).then_with(|| ra.path().cmp(rb.path())));

    let mut tree = Tree::with_capacity(entries.len() * 2);
    let mut by_path: FxHashMap<String, NodeKey> =
        FxHashMap::with_capacity_and_hasher(entries.len() * 2, FxBuildHasher);
    let mut roots = Vec::new();
    let mut dirs = 0usize;

    for (full_path, record) in entries {
        if by_path.contains_key(&full_path) {
            trace!(path = %full_path, "skipping repeated path");
            skipped += 1;
            continue;
        }
        let (dir_path, leaf_name) = full_path.rsplit_once('/').unwrap_or(("", &full_path));

        let mut parent: Option<NodeKey> = None;
        let mut prefix = String::with_capacity(full_path.len());
        for segment in dir_path.split('/').filter(|segment| !segment.is_empty()) {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            let key = if let Some(&key) = by_path.get(&prefix) {
                key
            } else {
                let key = tree.insert(Node::new(prefix.clone(), segment, PathEntry::Directory));
                attach(&mut tree, &mut roots, parent, key);
                by_path.insert(prefix.clone(), key);
                dirs += 1;
                key
            };
            parent = Some(key);
        }

        let name = leaf_name.to_owned();
        let key = tree.insert(Node::new(full_path.clone(), name, PathEntry::File(record)));
        attach(&mut tree, &mut roots, parent, key);
        by_path.insert(full_path, key);
    }

    let nodes = by_path.len();
    let root_count = roots.len();
    let result = tree.set_nodes(roots);
    debug_assert!(result.is_ok(), "builder roots are fresh and distinct");
    debug!(nodes, dirs, roots = root_count, skipped, "built path tree");
    tree
}

/// Drops empty and `.` segments: `./a//b/` becomes `a/b`.
fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for segment in path.split('/').filter(|segment| !segment.is_empty() && *segment != ".") {
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(segment);
    }
    out
}

fn attach<T>(tree: &mut Tree<T>, roots: &mut Vec<NodeKey>, parent: Option<NodeKey>, key: NodeKey) {
    match parent {
        Some(parent) => {
            let result = tree.add_child(parent, key);
            debug_assert!(result.is_ok(), "builder keys are fresh and detached");
        }
        None => roots.push(key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape<T>(tree: &Tree<T>) -> Vec<(String, Vec<String>, bool)> {
        tree.nodes()
            .map(|root| {
                (
                    root.name().to_string(),
                    root.children().map(|c| c.name().to_string()).collect(),
                    root.is_expanded(),
                )
            })
            .collect()
    }

    #[test]
    fn empty_input_builds_empty_forest() {
        let tree = build_tree(Vec::<String>::new());
        assert!(tree.root_keys().is_empty());
        assert!(tree.visible_nodes().is_empty());
        assert!(tree.focused_node().is_none());
    }

    #[test]
    fn scenario_paths() {
        let tree = build_tree(["a/b.txt", "a/c.txt", "d.txt"]);
        assert_eq!(
            shape(&tree),
            vec![
                ("a".to_string(), vec!["b.txt".to_string(), "c.txt".to_string()], false),
                ("d.txt".to_string(), vec![], false),
            ]
        );
        let visible: Vec<_> = tree.iter_visible().map(|n| n.name()).collect();
        assert_eq!(visible, vec!["a", "d.txt"]);

        let a = tree.find_by_id("a").unwrap();
        assert!(a.data().is_dir());
        let b = tree.find_by_id("a/b.txt").unwrap();
        assert_eq!(b.data().file(), Some(&"a/b.txt"));
        assert_eq!(b.parent().map(|p| p.id()), Some("a"));
    }

    #[test]
    fn directories_are_shared_and_nested() {
        let tree = build_tree(["src/ui/view.rs", "src/main.rs", "src/ui/mod.rs"]);
        assert_eq!(tree.root_keys().len(), 1);
        let src = tree.find_by_id("src").unwrap();
        let children: Vec<_> = src.children().map(|c| c.id()).collect();
        assert_eq!(children, vec!["src/main.rs", "src/ui"]);
        let ui = tree.find_by_id("src/ui").unwrap();
        assert_eq!(ui.name(), "ui");
        assert_eq!(ui.children().count(), 2);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn degenerate_paths_are_normalized_or_skipped() {
        let tree = build_tree(["", "./a//b.txt", "a/b.txt", "/", "c/"]);
        let ids: Vec<_> = {
            let mut t = tree;
            t.expand_all();
            t.iter_visible().map(|n| n.id().to_string()).collect()
        };
        assert_eq!(ids, vec!["a", "a/b.txt", "c"]);
    }

    #[test]
    fn file_reused_as_directory_keeps_ids_unique() {
        let tree = build_tree(["docs", "docs/readme.md"]);
        let docs = tree.find_by_id("docs").unwrap();
        assert!(!docs.data().is_dir());
        assert_eq!(docs.children().map(|c| c.id()).collect::<Vec<_>>(), vec!["docs/readme.md"]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn file_record_survives_unnormalized_children() {
        for input in [["docs", "./docs/readme.md"], ["./docs/readme.md", "docs"]] {
            let tree = build_tree(input);
            let docs = tree.find_by_id("docs").unwrap();
            assert!(!docs.data().is_dir());
            assert_eq!(docs.data().file(), Some(&"docs"));
            let readme = tree.find_by_id("docs/readme.md").unwrap();
            assert_eq!(readme.data().file(), Some(&"./docs/readme.md"));
            assert_eq!(readme.parent().map(|p| p.id()), Some("docs"));
            assert_eq!(tree.len(), 2);
        }
    }

    #[test]
    fn records_keep_owned_payloads() {
        let mut tree = build_tree(vec!["x/y".to_string()]);
        let y = tree.find_by_id("x/y").unwrap().key();
        if let Some(record) = tree.node_mut(y).and_then(|n| n.data_mut().file_mut()) {
            record.push_str(".bak");
        }
        assert_eq!(
            tree.find_by_id("x/y").unwrap().data().file().map(String::as_str),
            Some("x/y.bak")
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn render_shape<T>(tree: &Tree<T>) -> Vec<(String, usize, bool)> {
        let mut out = Vec::new();
        let mut stack: Vec<_> = tree.nodes().rev().collect();
        while let Some(node) = stack.pop() {
            out.push((node.id().to_string(), node.depth(), node.is_expanded()));
            stack.extend(node.children().rev());
        }
        out
    }

    proptest! {
        /// Input order never changes the resulting forest.
        #[test]
        fn permutations_build_identical_forests(
            (paths, shuffled) in prop::collection::vec("[ab]{1,2}(/[xyz]{1,2}){0,2}", 0..12)
                .prop_flat_map(|paths| (Just(paths.clone()), Just(paths).prop_shuffle()))
        ) {
            let original = build_tree(paths);
            let permuted = build_tree(shuffled);
            prop_assert_eq!(render_shape(&original), render_shape(&permuted));
        }
    }

    #[test]
    fn known_permutation_matches() {
        let a = build_tree(["b/y.txt", "a/x.txt", "a/z.txt"]);
        let b = build_tree(["a/z.txt", "b/y.txt", "a/x.txt"]);
        assert_eq!(render_shape(&a), render_shape(&b));
        assert_eq!(
            render_shape(&a),
            vec![
                ("a".to_string(), 0, false),
                ("a/x.txt".to_string(), 1, false),
                ("a/z.txt".to_string(), 1, false),
                ("b".to_string(), 0, false),
                ("b/y.txt".to_string(), 1, false),
            ]
        );
    }
}
