use std::ops::{Index, IndexMut};

use rustc_hash::{FxBuildHasher, FxHashSet};
use tracing::debug;

use crate::error::TreeError;
use crate::node::{Node, NodeKey, NodeRef};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

/// Ordered forest of nodes plus a single focus pointer.
///
/// All nodes live in an arena owned by the tree. [`Tree::insert`] creates a detached node;
/// it becomes part of the displayed forest once attached under a root with
/// [`Tree::add_child`]/[`Tree::set_children`] or registered as a root itself.
#[derive(Debug)]
pub struct Tree<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    roots: Vec<NodeKey>,
    focused: Option<NodeKey>,
    len: usize,
}

/// Expansion and focus captured by node id, for restoring after a rebuild.
///
/// With the `serde` feature enabled, this type derives `Serialize`/`Deserialize`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeSnapshot {
    /// Id of the focused node.
    pub focused: Option<String>,
    /// Ids of expanded nodes, in pre-order.
    pub expanded: Vec<String>,
}

/// Pre-order iterator over navigable nodes (see [`Tree::visible_nodes`]).
pub struct VisibleNodes<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<NodeKey>,
}

impl<'a, T> Iterator for VisibleNodes<'a, T> {
    type Item = NodeRef<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(key) = self.stack.pop() {
            let Some(node) = self.tree.node(key) else {
                continue;
            };
            if node.is_expanded() {
                self.stack
                    .extend(node.node().child_keys().iter().rev().copied());
            }
            if node.is_visible() {
                return Some(node);
            }
        }
        None
    }
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    /// Creates an empty tree.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            roots: Vec::new(),
            focused: None,
            len: 0,
        }
    }

    /// Creates an empty tree with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    /// Number of live nodes, attached or not.
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores a detached node and returns its key.
    pub fn insert(&mut self, node: Node<T>) -> NodeKey {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.generation = slot.generation.wrapping_add(1);
            slot.node = Some(node);
            return NodeKey {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeKey {
            index,
            generation: 0,
        }
    }

    pub(crate) fn get(&self, key: NodeKey) -> Option<&Node<T>> {
        self.slots
            .get(key.index)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, key: NodeKey) -> Option<&mut Node<T>> {
        self.slots
            .get_mut(key.index)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Returns a hierarchy-aware handle, or `None` for a stale key.
    pub fn node(&self, key: NodeKey) -> Option<NodeRef<'_, T>> {
        self.get(key).map(|node| NodeRef::new(self, key, node))
    }

    /// Returns the node for flag or payload mutation, or `None` for a stale key.
    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut Node<T>> {
        self.get_mut(key)
    }

    /// Keys of the top-level nodes in display order.
    pub fn root_keys(&self) -> &[NodeKey] {
        &self.roots
    }

    /// Top-level nodes in display order.
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = NodeRef<'_, T>> {
        self.roots.iter().filter_map(|key| self.node(*key))
    }

    /// Appends `child` to the children of `parent`.
    ///
    /// When `parent` is part of the displayed forest, ids in the child's subtree must not
    /// already be in use there.
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), TreeError> {
        self.check_attachable(Some(parent), child)?;
        if self.is_attached(parent) {
            let mut taken = self.attached_ids(&[]);
            self.claim_ids(&[child], &mut taken)?;
        }
        self[child].parent = Some(parent);
        self[parent].children.push(child);
        self.invalidate(parent);
        Ok(())
    }

    /// Replaces the children of `parent`.
    ///
    /// Previous children missing from `children` are freed together with their subtrees.
    pub fn set_children(&mut self, parent: NodeKey, children: Vec<NodeKey>) -> Result<(), TreeError> {
        if self.get(parent).is_none() {
            return Err(TreeError::StaleKey(parent));
        }
        let mut seen = FxHashSet::with_capacity_and_hasher(children.len(), FxBuildHasher);
        for &child in &children {
            if !seen.insert(child) {
                return Err(TreeError::DuplicateChild(child));
            }
            let node = self.get(child).ok_or(TreeError::StaleKey(child))?;
            if node.parent == Some(parent) {
                continue;
            }
            self.check_attachable(Some(parent), child)?;
        }
        if self.is_attached(parent) {
            let mut taken = self.attached_ids(&self[parent].children);
            self.claim_ids(&children, &mut taken)?;
        }

        let previous = std::mem::take(&mut self[parent].children);
        for key in previous {
            if !seen.contains(&key) {
                self.free_subtree(key);
            }
        }
        for &child in &children {
            self[child].parent = Some(parent);
        }
        self[parent].children = children;
        self.invalidate(parent);
        Ok(())
    }

    /// Removes (and frees) the direct child of `parent` with the given id.
    ///
    /// Returns `false` if `parent` is stale or has no such child.
    pub fn remove_child(&mut self, parent: NodeKey, id: &str) -> bool {
        let Some(node) = self.get(parent) else {
            return false;
        };
        let Some(pos) = node
            .children
            .iter()
            .position(|key| self.get(*key).is_some_and(|child| child.id() == id))
        else {
            return false;
        };
        let child = self[parent].children.remove(pos);
        self.free_subtree(child);
        self.invalidate(parent);
        true
    }

    /// Appends a detached node to the top-level list.
    pub fn add_root(&mut self, key: NodeKey) -> Result<(), TreeError> {
        self.check_attachable(None, key)?;
        let mut taken = self.attached_ids(&[]);
        self.claim_ids(&[key], &mut taken)?;
        self.roots.push(key);
        Ok(())
    }

    /// Replaces the top-level list.
    ///
    /// Previous roots missing from `roots` are freed. Focus is kept if a node with the same
    /// id is still reachable, otherwise it falls back to the default. Ids must be unique
    /// across the new forest.
    pub fn set_nodes(&mut self, roots: Vec<NodeKey>) -> Result<(), TreeError> {
        let mut seen = FxHashSet::with_capacity_and_hasher(roots.len(), FxBuildHasher);
        for &key in &roots {
            if !seen.insert(key) {
                return Err(TreeError::DuplicateChild(key));
            }
            let node = self.get(key).ok_or(TreeError::StaleKey(key))?;
            if node.parent.is_some() {
                return Err(TreeError::AlreadyAttached(key));
            }
        }
        self.claim_ids(&roots, &mut FxHashSet::default())?;

        let focused_id = self
            .focused
            .filter(|key| self.is_attached(*key))
            .map(|key| self[key].id().to_owned());

        let previous = std::mem::replace(&mut self.roots, roots);
        let mut freed = 0;
        for key in previous {
            if !seen.contains(&key) {
                freed += self.free_subtree(key);
            }
        }

        self.focused = focused_id
            .as_deref()
            .and_then(|id| self.find_by_id(id))
            .map(|node| node.key());
        debug!(
            roots = self.roots.len(),
            freed,
            focus_kept = self.focused.is_some(),
            "replaced tree roots"
        );
        Ok(())
    }

    /// Searches every root, pre-order, for the first node with `id`.
    pub fn find_by_id(&self, id: &str) -> Option<NodeRef<'_, T>> {
        self.nodes().find_map(|root| root.find_by_id(id))
    }

    /// Iterates navigable nodes in pre-order.
    ///
    /// A node is yielded iff its own `visible` flag is set; its children are walked only
    /// when it is expanded, so anything below a collapsed node is skipped.
    pub fn iter_visible(&self) -> VisibleNodes<'_, T> {
        VisibleNodes {
            tree: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// Collects [`Tree::iter_visible`]; this order drives every move operation.
    pub fn visible_nodes(&self) -> Vec<NodeRef<'_, T>> {
        self.iter_visible().collect()
    }

    /// Position of the node in [`Tree::visible_nodes`].
    pub fn visible_index_of(&self, key: NodeKey) -> Option<usize> {
        self.iter_visible().position(|node| node.key() == key)
    }

    /// Key of the focused node.
    ///
    /// Without an explicit (still attached) focus this is the first visible node, or the
    /// first root if nothing is visible. A focused node hidden by a collapsed ancestor stays
    /// focused.
    pub fn focused_key(&self) -> Option<NodeKey> {
        self.focused
            .filter(|key| self.is_attached(*key))
            .or_else(|| self.iter_visible().next().map(|node| node.key()))
            .or_else(|| self.roots.first().copied())
    }

    pub fn focused_node(&self) -> Option<NodeRef<'_, T>> {
        self.focused_key().and_then(|key| self.node(key))
    }

    pub fn is_focused(&self, key: NodeKey) -> bool {
        self.focused_key() == Some(key)
    }

    /// Focuses the node with `id`; returns `false` (focus unchanged) if there is none.
    pub fn set_focused_node(&mut self, id: &str) -> bool {
        let Some(key) = self.find_by_id(id).map(|node| node.key()) else {
            return false;
        };
        self.focused = Some(key);
        true
    }

    /// Moves focus to the previous visible node.
    pub fn move_up(&mut self) -> bool {
        self.step_focus(false)
    }

    /// Moves focus to the next visible node.
    pub fn move_down(&mut self) -> bool {
        self.step_focus(true)
    }

    fn step_focus(&mut self, forward: bool) -> bool {
        let Some(focused) = self.focused_key() else {
            return false;
        };
        let mut prev = None;
        let mut target = None;
        let mut iter = self.iter_visible().map(|node| node.key());
        while let Some(key) = iter.next() {
            if key == focused {
                target = if forward { iter.next() } else { prev };
                break;
            }
            prev = Some(key);
        }
        let Some(target) = target else {
            return false;
        };
        self.focused = Some(target);
        true
    }

    /// Moves focus to the focused node's parent.
    pub fn focus_parent(&mut self) -> bool {
        let Some(parent) = self.focused_node().and_then(|node| node.node().parent_key()) else {
            return false;
        };
        self.focused = Some(parent);
        true
    }

    /// Moves focus to the first visible node; `false` if it is already there.
    pub fn focus_first(&mut self) -> bool {
        let first = self.iter_visible().next().map(|node| node.key());
        self.focus_if_changed(first)
    }

    /// Moves focus to the last visible node; `false` if it is already there.
    pub fn focus_last(&mut self) -> bool {
        let last = self.iter_visible().last().map(|node| node.key());
        self.focus_if_changed(last)
    }

    fn focus_if_changed(&mut self, target: Option<NodeKey>) -> bool {
        match target {
            Some(key) if self.focused_key() != Some(key) => {
                self.focused = Some(key);
                true
            }
            _ => false,
        }
    }

    /// Expands the focused node; `false` if it is childless or already expanded.
    pub fn expand_focused(&mut self) -> bool {
        self.update_focused(|node| {
            if node.is_expanded() {
                return false;
            }
            node.expand();
            true
        })
    }

    /// Collapses the focused node; `false` if it is childless or already collapsed.
    pub fn collapse_focused(&mut self) -> bool {
        self.update_focused(|node| {
            if !node.is_expanded() {
                return false;
            }
            node.collapse();
            true
        })
    }

    /// Toggles the focused node; `false` if it is childless.
    pub fn toggle_focused(&mut self) -> bool {
        self.update_focused(|node| {
            node.toggle();
            true
        })
    }

    fn update_focused(&mut self, update: impl FnOnce(&mut Node<T>) -> bool) -> bool {
        let Some(key) = self.focused_key() else {
            return false;
        };
        let changed = self
            .get_mut(key)
            .filter(|node| node.has_children())
            .is_some_and(update);
        if changed {
            self.focused = Some(key);
        }
        changed
    }

    /// Expands every node that has children.
    pub fn expand_all(&mut self) {
        self.set_all_expanded(true);
    }

    /// Collapses every node that has children.
    pub fn collapse_all(&mut self) {
        self.set_all_expanded(false);
    }

    fn set_all_expanded(&mut self, expanded: bool) {
        for key in self.attached_keys() {
            let node = &mut self[key];
            if node.has_children() {
                node.set_expanded(expanded);
            }
        }
    }

    /// Expands every ancestor of the node with `id` so it becomes navigable.
    pub fn expand_to(&mut self, id: &str) -> bool {
        let Some(node) = self.find_by_id(id) else {
            return false;
        };
        let mut ancestors = Vec::with_capacity(node.depth());
        let mut current = node.parent();
        while let Some(parent) = current {
            ancestors.push(parent.key());
            current = parent.parent();
        }
        for key in ancestors {
            self[key].expand();
        }
        true
    }

    /// Captures focus and expansion by id.
    pub fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            focused: self.focused_node().map(|node| node.id().to_owned()),
            expanded: self
                .attached_keys()
                .into_iter()
                .filter(|key| self[*key].is_expanded())
                .map(|key| self[key].id().to_owned())
                .collect(),
        }
    }

    /// Applies a snapshot: listed ids are expanded, every other node collapsed, and focus is
    /// moved to the snapshot's focused id when it still exists.
    pub fn restore(&mut self, snapshot: &TreeSnapshot) {
        let expanded: FxHashSet<&str> = snapshot.expanded.iter().map(String::as_str).collect();
        for key in self.attached_keys() {
            let node = &mut self[key];
            let is_expanded = expanded.contains(node.id());
            node.set_expanded(is_expanded);
        }
        if let Some(id) = snapshot.focused.as_deref() {
            let _ = self.set_focused_node(id);
        }
    }

    // Pre-order keys of every node reachable from a root.
    fn attached_keys(&self) -> Vec<NodeKey> {
        let mut keys = Vec::with_capacity(self.len);
        let mut stack: Vec<NodeKey> = self.roots.iter().rev().copied().collect();
        while let Some(key) = stack.pop() {
            let Some(node) = self.get(key) else {
                continue;
            };
            keys.push(key);
            stack.extend(node.children.iter().rev().copied());
        }
        keys
    }

    // Ids of the displayed forest, leaving out the subtrees rooted at `skip`.
    fn attached_ids(&self, skip: &[NodeKey]) -> FxHashSet<&str> {
        let mut ids = FxHashSet::with_capacity_and_hasher(self.len, FxBuildHasher);
        let mut stack: Vec<NodeKey> = self.roots.clone();
        while let Some(key) = stack.pop() {
            if skip.contains(&key) {
                continue;
            }
            let Some(node) = self.get(key) else {
                continue;
            };
            ids.insert(node.id());
            stack.extend_from_slice(&node.children);
        }
        ids
    }

    // Adds every id under `keys` to `taken`, failing on the first one already present.
    fn claim_ids<'a>(
        &'a self,
        keys: &[NodeKey],
        taken: &mut FxHashSet<&'a str>,
    ) -> Result<(), TreeError> {
        let mut stack = keys.to_vec();
        while let Some(key) = stack.pop() {
            let Some(node) = self.get(key) else {
                continue;
            };
            if !taken.insert(node.id()) {
                return Err(TreeError::DuplicateId(node.id().to_owned()));
            }
            stack.extend_from_slice(&node.children);
        }
        Ok(())
    }

    fn is_attached(&self, key: NodeKey) -> bool {
        let mut current = key;
        loop {
            let Some(node) = self.get(current) else {
                return false;
            };
            match node.parent {
                Some(parent) => current = parent,
                None => return self.roots.contains(&current),
            }
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeKey, key: NodeKey) -> bool {
        let mut current = Some(key);
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = self.get(key).and_then(|node| node.parent);
        }
        false
    }

    fn check_attachable(&self, parent: Option<NodeKey>, child: NodeKey) -> Result<(), TreeError> {
        let node = self.get(child).ok_or(TreeError::StaleKey(child))?;
        if node.parent.is_some() || self.roots.contains(&child) {
            return Err(TreeError::AlreadyAttached(child));
        }
        if let Some(parent) = parent {
            if self.get(parent).is_none() {
                return Err(TreeError::StaleKey(parent));
            }
            if self.is_ancestor_or_self(child, parent) {
                return Err(TreeError::Cycle { parent, child });
            }
        }
        Ok(())
    }

    // A node's cached grandchildren fact depends on its children and grandchildren.
    fn invalidate(&self, key: NodeKey) {
        let Some(node) = self.get(key) else {
            return;
        };
        node.grandchildren.set(None);
        if let Some(parent) = node.parent.and_then(|parent| self.get(parent)) {
            parent.grandchildren.set(None);
        }
    }

    fn free_subtree(&mut self, key: NodeKey) -> usize {
        let mut freed = 0;
        let mut stack = vec![key];
        while let Some(key) = stack.pop() {
            let Some(slot) = self.slots.get_mut(key.index) else {
                continue;
            };
            if slot.generation != key.generation {
                continue;
            }
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
                self.free.push(key.index);
                self.len -= 1;
                freed += 1;
            }
        }
        if freed > 1 {
            debug!(freed, "freed detached subtree");
        }
        freed
    }
}

impl<T> Index<NodeKey> for Tree<T> {
    type Output = Node<T>;

    fn index(&self, key: NodeKey) -> &Self::Output {
        match self.get(key) {
            Some(node) => node,
            None => panic!("{key:?} does not refer to a live node"),
        }
    }
}

impl<T> IndexMut<NodeKey> for Tree<T> {
    fn index_mut(&mut self, key: NodeKey) -> &mut Self::Output {
        match self.get_mut(key) {
            Some(node) => node,
            None => panic!("{key:?} does not refer to a live node"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // a -> {b, c}, d
    fn scenario() -> Tree<()> {
        let mut tree = Tree::new();
        let a = tree.insert(Node::new("a", "a", ()));
        let b = tree.insert(Node::new("a/b.txt", "b.txt", ()));
        let c = tree.insert(Node::new("a/c.txt", "c.txt", ()));
        let d = tree.insert(Node::new("d.txt", "d.txt", ()));
        tree.add_child(a, b).unwrap();
        tree.add_child(a, c).unwrap();
        tree.set_nodes(vec![a, d]).unwrap();
        tree
    }

    fn visible_names<T>(tree: &Tree<T>) -> Vec<&str> {
        tree.iter_visible().map(|node| node.name()).collect()
    }

    #[test]
    fn collapsed_children_are_not_visible() {
        let tree = scenario();
        assert_eq!(visible_names(&tree), vec!["a", "d.txt"]);
    }

    #[test]
    fn expand_focused_reveals_children_once() {
        let mut tree = scenario();
        assert!(tree.set_focused_node("a"));
        assert!(tree.expand_focused());
        assert_eq!(visible_names(&tree), vec!["a", "b.txt", "c.txt", "d.txt"]);
        assert!(!tree.expand_focused());
    }

    #[test]
    fn focus_defaults_to_first_visible_node() {
        let tree = scenario();
        assert_eq!(tree.focused_node().map(|n| n.id()), Some("a"));
        assert!(Tree::<()>::new().focused_node().is_none());
    }

    #[test]
    fn move_stops_at_boundaries() {
        let mut tree = scenario();
        assert!(!tree.move_up());
        assert_eq!(tree.focused_node().map(|n| n.id()), Some("a"));

        assert!(tree.move_down());
        assert_eq!(tree.focused_node().map(|n| n.id()), Some("d.txt"));
        assert!(!tree.move_down());
        assert_eq!(tree.focused_node().map(|n| n.id()), Some("d.txt"));
        assert!(tree.move_up());
        assert_eq!(tree.focused_node().map(|n| n.id()), Some("a"));
    }

    #[test]
    fn empty_tree_does_not_move() {
        let mut tree = Tree::<()>::new();
        assert!(!tree.move_up());
        assert!(!tree.move_down());
        assert!(!tree.toggle_focused());
    }

    #[test]
    fn childless_focus_cannot_expand() {
        let mut tree = scenario();
        assert!(tree.set_focused_node("d.txt"));
        assert!(!tree.expand_focused());
        assert!(!tree.collapse_focused());
        assert!(!tree.toggle_focused());
    }

    #[test]
    fn collapse_and_toggle_report_changes() {
        let mut tree = scenario();
        assert!(!tree.collapse_focused());
        assert!(tree.toggle_focused());
        assert!(tree.node(tree.root_keys()[0]).unwrap().is_expanded());
        assert!(tree.collapse_focused());
        assert!(!tree.collapse_focused());
    }

    #[test]
    fn focus_stays_on_node_hidden_by_collapse() {
        let mut tree = scenario();
        tree.expand_all();
        assert!(tree.set_focused_node("a/c.txt"));
        tree.collapse_all();

        // Focus is left stale rather than reassigned to the collapsed ancestor.
        assert_eq!(tree.focused_node().map(|n| n.id()), Some("a/c.txt"));
        assert!(!tree.move_up());
        assert!(!tree.move_down());
        assert!(tree.focus_parent());
        assert_eq!(tree.focused_node().map(|n| n.id()), Some("a"));
    }

    #[test]
    fn hidden_nodes_are_skipped() {
        let mut tree = scenario();
        let d = tree.find_by_id("d.txt").unwrap().key();
        tree.node_mut(d).unwrap().set_visible(false);
        assert_eq!(visible_names(&tree), vec!["a"]);
        assert!(!tree.move_down());
    }

    #[test]
    fn expand_all_and_collapse_all_ignore_leaves() {
        let mut tree = scenario();
        tree.expand_all();
        assert_eq!(tree.visible_nodes().len(), 4);
        assert!(!tree.find_by_id("d.txt").unwrap().is_expanded());
        tree.collapse_all();
        assert_eq!(visible_names(&tree), vec!["a", "d.txt"]);
    }

    #[test]
    fn set_focused_node_misses_unknown_id() {
        let mut tree = scenario();
        assert!(tree.set_focused_node("d.txt"));
        assert!(!tree.set_focused_node("missing"));
        assert_eq!(tree.focused_node().map(|n| n.id()), Some("d.txt"));
    }

    #[test]
    fn set_nodes_keeps_focus_by_id() {
        let mut tree = scenario();
        assert!(tree.set_focused_node("d.txt"));

        let fresh_d = tree.insert(Node::new("d.txt", "d.txt", ()));
        let e = tree.insert(Node::new("e", "e", ()));
        tree.set_nodes(vec![e, fresh_d]).unwrap();

        assert_eq!(tree.focused_key(), Some(fresh_d));
        assert!(tree.find_by_id("a/b.txt").is_none());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn set_nodes_falls_back_to_default_focus() {
        let mut tree = scenario();
        assert!(tree.set_focused_node("a/b.txt"));
        let e = tree.insert(Node::new("e", "e", ()));
        tree.set_nodes(vec![e]).unwrap();
        assert_eq!(tree.focused_node().map(|n| n.id()), Some("e"));
    }

    #[test]
    fn removed_focus_is_cleared() {
        let mut tree = scenario();
        assert!(tree.set_focused_node("a/c.txt"));
        let a = tree.root_keys()[0];
        assert!(tree.remove_child(a, "a/c.txt"));
        assert!(!tree.remove_child(a, "a/c.txt"));
        assert_eq!(tree.focused_node().map(|n| n.id()), Some("a"));
    }

    #[test]
    fn structural_misuse_is_rejected() {
        let mut tree = scenario();
        let a = tree.root_keys()[0];
        let b = tree.find_by_id("a/b.txt").unwrap().key();
        let loose = tree.insert(Node::new("x", "x", ()));

        assert_eq!(tree.add_child(loose, b), Err(TreeError::AlreadyAttached(b)));
        assert_eq!(tree.add_child(b, a), Err(TreeError::AlreadyAttached(a)));
        assert_eq!(
            tree.add_child(loose, loose),
            Err(TreeError::Cycle {
                parent: loose,
                child: loose
            })
        );
        assert_eq!(
            tree.set_nodes(vec![loose, loose]),
            Err(TreeError::DuplicateChild(loose))
        );

        assert!(tree.remove_child(a, "a/b.txt"));
        assert_eq!(tree.add_child(a, b), Err(TreeError::StaleKey(b)));
        assert!(tree.node(b).is_none());

        let twin = tree.insert(Node::new("a/c.txt", "c.txt", ()));
        assert_eq!(
            tree.add_child(a, twin),
            Err(TreeError::DuplicateId("a/c.txt".to_string()))
        );
        assert_eq!(tree.add_root(twin), Err(TreeError::DuplicateId("a/c.txt".to_string())));
        tree.set_children(loose, vec![twin]).unwrap();
        assert_eq!(tree.add_root(loose), Err(TreeError::DuplicateId("a/c.txt".to_string())));
        let d = tree.find_by_id("d.txt").unwrap().key();
        let other_d = tree.insert(Node::new("d.txt", "d.txt", ()));
        assert_eq!(
            tree.set_nodes(vec![d, other_d]),
            Err(TreeError::DuplicateId("d.txt".to_string()))
        );
        assert_eq!(tree.root_keys().len(), 2);
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn ids_may_move_within_one_parent() {
        let mut tree = scenario();
        let a = tree.root_keys()[0];
        let c = tree.find_by_id("a/c.txt").unwrap().key();
        let fresh_b = tree.insert(Node::new("a/b.txt", "b.txt", ()));
        tree.set_children(a, vec![c, fresh_b]).unwrap();
        let ids: Vec<_> = tree.node(a).unwrap().children().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["a/c.txt", "a/b.txt"]);

        let dup = tree.insert(Node::new("a/c.txt", "c.txt", ()));
        assert_eq!(
            tree.set_children(a, vec![c, dup]),
            Err(TreeError::DuplicateId("a/c.txt".to_string()))
        );
        assert_eq!(tree.node(a).unwrap().children().count(), 2);
    }

    #[test]
    fn stale_keys_do_not_resolve_after_slot_reuse() {
        let mut tree = scenario();
        let a = tree.root_keys()[0];
        let c = tree.find_by_id("a/c.txt").unwrap().key();
        assert!(tree.remove_child(a, "a/c.txt"));
        let reused = tree.insert(Node::new("z", "z", ()));
        assert_eq!(reused.index, c.index);
        assert!(tree.node(c).is_none());
        assert_eq!(tree.node(reused).map(|n| n.id()), Some("z"));
    }

    #[test]
    fn set_children_rewires_and_frees() {
        let mut tree = scenario();
        let a = tree.root_keys()[0];
        let c = tree.find_by_id("a/c.txt").unwrap().key();
        let n = tree.insert(Node::new("a/n.txt", "n.txt", ()));
        tree.set_children(a, vec![n, c]).unwrap();

        let ids: Vec<_> = tree.node(a).unwrap().children().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["a/n.txt", "a/c.txt"]);
        assert!(tree.find_by_id("a/b.txt").is_none());
        assert_eq!(tree.node(n).unwrap().parent().map(|p| p.key()), Some(a));
        assert!(tree.node(c).unwrap().is_last_child());
    }

    #[test]
    fn expand_to_reveals_deep_node() {
        let mut tree = scenario();
        assert!(tree.expand_to("a/c.txt"));
        assert!(tree.set_focused_node("a/c.txt"));
        assert_eq!(tree.visible_index_of(tree.focused_key().unwrap()), Some(2));
        assert!(!tree.expand_to("missing"));
    }

    #[test]
    fn focus_first_and_last() {
        let mut tree = scenario();
        tree.expand_all();
        assert!(!tree.focus_first());
        assert!(tree.focus_last());
        assert_eq!(tree.focused_node().map(|n| n.id()), Some("d.txt"));
        assert!(!tree.focus_last());
    }

    #[test]
    fn snapshot_restores_expansion_and_focus() {
        let mut tree = scenario();
        assert!(tree.set_focused_node("a/b.txt"));
        tree.expand_all();
        let snapshot = tree.snapshot();
        assert_eq!(snapshot.expanded, vec!["a".to_string()]);

        let mut rebuilt = scenario();
        rebuilt.restore(&snapshot);
        assert_eq!(visible_names(&rebuilt).len(), 4);
        assert_eq!(rebuilt.focused_node().map(|n| n.id()), Some("a/b.txt"));
    }
}
