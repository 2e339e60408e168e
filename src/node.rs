use std::cell::Cell;
use std::fmt;

use smallvec::SmallVec;

use crate::tree::Tree;

/// Handle to a node stored in a [`Tree`].
///
/// Keys are generational: once the node is freed, the key never resolves again,
/// even if its slot is reused by a later insert.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl fmt::Debug for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeKey({}v{})", self.index, self.generation)
    }
}

/// A tree vertex: identity, display label, payload and display-state flags.
///
/// Parent and children are stored as keys into the owning [`Tree`]; the child list is the
/// only ownership edge, the parent key is used for traversal only.
#[derive(Clone, Debug)]
pub struct Node<T> {
    id: String,
    name: String,
    data: T,
    expanded: bool,
    visible: bool,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
    // Memoized "some child has children"; cleared by the tree on structural edits.
    pub(crate) grandchildren: Cell<Option<bool>>,
}

impl<T> Node<T> {
    /// Creates a detached, visible, collapsed node.
    pub fn new(id: impl Into<String>, name: impl Into<String>, data: T) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data,
            expanded: false,
            visible: true,
            parent: None,
            children: Vec::new(),
            grandchildren: Cell::new(None),
        }
    }

    /// Sets the initial expansion state.
    #[must_use]
    pub const fn with_expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    /// Sets the initial visibility.
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub const fn data(&self) -> &T {
        &self.data
    }

    /// Returns the payload for in-place mutation.
    pub const fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    pub const fn parent_key(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Children in display order.
    pub fn child_keys(&self) -> &[NodeKey] {
        &self.children
    }

    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub const fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub const fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
    }

    pub const fn expand(&mut self) {
        self.expanded = true;
    }

    pub const fn collapse(&mut self) {
        self.expanded = false;
    }

    pub const fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub const fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// Borrowed view of a node inside its tree, used for hierarchy queries.
pub struct NodeRef<'a, T> {
    tree: &'a Tree<T>,
    key: NodeKey,
    node: &'a Node<T>,
}

impl<T> Clone for NodeRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeRef<'_, T> {}

impl<T> fmt::Debug for NodeRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", &self.key)
            .field("id", &self.node.id)
            .finish_non_exhaustive()
    }
}

impl<'a, T> NodeRef<'a, T> {
    pub(crate) const fn new(tree: &'a Tree<T>, key: NodeKey, node: &'a Node<T>) -> Self {
        Self { tree, key, node }
    }

    pub const fn key(&self) -> NodeKey {
        self.key
    }

    /// Returns the underlying node with the tree's lifetime.
    pub const fn node(&self) -> &'a Node<T> {
        self.node
    }

    pub fn id(&self) -> &'a str {
        &self.node.id
    }

    pub fn name(&self) -> &'a str {
        &self.node.name
    }

    pub const fn data(&self) -> &'a T {
        &self.node.data
    }

    pub const fn is_root(&self) -> bool {
        self.node.is_root()
    }

    pub fn has_children(&self) -> bool {
        self.node.has_children()
    }

    pub const fn is_expanded(&self) -> bool {
        self.node.expanded
    }

    pub const fn is_visible(&self) -> bool {
        self.node.visible
    }

    pub fn parent(&self) -> Option<Self> {
        self.node.parent.and_then(|key| self.tree.node(key))
    }

    /// Children in display order.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = NodeRef<'a, T>> + use<'a, T> {
        let tree = self.tree;
        let node = self.node;
        node.children.iter().filter_map(move |key| tree.node(*key))
    }

    /// Number of ancestors between this node and its top-level root.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(node) = current {
            depth += 1;
            current = node.parent();
        }
        depth
    }

    /// `true` for parentless nodes, otherwise whether this is the parent's final child.
    pub fn is_last_child(&self) -> bool {
        self.parent()
            .is_none_or(|parent| parent.node.children.last() == Some(&self.key))
    }

    /// Last-child flags of the ancestors, root-first.
    ///
    /// The top-level root is excluded (it owns no connector column); the direct parent is
    /// included. A node at depth `d` yields `d - 1` flags.
    pub fn ancestor_is_last_child(&self) -> SmallVec<[bool; 8]> {
        let mut flags = SmallVec::new();
        let mut current = self.parent();
        while let Some(node) = current {
            if node.is_root() {
                break;
            }
            flags.push(node.is_last_child());
            current = node.parent();
        }
        flags.reverse();
        flags
    }

    /// Whether any child has children of its own. Memoized until the next structural edit.
    pub fn has_grandchildren(&self) -> bool {
        if let Some(cached) = self.node.grandchildren.get() {
            return cached;
        }
        let result = self.children().any(|child| child.has_children());
        self.node.grandchildren.set(Some(result));
        result
    }

    /// Pre-order search of the subtree rooted here (including this node).
    pub fn find_by_id(&self, id: &str) -> Option<Self> {
        let mut stack = vec![*self];
        while let Some(node) = stack.pop() {
            if node.id() == id {
                return Some(node);
            }
            stack.extend(node.children().rev());
        }
        None
    }
}
