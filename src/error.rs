use thiserror::Error;

use crate::node::NodeKey;

/// Errors raised by structural tree operations and configuration parsing.
///
/// Navigation and lookup never fail; they report boundaries as `false` or `None`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The key refers to a node that was freed (or never belonged to this tree).
    #[error("node key {0:?} does not refer to a live node")]
    StaleKey(NodeKey),
    /// The node already has a parent or is already a root.
    #[error("node {0:?} is already attached to the tree")]
    AlreadyAttached(NodeKey),
    /// Attaching the child would make a node its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeKey, child: NodeKey },
    /// The same node was listed twice in one bulk operation.
    #[error("node {0:?} appears more than once")]
    DuplicateChild(NodeKey),
    /// Attaching would put a second node with this id into the displayed forest.
    #[error("id `{0}` is already used in the tree")]
    DuplicateId(String),
    /// A preset name did not match any known preset.
    #[error("unknown {kind} preset `{name}`")]
    UnknownPreset { kind: &'static str, name: String },
}
