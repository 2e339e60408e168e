/// Navigation commands a host can drive into a [`TreeView`](crate::TreeView).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeAction<Custom = ()> {
    /// Focus the previous visible node.
    MoveUp,
    /// Focus the next visible node.
    MoveDown,
    /// Expand the focused node.
    Expand,
    /// Collapse the focused node.
    Collapse,
    /// Toggle expansion of the focused node.
    Toggle,
    /// Expand every node with children.
    ExpandAll,
    /// Collapse every node with children.
    CollapseAll,
    /// Focus the parent of the focused node.
    FocusParent,
    /// Focus the first visible node.
    FocusFirst,
    /// Focus the last visible node.
    FocusLast,
    /// Custom action forwarded to the caller without internal handling.
    Custom(Custom),
}

/// Result of handling an action or key event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeEvent<Custom = ()> {
    /// The action changed focus or expansion.
    Handled,
    /// The action was a no-op (boundary reached, nothing to expand, ...).
    Unhandled,
    /// The action is forwarded to the caller for handling.
    Action(TreeAction<Custom>),
}

impl<Custom> TreeEvent<Custom> {
    pub(crate) const fn from_changed(changed: bool) -> Self {
        if changed { Self::Handled } else { Self::Unhandled }
    }

    pub const fn is_handled(&self) -> bool {
        matches!(self, Self::Handled)
    }
}
