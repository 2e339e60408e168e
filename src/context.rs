/// Per-line facts handed to a [`NodeProvider`](crate::NodeProvider) when styling a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowContext {
    pub depth: usize,
    pub is_focused: bool,
    pub is_last: bool,
    pub has_children: bool,
    pub is_expanded: bool,
}
