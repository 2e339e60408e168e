pub use crate::{
    BranchStyle, BranchStylePreset, DefaultProvider, ExpanderControls, ExpanderPreset, Node,
    NodeKey, NodeProvider, NodeRef, PathEntry, PathProvider, PathRecord, RowContext,
    ScrollPolicy, Tree, TreeAction, TreeError, TreeEvent, TreeSnapshot, TreeView,
    TreeViewStyle, TreeViewWidget, ViewConfig, Viewport, build_tree, render_lines,
    render_string,
};

#[cfg(feature = "keymap")]
pub use crate::{KeymapProfile, TreeKeyBindings};
