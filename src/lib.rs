//! Interactive tree engine for ratatui: a keyed node arena with focus and expansion state,
//! a pluggable render policy, box-drawn line rendering and a scrolling view.
//!
//! Feature flags:
//! - `keymap`: crossterm-based key bindings and `TreeView::handle_key*` helpers.
//! - `serde`: serde support for `ViewConfig`, the preset enums and `TreeSnapshot`.

mod action;
pub mod ansi;
mod builder;
mod context;
mod error;
mod glyphs;
#[cfg(feature = "keymap")]
mod keymap;
mod node;
pub mod prelude;
mod provider;
mod render;
mod style;
mod tree;
mod viewport;
mod widget;

pub use action::{TreeAction, TreeEvent};
pub use builder::{PathEntry, PathRecord, build_tree};
pub use context::RowContext;
pub use error::TreeError;
pub use glyphs::{BranchStyle, BranchStylePreset, ExpanderControls, ExpanderPreset};
#[cfg(feature = "keymap")]
pub use keymap::{KeymapProfile, TreeKeyBindings};
pub use node::{Node, NodeKey, NodeRef};
pub use provider::{DefaultProvider, NodeProvider, PathProvider};
pub use render::{max_line_width, render, render_lines, render_string};
pub use style::{ScrollPolicy, TreeViewStyle, ViewConfig};
pub use tree::{Tree, TreeSnapshot, VisibleNodes};
pub use viewport::{TreeView, Viewport};
pub use widget::TreeViewWidget;
