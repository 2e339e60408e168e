use std::ops::Range;

use ratatui::text::Line;
use tracing::trace;

#[cfg(feature = "keymap")]
use crossterm::event::KeyEvent;

use crate::action::{TreeAction, TreeEvent};
use crate::ansi::line_to_ansi;
#[cfg(feature = "keymap")]
use crate::keymap::TreeKeyBindings;
use crate::provider::NodeProvider;
use crate::render::{self, render_window};
use crate::style::ScrollPolicy;
use crate::tree::Tree;

/// A scrollable window of `height` lines starting at `offset`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub offset: usize,
    pub width: usize,
    pub height: usize,
    pub policy: ScrollPolicy,
}

impl Viewport {
    pub const fn new(width: usize, height: usize) -> Self {
        Self {
            offset: 0,
            width,
            height,
            policy: ScrollPolicy::KeepInView,
        }
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: ScrollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Changes the window size; the offset is kept.
    pub const fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    /// Line indices shown out of `total`, clamped to `[0, total]`.
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = self.offset.min(total);
        let end = self.offset.saturating_add(self.height).min(total);
        start..end
    }

    /// The part of `lines` inside the window; empty once the offset passes the end.
    pub fn slice<'l, L>(&self, lines: &'l [L]) -> &'l [L] {
        &lines[self.range(lines.len())]
    }

    /// Scrolls so line `focused` of `total` is inside the window. Returns whether the offset
    /// changed.
    pub fn align(&mut self, focused: Option<usize>, total: usize) -> bool {
        let Some(focused) = focused else {
            return false;
        };
        let height = self.height.max(1);
        let offset = match self.policy {
            ScrollPolicy::KeepInView => {
                if focused < self.offset {
                    focused
                } else if focused >= self.offset + height {
                    focused + 1 - height
                } else {
                    self.offset
                }
            }
            ScrollPolicy::CenterOnSelect => {
                if total <= height {
                    0
                } else {
                    focused
                        .saturating_sub(height / 2)
                        .min(total.saturating_sub(height))
                }
            }
        };
        if offset == self.offset {
            return false;
        }
        trace!(from = self.offset, to = offset, focused, "viewport scrolled");
        self.offset = offset;
        true
    }
}

/// A tree together with its render policy and scroll window.
///
/// Every navigation method forwards to [`Tree`] and then re-aligns the window on the
/// focused line, so a host only has to route input here and paint [`TreeView::lines`].
#[derive(Debug)]
pub struct TreeView<T, P> {
    tree: Tree<T>,
    provider: P,
    viewport: Viewport,
    #[cfg(feature = "keymap")]
    keymap: TreeKeyBindings,
}

impl<T, P> TreeView<T, P>
where
    P: NodeProvider<T>,
{
    pub fn new(tree: Tree<T>, provider: P) -> Self {
        Self {
            tree,
            provider,
            viewport: Viewport::default(),
            #[cfg(feature = "keymap")]
            keymap: TreeKeyBindings::new(),
        }
    }

    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self.scroll_to_focus();
        self
    }

    pub const fn tree(&self) -> &Tree<T> {
        &self.tree
    }

    /// Direct access to the tree; call [`TreeView::scroll_to_focus`] after structural edits.
    pub const fn tree_mut(&mut self) -> &mut Tree<T> {
        &mut self.tree
    }

    pub fn into_tree(self) -> Tree<T> {
        self.tree
    }

    pub const fn provider(&self) -> &P {
        &self.provider
    }

    pub const fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_scroll_policy(&mut self, policy: ScrollPolicy) {
        self.viewport.policy = policy;
        self.scroll_to_focus();
    }

    #[cfg(feature = "keymap")]
    pub const fn keymap(&self) -> &TreeKeyBindings {
        &self.keymap
    }

    #[cfg(feature = "keymap")]
    pub const fn keymap_mut(&mut self) -> &mut TreeKeyBindings {
        &mut self.keymap
    }

    /// Changes the window size. The offset is kept; only the slice bounds change.
    pub const fn resize(&mut self, width: usize, height: usize) {
        self.viewport.resize(width, height);
    }

    /// Re-aligns the window on the focused line. Returns whether the offset changed.
    pub fn scroll_to_focus(&mut self) -> bool {
        let focused = self
            .tree
            .focused_key()
            .and_then(|key| self.tree.visible_index_of(key));
        let total = self.tree.iter_visible().count();
        self.viewport.align(focused, total)
    }

    fn navigate(&mut self, op: impl FnOnce(&mut Tree<T>) -> bool) -> bool {
        let changed = op(&mut self.tree);
        self.scroll_to_focus();
        changed
    }

    pub fn move_up(&mut self) -> bool {
        self.navigate(Tree::move_up)
    }

    pub fn move_down(&mut self) -> bool {
        self.navigate(Tree::move_down)
    }

    pub fn expand_focused(&mut self) -> bool {
        self.navigate(Tree::expand_focused)
    }

    pub fn collapse_focused(&mut self) -> bool {
        self.navigate(Tree::collapse_focused)
    }

    pub fn toggle_focused(&mut self) -> bool {
        self.navigate(Tree::toggle_focused)
    }

    pub fn focus_parent(&mut self) -> bool {
        self.navigate(Tree::focus_parent)
    }

    pub fn focus_first(&mut self) -> bool {
        self.navigate(Tree::focus_first)
    }

    pub fn focus_last(&mut self) -> bool {
        self.navigate(Tree::focus_last)
    }

    pub fn expand_all(&mut self) {
        self.navigate(|tree| {
            tree.expand_all();
            true
        });
    }

    pub fn collapse_all(&mut self) {
        self.navigate(|tree| {
            tree.collapse_all();
            true
        });
    }

    pub fn set_focused_node(&mut self, id: &str) -> bool {
        self.navigate(|tree| tree.set_focused_node(id))
    }

    /// Expands the ancestors of `id`, focuses it and scrolls it into view.
    pub fn reveal(&mut self, id: &str) -> bool {
        self.navigate(|tree| tree.expand_to(id) && tree.set_focused_node(id))
    }

    /// Styled lines inside the window.
    pub fn lines(&self) -> Vec<Line<'_>> {
        let total = self.tree.iter_visible().count();
        render_window(&self.tree, &self.provider, self.viewport.range(total))
    }

    /// Lines inside the window as ANSI-escaped text.
    pub fn render(&self) -> Vec<String> {
        self.lines().iter().map(line_to_ansi).collect()
    }

    /// The window as one string; empty when the offset is past the last line.
    pub fn view(&self) -> String {
        self.render().join("\n")
    }

    /// Widest line of the whole tree, not just the window.
    pub fn max_line_width(&self) -> usize {
        render::max_line_width(&self.tree, &self.provider)
    }

    /// Applies an action. `Custom` actions are handed back untouched.
    pub fn handle_action<C>(&mut self, action: TreeAction<C>) -> TreeEvent<C> {
        let changed = match action {
            TreeAction::MoveUp => self.move_up(),
            TreeAction::MoveDown => self.move_down(),
            TreeAction::Expand => self.expand_focused(),
            TreeAction::Collapse => self.collapse_focused(),
            TreeAction::Toggle => self.toggle_focused(),
            TreeAction::FocusParent => self.focus_parent(),
            TreeAction::FocusFirst => self.focus_first(),
            TreeAction::FocusLast => self.focus_last(),
            TreeAction::ExpandAll => {
                self.expand_all();
                !self.tree.root_keys().is_empty()
            }
            TreeAction::CollapseAll => {
                self.collapse_all();
                !self.tree.root_keys().is_empty()
            }
            TreeAction::Custom(_) => return TreeEvent::Action(action),
        };
        TreeEvent::from_changed(changed)
    }

    #[cfg(feature = "keymap")]
    pub fn handle_key(&mut self, key: KeyEvent) -> TreeEvent<()> {
        let Some(action) = self.keymap.resolve(key) else {
            return TreeEvent::Unhandled;
        };
        self.handle_action(action)
    }

    #[cfg(feature = "keymap")]
    pub fn handle_key_with<C, F>(&mut self, key: KeyEvent, custom: F) -> TreeEvent<C>
    where
        F: Fn(KeyEvent) -> Option<C>,
    {
        let Some(action) = self.keymap.resolve_with(key, custom) else {
            return TreeEvent::Unhandled;
        };
        self.handle_action(action)
    }
}
