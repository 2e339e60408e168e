use std::borrow::Cow;

use ratatui::style::{Modifier, Style};

use crate::builder::PathEntry;
use crate::context::RowContext;
use crate::glyphs::BranchStyle;
use crate::node::NodeRef;

/// Render policy: everything the renderer asks about a node besides its structure.
///
/// Every method has a default, so an empty `impl NodeProvider<T> for P {}` renders names
/// with the default branch style and reverse-video focus.
pub trait NodeProvider<T> {
    /// Connector and expander glyphs.
    fn branch_style(&self) -> BranchStyle<'_> {
        BranchStyle::default()
    }

    /// Optional icon drawn before the text.
    fn icon<'a>(&'a self, _node: NodeRef<'a, T>) -> Option<Cow<'a, str>> {
        None
    }

    /// Display text; the node name by default.
    fn text<'a>(&'a self, node: NodeRef<'a, T>) -> Cow<'a, str> {
        Cow::Borrowed(node.name())
    }

    /// Optional text appended after the display text.
    fn suffix<'a>(&'a self, _node: NodeRef<'a, T>) -> Option<Cow<'a, str>> {
        None
    }

    /// Style for text and suffix.
    fn style(&self, _node: NodeRef<'_, T>, ctx: &RowContext) -> Style {
        if ctx.is_focused {
            Style::new().add_modifier(Modifier::REVERSED)
        } else {
            Style::new()
        }
    }

    /// Glyph for the expander column, picked from the branch style's expander set.
    fn expander_glyph<'a>(&'a self, node: NodeRef<'a, T>) -> &'a str {
        let expander = self.branch_style().expander;
        if !node.has_children() {
            expander.not_applicable
        } else if node.is_expanded() {
            expander.expanded
        } else {
            expander.collapsed
        }
    }

    /// Style for connector glyphs.
    fn guide_style(&self) -> Style {
        Style::new()
    }
}

/// Provider with a configurable branch style and no icons or suffixes.
#[derive(Clone, Copy, Debug)]
pub struct DefaultProvider<'s> {
    branch: BranchStyle<'s>,
    focus_style: Style,
    guide_style: Style,
}

impl Default for DefaultProvider<'static> {
    fn default() -> Self {
        Self::new(BranchStyle::default())
    }
}

impl<'s> DefaultProvider<'s> {
    pub const fn new(branch: BranchStyle<'s>) -> Self {
        Self {
            branch,
            focus_style: Style::new().add_modifier(Modifier::REVERSED),
            guide_style: Style::new(),
        }
    }

    #[must_use]
    pub const fn with_focus_style(mut self, style: Style) -> Self {
        self.focus_style = style;
        self
    }

    #[must_use]
    pub const fn with_guide_style(mut self, style: Style) -> Self {
        self.guide_style = style;
        self
    }
}

impl<T> NodeProvider<T> for DefaultProvider<'_> {
    fn branch_style(&self) -> BranchStyle<'_> {
        self.branch
    }

    fn style(&self, _node: NodeRef<'_, T>, ctx: &RowContext) -> Style {
        if ctx.is_focused {
            self.focus_style
        } else {
            Style::new()
        }
    }

    fn guide_style(&self) -> Style {
        self.guide_style
    }
}

/// Provider for trees produced by [`build_tree`](crate::build_tree): directory and file icons,
/// directories suffixed with `/`.
#[derive(Clone, Copy, Debug)]
pub struct PathProvider<'s> {
    base: DefaultProvider<'s>,
    dir_icon: &'s str,
    file_icon: &'s str,
    dir_style: Style,
}

impl Default for PathProvider<'static> {
    fn default() -> Self {
        Self::new(DefaultProvider::default())
    }
}

impl<'s> PathProvider<'s> {
    pub const fn new(base: DefaultProvider<'s>) -> Self {
        Self {
            base,
            dir_icon: "📁",
            file_icon: "📄",
            dir_style: Style::new().add_modifier(Modifier::BOLD),
        }
    }

    /// Sets the icons; an empty string disables the icon for that kind.
    #[must_use]
    pub const fn with_icons(mut self, dir_icon: &'s str, file_icon: &'s str) -> Self {
        self.dir_icon = dir_icon;
        self.file_icon = file_icon;
        self
    }

    #[must_use]
    pub const fn with_dir_style(mut self, style: Style) -> Self {
        self.dir_style = style;
        self
    }
}

impl<R> NodeProvider<PathEntry<R>> for PathProvider<'_> {
    fn branch_style(&self) -> BranchStyle<'_> {
        self.base.branch
    }

    fn icon<'a>(&'a self, node: NodeRef<'a, PathEntry<R>>) -> Option<Cow<'a, str>> {
        let icon = match node.data() {
            PathEntry::Directory => self.dir_icon,
            PathEntry::File(_) => self.file_icon,
        };
        (!icon.is_empty()).then_some(Cow::Borrowed(icon))
    }

    fn suffix<'a>(&'a self, node: NodeRef<'a, PathEntry<R>>) -> Option<Cow<'a, str>> {
        node.data().is_dir().then_some(Cow::Borrowed("/"))
    }

    fn style(&self, node: NodeRef<'_, PathEntry<R>>, ctx: &RowContext) -> Style {
        let style = if node.data().is_dir() {
            self.dir_style
        } else {
            Style::new()
        };
        if ctx.is_focused {
            style.patch(self.base.focus_style)
        } else {
            style
        }
    }

    fn guide_style(&self) -> Style {
        self.base.guide_style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::tree::Tree;

    struct Plain;

    impl NodeProvider<u8> for Plain {}

    #[test]
    fn default_methods_use_name_and_expander_state() {
        let mut tree = Tree::new();
        let parent = tree.insert(Node::new("p", "parent", 0u8));
        let child = tree.insert(Node::new("c", "child", 1u8));
        tree.add_child(parent, child).unwrap();
        tree.add_root(parent).unwrap();

        let provider = Plain;
        let parent_ref = tree.node(parent).unwrap();
        assert_eq!(provider.text(parent_ref), "parent");
        assert_eq!(provider.expander_glyph(parent_ref), "▶");
        assert_eq!(provider.expander_glyph(tree.node(child).unwrap()), "");

        tree.node_mut(parent).unwrap().expand();
        assert_eq!(provider.expander_glyph(tree.node(parent).unwrap()), "▼");
    }

    #[test]
    fn focus_reverses_text() {
        let mut tree = Tree::new();
        let key = tree.insert(Node::new("n", "n", 0u8));
        let provider = DefaultProvider::default();
        let ctx = RowContext {
            is_focused: true,
            ..RowContext::default()
        };
        let style = NodeProvider::<u8>::style(&provider, tree.node(key).unwrap(), &ctx);
        assert!(style.add_modifier.contains(Modifier::REVERSED));
    }
}
