use std::ops::Range;

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use crate::ansi::{line_to_ansi, visible_width};
use crate::context::RowContext;
use crate::glyphs::BranchStyle;
use crate::node::{NodeKey, NodeRef};
use crate::provider::NodeProvider;
use crate::tree::Tree;

/// Renders one line per node of [`Tree::visible_nodes`], in the same order.
///
/// Each line is: ancestor columns, own branch glyph (both omitted for top-level nodes),
/// expander column, icon, text and suffix.
pub fn render_lines<'a, T, P>(tree: &'a Tree<T>, provider: &'a P) -> Vec<Line<'a>>
where
    P: NodeProvider<T> + ?Sized,
{
    render_window(tree, provider, 0..usize::MAX)
}

/// Renders only the visible nodes whose index falls in `rows`.
pub(crate) fn render_window<'a, T, P>(
    tree: &'a Tree<T>,
    provider: &'a P,
    rows: Range<usize>,
) -> Vec<Line<'a>>
where
    P: NodeProvider<T> + ?Sized,
{
    let painter = LinePainter {
        provider,
        branch: provider.branch_style(),
        guide: provider.guide_style(),
        focused: tree.focused_key(),
    };
    tree.iter_visible()
        .skip(rows.start)
        .take(rows.end.saturating_sub(rows.start))
        .map(|node| painter.line(node))
        .collect()
}

/// Renders lines as text with ANSI escape sequences.
pub fn render<T, P>(tree: &Tree<T>, provider: &P) -> Vec<String>
where
    P: NodeProvider<T> + ?Sized,
{
    render_lines(tree, provider).iter().map(line_to_ansi).collect()
}

/// Renders the whole tree as one newline-joined string.
pub fn render_string<T, P>(tree: &Tree<T>, provider: &P) -> String
where
    P: NodeProvider<T> + ?Sized,
{
    render(tree, provider).join("\n")
}

/// Width in terminal columns of the widest rendered line, escape sequences excluded.
///
/// This is not a char count: wide glyphs and emoji icons take two columns each.
pub fn max_line_width<T, P>(tree: &Tree<T>, provider: &P) -> usize
where
    P: NodeProvider<T> + ?Sized,
{
    render(tree, provider)
        .iter()
        .map(|line| visible_width(line))
        .max()
        .unwrap_or(0)
}

struct LinePainter<'a, P: ?Sized> {
    provider: &'a P,
    branch: BranchStyle<'a>,
    guide: Style,
    focused: Option<NodeKey>,
}

impl<'a, P: ?Sized> LinePainter<'a, P> {
    fn line<T>(&self, node: NodeRef<'a, T>) -> Line<'a>
    where
        P: NodeProvider<T>,
    {
        let branch = &self.branch;
        let parent = node.parent();
        let has_children = node.has_children();
        let is_last = node.is_last_child();
        let ancestors = node.ancestor_is_last_child();
        let mut spans: Vec<Span<'a>> = Vec::with_capacity(ancestors.len() * 2 + 8);

        if parent.is_some() {
            for ancestor_is_last in &ancestors {
                if *ancestor_is_last {
                    spans.push(Span::styled(branch.blank, self.guide));
                } else {
                    spans.push(Span::styled(branch.vertical, self.guide));
                    if !branch.indent.is_empty() {
                        spans.push(Span::styled(branch.indent, self.guide));
                    }
                }
            }
            let own = if is_last { branch.last } else { branch.middle };
            spans.push(Span::styled(own, self.guide));
        }

        let glyph = self.provider.expander_glyph(node);
        let glyph_width = glyph.width();
        if glyph_width > 0 {
            spans.push(Span::styled(glyph, self.guide));
        }
        let pad = branch.expander.width().saturating_sub(glyph_width);
        if pad > 0 {
            // Childless nodes continue their branch through the expander column.
            if !has_children && glyph.is_empty() && parent.is_some() {
                spans.push(Span::styled(branch.horizontal.repeat(pad), self.guide));
            } else {
                spans.push(Span::raw(" ".repeat(pad)));
            }
        }

        let icon = self.provider.icon(node);
        if !spans.is_empty() {
            let icon_connector = icon.is_some()
                && !has_children
                && parent.is_some_and(|parent| parent.has_grandchildren());
            if icon_connector {
                spans.push(Span::styled(branch.horizontal, self.guide));
            } else {
                spans.push(Span::raw(branch.gap));
            }
        }
        if let Some(icon) = icon {
            spans.push(Span::raw(icon));
            spans.push(Span::raw(branch.gap));
        }

        let ctx = RowContext {
            depth: if parent.is_some() { ancestors.len() + 1 } else { 0 },
            is_focused: self.focused == Some(node.key()),
            is_last,
            has_children,
            is_expanded: node.is_expanded(),
        };
        let style = self.provider.style(node, &ctx);
        spans.push(Span::styled(self.provider.text(node), style));
        if let Some(suffix) = self.provider.suffix(node) {
            spans.push(Span::styled(suffix, style));
        }
        Line::from(spans)
    }
}
