use std::marker::PhantomData;

use ratatui::layout::Rect;
use ratatui::prelude::Buffer;
use ratatui::widgets::{
    Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget,
    Widget,
};

use crate::provider::NodeProvider;
use crate::style::TreeViewStyle;
use crate::viewport::TreeView;

/// Основной виджет дерева: рисует окно [`TreeView`] внутри рамки.
pub struct TreeViewWidget<'a, T, P> {
    style: TreeViewStyle<'a>,
    _marker: PhantomData<fn(&T, &P)>,
}

impl<T, P> Default for TreeViewWidget<'_, T, P> {
    fn default() -> Self {
        Self::new(TreeViewStyle::default())
    }
}

impl<'a, T, P> TreeViewWidget<'a, T, P> {
    pub const fn new(style: TreeViewStyle<'a>) -> Self {
        Self {
            style,
            _marker: PhantomData,
        }
    }

    fn block(&self) -> Block<'a> {
        let mut block = Block::default().borders(self.style.borders);
        if let Some(title) = self.style.title.clone() {
            block = block.title(title);
        }
        block
            .style(self.style.block_style)
            .border_style(self.style.border_style)
    }

    #[inline]
    fn render_scrollbar(
        area: Rect,
        buf: &mut Buffer,
        offset: usize,
        inner_height: usize,
        scroll_rows: usize,
    ) {
        let scroll_len = scroll_rows.saturating_add(1);
        let position = offset.min(scroll_len.saturating_sub(1));
        let mut scrollbar_state = ScrollbarState::new(scroll_len)
            .position(position)
            .viewport_content_length(inner_height);
        Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .render(area, buf, &mut scrollbar_state);
    }
}

impl<T, P> StatefulWidget for TreeViewWidget<'_, T, P>
where
    P: NodeProvider<T>,
{
    type State = TreeView<T, P>;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if let Some(policy) = self.style.scroll_policy
            && state.viewport().policy != policy
        {
            state.set_scroll_policy(policy);
        }

        let block = self.block();
        let inner = block.inner(area);
        let inner_height = inner.height as usize;
        let total_rows = state.tree().iter_visible().count();
        let scroll_rows = total_rows.saturating_sub(inner_height);

        let (body_area, body_block, scrollbar_area) = if scroll_rows > 0 && area.width > 0 {
            let body_area = Rect {
                width: area.width.saturating_sub(1),
                ..area
            };
            let scrollbar_area = Rect {
                x: area.x + area.width - 1,
                y: area.y,
                width: 1,
                height: area.height,
            };
            let mut borders = self.style.borders;
            borders.remove(Borders::RIGHT);
            (body_area, block.borders(borders), Some(scrollbar_area))
        } else {
            (area, block, None)
        };

        let body_inner = body_block.inner(body_area);
        state.resize(body_inner.width as usize, body_inner.height as usize);
        state.scroll_to_focus();

        let lines = state.lines();
        Paragraph::new(lines)
            .style(self.style.line_style)
            .block(body_block)
            .render(body_area, buf);

        if let Some(scrollbar_area) = scrollbar_area {
            Self::render_scrollbar(
                scrollbar_area,
                buf,
                state.viewport().offset,
                inner_height,
                scroll_rows,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_tree;
    use crate::provider::DefaultProvider;

    fn row(buffer: &Buffer, y: u16) -> String {
        (buffer.area.x..buffer.area.right())
            .map(|x| buffer[(x, y)].symbol())
            .collect()
    }

    #[test]
    fn render_smoke_with_scrollbar() {
        let tree = build_tree((0..12).map(|idx| format!("node-{idx:02}")));
        let mut state = TreeView::new(tree, DefaultProvider::default());
        state.tree_mut().set_focused_node("node-09");

        let area = Rect::new(0, 0, 20, 6);
        let mut buffer = Buffer::empty(area);
        TreeViewWidget::default().render(area, &mut buffer, &mut state);

        assert_eq!(state.viewport().height, 4);
        assert_eq!(state.viewport().width, 18);
        assert_eq!(state.viewport().offset, 6);
        assert!(row(&buffer, 1).contains("node-06"));
        assert!(row(&buffer, 4).contains("node-09"));
    }

    #[test]
    fn short_content_renders_without_scrollbar() {
        let tree = build_tree(["a/b.txt", "d.txt"]);
        let mut state = TreeView::new(tree, DefaultProvider::default());
        let style = TreeViewStyle {
            borders: Borders::NONE,
            ..TreeViewStyle::default()
        };

        let area = Rect::new(0, 0, 12, 3);
        let mut buffer = Buffer::empty(area);
        TreeViewWidget::new(style).render(area, &mut buffer, &mut state);

        assert_eq!(state.viewport().width, 12);
        assert_eq!(row(&buffer, 0).trim_end(), "▶ a");
        assert_eq!(row(&buffer, 1).trim_end(), "  d.txt");
    }
}
