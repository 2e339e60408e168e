use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::Borders;

use crate::glyphs::{BranchStyle, BranchStylePreset, ExpanderPreset};
use crate::provider::DefaultProvider;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Политика скролла при изменении фокуса.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ScrollPolicy {
    /// Scroll only as far as needed to keep the focused line in the window.
    #[default]
    KeepInView,
    /// Keep the focused line centered where the content allows it.
    CenterOnSelect,
}

/// Named presets a host can load from its own configuration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ViewConfig {
    pub branch: BranchStylePreset,
    pub expander: ExpanderPreset,
    pub scroll_policy: ScrollPolicy,
}

impl ViewConfig {
    pub const fn branch_style(&self) -> BranchStyle<'static> {
        self.branch.style(self.expander.controls())
    }

    pub const fn provider(&self) -> DefaultProvider<'static> {
        DefaultProvider::new(self.branch_style())
    }
}

/// Визуальные настройки виджета дерева.
#[derive(Clone, Debug)]
pub struct TreeViewStyle<'a> {
    pub title: Option<Line<'a>>,
    pub block_style: Style,
    pub border_style: Style,
    /// Base style under the rendered lines.
    pub line_style: Style,
    pub borders: Borders,
    /// Overrides the view's own policy when set.
    pub scroll_policy: Option<ScrollPolicy>,
}

impl Default for TreeViewStyle<'_> {
    fn default() -> Self {
        Self {
            title: None,
            block_style: Style::default(),
            border_style: Style::default(),
            line_style: Style::default(),
            borders: Borders::ALL,
            scroll_policy: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyphs::ExpanderControls;

    #[test]
    fn config_resolves_presets() {
        let config = ViewConfig {
            branch: "ascii".parse().unwrap(),
            expander: "plus-minus".parse().unwrap(),
            scroll_policy: ScrollPolicy::CenterOnSelect,
        };
        let style = config.branch_style();
        assert_eq!(style, BranchStyle::ascii(ExpanderControls::plus_minus()));
        assert_eq!(style.middle, "|-");
    }

    #[test]
    fn default_config_matches_default_style() {
        let config = ViewConfig::default();
        assert_eq!(config.branch_style(), BranchStyle::default());
        assert_eq!(config.scroll_policy, ScrollPolicy::KeepInView);
    }
}
