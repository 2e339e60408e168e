use std::str::FromStr;

use unicode_width::UnicodeWidthStr;

use crate::error::TreeError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Expand/collapse indicator glyphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpanderControls<'a> {
    pub expanded: &'a str,
    pub collapsed: &'a str,
    /// Drawn in the expander column of childless nodes; when empty, the branch style's
    /// horizontal connector fills the column instead.
    pub not_applicable: &'a str,
}

impl ExpanderControls<'static> {
    pub const fn plus_minus() -> Self {
        Self {
            expanded: "-",
            collapsed: "+",
            not_applicable: "",
        }
    }

    pub const fn triangle() -> Self {
        Self {
            expanded: "▼",
            collapsed: "▶",
            not_applicable: "",
        }
    }

    /// No expander column at all.
    pub const fn none() -> Self {
        Self {
            expanded: "",
            collapsed: "",
            not_applicable: "",
        }
    }
}

impl ExpanderControls<'_> {
    /// Width of the expander column in terminal cells (0 when no column is drawn).
    pub fn width(&self) -> usize {
        self.expanded.width().max(self.collapsed.width())
    }
}

impl Default for ExpanderControls<'static> {
    fn default() -> Self {
        Self::triangle()
    }
}

/// Connector glyphs used to draw the tree structure.
///
/// A line is built from one ancestor column per level (`vertical` + `indent` while that
/// ancestor has later siblings, `blank` otherwise), the node's own `middle`/`last` branch,
/// the expander column, then `gap` before the content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BranchStyle<'a> {
    pub vertical: &'a str,
    pub horizontal: &'a str,
    pub middle: &'a str,
    pub last: &'a str,
    pub blank: &'a str,
    pub indent: &'a str,
    pub gap: &'a str,
    pub expander: ExpanderControls<'a>,
}

impl<'a> BranchStyle<'a> {
    pub const fn default_style(expander: ExpanderControls<'a>) -> Self {
        Self {
            vertical: "│",
            horizontal: "─",
            middle: "├─",
            last: "└─",
            blank: "  ",
            indent: " ",
            gap: " ",
            expander,
        }
    }

    pub const fn compact(expander: ExpanderControls<'a>) -> Self {
        Self {
            vertical: "│",
            horizontal: "─",
            middle: "├",
            last: "└",
            blank: " ",
            indent: "",
            gap: " ",
            expander,
        }
    }

    pub const fn ascii(expander: ExpanderControls<'a>) -> Self {
        Self {
            vertical: "|",
            horizontal: "-",
            middle: "|-",
            last: "`-",
            blank: "  ",
            indent: " ",
            gap: " ",
            expander,
        }
    }

    pub const fn wide(expander: ExpanderControls<'a>) -> Self {
        Self {
            vertical: "│",
            horizontal: "─",
            middle: "├───",
            last: "└───",
            blank: "    ",
            indent: "   ",
            gap: " ",
            expander,
        }
    }

    /// Indentation only, no visible connectors.
    pub const fn minimal(expander: ExpanderControls<'a>) -> Self {
        Self {
            vertical: " ",
            horizontal: " ",
            middle: "  ",
            last: "  ",
            blank: "  ",
            indent: " ",
            gap: " ",
            expander,
        }
    }

    /// Returns a copy with a different expander set.
    #[must_use]
    pub const fn with_expander(mut self, expander: ExpanderControls<'a>) -> Self {
        self.expander = expander;
        self
    }
}

impl Default for BranchStyle<'static> {
    fn default() -> Self {
        Self::default_style(ExpanderControls::triangle())
    }
}

/// Named branch style presets.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BranchStylePreset {
    #[default]
    Default,
    Compact,
    Ascii,
    Wide,
    Minimal,
}

impl BranchStylePreset {
    pub const ALL: [Self; 5] = [
        Self::Default,
        Self::Compact,
        Self::Ascii,
        Self::Wide,
        Self::Minimal,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Compact => "compact",
            Self::Ascii => "ascii",
            Self::Wide => "wide",
            Self::Minimal => "minimal",
        }
    }

    pub const fn style<'a>(self, expander: ExpanderControls<'a>) -> BranchStyle<'a> {
        match self {
            Self::Default => BranchStyle::default_style(expander),
            Self::Compact => BranchStyle::compact(expander),
            Self::Ascii => BranchStyle::ascii(expander),
            Self::Wide => BranchStyle::wide(expander),
            Self::Minimal => BranchStyle::minimal(expander),
        }
    }
}

impl FromStr for BranchStylePreset {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TreeError::UnknownPreset {
                kind: "branch style",
                name: s.to_owned(),
            })
    }
}

/// Named expander glyph presets.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExpanderPreset {
    PlusMinus,
    #[default]
    Triangle,
    None,
}

impl ExpanderPreset {
    pub const ALL: [Self; 3] = [Self::PlusMinus, Self::Triangle, Self::None];

    pub const fn name(self) -> &'static str {
        match self {
            Self::PlusMinus => "plus-minus",
            Self::Triangle => "triangle",
            Self::None => "none",
        }
    }

    pub const fn controls(self) -> ExpanderControls<'static> {
        match self {
            Self::PlusMinus => ExpanderControls::plus_minus(),
            Self::Triangle => ExpanderControls::triangle(),
            Self::None => ExpanderControls::none(),
        }
    }
}

impl FromStr for ExpanderPreset {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TreeError::UnknownPreset {
                kind: "expander",
                name: s.to_owned(),
            })
    }
}
