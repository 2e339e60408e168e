use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::action::TreeAction;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KeymapProfile {
    /// Arrows and `hjkl`.
    #[default]
    Default,
    /// `hjkl` only.
    Vim,
    /// Arrow keys only.
    Arrows,
}

/// Resolves crossterm key events to [`TreeAction`]s.
#[derive(Clone, Copy, Debug)]
pub struct TreeKeyBindings {
    profile: KeymapProfile,
}

impl Default for TreeKeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeKeyBindings {
    pub const fn new() -> Self {
        Self {
            profile: KeymapProfile::Default,
        }
    }

    pub const fn with_profile(profile: KeymapProfile) -> Self {
        Self { profile }
    }

    pub const fn profile(&self) -> KeymapProfile {
        self.profile
    }

    pub const fn set_profile(&mut self, profile: KeymapProfile) {
        self.profile = profile;
    }

    /// Maps a key press to an action. Releases and modified keys (other than shift) map to
    /// nothing.
    pub fn resolve<C>(&self, key: KeyEvent) -> Option<TreeAction<C>> {
        if key.kind == KeyEventKind::Release
            || key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return None;
        }

        let nav_action = match self.profile {
            KeymapProfile::Default => Self::resolve_default_nav(key),
            KeymapProfile::Vim => Self::resolve_vim_nav(key),
            KeymapProfile::Arrows => Self::resolve_arrow_nav(key),
        };
        if nav_action.is_some() {
            return nav_action;
        }

        Self::resolve_common(key)
    }

    /// Like [`resolve`](Self::resolve), but `custom` gets the first look at every key.
    pub fn resolve_with<C, F>(&self, key: KeyEvent, custom: F) -> Option<TreeAction<C>>
    where
        F: Fn(KeyEvent) -> Option<C>,
    {
        if let Some(action) = custom(key) {
            return Some(TreeAction::Custom(action));
        }

        self.resolve(key)
    }

    const fn resolve_default_nav<C>(key: KeyEvent) -> Option<TreeAction<C>> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(TreeAction::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(TreeAction::MoveDown),
            KeyCode::Left | KeyCode::Char('h') => Some(TreeAction::Collapse),
            KeyCode::Right | KeyCode::Char('l') => Some(TreeAction::Expand),
            _ => None,
        }
    }

    const fn resolve_vim_nav<C>(key: KeyEvent) -> Option<TreeAction<C>> {
        match key.code {
            KeyCode::Char('k') => Some(TreeAction::MoveUp),
            KeyCode::Char('j') => Some(TreeAction::MoveDown),
            KeyCode::Char('h') => Some(TreeAction::Collapse),
            KeyCode::Char('l') => Some(TreeAction::Expand),
            KeyCode::Char('g') => Some(TreeAction::FocusFirst),
            KeyCode::Char('G') => Some(TreeAction::FocusLast),
            _ => None,
        }
    }

    const fn resolve_arrow_nav<C>(key: KeyEvent) -> Option<TreeAction<C>> {
        match key.code {
            KeyCode::Up => Some(TreeAction::MoveUp),
            KeyCode::Down => Some(TreeAction::MoveDown),
            KeyCode::Left => Some(TreeAction::Collapse),
            KeyCode::Right => Some(TreeAction::Expand),
            _ => None,
        }
    }

    const fn resolve_common<C>(key: KeyEvent) -> Option<TreeAction<C>> {
        match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => Some(TreeAction::Toggle),
            KeyCode::Char('p') | KeyCode::Backspace => Some(TreeAction::FocusParent),
            KeyCode::Char('E' | '*') => Some(TreeAction::ExpandAll),
            KeyCode::Char('C' | '-') => Some(TreeAction::CollapseAll),
            KeyCode::Home => Some(TreeAction::FocusFirst),
            KeyCode::End => Some(TreeAction::FocusLast),
            _ => None,
        }
    }
}
