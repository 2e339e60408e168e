//! Conversion between styled ratatui lines and ANSI-escaped text.
//!
//! Rendered lines are handed to hosts either as [`Line`]s or as plain strings with SGR
//! escape sequences embedded. Width measurement always strips escapes first, so two lines
//! with identical text but different styles measure the same.

use std::fmt::Write;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use unicode_width::UnicodeWidthStr;

const ESC: char = '\x1b';
const RESET: &str = "\x1b[0m";

const MODIFIER_CODES: [(Modifier, u8); 9] = [
    (Modifier::BOLD, 1),
    (Modifier::DIM, 2),
    (Modifier::ITALIC, 3),
    (Modifier::UNDERLINED, 4),
    (Modifier::SLOW_BLINK, 5),
    (Modifier::RAPID_BLINK, 6),
    (Modifier::REVERSED, 7),
    (Modifier::HIDDEN, 8),
    (Modifier::CROSSED_OUT, 9),
];

/// Encodes a line as text, wrapping each styled span in SGR sequences.
///
/// Unstyled spans are emitted verbatim.
pub fn line_to_ansi(line: &Line<'_>) -> String {
    let mut out = String::with_capacity(line.width() + 8 * line.spans.len());
    for span in &line.spans {
        let style = line.style.patch(span.style);
        let codes = sgr_codes(style);
        if codes.is_empty() {
            out.push_str(&span.content);
        } else {
            let _ = write!(out, "{ESC}[{codes}m{}{RESET}", span.content);
        }
    }
    out
}

fn sgr_codes(style: Style) -> String {
    let mut codes = String::new();
    let mut push = |code: &str| {
        if !codes.is_empty() {
            codes.push(';');
        }
        codes.push_str(code);
    };

    let modifiers = style.add_modifier - style.sub_modifier;
    for (modifier, code) in MODIFIER_CODES {
        if modifiers.contains(modifier) {
            push(&code.to_string());
        }
    }
    if let Some(fg) = style.fg {
        push(&color_code(fg, false));
    }
    if let Some(bg) = style.bg {
        push(&color_code(bg, true));
    }
    codes
}

fn color_code(color: Color, background: bool) -> String {
    let base: u8 = if background { 40 } else { 30 };
    let bright = base + 60;
    match color {
        Color::Reset => (base + 9).to_string(),
        Color::Black => base.to_string(),
        Color::Red => (base + 1).to_string(),
        Color::Green => (base + 2).to_string(),
        Color::Yellow => (base + 3).to_string(),
        Color::Blue => (base + 4).to_string(),
        Color::Magenta => (base + 5).to_string(),
        Color::Cyan => (base + 6).to_string(),
        Color::Gray => (base + 7).to_string(),
        Color::DarkGray => bright.to_string(),
        Color::LightRed => (bright + 1).to_string(),
        Color::LightGreen => (bright + 2).to_string(),
        Color::LightYellow => (bright + 3).to_string(),
        Color::LightBlue => (bright + 4).to_string(),
        Color::LightMagenta => (bright + 5).to_string(),
        Color::LightCyan => (bright + 6).to_string(),
        Color::White => (bright + 7).to_string(),
        Color::Indexed(idx) => format!("{};5;{idx}", base + 8),
        Color::Rgb(r, g, b) => format!("{};2;{r};{g};{b}", base + 8),
    }
}

/// Removes ANSI escape sequences (CSI, OSC and two-character escapes).
pub fn strip_ansi(text: &str) -> String {
    if !text.contains(ESC) {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != ESC {
            out.push(ch);
            continue;
        }
        match chars.next() {
            // CSI: parameters, then a final byte in 0x40..=0x7E.
            Some('[') => {
                for c in chars.by_ref() {
                    if ('\u{40}'..='\u{7e}').contains(&c) {
                        break;
                    }
                }
            }
            // OSC: terminated by BEL or ESC '\'.
            Some(']') => {
                while let Some(c) = chars.next() {
                    if c == '\x07' {
                        break;
                    }
                    if c == ESC && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => {}
        }
    }
    out
}

/// Terminal column width of the text once escape sequences are stripped.
pub fn visible_width(text: &str) -> usize {
    strip_ansi(text).width()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use ratatui::text::Span;

    fn any_color() -> impl Strategy<Value = Option<Color>> {
        prop_oneof![
            Just(None),
            (0u8..16).prop_map(|idx| Some(Color::Indexed(idx))),
            any::<(u8, u8, u8)>().prop_map(|(r, g, b)| Some(Color::Rgb(r, g, b))),
            Just(Some(Color::LightCyan)),
        ]
    }

    fn any_style() -> impl Strategy<Value = Style> {
        (any_color(), any_color(), any::<u16>()).prop_map(|(fg, bg, bits)| {
            let mut style = Style::new().add_modifier(Modifier::from_bits_truncate(bits));
            style.fg = fg;
            style.bg = bg;
            style
        })
    }

    proptest! {
        /// Restyling identical text never changes its measured width.
        #[test]
        fn width_is_style_independent(
            text in "[a-z ├─│└▶▼]{0,24}",
            first in any_style(),
            second in any_style(),
        ) {
            let a = line_to_ansi(&Line::from(Span::styled(text.clone(), first)));
            let b = line_to_ansi(&Line::from(Span::styled(text.clone(), second)));
            prop_assert_eq!(strip_ansi(&a), text.clone());
            prop_assert_eq!(visible_width(&a), visible_width(&b));
        }
    }
}
