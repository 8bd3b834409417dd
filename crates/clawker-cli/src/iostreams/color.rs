//! Color scheme - a value object bound to (enabled, theme).
//!
//! The scheme is re-derived from the streams' state on demand; it is never
//! shared mutable state. When disabled, every method is the identity and
//! icons degrade to bracketed ASCII so transcripts stay byte-stable.

use super::tty::Theme;
use crossterm::style::{Attribute, Color, ResetColor, SetForegroundColor};
use std::fmt::Display;

/// Styled-string factory for one (enabled, theme) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    enabled: bool,
    theme: Theme,
}

impl ColorScheme {
    /// Scheme for the given state.
    pub fn new(enabled: bool, theme: Theme) -> Self {
        Self { enabled, theme }
    }

    /// Whether styling is applied at all.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The theme this scheme renders for.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    fn paint(&self, color: Color, s: impl Display) -> String {
        if self.enabled {
            format!("{}{}{}", SetForegroundColor(color), s, ResetColor)
        } else {
            s.to_string()
        }
    }

    fn decorate(&self, attr: Attribute, off: Attribute, s: impl Display) -> String {
        if self.enabled {
            format!("{attr}{s}{off}")
        } else {
            s.to_string()
        }
    }

    // --- concrete colors ---

    /// Red text.
    pub fn red(&self, s: impl Display) -> String {
        self.paint(Color::Red, s)
    }

    /// Green text.
    pub fn green(&self, s: impl Display) -> String {
        self.paint(Color::Green, s)
    }

    /// Yellow text.
    pub fn yellow(&self, s: impl Display) -> String {
        self.paint(Color::Yellow, s)
    }

    /// Blue text.
    pub fn blue(&self, s: impl Display) -> String {
        self.paint(Color::Blue, s)
    }

    /// Cyan text.
    pub fn cyan(&self, s: impl Display) -> String {
        self.paint(Color::Cyan, s)
    }

    /// Magenta text.
    pub fn magenta(&self, s: impl Display) -> String {
        self.paint(Color::Magenta, s)
    }

    // --- semantic colors ---

    /// Primary content (names, first table column).
    pub fn primary(&self, s: impl Display) -> String {
        self.cyan(s)
    }

    /// Secondary content (sizes, dates).
    pub fn secondary(&self, s: impl Display) -> String {
        self.muted(s)
    }

    /// Accent content (links, selections).
    pub fn accent(&self, s: impl Display) -> String {
        self.magenta(s)
    }

    /// Success state.
    pub fn success(&self, s: impl Display) -> String {
        self.green(s)
    }

    /// Warning state.
    pub fn warning(&self, s: impl Display) -> String {
        self.yellow(s)
    }

    /// Error state.
    pub fn error(&self, s: impl Display) -> String {
        self.red(s)
    }

    /// Informational state.
    pub fn info(&self, s: impl Display) -> String {
        self.blue(s)
    }

    /// De-emphasized content; grey level depends on the theme.
    pub fn muted(&self, s: impl Display) -> String {
        match self.theme {
            Theme::Light => self.paint(Color::Grey, s),
            _ => self.paint(Color::DarkGrey, s),
        }
    }

    /// Emphasized content.
    pub fn highlight(&self, s: impl Display) -> String {
        self.decorate(Attribute::Bold, Attribute::NormalIntensity, s)
    }

    /// Unavailable content.
    pub fn disabled(&self, s: impl Display) -> String {
        self.decorate(Attribute::Dim, Attribute::NormalIntensity, s)
    }

    // --- decorations ---

    /// Bold text.
    pub fn bold(&self, s: impl Display) -> String {
        self.decorate(Attribute::Bold, Attribute::NormalIntensity, s)
    }

    /// Italic text.
    pub fn italic(&self, s: impl Display) -> String {
        self.decorate(Attribute::Italic, Attribute::NoItalic, s)
    }

    /// Underlined text.
    pub fn underline(&self, s: impl Display) -> String {
        self.decorate(Attribute::Underlined, Attribute::NoUnderline, s)
    }

    /// Dim text.
    pub fn dim(&self, s: impl Display) -> String {
        self.decorate(Attribute::Dim, Attribute::NormalIntensity, s)
    }

    // --- icons ---

    /// `✓` (or `[ok]` without color).
    pub fn success_icon(&self) -> String {
        if self.enabled {
            self.green("✓")
        } else {
            "[ok]".to_string()
        }
    }

    /// `⚠` (or `[warn]` without color).
    pub fn warning_icon(&self) -> String {
        if self.enabled {
            self.yellow("⚠")
        } else {
            "[warn]".to_string()
        }
    }

    /// `✗` (or `[error]` without color).
    pub fn failure_icon(&self) -> String {
        if self.enabled {
            self.red("✗")
        } else {
            "[error]".to_string()
        }
    }

    /// `ℹ` (or `[info]` without color).
    pub fn info_icon(&self) -> String {
        if self.enabled {
            self.blue("ℹ")
        } else {
            "[info]".to_string()
        }
    }

    /// Icon followed by text: `✓ done`.
    pub fn success_icon_with_text(&self, text: impl Display) -> String {
        format!("{} {text}", self.success_icon())
    }

    /// Icon followed by text: `⚠ careful`.
    pub fn warning_icon_with_text(&self, text: impl Display) -> String {
        format!("{} {text}", self.warning_icon())
    }

    /// Icon followed by text: `✗ failed`.
    pub fn failure_icon_with_text(&self, text: impl Display) -> String {
        format!("{} {text}", self.failure_icon())
    }

    /// Icon followed by text: `ℹ note`.
    pub fn info_icon_with_text(&self, text: impl Display) -> String {
        format!("{} {text}", self.info_icon())
    }
}

/// Strip ANSI escape sequences (CSI form) from a string.
///
/// Exposed for tests asserting the "styled output contains its input"
/// property without hardcoding escape bytes.
pub fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' && chars.peek() == Some(&'[') {
            chars.next();
            // Consume until the final byte of the CSI sequence.
            for t in chars.by_ref() {
                if ('\u{40}'..='\u{7e}').contains(&t) {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}
