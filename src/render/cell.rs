//! Terminal cells and their visual style.

use unicode_width::UnicodeWidthChar;

use crate::css::color::Color;
use crate::css::styles::{Styles, TextAttributes};

// ---------------------------------------------------------------------------
// CellStyle
// ---------------------------------------------------------------------------

/// Colours and attributes of one cell. `None` colours mean the terminal
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellStyle {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub attributes: TextAttributes,
}

impl CellStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fg(mut self, fg: Color) -> Self {
        self.fg = Some(fg);
        self
    }

    pub fn with_bg(mut self, bg: Color) -> Self {
        self.bg = Some(bg);
        self
    }

    pub fn with_attributes(mut self, attributes: TextAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Foreground, background and text attributes from a resolved style.
    pub fn from_styles(styles: &Styles) -> Self {
        Self {
            fg: styles.color,
            bg: styles.background,
            attributes: styles.text_style.unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// What occupies a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Glyph {
    #[default]
    Blank,
    Char(char),
    /// Right half of a double-width glyph in the cell to the left.
    Continuation,
}

/// One terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub glyph: Glyph,
    pub style: CellStyle,
}

impl Cell {
    pub fn new(ch: char, style: CellStyle) -> Self {
        Self { glyph: Glyph::Char(ch), style }
    }

    pub const fn blank() -> Self {
        Self {
            glyph: Glyph::Blank,
            style: CellStyle { fg: None, bg: None, attributes: TextAttributes::empty() },
        }
    }

    pub fn styled_blank(style: CellStyle) -> Self {
        Self { glyph: Glyph::Blank, style }
    }

    pub fn continuation(style: CellStyle) -> Self {
        Self { glyph: Glyph::Continuation, style }
    }

    /// Columns this cell's glyph covers: 2 for wide glyphs, 0 for a
    /// continuation, otherwise 1.
    pub fn width(&self) -> usize {
        match self.glyph {
            Glyph::Blank => 1,
            Glyph::Char(ch) => ch.width().unwrap_or(0).max(1),
            Glyph::Continuation => 0,
        }
    }

    pub fn is_continuation(&self) -> bool {
        self.glyph == Glyph::Continuation
    }

    /// The character to print; blanks print as a space, continuations as
    /// nothing.
    pub fn symbol(&self) -> Option<char> {
        match self.glyph {
            Glyph::Blank => Some(' '),
            Glyph::Char(ch) => Some(ch),
            Glyph::Continuation => None,
        }
    }
}
