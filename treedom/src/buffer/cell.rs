use crate::types::{Rgb, TextStyle};

/// One screen cell. A wide glyph occupies its own cell plus a blank cell
/// to its right; the flush pass recognizes the covered column by looking
/// at its left neighbor and skips it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub char: char,
    pub fg: Rgb,
    pub bg: Rgb,
    pub style: TextStyle,
}

impl Cell {
    pub fn new(char: char) -> Self {
        Self {
            char,
            fg: Rgb::new(255, 255, 255),
            bg: Rgb::new(0, 0, 0),
            style: TextStyle::new(),
        }
    }

    /// An empty cell in the default colors. What `clear` fills with.
    pub fn blank() -> Self {
        Self::new(' ')
    }

    pub fn with_fg(mut self, fg: Rgb) -> Self {
        self.fg = fg;
        self
    }

    pub fn with_bg(mut self, bg: Rgb) -> Self {
        self.bg = bg;
        self
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank()
    }
}
