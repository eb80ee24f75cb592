//! Strip: one row of cells produced by a widget's content callback.
//!
//! Strips are relative to the widget's content origin: the n-th strip is
//! the n-th content row, its first cell the leftmost content column.

use unicode_width::UnicodeWidthChar;

use super::cell::{Cell, CellStyle};
use crate::css::styles::TextAlign;

/// A row of cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Strip {
    cells: Vec<Cell>,
}

impl Strip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// `width` blank cells.
    pub fn blank(width: usize, style: CellStyle) -> Self {
        Self { cells: vec![Cell::styled_blank(style); width] }
    }

    /// Lay out `text` in one style. Wide glyphs take two cells, zero-width
    /// characters and control characters are dropped.
    pub fn from_text(text: &str, style: CellStyle) -> Self {
        let mut strip = Self::new();
        strip.push_str(text, style);
        strip
    }

    pub fn push(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    pub fn push_str(&mut self, text: &str, style: CellStyle) {
        for ch in text.chars() {
            match ch.width() {
                Some(2) => {
                    self.cells.push(Cell::new(ch, style));
                    self.cells.push(Cell::continuation(style));
                }
                Some(1) => self.cells.push(Cell::new(ch, style)),
                _ => {}
            }
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Width in cells.
    pub fn width(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The cells in `start..end`. A wide glyph cut in half by either bound
    /// becomes a blank in the surviving half.
    pub fn crop(&self, start: usize, end: usize) -> Strip {
        let end = end.min(self.cells.len());
        if start >= end {
            return Strip::new();
        }
        let mut cells = self.cells[start..end].to_vec();
        if let Some(first) = cells.first_mut() {
            if first.is_continuation() {
                *first = Cell::styled_blank(first.style);
            }
        }
        let last_index = cells.len() - 1;
        if cells[last_index].width() == 2 {
            cells[last_index] = Cell::styled_blank(cells[last_index].style);
        }
        Strip { cells }
    }

    /// Exactly `width` cells: cropped, or padded on the right with blanks.
    pub fn fit(&self, width: usize, style: CellStyle) -> Strip {
        if self.cells.len() >= width {
            return self.crop(0, width);
        }
        let mut cells = self.cells.clone();
        cells.resize(width, Cell::styled_blank(style));
        Strip { cells }
    }

    /// Exactly `width` cells with the content positioned per `align`.
    pub fn align(&self, width: usize, align: TextAlign, style: CellStyle) -> Strip {
        if self.cells.len() >= width {
            return self.crop(0, width);
        }
        let spare = width - self.cells.len();
        let left = match align {
            TextAlign::Left => 0,
            TextAlign::Center => spare / 2,
            TextAlign::Right => spare,
        };
        let mut cells = Vec::with_capacity(width);
        cells.resize(left, Cell::styled_blank(style));
        cells.extend_from_slice(&self.cells);
        cells.resize(width, Cell::styled_blank(style));
        Strip { cells }
    }

    /// The visible text, continuations skipped.
    pub fn text(&self) -> String {
        self.cells.iter().filter_map(Cell::symbol).collect()
    }
}

impl FromIterator<Cell> for Strip {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self { cells: iter.into_iter().collect() }
    }
}
