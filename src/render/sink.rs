//! Terminal sinks: where patches go.
//!
//! [`CrosstermSink`] queues crossterm commands on any writer; [`MemorySink`]
//! records runs for tests and headless use.

use std::io::{self, BufWriter, Stdout, Write};

use crossterm::{
    cursor, execute, queue,
    style::{self, Attribute, Print, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};

use super::cell::{Cell, CellStyle};
use super::compositor::Patch;
use crate::css::color::Color;
use crate::css::styles::TextAttributes;

/// Receiver of cell runs.
pub trait TerminalSink {
    /// Write `cells` starting at `(col, row)`.
    fn write_run(&mut self, row: u16, col: u16, cells: &[Cell]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}

/// Write every patch, then flush once.
pub fn apply_patches(sink: &mut dyn TerminalSink, patches: &[Patch]) -> io::Result<()> {
    for patch in patches {
        sink.write_run(patch.row, patch.col, &patch.cells)?;
    }
    sink.flush()
}

// ---------------------------------------------------------------------------
// CrosstermSink
// ---------------------------------------------------------------------------

/// Crossterm escape-sequence output over any writer.
pub struct CrosstermSink<W: Write> {
    writer: W,
}

impl CrosstermSink<BufWriter<Stdout>> {
    /// A buffered sink on stdout.
    pub fn stdout() -> Self {
        Self::new(BufWriter::new(io::stdout()))
    }

    /// Terminal size (columns, rows).
    pub fn terminal_size() -> io::Result<(u16, u16)> {
        terminal::size()
    }
}

impl<W: Write> CrosstermSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Alternate screen, raw mode, hidden cursor.
    pub fn enter(&mut self) -> io::Result<()> {
        execute!(self.writer, EnterAlternateScreen, cursor::Hide)?;
        terminal::enable_raw_mode()
    }

    /// Undo [`enter`](Self::enter).
    pub fn leave(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.writer, style::ResetColor, cursor::Show, LeaveAlternateScreen)
    }

    pub fn set_title(&mut self, title: &str) -> io::Result<()> {
        execute!(self.writer, SetTitle(title))
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn queue_style(&mut self, style: &CellStyle) -> io::Result<()> {
        queue!(self.writer, SetAttribute(Attribute::Reset))?;
        if let Some(fg) = style.fg {
            queue!(self.writer, SetForegroundColor(to_crossterm(fg)))?;
        }
        if let Some(bg) = style.bg {
            queue!(self.writer, SetBackgroundColor(to_crossterm(bg)))?;
        }
        for (flag, attribute) in [
            (TextAttributes::BOLD, Attribute::Bold),
            (TextAttributes::DIM, Attribute::Dim),
            (TextAttributes::ITALIC, Attribute::Italic),
            (TextAttributes::UNDERLINE, Attribute::Underlined),
            (TextAttributes::STRIKE, Attribute::CrossedOut),
            (TextAttributes::REVERSE, Attribute::Reverse),
        ] {
            if style.attributes.contains(flag) {
                queue!(self.writer, SetAttribute(attribute))?;
            }
        }
        Ok(())
    }
}

impl<W: Write> TerminalSink for CrosstermSink<W> {
    fn write_run(&mut self, row: u16, col: u16, cells: &[Cell]) -> io::Result<()> {
        queue!(self.writer, cursor::MoveTo(col, row))?;
        let mut current: Option<CellStyle> = None;
        for cell in cells {
            let Some(symbol) = cell.symbol() else {
                continue;
            };
            if current != Some(cell.style) {
                self.queue_style(&cell.style)?;
                current = Some(cell.style);
            }
            queue!(self.writer, Print(symbol))?;
        }
        queue!(self.writer, SetAttribute(Attribute::Reset), style::ResetColor)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Convert to a crossterm colour. Alpha is ignored; colours reaching the
/// sink have already been composited.
pub fn to_crossterm(color: Color) -> style::Color {
    style::Color::Rgb { r: color.r, g: color.g, b: color.b }
}

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

/// Records every run in order.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    runs: Vec<Patch>,
    flushes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> &[Patch] {
        &self.runs
    }

    /// Cells written since creation or the last [`clear`](Self::clear).
    pub fn cells_written(&self) -> usize {
        self.runs.iter().map(|r| r.cells.len()).sum()
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }

    pub fn clear(&mut self) {
        self.runs.clear();
        self.flushes = 0;
    }
}

impl TerminalSink for MemorySink {
    fn write_run(&mut self, row: u16, col: u16, cells: &[Cell]) -> io::Result<()> {
        self.runs.push(Patch { row, col, cells: cells.to_vec() });
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
