//! Rendering: cells and strips, frame buffers, the compositor, terminal sinks.

pub mod buffer;
pub mod cell;
pub mod compositor;
pub mod sink;
pub mod strip;

pub use buffer::FrameBuffer;
pub use cell::{Cell, CellStyle, Glyph};
pub use compositor::{Compositor, Content, Patch};
pub use sink::{apply_patches, CrosstermSink, MemorySink, TerminalSink};
pub use strip::Strip;
