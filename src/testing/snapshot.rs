//! Snapshot rendering helpers.
//!
//! Convert frame buffers, screens and raw widget output into plain-text
//! strings for assertions and `insta` snapshots. Every row is right-trimmed
//! and rows are joined with `'\n'` without a trailing newline.

use crate::css::styles::Styles;
use crate::dom::node::NodeData;
use crate::dom::tree::Dom;
use crate::geometry::Size;
use crate::reactive::ReactiveStore;
use crate::render::buffer::FrameBuffer;
use crate::render::cell::Cell;
use crate::render::strip::Strip;
use crate::screen::Screen;
use crate::widget::{Widget, WidgetContext};

/// Text of a frame buffer.
pub fn frame_to_string(frame: &FrameBuffer) -> String {
    frame.rows().map(row_text).collect::<Vec<_>>().join("\n")
}

/// Text of the last frame the screen painted.
pub fn screen_to_string(screen: &Screen) -> String {
    frame_to_string(screen.compositor.frame())
}

/// Strips laid on a `width` × `height` blank grid, strip `n` at row `n`.
pub fn strips_to_string(strips: &[Strip], width: i32, height: i32) -> String {
    let mut frame = FrameBuffer::new(Size::new(width, height));
    for (y, strip) in strips.iter().enumerate().take(height.max(0) as usize) {
        for (x, cell) in strip.cells().iter().enumerate() {
            frame.set(x as i32, y as i32, *cell, None);
        }
    }
    frame_to_string(&frame)
}

/// Render a widget on its own, with default styles and freshly defined
/// attributes.
///
/// # Examples
///
/// ```ignore
/// use tapestry_tui::testing::render_to_string;
/// use tapestry_tui::widgets::Static;
///
/// assert_eq!(render_to_string(&Static::new("Hello"), 20, 1), "Hello");
/// ```
pub fn render_to_string(widget: &dyn Widget, width: i32, height: i32) -> String {
    render_to_styled_string(widget, width, height, &Styles::default())
}

/// Like [`render_to_string`] with explicit styles.
pub fn render_to_styled_string(widget: &dyn Widget, width: i32, height: i32, styles: &Styles) -> String {
    let mut dom = Dom::new();
    let node = dom.create(NodeData::new(widget.widget_type()));
    let mut attrs = ReactiveStore::new();
    if let Err(err) = widget.define_attributes(node, &mut attrs) {
        tracing::warn!(%err, "widget attributes not defined");
    }
    let strips = widget.render(&WidgetContext::new(node, &attrs), Size::new(width, height), styles);
    strips_to_string(&strips, width, height)
}

fn row_text(row: &[Cell]) -> String {
    let text: String = row.iter().filter_map(Cell::symbol).collect();
    text.trim_end().to_owned()
}

// ===========================================================================
// Tests
// ===========================================================================
