//! Compositor: paints laid-out nodes into a frame buffer and diffs frames.
//!
//! Each frame is painted from scratch into the back buffer in paint order
//! (document order, stably sorted by layer). Widget content comes from a
//! per-node strip cache that is refreshed only for nodes flagged `PAINT` or
//! `LAYOUT`, nodes whose content region moved, and nodes never rendered.
//! The finished frame is compared with the previous one and the changed
//! cells leave as coalesced [`Patch`] runs.

use slotmap::SecondaryMap;

use super::buffer::FrameBuffer;
use super::cell::{Cell, CellStyle};
use super::strip::Strip;
use crate::css::color::Color;
use crate::css::styles::{BorderKind, Styles};
use crate::dom::node::{DirtyFlags, NodeId};
use crate::dom::tree::Dom;
use crate::geometry::{Region, Size};
use crate::layout::{LayoutBox, LayoutEngine};

// ---------------------------------------------------------------------------
// Patch
// ---------------------------------------------------------------------------

/// A run of changed cells on one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub row: u16,
    pub col: u16,
    pub cells: Vec<Cell>,
}

impl Patch {
    /// The visible text of the run.
    pub fn text(&self) -> String {
        self.cells.iter().filter_map(Cell::symbol).collect()
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Source of widget content: one strip per content row, relative to the
/// content origin.
pub trait Content {
    fn render(&self, node: NodeId, size: Size, styles: &Styles) -> Vec<Strip>;
}

impl<F> Content for F
where
    F: Fn(NodeId, Size, &Styles) -> Vec<Strip>,
{
    fn render(&self, node: NodeId, size: Size, styles: &Styles) -> Vec<Strip> {
        self(node, size, styles)
    }
}

struct CachedStrips {
    content: Region,
    strips: Vec<Strip>,
}

#[derive(Debug, Clone, Copy)]
struct PaintItem {
    node: NodeId,
    layer: usize,
    /// Intersection of the screen and every ancestor's content region.
    clip: Region,
}

// ---------------------------------------------------------------------------
// Compositor
// ---------------------------------------------------------------------------

pub struct Compositor {
    /// Last emitted frame.
    front: FrameBuffer,
    /// Frame being painted.
    back: FrameBuffer,
    cache: SecondaryMap<NodeId, CachedStrips>,
    full_redraw: bool,
    frames: u64,
    renders: usize,
}

impl Compositor {
    pub fn new(size: Size) -> Self {
        Self {
            front: FrameBuffer::new(size),
            back: FrameBuffer::new(size),
            cache: SecondaryMap::new(),
            full_redraw: true,
            frames: 0,
            renders: 0,
        }
    }

    pub fn size(&self) -> Size {
        self.front.size()
    }

    /// Resize both buffers. The next frame is emitted in full.
    pub fn resize(&mut self, size: Size) {
        if size == self.front.size() {
            return;
        }
        self.front = FrameBuffer::new(size);
        self.back = FrameBuffer::new(size);
        self.full_redraw = true;
    }

    /// Emit the next frame in full, whatever changed.
    pub fn invalidate(&mut self) {
        self.full_redraw = true;
    }

    /// The last emitted frame.
    pub fn frame(&self) -> &FrameBuffer {
        &self.front
    }

    /// Node that painted the cell at `(x, y)` in the last frame.
    pub fn node_at(&self, x: i32, y: i32) -> Option<NodeId> {
        self.front.owner(x, y)
    }

    /// Frames emitted so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Content callbacks invoked while painting the last frame.
    pub fn last_render_count(&self) -> usize {
        self.renders
    }

    /// Drop the cached strips of a node.
    pub fn forget(&mut self, node: NodeId) {
        self.cache.remove(node);
    }

    // -----------------------------------------------------------------------
    // Frame
    // -----------------------------------------------------------------------

    /// Paint every visible, laid-out node and return the patches that turn
    /// the previous frame into this one. Clears `PAINT` on the tree.
    pub fn render_frame(&mut self, dom: &mut Dom, layout: &LayoutEngine, content: &dyn Content) -> Vec<Patch> {
        self.back.clear();
        self.renders = 0;
        self.cache.retain(|node, _| layout.get(node).is_some());

        let items = paint_order(dom, layout, self.back.area());
        for item in &items {
            let Some(layout_box) = layout.get(item.node).copied() else {
                continue;
            };
            let styles = dom.styles(item.node).cloned().unwrap_or_default();
            let refresh = dom.is_dirty(item.node, DirtyFlags::PAINT | DirtyFlags::LAYOUT);
            self.paint(item, &layout_box, &styles, refresh, content);
        }

        if let Some(root) = dom.root() {
            for node in dom.walk_depth_first(root) {
                dom.clear_dirty(node, DirtyFlags::PAINT);
            }
        }

        let patches = self.diff();
        std::mem::swap(&mut self.front, &mut self.back);
        self.full_redraw = false;
        self.frames += 1;
        tracing::debug!(
            frame = self.frames,
            painted = items.len(),
            renders = self.renders,
            patches = patches.len(),
            "composited frame"
        );
        patches
    }

    fn paint(&mut self, item: &PaintItem, layout_box: &LayoutBox, styles: &Styles, refresh: bool, content: &dyn Content) {
        let area = layout_box.region.intersection(item.clip);
        if area.is_empty() {
            return;
        }
        let opacity = styles.opacity();
        let tint = styles.tint;
        self.back.claim(area, item.node);

        if let Some(background) = styles.background {
            let base = CellStyle::from_styles(styles);
            for y in area.y..area.bottom() {
                for x in area.x..area.right() {
                    let under = self.bg_at(x, y);
                    let style = CellStyle { bg: shade(Some(background), under, opacity, tint), ..base };
                    self.back.set(x, y, Cell::styled_blank(style), Some(item.node));
                }
            }
        }

        if let Some(border) = styles.border {
            if let Some(glyphs) = border_glyphs(border.kind) {
                let fg = border.color.or(styles.color);
                self.paint_border(item.node, layout_box.region, area, glyphs, fg, opacity, tint);
            }
        }

        let content_region = layout_box.content;
        let visible = content_region.intersection(item.clip);
        if content_region.is_empty() {
            return;
        }
        let cached = match self.cache.remove(item.node) {
            Some(cached) if !refresh && cached.content == content_region => cached,
            _ => {
                self.renders += 1;
                CachedStrips {
                    content: content_region,
                    strips: content.render(item.node, content_region.size(), styles),
                }
            }
        };
        if !visible.is_empty() {
            let start = (visible.x - content_region.x) as usize;
            let end = (visible.right() - content_region.x) as usize;
            for (row, strip) in cached.strips.iter().enumerate() {
                let y = content_region.y + row as i32;
                if y < visible.y || y >= visible.bottom() {
                    continue;
                }
                for (offset, cell) in strip.crop(start, end).cells().iter().enumerate() {
                    let x = visible.x + offset as i32;
                    let under = self.bg_at(x, y);
                    let style = CellStyle {
                        fg: shade(cell.style.fg.or(styles.color), under, opacity, tint),
                        bg: cell.style.bg.map(|bg| bg.over(under.unwrap_or(Color::BLACK))).or(under),
                        attributes: cell.style.attributes | styles.text_style.unwrap_or_default(),
                    };
                    self.back.set(x, y, Cell { glyph: cell.glyph, style }, Some(item.node));
                }
            }
        }
        self.cache.insert(item.node, cached);
    }

    #[allow(clippy::too_many_arguments)]
    fn paint_border(&mut self, node: NodeId, region: Region, area: Region, glyphs: [char; 6], fg: Option<Color>, opacity: f32, tint: Option<Color>) {
        let [top_left, top_right, bottom_left, bottom_right, horizontal, vertical] = glyphs;
        let (left, top) = (region.x, region.y);
        let (right, bottom) = (region.right() - 1, region.bottom() - 1);
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let glyph = match (x == left, x == right, y == top, y == bottom) {
                    (true, _, true, _) => top_left,
                    (_, true, true, _) => top_right,
                    (true, _, _, true) => bottom_left,
                    (_, true, _, true) => bottom_right,
                    (_, _, true, _) | (_, _, _, true) => horizontal,
                    (true, _, _, _) | (_, true, _, _) => vertical,
                    _ => continue,
                };
                let under = self.bg_at(x, y);
                let style = CellStyle { fg: shade(fg, under, opacity, tint), bg: under, ..CellStyle::default() };
                self.back.set(x, y, Cell::new(glyph, style), Some(node));
            }
        }
    }

    fn bg_at(&self, x: i32, y: i32) -> Option<Color> {
        self.back.get(x, y).and_then(|cell| cell.style.bg)
    }

    // -----------------------------------------------------------------------
    // Diff
    // -----------------------------------------------------------------------

    /// Runs of cells in the back buffer that differ from the front buffer.
    /// A run never starts or ends inside a wide glyph.
    fn diff(&self) -> Vec<Patch> {
        let full = self.full_redraw || self.front.size() != self.back.size();
        let width = self.back.width() as usize;
        let mut patches = Vec::new();
        for y in 0..self.back.height() {
            let new = self.back.row(y);
            if full {
                patches.push(Patch { row: y as u16, col: 0, cells: new.to_vec() });
                continue;
            }
            let old = self.front.row(y);
            let mut x = 0;
            while x < width {
                if new[x] == old[x] {
                    x += 1;
                    continue;
                }
                let mut start = x;
                while start > 0 && new[start].is_continuation() {
                    start -= 1;
                }
                let mut end = x + 1;
                while end < width && (new[end] != old[end] || new[end].is_continuation()) {
                    end += 1;
                }
                patches.push(Patch { row: y as u16, col: start as u16, cells: new[start..end].to_vec() });
                x = end;
            }
        }
        patches
    }
}

/// Document order, stably sorted by effective layer index. Nodes without a
/// box or with `visibility: hidden` are skipped along with their subtrees.
fn paint_order(dom: &Dom, layout: &LayoutEngine, screen: Region) -> Vec<PaintItem> {
    let mut items = Vec::new();
    let Some(root) = dom.root() else {
        return items;
    };
    let mut stack: Vec<(NodeId, usize, Option<&[String]>, Region)> = vec![(root, 0, None, screen)];
    while let Some((node, inherited, layers, clip)) = stack.pop() {
        let Some(layout_box) = layout.get(node) else {
            continue;
        };
        let styles = dom.styles(node);
        if styles.is_some_and(|s| !s.is_visible()) {
            continue;
        }
        let layer = styles
            .and_then(|s| s.layer.as_deref())
            .and_then(|name| layers.and_then(|list| list.iter().position(|l| l == name)))
            .unwrap_or(inherited);
        items.push(PaintItem { node, layer, clip });

        let child_layers = styles.and_then(|s| s.layers.as_deref()).or(layers);
        let child_clip = clip.intersection(layout_box.content);
        for &child in dom.children(node).iter().rev() {
            stack.push((child, layer, child_layers, child_clip));
        }
    }
    items.sort_by_key(|item| item.layer);
    items
}

/// Final colour of a painted channel: alpha-composited over what is below,
/// faded by `opacity`, then tinted.
fn shade(color: Option<Color>, under: Option<Color>, opacity: f32, tint: Option<Color>) -> Option<Color> {
    let base = under.unwrap_or(Color::BLACK);
    let mut color = color?.over(base);
    if opacity < 1.0 {
        color = base.blend(color, opacity);
    }
    if let Some(tint) = tint {
        color = tint.over(color);
    }
    Some(color)
}

/// `[top-left, top-right, bottom-left, bottom-right, horizontal, vertical]`.
fn border_glyphs(kind: BorderKind) -> Option<[char; 6]> {
    Some(match kind {
        BorderKind::None => return None,
        BorderKind::Solid => ['┌', '┐', '└', '┘', '─', '│'],
        BorderKind::Heavy => ['┏', '┓', '┗', '┛', '━', '┃'],
        BorderKind::Double => ['╔', '╗', '╚', '╝', '═', '║'],
        BorderKind::Round => ['╭', '╮', '╰', '╯', '─', '│'],
        BorderKind::Ascii => ['+', '+', '+', '+', '-', '|'],
    })
}
