//! Incremental layout over the DOM.
//!
//! [`LayoutEngine`] turns resolved styles into one [`LayoutBox`] per mounted,
//! displayed node. Boxes are cached together with the rectangle their parent
//! allotted; a node whose allotment is unchanged and which carries no
//! `LAYOUT`/`CHILD_LAYOUT` flag keeps its box and skips its subtree.

use slotmap::SecondaryMap;

use super::arrange::{Measure, Sizer};
use super::resolve::{clamp, request, Basis, Request};
use crate::diagnostics::Diagnostic;
use crate::dom::node::{DirtyFlags, NodeId};
use crate::dom::tree::Dom;
use crate::geometry::{Axis, Region, Size, Spacing};

/// Geometry computed for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutBox {
    /// Border box in screen coordinates.
    pub region: Region,
    /// Region inside border and padding; children are placed here.
    pub content: Region,
    pub margin: Spacing,
    pub border: Spacing,
    pub padding: Spacing,
    /// Border-box size taken from content, when the node was `auto` sized.
    pub intrinsic: Option<Size>,
    /// Layout pass that last changed this box.
    pub generation: u64,
}

impl LayoutBox {
    /// Region including the margin.
    pub fn outer(&self) -> Region {
        self.region.grow(self.margin)
    }

    /// Equal apart from the generation stamp.
    pub fn same_geometry(&self, other: &LayoutBox) -> bool {
        LayoutBox { generation: 0, ..*self } == LayoutBox { generation: 0, ..*other }
    }
}

/// Computes and caches layout boxes.
pub struct LayoutEngine {
    boxes: SecondaryMap<NodeId, LayoutBox>,
    /// Margin-box rectangle each node was last laid out in.
    allotted: SecondaryMap<NodeId, Region>,
    generation: u64,
    viewport: Size,
    diagnostics: Vec<Diagnostic>,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self {
            boxes: SecondaryMap::new(),
            allotted: SecondaryMap::new(),
            generation: 0,
            viewport: Size::ZERO,
            diagnostics: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Passes
    // -----------------------------------------------------------------------

    /// Lay out the whole mounted tree in a `viewport`-sized terminal.
    ///
    /// Starts a new generation and drops boxes of nodes that are no longer
    /// mounted. A viewport change drops every cached box, since `vw` and `vh`
    /// sizes depend on it wherever they sit in the tree. Returns the root box,
    /// or `None` for an empty tree.
    pub fn layout_root(&mut self, dom: &mut Dom, viewport: Size, measure: &dyn Measure) -> Option<LayoutBox> {
        if viewport != self.viewport {
            self.boxes.clear();
            self.allotted.clear();
        }
        self.viewport = viewport;
        self.generation += 1;
        self.boxes.retain(|node, _| dom.get(node).is_some_and(|d| d.is_mounted()));
        self.allotted.retain(|node, _| dom.get(node).is_some_and(|d| d.is_mounted()));

        let root = dom.root()?;
        let styles = dom.styles(root).cloned().unwrap_or_default();
        let basis = Basis::new(viewport, viewport);
        let outer = |axis: Axis| match request(&styles, axis, basis, Request::Fill) {
            Request::Fixed(cells) => {
                (clamp(&styles, axis, cells, basis) + styles.margin().along(axis)).min(viewport.along(axis))
            }
            _ => viewport.along(axis),
        };
        let available = Region::new(0, 0, outer(Axis::Horizontal), outer(Axis::Vertical));
        let layout = self.layout(dom, root, available, measure);
        tracing::debug!(generation = self.generation, boxes = self.boxes.len(), "layout pass");
        Some(layout)
    }

    /// Lay out `node` inside `available` (its margin box) and, as needed,
    /// its descendants.
    pub fn layout(&mut self, dom: &mut Dom, node: NodeId, available: Region, measure: &dyn Measure) -> LayoutBox {
        self.layout_node(dom, node, available, None, measure)
    }

    fn layout_node(&mut self, dom: &mut Dom, node: NodeId, available: Region, intrinsic: Option<Size>, measure: &dyn Measure) -> LayoutBox {
        let dirty = dom.is_dirty(node, DirtyFlags::LAYOUT | DirtyFlags::CHILD_LAYOUT);
        if !dirty && self.allotted.get(node) == Some(&available) {
            if let Some(cached) = self.boxes.get(node) {
                return *cached;
            }
        }

        let styles = dom.styles(node).cloned().unwrap_or_default();
        if !styles.is_displayed() {
            self.forget(dom, node);
            dom.clear_dirty(node, DirtyFlags::LAYOUT | DirtyFlags::CHILD_LAYOUT);
            return LayoutBox {
                region: Region::new(available.x, available.y, 0, 0),
                content: Region::new(available.x, available.y, 0, 0),
                generation: self.generation,
                ..LayoutBox::default()
            };
        }

        let margin = styles.margin();
        let border = styles.border_spacing();
        let padding = styles.padding();
        let region = available.shrink(margin);
        let content = region.shrink(border + padding);

        let placements = Sizer::new(&*dom, measure, self.viewport, &mut self.diagnostics).arrange(node, &styles, content);
        for child in dom.children(node).to_vec() {
            if !placements.iter().any(|p| p.node == child) {
                self.forget(dom, child);
            }
        }
        for placement in &placements {
            self.layout_node(dom, placement.node, placement.region, placement.intrinsic, measure);
        }

        let computed = LayoutBox {
            region,
            content,
            margin,
            border,
            padding,
            intrinsic,
            generation: self.generation,
        };
        let stored = match self.boxes.get(node) {
            Some(previous) if previous.same_geometry(&computed) => *previous,
            _ => {
                dom.mark_dirty(node, DirtyFlags::PAINT);
                computed
            }
        };
        self.boxes.insert(node, stored);
        self.allotted.insert(node, available);
        dom.clear_dirty(node, DirtyFlags::LAYOUT | DirtyFlags::CHILD_LAYOUT);
        stored
    }

    // -----------------------------------------------------------------------
    // Results
    // -----------------------------------------------------------------------

    /// The box of a laid-out, displayed node.
    pub fn get(&self, node: NodeId) -> Option<&LayoutBox> {
        self.boxes.get(node)
    }

    /// Border-box region of a node.
    pub fn region(&self, node: NodeId) -> Option<Region> {
        self.boxes.get(node).map(|b| b.region)
    }

    /// Drop the cached boxes of `node` and its subtree.
    pub fn forget(&mut self, dom: &Dom, node: NodeId) {
        for id in dom.walk_depth_first(node) {
            self.boxes.remove(id);
            self.allotted.remove(id);
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Diagnostics recorded since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Forget every box.
    pub fn clear(&mut self) {
        self.boxes.clear();
        self.allotted.clear();
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::cascade::Cascade;
    use crate::css::specificity::Origin;
    use crate::diagnostics::Diagnostics;
    use crate::dom::node::NodeData;
    use crate::layout::arrange::{NoContent, MAX_ITERATIONS};
    use pretty_assertions::assert_eq;

    const VIEWPORT: Size = Size::new(40, 12);

    struct Fixture {
        dom: Dom,
        cascade: Cascade,
        engine: LayoutEngine,
        root: NodeId,
    }

    impl Fixture {
        fn new(css: &str) -> Self {
            let mut dom = Dom::new();
            let root = dom.create_root(NodeData::new("Screen")).unwrap();
            let mut cascade = Cascade::new();
            assert!(cascade.add_source("test", Origin::User, css).is_empty());
            Self { dom, cascade, engine: LayoutEngine::new(), root }
        }

        fn add(&mut self, parent: NodeId, data: NodeData) -> NodeId {
            let node = self.dom.create(data);
            self.dom.mount(parent, node).unwrap();
            node
        }

        fn pass(&mut self) {
            self.cascade.resolve_dirty(&mut self.dom, &mut Diagnostics::new());
            self.engine.layout_root(&mut self.dom, VIEWPORT, &NoContent);
        }

        fn clear_paint(&mut self) {
            for node in self.dom.walk_depth_first(self.root) {
                self.dom.clear_dirty(node, DirtyFlags::PAINT);
            }
        }

        fn region(&self, node: NodeId) -> Region {
            self.engine.region(node).unwrap()
        }
    }

    // ── Boxes ────────────────────────────────────────────────────────

    #[test]
    fn root_fills_viewport() {
        let mut f = Fixture::new("Screen { padding: 1 2; }");
        f.pass();
        let root = *f.engine.get(f.root).unwrap();
        assert_eq!(root.region, Region::new(0, 0, 40, 12));
        assert_eq!(root.content, Region::new(2, 1, 36, 10));
        assert_eq!(root.generation, 1);
    }

    #[test]
    fn border_and_padding_are_additive_by_default() {
        let mut f = Fixture::new(
            "#a { width: 10; height: 3; padding: 1; border: solid; margin: 1 0; }
             #b { width: 10; height: 6; padding: 1; border: solid; box-sizing: border-box; }",
        );
        let root = f.root;
        let a = f.add(root, NodeData::new("Static").with_id("a"));
        let b = f.add(root, NodeData::new("Static").with_id("b"));
        f.pass();
        let a_box = *f.engine.get(a).unwrap();
        assert_eq!(a_box.region, Region::new(0, 1, 14, 7));
        assert_eq!(a_box.content, Region::new(2, 3, 10, 3));
        assert_eq!(a_box.outer(), Region::new(0, 0, 14, 9));
        assert_eq!(f.region(b), Region::new(0, 9, 10, 6));
        assert_eq!(f.engine.get(b).unwrap().content, Region::new(2, 11, 6, 2));
    }

    #[test]
    fn display_none_has_no_box() {
        let mut f = Fixture::new("#gone { display: none; height: 4; } Static { height: 2; }");
        let root = f.root;
        let gone = f.add(root, NodeData::new("Static").with_id("gone"));
        let inner = f.add(gone, NodeData::new("Static"));
        let kept = f.add(root, NodeData::new("Static"));
        f.pass();
        assert!(f.engine.get(gone).is_none());
        assert!(f.engine.get(inner).is_none());
        assert_eq!(f.region(kept), Region::new(0, 0, 40, 2));
    }

    #[test]
    fn visibility_hidden_keeps_its_space() {
        let mut f = Fixture::new("Static { height: 2; } #ghost { visibility: hidden; }");
        let root = f.root;
        f.add(root, NodeData::new("Static").with_id("ghost"));
        let after = f.add(root, NodeData::new("Static"));
        f.pass();
        assert_eq!(f.region(after), Region::new(0, 2, 40, 2));
    }

    // ── Incremental passes ───────────────────────────────────────────

    #[test]
    fn clean_subtrees_are_reused() {
        let mut f = Fixture::new("Static { height: 2; } .tall { height: 5; }");
        let root = f.root;
        let first = f.add(root, NodeData::new("Static"));
        let second = f.add(root, NodeData::new("Static"));
        let side = f.add(root, NodeData::new("Static"));
        f.pass();
        f.clear_paint();
        let before = *f.engine.get(first).unwrap();

        f.dom.add_class(second, "tall").unwrap();
        f.pass();
        assert_eq!(f.engine.generation(), 2);
        assert_eq!(*f.engine.get(first).unwrap(), before);
        assert!(!f.dom.is_dirty(first, DirtyFlags::PAINT));
        assert!(f.dom.is_dirty(second, DirtyFlags::PAINT));
        assert_eq!(f.region(second), Region::new(0, 2, 40, 5));
        assert_eq!(f.region(side), Region::new(0, 7, 40, 2));
        assert!(f.dom.is_dirty(side, DirtyFlags::PAINT));
        assert_eq!(f.engine.get(side).unwrap().generation, 2);
        assert!(!f.dom.is_dirty(root, DirtyFlags::LAYOUT | DirtyFlags::CHILD_LAYOUT));
    }

    #[test]
    fn resize_relayouts_everything() {
        let mut f = Fixture::new("Static { width: 50%; height: 1fr; }");
        let root = f.root;
        let half = f.add(root, NodeData::new("Static"));
        f.pass();
        assert_eq!(f.region(half), Region::new(0, 0, 20, 12));
        f.engine.layout_root(&mut f.dom, Size::new(60, 20), &NoContent);
        assert_eq!(f.region(half), Region::new(0, 0, 30, 20));
        assert_eq!(f.engine.viewport(), Size::new(60, 20));
    }

    #[test]
    fn viewport_units_follow_resize_under_fixed_parent() {
        let mut f = Fixture::new("#box { width: 30; height: 5; } #inner { width: 50vw; height: 20vh; }");
        let root = f.root;
        let frame = f.add(root, NodeData::new("Container").with_id("box"));
        let inner = f.add(frame, NodeData::new("Static").with_id("inner"));
        f.pass();
        assert_eq!(f.region(frame), Region::new(0, 0, 30, 5));
        assert_eq!(f.region(inner), Region::new(0, 0, 20, 2));

        f.engine.layout_root(&mut f.dom, Size::new(60, 20), &NoContent);
        assert_eq!(f.region(frame), Region::new(0, 0, 30, 5));
        assert_eq!(f.region(inner), Region::new(0, 0, 30, 4));

        f.engine.layout_root(&mut f.dom, VIEWPORT, &NoContent);
        assert_eq!(f.region(inner), Region::new(0, 0, 20, 2));
    }

    #[test]
    fn unmounted_nodes_lose_their_boxes() {
        let mut f = Fixture::new("Static { height: 2; }");
        let root = f.root;
        let leaf = f.add(root, NodeData::new("Static"));
        f.pass();
        assert!(f.engine.get(leaf).is_some());
        f.dom.unmount(leaf).unwrap();
        f.pass();
        assert!(f.engine.get(leaf).is_none());
    }

    #[test]
    fn non_convergence_is_reported() {
        let mut f = Fixture::new("#loop { height: auto; } #fixed { height: 3; } .grow { height: 100%; }");
        let root = f.root;
        let group = f.add(root, NodeData::new("Container").with_id("loop"));
        f.add(group, NodeData::new("Static").with_id("fixed"));
        f.add(group, NodeData::new("Static").with_class("grow"));
        f.pass();
        assert_eq!(f.region(group).height, 0);
        assert_eq!(
            f.engine.take_diagnostics(),
            vec![Diagnostic::LayoutNonConvergence { node: group, iterations: MAX_ITERATIONS }]
        );
    }
}
