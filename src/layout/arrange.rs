//! Child arrangement: docks, vertical and horizontal flow, grids, and
//! intrinsic (`auto`) sizing.

use std::collections::HashMap;

use super::grid;
use super::resolve::{clamp, dimension, distribute, request, Basis, Request};
use crate::css::scalar::Scalar;
use crate::css::styles::{Dock, LayoutKind, Styles};
use crate::diagnostics::Diagnostic;
use crate::dom::node::NodeId;
use crate::dom::tree::Dom;
use crate::geometry::{Axis, Region, Size};

/// Fixed-point iterations allowed when an `auto` box depends on its own size.
pub const MAX_ITERATIONS: usize = 8;

/// Content measurement for leaf nodes.
pub trait Measure {
    /// Intrinsic content size of `node` when its content may use `available`,
    /// or `None` when the node has no content of its own.
    fn measure(&self, node: NodeId, styles: &Styles, available: Size) -> Option<Size>;
}

impl<F> Measure for F
where
    F: Fn(NodeId, &Styles, Size) -> Option<Size>,
{
    fn measure(&self, node: NodeId, styles: &Styles, available: Size) -> Option<Size> {
        self(node, styles, available)
    }
}

/// A measure that knows no content.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContent;

impl Measure for NoContent {
    fn measure(&self, _node: NodeId, _styles: &Styles, _available: Size) -> Option<Size> {
        None
    }
}

/// The outer rectangle (margin box) handed to one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub node: NodeId,
    pub region: Region,
    /// Border-box size, when either axis was sized from content.
    pub intrinsic: Option<Size>,
}

type Flow = Vec<(NodeId, Styles)>;
type Docked = Vec<(NodeId, Styles, Dock)>;

/// Sizing context for one container: read-only tree access plus a memo of
/// intrinsic content sizes computed so far.
pub(crate) struct Sizer<'a> {
    dom: &'a Dom,
    measure: &'a dyn Measure,
    viewport: Size,
    diagnostics: &'a mut Vec<Diagnostic>,
    memo: HashMap<(NodeId, Size), Size>,
}

impl<'a> Sizer<'a> {
    pub(crate) fn new(dom: &'a Dom, measure: &'a dyn Measure, viewport: Size, diagnostics: &'a mut Vec<Diagnostic>) -> Self {
        Self { dom, measure, viewport, diagnostics, memo: HashMap::new() }
    }

    fn styles(&self, node: NodeId) -> Styles {
        self.dom.styles(node).cloned().unwrap_or_default()
    }

    /// Displayed children split into docked and flow lists, in tree order.
    fn split_children(&self, node: NodeId) -> (Docked, Flow) {
        let mut docked = Vec::new();
        let mut flow = Vec::new();
        for &child in self.dom.children(node) {
            let styles = self.styles(child);
            if !styles.is_displayed() {
                continue;
            }
            match styles.dock {
                Some(dock) => docked.push((child, styles, dock)),
                None => flow.push((child, styles)),
            }
        }
        (docked, flow)
    }

    // -----------------------------------------------------------------------
    // Arrangement
    // -----------------------------------------------------------------------

    /// Place the displayed children of `node` inside its content region.
    pub(crate) fn arrange(&mut self, node: NodeId, styles: &Styles, content: Region) -> Vec<Placement> {
        let basis = Basis::new(content.size(), self.viewport);
        let (docked, flow) = self.split_children(node);
        let mut placements = Vec::with_capacity(docked.len() + flow.len());
        let area = self.arrange_docks(&docked, content, basis, &mut placements);
        match styles.layout_kind() {
            LayoutKind::Vertical => self.arrange_linear(&flow, Axis::Vertical, area, basis, &mut placements),
            LayoutKind::Horizontal => self.arrange_linear(&flow, Axis::Horizontal, area, basis, &mut placements),
            LayoutKind::Grid => self.arrange_grid(&flow, styles, area, basis, &mut placements),
        }
        placements
    }

    /// Border-box length along `axis` for requests that do not depend on
    /// siblings. `offered` is the outer length the container has available.
    fn own_length(&mut self, node: NodeId, styles: &Styles, axis: Axis, default: Request, offered: Size, basis: Basis) -> (i32, bool) {
        let margin = styles.margin();
        let (length, auto) = match request(styles, axis, basis, default) {
            Request::Fixed(cells) => (cells, false),
            Request::Fill | Request::Fraction(_) => ((offered.along(axis) - margin.along(axis)).max(0), false),
            Request::Auto => {
                let available = Size::new(
                    (offered.width - margin.width()).max(0),
                    (offered.height - margin.height()).max(0),
                );
                (self.auto_length(node, styles, axis, available), true)
            }
        };
        (clamp(styles, axis, length, basis), auto)
    }

    /// Pin docked children to their edges, returning what is left for flow.
    fn arrange_docks(&mut self, docked: &[(NodeId, Styles, Dock)], area: Region, basis: Basis, out: &mut Vec<Placement>) -> Region {
        let mut area = area;
        for (node, styles, dock) in docked {
            let natural = match dock {
                Dock::Top | Dock::Bottom => Axis::Vertical,
                Dock::Left | Dock::Right => Axis::Horizontal,
            };
            let (span, span_auto) = self.own_length(*node, styles, natural.cross(), Request::Fill, area.size(), basis);
            let offered = Size::from_axes(natural, area.len(natural), span + styles.margin().along(natural.cross()));
            let (depth, depth_auto) = self.own_length(*node, styles, natural, Request::Auto, offered, basis);

            let margin = styles.margin();
            let outer_depth = depth + margin.along(natural);
            let outer_span = span + margin.along(natural.cross());
            let region = match dock {
                Dock::Top => Region::new(area.x, area.y, outer_span, outer_depth),
                Dock::Bottom => Region::new(area.x, area.bottom() - outer_depth, outer_span, outer_depth),
                Dock::Left => Region::new(area.x, area.y, outer_depth, outer_span),
                Dock::Right => Region::new(area.right() - outer_depth, area.y, outer_depth, outer_span),
            };
            area = match dock {
                Dock::Top => Region::new(area.x, area.y + outer_depth, area.width, (area.height - outer_depth).max(0)),
                Dock::Bottom => Region::new(area.x, area.y, area.width, (area.height - outer_depth).max(0)),
                Dock::Left => Region::new(area.x + outer_depth, area.y, (area.width - outer_depth).max(0), area.height),
                Dock::Right => Region::new(area.x, area.y, (area.width - outer_depth).max(0), area.height),
            };
            let intrinsic = (span_auto || depth_auto).then(|| Size::from_axes(natural, depth, span));
            out.push(Placement { node: *node, region, intrinsic });
        }
        area
    }

    /// Stack `flow` along `axis`. Fixed and auto children take their size,
    /// fractional children share what remains, the cross axis fills.
    fn arrange_linear(&mut self, flow: &[(NodeId, Styles)], axis: Axis, area: Region, basis: Basis, out: &mut Vec<Placement>) {
        let cross = axis.cross();
        let mut cross_lengths = Vec::with_capacity(flow.len());
        let mut main_lengths = Vec::with_capacity(flow.len());
        let mut weights = Vec::with_capacity(flow.len());
        let mut autos = Vec::with_capacity(flow.len());
        let mut remaining = area.len(axis);

        for (node, styles) in flow {
            let margin = styles.margin();
            let (cross_length, cross_auto) = self.own_length(*node, styles, cross, Request::Fill, area.size(), basis);
            let (main_length, weight, main_auto) = match request(styles, axis, basis, Request::Auto) {
                Request::Fraction(weight) => (0, weight, false),
                Request::Fixed(cells) => (clamp(styles, axis, cells, basis), 0.0, false),
                Request::Fill => (clamp(styles, axis, (area.len(axis) - margin.along(axis)).max(0), basis), 0.0, false),
                Request::Auto => {
                    let available = Size::from_axes(axis, (area.len(axis) - margin.along(axis)).max(0), cross_length);
                    let length = self.auto_length(*node, styles, axis, available);
                    (clamp(styles, axis, length, basis), 0.0, true)
                }
            };
            remaining -= margin.along(axis) + main_length;
            cross_lengths.push(cross_length);
            main_lengths.push(main_length);
            weights.push(weight);
            autos.push(cross_auto || main_auto);
        }

        let shares = distribute(remaining.max(0), &weights);
        let mut position = area.start(axis);
        for (index, (node, styles)) in flow.iter().enumerate() {
            if weights[index] > 0.0 {
                main_lengths[index] = clamp(styles, axis, shares[index], basis);
            }
            let margin = styles.margin();
            let outer_main = main_lengths[index] + margin.along(axis);
            let outer_cross = cross_lengths[index] + margin.along(cross);
            let region = Region::from_axes(axis, position, area.start(cross), outer_main, outer_cross);
            let intrinsic = autos[index].then(|| Size::from_axes(axis, main_lengths[index], cross_lengths[index]));
            out.push(Placement { node: *node, region, intrinsic });
            position += outer_main;
        }
    }

    fn arrange_grid(&mut self, flow: &[(NodeId, Styles)], styles: &Styles, area: Region, basis: Basis, out: &mut Vec<Placement>) {
        let plan = self.plan_grid(flow, styles);
        let gutter = styles.grid_gutter.unwrap_or_default();
        let column_tracks = grid::tracks(styles.grid_columns.as_deref(), plan.columns);
        let row_tracks = grid::tracks(styles.grid_rows.as_deref(), plan.rows);

        let column_autos = self.auto_tracks(flow, &plan, &column_tracks, Axis::Horizontal, area.size(), basis);
        let row_autos = self.auto_tracks(flow, &plan, &row_tracks, Axis::Vertical, area.size(), basis);
        let widths = grid::size_tracks(&column_tracks, area.width, gutter.horizontal, Axis::Horizontal, basis, &column_autos);
        let heights = grid::size_tracks(&row_tracks, area.height, gutter.vertical, Axis::Vertical, basis, &row_autos);
        let xs = grid::offsets(area.x, &widths, gutter.horizontal);
        let ys = grid::offsets(area.y, &heights, gutter.vertical);

        for ((node, child), cell) in flow.iter().zip(&plan.cells) {
            let width = grid::span_length(&widths, cell.column, cell.column_span, gutter.horizontal);
            let height = grid::span_length(&heights, cell.row, cell.row_span, gutter.vertical);
            let margin = child.margin();
            let width = match request(child, Axis::Horizontal, basis, Request::Fill) {
                Request::Fixed(cells) => (clamp(child, Axis::Horizontal, cells, basis) + margin.width()).min(width),
                _ => width,
            };
            let height = match request(child, Axis::Vertical, basis, Request::Fill) {
                Request::Fixed(cells) => (clamp(child, Axis::Vertical, cells, basis) + margin.height()).min(height),
                _ => height,
            };
            let region = Region::new(xs[cell.column], ys[cell.row], width, height);
            out.push(Placement { node: *node, region, intrinsic: None });
        }
    }

    fn plan_grid(&self, flow: &[(NodeId, Styles)], styles: &Styles) -> grid::GridPlan {
        let size = styles.grid_size;
        let columns = size.map_or(1, |s| usize::from(s.columns));
        let min_rows = size.and_then(|s| s.rows).map_or(0, usize::from);
        let spans: Vec<(usize, usize)> = flow
            .iter()
            .map(|(_, s)| {
                (usize::from(s.column_span.unwrap_or(1)), usize::from(s.row_span.unwrap_or(1)))
            })
            .collect();
        grid::place(&spans, columns, min_rows)
    }

    /// Content sizes for `auto` tracks, from children spanning a single track.
    fn auto_tracks(&mut self, flow: &[(NodeId, Styles)], plan: &grid::GridPlan, tracks: &[Scalar], axis: Axis, available: Size, basis: Basis) -> Vec<i32> {
        let mut sizes = vec![0; tracks.len()];
        if !tracks.iter().any(|t| t.is_auto()) {
            return sizes;
        }
        for ((node, styles), cell) in flow.iter().zip(&plan.cells) {
            let (track, span) = match axis {
                Axis::Horizontal => (cell.column, cell.column_span),
                Axis::Vertical => (cell.row, cell.row_span),
            };
            if span != 1 || !tracks.get(track).is_some_and(|t| t.is_auto()) {
                continue;
            }
            let length = self.outer_intrinsic(*node, styles, axis, available, basis);
            sizes[track] = sizes[track].max(length);
        }
        sizes
    }

    // -----------------------------------------------------------------------
    // Intrinsic sizing
    // -----------------------------------------------------------------------

    /// Border-box length of an `auto` box along `axis`. `available` is the
    /// border-box space the box may grow into.
    ///
    /// When a flow child is sized relative to this box along `axis`, the box
    /// depends on its own size: the length is iterated to a fixed point,
    /// starting from zero. If that does not settle the box falls back to
    /// zero and a diagnostic is recorded.
    pub(crate) fn auto_length(&mut self, node: NodeId, styles: &Styles, axis: Axis, available: Size) -> i32 {
        let inner = styles.inner_spacing();
        let room = Size::new(
            (available.width - inner.width()).max(0),
            (available.height - inner.height()).max(0),
        );
        if !self.has_relative_children(node, axis) {
            return self.content_size(node, styles, room).along(axis) + inner.along(axis);
        }
        let mut guess = 0;
        for _ in 0..MAX_ITERATIONS {
            let basis = Size::from_axes(axis, guess, room.along(axis.cross()));
            let next = self.content_size(node, styles, basis).along(axis);
            if next == guess {
                return next + inner.along(axis);
            }
            guess = next;
        }
        self.diagnostics.push(Diagnostic::LayoutNonConvergence { node, iterations: MAX_ITERATIONS });
        0
    }

    fn has_relative_children(&self, node: NodeId, axis: Axis) -> bool {
        self.dom.children(node).iter().any(|&child| {
            let styles = self.styles(child);
            styles.is_displayed()
                && styles.dock.is_none()
                && dimension(&styles, axis).is_some_and(|d| d.is_container_relative())
        })
    }

    /// Outer (margin box) length a child wants along `axis` when its
    /// container shrinks to fit. Fractions and fill count as `auto`.
    fn outer_intrinsic(&mut self, node: NodeId, styles: &Styles, axis: Axis, available: Size, basis: Basis) -> i32 {
        let margin = styles.margin();
        let length = match request(styles, axis, basis, Request::Auto) {
            Request::Fixed(cells) => cells,
            _ => {
                let room = Size::new(
                    (available.width - margin.width()).max(0),
                    (available.height - margin.height()).max(0),
                );
                self.auto_length(node, styles, axis, room)
            }
        };
        clamp(styles, axis, length, basis) + margin.along(axis)
    }

    /// Size of the content of `node`: its own measured content or its
    /// children, whichever is larger. `available` is both the room for
    /// content and the basis for children's relative units.
    fn content_size(&mut self, node: NodeId, styles: &Styles, available: Size) -> Size {
        if let Some(size) = self.memo.get(&(node, available)) {
            return *size;
        }
        let measured = self.measure.measure(node, styles, available);
        let (docked, flow) = self.split_children(node);
        let size = if docked.is_empty() && flow.is_empty() {
            measured.unwrap_or(Size::ZERO)
        } else {
            let basis = Basis::new(available, self.viewport);
            let mut size = match styles.layout_kind() {
                LayoutKind::Vertical => self.stack_size(&flow, Axis::Vertical, available, basis),
                LayoutKind::Horizontal => self.stack_size(&flow, Axis::Horizontal, available, basis),
                LayoutKind::Grid => self.grid_content_size(&flow, styles, available, basis),
            };
            for (child, child_styles, dock) in &docked {
                let width = self.outer_intrinsic(*child, child_styles, Axis::Horizontal, available, basis);
                let height = self.outer_intrinsic(*child, child_styles, Axis::Vertical, available, basis);
                match dock {
                    Dock::Top | Dock::Bottom => {
                        size.height += height;
                        size.width = size.width.max(width);
                    }
                    Dock::Left | Dock::Right => {
                        size.width += width;
                        size.height = size.height.max(height);
                    }
                }
            }
            if let Some(measured) = measured {
                size.width = size.width.max(measured.width);
                size.height = size.height.max(measured.height);
            }
            size
        };
        self.memo.insert((node, available), size);
        size
    }

    fn stack_size(&mut self, flow: &[(NodeId, Styles)], axis: Axis, available: Size, basis: Basis) -> Size {
        let mut main = 0;
        let mut cross = 0;
        for (child, styles) in flow {
            main += self.outer_intrinsic(*child, styles, axis, available, basis);
            cross = cross.max(self.outer_intrinsic(*child, styles, axis.cross(), available, basis));
        }
        Size::from_axes(axis, main, cross)
    }

    /// A shrink-to-fit grid is as wide as offered and tall enough for its
    /// rows at the tallest child's height.
    fn grid_content_size(&mut self, flow: &[(NodeId, Styles)], styles: &Styles, available: Size, basis: Basis) -> Size {
        let plan = self.plan_grid(flow, styles);
        let gutter = styles.grid_gutter.unwrap_or_default();
        let mut row_height = 0;
        for (child, child_styles) in flow {
            row_height = row_height.max(self.outer_intrinsic(*child, child_styles, Axis::Vertical, available, basis));
        }
        let rows = plan.rows as i32;
        let height = row_height * rows + gutter.vertical * (rows - 1).max(0);
        Size::new(available.width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::scalar::Scalar;
    use crate::css::styles::GridSize;
    use crate::dom::node::NodeData;
    use crate::geometry::Spacing;
    use pretty_assertions::assert_eq;

    const VIEWPORT: Size = Size::new(100, 40);

    struct Fixture {
        dom: Dom,
        root: NodeId,
    }

    impl Fixture {
        fn new(styles: Styles) -> Self {
            let mut dom = Dom::new();
            let root = dom.create_root(NodeData::new("Screen")).unwrap();
            dom.set_resolved(root, styles);
            Self { dom, root }
        }

        fn child(&mut self, parent: NodeId, styles: Styles) -> NodeId {
            let node = self.dom.create(NodeData::new("Static"));
            self.dom.mount(parent, node).unwrap();
            self.dom.set_resolved(node, styles);
            node
        }

        fn arrange(&self, node: NodeId, content: Region) -> Vec<Placement> {
            self.arrange_with(node, content, &NoContent).0
        }

        fn arrange_with(&self, node: NodeId, content: Region, measure: &dyn Measure) -> (Vec<Placement>, Vec<Diagnostic>) {
            let mut diagnostics = Vec::new();
            let styles = self.dom.styles(node).cloned().unwrap_or_default();
            let placements = Sizer::new(&self.dom, measure, VIEWPORT, &mut diagnostics).arrange(node, &styles, content);
            (placements, diagnostics)
        }
    }

    fn sized(width: Option<Scalar>, height: Option<Scalar>) -> Styles {
        Styles { width, height, ..Styles::default() }
    }

    fn regions(placements: &[Placement]) -> Vec<Region> {
        placements.iter().map(|p| p.region).collect()
    }

    // ── Linear ───────────────────────────────────────────────────────

    #[test]
    fn vertical_stack_fills_width() {
        let mut f = Fixture::new(Styles::default());
        let root = f.root;
        f.child(root, sized(None, Some(Scalar::cells(3.0))));
        f.child(root, sized(Some(Scalar::cells(10.0)), Some(Scalar::cells(2.0))));
        let placements = f.arrange(root, Region::new(0, 0, 40, 20));
        assert_eq!(regions(&placements), vec![Region::new(0, 0, 40, 3), Region::new(0, 3, 10, 2)]);
    }

    #[test]
    fn horizontal_fractions_conserve_width() {
        let mut f = Fixture::new(Styles { layout: Some(LayoutKind::Horizontal), ..Styles::default() });
        let root = f.root;
        f.child(root, sized(Some(Scalar::cells(20.0)), None));
        f.child(root, sized(Some(Scalar::fr(1.0)), None));
        f.child(root, sized(Some(Scalar::fr(2.0)), None));
        let placements = f.arrange(root, Region::new(5, 1, 100, 10));
        assert_eq!(
            regions(&placements),
            vec![Region::new(5, 1, 20, 10), Region::new(25, 1, 27, 10), Region::new(52, 1, 53, 10)]
        );
        assert_eq!(placements.iter().map(|p| p.region.width).sum::<i32>(), 100);
    }

    #[test]
    fn margins_are_part_of_the_placement() {
        let mut f = Fixture::new(Styles::default());
        let root = f.root;
        f.child(
            root,
            Styles { height: Some(Scalar::fr(1.0)), margin: Some(Spacing::all(1)), ..Styles::default() },
        );
        f.child(root, sized(None, Some(Scalar::cells(4.0))));
        let placements = f.arrange(root, Region::new(0, 0, 30, 20));
        assert_eq!(regions(&placements), vec![Region::new(0, 0, 30, 16), Region::new(0, 16, 30, 4)]);
    }

    #[test]
    fn overflowing_children_are_not_squeezed() {
        let mut f = Fixture::new(Styles::default());
        let root = f.root;
        f.child(root, sized(None, Some(Scalar::cells(8.0))));
        f.child(root, sized(None, Some(Scalar::cells(8.0))));
        let placed = f.child(root, sized(None, Some(Scalar::fr(1.0))));
        let placements = f.arrange(root, Region::new(0, 0, 10, 10));
        assert_eq!(placements[1].region, Region::new(0, 8, 10, 8));
        assert_eq!(placements[2].node, placed);
        assert_eq!(placements[2].region.height, 0);
    }

    #[test]
    fn hidden_children_are_skipped() {
        let mut f = Fixture::new(Styles::default());
        let root = f.root;
        f.child(
            root,
            Styles { display: Some(crate::css::styles::Display::None), ..sized(None, Some(Scalar::cells(5.0))) },
        );
        let shown = f.child(root, sized(None, Some(Scalar::cells(2.0))));
        let placements = f.arrange(root, Region::new(0, 0, 10, 10));
        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].node, shown);
        assert_eq!(placements[0].region, Region::new(0, 0, 10, 2));
    }

    // ── Docks ────────────────────────────────────────────────────────

    #[test]
    fn docks_shrink_the_flow_area() {
        let mut f = Fixture::new(Styles::default());
        let root = f.root;
        let body = f.child(root, sized(None, Some(Scalar::fr(1.0))));
        let header = f.child(root, Styles { dock: Some(Dock::Top), ..sized(None, Some(Scalar::cells(1.0))) });
        let side = f.child(root, Styles { dock: Some(Dock::Left), ..sized(Some(Scalar::cells(6.0)), None) });
        let footer = f.child(root, Styles { dock: Some(Dock::Bottom), ..sized(None, Some(Scalar::cells(2.0))) });
        let placements = f.arrange(root, Region::new(0, 0, 40, 20));
        let find = |node| placements.iter().find(|p| p.node == node).unwrap().region;
        assert_eq!(find(header), Region::new(0, 0, 40, 1));
        assert_eq!(find(side), Region::new(0, 1, 6, 19));
        assert_eq!(find(footer), Region::new(6, 18, 34, 2));
        assert_eq!(find(body), Region::new(6, 1, 34, 17));
    }

    // ── Auto sizing ──────────────────────────────────────────────────

    #[test]
    fn auto_uses_measured_content() {
        let mut f = Fixture::new(Styles::default());
        let root = f.root;
        let label = f.child(
            root,
            Styles { padding: Some(Spacing::symmetric(0, 1)), ..sized(Some(Scalar::auto()), None) },
        );
        let measure = move |node: NodeId, _: &Styles, _: Size| (node == label).then_some(Size::new(5, 1));
        let (placements, diagnostics) = f.arrange_with(root, Region::new(0, 0, 40, 10), &measure);
        assert_eq!(placements[0].region, Region::new(0, 0, 7, 1));
        assert_eq!(placements[0].intrinsic, Some(Size::new(7, 1)));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn auto_container_wraps_children() {
        let mut f = Fixture::new(Styles::default());
        let root = f.root;
        let group = f.child(root, Styles::default());
        f.child(group, sized(Some(Scalar::cells(12.0)), Some(Scalar::cells(3.0))));
        f.child(group, sized(Some(Scalar::cells(4.0)), Some(Scalar::cells(2.0))));
        let placements = f.arrange(root, Region::new(0, 0, 40, 20));
        assert_eq!(placements[0].region, Region::new(0, 0, 40, 5));
    }

    #[test]
    fn self_referential_auto_settles() {
        let mut f = Fixture::new(Styles::default());
        let root = f.root;
        let group = f.child(root, Styles::default());
        f.child(group, sized(None, Some(Scalar::cells(10.0))));
        f.child(group, sized(None, Some(Scalar::percent(50.0))));
        let (placements, diagnostics) = f.arrange_with(root, Region::new(0, 0, 40, 40), &NoContent);
        assert_eq!(placements[0].region.height, 19);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn runaway_auto_falls_back_to_zero() {
        let mut f = Fixture::new(Styles::default());
        let root = f.root;
        let group = f.child(root, Styles::default());
        f.child(group, sized(None, Some(Scalar::cells(10.0))));
        f.child(group, sized(None, Some(Scalar::percent(100.0))));
        let (placements, diagnostics) = f.arrange_with(root, Region::new(0, 0, 40, 40), &NoContent);
        assert_eq!(placements[0].region.height, 0);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::LayoutNonConvergence { node: group, iterations: MAX_ITERATIONS }]
        );
    }

    // ── Grid ─────────────────────────────────────────────────────────

    #[test]
    fn grid_splits_area_into_cells() {
        let mut f = Fixture::new(Styles {
            grid_size: Some(GridSize { columns: 3, rows: Some(2) }),
            ..Styles::default()
        });
        let root = f.root;
        for _ in 0..6 {
            f.child(root, Styles::default());
        }
        let placements = f.arrange(root, Region::new(0, 0, 30, 10));
        assert_eq!(placements[0].region, Region::new(0, 0, 10, 5));
        assert_eq!(placements[4].region, Region::new(10, 5, 10, 5));
        assert_eq!(placements[5].region, Region::new(20, 5, 10, 5));
    }

    #[test]
    fn grid_gutters_and_spans() {
        let mut f = Fixture::new(Styles {
            grid_size: Some(GridSize { columns: 2, rows: None }),
            grid_gutter: Some(crate::css::styles::GridGutter { vertical: 1, horizontal: 2 }),
            ..Styles::default()
        });
        let root = f.root;
        f.child(root, Styles { column_span: Some(2), ..Styles::default() });
        f.child(root, Styles::default());
        f.child(root, sized(Some(Scalar::cells(3.0)), None));
        let placements = f.arrange(root, Region::new(0, 0, 22, 9));
        assert_eq!(placements[0].region, Region::new(0, 0, 22, 4));
        assert_eq!(placements[1].region, Region::new(0, 5, 10, 4));
        assert_eq!(placements[2].region, Region::new(12, 5, 3, 4));
    }
}
