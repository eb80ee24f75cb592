//! Screen: the explicitly owned application context.
//!
//! [`Screen`] owns the DOM, the widgets registered at mount, the reactive
//! store, the cascade, the layout engine, the compositor and the collected
//! diagnostics. Every pass takes it by reference; there is no ambient global
//! state. [`Screen::frame`] runs one resolve, layout and paint cycle.

use std::collections::HashSet;

use slotmap::SecondaryMap;

use crate::css::cascade::{Cascade, BUILTIN_CSS};
use crate::css::parser::ParseError;
use crate::css::specificity::{CascadeOrder, Origin};
use crate::css::styles::Styles;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::dom::node::{NodeData, NodeId, PseudoState};
use crate::dom::query::{DomQuery, QueryError};
use crate::dom::tree::{Dom, DomError};
use crate::geometry::Size;
use crate::layout::{LayoutBox, LayoutEngine, Measure};
use crate::reactive::{AttrValue, ReactiveError, ReactiveStore, SetOutcome};
use crate::render::compositor::{Compositor, Content, Patch};
use crate::render::strip::Strip;
use crate::widget::traits::{Widget, WidgetContext};
use crate::worker::TaskRegistry;

/// Name of the sheet holding the framework-wide defaults.
pub const BUILTIN_SHEET: &str = "builtin";

/// Errors from mounting and attribute access through the screen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScreenError {
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error(transparent)]
    Reactive(#[from] ReactiveError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("the screen has no root node")]
    NoRoot,
}

// ---------------------------------------------------------------------------
// WidgetHost
// ---------------------------------------------------------------------------

/// Routes layout measurement and content rendering to the node's widget.
struct WidgetHost<'a> {
    widgets: &'a SecondaryMap<NodeId, Box<dyn Widget>>,
    attrs: &'a ReactiveStore,
}

impl Measure for WidgetHost<'_> {
    fn measure(&self, node: NodeId, styles: &Styles, available: Size) -> Option<Size> {
        let widget = self.widgets.get(node)?;
        widget.measure(&WidgetContext::new(node, self.attrs), styles, available)
    }
}

impl Content for WidgetHost<'_> {
    fn render(&self, node: NodeId, size: Size, styles: &Styles) -> Vec<Strip> {
        match self.widgets.get(node) {
            Some(widget) => widget.render(&WidgetContext::new(node, self.attrs), size, styles),
            None => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

/// A single screen of the application.
pub struct Screen {
    /// The node tree.
    pub dom: Dom,
    /// Per-node reactive attributes.
    pub attrs: ReactiveStore,
    /// Loaded style sheets.
    pub cascade: Cascade,
    /// Layout boxes and their cache.
    pub layout: LayoutEngine,
    /// Frame buffers and strip cache.
    pub compositor: Compositor,
    /// Background requests issued for nodes on this screen.
    pub tasks: TaskRegistry,
    /// Everything recoverable that went wrong so far.
    pub diagnostics: Diagnostics,
    widgets: SecondaryMap<NodeId, Box<dyn Widget>>,
    /// Widget types whose default CSS is loaded.
    loaded_types: HashSet<String>,
    focused: Option<NodeId>,
    viewport: Size,
}

impl Screen {
    /// A screen for a `width` × `height` terminal with the default cascade
    /// order.
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_order(width, height, CascadeOrder::default())
    }

    pub fn with_order(width: u16, height: u16, order: CascadeOrder) -> Self {
        let viewport = Size::new(i32::from(width), i32::from(height));
        let mut screen = Self {
            dom: Dom::new(),
            attrs: ReactiveStore::new(),
            cascade: Cascade::with_order(order),
            layout: LayoutEngine::new(),
            compositor: Compositor::new(viewport),
            tasks: TaskRegistry::new(),
            diagnostics: Diagnostics::new(),
            widgets: SecondaryMap::new(),
            loaded_types: HashSet::new(),
            focused: None,
            viewport,
        };
        screen.load_sheet(BUILTIN_SHEET, Origin::Builtin, BUILTIN_CSS);
        screen
    }

    pub fn size(&self) -> Size {
        self.viewport
    }

    /// Resize the viewport. The next frame relayouts and is emitted in full.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport = Size::new(i32::from(width), i32::from(height));
        self.compositor.resize(self.viewport);
        if let Some(root) = self.dom.root() {
            self.dom.mark_layout(root);
        }
    }

    // -----------------------------------------------------------------------
    // Style sheets
    // -----------------------------------------------------------------------

    /// Add or replace a user sheet. Rules that fail to parse are skipped and
    /// recorded as diagnostics; the errors are also returned.
    pub fn add_stylesheet(&mut self, name: &str, css: &str) -> Vec<ParseError> {
        self.load_sheet(name, Origin::User, css)
    }

    /// Add or replace a theme sheet.
    pub fn add_theme(&mut self, name: &str, css: &str) -> Vec<ParseError> {
        self.load_sheet(name, Origin::Theme, css)
    }

    pub fn remove_stylesheet(&mut self, name: &str) -> bool {
        let removed = self.cascade.remove_sheet(name);
        if removed {
            self.dom.invalidate_all_styles();
        }
        removed
    }

    fn load_sheet(&mut self, name: &str, origin: Origin, css: &str) -> Vec<ParseError> {
        let errors = self.cascade.add_source(name, origin, css);
        for error in &errors {
            self.diagnostics.record(Diagnostic::Parse { sheet: name.to_owned(), message: error.to_string() });
        }
        self.dom.invalidate_all_styles();
        errors
    }

    // -----------------------------------------------------------------------
    // Mounting
    // -----------------------------------------------------------------------

    /// Mount `widget` as the root of the tree.
    pub fn mount_root(&mut self, widget: impl Widget + 'static) -> Result<NodeId, ScreenError> {
        self.mount_boxed(None, Box::new(widget))
    }

    /// Mount `widget` as the last child of `parent`.
    pub fn mount(&mut self, parent: NodeId, widget: impl Widget + 'static) -> Result<NodeId, ScreenError> {
        self.mount_boxed(Some(parent), Box::new(widget))
    }

    /// Mount a boxed widget and, recursively, the children it composes.
    /// On failure nothing of the widget stays mounted.
    pub fn mount_boxed(&mut self, parent: Option<NodeId>, widget: Box<dyn Widget>) -> Result<NodeId, ScreenError> {
        let widget_type = widget.widget_type().to_owned();
        let mut data = NodeData::new(&widget_type)
            .with_classes(widget.css_classes().iter().cloned())
            .focusable(widget.can_focus());
        if let Some(id) = widget.css_id() {
            data = data.with_id(id);
        }

        let node = match parent {
            Some(parent) => {
                let node = self.dom.create(data);
                if let Err(err) = self.dom.mount(parent, node) {
                    self.dom.remove(node);
                    return Err(err.into());
                }
                node
            }
            None => self.dom.create_root(data)?,
        };

        if let Err(err) = self.attach(node, widget) {
            self.remove(node);
            return Err(err);
        }
        Ok(node)
    }

    /// Register `widget` on a freshly mounted `node` and mount what it composes.
    fn attach(&mut self, node: NodeId, mut widget: Box<dyn Widget>) -> Result<(), ScreenError> {
        let widget_type = widget.widget_type().to_owned();
        if self.loaded_types.insert(widget_type.clone()) && !widget.default_css().is_empty() {
            let css = widget.default_css().to_owned();
            self.load_sheet(&format!("default:{widget_type}"), Origin::ComponentDefault, &css);
        }
        widget.define_attributes(node, &mut self.attrs)?;
        let children = widget.compose();
        self.widgets.insert(node, widget);
        for child in children {
            self.mount_boxed(Some(node), child)?;
        }
        Ok(())
    }

    /// Remove `node` and its subtree, dropping their widgets, attributes,
    /// pending background requests and cached strips.
    pub fn remove(&mut self, node: NodeId) -> usize {
        self.layout.forget(&self.dom, node);
        let removed = self.dom.remove(node);
        for &id in &removed {
            self.widgets.remove(id);
            self.attrs.remove_node(id);
            self.tasks.cancel_node(id);
            self.compositor.forget(id);
            if self.focused == Some(id) {
                self.focused = None;
            }
        }
        removed.len()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.dom.root()
    }

    pub fn widget(&self, node: NodeId) -> Option<&dyn Widget> {
        self.widgets.get(node).map(|w| &**w)
    }

    /// Downcast the widget of `node`.
    pub fn widget_as<T: 'static>(&self, node: NodeId) -> Option<&T> {
        self.widgets.get(node)?.as_any().downcast_ref::<T>()
    }

    // -----------------------------------------------------------------------
    // Queries and attributes
    // -----------------------------------------------------------------------

    /// Descendants of the root matching `selector`, in document order.
    pub fn query(&self, selector: &str) -> Result<DomQuery, ScreenError> {
        let root = self.dom.root().ok_or(ScreenError::NoRoot)?;
        Ok(self.dom.query(root, selector)?)
    }

    pub fn query_one(&self, selector: &str) -> Result<NodeId, ScreenError> {
        let root = self.dom.root().ok_or(ScreenError::NoRoot)?;
        Ok(self.dom.query_one(root, selector)?)
    }

    /// Write a reactive attribute. Propagation diagnostics are collected.
    pub fn set_attr<T: AttrValue>(&mut self, node: NodeId, name: &str, value: T) -> Result<SetOutcome, ScreenError> {
        let outcome = self.attrs.set(&mut self.dom, node, name, value);
        self.diagnostics.extend(self.attrs.take_diagnostics());
        Ok(outcome?)
    }

    pub fn attr<T: 'static>(&self, node: NodeId, name: &str) -> Result<&T, ScreenError> {
        Ok(self.attrs.get::<T>(node, name)?)
    }

    /// Move focus, updating the `:focus` pseudo-class on both nodes.
    pub fn set_focus(&mut self, node: Option<NodeId>) -> Result<(), ScreenError> {
        if let Some(previous) = self.focused.take() {
            if self.dom.contains(previous) {
                self.dom.set_pseudo(previous, PseudoState::FOCUS, false)?;
            }
        }
        if let Some(node) = node {
            self.dom.set_pseudo(node, PseudoState::FOCUS, true)?;
        }
        self.focused = node;
        Ok(())
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    // -----------------------------------------------------------------------
    // Passes
    // -----------------------------------------------------------------------

    /// Re-resolve every node flagged `STYLE`. Returns how many were resolved.
    pub fn resolve_styles(&mut self) -> usize {
        self.cascade.resolve_dirty(&mut self.dom, &mut self.diagnostics)
    }

    /// Lay out the mounted tree.
    pub fn run_layout(&mut self) -> Option<LayoutBox> {
        let host = WidgetHost { widgets: &self.widgets, attrs: &self.attrs };
        let root = self.layout.layout_root(&mut self.dom, self.viewport, &host);
        self.diagnostics.extend(self.layout.take_diagnostics());
        root
    }

    /// Paint and diff against the previous frame.
    pub fn paint(&mut self) -> Vec<Patch> {
        let host = WidgetHost { widgets: &self.widgets, attrs: &self.attrs };
        self.compositor.render_frame(&mut self.dom, &self.layout, &host)
    }

    /// One full cycle: resolve dirty styles, lay out, paint.
    pub fn frame(&mut self) -> Vec<Patch> {
        let resolved = self.resolve_styles();
        self.run_layout();
        let patches = self.paint();
        tracing::debug!(resolved, patches = patches.len(), "frame");
        patches
    }

    /// Layout box of `node` from the last layout pass.
    pub fn layout_of(&self, node: NodeId) -> Option<LayoutBox> {
        self.layout.get(node).copied()
    }

    /// Node that painted the cell at `(x, y)` in the last frame.
    pub fn node_at(&self, x: i32, y: i32) -> Option<NodeId> {
        self.compositor.node_at(x, y)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::styles::TextAttributes;
    use crate::geometry::Region;
    use crate::render::sink::{apply_patches, MemorySink};
    use crate::testing::snapshot::screen_to_string;
    use crate::widgets::{Container, Static};
    use crate::reactive::AttrOptions;
    use crate::widget::{WidgetBuilder, WidgetExt};
    use pretty_assertions::assert_eq;
    use std::any::Any;

    fn screen_with(css: &str) -> Screen {
        let mut screen = Screen::new(20, 4);
        assert!(screen.add_stylesheet("app", css).is_empty());
        screen
    }

    // ── Mounting ─────────────────────────────────────────────────────

    #[test]
    fn mount_builds_tree_from_composed_children() {
        let mut screen = Screen::new(10, 3);
        let root = screen
            .mount_root(Container::new().with_child(Static::new("a").with_id("a")).with_child(Static::new("b")))
            .unwrap();
        assert_eq!(screen.dom.children(root).len(), 2);
        let a = screen.query_one("#a").unwrap();
        assert_eq!(screen.attr::<String>(a, Static::TEXT).unwrap(), "a");
        assert!(screen.widget_as::<WidgetBuilder<Static>>(a).is_some());
        assert!(screen.cascade.has_sheet("default:Container"));
        assert!(!screen.cascade.has_sheet("default:Static"));
    }

    /// Defines its one attribute twice, so registration always fails.
    struct Clashing;

    impl Widget for Clashing {
        fn widget_type(&self) -> &str {
            "Clashing"
        }

        fn define_attributes(&self, node: NodeId, attrs: &mut ReactiveStore) -> Result<(), ReactiveError> {
            attrs.define(node, "value", 0u32, AttrOptions::new())?;
            attrs.define(node, "value", 1u32, AttrOptions::new())
        }

        fn render(&self, _ctx: &WidgetContext<'_>, _size: Size, _styles: &Styles) -> Vec<Strip> {
            Vec::new()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn failed_mount_leaves_nothing_behind() {
        let mut screen = Screen::new(10, 3);
        let root = screen.mount_root(Container::new()).unwrap();
        let err = screen
            .mount(root, Container::new().with_child(Static::new("kept?").with_id("inner")).with_child(Clashing))
            .unwrap_err();
        assert!(matches!(err, ScreenError::Reactive(ReactiveError::AlreadyDefined(_))));
        assert!(screen.dom.children(root).is_empty());
        assert_eq!(screen.dom.len(), 1);
        assert!(matches!(screen.query_one("#inner"), Err(ScreenError::Query(QueryError::NotFound { .. }))));

        let mut empty = Screen::new(10, 3);
        assert!(empty.mount_root(Clashing).is_err());
        assert_eq!(empty.root(), None);
        assert!(empty.dom.is_empty());
        assert!(empty.mount_root(Container::new()).is_ok());
    }

    #[test]
    fn second_root_is_refused() {
        let mut screen = Screen::new(10, 3);
        screen.mount_root(Container::new()).unwrap();
        assert_eq!(screen.mount_root(Container::new()), Err(ScreenError::Dom(DomError::RootExists)));
    }

    #[test]
    fn remove_drops_widgets_and_attributes() {
        let mut screen = Screen::new(10, 3);
        let root = screen.mount_root(Container::new()).unwrap();
        let label = screen.mount(root, Static::new("x")).unwrap();
        let (token, flag) = screen.tasks.begin(label, "load");
        assert_eq!(screen.remove(label), 1);
        assert!(screen.widget(label).is_none());
        assert!(!screen.attrs.contains(label, Static::TEXT));
        assert!(flag.is_cancelled());
        assert!(!screen.tasks.is_current(&token));
    }

    // ── Frames ───────────────────────────────────────────────────────

    #[test]
    fn frame_paints_static_text() {
        let mut screen = screen_with("Static { height: 1; }");
        let root = screen.mount_root(Container::new()).unwrap();
        screen.mount(root, Static::new("hello")).unwrap();
        screen.mount(root, Static::new("world")).unwrap();
        let patches = screen.frame();
        assert_eq!(patches.len(), 4);
        assert_eq!(screen_to_string(&screen), "hello\nworld\n\n");
    }

    #[test]
    fn attribute_write_repaints_only_that_row() {
        let mut screen = screen_with("Static { height: 1; }");
        let root = screen.mount_root(Container::new()).unwrap();
        let first = screen.mount(root, Static::new("one")).unwrap();
        screen.mount(root, Static::new("two")).unwrap();
        screen.frame();

        assert_eq!(screen.set_attr(first, Static::TEXT, String::from("ONE")).unwrap(), SetOutcome::Changed);
        let patches = screen.frame();
        assert_eq!(patches.len(), 1);
        assert_eq!((patches[0].row, patches[0].col, patches[0].text()), (0, 0, "ONE".to_owned()));

        assert_eq!(screen.set_attr(first, Static::TEXT, String::from("ONE")).unwrap(), SetOutcome::Unchanged);
        assert!(screen.frame().is_empty());
    }

    #[test]
    fn auto_width_follows_measured_text() {
        let mut screen = screen_with("Container { layout: horizontal; } Static { width: auto; }");
        let root = screen.mount_root(Container::new()).unwrap();
        let label = screen.mount(root, Static::new("abc")).unwrap();
        screen.frame();
        assert_eq!(screen.layout_of(label).unwrap().region, Region::new(0, 0, 3, 4));
        assert_eq!(screen.node_at(1, 0), Some(label));
        assert_eq!(screen.node_at(5, 0), Some(root));
    }

    #[test]
    fn focus_toggles_pseudo_class_styles() {
        let mut screen = screen_with("Static { height: 1; } Static:focus { text-style: bold; }");
        let root = screen.mount_root(Container::new()).unwrap();
        let label = screen.mount(root, Static::new("x")).unwrap();
        screen.frame();
        screen.set_focus(Some(label)).unwrap();
        screen.frame();
        assert!(screen.compositor.frame().get(0, 0).unwrap().style.attributes.contains(TextAttributes::BOLD));
        screen.set_focus(None).unwrap();
        screen.frame();
        assert!(screen.compositor.frame().get(0, 0).unwrap().style.attributes.is_empty());
    }

    #[test]
    fn parse_errors_become_diagnostics() {
        let mut screen = Screen::new(10, 3);
        let errors = screen.add_stylesheet("broken", "Static { height: 1; }\n.bad { : ; }\nContainer { width: 1; }");
        assert_eq!(errors.len(), 1);
        assert_eq!(screen.diagnostics.len(), 1);
        assert!(matches!(screen.diagnostics.iter().next(), Some(Diagnostic::Parse { sheet, .. }) if sheet == "broken"));
    }

    #[test]
    fn resize_updates_viewport_units_inside_fixed_parents() {
        let mut screen = Screen::new(80, 24);
        screen.add_stylesheet("app", "#box { width: 30; height: 5; } #inner { width: 50vw; height: 1; }");
        let root = screen.mount_root(Container::new()).unwrap();
        let frame = screen.mount(root, Container::new().with_id("box")).unwrap();
        let inner = screen.mount(frame, Static::new("x").with_id("inner")).unwrap();
        screen.frame();
        assert_eq!(screen.layout_of(inner).unwrap().region.width, 40);

        screen.resize(40, 10);
        screen.frame();
        assert_eq!(screen.layout_of(frame).unwrap().region.width, 30);
        assert_eq!(screen.layout_of(inner).unwrap().region.width, 20);
    }

    #[test]
    fn resize_relayouts_and_redraws_in_full() {
        let mut screen = screen_with("");
        let root = screen.mount_root(Container::new()).unwrap();
        screen.frame();
        screen.resize(8, 2);
        let mut sink = MemorySink::new();
        apply_patches(&mut sink, &screen.frame()).unwrap();
        assert_eq!(sink.runs().len(), 2);
        assert_eq!(screen.layout_of(root).unwrap().region, Region::new(0, 0, 8, 2));
    }
}
