//! Widget trait: type tag, default CSS, attributes, content and measurement.
//!
//! A `Widget` is the per-node behaviour registered at mount. The core calls
//! it for exactly four things: its type tag and default CSS when the node is
//! mounted, its reactive attributes right after, and its content and
//! intrinsic size during layout and paint. The `WidgetExt` trait adds
//! builder-style methods for attaching a CSS id and classes.

use std::any::Any;

use crate::css::styles::Styles;
use crate::dom::node::NodeId;
use crate::geometry::Size;
use crate::reactive::{ReactiveError, ReactiveStore};
use crate::render::strip::Strip;

// ---------------------------------------------------------------------------
// WidgetContext
// ---------------------------------------------------------------------------

/// Read-only view handed to [`Widget::render`] and [`Widget::measure`].
///
/// Content must be a pure function of the node's reactive state, which is
/// reachable only through [`attrs`](Self::attrs).
#[derive(Clone, Copy)]
pub struct WidgetContext<'a> {
    pub node: NodeId,
    pub attrs: &'a ReactiveStore,
}

impl<'a> WidgetContext<'a> {
    pub fn new(node: NodeId, attrs: &'a ReactiveStore) -> Self {
        Self { node, attrs }
    }

    /// Typed read of one of this node's attributes.
    pub fn attr<T: 'static>(&self, name: &str) -> Option<&'a T> {
        self.attrs.get::<T>(self.node, name).ok()
    }
}

// ---------------------------------------------------------------------------
// Widget trait
// ---------------------------------------------------------------------------

/// Behaviour of one node kind.
///
/// Object-safe: the core stores widgets as `Box<dyn Widget>`. Methods that
/// require `Self: Sized` live on [`WidgetExt`].
pub trait Widget {
    /// The CSS type name (e.g. "Static", "Container").
    fn widget_type(&self) -> &str;

    /// Default CSS for this widget type, loaded once per type at the
    /// component-default origin.
    fn default_css(&self) -> &str {
        ""
    }

    /// Register this node's reactive attributes. Called once, right after
    /// the node is created.
    fn define_attributes(&self, _node: NodeId, _attrs: &mut ReactiveStore) -> Result<(), ReactiveError> {
        Ok(())
    }

    /// Content rows for a content area of `size`. Row `n` is drawn at
    /// content row `n`; anything outside `size` is clipped.
    fn render(&self, ctx: &WidgetContext<'_>, size: Size, styles: &Styles) -> Vec<Strip>;

    /// Intrinsic content size given the space on offer, consulted for
    /// `auto` dimensions. `None` means no content of its own.
    fn measure(&self, _ctx: &WidgetContext<'_>, _styles: &Styles, _available: Size) -> Option<Size> {
        None
    }

    /// Whether this widget can receive focus.
    fn can_focus(&self) -> bool {
        false
    }

    /// CSS id to give the node at mount.
    fn css_id(&self) -> Option<&str> {
        None
    }

    /// CSS classes to give the node at mount.
    fn css_classes(&self) -> &[String] {
        &[]
    }

    /// Hand over child widgets to mount below this one. Called once at
    /// mount; the default is a leaf.
    fn compose(&mut self) -> Vec<Box<dyn Widget>> {
        Vec::new()
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

// ---------------------------------------------------------------------------
// WidgetExt
// ---------------------------------------------------------------------------

/// Builder-style helpers available on every sized widget.
pub trait WidgetExt: Widget {
    /// Wrap this widget with a CSS id.
    fn with_id(self, id: &str) -> WidgetBuilder<Self>
    where
        Self: Sized,
    {
        WidgetBuilder::new(self).set_id(id)
    }

    /// Wrap this widget with a single CSS class.
    fn with_class(self, class: &str) -> WidgetBuilder<Self>
    where
        Self: Sized,
    {
        WidgetBuilder::new(self).add_class(class)
    }

    /// Wrap this widget with several CSS classes.
    fn with_classes(self, classes: &[&str]) -> WidgetBuilder<Self>
    where
        Self: Sized,
    {
        WidgetBuilder::new(self).add_classes(classes)
    }
}

impl<T: Widget> WidgetExt for T {}

// ---------------------------------------------------------------------------
// WidgetBuilder
// ---------------------------------------------------------------------------

/// A widget plus the id and classes its node should start with.
#[derive(Debug)]
pub struct WidgetBuilder<W: Widget> {
    pub widget: W,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl<W: Widget> WidgetBuilder<W> {
    pub fn new(widget: W) -> Self {
        Self { widget, id: None, classes: Vec::new() }
    }

    /// Set the CSS id (chainable).
    pub fn set_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_owned());
        self
    }

    /// Add a CSS class (chainable). Duplicates are ignored.
    pub fn add_class(mut self, class: &str) -> Self {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_owned());
        }
        self
    }

    pub fn add_classes(self, classes: &[&str]) -> Self {
        classes.iter().fold(self, |builder, class| builder.add_class(class))
    }
}

impl<W: Widget + 'static> Widget for WidgetBuilder<W> {
    fn widget_type(&self) -> &str {
        self.widget.widget_type()
    }

    fn default_css(&self) -> &str {
        self.widget.default_css()
    }

    fn define_attributes(&self, node: NodeId, attrs: &mut ReactiveStore) -> Result<(), ReactiveError> {
        self.widget.define_attributes(node, attrs)
    }

    fn render(&self, ctx: &WidgetContext<'_>, size: Size, styles: &Styles) -> Vec<Strip> {
        self.widget.render(ctx, size, styles)
    }

    fn measure(&self, ctx: &WidgetContext<'_>, styles: &Styles, available: Size) -> Option<Size> {
        self.widget.measure(ctx, styles, available)
    }

    fn can_focus(&self) -> bool {
        self.widget.can_focus()
    }

    fn css_id(&self) -> Option<&str> {
        self.id.as_deref().or_else(|| self.widget.css_id())
    }

    fn css_classes(&self) -> &[String] {
        if self.classes.is_empty() {
            self.widget.css_classes()
        } else {
            &self.classes
        }
    }

    fn compose(&mut self) -> Vec<Box<dyn Widget>> {
        self.widget.compose()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ===========================================================================
// Tests
// ===========================================================================
