//! Container widget: holds child widgets and draws nothing of its own.
//!
//! The compositor fills the background and border; a container only hands
//! its children to the screen at mount.

use std::any::Any;

use crate::css::styles::Styles;
use crate::geometry::Size;
use crate::render::strip::Strip;
use crate::widget::traits::{Widget, WidgetContext, WidgetExt};
use crate::widget::WidgetBuilder;

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

/// A layout container.
///
/// # Examples
///
/// ```ignore
/// use tapestry_tui::widgets::{Container, Static};
///
/// let container = Container::new()
///     .with_child(Static::new("Hello"))
///     .with_child(Static::new("World"));
/// ```
pub struct Container {
    children: Vec<Box<dyn Widget>>,
}

impl Container {
    pub fn new() -> Self {
        Self { children: Vec::new() }
    }

    /// A container carrying the `horizontal` class.
    pub fn horizontal() -> WidgetBuilder<Self> {
        Self::new().with_class("horizontal")
    }

    /// A container carrying the `grid` class.
    pub fn grid() -> WidgetBuilder<Self> {
        Self::new().with_class("grid")
    }

    /// Add a child widget (builder pattern).
    pub fn with_child(mut self, child: impl Widget + 'static) -> Self {
        self.children.push(Box::new(child));
        self
    }

    /// Add several boxed children (builder pattern).
    pub fn with_children(mut self, children: impl IntoIterator<Item = Box<dyn Widget>>) -> Self {
        self.children.extend(children);
        self
    }

    /// Children not yet handed over by [`compose`](Widget::compose).
    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Container {
    fn widget_type(&self) -> &str {
        "Container"
    }

    fn default_css(&self) -> &str {
        "Container { width: 1fr; height: 1fr; }\n\
         Container.horizontal { layout: horizontal; }\n\
         Container.grid { layout: grid; }"
    }

    fn render(&self, _ctx: &WidgetContext<'_>, _size: Size, _styles: &Styles) -> Vec<Strip> {
        Vec::new()
    }

    fn compose(&mut self) -> Vec<Box<dyn Widget>> {
        std::mem::take(&mut self.children)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse_css;
    use crate::dom::node::NodeData;
    use crate::dom::tree::Dom;
    use crate::reactive::ReactiveStore;
    use crate::widgets::static_widget::Static;

    #[test]
    fn widget_type_is_container() {
        assert_eq!(Container::new().widget_type(), "Container");
        assert!(!Container::new().can_focus());
    }

    #[test]
    fn default_css_parses() {
        let sheet = parse_css(Container::new().default_css()).unwrap();
        assert_eq!(sheet.rules.len(), 3);
    }

    #[test]
    fn compose_takes_children() {
        let mut c = Container::new().with_child(Static::new("a")).with_child(Static::new("b"));
        assert_eq!(c.child_count(), 2);
        let kids = c.compose();
        assert_eq!(kids.len(), 2);
        assert_eq!(kids[0].widget_type(), "Static");
        assert_eq!(c.child_count(), 0);
    }

    #[test]
    fn horizontal_and_grid_carry_classes() {
        assert_eq!(Container::horizontal().css_classes(), ["horizontal".to_owned()]);
        assert_eq!(Container::grid().css_classes(), ["grid".to_owned()]);
    }

    #[test]
    fn renders_no_content() {
        let mut dom = Dom::new();
        let node = dom.create(NodeData::new("Container"));
        let attrs = ReactiveStore::new();
        let ctx = WidgetContext::new(node, &attrs);
        assert!(Container::new().render(&ctx, Size::new(5, 3), &Styles::default()).is_empty());
    }
}
