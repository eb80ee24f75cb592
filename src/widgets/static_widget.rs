//! Static widget: displays text held in a reactive `text` attribute.
//!
//! Lines are split on `'\n'`. Writing the attribute relayouts and repaints
//! the node on the next frame.

use std::any::Any;

use unicode_width::UnicodeWidthStr;

use crate::css::styles::Styles;
use crate::dom::node::NodeId;
use crate::geometry::Size;
use crate::reactive::{AttrOptions, ReactiveError, ReactiveStore};
use crate::render::cell::CellStyle;
use crate::render::strip::Strip;
use crate::widget::traits::{Widget, WidgetContext};

// ---------------------------------------------------------------------------
// Static
// ---------------------------------------------------------------------------

/// A non-interactive block of text.
///
/// # Examples
///
/// ```ignore
/// let label = Static::new("Hello, world!");
/// ```
pub struct Static {
    initial: String,
}

impl Static {
    /// Name of the reactive attribute holding the text.
    pub const TEXT: &'static str = "text";

    pub fn new(content: impl Into<String>) -> Self {
        Self { initial: content.into() }
    }

    /// The text the node was created with.
    pub fn initial(&self) -> &str {
        &self.initial
    }

    fn text<'a>(&'a self, ctx: &WidgetContext<'a>) -> &'a str {
        ctx.attr::<String>(Self::TEXT).map(String::as_str).unwrap_or(&self.initial)
    }
}

impl Widget for Static {
    fn widget_type(&self) -> &str {
        "Static"
    }

    fn define_attributes(&self, node: NodeId, attrs: &mut ReactiveStore) -> Result<(), ReactiveError> {
        attrs.define(node, Self::TEXT, self.initial.clone(), AttrOptions::new().layout())
    }

    fn render(&self, ctx: &WidgetContext<'_>, size: Size, styles: &Styles) -> Vec<Strip> {
        if size.width <= 0 || size.height <= 0 {
            return Vec::new();
        }
        let style = CellStyle::from_styles(styles);
        let align = styles.text_align.unwrap_or_default();
        self.text(ctx)
            .split('\n')
            .take(size.height as usize)
            .map(|line| Strip::from_text(line, style).align(size.width as usize, align, style))
            .collect()
    }

    fn measure(&self, ctx: &WidgetContext<'_>, _styles: &Styles, _available: Size) -> Option<Size> {
        let text = self.text(ctx);
        let width = text.split('\n').map(UnicodeWidthStr::width).max().unwrap_or(0);
        let height = text.split('\n').count();
        Some(Size::new(width as i32, height as i32))
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
    use crate::css::color::Color;
    use crate::css::styles::TextAlign;
    use crate::dom::node::NodeData;
    use crate::dom::tree::Dom;

    struct Fixture {
        dom: Dom,
        attrs: ReactiveStore,
        node: NodeId,
        widget: Static,
    }

    fn fixture(text: &str) -> Fixture {
        let mut dom = Dom::new();
        let node = dom.create(NodeData::new("Static"));
        let widget = Static::new(text);
        let mut attrs = ReactiveStore::new();
        widget.define_attributes(node, &mut attrs).unwrap();
        Fixture { dom, attrs, node, widget }
    }

    impl Fixture {
        fn render(&self, w: i32, h: i32, styles: &Styles) -> Vec<String> {
            let ctx = WidgetContext::new(self.node, &self.attrs);
            self.widget.render(&ctx, Size::new(w, h), styles).iter().map(Strip::text).collect()
        }

        fn measure(&self) -> Option<Size> {
            let ctx = WidgetContext::new(self.node, &self.attrs);
            self.widget.measure(&ctx, &Styles::default(), Size::new(80, 24))
        }
    }

    #[test]
    fn widget_type_is_static() {
        assert_eq!(Static::new("hi").widget_type(), "Static");
        assert_eq!(Static::new("hi").default_css(), "");
    }

    #[test]
    fn renders_lines_padded_to_width() {
        let f = fixture("Hello\nyou");
        assert_eq!(f.render(7, 5, &Styles::default()), vec!["Hello  ", "you    "]);
    }

    #[test]
    fn truncates_to_size() {
        let f = fixture("Hello, world!\nB\nC");
        assert_eq!(f.render(5, 2, &Styles::default()), vec!["Hello", "B    "]);
        assert!(f.render(0, 2, &Styles::default()).is_empty());
    }

    #[test]
    fn applies_alignment_and_colour() {
        let f = fixture("ab");
        let styles = Styles {
            text_align: Some(TextAlign::Right),
            color: Some(Color::rgb(255, 0, 0)),
            ..Styles::default()
        };
        let ctx = WidgetContext::new(f.node, &f.attrs);
        let strips = f.widget.render(&ctx, Size::new(4, 1), &styles);
        assert_eq!(strips[0].text(), "  ab");
        assert_eq!(strips[0].cells()[3].style.fg, Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn measures_widest_line_and_line_count() {
        let f = fixture("a\n中文字\nbc");
        assert_eq!(f.measure(), Some(Size::new(6, 3)));
    }

    #[test]
    fn follows_the_text_attribute() {
        let mut f = fixture("before");
        f.attrs.set(&mut f.dom, f.node, Static::TEXT, String::from("after!!")).unwrap();
        assert_eq!(f.render(7, 1, &Styles::default()), vec!["after!!"]);
        assert_eq!(f.measure(), Some(Size::new(7, 1)));
    }
}
