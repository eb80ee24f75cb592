//! Resolved style record: one typed `Option<T>` field per property.
//!
//! `None` means no declaration won for that property; the accessor methods
//! supply the engine defaults.

use bitflags::bitflags;

use crate::css::color::Color;
use crate::css::scalar::Scalar;
use crate::geometry::Spacing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Block,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// Content overflow. Everything is clipped; the value is carried for widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Hidden,
    Scroll,
    Auto,
}

/// How a container arranges its flow children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutKind {
    #[default]
    Vertical,
    Horizontal,
    Grid,
}

/// Edge a child is pinned to, outside normal flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dock {
    Top,
    Right,
    Bottom,
    Left,
}

/// What `width`/`height` measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxSizing {
    /// Size the content; padding and border are added outside it.
    #[default]
    ContentBox,
    /// Size the border box; padding and border are taken from inside it.
    BorderBox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderKind {
    #[default]
    None,
    Solid,
    Heavy,
    Double,
    Round,
    Ascii,
}

/// A one-cell border with kind and optional colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    pub kind: BorderKind,
    pub color: Option<Color>,
}

impl Border {
    /// Insets the border takes from the box.
    pub fn spacing(&self) -> Spacing {
        match self.kind {
            BorderKind::None => Spacing::ZERO,
            _ => Spacing::all(1),
        }
    }
}

bitflags! {
    /// Terminal text attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextAttributes: u8 {
        const BOLD      = 1 << 0;
        const DIM       = 1 << 1;
        const ITALIC    = 1 << 2;
        const UNDERLINE = 1 << 3;
        const STRIKE    = 1 << 4;
        const REVERSE   = 1 << 5;
    }
}

/// `grid-size: columns [rows]`. Missing rows grow with the child count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub columns: u16,
    pub rows: Option<u16>,
}

/// `grid-gutter: vertical [horizontal]` in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridGutter {
    /// Gap between rows.
    pub vertical: i32,
    /// Gap between columns.
    pub horizontal: i32,
}

/// All style properties for a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Styles {
    // Display & arrangement
    pub display: Option<Display>,
    pub visibility: Option<Visibility>,
    pub layout: Option<LayoutKind>,
    pub dock: Option<Dock>,
    pub box_sizing: Option<BoxSizing>,
    pub overflow_x: Option<Overflow>,
    pub overflow_y: Option<Overflow>,

    // Sizing
    pub width: Option<Scalar>,
    pub height: Option<Scalar>,
    pub min_width: Option<Scalar>,
    pub min_height: Option<Scalar>,
    pub max_width: Option<Scalar>,
    pub max_height: Option<Scalar>,

    // Spacing
    pub margin: Option<Spacing>,
    pub padding: Option<Spacing>,
    pub border: Option<Border>,

    // Grid
    pub grid_size: Option<GridSize>,
    pub grid_columns: Option<Vec<Scalar>>,
    pub grid_rows: Option<Vec<Scalar>>,
    pub grid_gutter: Option<GridGutter>,
    pub column_span: Option<u16>,
    pub row_span: Option<u16>,

    // Layers
    pub layer: Option<String>,
    pub layers: Option<Vec<String>>,

    // Paint
    pub color: Option<Color>,
    pub background: Option<Color>,
    pub opacity: Option<f32>,
    pub tint: Option<Color>,
    pub text_align: Option<TextAlign>,
    pub text_style: Option<TextAttributes>,
}

impl Styles {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if no property is set.
    pub fn is_empty(&self) -> bool {
        *self == Styles::default()
    }

    pub fn is_displayed(&self) -> bool {
        self.display.unwrap_or_default() != Display::None
    }

    pub fn is_visible(&self) -> bool {
        self.visibility.unwrap_or_default() == Visibility::Visible
    }

    /// Arrangement for flow children. A `grid-size` implies a grid.
    pub fn layout_kind(&self) -> LayoutKind {
        if self.grid_size.is_some() {
            LayoutKind::Grid
        } else {
            self.layout.unwrap_or_default()
        }
    }

    pub fn margin(&self) -> Spacing {
        self.margin.unwrap_or_default()
    }

    pub fn padding(&self) -> Spacing {
        self.padding.unwrap_or_default()
    }

    /// Border insets (one cell per side when a border is drawn).
    pub fn border_spacing(&self) -> Spacing {
        self.border.map(|b| b.spacing()).unwrap_or_default()
    }

    /// Border plus padding.
    pub fn inner_spacing(&self) -> Spacing {
        self.border_spacing() + self.padding()
    }

    pub fn box_sizing(&self) -> BoxSizing {
        self.box_sizing.unwrap_or_default()
    }

    /// Opacity clamped to 0..=1; 1 when unset.
    pub fn opacity(&self) -> f32 {
        self.opacity.unwrap_or(1.0).clamp(0.0, 1.0)
    }
}
