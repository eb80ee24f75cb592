//! Sizing scalars: Scalar, Unit (cells, fr, %, w, h, vw, vh, auto).

use std::fmt;

use crate::geometry::{Axis, Size};

/// A sizing unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Plain cell count.
    Cells,
    /// Share of the space left after fixed siblings.
    Fr,
    /// Percentage of the container along the property's own axis.
    Percent,
    /// Percentage of the container width, whatever the property.
    Width,
    /// Percentage of the container height, whatever the property.
    Height,
    /// Percentage of the viewport width.
    ViewWidth,
    /// Percentage of the viewport height.
    ViewHeight,
    /// Shrink to the intrinsic content size.
    Auto,
}

impl Unit {
    /// Map a unit suffix (`fr`, `%`, `w`, `h`, `vw`, `vh`) to a unit.
    pub fn from_suffix(suffix: &str) -> Option<Unit> {
        Some(match suffix {
            "fr" => Unit::Fr,
            "%" => Unit::Percent,
            "w" => Unit::Width,
            "h" => Unit::Height,
            "vw" => Unit::ViewWidth,
            "vh" => Unit::ViewHeight,
            _ => return None,
        })
    }

    fn suffix(self) -> &'static str {
        match self {
            Unit::Cells | Unit::Auto => "",
            Unit::Fr => "fr",
            Unit::Percent => "%",
            Unit::Width => "w",
            Unit::Height => "h",
            Unit::ViewWidth => "vw",
            Unit::ViewHeight => "vh",
        }
    }
}

/// A length with a unit, e.g. `10`, `1fr`, `50%`, `auto`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scalar {
    pub value: f32,
    pub unit: Unit,
}

impl Scalar {
    pub const fn new(value: f32, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub const fn cells(value: f32) -> Self {
        Self::new(value, Unit::Cells)
    }

    pub const fn fr(value: f32) -> Self {
        Self::new(value, Unit::Fr)
    }

    pub const fn percent(value: f32) -> Self {
        Self::new(value, Unit::Percent)
    }

    pub const fn auto() -> Self {
        Self::new(0.0, Unit::Auto)
    }

    pub fn is_auto(&self) -> bool {
        self.unit == Unit::Auto
    }

    pub fn is_fraction(&self) -> bool {
        self.unit == Unit::Fr
    }

    /// Whether the value depends on the size of the containing box.
    pub fn is_container_relative(&self) -> bool {
        matches!(self.unit, Unit::Percent | Unit::Width | Unit::Height)
    }

    /// Resolve to cells for a property on `axis`.
    ///
    /// Returns `None` for `fr` and `auto`, which need sibling or content
    /// information the scalar alone does not have. Results are floored and
    /// never negative.
    pub fn resolve(&self, axis: Axis, container: Size, viewport: Size) -> Option<i32> {
        let basis = match self.unit {
            Unit::Cells => return Some((self.value.floor() as i32).max(0)),
            Unit::Fr | Unit::Auto => return None,
            Unit::Percent => container.along(axis),
            Unit::Width => container.width,
            Unit::Height => container.height,
            Unit::ViewWidth => viewport.width,
            Unit::ViewHeight => viewport.height,
        };
        let cells = (basis as f32 * self.value / 100.0).floor() as i32;
        Some(cells.max(0))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit == Unit::Auto {
            return write!(f, "auto");
        }
        if self.value.fract() == 0.0 {
            write!(f, "{}{}", self.value as i64, self.unit.suffix())
        } else {
            write!(f, "{}{}", self.value, self.unit.suffix())
        }
    }
}
