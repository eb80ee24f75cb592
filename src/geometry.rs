//! Core geometry types: Axis, Size, Region, Spacing.
//!
//! All coordinates are terminal cells. Regions may extend past the screen;
//! clipping happens in the compositor, never here.

use std::ops::Add;

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// One of the two layout axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Left to right (widths, columns).
    Horizontal,
    /// Top to bottom (heights, rows).
    Vertical,
}

impl Axis {
    /// The perpendicular axis.
    #[inline]
    pub const fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A 2D size in terminal cells (width x height).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// A zero-sized size.
    pub const ZERO: Size = Size { width: 0, height: 0 };

    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// The extent along `axis`.
    #[inline]
    pub const fn along(self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Build a size from a main-axis and a cross-axis length.
    #[inline]
    pub const fn from_axes(axis: Axis, main: i32, cross: i32) -> Size {
        match axis {
            Axis::Horizontal => Size { width: main, height: cross },
            Axis::Vertical => Size { width: cross, height: main },
        }
    }

    /// Total area in cells.
    #[inline]
    pub const fn area(self) -> i32 {
        self.width * self.height
    }

    /// True when either dimension is zero or negative.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Clamp both dimensions to be non-negative.
    #[inline]
    pub fn clamp_non_negative(self) -> Size {
        Size { width: self.width.max(0), height: self.height.max(0) }
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// A rectangle positioned on the terminal grid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    /// An empty region at the origin.
    pub const EMPTY: Region = Region { x: 0, y: 0, width: 0, height: 0 };

    /// Create a new region.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// A region of `size` anchored at the origin.
    #[inline]
    pub const fn from_size(size: Size) -> Self {
        Self { x: 0, y: 0, width: size.width, height: size.height }
    }

    /// The right edge (exclusive).
    #[inline]
    pub const fn right(self) -> i32 {
        self.x + self.width
    }

    /// The bottom edge (exclusive).
    #[inline]
    pub const fn bottom(self) -> i32 {
        self.y + self.height
    }

    #[inline]
    pub const fn size(self) -> Size {
        Size { width: self.width, height: self.height }
    }

    /// Start coordinate along `axis`.
    #[inline]
    pub const fn start(self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    /// Extent along `axis`.
    #[inline]
    pub const fn len(self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Build a region from main/cross starts and lengths.
    #[inline]
    pub const fn from_axes(axis: Axis, main_start: i32, cross_start: i32, main: i32, cross: i32) -> Region {
        match axis {
            Axis::Horizontal => Region { x: main_start, y: cross_start, width: main, height: cross },
            Axis::Vertical => Region { x: cross_start, y: main_start, width: cross, height: main },
        }
    }

    /// True when the region covers no cells.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether the point (x, y) lies inside this region.
    #[inline]
    pub const fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether `other` overlaps this region (non-zero intersection area).
    #[inline]
    pub const fn overlaps(self, other: Region) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// The overlapping part of two regions, or [`Region::EMPTY`].
    #[inline]
    pub fn intersection(self, other: Region) -> Region {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        if x2 <= x1 || y2 <= y1 {
            Region::EMPTY
        } else {
            Region { x: x1, y: y1, width: x2 - x1, height: y2 - y1 }
        }
    }

    /// The smallest region containing both.
    #[inline]
    pub fn union(self, other: Region) -> Region {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Region { x: x1, y: y1, width: x2 - x1, height: y2 - y1 }
    }

    /// Move the region by `(dx, dy)`.
    #[inline]
    pub const fn translate(self, dx: i32, dy: i32) -> Region {
        Region { x: self.x + dx, y: self.y + dy, width: self.width, height: self.height }
    }

    /// Expand outward by `spacing`.
    #[inline]
    pub const fn grow(self, spacing: Spacing) -> Region {
        Region {
            x: self.x - spacing.left,
            y: self.y - spacing.top,
            width: self.width + spacing.width(),
            height: self.height + spacing.height(),
        }
    }

    /// Contract inward by `spacing`; dimensions never go below zero.
    #[inline]
    pub fn shrink(self, spacing: Spacing) -> Region {
        Region {
            x: self.x + spacing.left,
            y: self.y + spacing.top,
            width: (self.width - spacing.width()).max(0),
            height: (self.height - spacing.height()).max(0),
        }
    }
}

// ---------------------------------------------------------------------------
// Spacing
// ---------------------------------------------------------------------------

/// Insets on the four sides of a rectangle (margin, border, padding).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Spacing {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Spacing {
    pub const ZERO: Spacing = Spacing { top: 0, right: 0, bottom: 0, left: 0 };

    #[inline]
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self { top, right, bottom, left }
    }

    /// The same value on all four sides.
    #[inline]
    pub const fn all(value: i32) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }

    /// `vertical` for top/bottom, `horizontal` for left/right.
    #[inline]
    pub const fn symmetric(vertical: i32, horizontal: i32) -> Self {
        Self { top: vertical, right: horizontal, bottom: vertical, left: horizontal }
    }

    /// `left + right`.
    #[inline]
    pub const fn width(self) -> i32 {
        self.left + self.right
    }

    /// `top + bottom`.
    #[inline]
    pub const fn height(self) -> i32 {
        self.top + self.bottom
    }

    /// Total inset along `axis`.
    #[inline]
    pub const fn along(self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.width(),
            Axis::Vertical => self.height(),
        }
    }

    /// Leading inset along `axis` (left or top).
    #[inline]
    pub const fn leading(self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.left,
            Axis::Vertical => self.top,
        }
    }
}

impl Add for Spacing {
    type Output = Spacing;
    #[inline]
    fn add(self, rhs: Spacing) -> Spacing {
        Spacing {
            top: self.top + rhs.top,
            right: self.right + rhs.right,
            bottom: self.bottom + rhs.bottom,
            left: self.left + rhs.left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Axis / Size ──────────────────────────────────────────────────

    #[test]
    fn axis_cross_is_involution() {
        assert_eq!(Axis::Horizontal.cross(), Axis::Vertical);
        assert_eq!(Axis::Vertical.cross().cross(), Axis::Vertical);
    }

    #[test]
    fn size_along_and_from_axes() {
        let s = Size::new(7, 3);
        assert_eq!(s.along(Axis::Horizontal), 7);
        assert_eq!(s.along(Axis::Vertical), 3);
        assert_eq!(Size::from_axes(Axis::Vertical, 3, 7), s);
        assert_eq!(Size::from_axes(Axis::Horizontal, 7, 3), s);
    }

    #[test]
    fn size_empty_and_clamp() {
        assert!(Size::new(0, 4).is_empty());
        assert!(!Size::new(1, 1).is_empty());
        assert_eq!(Size::new(-2, 5).clamp_non_negative(), Size::new(0, 5));
    }

    // ── Region ───────────────────────────────────────────────────────

    #[test]
    fn region_edges() {
        let r = Region::new(2, 3, 10, 4);
        assert_eq!(r.right(), 12);
        assert_eq!(r.bottom(), 7);
        assert_eq!(r.start(Axis::Vertical), 3);
        assert_eq!(r.len(Axis::Horizontal), 10);
    }

    #[test]
    fn region_contains_is_half_open() {
        let r = Region::new(0, 0, 4, 2);
        assert!(r.contains(0, 0));
        assert!(r.contains(3, 1));
        assert!(!r.contains(4, 1));
        assert!(!r.contains(3, 2));
    }

    #[test]
    fn region_intersection_and_overlap() {
        let a = Region::new(0, 0, 10, 10);
        let b = Region::new(5, 5, 10, 10);
        assert!(a.overlaps(b));
        assert_eq!(a.intersection(b), Region::new(5, 5, 5, 5));

        let c = Region::new(10, 0, 3, 3);
        assert!(!a.overlaps(c));
        assert_eq!(a.intersection(c), Region::EMPTY);
    }

    #[test]
    fn region_union_ignores_empty() {
        let a = Region::new(1, 1, 2, 2);
        assert_eq!(a.union(Region::EMPTY), a);
        assert_eq!(a.union(Region::new(5, 0, 1, 1)), Region::new(1, 0, 5, 3));
    }

    #[test]
    fn region_grow_then_shrink_is_identity() {
        let r = Region::new(4, 4, 6, 6);
        let s = Spacing::new(1, 2, 3, 4);
        assert_eq!(r.grow(s).shrink(s), r);
    }

    #[test]
    fn region_shrink_never_negative() {
        let r = Region::new(0, 0, 2, 2).shrink(Spacing::all(3));
        assert_eq!(r.width, 0);
        assert_eq!(r.height, 0);
    }

    #[test]
    fn region_from_axes_vertical_swaps() {
        let r = Region::from_axes(Axis::Vertical, 5, 1, 3, 8);
        assert_eq!(r, Region::new(1, 5, 8, 3));
    }

    // ── Spacing ──────────────────────────────────────────────────────

    #[test]
    fn spacing_sums() {
        let s = Spacing::new(1, 2, 3, 4);
        assert_eq!(s.width(), 6);
        assert_eq!(s.height(), 4);
        assert_eq!(s.along(Axis::Horizontal), 6);
        assert_eq!(s.leading(Axis::Vertical), 1);
        assert_eq!(s + Spacing::all(1), Spacing::new(2, 3, 4, 5));
    }
}
