//! Per-axis length resolution: style scalars to border-box cells.
//!
//! Everything here works on one axis at a time. Lengths returned by this
//! module are border-box lengths (content + padding + border); margins are
//! added by the caller when it needs the outer size.

use crate::css::scalar::Scalar;
use crate::css::styles::{BoxSizing, Styles};
use crate::geometry::{Axis, Size};

/// Reference sizes for relative units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Basis {
    /// Content size of the immediate container (`%`, `w`, `h`).
    pub container: Size,
    /// Terminal size (`vw`, `vh`).
    pub viewport: Size,
}

impl Basis {
    pub const fn new(container: Size, viewport: Size) -> Self {
        Self { container, viewport }
    }

    pub fn resolve(&self, scalar: Scalar, axis: Axis) -> Option<i32> {
        scalar.resolve(axis, self.container, self.viewport)
    }
}

/// What a node asks for along one axis before fractions are shared out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Request {
    /// A border-box length in cells.
    Fixed(i32),
    /// A weighted share of the space left after fixed siblings.
    Fraction(f32),
    /// The intrinsic size of the content.
    Auto,
    /// Whatever the container offers.
    Fill,
}

pub fn dimension(styles: &Styles, axis: Axis) -> Option<Scalar> {
    match axis {
        Axis::Horizontal => styles.width,
        Axis::Vertical => styles.height,
    }
}

fn min_dimension(styles: &Styles, axis: Axis) -> Option<Scalar> {
    match axis {
        Axis::Horizontal => styles.min_width,
        Axis::Vertical => styles.min_height,
    }
}

fn max_dimension(styles: &Styles, axis: Axis) -> Option<Scalar> {
    match axis {
        Axis::Horizontal => styles.max_width,
        Axis::Vertical => styles.max_height,
    }
}

/// The request `styles` makes along `axis`, or `default` when unset.
pub fn request(styles: &Styles, axis: Axis, basis: Basis, default: Request) -> Request {
    let Some(scalar) = dimension(styles, axis) else {
        return default;
    };
    if scalar.is_auto() {
        return Request::Auto;
    }
    if scalar.is_fraction() {
        return Request::Fraction(scalar.value.max(0.0));
    }
    match basis.resolve(scalar, axis) {
        Some(cells) => Request::Fixed(border_box(styles, axis, cells)),
        None => default,
    }
}

/// Turn a declared length into a border-box length.
///
/// Content-box lengths get padding and border added; border-box lengths
/// already include them but never shrink below them.
pub fn border_box(styles: &Styles, axis: Axis, length: i32) -> i32 {
    let inner = styles.inner_spacing().along(axis);
    match styles.box_sizing() {
        BoxSizing::ContentBox => length + inner,
        BoxSizing::BorderBox => length.max(inner),
    }
}

/// Apply `min-*` and `max-*` to a border-box length. The minimum wins
/// when the two conflict.
pub fn clamp(styles: &Styles, axis: Axis, length: i32, basis: Basis) -> i32 {
    let limit = |scalar: Option<Scalar>| {
        scalar
            .and_then(|s| basis.resolve(s, axis))
            .map(|cells| border_box(styles, axis, cells))
    };
    let mut length = length;
    if let Some(max) = limit(max_dimension(styles, axis)) {
        length = length.min(max);
    }
    if let Some(min) = limit(min_dimension(styles, axis)) {
        length = length.max(min);
    }
    length.max(0)
}

/// Split `total` cells in proportion to `weights`.
///
/// Shares are floored, then the leftover cells go one each to the largest
/// fractional remainders (earlier entries win ties), so the result always
/// sums to `total` when any weight is positive.
pub fn distribute(total: i32, weights: &[f32]) -> Vec<i32> {
    let sum: f32 = weights.iter().map(|w| w.max(0.0)).sum();
    if total <= 0 || sum <= 0.0 {
        return vec![0; weights.len()];
    }
    let exact: Vec<f64> = weights
        .iter()
        .map(|w| f64::from(total) * f64::from(w.max(0.0)) / f64::from(sum))
        .collect();
    let mut shares: Vec<i32> = exact.iter().map(|e| e.floor() as i32).collect();
    let mut leftover = total - shares.iter().sum::<i32>();

    let mut order: Vec<usize> = (0..weights.len()).filter(|&i| weights[i] > 0.0).collect();
    order.sort_by(|&a, &b| {
        let fa = exact[a] - exact[a].floor();
        let fb = exact[b] - exact[b].floor();
        fb.total_cmp(&fa).then(a.cmp(&b))
    });
    for &index in order.iter().cycle() {
        if leftover <= 0 {
            break;
        }
        shares[index] += 1;
        leftover -= 1;
    }
    shares
}
