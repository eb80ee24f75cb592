//! Property validation: declaration values → typed [`Styles`] fields.
//!
//! Each property checks its own value shape. A failure leaves `styles`
//! untouched so the cascade can drop the declaration and keep going.

use crate::css::color::Color;
use crate::css::model::DeclarationValue;
use crate::css::scalar::{Scalar, Unit};
use crate::css::styles::*;
use crate::geometry::Spacing;

/// Errors from property validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    #[error("unknown property: {0}")]
    UnknownProperty(String),
    #[error("invalid value for {property}: {message}")]
    InvalidValue { property: String, message: String },
}

fn invalid(property: &str, message: impl Into<String>) -> PropertyError {
    PropertyError::InvalidValue { property: property.into(), message: message.into() }
}

fn render_values(values: &[DeclarationValue]) -> String {
    values.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Value shapes
// ---------------------------------------------------------------------------

/// Parse one value into a [`Scalar`]: number, dimension or `auto`.
pub fn parse_scalar(value: &DeclarationValue, property: &str) -> Result<Scalar, PropertyError> {
    match value {
        DeclarationValue::Number(n) => Ok(Scalar::cells(*n)),
        DeclarationValue::Dimension(n, unit) => Unit::from_suffix(unit)
            .map(|unit| Scalar::new(*n, unit))
            .ok_or_else(|| invalid(property, format!("unknown unit '{unit}'"))),
        DeclarationValue::Ident(name) if name.eq_ignore_ascii_case("auto") => Ok(Scalar::auto()),
        other => Err(invalid(property, format!("expected a size, got '{other}'"))),
    }
}

fn single_scalar(values: &[DeclarationValue], property: &str) -> Result<Scalar, PropertyError> {
    match values {
        [value] => parse_scalar(value, property),
        _ => Err(invalid(property, format!("expected 1 value, got {}", values.len()))),
    }
}

/// A non-negative whole number of cells.
fn parse_cells(value: &DeclarationValue, property: &str) -> Result<i32, PropertyError> {
    match value {
        DeclarationValue::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Ok(*n as i32),
        other => Err(invalid(property, format!("expected a whole number of cells, got '{other}'"))),
    }
}

/// 1-4 cell values in CSS shorthand order.
///
/// - 1 value: all sides
/// - 2 values: vertical, horizontal
/// - 3 values: top, horizontal, bottom
/// - 4 values: top, right, bottom, left
pub fn parse_spacing(values: &[DeclarationValue], property: &str) -> Result<Spacing, PropertyError> {
    let cells = values
        .iter()
        .map(|v| parse_cells(v, property))
        .collect::<Result<Vec<_>, _>>()?;
    match cells.as_slice() {
        [all] => Ok(Spacing::all(*all)),
        [v, h] => Ok(Spacing::symmetric(*v, *h)),
        [t, h, b] => Ok(Spacing::new(*t, *h, *b, *h)),
        [t, r, b, l] => Ok(Spacing::new(*t, *r, *b, *l)),
        _ => Err(invalid(property, format!("expected 1-4 values, got {}", values.len()))),
    }
}

/// Parse a colour value: hex literal or colour name.
pub fn parse_color(value: &DeclarationValue, property: &str) -> Result<Color, PropertyError> {
    let parsed = match value {
        DeclarationValue::Color(hex) => Color::from_hex(hex),
        DeclarationValue::Ident(name) => Color::parse(name),
        _ => None,
    };
    parsed.ok_or_else(|| invalid(property, format!("expected a colour, got '{value}'")))
}

fn single_color(values: &[DeclarationValue], property: &str) -> Result<Color, PropertyError> {
    match values {
        [value] => parse_color(value, property),
        _ => Err(invalid(property, format!("expected 1 colour, got {}", values.len()))),
    }
}

/// Match a single identifier against a keyword table.
fn keyword<T: Copy>(values: &[DeclarationValue], property: &str, table: &[(&str, T)]) -> Result<T, PropertyError> {
    let expected = || table.iter().map(|(k, _)| *k).collect::<Vec<_>>().join("|");
    match values {
        [DeclarationValue::Ident(name)] => table
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| *v)
            .ok_or_else(|| invalid(property, format!("expected {}, got '{name}'", expected()))),
        _ => Err(invalid(property, format!("expected {}, got '{}'", expected(), render_values(values)))),
    }
}

fn positive_integer(values: &[DeclarationValue], property: &str) -> Result<u16, PropertyError> {
    match values {
        [DeclarationValue::Number(n)] if *n >= 1.0 && n.fract() == 0.0 && *n <= u16::MAX as f32 => Ok(*n as u16),
        _ => Err(invalid(property, format!("expected a positive integer, got '{}'", render_values(values)))),
    }
}

fn parse_border(values: &[DeclarationValue]) -> Result<Border, PropertyError> {
    let kinds = [
        ("none", BorderKind::None),
        ("hidden", BorderKind::None),
        ("solid", BorderKind::Solid),
        ("thin", BorderKind::Solid),
        ("heavy", BorderKind::Heavy),
        ("double", BorderKind::Double),
        ("round", BorderKind::Round),
        ("ascii", BorderKind::Ascii),
    ];
    match values {
        [kind] => Ok(Border { kind: keyword(std::slice::from_ref(kind), "border", &kinds)?, color: None }),
        [kind, color] => Ok(Border {
            kind: keyword(std::slice::from_ref(kind), "border", &kinds)?,
            color: Some(parse_color(color, "border")?),
        }),
        _ => Err(invalid("border", format!("expected '<kind> [colour]', got '{}'", render_values(values)))),
    }
}

fn parse_text_style(values: &[DeclarationValue]) -> Result<TextAttributes, PropertyError> {
    let mut attrs = TextAttributes::empty();
    for value in values {
        let DeclarationValue::Ident(name) = value else {
            return Err(invalid("text-style", format!("expected a style name, got '{value}'")));
        };
        attrs |= match name.as_str() {
            "bold" => TextAttributes::BOLD,
            "dim" => TextAttributes::DIM,
            "italic" => TextAttributes::ITALIC,
            "underline" => TextAttributes::UNDERLINE,
            "strike" | "strikethrough" => TextAttributes::STRIKE,
            "reverse" => TextAttributes::REVERSE,
            "none" => TextAttributes::empty(),
            other => return Err(invalid("text-style", format!("unknown text style '{other}'"))),
        };
    }
    if values.is_empty() {
        return Err(invalid("text-style", "expected at least 1 value"));
    }
    Ok(attrs)
}

fn parse_grid_size(values: &[DeclarationValue]) -> Result<GridSize, PropertyError> {
    match values {
        [columns] => Ok(GridSize {
            columns: positive_integer(std::slice::from_ref(columns), "grid-size")?,
            rows: None,
        }),
        [columns, rows] => Ok(GridSize {
            columns: positive_integer(std::slice::from_ref(columns), "grid-size")?,
            rows: Some(positive_integer(std::slice::from_ref(rows), "grid-size")?),
        }),
        _ => Err(invalid("grid-size", format!("expected '<columns> [rows]', got {} values", values.len()))),
    }
}

fn parse_tracks(values: &[DeclarationValue], property: &str) -> Result<Vec<Scalar>, PropertyError> {
    if values.is_empty() {
        return Err(invalid(property, "expected at least 1 track size"));
    }
    values.iter().map(|v| parse_scalar(v, property)).collect()
}

fn parse_gutter(values: &[DeclarationValue]) -> Result<GridGutter, PropertyError> {
    match values {
        [both] => {
            let n = parse_cells(both, "grid-gutter")?;
            Ok(GridGutter { vertical: n, horizontal: n })
        }
        [vertical, horizontal] => Ok(GridGutter {
            vertical: parse_cells(vertical, "grid-gutter")?,
            horizontal: parse_cells(horizontal, "grid-gutter")?,
        }),
        _ => Err(invalid("grid-gutter", format!("expected 1-2 values, got {}", values.len()))),
    }
}

/// `opacity: 0.5` or `opacity: 50%`.
fn parse_opacity(values: &[DeclarationValue]) -> Result<f32, PropertyError> {
    let raw = match values {
        [DeclarationValue::Number(n)] => *n,
        [DeclarationValue::Dimension(n, unit)] if unit == "%" => *n / 100.0,
        _ => return Err(invalid("opacity", format!("expected a number or percentage, got '{}'", render_values(values)))),
    };
    Ok(raw.clamp(0.0, 1.0))
}

fn parse_names(values: &[DeclarationValue], property: &str) -> Result<Vec<String>, PropertyError> {
    if values.is_empty() {
        return Err(invalid(property, "expected at least 1 name"));
    }
    values
        .iter()
        .map(|v| match v {
            DeclarationValue::Ident(name) => Ok(name.clone()),
            other => Err(invalid(property, format!("expected a name, got '{other}'"))),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Validate one declaration and store it on `styles`.
///
/// Returns an error for unknown properties or values of the wrong shape; on
/// error `styles` is not modified.
pub fn apply_declaration(styles: &mut Styles, property: &str, values: &[DeclarationValue]) -> Result<(), PropertyError> {
    match property {
        // Display & arrangement
        "display" => {
            styles.display = Some(keyword(values, property, &[("block", Display::Block), ("none", Display::None)])?);
        }
        "visibility" => {
            styles.visibility = Some(keyword(
                values,
                property,
                &[("visible", Visibility::Visible), ("hidden", Visibility::Hidden)],
            )?);
        }
        "layout" => {
            styles.layout = Some(keyword(
                values,
                property,
                &[
                    ("vertical", LayoutKind::Vertical),
                    ("horizontal", LayoutKind::Horizontal),
                    ("grid", LayoutKind::Grid),
                ],
            )?);
        }
        "dock" => {
            styles.dock = keyword(
                values,
                property,
                &[
                    ("top", Some(Dock::Top)),
                    ("right", Some(Dock::Right)),
                    ("bottom", Some(Dock::Bottom)),
                    ("left", Some(Dock::Left)),
                    ("none", None),
                ],
            )?;
        }
        "box-sizing" => {
            styles.box_sizing = Some(keyword(
                values,
                property,
                &[("content-box", BoxSizing::ContentBox), ("border-box", BoxSizing::BorderBox)],
            )?);
        }
        "overflow" | "overflow-x" | "overflow-y" => {
            let overflow = keyword(
                values,
                property,
                &[("hidden", Overflow::Hidden), ("scroll", Overflow::Scroll), ("auto", Overflow::Auto)],
            )?;
            if property != "overflow-y" {
                styles.overflow_x = Some(overflow);
            }
            if property != "overflow-x" {
                styles.overflow_y = Some(overflow);
            }
        }

        // Sizing
        "width" => styles.width = Some(single_scalar(values, property)?),
        "height" => styles.height = Some(single_scalar(values, property)?),
        "min-width" => styles.min_width = Some(single_scalar(values, property)?),
        "min-height" => styles.min_height = Some(single_scalar(values, property)?),
        "max-width" => styles.max_width = Some(single_scalar(values, property)?),
        "max-height" => styles.max_height = Some(single_scalar(values, property)?),

        // Spacing
        "margin" => styles.margin = Some(parse_spacing(values, property)?),
        "padding" => styles.padding = Some(parse_spacing(values, property)?),
        "border" => styles.border = Some(parse_border(values)?),

        // Grid
        "grid-size" => styles.grid_size = Some(parse_grid_size(values)?),
        "grid-columns" => styles.grid_columns = Some(parse_tracks(values, property)?),
        "grid-rows" => styles.grid_rows = Some(parse_tracks(values, property)?),
        "grid-gutter" => styles.grid_gutter = Some(parse_gutter(values)?),
        "column-span" => styles.column_span = Some(positive_integer(values, property)?),
        "row-span" => styles.row_span = Some(positive_integer(values, property)?),

        // Layers
        "layer" => {
            styles.layer = Some(parse_names(values, property)?.remove(0));
        }
        "layers" => styles.layers = Some(parse_names(values, property)?),

        // Paint
        "color" => styles.color = Some(single_color(values, property)?),
        "background" => styles.background = Some(single_color(values, property)?),
        "tint" => styles.tint = Some(single_color(values, property)?),
        "opacity" => styles.opacity = Some(parse_opacity(values)?),
        "text-align" => {
            styles.text_align = Some(keyword(
                values,
                property,
                &[("left", TextAlign::Left), ("center", TextAlign::Center), ("right", TextAlign::Right)],
            )?);
        }
        "text-style" => styles.text_style = Some(parse_text_style(values)?),

        other => return Err(PropertyError::UnknownProperty(other.to_string())),
    }

    Ok(())
}
