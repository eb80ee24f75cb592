//! RGBA colours: parsing, blending, alpha compositing.

use std::fmt;

/// An 8-bit-per-channel colour with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, a colour name or
    /// `transparent`. Case-insensitive, surrounding whitespace ignored.
    pub fn parse(input: &str) -> Option<Color> {
        let s = input.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Color::from_hex(hex);
        }
        named(&s.to_ascii_lowercase())
    }

    /// Parse hex digits without the leading `#`.
    pub fn from_hex(hex: &str) -> Option<Color> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
        let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => Some(Color::rgb(digit(0)?, digit(1)?, digit(2)?)),
            4 => Some(Color::rgba(digit(0)?, digit(1)?, digit(2)?, digit(3)?)),
            6 => Some(Color::rgb(pair(0)?, pair(2)?, pair(4)?)),
            8 => Some(Color::rgba(pair(0)?, pair(2)?, pair(4)?, pair(6)?)),
            _ => None,
        }
    }

    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// The same colour with a different alpha.
    pub fn with_alpha(self, a: u8) -> Color {
        Color { a, ..self }
    }

    /// Linear interpolation towards `other`. `factor` is clamped to 0..=1;
    /// the result takes the alpha of `self`.
    pub fn blend(self, other: Color, factor: f32) -> Color {
        let t = factor.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: self.a,
        }
    }

    /// Composite this colour over an opaque `base` using its alpha.
    pub fn over(self, base: Color) -> Color {
        if self.is_opaque() {
            return self;
        }
        base.blend(self, self.a as f32 / 255.0).with_alpha(base.a)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

fn named(name: &str) -> Option<Color> {
    Some(match name {
        "transparent" => Color::TRANSPARENT,
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::rgb(205, 0, 0),
        "green" => Color::rgb(0, 205, 0),
        "yellow" => Color::rgb(205, 205, 0),
        "blue" => Color::rgb(0, 0, 238),
        "magenta" => Color::rgb(205, 0, 205),
        "cyan" => Color::rgb(0, 205, 205),
        "grey" | "gray" => Color::rgb(128, 128, 128),
        "darkgrey" | "darkgray" | "dark_grey" | "dark_gray" => Color::rgb(64, 64, 64),
        "darkred" | "dark_red" => Color::rgb(128, 0, 0),
        "darkgreen" | "dark_green" => Color::rgb(0, 100, 0),
        "darkblue" | "dark_blue" => Color::rgb(0, 0, 139),
        "orange" => Color::rgb(255, 165, 0),
        "purple" => Color::rgb(128, 0, 128),
        "pink" => Color::rgb(255, 192, 203),
        _ => return None,
    })
}
