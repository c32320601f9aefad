//! Stroke, fill and font attributes carried by drawing items.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// RGBA colour, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Color {
    type Err = String;

    /// Parses `#rrggbb` or `#rrggbbaa`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("colour '{s}' must start with '#'"))?;
        let channel = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|c| u8::from_str_radix(c, 16).ok())
                .ok_or_else(|| format!("invalid colour '{s}'"))
        };
        match hex.len() {
            6 => Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Color::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => Err(format!("invalid colour '{s}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PenStyle {
    #[default]
    Solid,
    Dash,
    Dot,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PenCap {
    Flat,
    Square,
    #[default]
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PenJoin {
    Miter,
    Bevel,
    #[default]
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pen {
    pub color: Color,
    pub width: f64,
    #[serde(default)]
    pub style: PenStyle,
    #[serde(default)]
    pub cap: PenCap,
    #[serde(default)]
    pub join: PenJoin,
}

impl Pen {
    pub fn new(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            style: PenStyle::Solid,
            cap: PenCap::Round,
            join: PenJoin::Round,
        }
    }
}

impl Default for Pen {
    fn default() -> Self {
        Self::new(Color::BLACK, 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BrushStyle {
    #[default]
    NoBrush,
    Solid,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Brush {
    pub color: Color,
    pub style: BrushStyle,
}

impl Brush {
    pub fn solid(color: Color) -> Self {
        Self {
            color,
            style: BrushStyle::Solid,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.style == BrushStyle::Solid
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub point_size: f64,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "Sans".to_string(),
            point_size: 12.0,
            bold: false,
            italic: false,
        }
    }
}
