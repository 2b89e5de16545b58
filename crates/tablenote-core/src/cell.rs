//! Cell values and visual formats.
//!
//! A [`Cell`] is the smallest addressable unit of the grid: a piece of text plus its visual
//! format (weight, text color, background color). Cells are replaced, never edited in place:
//! every mutation builds a new value through [`Cell::merged`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 24-bit RGB color, written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Dark slate, the default text color (`#0f172a`).
    pub const SLATE: Color = Color::rgb(0x0f, 0x17, 0x2a);
    /// White (`#ffffff`).
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    /// Blue used by the templated header row (`#3b82f6`).
    pub const BLUE: Color = Color::rgb(0x3b, 0x82, 0xf6);

    /// Create a color from its channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Error returned when parsing a color string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}: expected #rgb or #rrggbb")]
pub struct ParseColorError(pub String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseColorError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        match hex.len() {
            3 => {
                let mut channels = [0u8; 3];
                for (slot, ch) in channels.iter_mut().zip(hex.chars()) {
                    let v = ch.to_digit(16).ok_or_else(invalid)? as u8;
                    *slot = v * 17;
                }
                Ok(Color::rgb(channels[0], channels[1], channels[2]))
            }
            6 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
                Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Visual attributes of a cell, without its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellFormat {
    /// Bold text.
    pub bold: bool,
    /// Foreground color.
    pub text_color: Color,
    /// Background color.
    pub bg_color: Color,
}

impl Default for CellFormat {
    fn default() -> Self {
        Self {
            bold: false,
            text_color: Color::SLATE,
            bg_color: Color::WHITE,
        }
    }
}

/// A single grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    /// Cell text.
    pub text: String,
    /// Bold text.
    pub bold: bool,
    /// Foreground color.
    pub text_color: Color,
    /// Background color.
    pub bg_color: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self::with_format(String::new(), CellFormat::default())
    }
}

impl Cell {
    /// Create a default-formatted cell holding `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Create a cell from text and an explicit format.
    pub fn with_format(text: impl Into<String>, format: CellFormat) -> Self {
        Self {
            text: text.into(),
            bold: format.bold,
            text_color: format.text_color,
            bg_color: format.bg_color,
        }
    }

    /// The cell's visual attributes.
    pub fn format(&self) -> CellFormat {
        CellFormat {
            bold: self.bold,
            text_color: self.text_color,
            bg_color: self.bg_color,
        }
    }

    /// Whether the text is empty after trimming whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Build the cell that results from applying `update` on top of `self`.
    pub fn merged(&self, update: &CellUpdate) -> Cell {
        Cell {
            text: update.text.clone().unwrap_or_else(|| self.text.clone()),
            bold: update.bold.unwrap_or(self.bold),
            text_color: update.text_color.unwrap_or(self.text_color),
            bg_color: update.bg_color.unwrap_or(self.bg_color),
        }
    }
}

/// Partial cell update; `None` fields keep the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellUpdate {
    /// New text.
    pub text: Option<String>,
    /// New weight.
    pub bold: Option<bool>,
    /// New text color.
    pub text_color: Option<Color>,
    /// New background color.
    pub bg_color: Option<Color>,
}

impl CellUpdate {
    /// Update only the text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Update only the weight.
    pub fn bold(bold: bool) -> Self {
        Self {
            bold: Some(bold),
            ..Self::default()
        }
    }

    /// Update only the text color.
    pub fn text_color(color: Color) -> Self {
        Self {
            text_color: Some(color),
            ..Self::default()
        }
    }

    /// Update only the background color.
    pub fn bg_color(color: Color) -> Self {
        Self {
            bg_color: Some(color),
            ..Self::default()
        }
    }

    /// Update all three format attributes, leaving the text alone.
    pub fn format(format: CellFormat) -> Self {
        Self {
            text: None,
            bold: Some(format.bold),
            text_color: Some(format.text_color),
            bg_color: Some(format.bg_color),
        }
    }

    /// Whether the update touches the text.
    pub fn changes_text(&self) -> bool {
        self.text.is_some()
    }

    /// Whether the update carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.bold.is_none()
            && self.text_color.is_none()
            && self.bg_color.is_none()
    }
}

impl From<CellFormat> for CellUpdate {
    fn from(format: CellFormat) -> Self {
        CellUpdate::format(format)
    }
}
