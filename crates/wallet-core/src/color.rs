//! Colors written as CSS text in pass documents.
//!
//! Two textual forms are understood:
//!
//! - `rgb(r, g, b)` with decimal channels in `0..=255`
//! - `#RRGGBB`, or `#AARRGGBB` whose leading alpha byte is discarded
//!
//! Unlike dates, a color that cannot be parsed is an error: a pass with a
//! broken color is structurally damaged and should not be displayed.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static RGB_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rgb\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*\)$").expect("rgb pattern is valid")
});

static HEX_NOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#([[:xdigit:]]{2})?([[:xdigit:]]{2})([[:xdigit:]]{2})([[:xdigit:]]{2})$")
        .expect("hex pattern is valid")
});

/// The text did not describe a supported color.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid color '{text}': expected 'rgb(r, g, b)', '#RRGGBB' or '#AARRGGBB'")]
pub struct BadColor {
    /// The rejected input.
    pub text: String,
}

impl BadColor {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
}

impl Color {
    /// Build a color from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse CSS color text.
    ///
    /// # Errors
    ///
    /// Returns [`BadColor`] if the text matches neither supported form or a
    /// decimal channel is above 255.
    pub fn from_css(text: &str) -> Result<Self, BadColor> {
        let trimmed = text.trim();

        let parsed = if trimmed.starts_with("rgb") {
            parse_rgb_function(trimmed)
        } else if trimmed.starts_with('#') {
            parse_hex_notation(trimmed)
        } else {
            None
        };

        parsed.ok_or_else(|| {
            tracing::warn!(value = text, "Rejected color");
            BadColor::new(text)
        })
    }

    /// Replace every channel with its complement.
    pub fn invert(&mut self) -> &mut Self {
        *self = self.inverted();
        self
    }

    /// The photographic negative of this color.
    #[must_use]
    pub const fn inverted(self) -> Self {
        Self::new(255 - self.r, 255 - self.g, 255 - self.b)
    }

    /// The channels as `(r, g, b)`.
    #[must_use]
    pub const fn as_tuple(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// `#RRGGBB` rendering.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

fn parse_rgb_function(text: &str) -> Option<Color> {
    let captures = RGB_FUNCTION.captures(text)?;
    let channel = |index: usize| captures.get(index)?.as_str().parse::<u8>().ok();
    Some(Color::new(channel(1)?, channel(2)?, channel(3)?))
}

fn parse_hex_notation(text: &str) -> Option<Color> {
    let captures = HEX_NOTATION.captures(text)?;
    // Group 1 is the optional alpha byte.
    let channel = |index: usize| u8::from_str_radix(captures.get(index)?.as_str(), 16).ok();
    Some(Color::new(channel(2)?, channel(3)?, channel(4)?))
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl FromStr for Color {
    type Err = BadColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_css(s)
    }
}

impl TryFrom<String> for Color {
    type Error = BadColor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_css(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_function() {
        assert_eq!(Color::from_css("rgb(10, 20, 30)").unwrap().as_tuple(), (10, 20, 30));
        assert_eq!(Color::from_css("rgb(10,20,30)").unwrap().as_tuple(), (10, 20, 30));
        assert_eq!(
            Color::from_css("  rgb( 255 , 0 , 7 )  ").unwrap().as_tuple(),
            (255, 0, 7)
        );
    }

    #[test]
    fn test_rgb_channel_out_of_range_is_rejected() {
        assert!(Color::from_css("rgb(256, 0, 0)").is_err());
        assert!(Color::from_css("rgb(-1, 0, 0)").is_err());
    }

    #[test]
    fn test_incomplete_rgb_is_rejected() {
        assert!(Color::from_css("rgb(10, 20)").is_err());
        assert!(Color::from_css("rgba(10, 20, 30, 0.5)").is_err());
        assert!(Color::from_css("rgb(10, 20, 30").is_err());
    }

    #[test]
    fn test_hex_with_alpha_discards_first_byte() {
        assert_eq!(Color::from_css("#FF00FFAA").unwrap().as_tuple(), (0, 255, 170));
        assert_eq!(Color::from_css("#80102030").unwrap().as_tuple(), (16, 32, 48));
    }

    #[test]
    fn test_hex_without_alpha() {
        assert_eq!(Color::from_css("#102030").unwrap().as_tuple(), (16, 32, 48));
        assert_eq!(Color::from_css("#ffcc00").unwrap().as_tuple(), (255, 204, 0));
    }

    #[test]
    fn test_bad_hex_is_rejected() {
        assert!(Color::from_css("#GG0000").is_err());
        assert!(Color::from_css("#12345").is_err());
        assert!(Color::from_css("#1234567890").is_err());
        assert!(Color::from_css("#").is_err());
    }

    #[test]
    fn test_unknown_form_is_rejected() {
        let err = Color::from_css("not-a-color").unwrap_err();
        assert_eq!(err.text, "not-a-color");
        assert!(err.to_string().contains("not-a-color"));
        assert!(Color::from_css("").is_err());
        assert!(Color::from_css("red").is_err());
    }

    #[test]
    fn test_invert_in_place() {
        let mut color = Color::from((10, 20, 30));
        color.invert();
        assert_eq!(color.as_tuple(), (245, 235, 225));
        assert_eq!(Color::from((10, 20, 30)).invert().as_tuple(), (245, 235, 225));
    }

    #[test]
    fn test_inverted_is_an_involution() {
        let color = Color::new(0, 128, 255);
        assert_eq!(color.inverted().as_tuple(), (255, 127, 0));
        assert_eq!(color.inverted().inverted(), color);
    }

    #[test]
    fn test_display_and_hex() {
        let color = Color::new(255, 0, 16);
        assert_eq!(color.to_string(), "rgb(255, 0, 16)");
        assert_eq!(color.to_hex(), "#FF0010");
        assert_eq!(color.to_string().parse::<Color>().unwrap(), color);
    }

    #[test]
    fn test_serde_uses_css_text() {
        let color: Color = serde_json::from_str("\"rgb(1, 2, 3)\"").unwrap();
        assert_eq!(color.as_tuple(), (1, 2, 3));
        assert_eq!(serde_json::to_string(&color).unwrap(), "\"rgb(1, 2, 3)\"");
        assert!(serde_json::from_str::<Color>("\"teal\"").is_err());
    }
}
