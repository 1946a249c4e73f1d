//! Watch-face preferences, as handed over by the host's settings collaborator.
//!
//! The core never writes these: the host owns persistence and passes a fresh
//! [`FaceConfig`] at construction and again on
//! [`reload_config`](crate::engine::FaceEngine::reload_config) when the face
//! regains visibility.

use embedded_graphics::pixelcolor::Rgb565;
use heapless::String;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Colour strings must look like `#RRGGBB`.
    #[error("malformed colour string")]
    MalformedColour,
}

/// Parse a `#RRGGBB` string into a display colour.
pub fn parse_hex_colour(hex: &str) -> Result<Rgb565, ConfigError> {
    let digits = hex.strip_prefix('#').ok_or(ConfigError::MalformedColour)?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ConfigError::MalformedColour);
    }
    let value = u32::from_str_radix(digits, 16).map_err(|_| ConfigError::MalformedColour)?;

    let r = (value >> 16) as u8;
    let g = (value >> 8) as u8;
    let b = value as u8;
    Ok(Rgb565::new(r >> 3, g >> 2, b >> 3))
}

/// One stored colour choice: hex string plus its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColourSetting {
    pub hex: String<7>,
    pub name: String<16>,
}

impl ColourSetting {
    pub fn new(hex: &str, name: &str) -> Self {
        let mut setting = Self {
            hex: String::new(),
            name: String::new(),
        };
        setting.hex.push_str(hex).ok();
        setting.name.push_str(name).ok();
        setting
    }

    pub fn colour(&self) -> Result<Rgb565, ConfigError> {
        parse_hex_colour(&self.hex)
    }

    /// Stored colour, falling back on a malformed value.
    ///
    /// The settings collaborator is supposed to only ever write valid
    /// strings; a bad one is logged and replaced, never fatal.
    pub fn colour_or(&self, fallback: Rgb565) -> Rgb565 {
        self.colour().unwrap_or_else(|_| {
            warn!("ignoring malformed colour {:?}", self.hex.as_str());
            fallback
        })
    }
}

/// Flat preference set consumed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceConfig {
    pub accent: ColourSetting,
    pub background: ColourSetting,
    /// While ambient and muted, hide the status row and notification dot.
    pub ambient_full_mute: bool,
    /// Sweep the second hand between beats instead of stepping it.
    pub animated_second_hand: bool,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            accent: ColourSetting::new("#F44336", "Red"),
            background: ColourSetting::new("#000000", "Black"),
            ambient_full_mute: false,
            animated_second_hand: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style;

    #[test]
    fn test_parse_hex_colour() {
        assert_eq!(parse_hex_colour("#FFFFFF"), Ok(Rgb565::new(31, 63, 31)));
        assert_eq!(parse_hex_colour("#000000"), Ok(Rgb565::new(0, 0, 0)));
        assert_eq!(parse_hex_colour("#F44336"), Ok(style::DEFAULT_ACCENT));
    }

    #[test]
    fn test_parse_rejects_malformed_strings() {
        for bad in ["F44336", "#F4433", "#F443361", "#GGGGGG", ""] {
            assert_eq!(parse_hex_colour(bad), Err(ConfigError::MalformedColour));
        }
    }

    #[test]
    fn test_colour_or_falls_back() {
        let setting = ColourSetting::new("nonsense", "Broken");
        assert_eq!(setting.colour_or(style::WHITE), style::WHITE);
    }

    #[test]
    fn test_default_config() {
        let config = FaceConfig::default();
        assert_eq!(config.accent.colour(), Ok(style::DEFAULT_ACCENT));
        assert_eq!(config.background.colour(), Ok(Rgb565::new(0, 0, 0)));
        assert!(!config.ambient_full_mute);
        assert!(config.animated_second_hand);
    }
}
