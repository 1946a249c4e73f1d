//! Paint state shared by every drawn element of the face.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::PrimitiveStyle;

/// Pure white: interactive primary colour and the entire ambient palette.
pub const WHITE: Rgb565 = Rgb565::new(31, 63, 31);

/// Fallback accent when the stored preference cannot be parsed (#F44336).
pub const DEFAULT_ACCENT: Rgb565 = Rgb565::new(0xF4 >> 3, 0x43 >> 2, 0x36 >> 3);

/// Background behind everything while ambient, regardless of preference.
pub const AMBIENT_BACKGROUND: Rgb565 = Rgb565::BLACK;

/// Colour, stroke width, and anti-alias state for one drawn element.
///
/// The explicit stand-in for a platform paint object. The `anti_alias` flag
/// is carried for hardware backends that honour it; `embedded-graphics`
/// rasterises aliased either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paint {
    pub colour: Rgb565,
    pub stroke_width: u32,
    pub anti_alias: bool,
}

impl Paint {
    pub const fn new(colour: Rgb565) -> Self {
        Self {
            colour,
            stroke_width: 1,
            anti_alias: true,
        }
    }

    pub fn stroke(&self) -> PrimitiveStyle<Rgb565> {
        PrimitiveStyle::with_stroke(self.colour, self.stroke_width)
    }

    pub fn fill(&self) -> PrimitiveStyle<Rgb565> {
        PrimitiveStyle::with_fill(self.colour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_accent_matches_stored_hex() {
        // #F44336 quantised to RGB565
        assert_eq!(DEFAULT_ACCENT, Rgb565::new(30, 16, 6));
    }

    #[test]
    fn test_paint_styles_carry_colour_and_width() {
        let mut paint = Paint::new(WHITE);
        paint.stroke_width = 3;

        assert_eq!(paint.stroke().stroke_color, Some(WHITE));
        assert_eq!(paint.stroke().stroke_width, 3);
        assert_eq!(paint.fill().fill_color, Some(WHITE));
    }
}
