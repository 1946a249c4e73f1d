//! Status glyph row and notification indicator.
//!
//! Pure rendering: every frame the engine hands over the current booleans
//! and this module turns them into at most three glyphs above the pivot and
//! one dot below it. Whether the row is suppressed (ambient full mute) is
//! the caller's policy, not decided here.

use embedded_graphics::Drawable;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, Rectangle, Triangle};
use heapless::Vec;

use crate::geometry::px;
use crate::style::{self, Paint};

/// Status icon side, as a ratio of half the surface width.
const STATUS_ICON_SIZE_RATIO: f32 = 0.11;

/// Vertical centre of the icon row, as a ratio of half the surface height.
const STATUS_ROW_Y_RATIO: f32 = 0.275;

/// Notification dot radius, as a ratio of half the surface width.
const NOTIFICATION_DOT_RATIO: f32 = 0.035;

/// Gap between adjacent icons, beyond the icon side itself.
const STATUS_ICON_GAP: i32 = 5;

/// Battery level bucketed to the glyph variants available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeBucket {
    Full,
    Ninety,
    Eighty,
    Sixty,
    Fifty,
    Thirty,
    Twenty,
}

impl ChargeBucket {
    pub fn from_level(level: u8) -> Self {
        match level {
            100.. => Self::Full,
            91..=99 => Self::Ninety,
            81..=90 => Self::Eighty,
            61..=80 => Self::Sixty,
            51..=60 => Self::Fifty,
            31..=50 => Self::Thirty,
            _ => Self::Twenty,
        }
    }

    fn fill_fraction(self) -> f32 {
        match self {
            Self::Full => 1.0,
            Self::Ninety => 0.9,
            Self::Eighty => 0.8,
            Self::Sixty => 0.6,
            Self::Fifty => 0.5,
            Self::Thirty => 0.3,
            Self::Twenty => 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusGlyph {
    Mute { ambient: bool },
    Charging(ChargeBucket),
    NoConnection,
}

/// Per-frame inputs the glyph row is derived from.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusInputs {
    pub mute: bool,
    pub ambient: bool,
    pub charging: bool,
    pub charging_level: u8,
    pub connected: bool,
}

/// Glyphs to show, in fixed mute → charging → no-connection order.
pub fn glyph_row(inputs: &StatusInputs) -> Vec<StatusGlyph, 3> {
    let mut glyphs = Vec::new();
    if inputs.mute {
        glyphs
            .push(StatusGlyph::Mute {
                ambient: inputs.ambient,
            })
            .ok();
    }
    if inputs.charging {
        glyphs
            .push(StatusGlyph::Charging(ChargeBucket::from_level(
                inputs.charging_level,
            )))
            .ok();
    }
    if !inputs.connected {
        glyphs.push(StatusGlyph::NoConnection).ok();
    }
    glyphs
}

pub struct StatusOverlay {
    centre_x: i32,
    icon_size: u32,
    icon_y: i32,
    dot_radius: f32,
    dot_y: i32,
    icon_paint: Paint,
    dot_paint: Paint,
}

impl Default for StatusOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusOverlay {
    pub fn new() -> Self {
        Self {
            centre_x: 0,
            icon_size: 0,
            icon_y: 0,
            dot_radius: 0.0,
            dot_y: 0,
            icon_paint: Paint::new(style::WHITE),
            dot_paint: Paint::new(style::DEFAULT_ACCENT),
        }
    }

    /// Recompute the row and dot geometry for a new surface centre.
    pub fn set_surface(&mut self, centre: Point) {
        self.centre_x = centre.x;
        self.icon_size = px(centre.x as f32 * STATUS_ICON_SIZE_RATIO);
        self.icon_y = libm::roundf(centre.y as f32 * STATUS_ROW_Y_RATIO) as i32;
        self.dot_radius = centre.x as f32 * NOTIFICATION_DOT_RATIO;
        self.dot_y = libm::roundf(centre.y as f32 * (2.0 - STATUS_ROW_Y_RATIO)) as i32;
    }

    pub fn set_accent(&mut self, accent: Rgb565) {
        self.dot_paint.colour = accent;
    }

    pub fn set_anti_alias(&mut self, anti_alias: bool) {
        self.icon_paint.anti_alias = anti_alias;
        self.dot_paint.anti_alias = anti_alias;
    }

    pub(crate) fn anti_alias(&self) -> bool {
        self.icon_paint.anti_alias && self.dot_paint.anti_alias
    }

    pub fn draw_status_row<D: DrawTarget<Color = Rgb565>>(
        &self,
        target: &mut D,
        inputs: &StatusInputs,
    ) -> Result<(), D::Error> {
        let glyphs = glyph_row(inputs);
        if glyphs.is_empty() || self.icon_size == 0 {
            return Ok(());
        }

        let spacing = self.icon_size as i32 + STATUS_ICON_GAP;
        let mut x = self.centre_x - spacing * (glyphs.len() as i32 - 1) / 2;
        for glyph in &glyphs {
            self.draw_glyph(target, glyph, Point::new(x, self.icon_y))?;
            x += spacing;
        }
        Ok(())
    }

    pub fn draw_notification_dot<D: DrawTarget<Color = Rgb565>>(
        &self,
        target: &mut D,
        unread_count: u32,
    ) -> Result<(), D::Error> {
        if unread_count == 0 {
            return Ok(());
        }
        Circle::with_center(Point::new(self.centre_x, self.dot_y), px(self.dot_radius * 2.0))
            .into_styled(self.dot_paint.fill())
            .draw(target)
    }

    fn draw_glyph<D: DrawTarget<Color = Rgb565>>(
        &self,
        target: &mut D,
        glyph: &StatusGlyph,
        centre: Point,
    ) -> Result<(), D::Error> {
        let half = self.icon_size as i32 / 2;
        match glyph {
            StatusGlyph::Mute { ambient } => {
                // Speaker cone, outline-only while ambient, with a slash.
                let cone = Triangle::new(
                    Point::new(centre.x + half, centre.y - half),
                    Point::new(centre.x + half, centre.y + half),
                    Point::new(centre.x - half / 2, centre.y),
                );
                let cone_style = if *ambient {
                    self.icon_paint.stroke()
                } else {
                    self.icon_paint.fill()
                };
                cone.into_styled(cone_style).draw(target)?;
                Line::new(
                    Point::new(centre.x - half, centre.y + half),
                    Point::new(centre.x + half, centre.y - half),
                )
                .into_styled(self.icon_paint.stroke())
                .draw(target)?;
            }
            StatusGlyph::Charging(bucket) => {
                let width = self.icon_size.saturating_sub(2).max(2);
                let body = Rectangle::with_center(centre, Size::new(width, self.icon_size));
                body.into_styled(self.icon_paint.stroke()).draw(target)?;
                // Terminal nub above the body.
                Rectangle::with_center(
                    Point::new(centre.x, centre.y - half - 1),
                    Size::new(2, 2),
                )
                .into_styled(self.icon_paint.fill())
                .draw(target)?;
                // Fill from the bottom up to the bucketed level.
                let fill_height = px(self.icon_size as f32 * bucket.fill_fraction());
                if fill_height > 0 {
                    Rectangle::new(
                        Point::new(
                            centre.x - width as i32 / 2,
                            centre.y + half - fill_height as i32,
                        ),
                        Size::new(width, fill_height),
                    )
                    .into_styled(self.icon_paint.fill())
                    .draw(target)?;
                }
            }
            StatusGlyph::NoConnection => {
                Circle::with_center(centre, self.icon_size)
                    .into_styled(self.icon_paint.stroke())
                    .draw(target)?;
                Line::new(
                    Point::new(centre.x - half, centre.y + half),
                    Point::new(centre.x + half, centre.y - half),
                )
                .into_styled(self.icon_paint.stroke())
                .draw(target)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;

    #[test]
    fn test_charge_bucket_thresholds() {
        assert_eq!(ChargeBucket::from_level(100), ChargeBucket::Full);
        assert_eq!(ChargeBucket::from_level(99), ChargeBucket::Ninety);
        assert_eq!(ChargeBucket::from_level(91), ChargeBucket::Ninety);
        assert_eq!(ChargeBucket::from_level(90), ChargeBucket::Eighty);
        assert_eq!(ChargeBucket::from_level(81), ChargeBucket::Eighty);
        assert_eq!(ChargeBucket::from_level(80), ChargeBucket::Sixty);
        assert_eq!(ChargeBucket::from_level(61), ChargeBucket::Sixty);
        assert_eq!(ChargeBucket::from_level(60), ChargeBucket::Fifty);
        assert_eq!(ChargeBucket::from_level(51), ChargeBucket::Fifty);
        assert_eq!(ChargeBucket::from_level(50), ChargeBucket::Thirty);
        assert_eq!(ChargeBucket::from_level(31), ChargeBucket::Thirty);
        assert_eq!(ChargeBucket::from_level(30), ChargeBucket::Twenty);
        assert_eq!(ChargeBucket::from_level(0), ChargeBucket::Twenty);
    }

    #[test]
    fn test_glyph_row_order_and_gating() {
        let inputs = StatusInputs {
            mute: true,
            ambient: true,
            charging: true,
            charging_level: 75,
            connected: false,
        };
        let glyphs = glyph_row(&inputs);
        assert_eq!(
            glyphs.as_slice(),
            [
                StatusGlyph::Mute { ambient: true },
                StatusGlyph::Charging(ChargeBucket::Sixty),
                StatusGlyph::NoConnection,
            ]
        );

        let quiet = StatusInputs {
            connected: true,
            ..StatusInputs::default()
        };
        assert!(glyph_row(&quiet).is_empty());
    }

    #[test]
    fn test_notification_dot_gated_on_unread() {
        let mut overlay = StatusOverlay::new();
        overlay.set_surface(Point::new(32, 32));

        let mut display = MockDisplay::<Rgb565>::new();
        display.set_allow_overdraw(true);
        overlay.draw_notification_dot(&mut display, 0).unwrap();
        assert_eq!(display.affected_area().size, Size::zero());

        overlay.draw_notification_dot(&mut display, 3).unwrap();
        assert!(display.affected_area().size != Size::zero());
    }

    #[test]
    fn test_row_draws_nothing_before_first_resize() {
        let overlay = StatusOverlay::new();
        let inputs = StatusInputs {
            mute: true,
            ..StatusInputs::default()
        };

        let mut display = MockDisplay::<Rgb565>::new();
        overlay.draw_status_row(&mut display, &inputs).unwrap();
        assert_eq!(display.affected_area().size, Size::zero());
    }
}
