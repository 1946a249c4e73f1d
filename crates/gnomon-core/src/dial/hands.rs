//! The three clock hands, drawn back to front.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use super::hand::{Hand, HandKind};

pub struct Hands {
    hour: Hand,
    minute: Hand,
    second: Hand,
}

impl Default for Hands {
    fn default() -> Self {
        Self::new()
    }
}

impl Hands {
    pub fn new() -> Self {
        Self {
            hour: Hand::new(HandKind::Hour),
            minute: Hand::new(HandKind::Minute),
            second: Hand::new(HandKind::Second),
        }
    }

    /// Hour and minute hands share the primary colour.
    pub fn set_primary_colour(&mut self, colour: Rgb565) {
        self.hour.set_colour(colour);
        self.minute.set_colour(colour);
    }

    /// Only the second hand carries the accent colour.
    pub fn set_accent_colour(&mut self, colour: Rgb565) {
        self.second.set_colour(colour);
    }

    /// Ambient mode collapses all three hands to a single colour.
    pub fn set_ambient_colour(&mut self, colour: Rgb565) {
        self.hour.set_colour(colour);
        self.minute.set_colour(colour);
        self.second.set_colour(colour);
    }

    pub fn set_anti_alias(&mut self, anti_alias: bool) {
        self.hour.set_anti_alias(anti_alias);
        self.minute.set_anti_alias(anti_alias);
        self.second.set_anti_alias(anti_alias);
    }

    pub fn set_watch_face_radius(&mut self, radius: f32) {
        self.hour.set_watch_face_radius(radius);
        self.minute.set_watch_face_radius(radius);
        self.second.set_watch_face_radius(radius);
    }

    pub fn set_animated(&mut self, animated: bool) {
        self.hour.set_animated(animated);
        self.minute.set_animated(animated);
        self.second.set_animated(animated);
    }

    pub(crate) fn anti_alias(&self) -> bool {
        self.hour.anti_alias() && self.minute.anti_alias() && self.second.anti_alias()
    }

    /// Draw hour, minute, then second hand.
    ///
    /// `second_rotation` is `None` while ambient: the second hand is skipped
    /// entirely, pivot circle included, and no sweep is armed.
    pub fn draw<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        target: &mut D,
        hour_rotation: f32,
        minute_rotation: f32,
        second_rotation: Option<f32>,
        previous_second_rotation: Option<f32>,
        now_ms: u64,
    ) -> Result<(), D::Error> {
        self.hour.draw(target, hour_rotation, None, now_ms)?;
        self.minute.draw(target, minute_rotation, None, now_ms)?;
        if let Some(rotation) = second_rotation {
            self.second
                .draw(target, rotation, previous_second_rotation, now_ms)?;
        }
        Ok(())
    }
}
