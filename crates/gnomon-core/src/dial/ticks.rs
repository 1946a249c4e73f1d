//! The 60-slot ring of tick marks around the dial.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use super::tick::{Tick, TickKind};

/// Angular step between adjacent tick slots.
const TICK_STEP_DEGREES: u32 = 6;

/// Which variant occupies the slot at `degrees`.
///
/// Hour ticks sit on the twelve 30° positions; every other slot is a minute
/// tick. Total over all multiples of 6°.
pub fn kind_at(degrees: u32) -> TickKind {
    if degrees % 30 == 0 {
        TickKind::Hour
    } else {
        TickKind::Minute
    }
}

pub struct Ticks {
    hour: Tick,
    minute: Tick,
}

impl Default for Ticks {
    fn default() -> Self {
        Self::new()
    }
}

impl Ticks {
    pub fn new() -> Self {
        Self {
            hour: Tick::new(TickKind::Hour),
            minute: Tick::new(TickKind::Minute),
        }
    }

    pub fn set_colour(&mut self, colour: Rgb565) {
        self.hour.set_colour(colour);
        self.minute.set_colour(colour);
    }

    pub fn set_anti_alias(&mut self, anti_alias: bool) {
        self.hour.set_anti_alias(anti_alias);
        self.minute.set_anti_alias(anti_alias);
    }

    pub fn set_watch_face_radius(&mut self, radius: f32) {
        self.hour.set_watch_face_radius(radius);
        self.minute.set_watch_face_radius(radius);
    }

    pub(crate) fn anti_alias(&self) -> bool {
        self.hour.anti_alias() && self.minute.anti_alias()
    }

    pub fn draw<D: DrawTarget<Color = Rgb565>>(&self, target: &mut D) -> Result<(), D::Error> {
        for degrees in (0..360).step_by(TICK_STEP_DEGREES as usize) {
            let tick = match kind_at(degrees) {
                TickKind::Hour => &self.hour,
                TickKind::Minute => &self.minute,
            };
            tick.draw(target, degrees as f32)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_partition_is_twelve_to_forty_eight() {
        let mut hour_slots = 0;
        let mut minute_slots = 0;
        for degrees in (0..360).step_by(6) {
            match kind_at(degrees) {
                TickKind::Hour => hour_slots += 1,
                TickKind::Minute => minute_slots += 1,
            }
        }
        assert_eq!(hour_slots, 12);
        assert_eq!(minute_slots, 48);
    }

    #[test]
    fn test_cardinal_slots_are_hour_ticks() {
        for degrees in [0, 90, 180, 270] {
            assert_eq!(kind_at(degrees), TickKind::Hour);
        }
        assert_eq!(kind_at(6), TickKind::Minute);
        assert_eq!(kind_at(354), TickKind::Minute);
    }
}
