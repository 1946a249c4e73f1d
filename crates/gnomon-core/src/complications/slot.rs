//! One data-bound complication slot and its render delegate.

use core::fmt::Write;

use embedded_graphics::Drawable;
use embedded_graphics::geometry::Angle;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Arc, Circle, ContainsPoint, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Text};
use heapless::String;

use super::{SlotId, TapOutcome};
use crate::geometry::{px, ratio};
use crate::style::{self, Paint};

/// Side of a slot's square bounds, as a ratio of the watch-face radius.
pub const COMPLICATION_SIZE_RATIO: f32 = 0.5;

/// Ranged values render as a partial ring spanning at most this arc.
const RANGED_SWEEP_DEGREES: f32 = 270.0;

/// Provider-pushed payload for one slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    ShortText(String<16>),
    RangedValue { value: f32, min: f32, max: f32 },
    /// A provider is configured but the host lacks permission to read it.
    NoPermission,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComplicationData {
    pub payload: Payload,
    /// Whether the provider supplied a tap action.
    pub tap_action: bool,
}

impl ComplicationData {
    pub fn short_text(text: &str) -> Self {
        let mut stored = String::new();
        stored.push_str(text).ok();
        Self {
            payload: Payload::ShortText(stored),
            tap_action: false,
        }
    }

    pub fn ranged_value(value: f32, min: f32, max: f32) -> Self {
        Self {
            payload: Payload::RangedValue { value, min, max },
            tap_action: false,
        }
    }

    pub fn no_permission() -> Self {
        Self {
            payload: Payload::NoPermission,
            tap_action: false,
        }
    }

    pub fn with_tap_action(mut self) -> Self {
        self.tap_action = true;
        self
    }
}

/// Render delegate bound to one slot, mirroring the global display mode.
#[derive(Debug)]
pub(crate) struct SlotRenderer {
    pub ambient: bool,
    pub low_bit_ambient: bool,
    pub burn_in_protection: bool,
    paint: Paint,
}

impl SlotRenderer {
    fn new(ambient: bool, low_bit_ambient: bool, burn_in_protection: bool) -> Self {
        let mut paint = Paint::new(style::WHITE);
        paint.anti_alias = !(ambient && low_bit_ambient);
        Self {
            ambient,
            low_bit_ambient,
            burn_in_protection,
            paint,
        }
    }

    fn sync_paint(&mut self) {
        self.paint.anti_alias = !(self.ambient && self.low_bit_ambient);
    }

    fn draw<D: DrawTarget<Color = Rgb565>>(
        &self,
        target: &mut D,
        position: Point,
        side: u32,
        payload: &Payload,
    ) -> Result<(), D::Error> {
        let text_style = MonoTextStyle::new(&FONT_6X10, self.paint.colour);

        match payload {
            Payload::ShortText(text) => {
                Text::with_alignment(text, position, text_style, Alignment::Center).draw(target)?;
            }
            Payload::RangedValue { value, min, max } => {
                let span = max - min;
                let fraction = if span > 0.0 {
                    ((value - min) / span).clamp(0.0, 1.0)
                } else {
                    0.0
                };

                // Burn-in protection keeps ambient strokes thin.
                let ring_width = if self.ambient && self.burn_in_protection {
                    1
                } else {
                    2
                };
                let ring = Arc::with_center(
                    position,
                    side.saturating_sub(side / 4),
                    Angle::from_degrees(135.0),
                    Angle::from_degrees(fraction * RANGED_SWEEP_DEGREES),
                );
                ring.into_styled(PrimitiveStyle::with_stroke(self.paint.colour, ring_width))
                    .draw(target)?;

                let mut label: String<8> = String::new();
                write!(label, "{}", libm::roundf(*value) as i32).ok();
                Text::with_alignment(&label, position, text_style, Alignment::Center)
                    .draw(target)?;
            }
            Payload::NoPermission => {
                Circle::with_center(position, side / 2)
                    .into_styled(PrimitiveStyle::with_stroke(self.paint.colour, 1))
                    .draw(target)?;
                Text::with_alignment("!", position, text_style, Alignment::Center).draw(target)?;
            }
        }
        Ok(())
    }
}

/// One of the four dial slots, alive from its first data delivery onward.
pub struct Complication {
    slot: SlotId,
    data: Option<ComplicationData>,
    renderer: SlotRenderer,
    watch_face_radius: f32,
}

impl Complication {
    pub(crate) fn new(
        slot: SlotId,
        ambient: bool,
        low_bit_ambient: bool,
        burn_in_protection: bool,
        watch_face_radius: f32,
    ) -> Self {
        Self {
            slot,
            data: None,
            renderer: SlotRenderer::new(ambient, low_bit_ambient, burn_in_protection),
            watch_face_radius,
        }
    }

    pub(crate) fn set_data(&mut self, data: Option<ComplicationData>) {
        self.data = data;
    }

    pub(crate) fn data(&self) -> Option<&ComplicationData> {
        self.data.as_ref()
    }

    pub(crate) fn set_ambient(&mut self, ambient: bool) {
        self.renderer.ambient = ambient;
        self.renderer.sync_paint();
    }

    pub(crate) fn set_low_bit_ambient(&mut self, low_bit_ambient: bool) {
        self.renderer.low_bit_ambient = low_bit_ambient;
        self.renderer.sync_paint();
    }

    pub(crate) fn set_burn_in_protection(&mut self, burn_in_protection: bool) {
        self.renderer.burn_in_protection = burn_in_protection;
    }

    pub(crate) fn set_watch_face_radius(&mut self, watch_face_radius: f32) {
        self.watch_face_radius = watch_face_radius;
    }

    #[cfg(test)]
    pub(crate) fn renderer(&self) -> &SlotRenderer {
        &self.renderer
    }

    /// Slot centre in face-local coordinates.
    pub(crate) fn position(&self) -> Point {
        let r = libm::roundf(self.watch_face_radius) as i32;
        Point::new(r, r) + self.slot.offset(self.watch_face_radius)
    }

    fn bounds(&self) -> Rectangle {
        let side = px(ratio(self.watch_face_radius, COMPLICATION_SIZE_RATIO));
        Rectangle::with_center(self.position(), Size::new(side, side))
    }

    /// Resolve a tap landing inside this slot's bounds.
    ///
    /// No data yet asks for the provider chooser; data without permission
    /// asks for the permission flow; otherwise the provider's own tap action
    /// fires, if it has one.
    pub(crate) fn tap(&self, point: Point) -> Option<TapOutcome> {
        if !self.bounds().contains(point) {
            return None;
        }
        match &self.data {
            None => Some(TapOutcome::LaunchChooser(self.slot)),
            Some(data) => match data.payload {
                Payload::NoPermission => Some(TapOutcome::RequestPermission(self.slot)),
                _ if data.tap_action => Some(TapOutcome::InvokeAction(self.slot)),
                _ => None,
            },
        }
    }

    /// Draw the slot's payload; an empty slot draws nothing at all.
    pub(crate) fn draw<D: DrawTarget<Color = Rgb565>>(
        &self,
        target: &mut D,
        _now_ms: u64,
    ) -> Result<(), D::Error> {
        let Some(data) = &self.data else {
            return Ok(());
        };
        let side = px(ratio(self.watch_face_radius, COMPLICATION_SIZE_RATIO));
        self.renderer
            .draw(target, self.position(), side, &data.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tap_outcomes_follow_data_state() {
        let mut slot = Complication::new(SlotId::Left, false, false, false, 200.0);
        let inside = slot.position();

        assert_eq!(slot.tap(inside), Some(TapOutcome::LaunchChooser(SlotId::Left)));

        slot.set_data(Some(ComplicationData::no_permission()));
        assert_eq!(
            slot.tap(inside),
            Some(TapOutcome::RequestPermission(SlotId::Left))
        );

        slot.set_data(Some(ComplicationData::short_text("MON").with_tap_action()));
        assert_eq!(slot.tap(inside), Some(TapOutcome::InvokeAction(SlotId::Left)));

        // Data without a tap action consumes the tap silently.
        slot.set_data(Some(ComplicationData::short_text("MON")));
        assert_eq!(slot.tap(inside), None);
    }

    #[test]
    fn test_tap_outside_bounds_misses() {
        let slot = Complication::new(SlotId::Left, false, false, false, 200.0);
        // Slot centre is (100, 200) at radius 200; bounds are a 100px square.
        assert_eq!(slot.tap(Point::new(300, 200)), None);
        assert_eq!(slot.tap(Point::new(100, 60)), None);
    }

    #[test]
    fn test_renderer_anti_alias_tracks_low_bit_ambient() {
        let mut slot = Complication::new(SlotId::Top, false, false, false, 200.0);
        assert!(slot.renderer().paint.anti_alias);

        slot.set_low_bit_ambient(true);
        assert!(slot.renderer().paint.anti_alias);

        slot.set_ambient(true);
        assert!(!slot.renderer().paint.anti_alias);

        slot.set_ambient(false);
        assert!(slot.renderer().paint.anti_alias);
    }
}
