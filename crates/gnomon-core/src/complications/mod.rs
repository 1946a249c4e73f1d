//! The four data-bound complication slots around the dial centre.

mod slot;

pub use slot::{COMPLICATION_SIZE_RATIO, Complication, ComplicationData, Payload};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

/// The fixed slot identities, one per cardinal position on the dial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotId {
    Left,
    Top,
    Right,
    Bottom,
}

impl SlotId {
    pub const ALL: [Self; 4] = [Self::Left, Self::Top, Self::Right, Self::Bottom];

    pub const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Top => 1,
            Self::Right => 2,
            Self::Bottom => 3,
        }
    }

    /// Offset of the slot centre from the face centre.
    pub fn offset(self, radius: f32) -> Point {
        let half = libm::roundf(radius / 2.0) as i32;
        match self {
            Self::Left => Point::new(-half, 0),
            Self::Right => Point::new(half, 0),
            Self::Top => Point::new(0, -half),
            Self::Bottom => Point::new(0, half),
        }
    }
}

/// What a consumed tap asks the host to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    LaunchChooser(SlotId),
    RequestPermission(SlotId),
    InvokeAction(SlotId),
}

/// Fixed four-entry slot table; an entry exists from the first data delivery
/// for its id and never goes away again.
pub struct Complications {
    slots: [Option<Complication>; 4],
    ambient: bool,
    low_bit_ambient: bool,
    burn_in_protection: bool,
    watch_face_radius: f32,
}

impl Default for Complications {
    fn default() -> Self {
        Self::new()
    }
}

impl Complications {
    pub fn new() -> Self {
        Self {
            slots: [None, None, None, None],
            ambient: false,
            low_bit_ambient: false,
            burn_in_protection: false,
            watch_face_radius: 0.0,
        }
    }

    /// Store provider data, activating the slot on first delivery.
    ///
    /// `None` data leaves the slot active but empty: it draws nothing while
    /// still answering taps with the provider-chooser flow.
    pub fn update_data(&mut self, slot: SlotId, data: Option<ComplicationData>) {
        let entry = &mut self.slots[slot.index()];
        if entry.is_none() {
            *entry = Some(Complication::new(
                slot,
                self.ambient,
                self.low_bit_ambient,
                self.burn_in_protection,
                self.watch_face_radius,
            ));
        }
        if let Some(complication) = entry {
            complication.set_data(data);
        }
    }

    pub fn is_active(&self, slot: SlotId) -> bool {
        self.slots[slot.index()].is_some()
    }

    pub fn set_ambient(&mut self, ambient: bool) {
        self.ambient = ambient;
        for complication in self.slots.iter_mut().flatten() {
            complication.set_ambient(ambient);
        }
    }

    pub fn set_low_bit_ambient(&mut self, low_bit_ambient: bool) {
        self.low_bit_ambient = low_bit_ambient;
        for complication in self.slots.iter_mut().flatten() {
            complication.set_low_bit_ambient(low_bit_ambient);
        }
    }

    pub fn set_burn_in_protection(&mut self, burn_in_protection: bool) {
        self.burn_in_protection = burn_in_protection;
        for complication in self.slots.iter_mut().flatten() {
            complication.set_burn_in_protection(burn_in_protection);
        }
    }

    pub fn set_watch_face_radius(&mut self, watch_face_radius: f32) {
        self.watch_face_radius = watch_face_radius;
        for complication in self.slots.iter_mut().flatten() {
            complication.set_watch_face_radius(watch_face_radius);
        }
    }

    /// Route a face-local tap to whichever active slot it lands in.
    pub fn tap(&self, point: Point) -> Option<TapOutcome> {
        self.slots
            .iter()
            .flatten()
            .find_map(|complication| complication.tap(point))
    }

    pub fn draw<D: DrawTarget<Color = Rgb565>>(
        &self,
        target: &mut D,
        now_ms: u64,
    ) -> Result<(), D::Error> {
        for complication in self.slots.iter().flatten() {
            complication.draw(target, now_ms)?;
        }
        Ok(())
    }
}
