//! One radial tick mark on the dial.

use embedded_graphics::Drawable;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Line;

use crate::geometry::{polar, px, ratio};
use crate::style::{self, Paint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    Hour,
    Minute,
}

impl TickKind {
    const fn length_ratio(self) -> f32 {
        match self {
            Self::Hour => 0.1,
            Self::Minute => 0.033,
        }
    }

    const fn width_ratio(self) -> f32 {
        match self {
            Self::Hour => 0.015,
            Self::Minute => 0.01,
        }
    }

    const fn margin_ratio(self) -> f32 {
        match self {
            Self::Hour | Self::Minute => 0.05,
        }
    }
}

pub struct Tick {
    kind: TickKind,
    paint: Paint,
    watch_face_radius: f32,
}

impl Tick {
    pub fn new(kind: TickKind) -> Self {
        Self {
            kind,
            paint: Paint::new(style::WHITE),
            watch_face_radius: 0.0,
        }
    }

    pub fn set_colour(&mut self, colour: Rgb565) {
        self.paint.colour = colour;
    }

    pub fn set_anti_alias(&mut self, anti_alias: bool) {
        self.paint.anti_alias = anti_alias;
    }

    pub fn set_watch_face_radius(&mut self, radius: f32) {
        self.watch_face_radius = radius;
        self.paint.stroke_width = px(ratio(radius, self.kind.width_ratio()));
    }

    pub(crate) fn anti_alias(&self) -> bool {
        self.paint.anti_alias
    }

    /// Draw the tick at `rotation` degrees, pointing in from the dial edge.
    pub fn draw<D: DrawTarget<Color = Rgb565>>(
        &self,
        target: &mut D,
        rotation: f32,
    ) -> Result<(), D::Error> {
        let r = self.watch_face_radius;
        let centre = Point::new(libm::roundf(r) as i32, libm::roundf(r) as i32);

        let outer = r - ratio(r, self.kind.margin_ratio());
        let inner = outer - ratio(r, self.kind.length_ratio());

        Line::new(polar(centre, rotation, outer), polar(centre, rotation, inner))
            .into_styled(self.paint.stroke())
            .draw(target)
    }
}
