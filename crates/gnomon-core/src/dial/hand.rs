//! A single clock hand: a ratio-sized radial line plus a pivot circle.

use embedded_graphics::Drawable;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line};

use crate::geometry::{polar, px, ratio};
use crate::style::{self, Paint};

/// Duration of one second-hand sweep between beats.
const SWEEP_DURATION_MS: u64 = 80;

/// Pivot-circle stroke width ratio, shared by all hand kinds.
const PIVOT_STROKE_RATIO: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandKind {
    Hour,
    Minute,
    Second,
}

impl HandKind {
    const fn length_ratio(self) -> f32 {
        match self {
            Self::Hour => 0.5,
            Self::Minute => 0.8,
            Self::Second => 0.9,
        }
    }

    const fn width_ratio(self) -> f32 {
        match self {
            Self::Hour => 0.05,
            Self::Minute => 0.035,
            Self::Second => 0.02,
        }
    }

    const fn pivot_radius_ratio(self) -> f32 {
        match self {
            Self::Hour | Self::Minute => 0.04,
            Self::Second => 0.03,
        }
    }
}

/// An in-flight linear sweep between two committed angles.
#[derive(Debug, Clone, Copy)]
struct Sweep {
    from: f32,
    to: f32,
    started_at_ms: u64,
}

impl Sweep {
    /// Interpolated angle at `now_ms`, or `None` once the sweep has landed.
    fn value_at(&self, now_ms: u64) -> Option<f32> {
        let elapsed = now_ms.saturating_sub(self.started_at_ms);
        if elapsed >= SWEEP_DURATION_MS {
            return None;
        }
        let t = elapsed as f32 / SWEEP_DURATION_MS as f32;
        Some(self.from + (self.to - self.from) * t)
    }
}

pub struct Hand {
    kind: HandKind,
    hand_paint: Paint,
    pivot_paint: Paint,
    watch_face_radius: f32,
    previous_rotation: f32,
    sweep: Option<Sweep>,
    animated: bool,
}

impl Hand {
    pub fn new(kind: HandKind) -> Self {
        Self {
            kind,
            hand_paint: Paint::new(style::WHITE),
            pivot_paint: Paint::new(style::WHITE),
            watch_face_radius: 0.0,
            previous_rotation: 0.0,
            sweep: None,
            animated: false,
        }
    }

    pub fn set_colour(&mut self, colour: Rgb565) {
        self.hand_paint.colour = colour;
        self.pivot_paint.colour = colour;
    }

    pub fn set_anti_alias(&mut self, anti_alias: bool) {
        self.hand_paint.anti_alias = anti_alias;
        self.pivot_paint.anti_alias = anti_alias;
    }

    pub fn set_watch_face_radius(&mut self, radius: f32) {
        self.watch_face_radius = radius;
        self.hand_paint.stroke_width = px(ratio(radius, self.kind.width_ratio()));
        self.pivot_paint.stroke_width = px(ratio(radius, PIVOT_STROKE_RATIO));
    }

    pub fn set_animated(&mut self, animated: bool) {
        self.animated = animated;
    }

    pub(crate) fn anti_alias(&self) -> bool {
        self.hand_paint.anti_alias
    }

    #[cfg(test)]
    pub(crate) fn colour(&self) -> Rgb565 {
        self.hand_paint.colour
    }

    /// Draw the hand at `rotation` degrees clockwise from 12 o'clock.
    ///
    /// A second hand with animation enabled arms an 80 ms sweep from
    /// `rotate_from` whenever the target angle changes; the committed
    /// `previous_rotation` is updated to the target immediately, so the next
    /// frame compares against where the hand is heading, not where it is.
    pub fn draw<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        target: &mut D,
        rotation: f32,
        rotate_from: Option<f32>,
        now_ms: u64,
    ) -> Result<(), D::Error> {
        let r = self.watch_face_radius;
        let centre = Point::new(libm::roundf(r) as i32, libm::roundf(r) as i32);

        if self.kind == HandKind::Second
            && self.animated
            && rotation != self.previous_rotation
            && let Some(from) = rotate_from
        {
            self.sweep = Some(Sweep {
                from,
                to: rotation,
                started_at_ms: now_ms,
            });
            self.previous_rotation = rotation;
        }

        let shown = match self.sweep.and_then(|sweep| sweep.value_at(now_ms)) {
            Some(angle) => angle,
            None => {
                self.sweep = None;
                rotation
            }
        };

        let pivot_radius = ratio(r, self.kind.pivot_radius_ratio());
        let length = ratio(r, self.kind.length_ratio());

        Line::new(
            polar(centre, shown, pivot_radius),
            polar(centre, shown, length),
        )
        .into_styled(self.hand_paint.stroke())
        .draw(target)?;

        let pivot = Circle::with_center(centre, px(pivot_radius * 2.0));
        let pivot_style = match self.kind {
            HandKind::Hour | HandKind::Minute => self.pivot_paint.stroke(),
            HandKind::Second => self.pivot_paint.fill(),
        };
        pivot.into_styled(pivot_style).draw(target)?;

        Ok(())
    }
}
