//! Ratio geometry: every linear dimension on the face is `radius × ratio`.
//!
//! The watch-face radius is the single scalar the whole layout derives from.
//! Rotations are degrees clockwise from 12 o'clock; [`polar`] projects a
//! radial distance along such a rotation into screen space, replacing the
//! canvas-rotation transform a platform renderer would supply.

use embedded_graphics::prelude::*;

/// Interactive repaint period (60 fps).
pub const FRAME_PERIOD_MS: u64 = 1000 / 60;

/// Scale a ratio by the watch-face radius.
pub fn ratio(radius: f32, r: f32) -> f32 {
    radius * r
}

/// Round a scaled dimension to whole pixels (stroke widths, icon sizes).
///
/// Non-positive dimensions collapse to zero so a degenerate radius draws
/// nothing rather than panicking.
pub fn px(dimension: f32) -> u32 {
    if dimension <= 0.0 {
        0
    } else {
        libm::roundf(dimension) as u32
    }
}

/// Hour-hand rotation: 30° per hour plus 0.5° per minute of drift.
pub fn hour_rotation(hour: u32, minute: u32) -> f32 {
    (hour % 12) as f32 * 30.0 + minute as f32 / 2.0
}

/// Minute-hand rotation: 6° per minute plus 0.1° per second of drift.
pub fn minute_rotation(minute: u32, second: u32) -> f32 {
    minute as f32 * 6.0 + second as f32 / 10.0
}

/// Second-hand rotation: 6° per second, including the sub-second fraction.
pub fn second_rotation(second: u32, millis: u32) -> f32 {
    (second as f32 + millis as f32 / 1000.0) * 6.0
}

/// Project a radial distance along a clockwise-from-12 rotation.
pub fn polar(centre: Point, rotation_deg: f32, radial: f32) -> Point {
    let rad = rotation_deg.to_radians();
    let x = centre.x as f32 + libm::sinf(rad) * radial;
    let y = centre.y as f32 - libm::cosf(rad) * radial;
    Point::new(libm::roundf(x) as i32, libm::roundf(y) as i32)
}

/// Delay until the next wall-clock-aligned frame boundary.
///
/// Aligning to `period_ms` boundaries keeps the interactive timer from
/// drifting relative to the second hand's beat.
pub fn frame_aligned_delay(now_ms: u64, period_ms: u64) -> u64 {
    period_ms - now_ms % period_ms
}
