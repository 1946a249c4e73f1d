//! The dial: tick marks and clock hands.

mod hand;
mod hands;
mod tick;
mod ticks;

pub use hand::{Hand, HandKind};
pub use hands::Hands;
pub use tick::{Tick, TickKind};
pub use ticks::{Ticks, kind_at};
