//! Shared color cell between the update handler and the render task.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::color::Color;

/// The last received color, shared across execution contexts.
///
/// Single writer (the remote update handler), single reader (the render
/// task). The whole packed word is read and written as one atomic unit, so
/// torn values are structurally impossible and no lock is needed. The
/// contract is at-least-once delivery: the renderer observes some color
/// that was valid at some point, not a stronger ordering guarantee.
pub struct SharedColorCell(AtomicU32);

impl SharedColorCell {
    pub const fn new(initial: Color) -> Self {
        Self(AtomicU32::new(initial.bits()))
    }

    pub fn store(&self, color: Color) {
        self.0.store(color.bits(), Ordering::Relaxed);
    }

    pub fn load(&self) -> Color {
        Color::from_bits(self.0.load(Ordering::Relaxed))
    }
}
