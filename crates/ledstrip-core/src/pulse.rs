//! Bit-to-pulse encoding for the single-wire LED protocol.
//!
//! Every bit of a packed color becomes one pulse item: a high phase followed
//! by a low phase, with durations in peripheral clock ticks. Only two
//! canonical items exist per protocol variant, derived once from the timing
//! constants; the bit loop never touches raw durations.
//!
//! Getting the timings wrong produces visible flicker or a dead strip, so
//! they live in configuration, calibrated against the protocol datasheet,
//! not in this module.

use crate::color::Color;

/// Bits transmitted per packed color.
pub const BITS_PER_PIXEL: usize = 32;

/// One transmitted bit: high duration then low duration, in peripheral
/// clock ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseItem {
    pub high_ticks: u16,
    pub low_ticks: u16,
}

/// Protocol timing constants in peripheral clock ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseTimings {
    /// High time of a 0 bit.
    pub t0h: u16,
    /// Low time of a 0 bit.
    pub t0l: u16,
    /// High time of a 1 bit.
    pub t1h: u16,
    /// Low time of a 1 bit.
    pub t1l: u16,
}

impl PulseTimings {
    /// The canonical ZERO-bit pulse item.
    pub const fn zero(&self) -> PulseItem {
        PulseItem {
            high_ticks: self.t0h,
            low_ticks: self.t0l,
        }
    }

    /// The canonical ONE-bit pulse item.
    pub const fn one(&self) -> PulseItem {
        PulseItem {
            high_ticks: self.t1h,
            low_ticks: self.t1l,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// The output buffer cannot hold `pixels × 32` items.
    BufferTooSmall { needed: usize, got: usize },
}

/// Pulse items for a pixel buffer, most significant bit first.
///
/// Yields exactly `pixels.len() × 32` items. The iterator form lets the
/// hardware driver fill its transmit buffer without an intermediate copy.
pub fn pulse_stream<'a>(
    pixels: &'a [Color],
    timings: &PulseTimings,
) -> impl Iterator<Item = PulseItem> + 'a {
    let zero = timings.zero();
    let one = timings.one();
    pixels.iter().flat_map(move |pixel| {
        let bits = pixel.bits();
        (0..BITS_PER_PIXEL).map(move |position| {
            if bits & (1 << (BITS_PER_PIXEL - 1 - position)) != 0 {
                one
            } else {
                zero
            }
        })
    })
}

/// Encode a pixel buffer into `out`, returning the number of items written.
pub fn encode_into(
    pixels: &[Color],
    timings: &PulseTimings,
    out: &mut [PulseItem],
) -> Result<usize, EncodeError> {
    let needed = pixels.len() * BITS_PER_PIXEL;
    if out.len() < needed {
        return Err(EncodeError::BufferTooSmall {
            needed,
            got: out.len(),
        });
    }
    for (slot, item) in out.iter_mut().zip(pulse_stream(pixels, timings)) {
        *slot = item;
    }
    Ok(needed)
}
