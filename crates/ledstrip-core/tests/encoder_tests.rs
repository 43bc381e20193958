//! Tests for the pulse encoder.

use ledstrip_core::pulse::{encode_into, pulse_stream};
use ledstrip_core::{Color, EncodeError, PulseItem, PulseTimings, BITS_PER_PIXEL};

/// WS2812-like timings at a 40 MHz tick (25 ns per tick).
const TIMINGS: PulseTimings = PulseTimings {
    t0h: 14,
    t0l: 32,
    t1h: 28,
    t1l: 24,
};

/// Map a pulse item back to the bit it encodes.
fn decode(item: PulseItem) -> u32 {
    if item == TIMINGS.one() {
        1
    } else {
        assert_eq!(item, TIMINGS.zero());
        0
    }
}

// -----------------------------------------------------------------------------
// Canonical pulse items
// -----------------------------------------------------------------------------

#[test]
fn canonical_items_derive_from_timings() {
    assert_eq!(
        TIMINGS.zero(),
        PulseItem {
            high_ticks: 14,
            low_ticks: 32
        }
    );
    assert_eq!(
        TIMINGS.one(),
        PulseItem {
            high_ticks: 28,
            low_ticks: 24
        }
    );
}

// -----------------------------------------------------------------------------
// Encoding
// -----------------------------------------------------------------------------

#[test]
fn one_pixel_encodes_thirty_two_items_msb_first() {
    let pixels = [Color::from_bits(0x8000_0001)];
    let mut out = [TIMINGS.zero(); BITS_PER_PIXEL];

    let written = encode_into(&pixels, &TIMINGS, &mut out).unwrap();

    assert_eq!(written, BITS_PER_PIXEL);
    assert_eq!(decode(out[0]), 1);
    for item in &out[1..31] {
        assert_eq!(decode(*item), 0);
    }
    assert_eq!(decode(out[31]), 1);
}

#[test]
fn encoding_round_trips_any_color() {
    for bits in [0u32, 0x3412_5678, 0xFFFF_FFFF, 0x0010_AE0F, 0xA5A5_5A5A] {
        let pixels = [Color::from_bits(bits)];
        let mut out = [TIMINGS.zero(); BITS_PER_PIXEL];
        encode_into(&pixels, &TIMINGS, &mut out).unwrap();

        let mut decoded = 0u32;
        for item in out {
            decoded = (decoded << 1) | decode(item);
        }

        assert_eq!(decoded, bits);
    }
}

#[test]
fn pixels_encode_in_wire_order() {
    let pixels = [Color::from_bits(0xFFFF_FFFF), Color::from_bits(0)];
    let items: Vec<PulseItem> = pulse_stream(&pixels, &TIMINGS).collect();

    assert_eq!(items.len(), 2 * BITS_PER_PIXEL);
    for item in &items[..BITS_PER_PIXEL] {
        assert_eq!(decode(*item), 1);
    }
    for item in &items[BITS_PER_PIXEL..] {
        assert_eq!(decode(*item), 0);
    }
}

#[test]
fn rendering_the_same_color_twice_is_bit_identical() {
    let pixels = [Color::from_bits(0x3412_5678); 4];
    let mut first = [TIMINGS.zero(); 4 * BITS_PER_PIXEL];
    let mut second = [TIMINGS.zero(); 4 * BITS_PER_PIXEL];

    encode_into(&pixels, &TIMINGS, &mut first).unwrap();
    encode_into(&pixels, &TIMINGS, &mut second).unwrap();

    assert_eq!(first, second);
}

#[test]
fn undersized_buffer_is_rejected() {
    let pixels = [Color::OFF; 2];
    let mut out = [TIMINGS.zero(); BITS_PER_PIXEL];

    let result = encode_into(&pixels, &TIMINGS, &mut out);

    assert_eq!(
        result,
        Err(EncodeError::BufferTooSmall {
            needed: 2 * BITS_PER_PIXEL,
            got: BITS_PER_PIXEL
        })
    );
}
