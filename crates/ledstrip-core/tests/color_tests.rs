//! Tests for color packing, update payload parsing and the shared cell.

use ledstrip_core::{Color, ColorUpdate, SharedColorCell};

// -----------------------------------------------------------------------------
// Channel packing
// -----------------------------------------------------------------------------

#[test]
fn channels_pack_in_grbw_order() {
    let color = Color::from_channels(Some(0x12), Some(0x34), Some(0x56), Some(0x78));

    assert_eq!(color.bits(), 0x3412_5678);
}

#[test]
fn missing_channel_packs_as_zero() {
    let color = Color::from_channels(Some(0x01), None, Some(0x02), Some(0x03));

    assert_eq!(color.bits(), 0x0001_0203);
}

#[test]
fn out_of_range_channels_pack_as_zero() {
    let color = Color::from_channels(Some(-1), Some(256), Some(0xFF), Some(1_000_000));

    assert_eq!(color.bits(), 0x0000_FF00);
}

#[test]
fn channel_accessors_match_packing() {
    let color = Color::from_channels(Some(0x12), Some(0x34), Some(0x56), Some(0x78));

    assert_eq!(color.green(), 0x34);
    assert_eq!(color.red(), 0x12);
    assert_eq!(color.blue(), 0x56);
    assert_eq!(color.white(), 0x78);
}

// -----------------------------------------------------------------------------
// Update payload parsing
// -----------------------------------------------------------------------------

#[test]
fn full_payload_parses_to_packed_color() {
    let update = ColorUpdate::from_json(br#"{"r":18,"g":52,"b":86,"w":120}"#);

    assert_eq!(update.color().bits(), 0x3412_5678);
}

#[test]
fn absent_channel_defaults_to_zero() {
    let update = ColorUpdate::from_json(br#"{"r":1,"b":2,"w":3}"#);

    assert_eq!(update.color().bits(), 0x0001_0203);
}

#[test]
fn unparseable_payload_defaults_every_channel_to_zero() {
    let update = ColorUpdate::from_json(br#"{"r":1,"g":"bright","b":2}"#);

    assert_eq!(update.color(), Color::OFF);
}

#[test]
fn empty_object_is_all_channels_off() {
    let update = ColorUpdate::from_json(b"{}");

    assert_eq!(update.color(), Color::OFF);
}

// -----------------------------------------------------------------------------
// Shared color cell
// -----------------------------------------------------------------------------

#[test]
fn cell_returns_the_initial_color_until_written() {
    let cell = SharedColorCell::new(Color::BOOT);

    assert_eq!(cell.load(), Color::BOOT);
}

#[test]
fn cell_returns_the_last_stored_color() {
    let cell = SharedColorCell::new(Color::BOOT);

    cell.store(Color::from_bits(0x3412_5678));
    assert_eq!(cell.load(), Color::from_bits(0x3412_5678));

    // Re-reading without a new write observes the same value.
    assert_eq!(cell.load(), Color::from_bits(0x3412_5678));
}
