#![no_std]

//! Hardware-independent core of the LED strip controller.
//!
//! Everything in this crate is pure logic, portable to the host for testing:
//! - `color` - packed GRBW color values and channel sanitizing
//! - `update` - remote update payload parsing
//! - `cell` - the shared atomic color cell between updater and renderer
//! - `pulse` - the bit-to-pulse encoder for the single-wire LED protocol
//! - `backoff` - bounded exponential retry delays
//! - `connectivity` - the WiFi association lifecycle state machine
//!
//! The firmware crate binds these to the ESP32 radio and RMT peripherals.

pub mod backoff;
pub mod cell;
pub mod color;
pub mod connectivity;
pub mod pulse;
pub mod update;

pub use backoff::BackoffCalculator;
pub use cell::SharedColorCell;
pub use color::Color;
pub use connectivity::{ConnectivityManager, LinkAction, LinkEvent, LinkState};
pub use pulse::{EncodeError, PulseItem, PulseTimings, BITS_PER_PIXEL};
pub use update::ColorUpdate;
