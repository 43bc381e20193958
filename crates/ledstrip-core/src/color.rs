//! Packed GRBW color values.
//!
//! The strip expects 32 bits per pixel in green, red, blue, white order,
//! most significant byte first. A `Color` is always fully defined; channel
//! inputs outside `0..=255` are replaced with 0 before packing.

/// One pixel color, packed as `GGRRBBWW`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(u32);

impl Color {
    /// All channels off.
    pub const OFF: Color = Color(0);

    /// Color shown from boot until the first remote update arrives.
    pub const BOOT: Color = Color(0x0010_AE0F);

    /// Reinterpret a packed word as a color.
    pub const fn from_bits(bits: u32) -> Self {
        Color(bits)
    }

    /// The packed `GGRRBBWW` word.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Pack four optional channel values.
    ///
    /// Missing channels and values outside `0..=255` pack as 0.
    pub fn from_channels(
        r: Option<i32>,
        g: Option<i32>,
        b: Option<i32>,
        w: Option<i32>,
    ) -> Self {
        let mut bits = u32::from(sanitize(g));
        bits = (bits << 8) | u32::from(sanitize(r));
        bits = (bits << 8) | u32::from(sanitize(b));
        bits = (bits << 8) | u32::from(sanitize(w));
        Color(bits)
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn blue(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn white(self) -> u8 {
        self.0 as u8
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::OFF
    }
}

/// Clamp a channel to one byte; anything absent or out of range becomes 0.
const fn sanitize(value: Option<i32>) -> u8 {
    match value {
        Some(v) if v >= 0 && v <= 255 => v as u8,
        _ => 0,
    }
}
