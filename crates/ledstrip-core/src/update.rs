//! Remote color update payloads.
//!
//! The remote state source delivers JSON objects with up to four named
//! numeric channels. Parsing is best-effort: a missing channel packs as 0,
//! and a payload that does not parse at all is treated as all channels
//! absent rather than rejected.

use serde::Deserialize;

use crate::color::Color;

/// Channel values received from the remote state source.
///
/// Matches the JSON schema published under the listen path, e.g.
/// `{"r": 18, "g": 52, "b": 86, "w": 120}`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ColorUpdate {
    #[serde(default)]
    pub r: Option<i32>,
    #[serde(default)]
    pub g: Option<i32>,
    #[serde(default)]
    pub b: Option<i32>,
    #[serde(default)]
    pub w: Option<i32>,
}

impl ColorUpdate {
    /// Parse an update payload.
    ///
    /// Unparseable payloads (malformed JSON, non-numeric channels) yield the
    /// default update, which packs to all-zero channels.
    pub fn from_json(payload: &[u8]) -> Self {
        serde_json_core::from_slice(payload)
            .map(|(update, _)| update)
            .unwrap_or_default()
    }

    /// Pack the channels into a color, defaulting absent channels to 0.
    pub fn color(&self) -> Color {
        Color::from_channels(self.r, self.g, self.b, self.w)
    }
}
