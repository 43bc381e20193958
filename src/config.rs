#![allow(clippy::unreadable_literal)]

use esp_hal::efuse::Efuse;
use ledstrip_core::PulseTimings;

pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

pub(crate) struct WifiConfig {
    pub ssid: &'static str,
    pub password: &'static str,
}

pub(crate) struct FallbackApConfig {
    pub ssid_prefix: &'static str,
    pub password: &'static str,
}

/// Remote state store endpoint. The auth token is provisioned out of band
/// and baked in at build time.
pub(crate) struct SyncConfig {
    pub host: &'static str,
    pub port: u16,
    /// Store path this device listens on and publishes its identity under.
    pub listen_path: &'static str,
    pub auth_token: &'static str,
    pub display_name: &'static str,
    pub device_type: &'static str,
}

pub(crate) struct StripConfig {
    pub frame_ms: u64,
    /// Low time that latches the strip after a frame, in RMT ticks.
    pub reset_ticks: u16,
    pub timings: PulseTimings,
}

pub(crate) const WIFI: WifiConfig = WifiConfig {
    ssid: match option_env!("WIFI_SSID") {
        Some(ssid) => ssid,
        None => "",
    },
    password: match option_env!("WIFI_PASSWORD") {
        Some(password) => password,
        None => "",
    },
};

pub(crate) const FALLBACK_AP: FallbackApConfig = FallbackApConfig {
    ssid_prefix: "ledstrip-setup",
    password: "ledstrip",
};

pub(crate) const SYNC: SyncConfig = SyncConfig {
    host: match option_env!("SYNC_HOST") {
        Some(host) => host,
        None => "ledstrip.example.net",
    },
    port: 80,
    listen_path: match option_env!("SYNC_LISTEN_PATH") {
        Some(path) => path,
        None => "/lights/livingroom",
    },
    auth_token: match option_env!("SYNC_AUTH_TOKEN") {
        Some(token) => token,
        None => "",
    },
    display_name: "Living Room Strip",
    device_type: "rgbw",
};

/// Number of pixels on the strip.
pub(crate) const LED_COUNT: usize = 30;

/// RMT words per frame: 32 pulses per pixel plus the latch pulse.
pub(crate) const PULSE_BUFFER_LEN: usize = LED_COUNT * 32 + 1;

/// WS2812 family timings at a 40 MHz RMT tick (80 MHz source, divider 2):
/// T0H 350 ns, T0L 800 ns, T1H 700 ns, T1L 600 ns, latch 60 us.
/// Wrong values show up as flicker or a dead strip, so they are tuned here
/// and nowhere else.
pub(crate) const STRIP: StripConfig = StripConfig {
    frame_ms: 1_000,
    reset_ticks: 2_400,
    timings: PulseTimings {
        t0h: 14,
        t0l: 32,
        t1h: 28,
        t1l: 24,
    },
};

/// RMT source clock and divider behind the tick rate above.
pub(crate) const RMT_RATE_MHZ: u32 = 80;
pub(crate) const RMT_CLK_DIVIDER: u8 = 2;

/// Station reconnect backoff bounds. At the ceiling an unattended device
/// keeps probing roughly twice a minute.
pub(crate) const WIFI_BACKOFF_FLOOR_MS: u32 = 100;
pub(crate) const WIFI_BACKOFF_CEILING_MS: u32 = 30_000;

/// Remote session reconnect backoff bounds.
pub(crate) const SYNC_BACKOFF_FLOOR_MS: u32 = 500;
pub(crate) const SYNC_BACKOFF_CEILING_MS: u32 = 60_000;

/// Whether the firmware was built with station credentials. Without them the
/// device can only offer its provisioning network.
pub fn has_station_credentials() -> bool {
    !WIFI.ssid.is_empty()
}

/// Stable per-device identifier derived from the factory MAC address.
pub(crate) fn hardware_id() -> u16 {
    let mac = Efuse::mac_address();
    u16::from_be_bytes([mac[4], mac[5]])
}

#[macro_export]
macro_rules! led_gpio {
    ($p:expr) => {
        $p.GPIO16
    };
}
