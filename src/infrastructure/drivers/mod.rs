mod led_rmt;
pub mod network;
pub(crate) mod wifi_ap;

pub use led_rmt::init_strip;
pub(crate) use led_rmt::RmtStripDriver;
pub use network::{init_network_stack, wait_for_connection};
pub(crate) use network::resolve_host;
pub use wifi_ap::start_fallback_ap;
