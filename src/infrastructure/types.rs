use crate::infrastructure::drivers::RmtStripDriver;

pub(crate) type StripTxChannel = esp_hal::rmt::Channel<'static, esp_hal::Blocking, 0>;
pub(crate) type StripDriver = RmtStripDriver<StripTxChannel>;
