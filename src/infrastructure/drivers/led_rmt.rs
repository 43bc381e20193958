use esp_hal::gpio::Level;
use esp_hal::gpio::interconnect::PeripheralOutput;
use esp_hal::peripherals::RMT;
use esp_hal::rmt::{
    Error as RmtError,
    PulseCode,
    Rmt,
    TxChannel,
    TxChannelConfig,
    TxChannelCreator,
};
use esp_hal::time::Rate;
use static_cell::make_static;

use ledstrip_core::{BITS_PER_PIXEL, Color, pulse::pulse_stream};

use crate::config;
use crate::infrastructure::types::StripDriver;

#[derive(Debug)]
pub(crate) enum StripError {
    /// The frame does not fit the pulse buffer.
    FrameTooLarge,
    /// The channel was lost by an earlier failed transmit.
    ChannelUnavailable,
    Transmit(RmtError),
}

/// WS2812 strip driver on top of the RMT peripheral.
///
/// The RMT generates the sub-microsecond pulse train on its own, the CPU
/// only fills a word buffer per frame. The channel moves through the
/// transaction by value, so it is parked in an `Option` between frames.
pub struct RmtStripDriver<TX: TxChannel> {
    channel: Option<TX>,
    buffer: &'static mut [u32; config::PULSE_BUFFER_LEN],
}

impl<TX: TxChannel> RmtStripDriver<TX> {
    /// Encode and transmit one frame, blocking until the strip latched it.
    ///
    /// On a transmit error the frame is dropped and the channel is kept, so
    /// the next frame starts from a clean transaction.
    pub(crate) fn write(&mut self, pixels: &[Color]) -> Result<(), StripError> {
        if pixels.len() * BITS_PER_PIXEL + 1 > self.buffer.len() {
            return Err(StripError::FrameTooLarge);
        }

        let mut len = 0;
        for item in pulse_stream(pixels, &config::STRIP.timings) {
            self.buffer[len] =
                PulseCode::new(Level::High, item.high_ticks, Level::Low, item.low_ticks);
            len += 1;
        }
        // Latch: hold the line low long enough for the strip to apply the
        // frame.
        self.buffer[len] = PulseCode::new(Level::Low, config::STRIP.reset_ticks, Level::Low, 0);
        len += 1;

        let channel = self.channel.take().ok_or(StripError::ChannelUnavailable)?;
        match channel.transmit(&self.buffer[..len]) {
            Ok(transaction) => match transaction.wait() {
                Ok(channel) => {
                    self.channel = Some(channel);
                    Ok(())
                }
                Err((e, channel)) => {
                    self.channel = Some(channel);
                    Err(StripError::Transmit(e))
                }
            },
            Err(e) => Err(StripError::Transmit(e)),
        }
    }
}

/// Configure RMT channel 0 for the strip data line.
pub fn init_strip<O>(rmt: RMT<'static>, pin: O) -> StripDriver
where
    O: PeripheralOutput<'static>,
{
    let rmt = Rmt::new(rmt, Rate::from_mhz(config::RMT_RATE_MHZ)).unwrap();

    let tx_config = TxChannelConfig::default()
        .with_clk_divider(config::RMT_CLK_DIVIDER)
        .with_idle_output_level(Level::Low)
        .with_idle_output(true)
        .with_carrier_modulation(false);
    let channel = rmt.channel0.configure_tx(pin, tx_config).unwrap();

    let buffer = make_static!([0u32; config::PULSE_BUFFER_LEN]);

    RmtStripDriver {
        channel: Some(channel),
        buffer,
    }
}
