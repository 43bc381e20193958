use embassy_time::{Duration, Timer};
use esp_println::println;

use ledstrip_core::{Color, SharedColorCell};

use crate::config;
use crate::infrastructure::types::StripDriver;

/// Periodic render task.
///
/// Every tick reads the shared color and pushes a uniform frame to the
/// strip. The first frame goes out before any network is up, so the strip
/// shows the boot color immediately. A failed transmit drops that frame
/// only; the next tick repaints.
#[embassy_executor::task]
pub async fn render_task(mut driver: StripDriver, cell: &'static SharedColorCell) {
    let mut pixels = [Color::OFF; config::LED_COUNT];

    loop {
        pixels.fill(cell.load());
        if let Err(e) = driver.write(&pixels) {
            println!("render: transmit failed, frame skipped: {e:?}");
        }
        Timer::after(Duration::from_millis(config::STRIP.frame_ms)).await;
    }
}
