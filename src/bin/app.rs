#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};

use esp_alloc as _;
use esp_backtrace as _;
use esp_hal::{clock::CpuClock, timer::timg::TimerGroup};
use esp_println::println;

use ledstrip_core::{Color, SharedColorCell};
use ledstrip_esp::config::{BUILD_VERSION, has_station_credentials};
use ledstrip_esp::controllers::ColorSyncController;
use ledstrip_esp::infrastructure::drivers::{
    init_network_stack,
    init_strip,
    start_fallback_ap,
};
use ledstrip_esp::infrastructure::tasks::{
    connectivity_task,
    dhcp_server_task,
    network_runner_task,
    render_task,
    sync_runtime_task,
};

esp_bootloader_esp_idf::esp_app_desc!();

static COLOR_CELL: SharedColorCell = SharedColorCell::new(Color::BOOT);

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    esp_println::logger::init_logger_from_env();

    // Initialize hardware
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Allocate heap memory (64 + 32 KB)
    esp_alloc::heap_allocator!(
        #[unsafe(link_section = ".dram2_uninit")] size: 64 * 1024
    );
    esp_alloc::heap_allocator!(size: 32 * 1024);

    // Start rtos
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    println!("ledstrip: firmware {}", BUILD_VERSION);

    // The strip renders from the first tick, before any network is up, so
    // the boot color is visible immediately.
    let driver = init_strip(peripherals.RMT, ledstrip_esp::led_gpio!(peripherals));
    spawner.spawn(render_task(driver, &COLOR_CELL)).ok();

    if has_station_credentials() {
        let (stack, runner, controller) = init_network_stack(peripherals.WIFI);
        spawner.spawn(network_runner_task(runner)).ok();
        spawner.spawn(connectivity_task(controller)).ok();
        spawner
            .spawn(sync_runtime_task(stack, ColorSyncController::new(&COLOR_CELL)))
            .ok();
    } else {
        // Without credentials the device can only offer its provisioning
        // network and wait to be reconfigured.
        println!("network: no station credentials, starting provisioning AP");
        match start_fallback_ap(spawner, peripherals.WIFI).await {
            Ok(stack) => {
                spawner.spawn(dhcp_server_task(stack)).ok();
            }
            Err(e) => panic!("network: provisioning AP failed: {e:?}"),
        }
    }

    loop {
        Timer::after(Duration::from_secs(5)).await;
    }
}
