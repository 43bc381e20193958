use core::fmt::Write as _;

use embassy_executor::Spawner;
use embassy_net::{Ipv4Address, Ipv4Cidr, Runner, Stack, StackResources, StaticConfigV4};
use embassy_time::{Duration, Timer};
use esp_hal::peripherals::WIFI;
use esp_println::println;
use esp_radio::wifi::{
    AccessPointConfig,
    AuthMethod,
    Config as RadioConfig,
    ModeConfig,
    WifiController,
    WifiDevice,
};
use heapless::String;
use static_cell::make_static;

use crate::config;
use crate::infrastructure::drivers::network::get_seed;

const MAX_CONNECTIONS: usize = 6;

/// Address the device takes on its own provisioning network.
pub(crate) const FALLBACK_AP_ADDRESS: Ipv4Address = Ipv4Address::new(192, 168, 4, 1);
const FALLBACK_AP_PREFIX_LEN: u8 = 24;

#[derive(Debug)]
pub struct ApStartError;

/// Bring up the provisioning access point with a static address.
///
/// Used when no station credentials are configured. The returned stack is
/// ready once the link reports up; the caller still has to spawn the DHCP
/// responder on it.
pub async fn start_fallback_ap(
    spawner: Spawner,
    wifi_device: WIFI<'static>,
) -> Result<Stack<'static>, ApStartError> {
    let radio = esp_radio::init().map_err(|_| ApStartError)?;
    let esp_radio_ctrl = &*make_static!(radio);
    let (controller, interfaces) =
        esp_radio::wifi::new(esp_radio_ctrl, wifi_device, RadioConfig::default())
            .map_err(|_| ApStartError)?;

    let static_config = StaticConfigV4 {
        address: Ipv4Cidr::new(FALLBACK_AP_ADDRESS, FALLBACK_AP_PREFIX_LEN),
        gateway: Some(FALLBACK_AP_ADDRESS),
        dns_servers: heapless::Vec::default(),
    };
    let net_config = embassy_net::Config::ipv4_static(static_config);

    let network_resources = make_static!(StackResources::<MAX_CONNECTIONS>::new());
    let (stack, runner) =
        embassy_net::new(interfaces.ap, net_config, network_resources, get_seed());

    spawner.spawn(fallback_ap_task(controller, fallback_ssid())).ok();
    spawner.spawn(fallback_network_runner_task(runner)).ok();

    loop {
        if stack.is_link_up() {
            break;
        }
        Timer::after(Duration::from_millis(100)).await;
    }
    // Give some extra time
    Timer::after(Duration::from_millis(100)).await;

    Ok(stack)
}

/// SSID with a per-device suffix so neighbouring unconfigured strips stay
/// distinguishable.
fn fallback_ssid() -> String<32> {
    let mut ssid = String::new();
    let _ = write!(
        ssid,
        "{}-{:04X}",
        config::FALLBACK_AP.ssid_prefix,
        config::hardware_id()
    );
    ssid
}

/// Background task keeping the provisioning AP alive.
#[embassy_executor::task]
async fn fallback_ap_task(mut controller: WifiController<'static>, ssid: String<32>) {
    println!("fallback_ap: starting AP '{}'", ssid.as_str());

    let ap_config = AccessPointConfig::default()
        .with_ssid(ssid.as_str().into())
        .with_password(config::FALLBACK_AP.password.into())
        .with_auth_method(AuthMethod::Wpa2Personal);

    controller
        .set_config(&ModeConfig::AccessPoint(ap_config))
        .unwrap();
    controller.start_async().await.unwrap();

    println!("fallback_ap: AP started");

    // Keep the AP running
    loop {
        Timer::after(Duration::from_secs(60)).await;
    }
}

/// Background task for running the network stack
#[embassy_executor::task]
async fn fallback_network_runner_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await;
}
