use embassy_net::Runner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver};
use embassy_time::{Duration, Timer};
use esp_println::println;
use esp_radio::wifi::{
    AuthMethod,
    ClientConfig,
    ModeConfig,
    WifiController,
    WifiDevice,
    WifiEvent,
    WifiStaState,
};
use heapless::Deque;

use ledstrip_core::{ConnectivityManager, LinkAction, LinkEvent};

use crate::config;

/// Link notifications for tasks that depend on connectivity.
#[derive(Debug, Clone, Copy)]
pub enum NetworkEvent {
    Up { first_run: bool },
    Down { reason: u8 },
}

const NETWORK_EVENT_DEPTH: usize = 4;

pub(crate) type NetworkEventReceiver =
    Receiver<'static, CriticalSectionRawMutex, NetworkEvent, NETWORK_EVENT_DEPTH>;

static NETWORK_EVENTS: Channel<CriticalSectionRawMutex, NetworkEvent, NETWORK_EVENT_DEPTH> =
    Channel::new();

pub(crate) fn network_event_receiver() -> NetworkEventReceiver {
    NETWORK_EVENTS.receiver()
}

type Manager =
    ConnectivityManager<{ config::WIFI_BACKOFF_FLOOR_MS }, { config::WIFI_BACKOFF_CEILING_MS }>;

/// Background task owning the station association lifecycle.
///
/// Drives the link state machine: events come from the radio driver and
/// retry timers, actions go back out as driver calls and `NetworkEvent`
/// notifications. Reconnect pacing comes from the machine's own backoff,
/// so a flapping access point does not turn into a connect storm.
#[embassy_executor::task]
pub async fn connectivity_task(mut controller: WifiController<'static>) {
    let mut manager = Manager::new();
    let mut pending: Deque<LinkEvent, 4> = Deque::new();
    let _ = pending.push_back(LinkEvent::StartRequested);

    loop {
        let Some(event) = pending.pop_front() else {
            // Nothing queued: the only spontaneous event left is link loss.
            // A drop can land while earlier actions are still in flight, and
            // wait_for_event discards pending edges before sleeping, so
            // re-check the radio state instead of waiting if the link is
            // already gone.
            if manager.is_connected()
                && esp_radio::wifi::sta_state() != WifiStaState::Connected
            {
                let _ = pending.push_back(LinkEvent::Disassociated { reason: 0 });
                continue;
            }
            controller.wait_for_event(WifiEvent::StaDisconnected).await;
            let _ = pending.push_back(LinkEvent::Disassociated { reason: 0 });
            continue;
        };

        for action in manager.handle(event) {
            match action {
                LinkAction::BeginAssociation => {
                    let outcome = associate(&mut controller).await;
                    let _ = pending.push_back(outcome);
                }
                LinkAction::ScheduleRetry {
                    after_ms,
                    generation,
                } => {
                    println!("network: retrying in {after_ms} ms");
                    Timer::after(Duration::from_millis(u64::from(after_ms))).await;
                    let _ = pending.push_back(LinkEvent::RetryTimerFired { generation });
                }
                LinkAction::NotifyUp { first_run } => {
                    println!("network: link up (first_run={first_run})");
                    NETWORK_EVENTS.send(NetworkEvent::Up { first_run }).await;
                }
                LinkAction::NotifyDown { reason } => {
                    println!("network: link down (reason={reason})");
                    NETWORK_EVENTS.send(NetworkEvent::Down { reason }).await;
                }
                LinkAction::StartFallbackAp | LinkAction::Halt => {
                    // Credentials are checked before this task is spawned,
                    // so provisioning never starts from here.
                    halt();
                }
            }
        }
    }
}

/// One association attempt against the configured access point.
async fn associate(controller: &mut WifiController<'static>) -> LinkEvent {
    if !matches!(controller.is_started(), Ok(true)) {
        let client_config = if config::WIFI.password.is_empty() {
            ClientConfig::default()
                .with_ssid(config::WIFI.ssid.into())
                .with_auth_method(AuthMethod::None)
        } else {
            ClientConfig::default()
                .with_ssid(config::WIFI.ssid.into())
                .with_password(config::WIFI.password.into())
        };
        let mode_config = ModeConfig::Client(client_config);
        controller.set_config(&mode_config).unwrap();
        controller.start_async().await.unwrap();
    }

    println!("network: connecting to '{}'", config::WIFI.ssid);
    match controller.connect_async().await {
        Ok(()) => LinkEvent::AssociationSucceeded,
        Err(e) => {
            println!("network: error connecting: {e:?}");
            LinkEvent::Disassociated { reason: 0 }
        }
    }
}

fn halt() -> ! {
    panic!("network: no viable path to service");
}

/// Background task for running the network stack
#[embassy_executor::task]
pub async fn network_runner_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await;
}
