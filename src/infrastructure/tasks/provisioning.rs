//! Stateless DHCP responder for the provisioning network.
//!
//! A phone joining the fallback AP expects an address without any external
//! infrastructure, so the firmware answers DISCOVER/REQUEST itself. Client
//! addresses are derived from the MAC, so no lease table is kept.

use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{Ipv4Address, Stack};
use esp_println::println;

use crate::infrastructure::drivers::wifi_ap::FALLBACK_AP_ADDRESS;

const SERVER_PORT: u16 = 67;
const CLIENT_PORT: u16 = 68;

const BOOTREQUEST: u8 = 1;
const BOOTREPLY: u8 = 2;

const MSG_DISCOVER: u8 = 1;
const MSG_OFFER: u8 = 2;
const MSG_REQUEST: u8 = 3;
const MSG_ACK: u8 = 5;

const OPT_SUBNET_MASK: u8 = 1;
const OPT_ROUTER: u8 = 3;
const OPT_DNS: u8 = 6;
const OPT_LEASE_TIME: u8 = 51;
const OPT_MESSAGE_TYPE: u8 = 53;
const OPT_SERVER_ID: u8 = 54;
const OPT_END: u8 = 255;

const MAGIC_COOKIE: [u8; 4] = [99, 130, 83, 99];
const LEASE_SECS: u32 = 3600;
const SUBNET_MASK: Ipv4Address = Ipv4Address::new(255, 255, 255, 0);

/// Fixed-layout BOOTP part of the frame plus the magic cookie.
const MIN_FRAME_LEN: usize = 240;

struct Lease {
    xid: [u8; 4],
    client_mac: [u8; 6],
    reply_type: u8,
}

/// Answers DHCP on the provisioning network.
#[embassy_executor::task]
pub async fn dhcp_server_task(stack: Stack<'static>) {
    let mut rx_meta = [PacketMetadata::EMPTY; 8];
    let mut rx_buffer = [0u8; 1024];
    let mut tx_meta = [PacketMetadata::EMPTY; 8];
    let mut tx_buffer = [0u8; 1024];

    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );

    if let Err(e) = socket.bind(SERVER_PORT) {
        println!("dhcp: failed to bind port {}: {:?}", SERVER_PORT, e);
        return;
    }
    println!("dhcp: listening on port {}", SERVER_PORT);

    let mut frame = [0u8; 576];

    loop {
        match socket.recv_from(&mut frame).await {
            Ok((len, _remote)) => {
                let Some(lease) = classify(&frame[..len]) else {
                    continue;
                };

                let reply_len = encode_reply(&lease, &mut frame);
                let dest = (Ipv4Address::BROADCAST, CLIENT_PORT);
                if let Err(e) = socket.send_to(&frame[..reply_len], dest).await {
                    println!("dhcp: send error: {:?}", e);
                }
            }
            Err(e) => {
                println!("dhcp: recv error: {:?}", e);
            }
        }
    }
}

/// Inspect an incoming frame and decide the reply, if any.
fn classify(frame: &[u8]) -> Option<Lease> {
    if frame.len() < MIN_FRAME_LEN || frame[0] != BOOTREQUEST {
        return None;
    }
    if frame[236..240] != MAGIC_COOKIE {
        return None;
    }

    let message_type = option_value(&frame[240..], OPT_MESSAGE_TYPE)?.first().copied()?;
    let reply_type = match message_type {
        MSG_DISCOVER => MSG_OFFER,
        MSG_REQUEST => MSG_ACK,
        _ => return None,
    };

    let mut xid = [0u8; 4];
    xid.copy_from_slice(&frame[4..8]);
    let mut client_mac = [0u8; 6];
    client_mac.copy_from_slice(&frame[28..34]);

    Some(Lease {
        xid,
        client_mac,
        reply_type,
    })
}

/// Derive a stable client address from the MAC, in .2 through .50.
fn lease_address(mac: &[u8; 6]) -> Ipv4Address {
    let host = (mac[5] % 49) + 2;
    Ipv4Address::new(192, 168, 4, host)
}

/// Build the OFFER/ACK reply in place. Returns the reply length.
fn encode_reply(lease: &Lease, buffer: &mut [u8]) -> usize {
    buffer.fill(0);

    buffer[0] = BOOTREPLY;
    buffer[1] = 1; // htype: ethernet
    buffer[2] = 6; // hlen
    buffer[4..8].copy_from_slice(&lease.xid);
    buffer[10..12].copy_from_slice(&[0x80, 0x00]); // broadcast flag
    buffer[16..20].copy_from_slice(&lease_address(&lease.client_mac).octets());
    buffer[20..24].copy_from_slice(&FALLBACK_AP_ADDRESS.octets());
    buffer[28..34].copy_from_slice(&lease.client_mac);
    buffer[236..240].copy_from_slice(&MAGIC_COOKIE);

    let mut at = MIN_FRAME_LEN;
    at = put_option(buffer, at, OPT_MESSAGE_TYPE, &[lease.reply_type]);
    at = put_option(buffer, at, OPT_SERVER_ID, &FALLBACK_AP_ADDRESS.octets());
    at = put_option(buffer, at, OPT_LEASE_TIME, &LEASE_SECS.to_be_bytes());
    at = put_option(buffer, at, OPT_SUBNET_MASK, &SUBNET_MASK.octets());
    at = put_option(buffer, at, OPT_ROUTER, &FALLBACK_AP_ADDRESS.octets());
    at = put_option(buffer, at, OPT_DNS, &FALLBACK_AP_ADDRESS.octets());
    buffer[at] = OPT_END;
    at + 1
}

fn put_option(buffer: &mut [u8], at: usize, code: u8, value: &[u8]) -> usize {
    buffer[at] = code;
    buffer[at + 1] = value.len() as u8;
    buffer[at + 2..at + 2 + value.len()].copy_from_slice(value);
    at + 2 + value.len()
}

/// Scan the options section for a code. The slice starts after the magic
/// cookie.
fn option_value(options: &[u8], wanted: u8) -> Option<&[u8]> {
    let mut i = 0;

    while i < options.len() {
        let code = options[i];
        if code == OPT_END {
            break;
        }
        if code == 0 {
            // Padding
            i += 1;
            continue;
        }
        if i + 1 >= options.len() {
            break;
        }
        let len = options[i + 1] as usize;
        if i + 2 + len > options.len() {
            break;
        }
        if code == wanted {
            return Some(&options[i + 2..i + 2 + len]);
        }
        i += 2 + len;
    }
    None
}
