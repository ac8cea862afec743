use std::{collections::VecDeque, env, error::Error};

use coap_psk::{
    coap::{code, Message, MessageType},
    security::{
        FileStorage, KeyTable, MemoryStorage, SecurityEnvelope,
        SignatureScanner,
    },
    transport::{self, MessageIds, Transport},
    Config,
};
use log::{info, warn};

const PSK_1: [u8; 16] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B,
    0x0C, 0x0D, 0x0E, 0x0F,
];
const PSK_2: [u8; 16] = [
    0x0F, 0x0E, 0x0D, 0x0C, 0x0B, 0x0A, 0x09, 0x08, 0x07, 0x06, 0x05, 0x04,
    0x03, 0x02, 0x01, 0x00,
];

/// Hands datagrams straight to the receiving side.
#[derive(Default)]
struct Loopback {
    queue: VecDeque<Vec<u8>>,
}

impl Transport for Loopback {
    type Address = &'static str;
    type Error = std::convert::Infallible;

    fn send(
        &mut self,
        address: &&'static str,
        port: u16,
        datagram: &[u8],
    ) -> Result<(), Self::Error> {
        info!("-> [{}]:{} {}", address, port, hex(datagram));
        self.queue.push_back(datagram.to_vec());
        Ok(())
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    // Both sides are provisioned with the same key table
    let mut keys = KeyTable::new();
    keys.insert(1, &PSK_1)?;
    keys.insert(2, &PSK_2)?;
    let provisioned = keys.to_cbor()?;

    // Node ---------------------------------------------------------------
    let counter_file = env::temp_dir().join("coap-psk-demo-boot-counter");
    let mut node = SecurityEnvelope::new(
        Config::default(),
        KeyTable::from_cbor(&provisioned)?,
        SignatureScanner::default(),
        FileStorage::new(counter_file),
    )?;
    let boot_counter = node.init_connection();
    info!("Node booted, boot counter {}", boot_counter);

    // Gateway ------------------------------------------------------------
    let gateway = SecurityEnvelope::new(
        Config::default(),
        KeyTable::from_cbor(&provisioned)?,
        SignatureScanner::default(),
        MemoryStorage::new(),
    )?;

    let mut ids = MessageIds::new(0x5D00);
    let mut transport = Loopback::default();

    let mut request =
        Message::new(MessageType::Confirmable, code::POST, ids.next_id());
    request.set_token(&[0x74, 0x39]);
    request.set_uri_path("/sensors/climate");
    request.set_uri_query("unit=c");
    request.set_payload(b"temperature=21.5&humidity=40");
    let datagram = node.serialize(&request)?;

    // First transmission, then a retransmission after a lost ACK
    for counter in 0..2 {
        transport::send_message_with_counter(
            &mut node,
            &mut transport,
            &"fd00::1",
            5683,
            &datagram,
            counter,
        )?;
    }

    // A payload the inspector flags
    let mut flagged =
        Message::new(MessageType::NonConfirmable, code::PUT, ids.next_id());
    flagged.set_client_identity(2);
    flagged.set_uri_path("firmware");
    flagged.set_payload(b"X5O!P%@AP[4\\PZX54(P^)7CC)7}$EICAR");
    transport.send(&"fd00::1", 5683, &node.serialize(&flagged)?)?;

    while let Some(received) = transport.queue.pop_front() {
        let (message, classification) = gateway.parse(&received)?;
        let temperature = message
            .post_variable("temperature")
            .map(String::from_utf8_lossy);
        info!(
            "<- MID {:#06X}, retransmission {:?}: {} ({})",
            message.message_id,
            message.retransmission_counter(),
            classification,
            u8::from(classification)
        );
        if classification.is_trusted() {
            info!("   temperature {:?}", temperature);
        } else {
            warn!("   dropped");
        }
    }

    Ok(())
}
