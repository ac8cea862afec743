use coap_psk::{
    coap::{self, code, EncryptionAlgorithm, Message, MessageType},
    security::{
        Classification, Error, KeyTable, MemoryStorage, SecurityEnvelope,
        SignatureScanner,
    },
    Config,
};

const PSK_1: [u8; 16] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B,
    0x0C, 0x0D, 0x0E, 0x0F,
];
const PSK_2: [u8; 16] = [
    0x0F, 0x0E, 0x0D, 0x0C, 0x0B, 0x0A, 0x09, 0x08, 0x07, 0x06, 0x05, 0x04,
    0x03, 0x02, 0x01, 0x00,
];

type Envelope = SecurityEnvelope<KeyTable, SignatureScanner, MemoryStorage>;

fn envelope(config: Config) -> Envelope {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut keys = KeyTable::new();
    keys.insert(1, &PSK_1).unwrap();
    keys.insert(2, &PSK_2).unwrap();
    SecurityEnvelope::new(
        config,
        keys,
        SignatureScanner::default(),
        MemoryStorage::with_value(100),
    )
    .unwrap()
}

fn get() -> Message {
    let mut msg = Message::new(MessageType::Confirmable, code::GET, 0x0001);
    msg.set_token(&[0x01]);
    msg.set_uri_path("a/b");
    msg.set_client_identity(1);
    msg
}

#[test]
fn plain_get() {
    let mut client = envelope(Config::unprotected());
    let server = envelope(Config::unprotected());

    let bytes = client.serialize(&get()).unwrap();
    let (msg, classification) = server.parse(&bytes).unwrap();
    assert_eq!(Classification::Ok, classification);
    assert_eq!(get(), msg);
    assert_eq!(Some(&b"a/b"[..]), msg.uri_path());
}

#[test]
fn encrypted_payload() {
    let config = Config {
        integrity: false,
        ..Config::default()
    };
    let mut client = envelope(config.clone());
    let server = envelope(config);

    let mut msg = get();
    msg.set_payload(b"hello");
    let bytes = client.serialize(&msg).unwrap();

    // The wire payload is the ciphertext
    let plain = envelope(Config::unprotected());
    let (wire, _) = plain.parse(&bytes).unwrap();
    assert_eq!(16, wire.payload().len());
    assert_eq!(0, wire.payload().len() % 16);
    assert!(bytes.ends_with(wire.payload()));
    assert_eq!(Some(EncryptionAlgorithm::Aes128Padded), wire.encryption());
    assert_ne!(&b"hello"[..], &wire.payload()[..5]);

    let (msg, classification) = server.parse(&bytes).unwrap();
    assert_eq!(&b"hello"[..], msg.payload());
    assert_eq!(Classification::Ok, classification);
}

#[test]
fn sealed_request() {
    let mut client = envelope(Config::default());
    let server = envelope(Config::default());
    client.init_connection();

    let mut msg = get();
    msg.code = code::POST;
    msg.set_uri_query("unit=c");
    msg.set_payload(b"temperature=21.5");
    let bytes = client.serialize(&msg).unwrap();

    let (received, classification) = server.parse(&bytes).unwrap();
    assert!(classification.is_trusted());
    assert_eq!(Classification::Ok, classification);
    assert_eq!(Some(101), received.boot_counter());
    assert_eq!(Some(1), received.retransmission_counter());
    assert_eq!(Some(&b"21.5"[..]), received.post_variable("temperature"));
    assert_eq!(Some(&b"c"[..]), received.query_variable("unit"));
}

#[test]
fn bit_flips() {
    let config = Config {
        encryption: false,
        ..Config::default()
    };
    let mut client = envelope(config.clone());
    let server = envelope(config);

    let mut msg = get();
    msg.set_payload(b"hello");
    let bytes = client.serialize(&msg).unwrap();
    let tag = server.parse(&bytes).unwrap().0.hmac().unwrap().to_vec();
    let tag_start = bytes
        .windows(tag.len())
        .position(|w| w == &tag[..])
        .unwrap();

    for i in (0..bytes.len()).filter(|&i| i < tag_start || i >= tag_start + 8)
    {
        for bit in 0..8 {
            let mut flipped = bytes.clone();
            flipped[i] ^= 1 << bit;
            // Either malformed or not trusted anymore
            if let Ok((_, classification)) = server.parse(&flipped) {
                assert!(!classification.tag_valid(), "byte {} bit {}", i, bit);
            }
        }
    }
}

#[test]
fn foreign_key() {
    let mut client = envelope(Config::default());
    let mut msg = get();
    msg.set_payload(b"hello");
    let bytes = client.serialize(&msg).unwrap();

    // The gateway has a different key for identity 1
    let mut keys = KeyTable::new();
    keys.insert(1, &PSK_2).unwrap();
    let server = SecurityEnvelope::new(
        Config::default(),
        keys,
        SignatureScanner::default(),
        MemoryStorage::new(),
    )
    .unwrap();
    let (_, classification) = server.parse(&bytes).unwrap();
    assert!(!classification.tag_valid());
    assert!(!classification.is_trusted());
}

#[test]
fn malformed() {
    let server = envelope(Config::default());

    // Unknown critical option 9
    let result = server.parse(&[0x40, 0x01, 0x00, 0x01, 0x90]);
    assert_eq!(Err(Error::Coap(coap::Error::BadOption(9))), result);
    assert_eq!(code::BAD_OPTION, result.unwrap_err().response_code());

    // Proxy-Scheme
    let result = server.parse(&[0x40, 0x01, 0x00, 0x01, 0xD1, 26, b'x']);
    assert_eq!(
        code::PROXYING_NOT_SUPPORTED,
        result.unwrap_err().response_code()
    );

    // Version 2
    let result = server.parse(&[0x81, 0x01, 0x00, 0x01, 0x01]);
    assert_eq!(code::BAD_REQUEST, result.unwrap_err().response_code());
}

#[test]
fn header_too_large() {
    let mut client = envelope(Config::default());
    let mut msg = get();
    msg.set_uri_host(&"gateway.example.com".repeat(5));
    let result = client.serialize(&msg);
    assert_eq!(Err(Error::Coap(coap::Error::HeaderTooLarge)), result);
    assert_eq!(
        code::INTERNAL_SERVER_ERROR,
        result.unwrap_err().response_code()
    );
}

#[test]
fn empty_message() {
    let mut client = envelope(Config::default());
    let server = envelope(Config::default());
    let ack = Message::new(MessageType::Acknowledgement, code::EMPTY, 0x0001);

    let bytes = client.serialize(&ack).unwrap();
    assert_eq!(vec![0x60, 0x00, 0x00, 0x01], bytes);
    // Nothing to verify
    let (msg, classification) = server.parse(&bytes).unwrap();
    assert_eq!(ack, msg);
    assert_eq!(Classification::EncryptedTagInvalid, classification);
}

#[test]
fn retransmission() {
    let mut client = envelope(Config::default());
    let server = envelope(Config::default());
    let mut msg = get();
    msg.set_payload(b"hello");

    let first = client.serialize(&msg).unwrap();
    let again = client.reseal(&first, 4).unwrap();
    let direct = client.serialize_with_counter(&msg, 4).unwrap();

    let (received, classification) = server.parse(&again).unwrap();
    assert_eq!(Classification::Ok, classification);
    assert_eq!(Some(5), received.retransmission_counter());
    assert_eq!(direct, again);
}
