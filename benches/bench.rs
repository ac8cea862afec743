use coap_psk::{
    coap::{code, Message, MessageType},
    security::{
        crypto, KeyTable, MemoryStorage, SecurityEnvelope, SignatureScanner,
    },
    Config,
};
use criterion::{criterion_group, criterion_main, Criterion};

const PSK: [u8; 16] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B,
    0x0C, 0x0D, 0x0E, 0x0F,
];
const PAYLOAD: &[u8] = b"{\"temperature\":21.5,\"humidity\":40}";

type Envelope = SecurityEnvelope<KeyTable, SignatureScanner, MemoryStorage>;

fn envelope(config: Config) -> Envelope {
    let mut keys = KeyTable::new();
    keys.insert(1, &PSK).unwrap();
    SecurityEnvelope::new(
        config,
        keys,
        SignatureScanner::default(),
        MemoryStorage::new(),
    )
    .unwrap()
}

fn request() -> Message {
    let mut msg = Message::new(MessageType::Confirmable, code::POST, 0x5D1F);
    msg.set_token(&[0x74, 0x39]);
    msg.set_uri_host("localhost");
    msg.set_uri_path("sensors/climate");
    msg.set_uri_query("unit=c");
    msg.set_payload(PAYLOAD);
    msg
}

// Primitives -----------------------------------------------------------------

fn primitives(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives");
    let datagram = [0x42; 96];

    group.bench_function("hmac", |b| {
        b.iter(|| crypto::compute_tag(&PSK, &datagram, 40..48).unwrap())
    });
    group.bench_function("encrypt", |b| {
        b.iter(|| crypto::encrypt_payload(&PSK, PAYLOAD))
    });
    let ciphertext = crypto::encrypt_payload(&PSK, PAYLOAD);
    group.bench_function("decrypt", |b| {
        b.iter(|| crypto::decrypt_payload(&PSK, &ciphertext).unwrap())
    });

    group.finish();
}

// Codec ----------------------------------------------------------------------

fn codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let msg = request();

    let mut plain = envelope(Config::unprotected());
    group.bench_function("serialize_plain", |b| {
        b.iter(|| plain.serialize(&msg).unwrap())
    });
    let bytes = plain.serialize(&msg).unwrap();
    group.bench_function("parse_plain", |b| {
        b.iter(|| plain.parse(&bytes).unwrap())
    });

    let mut sealed = envelope(Config::default());
    group.bench_function("serialize_sealed", |b| {
        b.iter(|| sealed.serialize(&msg).unwrap())
    });
    let bytes = sealed.serialize(&msg).unwrap();
    group.bench_function("parse_sealed", |b| {
        b.iter(|| sealed.parse(&bytes).unwrap())
    });
    group.bench_function("reseal", |b| {
        b.iter(|| sealed.reseal(&bytes, 1).unwrap())
    });

    group.finish();
}

// Criterion ------------------------------------------------------------------

criterion_group!(benches, primitives, codec);
criterion_main!(benches);
