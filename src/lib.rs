//! A [CoAP](https://tools.ietf.org/html/rfc7252) message codec with a
//! pre-shared-key security envelope, intended for embedded devices.
//!
//! Messages are serialized and parsed through a
//! [`SecurityEnvelope`](security::SecurityEnvelope). On the way out, it
//! attaches the client identity and replay counters, encrypts the payload
//! with AES-128 and tags the datagram with a truncated HMAC-SHA-256. On the
//! way in, it verifies the tag, decrypts and inspects the payload and
//! returns a [`Classification`](security::Classification) along with the
//! message, leaving the decision what to trust to the application.
//!
//! Integrity, encryption and inspection can be switched off individually
//! through the [`Config`], with everything off resulting in plain CoAP.
//!
//! ## Security
//! Tags and ciphertexts don't depend on a nonce, and replay detection is up
//! to the receiving gateway. Use DTLS or OSCORE where that's not acceptable.

#![no_std]
#[macro_use]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod cbor;

pub mod coap;
pub mod config;
pub mod security;
pub mod transport;

pub use cbor::CborError;
pub use config::Config;
