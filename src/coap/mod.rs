//! The CoAP message codec.
//!
//! Converts between owned [`Message`]s and datagrams. The functions doing the
//! actual work are crate-internal, since messages are always sent and
//! received through the
//! [`SecurityEnvelope`](crate::security::SecurityEnvelope), which seals and
//! classifies them.

#[cfg_attr(tarpaulin, skip)]
mod error;
mod message;
pub mod option;
mod parse;
mod serialize;

pub use error::Error;
pub use message::{
    code, EncryptionAlgorithm, Message, MessageType, DEFAULT_MAX_AGE,
    ETAG_MAX_LEN, HEADER_LEN, TOKEN_MAX_LEN, VERSION,
};
pub use option::{Block, CoapOption};
pub(crate) use parse::{parse_message, Decoded};
pub(crate) use serialize::{serialize_message, Serialized};

/// The result type for the `coap` module.
pub type Result<T> = core::result::Result<T, Error>;

const VERSION_MASK: u8 = 0xC0;
const VERSION_POSITION: u8 = 6;
const TYPE_MASK: u8 = 0x30;
const TYPE_POSITION: u8 = 4;
const TOKEN_LEN_MASK: u8 = 0x0F;
