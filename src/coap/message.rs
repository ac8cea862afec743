use alloc::vec::Vec;

use super::{
    option::{self, Block},
    Result,
};

/// The only protocol version there is.
pub const VERSION: u8 = 1;
/// Size of the fixed header.
pub const HEADER_LEN: usize = 4;
/// The maximum length of a token.
pub const TOKEN_MAX_LEN: usize = 8;
/// The maximum length of an ETag or If-Match value.
pub const ETAG_MAX_LEN: usize = 8;
/// Max-Age assumed when the option is absent.
pub const DEFAULT_MAX_AGE: u32 = 60;

/// Commonly used message codes, `class << 5 | detail`.
pub mod code {
    pub const EMPTY: u8 = 0x00;
    pub const GET: u8 = 0x01;
    pub const POST: u8 = 0x02;
    pub const PUT: u8 = 0x03;
    pub const DELETE: u8 = 0x04;

    pub const CREATED: u8 = 0x41;
    pub const DELETED: u8 = 0x42;
    pub const VALID: u8 = 0x43;
    pub const CHANGED: u8 = 0x44;
    pub const CONTENT: u8 = 0x45;

    pub const BAD_REQUEST: u8 = 0x80;
    pub const UNAUTHORIZED: u8 = 0x81;
    pub const BAD_OPTION: u8 = 0x82;
    pub const NOT_FOUND: u8 = 0x84;

    pub const INTERNAL_SERVER_ERROR: u8 = 0xA0;
    pub const PROXYING_NOT_SUPPORTED: u8 = 0xA5;
}

/// The message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Confirmable,
    NonConfirmable,
    Acknowledgement,
    Reset,
}

impl Default for MessageType {
    fn default() -> MessageType {
        MessageType::Confirmable
    }
}

impl From<u8> for MessageType {
    /// Takes the two least significant bits.
    fn from(bits: u8) -> MessageType {
        match bits & 0x03 {
            0 => MessageType::Confirmable,
            1 => MessageType::NonConfirmable,
            2 => MessageType::Acknowledgement,
            _ => MessageType::Reset,
        }
    }
}

impl From<MessageType> for u8 {
    fn from(msg_type: MessageType) -> u8 {
        match msg_type {
            MessageType::Confirmable => 0,
            MessageType::NonConfirmable => 1,
            MessageType::Acknowledgement => 2,
            MessageType::Reset => 3,
        }
    }
}

/// The value of the Encryption-Algorithm option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionAlgorithm {
    /// Payload is plaintext.
    None,
    /// AES-128 on independent blocks with padding.
    Aes128Padded,
    /// An indicator this implementation doesn't know.
    Unknown(u8),
}

impl From<u8> for EncryptionAlgorithm {
    fn from(id: u8) -> EncryptionAlgorithm {
        match id {
            0 => EncryptionAlgorithm::None,
            1 => EncryptionAlgorithm::Aes128Padded,
            n => EncryptionAlgorithm::Unknown(n),
        }
    }
}

impl From<EncryptionAlgorithm> for u8 {
    fn from(alg: EncryptionAlgorithm) -> u8 {
        match alg {
            EncryptionAlgorithm::None => 0,
            EncryptionAlgorithm::Aes128Padded => 1,
            EncryptionAlgorithm::Unknown(n) => n,
        }
    }
}

/// A CoAP message with the options this node understands.
///
/// All values are owned. Repeatable string options are kept joined by their
/// separator, e.g. the Uri-Path `/a/b` is stored as `a/b`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub msg_type: MessageType,
    pub code: u8,
    pub message_id: u16,
    pub(crate) token: Vec<u8>,
    pub(crate) if_match: Option<Vec<u8>>,
    pub(crate) uri_host: Option<Vec<u8>>,
    pub(crate) etag: Option<Vec<u8>>,
    pub(crate) if_none_match: bool,
    pub(crate) observe: Option<u32>,
    pub(crate) uri_port: Option<u16>,
    pub(crate) location_path: Option<Vec<u8>>,
    pub(crate) uri_path: Option<Vec<u8>>,
    pub(crate) content_format: Option<u16>,
    pub(crate) max_age: Option<u32>,
    pub(crate) uri_query: Option<Vec<u8>>,
    pub(crate) accept: Option<u16>,
    pub(crate) location_query: Option<Vec<u8>>,
    pub(crate) block2: Option<Block>,
    pub(crate) block1: Option<Block>,
    pub(crate) size2: Option<u32>,
    pub(crate) size1: Option<u32>,
    pub(crate) client_identity: Option<u8>,
    pub(crate) boot_counter: Option<u16>,
    pub(crate) retransmission_counter: Option<u8>,
    pub(crate) hmac: Option<Vec<u8>>,
    pub(crate) encryption: Option<EncryptionAlgorithm>,
    pub(crate) payload: Vec<u8>,
}

impl Message {
    /// Creates a message without token, options or payload.
    pub fn new(msg_type: MessageType, code: u8, message_id: u16) -> Message {
        Message {
            msg_type,
            code,
            message_id,
            ..Default::default()
        }
    }

    /// Sets the token, keeping at most 8 bytes, and returns its length.
    pub fn set_token(&mut self, token: &[u8]) -> usize {
        let len = token.len().min(TOKEN_MAX_LEN);
        self.token = token[..len].to_vec();
        len
    }

    pub fn token(&self) -> &[u8] {
        &self.token
    }

    /// Sets If-Match, keeping at most 8 bytes, and returns its length.
    pub fn set_if_match(&mut self, etag: &[u8]) -> usize {
        let len = etag.len().min(ETAG_MAX_LEN);
        self.if_match = Some(etag[..len].to_vec());
        len
    }

    pub fn if_match(&self) -> Option<&[u8]> {
        self.if_match.as_deref()
    }

    pub fn set_uri_host(&mut self, host: &str) {
        self.uri_host = Some(host.as_bytes().to_vec());
    }

    pub fn uri_host(&self) -> Option<&[u8]> {
        self.uri_host.as_deref()
    }

    /// Sets the ETag, keeping at most 8 bytes, and returns its length.
    pub fn set_etag(&mut self, etag: &[u8]) -> usize {
        let len = etag.len().min(ETAG_MAX_LEN);
        self.etag = Some(etag[..len].to_vec());
        len
    }

    pub fn etag(&self) -> Option<&[u8]> {
        self.etag.as_deref()
    }

    pub fn set_if_none_match(&mut self) {
        self.if_none_match = true;
    }

    pub fn if_none_match(&self) -> bool {
        self.if_none_match
    }

    pub fn set_observe(&mut self, observe: u32) {
        self.observe = Some(observe);
    }

    pub fn observe(&self) -> Option<u32> {
        self.observe
    }

    pub fn set_uri_port(&mut self, port: u16) {
        self.uri_port = Some(port);
    }

    pub fn uri_port(&self) -> Option<u16> {
        self.uri_port
    }

    /// Sets the Location-Path, dropping leading slashes.
    ///
    /// A `?` splits off the Location-Query. The path option is only set when
    /// something remains before it.
    pub fn set_location_path(&mut self, path: &str) {
        let path = path.trim_start_matches('/');
        let path = match path.find('?') {
            Some(i) => {
                self.set_location_query(&path[i + 1..]);
                &path[..i]
            }
            None => path,
        };
        if !path.is_empty() {
            self.location_path = Some(path.as_bytes().to_vec());
        }
    }

    pub fn location_path(&self) -> Option<&[u8]> {
        self.location_path.as_deref()
    }

    /// Sets the Uri-Path, dropping leading slashes.
    pub fn set_uri_path(&mut self, path: &str) {
        self.uri_path = Some(path.trim_start_matches('/').as_bytes().to_vec());
    }

    pub fn uri_path(&self) -> Option<&[u8]> {
        self.uri_path.as_deref()
    }

    pub fn set_content_format(&mut self, format: u16) {
        self.content_format = Some(format);
    }

    pub fn content_format(&self) -> Option<u16> {
        self.content_format
    }

    pub fn set_max_age(&mut self, age: u32) {
        self.max_age = Some(age);
    }

    /// Returns Max-Age, or the default of 60 seconds if absent.
    pub fn max_age(&self) -> u32 {
        self.max_age.unwrap_or(DEFAULT_MAX_AGE)
    }

    /// Sets the Uri-Query, dropping a leading question mark.
    pub fn set_uri_query(&mut self, query: &str) {
        self.uri_query =
            Some(query.trim_start_matches('?').as_bytes().to_vec());
    }

    pub fn uri_query(&self) -> Option<&[u8]> {
        self.uri_query.as_deref()
    }

    pub fn set_accept(&mut self, format: u16) {
        self.accept = Some(format);
    }

    pub fn accept(&self) -> Option<u16> {
        self.accept
    }

    /// Sets the Location-Query, dropping a leading question mark.
    pub fn set_location_query(&mut self, query: &str) {
        self.location_query =
            Some(query.trim_start_matches('?').as_bytes().to_vec());
    }

    pub fn location_query(&self) -> Option<&[u8]> {
        self.location_query.as_deref()
    }

    pub fn set_block2(
        &mut self,
        num: u32,
        more: bool,
        size: u16,
    ) -> Result<()> {
        self.block2 = Some(Block::new(num, more, size)?);
        Ok(())
    }

    pub fn block2(&self) -> Option<Block> {
        self.block2
    }

    pub fn set_block1(
        &mut self,
        num: u32,
        more: bool,
        size: u16,
    ) -> Result<()> {
        self.block1 = Some(Block::new(num, more, size)?);
        Ok(())
    }

    pub fn block1(&self) -> Option<Block> {
        self.block1
    }

    pub fn set_size2(&mut self, size: u32) {
        self.size2 = Some(size);
    }

    pub fn size2(&self) -> Option<u32> {
        self.size2
    }

    pub fn set_size1(&mut self, size: u32) {
        self.size1 = Some(size);
    }

    pub fn size1(&self) -> Option<u32> {
        self.size1
    }

    /// Selects the pre-shared key used when the message is sealed, instead
    /// of the configured default identity.
    pub fn set_client_identity(&mut self, identity: u8) {
        self.client_identity = Some(identity);
    }

    pub fn client_identity(&self) -> Option<u8> {
        self.client_identity
    }

    pub fn boot_counter(&self) -> Option<u16> {
        self.boot_counter
    }

    pub fn retransmission_counter(&self) -> Option<u8> {
        self.retransmission_counter
    }

    /// Returns the received integrity tag.
    pub fn hmac(&self) -> Option<&[u8]> {
        self.hmac.as_deref()
    }

    /// Returns the encryption indicator as received. It is cleared once the
    /// payload has been decrypted.
    pub fn encryption(&self) -> Option<EncryptionAlgorithm> {
        self.encryption
    }

    pub fn set_payload(&mut self, payload: &[u8]) {
        self.payload = payload.to_vec();
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Looks up `name=value` in the Uri-Query.
    pub fn query_variable(&self, name: &str) -> Option<&[u8]> {
        self.uri_query
            .as_deref()
            .and_then(|query| option::get_variable(query, name))
    }

    /// Looks up `name=value` in a form-encoded payload.
    pub fn post_variable(&self, name: &str) -> Option<&[u8]> {
        option::get_variable(&self.payload, name)
    }
}
