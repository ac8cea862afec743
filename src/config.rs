//! Runtime configuration of the codec and the security envelope.

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::{
    cbor,
    coap::{HEADER_LEN, TOKEN_MAX_LEN},
    security::{self, crypto::DIGEST_LEN, RESERVED_IDENTITY},
};

pub const DEFAULT_CLIENT_IDENTITY: u8 = 1;
pub const DEFAULT_TAG_LEN: usize = 8;
pub const DEFAULT_MAX_HEADER_SIZE: usize = 96;
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 256;
pub const DEFAULT_BOOT_COUNTER_CACHE_READS: u16 = 100;

/// Feature switches and limits.
///
/// Missing fields take their default when decoding, so a provisioning blob
/// only needs to contain what differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Attach and verify the HMAC tag and the replay counters.
    pub integrity: bool,
    /// Encrypt outgoing and decrypt incoming payloads.
    pub encryption: bool,
    /// Inspect incoming payloads.
    pub inspection: bool,
    /// The identity whose key seals outgoing messages by default.
    pub client_identity: u8,
    /// Length of the truncated tag on the wire.
    pub tag_len: usize,
    /// Limit for header, token and options together.
    pub max_header_size: usize,
    /// Limit for a plaintext payload.
    pub max_chunk_size: usize,
    /// Boot counter reads served from memory before it's incremented.
    pub boot_counter_cache_reads: u16,
    /// Counts an empty payload as encrypted, as deployed nodes do.
    pub empty_payload_is_encrypted: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            integrity: true,
            encryption: true,
            inspection: true,
            client_identity: DEFAULT_CLIENT_IDENTITY,
            tag_len: DEFAULT_TAG_LEN,
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            boot_counter_cache_reads: DEFAULT_BOOT_COUNTER_CACHE_READS,
            empty_payload_is_encrypted: true,
        }
    }
}

impl Config {
    /// Returns the default limits with integrity, encryption and inspection
    /// turned off, i.e. plain CoAP.
    pub fn unprotected() -> Config {
        Config {
            integrity: false,
            encryption: false,
            inspection: false,
            ..Config::default()
        }
    }

    /// Checks that the values can work together.
    pub fn validate(&self) -> security::Result<()> {
        if self.tag_len == 0 || self.tag_len > DIGEST_LEN {
            return Err(security::Error::InvalidConfig(
                "Tag length must be between 1 and 32 bytes",
            ));
        }
        if (self.integrity || self.encryption)
            && self.client_identity == RESERVED_IDENTITY
        {
            return Err(security::Error::InvalidConfig(
                "Client identity 0 is reserved",
            ));
        }
        if self.max_header_size < HEADER_LEN + TOKEN_MAX_LEN {
            return Err(security::Error::InvalidConfig(
                "Maximum header size can't hold header and token",
            ));
        }

        Ok(())
    }

    /// Decodes and validates a configuration provisioned as CBOR.
    pub fn from_cbor(bytes: &[u8]) -> security::Result<Config> {
        let mut tmp_vec = Vec::new();
        let config: Config = cbor::decode(bytes, &mut tmp_vec).map_err(|_| {
            security::Error::InvalidConfig("Malformed configuration")
        })?;
        config.validate()?;

        Ok(config)
    }

    /// Encodes the configuration as CBOR.
    pub fn to_cbor(&self) -> cbor::Result<Vec<u8>> {
        cbor::encode(self)
    }
}
