use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

use super::{error::Error, Result};
use crate::cbor;

/// The client identity that never has a key.
pub const RESERVED_IDENTITY: u8 = 0;

/// A pre-shared key.
///
/// Used for HMAC as is and for AES-128 after normalization to 16 bytes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresharedKey(#[serde(with = "serde_bytes")] Vec<u8>);

impl PresharedKey {
    pub fn new(key: &[u8]) -> PresharedKey {
        PresharedKey(key.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PresharedKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PresharedKey({} B)", self.0.len())
    }
}

/// Finds the pre-shared key of a client identity.
pub trait KeyLookup {
    fn lookup(&self, identity: u8) -> Option<&PresharedKey>;
}

impl<K: KeyLookup + ?Sized> KeyLookup for &K {
    fn lookup(&self, identity: u8) -> Option<&PresharedKey> {
        (**self).lookup(identity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct KeyEntry {
    identity: u8,
    key: PresharedKey,
}

/// A static table of client identities and their keys, which can be
/// provisioned as CBOR.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTable {
    entries: Vec<KeyEntry>,
}

impl KeyTable {
    pub fn new() -> KeyTable {
        KeyTable::default()
    }

    /// Adds the key of an identity, replacing the one it had.
    pub fn insert(&mut self, identity: u8, key: &[u8]) -> Result<()> {
        if identity == RESERVED_IDENTITY {
            return Err(Error::ReservedIdentity);
        }

        let key = PresharedKey::new(key);
        match self.entries.iter_mut().find(|e| e.identity == identity) {
            Some(entry) => entry.key = key,
            None => self.entries.push(KeyEntry { identity, key }),
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decodes a table provisioned as CBOR.
    ///
    /// Entries for the reserved identity are refused.
    pub fn from_cbor(bytes: &[u8]) -> Result<KeyTable> {
        let mut tmp_vec = Vec::new();
        let decoded: KeyTable = cbor::decode(bytes, &mut tmp_vec)
            .map_err(|_| Error::InvalidConfig("Malformed key table"))?;
        if decoded.lookup_entry(RESERVED_IDENTITY).is_some() {
            return Err(Error::ReservedIdentity);
        }

        Ok(decoded)
    }

    /// Encodes the table as CBOR.
    pub fn to_cbor(&self) -> cbor::Result<Vec<u8>> {
        cbor::encode(self)
    }

    fn lookup_entry(&self, identity: u8) -> Option<&KeyEntry> {
        self.entries.iter().find(|e| e.identity == identity)
    }
}

impl KeyLookup for KeyTable {
    fn lookup(&self, identity: u8) -> Option<&PresharedKey> {
        if identity == RESERVED_IDENTITY {
            return None;
        }
        self.lookup_entry(identity).map(|e| &e.key)
    }
}
