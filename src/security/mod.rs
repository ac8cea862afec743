//! The pre-shared-key security envelope.
//!
//! Integrity is provided by a truncated HMAC-SHA-256 over the datagram,
//! confidentiality by AES-128 on the payload. Client identity, boot counter
//! and retransmission counter travel as options, so a gateway can detect
//! replays.

mod classification;
mod counter;
pub mod crypto;
mod envelope;
#[cfg_attr(tarpaulin, skip)]
mod error;
mod inspect;
mod keys;
#[cfg(test)]
mod test_vectors;

pub use classification::Classification;
#[cfg(feature = "std")]
pub use counter::FileStorage;
pub use counter::{
    CounterStorage, MemoryStorage, ReplayCounterStore, StorageError,
};
pub use envelope::SecurityEnvelope;
pub use error::Error;
pub use inspect::{PayloadInspector, SignatureScanner, DEFAULT_SIGNATURE};
pub use keys::{KeyLookup, KeyTable, PresharedKey, RESERVED_IDENTITY};

/// The result type for the `security` module.
pub type Result<T> = core::result::Result<T, Error>;
