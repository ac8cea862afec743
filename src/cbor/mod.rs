//! Helpful functionality around the `serde_cbor` crate, used for the
//! provisioning blobs (configuration and key table).

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};
use serde_cbor::de;

#[cfg_attr(tarpaulin, skip)]
mod error;
pub use error::CborError;

/// The result type for the `cbor` module.
pub type Result<T> = core::result::Result<T, CborError>;

/// Serializes an object into CBOR.
pub fn encode(object: &impl Serialize) -> Result<Vec<u8>> {
    Ok(serde_cbor::to_vec(object)?)
}

/// Deserializes a CBOR encoded object.
///
/// `serde_cbor` needs a mutable buffer when running without `std`, so the
/// bytes are copied into `tmp_vec` first.
///
/// # Arguments
/// * `bytes` - The CBOR encoded object.
/// * `tmp_vec` - Buffer used for deserialization.
pub fn decode<'a, T>(bytes: &[u8], tmp_vec: &'a mut Vec<u8>) -> Result<T>
where
    T: Deserialize<'a>,
{
    tmp_vec.clear();
    tmp_vec.extend_from_slice(bytes);

    Ok(de::from_mut_slice(tmp_vec)?)
}
