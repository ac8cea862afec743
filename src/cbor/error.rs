use core::fmt;
#[cfg(feature = "std")]
use std::error;

/// The error type for the `cbor` module.
///
/// Only provisioning blobs go through CBOR, so any failure means the blob is
/// unusable as a whole.
// TODO: Derive PartialEq as soon as serde_cbor does for its error type
#[derive(Debug)]
pub enum CborError {
    /// The blob isn't valid CBOR or doesn't match the expected structure.
    Malformed(serde_cbor::Error),
}

impl From<serde_cbor::Error> for CborError {
    fn from(e: serde_cbor::Error) -> CborError {
        CborError::Malformed(e)
    }
}

impl fmt::Display for CborError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CborError::Malformed(e) => {
                write!(f, "Malformed provisioning blob: {}", e)
            }
        }
    }
}

#[cfg(feature = "std")]
impl error::Error for CborError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            CborError::Malformed(e) => Some(e),
        }
    }
}
