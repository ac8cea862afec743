use core::fmt;
#[cfg(feature = "std")]
use std::error;

use crate::coap::{self, code};

/// The error type for the `security` module.
///
/// Only outbound processing and setup fail with these. Problems with a
/// received message's security end up in its
/// [`Classification`](super::Classification) instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No pre-shared key is known for this client identity.
    UnknownIdentity(u8),
    /// Identity 0 can't be assigned a key.
    ReservedIdentity,
    /// The key can't be used with HMAC.
    InvalidKey,
    /// The ciphertext has a bad length or padding.
    Decryption,
    /// The configuration is inconsistent, the message says how.
    InvalidConfig(&'static str),
    /// Wraps errors from the `coap` module.
    Coap(coap::Error),
}

impl Error {
    /// Returns the CoAP response code corresponding to this error.
    pub fn response_code(&self) -> u8 {
        match self {
            Error::Coap(e) => e.response_code(),
            Error::UnknownIdentity(_) => code::UNAUTHORIZED,
            _ => code::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<coap::Error> for Error {
    fn from(e: coap::Error) -> Error {
        Error::Coap(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnknownIdentity(identity) => {
                write!(f, "No pre-shared key for client identity {}", identity)
            }
            Error::ReservedIdentity => {
                write!(f, "Client identity 0 is reserved")
            }
            Error::InvalidKey => write!(f, "Key unusable for HMAC"),
            Error::Decryption => {
                write!(f, "Ciphertext length or padding is invalid")
            }
            Error::InvalidConfig(reason) => {
                write!(f, "Invalid configuration: {}", reason)
            }
            Error::Coap(e) => e.fmt(f),
        }
    }
}

#[cfg(feature = "std")]
impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Coap(e) => Some(e),
            _ => None,
        }
    }
}
