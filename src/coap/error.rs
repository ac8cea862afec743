use core::fmt;
#[cfg(feature = "std")]
use std::error;

use super::message::code;

/// The error type for the `coap` module.
///
/// Every variant is local to the call that produced it and maps to the CoAP
/// response code a server would answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The datagram is malformed, the message says how.
    BadRequest(&'static str),
    /// The datagram contains an unrecognized critical option.
    BadOption(u16),
    /// The datagram contains Proxy-Uri or Proxy-Scheme, which this node
    /// never forwards.
    ProxyingNotSupported,
    /// Header, token and options don't fit into the maximum header size.
    HeaderTooLarge,
    /// A block option was set with parameters outside the allowed range.
    InvalidBlock,
}

impl Error {
    /// Returns the CoAP response code corresponding to this error.
    pub fn response_code(&self) -> u8 {
        match self {
            Error::BadRequest(_) => code::BAD_REQUEST,
            Error::BadOption(_) => code::BAD_OPTION,
            Error::ProxyingNotSupported => code::PROXYING_NOT_SUPPORTED,
            Error::HeaderTooLarge | Error::InvalidBlock => {
                code::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::BadRequest(reason) => write!(f, "Bad request: {}", reason),
            Error::BadOption(number) => {
                write!(f, "Unsupported critical option {}", number)
            }
            Error::ProxyingNotSupported => {
                write!(
                    f,
                    "This is a constrained server, proxying not supported"
                )
            }
            Error::HeaderTooLarge => {
                write!(f, "Serialized header exceeds the maximum header size")
            }
            Error::InvalidBlock => {
                write!(f, "Block number or size out of range")
            }
        }
    }
}

#[cfg(feature = "std")]
impl error::Error for Error {}
