//! The seam to the datagram transport.

use core::fmt;
#[cfg(feature = "std")]
use std::error;

use crate::security::{
    self, CounterStorage, KeyLookup, PayloadInspector, SecurityEnvelope,
};

/// Sends datagrams to a peer.
pub trait Transport {
    type Address;
    type Error;

    fn send(
        &mut self,
        address: &Self::Address,
        port: u16,
        datagram: &[u8],
    ) -> Result<(), Self::Error>;
}

/// Failure while sending a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendError<E> {
    /// The message couldn't be sealed again.
    Security(security::Error),
    /// Wraps errors from the transport.
    Transport(E),
}

impl<E> From<security::Error> for SendError<E> {
    fn from(e: security::Error) -> SendError<E> {
        SendError::Security(e)
    }
}

impl<E: fmt::Display> fmt::Display for SendError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SendError::Security(e) => e.fmt(f),
            SendError::Transport(e) => write!(f, "Transport error: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug + fmt::Display> error::Error for SendError<E> {}

/// Hands out message IDs, starting after a seed the caller picks at random.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageIds {
    current: u16,
}

impl MessageIds {
    pub fn new(seed: u16) -> MessageIds {
        MessageIds { current: seed }
    }

    /// Returns the next message ID, wrapping around after 65535.
    pub fn next_id(&mut self) -> u16 {
        self.current = self.current.wrapping_add(1);
        self.current
    }
}

/// Sends an already serialized datagram.
pub fn send_message<T: Transport>(
    transport: &mut T,
    address: &T::Address,
    port: u16,
    datagram: &[u8],
) -> Result<(), T::Error> {
    transport.send(address, port, datagram)
}

/// Sends a datagram that may be a retransmission.
///
/// With a non-zero `retransmission_counter`, the datagram is parsed and
/// sealed again, so it carries the new counter under a fresh tag. The first
/// transmission goes out as is.
pub fn send_message_with_counter<K, I, S, T>(
    envelope: &mut SecurityEnvelope<K, I, S>,
    transport: &mut T,
    address: &T::Address,
    port: u16,
    datagram: &[u8],
    retransmission_counter: u8,
) -> Result<(), SendError<T::Error>>
where
    K: KeyLookup,
    I: PayloadInspector,
    S: CounterStorage,
    T: Transport,
{
    if retransmission_counter == 0 {
        return send_message(transport, address, port, datagram)
            .map_err(SendError::Transport);
    }

    let resealed = envelope.reseal(datagram, retransmission_counter)?;
    send_message(transport, address, port, &resealed)
        .map_err(SendError::Transport)
}
