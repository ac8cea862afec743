use alloc::vec::Vec;
use core::ops::Range;
use log::{debug, warn};

use super::{
    error::Error,
    message::{code, Message, HEADER_LEN, VERSION},
    option::{self, CoapOption, PAYLOAD_MARKER},
    Result, TOKEN_LEN_MASK, TYPE_MASK, TYPE_POSITION, VERSION_MASK,
    VERSION_POSITION,
};

/// A serialized datagram together with the place reserved for its tag.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Serialized {
    pub bytes: Vec<u8>,
    /// Byte range of the HMAC option value in `bytes`.
    pub tag: Option<Range<usize>>,
}

/// Writes options in ascending order, tracking the last number for deltas.
struct OptionWriter {
    buf: Vec<u8>,
    current: u16,
}

impl OptionWriter {
    fn int(&mut self, option: CoapOption, value: Option<u32>) {
        if let Some(value) = value {
            let number = u16::from(option);
            option::write_int_option(
                number,
                self.current,
                value,
                &mut self.buf,
            );
            self.current = number;
        }
    }

    fn bytes(&mut self, option: CoapOption, value: Option<&[u8]>) {
        if let Some(value) = value {
            let number = u16::from(option);
            option::write_array_option(
                number,
                self.current,
                value,
                option.separator(),
                &mut self.buf,
            );
            self.current = number;
        }
    }
}

/// Serializes a message that has already been sealed.
///
/// Fails without output if header, token and options together exceed
/// `max_header_size`.
pub(crate) fn serialize_message(
    message: &Message,
    max_header_size: usize,
) -> Result<Serialized> {
    let mut buf = Vec::with_capacity(
        HEADER_LEN + message.token.len() + message.payload.len() + 32,
    );

    // An empty message has no token
    let token: &[u8] = if message.code == code::EMPTY {
        &[]
    } else {
        &message.token
    };
    buf.push(
        ((VERSION << VERSION_POSITION) & VERSION_MASK)
            | ((u8::from(message.msg_type) << TYPE_POSITION) & TYPE_MASK)
            | (token.len() as u8 & TOKEN_LEN_MASK),
    );
    buf.push(message.code);
    buf.extend_from_slice(&message.message_id.to_be_bytes());

    if message.code == code::EMPTY {
        debug!("Serialized empty message {}", message.message_id);
        return Ok(Serialized {
            bytes: buf,
            tag: None,
        });
    }
    buf.extend_from_slice(token);

    let mut writer = OptionWriter { buf, current: 0 };
    writer.bytes(CoapOption::IfMatch, message.if_match.as_deref());
    writer.bytes(CoapOption::UriHost, message.uri_host.as_deref());
    writer.bytes(CoapOption::ETag, message.etag.as_deref());
    if message.if_none_match {
        writer.bytes(CoapOption::IfNoneMatch, Some(&[]));
    }
    writer.int(CoapOption::Observe, message.observe);
    writer.int(CoapOption::UriPort, message.uri_port.map(u32::from));
    writer.bytes(CoapOption::LocationPath, message.location_path.as_deref());
    writer.bytes(CoapOption::UriPath, message.uri_path.as_deref());
    writer.int(
        CoapOption::ContentFormat,
        message.content_format.map(u32::from),
    );
    writer.int(CoapOption::MaxAge, message.max_age);
    writer.bytes(CoapOption::UriQuery, message.uri_query.as_deref());
    writer.int(CoapOption::Accept, message.accept.map(u32::from));
    writer.bytes(
        CoapOption::LocationQuery,
        message.location_query.as_deref(),
    );
    writer.int(CoapOption::Block2, message.block2.map(|b| b.to_value()));
    writer.int(CoapOption::Block1, message.block1.map(|b| b.to_value()));
    writer.int(CoapOption::Size2, message.size2);
    writer.int(CoapOption::Size1, message.size1);
    writer.int(
        CoapOption::ClientIdentity,
        message.client_identity.map(u32::from),
    );
    writer.int(CoapOption::BootCounter, message.boot_counter.map(u32::from));
    writer.int(
        CoapOption::RetransmissionCounter,
        message.retransmission_counter.map(u32::from),
    );
    writer.bytes(CoapOption::Hmac, message.hmac.as_deref());
    let tag = message.hmac.as_ref().map(|hmac| {
        let end = writer.buf.len();
        end - hmac.len()..end
    });
    writer.int(
        CoapOption::EncryptionAlgorithm,
        message.encryption.map(|alg| u32::from(u8::from(alg))),
    );

    let mut buf = writer.buf;
    if buf.len() > max_header_size {
        warn!(
            "Serialized header is {} B, exceeding the maximum of {} B",
            buf.len(),
            max_header_size
        );
        return Err(Error::HeaderTooLarge);
    }

    if !message.payload.is_empty() {
        buf.push(PAYLOAD_MARKER);
        buf.extend_from_slice(&message.payload);
    }

    debug!(
        "Serialized message {} ({} B, {} B payload)",
        message.message_id,
        buf.len(),
        message.payload.len()
    );
    Ok(Serialized { bytes: buf, tag })
}
