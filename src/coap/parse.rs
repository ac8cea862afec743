use alloc::vec::Vec;
use core::ops::Range;
use log::{debug, trace, warn};

use super::{
    error::Error,
    message::{EncryptionAlgorithm, Message, MessageType},
    message::{ETAG_MAX_LEN, HEADER_LEN, TOKEN_MAX_LEN, VERSION},
    option::{self, Block, CoapOption, PAYLOAD_MARKER},
    Result, TOKEN_LEN_MASK, TYPE_MASK, TYPE_POSITION, VERSION_MASK,
    VERSION_POSITION,
};

/// A decoded message together with where its integrity tag was found.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Decoded {
    pub message: Message,
    /// Byte range of the last HMAC option value in the datagram.
    pub tag: Option<Range<usize>>,
}

/// Decodes a datagram, keeping at most `max_payload` payload bytes.
pub(crate) fn parse_message(
    data: &[u8],
    max_payload: usize,
) -> Result<Decoded> {
    if data.len() < HEADER_LEN {
        return Err(Error::BadRequest("Datagram shorter than the header"));
    }

    let version = (data[0] & VERSION_MASK) >> VERSION_POSITION;
    if version != VERSION {
        return Err(Error::BadRequest("CoAP version must be 1"));
    }
    let token_len = usize::from(data[0] & TOKEN_LEN_MASK);
    if token_len > TOKEN_MAX_LEN {
        return Err(Error::BadRequest("Token Length must not be more than 8"));
    }

    let mut message = Message::new(
        MessageType::from((data[0] & TYPE_MASK) >> TYPE_POSITION),
        data[1],
        u16::from_be_bytes([data[2], data[3]]),
    );
    message.token = data
        .get(HEADER_LEN..HEADER_LEN + token_len)
        .ok_or(Error::BadRequest("Token exceeds the datagram"))?
        .to_vec();
    trace!(
        "Parsed: v {}, t {:?}, tkl {}, c {}, mid {}",
        version,
        message.msg_type,
        token_len,
        message.code,
        message.message_id
    );

    let mut pos = HEADER_LEN + token_len;
    let mut number = 0;
    let mut tag = None;
    while pos < data.len() {
        if data[pos] >> 4 == PAYLOAD_MARKER >> 4 {
            let payload = &data[pos + 1..];
            let len = payload.len().min(max_payload);
            message.payload = payload[..len].to_vec();
            break;
        }

        let header = option::read_option_header(&data[pos..])?;
        pos += header.size;
        let end = pos
            .checked_add(header.length)
            .filter(|&end| end <= data.len())
            .ok_or(Error::BadRequest("Option exceeds the datagram"))?;

        number += header.delta;
        if !option::is_valid_number(number) {
            return Err(Error::BadRequest("Option number out of range"));
        }
        trace!(
            "OPTION {} (delta {}, len {})",
            number,
            header.delta,
            header.length
        );

        let option = CoapOption::from(number as u16);
        apply_option(&mut message, option, &data[pos..end])?;
        if option == CoapOption::Hmac {
            tag = Some(pos..end);
        }
        pos = end;
    }

    debug!(
        "Decoded message {} ({} B payload)",
        message.message_id,
        message.payload.len()
    );
    Ok(Decoded { message, tag })
}

/// Stores a single option value in the message.
fn apply_option(
    message: &mut Message,
    option: CoapOption,
    value: &[u8],
) -> Result<()> {
    let int = || option::parse_int_option(value);
    let separator = option.separator();

    match option {
        CoapOption::IfMatch => {
            message.if_match = Some(truncate(value, ETAG_MAX_LEN));
        }
        CoapOption::UriHost => message.uri_host = Some(value.to_vec()),
        CoapOption::ETag => message.etag = Some(truncate(value, ETAG_MAX_LEN)),
        CoapOption::IfNoneMatch => message.if_none_match = true,
        CoapOption::Observe => message.observe = Some(int()),
        CoapOption::UriPort => message.uri_port = Some(int() as u16),
        CoapOption::LocationPath => option::merge_multi_option(
            &mut message.location_path,
            value,
            separator,
        ),
        CoapOption::UriPath => {
            option::merge_multi_option(&mut message.uri_path, value, separator)
        }
        CoapOption::ContentFormat => {
            message.content_format = Some(int() as u16)
        }
        CoapOption::MaxAge => message.max_age = Some(int()),
        CoapOption::UriQuery => option::merge_multi_option(
            &mut message.uri_query,
            value,
            separator,
        ),
        CoapOption::Accept => message.accept = Some(int() as u16),
        CoapOption::LocationQuery => option::merge_multi_option(
            &mut message.location_query,
            value,
            separator,
        ),
        CoapOption::Block2 => message.block2 = Some(Block::parse(value)?),
        CoapOption::Block1 => message.block1 = Some(Block::parse(value)?),
        CoapOption::Size2 => message.size2 = Some(int()),
        CoapOption::Size1 => message.size1 = Some(int()),
        CoapOption::ProxyUri | CoapOption::ProxyScheme => {
            warn!("Proxying requested, refusing");
            return Err(Error::ProxyingNotSupported);
        }
        CoapOption::ClientIdentity => {
            message.client_identity = Some(int() as u8)
        }
        CoapOption::BootCounter => message.boot_counter = Some(int() as u16),
        CoapOption::RetransmissionCounter => {
            message.retransmission_counter = Some(int() as u8)
        }
        CoapOption::Hmac => {
            option::merge_multi_option(&mut message.hmac, value, separator)
        }
        CoapOption::EncryptionAlgorithm => {
            message.encryption = Some(EncryptionAlgorithm::from(int() as u8))
        }
        CoapOption::Unknown(number) => {
            if option.is_critical() {
                warn!("Unknown critical option {}", number);
                return Err(Error::BadOption(number));
            }
            trace!("Ignoring unknown elective option {}", number);
        }
    }

    Ok(())
}

fn truncate(value: &[u8], max_len: usize) -> Vec<u8> {
    value[..value.len().min(max_len)].to_vec()
}
