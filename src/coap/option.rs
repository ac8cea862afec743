//! The TLV option codec.
//!
//! Every option on the wire starts with a byte holding two nibbles, the delta
//! to the previous option number and the length of the value. Values up to 12
//! fit into the nibble, 13 announces one extension byte (`value - 13`) and 14
//! two big-endian extension bytes (`value - 269`). The delta extension comes
//! before the length extension. Since only deltas are transmitted, options
//! have to be written in ascending order.

use alloc::vec::Vec;
use log::trace;

use super::{error::Error, Result};

/// Values up to this are stored directly in the nibble.
const NIBBLE_DIRECT_MAX: u32 = 12;
/// Nibble announcing one extension byte.
const NIBBLE_EXT_BYTE: u8 = 13;
/// Nibble announcing two extension bytes.
const NIBBLE_EXT_WORD: u8 = 14;
/// Offset subtracted for the one byte extension.
const EXT_BYTE_BASE: u32 = 13;
/// Offset subtracted for the two byte extension.
const EXT_WORD_BASE: u32 = 269;

/// The payload marker.
pub const PAYLOAD_MARKER: u8 = 0xFF;

/// The highest option number of the standard range.
pub const LAST_STANDARD_OPTION: u32 = 60;
/// The first option number of the experimental range, where the security
/// envelope's options live.
pub const FIRST_EXPERIMENTAL_OPTION: u32 = 65000;
/// The highest option number there can be.
pub const LAST_OPTION: u32 = u16::MAX as u32;

/// The options known to this implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoapOption {
    IfMatch,
    UriHost,
    ETag,
    IfNoneMatch,
    Observe,
    UriPort,
    LocationPath,
    UriPath,
    ContentFormat,
    MaxAge,
    UriQuery,
    Accept,
    LocationQuery,
    Block2,
    Block1,
    Size2,
    ProxyUri,
    ProxyScheme,
    Size1,
    ClientIdentity,
    BootCounter,
    RetransmissionCounter,
    Hmac,
    EncryptionAlgorithm,
    Unknown(u16),
}

impl From<u16> for CoapOption {
    fn from(number: u16) -> CoapOption {
        match number {
            1 => CoapOption::IfMatch,
            3 => CoapOption::UriHost,
            4 => CoapOption::ETag,
            5 => CoapOption::IfNoneMatch,
            6 => CoapOption::Observe,
            7 => CoapOption::UriPort,
            8 => CoapOption::LocationPath,
            11 => CoapOption::UriPath,
            12 => CoapOption::ContentFormat,
            14 => CoapOption::MaxAge,
            15 => CoapOption::UriQuery,
            17 => CoapOption::Accept,
            20 => CoapOption::LocationQuery,
            23 => CoapOption::Block2,
            27 => CoapOption::Block1,
            28 => CoapOption::Size2,
            35 => CoapOption::ProxyUri,
            39 => CoapOption::ProxyScheme,
            60 => CoapOption::Size1,
            65000 => CoapOption::ClientIdentity,
            65001 => CoapOption::BootCounter,
            65002 => CoapOption::RetransmissionCounter,
            65003 => CoapOption::Hmac,
            65004 => CoapOption::EncryptionAlgorithm,
            n => CoapOption::Unknown(n),
        }
    }
}

impl From<CoapOption> for u16 {
    fn from(option: CoapOption) -> u16 {
        match option {
            CoapOption::IfMatch => 1,
            CoapOption::UriHost => 3,
            CoapOption::ETag => 4,
            CoapOption::IfNoneMatch => 5,
            CoapOption::Observe => 6,
            CoapOption::UriPort => 7,
            CoapOption::LocationPath => 8,
            CoapOption::UriPath => 11,
            CoapOption::ContentFormat => 12,
            CoapOption::MaxAge => 14,
            CoapOption::UriQuery => 15,
            CoapOption::Accept => 17,
            CoapOption::LocationQuery => 20,
            CoapOption::Block2 => 23,
            CoapOption::Block1 => 27,
            CoapOption::Size2 => 28,
            CoapOption::ProxyUri => 35,
            CoapOption::ProxyScheme => 39,
            CoapOption::Size1 => 60,
            CoapOption::ClientIdentity => 65000,
            CoapOption::BootCounter => 65001,
            CoapOption::RetransmissionCounter => 65002,
            CoapOption::Hmac => 65003,
            CoapOption::EncryptionAlgorithm => 65004,
            CoapOption::Unknown(n) => n,
        }
    }
}

impl CoapOption {
    /// Returns whether the option is critical, i.e. has an odd number.
    pub fn is_critical(self) -> bool {
        u16::from(self) & 1 == 1
    }

    /// Returns the character joining the values of a repeatable option.
    pub fn separator(self) -> Option<u8> {
        match self {
            CoapOption::LocationPath | CoapOption::UriPath => Some(b'/'),
            CoapOption::UriQuery | CoapOption::LocationQuery => Some(b'&'),
            _ => None,
        }
    }
}

/// Returns whether an accumulated option number lies in a defined range.
pub fn is_valid_number(number: u32) -> bool {
    number <= LAST_STANDARD_OPTION
        || (FIRST_EXPERIMENTAL_OPTION..=LAST_OPTION).contains(&number)
}

/// Returns the nibble representing a delta or length.
pub fn option_nibble(value: u32) -> u8 {
    if value <= NIBBLE_DIRECT_MAX {
        value as u8
    } else if value < EXT_WORD_BASE {
        NIBBLE_EXT_BYTE
    } else {
        NIBBLE_EXT_WORD
    }
}

/// Appends the header of an option and returns the number of bytes written.
///
/// Deltas and lengths above 65804 can't be represented; neither occurs since
/// option numbers are 16 bit and values are bounded by the maximum header
/// size.
pub fn write_option_header(
    delta: u32,
    length: usize,
    buf: &mut Vec<u8>,
) -> usize {
    let start = buf.len();
    let length = length as u32;

    buf.push(option_nibble(delta) << 4 | option_nibble(length));
    write_extension(delta, buf);
    write_extension(length, buf);

    trace!("Wrote {} B option header", buf.len() - start);
    buf.len() - start
}

fn write_extension(value: u32, buf: &mut Vec<u8>) {
    if value >= EXT_WORD_BASE {
        let ext = (value - EXT_WORD_BASE) as u16;
        buf.extend_from_slice(&ext.to_be_bytes());
    } else if value > NIBBLE_DIRECT_MAX {
        buf.push((value - EXT_BYTE_BASE) as u8);
    }
}

/// A decoded option header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionHeader {
    /// Difference to the previous option number.
    pub delta: u32,
    /// Length of the option value.
    pub length: usize,
    /// Number of bytes the header itself occupies.
    pub size: usize,
}

/// Reads the option header at the start of `bytes`.
pub fn read_option_header(bytes: &[u8]) -> Result<OptionHeader> {
    let first = *bytes
        .first()
        .ok_or(Error::BadRequest("Option header missing"))?;
    let mut size = 1;
    let delta = read_extension(first >> 4, bytes, &mut size)?;
    let length = read_extension(first & 0x0F, bytes, &mut size)?;

    Ok(OptionHeader {
        delta,
        length: length as usize,
        size,
    })
}

fn read_extension(nibble: u8, bytes: &[u8], pos: &mut usize) -> Result<u32> {
    match nibble {
        NIBBLE_EXT_BYTE => {
            let ext = bytes
                .get(*pos)
                .ok_or(Error::BadRequest("Option header truncated"))?;
            *pos += 1;
            Ok(EXT_BYTE_BASE + u32::from(*ext))
        }
        NIBBLE_EXT_WORD => {
            let ext = bytes
                .get(*pos..*pos + 2)
                .ok_or(Error::BadRequest("Option header truncated"))?;
            *pos += 2;
            Ok(EXT_WORD_BASE + u32::from(u16::from_be_bytes([ext[0], ext[1]])))
        }
        n if u32::from(n) <= NIBBLE_DIRECT_MAX => Ok(u32::from(n)),
        _ => Err(Error::BadRequest("Reserved option nibble 15")),
    }
}

/// Returns the number of bytes needed for an integer option value.
pub fn int_option_len(value: u32) -> usize {
    4 - value.leading_zeros() as usize / 8
}

/// Appends an integer option using as few bytes as possible and returns the
/// number of bytes written.
pub fn write_int_option(
    number: u16,
    current_number: u16,
    value: u32,
    buf: &mut Vec<u8>,
) -> usize {
    let length = int_option_len(value);
    trace!(
        "OPTION {} (delta {}, len {})",
        number,
        number - current_number,
        length
    );

    let start = buf.len();
    write_option_header(u32::from(number - current_number), length, buf);
    buf.extend_from_slice(&value.to_be_bytes()[4 - length..]);

    buf.len() - start
}

/// Parses a big-endian integer option value.
pub fn parse_int_option(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0, |value, &byte| (value << 8) | u32::from(byte))
}

/// Appends an option whose value may consist of several segments and returns
/// the number of bytes written.
///
/// With a separator, every segment becomes its own option entry, of which
/// only the first one carries a non-zero delta. Without one, the value is
/// written as a single entry.
pub fn write_array_option(
    number: u16,
    mut current_number: u16,
    value: &[u8],
    separator: Option<u8>,
    buf: &mut Vec<u8>,
) -> usize {
    let start = buf.len();

    match separator {
        Some(separator) => {
            for part in value.split(|&b| b == separator) {
                write_option_header(
                    u32::from(number - current_number),
                    part.len(),
                    buf,
                );
                buf.extend_from_slice(part);
                trace!(
                    "OPTION {} (delta {}, len {})",
                    number,
                    number - current_number,
                    part.len()
                );
                current_number = number;
            }
        }
        None => {
            write_option_header(
                u32::from(number - current_number),
                value.len(),
                buf,
            );
            buf.extend_from_slice(value);
            trace!(
                "OPTION {} (delta {}, len {})",
                number,
                number - current_number,
                value.len()
            );
        }
    }

    buf.len() - start
}

/// Appends a repeated option's value to what has been decoded so far,
/// putting the separator in between.
pub fn merge_multi_option(
    dst: &mut Option<Vec<u8>>,
    option: &[u8],
    separator: Option<u8>,
) {
    match dst {
        Some(value) => {
            if let Some(separator) = separator {
                value.push(separator);
            }
            value.extend_from_slice(option);
        }
        None => *dst = Some(option.to_vec()),
    }
}

/// Returns the value of the first `name=value` pair in an `&`-joined buffer.
pub fn get_variable<'a>(buffer: &'a [u8], name: &str) -> Option<&'a [u8]> {
    let name = name.as_bytes();

    buffer.split(|&b| b == b'&').find_map(|pair| {
        if pair.len() > name.len()
            && pair.starts_with(name)
            && pair[name.len()] == b'='
        {
            Some(&pair[name.len() + 1..])
        } else {
            None
        }
    })
}

/// The smallest block size.
pub const MIN_BLOCK_SIZE: u16 = 16;
/// The largest block size.
pub const MAX_BLOCK_SIZE: u16 = 2048;
/// The largest block number that fits into the option.
pub const MAX_BLOCK_NUM: u32 = 0x0F_FFFF;
/// The longest value a block option may have.
pub const MAX_BLOCK_VALUE_LEN: usize = 3;

/// The descriptor carried by the Block1 and Block2 options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// The number of the block.
    pub num: u32,
    /// Whether more blocks follow.
    pub more: bool,
    /// The size of a block.
    pub size: u16,
}

impl Block {
    /// Creates a new descriptor, checking the limits of the option.
    ///
    /// The size may be one less than the minimum, which is what remains when
    /// one byte of a block is reserved for encryption padding.
    pub fn new(num: u32, more: bool, size: u16) -> Result<Block> {
        if size < MIN_BLOCK_SIZE - 1 || size > MAX_BLOCK_SIZE {
            return Err(Error::InvalidBlock);
        }
        if num > MAX_BLOCK_NUM {
            return Err(Error::InvalidBlock);
        }

        Ok(Block { num, more, size })
    }

    /// Decodes an option value as received, which may have at most three
    /// bytes.
    pub fn parse(bytes: &[u8]) -> Result<Block> {
        if bytes.len() > MAX_BLOCK_VALUE_LEN {
            return Err(Error::BadRequest("Block option longer than 3 bytes"));
        }
        let block = Block::from_value(parse_int_option(bytes));
        if block.num > MAX_BLOCK_NUM {
            return Err(Error::BadRequest("Block number out of range"));
        }

        Ok(block)
    }

    /// Decodes the option value.
    pub fn from_value(value: u32) -> Block {
        Block {
            num: value >> 4,
            more: value & 0x08 != 0,
            size: MIN_BLOCK_SIZE << (value & 0x07),
        }
    }

    /// Encodes the option value.
    pub fn to_value(self) -> u32 {
        let mut value = self.num << 4;
        if self.more {
            value |= 0x08;
        }
        value | (0x07 & log_2(u32::from(self.size / MIN_BLOCK_SIZE)))
    }

    /// Returns the byte offset of the block.
    pub fn offset(self) -> u64 {
        u64::from(self.num) * u64::from(self.size)
    }
}

/// Integer logarithm rounding down, with `log_2(0) == 0`.
fn log_2(value: u32) -> u32 {
    if value == 0 {
        0
    } else {
        31 - value.leading_zeros()
    }
}
