use core::fmt;

/// The trust classification of a received message.
///
/// It combines whether the integrity tag checked out, whether the payload
/// passed inspection and whether the payload arrived encrypted. None of these
/// is an error, it's up to the application what to accept. The discriminants
/// are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Classification {
    Ok = 0,
    PlaintextOk = 1,
    EncryptedFlaggedUnsafe = 2,
    PlaintextFlaggedUnsafe = 3,
    EncryptedTagInvalid = 4,
    PlaintextTagInvalid = 5,
    EncryptedUnsafeAndTagInvalid = 6,
    PlaintextUnsafeAndTagInvalid = 7,
}

impl Classification {
    /// Combines the outcomes of the individual checks.
    pub fn from_checks(
        tag_valid: bool,
        content_clean: bool,
        was_encrypted: bool,
    ) -> Classification {
        match (tag_valid, content_clean, was_encrypted) {
            (true, true, true) => Classification::Ok,
            (true, true, false) => Classification::PlaintextOk,
            (true, false, true) => Classification::EncryptedFlaggedUnsafe,
            (true, false, false) => Classification::PlaintextFlaggedUnsafe,
            (false, true, true) => Classification::EncryptedTagInvalid,
            (false, true, false) => Classification::PlaintextTagInvalid,
            (false, false, true) => {
                Classification::EncryptedUnsafeAndTagInvalid
            }
            (false, false, false) => {
                Classification::PlaintextUnsafeAndTagInvalid
            }
        }
    }

    pub fn tag_valid(self) -> bool {
        (self as u8) < 4
    }

    pub fn content_clean(self) -> bool {
        (self as u8) & 0x02 == 0
    }

    pub fn was_encrypted(self) -> bool {
        (self as u8) & 0x01 == 0
    }

    /// Returns whether the message may be processed, which requires a valid
    /// tag and a clean payload.
    pub fn is_trusted(self) -> bool {
        self.tag_valid() && self.content_clean()
    }
}

impl From<Classification> for u8 {
    fn from(classification: Classification) -> u8 {
        classification as u8
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            Classification::Ok => "integrity verified, payload clean",
            Classification::PlaintextOk => {
                "integrity verified, plaintext payload clean"
            }
            Classification::EncryptedFlaggedUnsafe => {
                "integrity verified, payload flagged unsafe"
            }
            Classification::PlaintextFlaggedUnsafe => {
                "integrity verified, plaintext payload flagged unsafe"
            }
            Classification::EncryptedTagInvalid => "integrity tag invalid",
            Classification::PlaintextTagInvalid => {
                "integrity tag invalid, plaintext payload"
            }
            Classification::EncryptedUnsafeAndTagInvalid => {
                "integrity tag invalid, payload flagged unsafe"
            }
            Classification::PlaintextUnsafeAndTagInvalid => {
                "integrity tag invalid, plaintext payload flagged unsafe"
            }
        };
        f.write_str(text)
    }
}
