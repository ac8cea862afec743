use alloc::vec::Vec;

/// Marker the default scanner looks for.
pub const DEFAULT_SIGNATURE: &[u8] = b"EICAR";

/// Decides whether a plaintext payload is safe to hand to the application.
pub trait PayloadInspector {
    fn is_clean(&self, payload: &[u8]) -> bool;
}

impl<F> PayloadInspector for F
where
    F: Fn(&[u8]) -> bool,
{
    fn is_clean(&self, payload: &[u8]) -> bool {
        self(payload)
    }
}

/// Flags payloads containing a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureScanner {
    signature: Vec<u8>,
}

impl SignatureScanner {
    pub fn new(signature: &[u8]) -> SignatureScanner {
        SignatureScanner {
            signature: signature.to_vec(),
        }
    }
}

impl Default for SignatureScanner {
    fn default() -> SignatureScanner {
        SignatureScanner::new(DEFAULT_SIGNATURE)
    }
}

impl PayloadInspector for SignatureScanner {
    fn is_clean(&self, payload: &[u8]) -> bool {
        self.signature.is_empty()
            || !payload
                .windows(self.signature.len())
                .any(|window| window == &self.signature[..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_signature() {
        let scanner = SignatureScanner::default();
        assert!(scanner.is_clean(b"hello"));
        assert!(scanner.is_clean(b""));
        assert!(scanner.is_clean(b"EICA"));
        assert!(!scanner.is_clean(b"EICAR"));
        assert!(!scanner
            .is_clean(b"X5O!P%@AP[4\\PZX54(P^)7CC)7}$EICAR-STANDARD"));
        assert!(scanner.is_clean(b"eicar"));
    }

    #[test]
    fn custom() {
        assert!(SignatureScanner::new(b"").is_clean(b"anything"));
        assert!(!SignatureScanner::new(&[0x00, 0xFF]).is_clean(&[1, 0, 0xFF]));

        let no_binary = |payload: &[u8]| payload.iter().all(u8::is_ascii);
        assert!(no_binary.is_clean(b"text"));
        assert!(!no_binary.is_clean(&[0x80]));
    }
}
