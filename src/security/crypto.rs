use aes::{
    cipher::generic_array::GenericArray, Aes128, BlockDecrypt, BlockEncrypt,
    NewBlockCipher,
};
use alloc::vec::Vec;
use core::ops::Range;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::{error::Error, Result};

/// Size of an AES block, which is also the most padding there can be.
pub const BLOCK_LEN: usize = 16;
/// Size of an AES-128 key.
pub const KEY_LEN: usize = 16;
/// Size of an untruncated HMAC-SHA-256 tag.
pub const DIGEST_LEN: usize = 32;

type HmacSha256 = Hmac<Sha256>;

/// Returns the HMAC-SHA-256 over `data` with the bytes at `excluded` left
/// out.
pub fn compute_tag(
    key: &[u8],
    data: &[u8],
    excluded: Range<usize>,
) -> Result<[u8; DIGEST_LEN]> {
    let mut mac = HmacSha256::new_varkey(key).map_err(|_| Error::InvalidKey)?;
    mac.input(&data[..excluded.start]);
    mac.input(&data[excluded.end..]);

    let mut tag = [0; DIGEST_LEN];
    tag.copy_from_slice(&mac.result().code());
    Ok(tag)
}

/// Computes the tag over `buf` and writes it, truncated to the length of the
/// range, into the range.
pub fn write_tag(key: &[u8], buf: &mut [u8], tag: Range<usize>) -> Result<()> {
    let full = compute_tag(key, buf, tag.clone())?;
    let len = tag.len();
    buf[tag].copy_from_slice(&full[..len]);

    Ok(())
}

/// Checks the truncated tag found at `tag` in constant time.
pub fn verify_tag(key: &[u8], data: &[u8], tag: Range<usize>) -> bool {
    if tag.start > tag.end
        || tag.end > data.len()
        || tag.len() == 0
        || tag.len() > DIGEST_LEN
    {
        return false;
    }

    match compute_tag(key, data, tag.clone()) {
        Ok(full) => bool::from(full[..tag.len()].ct_eq(&data[tag])),
        Err(_) => false,
    }
}

/// Creates the cipher from the first 16 bytes of the key, zero-extended if
/// shorter.
fn cipher(key: &[u8]) -> Aes128 {
    let mut aes_key = [0; KEY_LEN];
    let len = key.len().min(KEY_LEN);
    aes_key[..len].copy_from_slice(&key[..len]);

    Aes128::new(GenericArray::from_slice(&aes_key))
}

/// Returns how many padding bytes a payload of this length gets.
pub fn padding_len(payload_len: usize) -> usize {
    BLOCK_LEN - payload_len % BLOCK_LEN
}

/// Pads the payload and encrypts every block on its own.
///
/// There's always padding, so the ciphertext is between 1 and 16 bytes
/// longer than the plaintext.
pub fn encrypt_payload(key: &[u8], payload: &[u8]) -> Vec<u8> {
    let padding = padding_len(payload.len());
    let mut buf = Vec::with_capacity(payload.len() + padding);
    buf.extend_from_slice(payload);
    buf.resize(payload.len() + padding, padding as u8);

    let cipher = cipher(key);
    for block in buf.chunks_exact_mut(BLOCK_LEN) {
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
    }

    buf
}

/// Decrypts the payload and removes the padding.
pub fn decrypt_payload(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(Error::Decryption);
    }

    let mut buf = ciphertext.to_vec();
    let cipher = cipher(key);
    for block in buf.chunks_exact_mut(BLOCK_LEN) {
        cipher.decrypt_block(GenericArray::from_mut_slice(block));
    }

    let padding = usize::from(buf[buf.len() - 1]);
    if padding == 0
        || padding > BLOCK_LEN
        || buf[buf.len() - padding..]
            .iter()
            .any(|&b| usize::from(b) != padding)
    {
        return Err(Error::Decryption);
    }
    buf.truncate(buf.len() - padding);

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::super::test_vectors::*;
    use super::*;

    #[test]
    fn hmac_vectors() {
        // Appending the excluded range at the end changes nothing
        let len = HMAC_2_DATA.len();
        assert_eq!(
            HMAC_2_TAG,
            compute_tag(HMAC_2_KEY, HMAC_2_DATA, len..len).unwrap()
        );
        assert_eq!(
            HMAC_6_TAG,
            compute_tag(&HMAC_6_KEY, HMAC_6_DATA, 0..0).unwrap()
        );
    }

    #[test]
    fn excluded_range() {
        let mut data = HMAC_2_DATA[..4].to_vec();
        data.extend_from_slice(&[0xEE; 8]);
        data.extend_from_slice(&HMAC_2_DATA[4..]);
        assert_eq!(
            HMAC_2_TAG,
            compute_tag(HMAC_2_KEY, &data, 4..12).unwrap()
        );
    }

    #[test]
    fn tag_roundtrip() {
        let mut data = vec![0x42; 40];
        write_tag(&PSK_1, &mut data, 10..18).unwrap();
        assert_ne!(&[0x42; 8][..], &data[10..18]);
        assert!(verify_tag(&PSK_1, &data, 10..18));
        // Deterministic
        let mut again = vec![0x42; 40];
        write_tag(&PSK_1, &mut again, 10..18).unwrap();
        assert_eq!(data, again);

        assert!(!verify_tag(&PSK_2, &data, 10..18));
        for i in (0..10).chain(18..40) {
            let mut flipped = data.clone();
            flipped[i] ^= 0x01;
            assert!(!verify_tag(&PSK_1, &flipped, 10..18));
        }
    }

    #[test]
    fn tag_bounds() {
        let data = [0; 40];
        assert!(!verify_tag(&PSK_1, &data, 38..42));
        assert!(!verify_tag(&PSK_1, &data, 10..10));
        assert!(!verify_tag(&PSK_1, &[0; 60], 0..33));
    }

    #[test]
    fn aes_vector() {
        // A full block of padding follows the single block
        let ciphertext = encrypt_payload(&AES_KEY, &AES_PLAINTEXT);
        assert_eq!(32, ciphertext.len());
        assert_eq!(&AES_CIPHERTEXT[..], &ciphertext[..16]);
    }

    #[test]
    fn key_normalization() {
        let mut long_key = PSK_1.to_vec();
        long_key.extend_from_slice(&[0xFF; 16]);
        assert_eq!(
            encrypt_payload(&PSK_1, b"hello"),
            encrypt_payload(&long_key, b"hello")
        );
        let mut short_key = [0; 16];
        short_key[..4].copy_from_slice(b"Jefe");
        assert_eq!(
            encrypt_payload(&short_key, b"hello"),
            encrypt_payload(b"Jefe", b"hello")
        );
    }

    #[test]
    fn encryption_roundtrip() {
        for &len in &[0, 1, 15, 16, 17, 32] {
            let plaintext: Vec<u8> = (0..len as u8).collect();
            let ciphertext = encrypt_payload(&PSK_1, &plaintext);
            assert_eq!(0, ciphertext.len() % BLOCK_LEN);
            assert_eq!(len + padding_len(len), ciphertext.len());
            assert_eq!(
                plaintext,
                decrypt_payload(&PSK_1, &ciphertext).unwrap()
            );
        }
    }

    #[test]
    fn bad_ciphertext() {
        assert_eq!(Err(Error::Decryption), decrypt_payload(&PSK_1, &[]));
        assert_eq!(
            Err(Error::Decryption),
            decrypt_payload(&PSK_1, &[0; 17])
        );

        // Valid ciphertext of bad padding bytes
        let mut block = [0x11; 16];
        block[15] = 0x03;
        block[14] = 0x03;
        let cipher = cipher(&PSK_1);
        cipher.encrypt_block(GenericArray::from_mut_slice(&mut block));
        assert_eq!(Err(Error::Decryption), decrypt_payload(&PSK_1, &block));

        let mut block = [0x11; 16];
        block[15] = 0x11;
        cipher.encrypt_block(GenericArray::from_mut_slice(&mut block));
        assert_eq!(Err(Error::Decryption), decrypt_payload(&PSK_1, &block));
    }
}
