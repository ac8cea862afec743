// Pre-shared keys of two clients
pub const PSK_1: [u8; 16] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B,
    0x0C, 0x0D, 0x0E, 0x0F,
];
pub const PSK_2: [u8; 16] = [
    0x0F, 0x0E, 0x0D, 0x0C, 0x0B, 0x0A, 0x09, 0x08, 0x07, 0x06, 0x05, 0x04,
    0x03, 0x02, 0x01, 0x00,
];

// RFC 4231, test case 2
pub const HMAC_2_KEY: &[u8] = b"Jefe";
pub const HMAC_2_DATA: &[u8] = b"what do ya want for nothing?";
pub const HMAC_2_TAG: [u8; 32] = [
    0x5B, 0xDC, 0xC1, 0x46, 0xBF, 0x60, 0x75, 0x4E, 0x6A, 0x04, 0x24, 0x26,
    0x08, 0x95, 0x75, 0xC7, 0x5A, 0x00, 0x3F, 0x08, 0x9D, 0x27, 0x39, 0x83,
    0x9D, 0xEC, 0x58, 0xB9, 0x64, 0xEC, 0x38, 0x43,
];

// RFC 4231, test case 6 (key longer than the block size)
pub const HMAC_6_KEY: [u8; 131] = [0xAA; 131];
pub const HMAC_6_DATA: &[u8] =
    b"Test Using Larger Than Block-Size Key - Hash Key First";
pub const HMAC_6_TAG: [u8; 32] = [
    0x60, 0xE4, 0x31, 0x59, 0x1E, 0xE0, 0xB6, 0x7F, 0x0D, 0x8A, 0x26, 0xAA,
    0xCB, 0xF5, 0xB7, 0x7F, 0x8E, 0x0B, 0xC6, 0x21, 0x37, 0x28, 0xC5, 0x14,
    0x05, 0x46, 0x04, 0x0F, 0x0E, 0xE3, 0x7F, 0x54,
];

// FIPS-197, appendix C.1
pub const AES_KEY: [u8; 16] = PSK_1;
pub const AES_PLAINTEXT: [u8; 16] = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB,
    0xCC, 0xDD, 0xEE, 0xFF,
];
pub const AES_CIPHERTEXT: [u8; 16] = [
    0x69, 0xC4, 0xE0, 0xD8, 0x6A, 0x7B, 0x04, 0x30, 0xD8, 0xCD, 0xB7, 0x80,
    0x70, 0xB4, 0xC5, 0x5A,
];
