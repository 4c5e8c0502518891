//! Salt generation and the base64 dialects used by modular-crypt formats.

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD_NO_PAD};
use base64::engine::DecodePaddingMode;
use rand::rngs::OsRng;
use rand::{Rng, RngCore};

/// Characters allowed in crypt(3)-style salts.
pub const HASH64_CHARS: &[u8] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const ALNUM_CHARS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const BCRYPT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone),
);

pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    OsRng.fill_bytes(&mut buf);
    buf
}

fn random_chars(alphabet: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| alphabet[OsRng.gen_range(0..alphabet.len())] as char)
        .collect()
}

pub fn random_hash64(len: usize) -> String {
    random_chars(HASH64_CHARS, len)
}

pub fn random_alnum(len: usize) -> String {
    random_chars(ALNUM_CHARS, len)
}

pub fn is_hash64(value: &str) -> bool {
    value.bytes().all(|b| HASH64_CHARS.contains(&b))
}

/// "Adapted base64": unpadded standard base64 with `.` in place of `+`.
pub fn ab64_encode(data: &[u8]) -> String {
    STANDARD_NO_PAD.encode(data).replace('+', ".")
}

pub fn b64_nopad(data: &[u8]) -> String {
    STANDARD_NO_PAD.encode(data)
}

/// crypt(3) hash64: little-endian 24-bit groups, least significant sextet first.
pub fn h64_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(3) * 4);
    for chunk in data.chunks(3) {
        let group = chunk
            .iter()
            .rev()
            .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte));
        for i in 0..=chunk.len() {
            out.push(HASH64_CHARS[((group >> (6 * i)) & 0x3f) as usize] as char);
        }
    }
    out
}

pub fn utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

pub fn utf16be(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_be_bytes).collect()
}

/// Canonical 22-character form of a raw bcrypt salt.
pub fn encode_bcrypt_salt(salt: &[u8; 16]) -> String {
    BCRYPT_ENGINE.encode(salt)
}

/// Decode a 22-character bcrypt salt into its 16 raw bytes.
pub fn decode_bcrypt_salt(salt: &str) -> Option<[u8; 16]> {
    if salt.len() != 22 {
        return None;
    }
    let bytes = BCRYPT_ENGINE.decode(salt).ok()?;
    bytes.try_into().ok()
}
