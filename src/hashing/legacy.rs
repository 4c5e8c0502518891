//! Formats used by older operating systems, databases and web applications.
//!
//! None of these are suitable for new credentials. They exist so templates
//! can seed systems that only understand them.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use des::Des;
use des::cipher::generic_array::GenericArray;
use des::cipher::{BlockEncrypt, KeyInit};
use md4::Md4;
use md5::{Digest, Md5};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};

use super::encoding::{HASH64_CHARS, h64_encode, utf16be, utf16le};

const LM_MAGIC: [u8; 8] = *b"KGS!@#$%";
const ORACLE10_KEY: [u8; 8] = [0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef];
const MSDCC2_ROUNDS: u32 = 10_240;
const MD5_CRYPT_ORDER: [usize; 16] = [12, 6, 0, 13, 7, 1, 14, 8, 2, 15, 9, 3, 5, 10, 4, 11];

/// Character encodings accepted for LAN Manager hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LmEncoding {
    /// ASCII passwords only; the upper half of cp437 is not mapped
    Cp437,
    Latin1,
}

impl LmEncoding {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "cp437" | "ascii" => Some(LmEncoding::Cp437),
            "latin-1" | "latin1" | "iso-8859-1" => Some(LmEncoding::Latin1),
            _ => None,
        }
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>, String> {
        let limit = match self {
            LmEncoding::Cp437 => 0x7f,
            LmEncoding::Latin1 => 0xff,
        };
        text.chars()
            .map(|c| {
                u8::try_from(u32::from(c))
                    .ok()
                    .filter(|b| *b <= limit)
                    .ok_or_else(|| format!("character {c:?} cannot be encoded as {self:?}"))
            })
            .collect()
    }
}

fn des_encrypt(key: [u8; 8], block: [u8; 8]) -> [u8; 8] {
    let cipher = Des::new(&GenericArray::from(key));
    let mut block = GenericArray::from(block);
    cipher.encrypt_block(&mut block);
    block.into()
}

/// Spread 56 key bits over 8 bytes, leaving the parity bit clear.
fn expand_des_key(key: &[u8]) -> [u8; 8] {
    let bits = key.iter().fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
    std::array::from_fn(|i| (((bits >> (49 - 7 * i)) & 0x7f) as u8) << 1)
}

/// Final block of a zero-IV, zero-padded DES-CBC encryption.
fn des_cbc_last_block(key: [u8; 8], data: &[u8]) -> [u8; 8] {
    data.chunks(8).fold([0u8; 8], |chain, chunk| {
        let block = std::array::from_fn(|i| chain[i] ^ chunk.get(i).copied().unwrap_or(0));
        des_encrypt(key, block)
    })
}

pub fn md4_hex(data: &[u8]) -> String {
    hex::encode(Md4::digest(data))
}

pub fn nthash(password: &str) -> Vec<u8> {
    Md4::digest(utf16le(password)).to_vec()
}

pub fn lmhash(password: &str, encoding: LmEncoding) -> Result<String, String> {
    let encoded = encoding.encode(&password.to_uppercase())?;
    let mut key = [0u8; 14];
    for (slot, byte) in key.iter_mut().zip(encoded) {
        *slot = byte;
    }

    let digest: Vec<u8> = key
        .chunks(7)
        .flat_map(|half| des_encrypt(expand_des_key(half), LM_MAGIC))
        .collect();
    Ok(hex::encode(digest))
}

/// Windows cached domain credentials, version 1
pub fn msdcc(password: &str, user: &str) -> Vec<u8> {
    Md4::new()
        .chain_update(nthash(password))
        .chain_update(utf16le(&user.to_lowercase()))
        .finalize()
        .to_vec()
}

/// Windows cached domain credentials, version 2
pub fn msdcc2(password: &str, user: &str) -> Vec<u8> {
    let mut out = [0u8; 16];
    pbkdf2::pbkdf2_hmac::<Sha1>(
        &msdcc(password, user),
        &utf16le(&user.to_lowercase()),
        MSDCC2_ROUNDS,
        &mut out,
    );
    out.to_vec()
}

/// SQL Server 2000 also stores a digest of the upper-cased password; 2005 dropped it.
pub fn mssql(password: &str, salt: &[u8], with_upper: bool) -> String {
    let digest = |text: &str| Sha1::new().chain_update(utf16le(text)).chain_update(salt).finalize();

    let mut blob = salt.to_vec();
    blob.extend_from_slice(&digest(password));
    if with_upper {
        blob.extend_from_slice(&digest(&password.to_uppercase()));
    }
    format!("0x0100{}", hex::encode_upper(blob))
}

/// Pre-4.1 MySQL `PASSWORD()`; spaces and tabs are ignored.
pub fn mysql323(password: &[u8]) -> String {
    let (mut nr, mut add, mut nr2) = (1_345_345_333u32, 7u32, 0x1234_5671u32);
    for byte in password.iter().filter(|b| !matches!(b, b' ' | b'\t')) {
        let c = u32::from(*byte);
        nr ^= (nr & 63).wrapping_add(add).wrapping_mul(c).wrapping_add(nr << 8);
        nr2 = nr2.wrapping_add((nr2 << 8) ^ nr);
        add = add.wrapping_add(c);
    }
    format!("{:08x}{:08x}", nr & 0x7fff_ffff, nr2 & 0x7fff_ffff)
}

pub fn oracle10(password: &str, user: &str) -> String {
    let data = utf16be(&format!("{user}{password}").to_uppercase());
    let key = des_cbc_last_block(ORACLE10_KEY, &data);
    hex::encode_upper(des_cbc_last_block(key, &data))
}

pub fn oracle11(password: &[u8], salt: &[u8]) -> String {
    let digest = Sha1::new().chain_update(password).chain_update(salt).finalize();
    format!("S:{}{}", hex::encode_upper(digest), hex::encode_upper(salt))
}

/// FreeBSD MD5-crypt with a configurable magic prefix (`$1$`, `$apr1$`).
pub fn md5_crypt(password: &[u8], salt: &str, magic: &str) -> String {
    let alternate = Md5::new()
        .chain_update(password)
        .chain_update(salt)
        .chain_update(password)
        .finalize();

    let mut ctx = Md5::new().chain_update(password).chain_update(magic).chain_update(salt);
    for offset in (0..password.len()).step_by(16) {
        ctx.update(&alternate[..16.min(password.len() - offset)]);
    }

    let mut bits = password.len();
    while bits > 0 {
        if bits & 1 == 1 {
            ctx.update([0u8]);
        } else {
            ctx.update(&password[..1]);
        }
        bits >>= 1;
    }

    let mut digest = ctx.finalize();
    for round in 0..1000 {
        let mut ctx = Md5::new();
        if round % 2 == 1 {
            ctx.update(password);
        } else {
            ctx.update(&digest);
        }
        if round % 3 != 0 {
            ctx.update(salt);
        }
        if round % 7 != 0 {
            ctx.update(password);
        }
        if round % 2 == 1 {
            ctx.update(&digest);
        } else {
            ctx.update(password);
        }
        digest = ctx.finalize();
    }

    let ordered: Vec<u8> = MD5_CRYPT_ORDER.iter().map(|i| digest[*i]).collect();
    format!("{magic}{salt}${}", h64_encode(&ordered))
}

/// Portable PHP password hash; `rounds` is log2 of the iteration count.
pub fn phpass(password: &[u8], salt: &str, rounds: u32, ident: &str) -> Result<String, String> {
    let cost = HASH64_CHARS
        .get(rounds as usize)
        .filter(|_| rounds <= 30)
        .ok_or_else(|| format!("rounds {rounds} out of range"))?;

    let mut digest = Md5::new().chain_update(salt).chain_update(password).finalize();
    for _ in 0..(1u64 << rounds) {
        digest = Md5::new().chain_update(&digest).chain_update(password).finalize();
    }
    Ok(format!("${ident}${}{salt}{}", char::from(*cost), h64_encode(&digest)))
}

fn fshp_digest<D: Digest>(salt: &[u8], password: &[u8], rounds: u32) -> Vec<u8> {
    let mut digest = D::new().chain_update(salt).chain_update(password).finalize();
    for _ in 1..rounds {
        digest = D::digest(&digest);
    }
    digest.to_vec()
}

/// Fairly Secure Hashed Password; `variant` picks SHA-1, -256, -384 or -512.
pub fn fshp(password: &[u8], salt: &[u8], rounds: u32, variant: u8) -> Result<String, String> {
    let digest = match variant {
        0 => fshp_digest::<Sha1>(salt, password, rounds),
        1 => fshp_digest::<Sha256>(salt, password, rounds),
        2 => fshp_digest::<Sha384>(salt, password, rounds),
        3 => fshp_digest::<Sha512>(salt, password, rounds),
        other => return Err(format!("unknown variant {other}")),
    };

    let mut blob = salt.to_vec();
    blob.extend_from_slice(&digest);
    Ok(format!("{{FSHP{variant}|{}|{rounds}}}{}", salt.len(), STANDARD.encode(blob)))
}

/// Traditional DES crypt extended over every 8-byte block of the password.
pub fn bigcrypt(password: &[u8], salt: &str) -> Result<String, pwhash::error::Error> {
    let blocks: Vec<&[u8]> = if password.is_empty() {
        vec![password]
    } else {
        password.chunks(8).collect()
    };

    let mut out = salt.to_string();
    let mut block_salt = salt.to_string();
    for block in blocks {
        let crypted = pwhash::unix_crypt::hash_with(&block_salt, block)?;
        let checksum = crypted.get(2..).unwrap_or_default();
        out.push_str(checksum);
        block_salt = checksum.chars().take(2).collect();
    }
    Ok(out)
}
