use argon2::password_hash::{PasswordHasher, SaltString};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use pwhash::HashSetup;
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use super::encoding::{
    ab64_encode, b64_nopad, decode_bcrypt_salt, encode_bcrypt_salt, is_hash64, random_alnum,
    random_bytes, random_hash64,
};
use super::legacy::{self, LmEncoding};
use super::parameter::{ParamValue, Setting};
use super::HashError;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};

/// Working memory ceiling for a single scrypt derivation.
const SCRYPT_MAX_MEMORY: u64 = 1 << 30;

/// Settings gathered from request properties, applied at hash time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemeSettings {
    pub salt: Option<String>,
    pub salt_size: Option<usize>,
    pub rounds: Option<u32>,
    pub memory_cost: Option<u32>,
    pub parallelism: Option<u32>,
    pub digest_size: Option<usize>,
    pub block_size: Option<u32>,
    pub ident: Option<String>,
    pub user: Option<String>,
    pub algs: Option<Vec<String>>,
    pub encoding: Option<String>,
    pub variant: Option<u8>,
}

impl SchemeSettings {
    pub fn set(&mut self, setting: Setting, value: ParamValue) -> Result<(), HashError> {
        match (setting, value) {
            (Setting::Salt, ParamValue::Text(s)) => self.salt = Some(s),
            (Setting::Ident, ParamValue::Text(s)) => self.ident = Some(s),
            (Setting::User, ParamValue::Text(s)) => self.user = Some(s),
            (Setting::Algs, ParamValue::TextList(items)) => self.algs = Some(items),
            (Setting::Encoding, ParamValue::Text(s)) => self.encoding = Some(s),
            (Setting::Variant, ParamValue::Integer(n)) => self.variant = Some(narrow(setting, n)?),
            (Setting::SaltSize, ParamValue::Integer(n)) => self.salt_size = Some(narrow(setting, n)?),
            (Setting::DigestSize, ParamValue::Integer(n)) => {
                self.digest_size = Some(narrow(setting, n)?)
            }
            (Setting::Rounds, ParamValue::Integer(n)) => self.rounds = Some(narrow(setting, n)?),
            (Setting::MemoryCost, ParamValue::Integer(n)) => {
                self.memory_cost = Some(narrow(setting, n)?)
            }
            (Setting::Parallelism, ParamValue::Integer(n)) => {
                self.parallelism = Some(narrow(setting, n)?)
            }
            (Setting::BlockSize, ParamValue::Integer(n)) => {
                self.block_size = Some(narrow(setting, n)?)
            }
            (setting, value) => {
                return Err(HashError::OutOfRange {
                    setting,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn narrow<T: TryFrom<i64>>(setting: Setting, value: i64) -> Result<T, HashError> {
    T::try_from(value).map_err(|_| HashError::OutOfRange {
        setting,
        value: value.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Argon2,
    DjangoArgon2,
    Bcrypt,
    DjangoBcrypt,
    Pbkdf2Sha1,
    Pbkdf2Sha256,
    Pbkdf2Sha512,
    DjangoPbkdf2Sha256,
    GrubPbkdf2Sha512,
    Scram,
    Scrypt,
    Md5Crypt,
    Sha1Crypt,
    Sha256Crypt,
    Sha512Crypt,
    BsdiCrypt,
    DesCrypt,
    HexMd5,
    HexSha1,
    HexSha256,
    HexSha512,
    LdapMd5,
    LdapSha1,
    LdapSaltedMd5,
    LdapSaltedSha1,
    DjangoSaltedMd5,
    DjangoSaltedSha1,
    Mysql41,
    PostgresMd5,
    BcryptSha256,
    DjangoBcryptSha256,
    AprMd5Crypt,
    BigCrypt,
    BsdNthash,
    CtaPbkdf2Sha1,
    DjangoDesCrypt,
    DlitzPbkdf2Sha1,
    Fshp,
    HexMd4,
    Lmhash,
    Msdcc,
    Msdcc2,
    Mssql2000,
    Mssql2005,
    Mysql323,
    Nthash,
    Oracle10,
    Oracle11,
    Phpass,
}

impl Scheme {
    /// Hash `password` using `settings`, filling unspecified settings with
    /// the format's defaults and a fresh random salt.
    pub fn hash(&self, name: &str, password: &[u8], settings: &SchemeSettings) -> Result<String, HashError> {
        let backend = |message: String| HashError::Backend {
            scheme: name.to_string(),
            message,
        };

        match self {
            Scheme::Argon2 => argon2_phc(name, password, settings),
            Scheme::DjangoArgon2 => Ok(format!("argon2{}", argon2_phc(name, password, settings)?)),
            Scheme::Bcrypt => bcrypt_hash(name, password, settings),
            Scheme::DjangoBcrypt => Ok(format!("bcrypt${}", bcrypt_hash(name, password, settings)?)),
            Scheme::BcryptSha256 => bcrypt_sha256_hash(name, password, settings),
            Scheme::DjangoBcryptSha256 => {
                let digest = hex::encode(Sha256::digest(password));
                Ok(format!(
                    "bcrypt_sha256${}",
                    bcrypt_hash(name, digest.as_bytes(), settings)?
                ))
            }
            Scheme::Pbkdf2Sha1 => {
                let (rounds, salt) = pbkdf2_inputs(settings, 131_000, 16);
                let dk = Prf::Sha1.derive(password, &salt, rounds, 20);
                Ok(format!("$pbkdf2${rounds}${}${}", ab64_encode(&salt), ab64_encode(&dk)))
            }
            Scheme::Pbkdf2Sha256 => {
                let (rounds, salt) = pbkdf2_inputs(settings, 29_000, 16);
                let dk = Prf::Sha256.derive(password, &salt, rounds, 32);
                Ok(format!(
                    "$pbkdf2-sha256${rounds}${}${}",
                    ab64_encode(&salt),
                    ab64_encode(&dk)
                ))
            }
            Scheme::Pbkdf2Sha512 => {
                let (rounds, salt) = pbkdf2_inputs(settings, 25_000, 16);
                let dk = Prf::Sha512.derive(password, &salt, rounds, 64);
                Ok(format!(
                    "$pbkdf2-sha512${rounds}${}${}",
                    ab64_encode(&salt),
                    ab64_encode(&dk)
                ))
            }
            Scheme::DjangoPbkdf2Sha256 => {
                let rounds = settings.rounds.unwrap_or(29_000);
                let salt = text_salt(name, settings, 12)?;
                let dk = Prf::Sha256.derive(password, salt.as_bytes(), rounds, 32);
                Ok(format!("pbkdf2_sha256${rounds}${salt}${}", STANDARD.encode(dk)))
            }
            Scheme::GrubPbkdf2Sha512 => {
                let (rounds, salt) = pbkdf2_inputs(settings, 19_000, 64);
                let dk = Prf::Sha512.derive(password, &salt, rounds, 64);
                Ok(format!(
                    "grub.pbkdf2.sha512.{rounds}.{}.{}",
                    hex::encode_upper(&salt),
                    hex::encode_upper(&dk)
                ))
            }
            Scheme::Scram => scram_hash(password, settings),
            Scheme::Scrypt => {
                let salt = byte_salt(settings, 16);
                let log_n = settings.rounds.unwrap_or(16);
                let r = settings.block_size.unwrap_or(8);
                let log_n = u8::try_from(log_n).map_err(|_| backend(format!("rounds {log_n} too large")))?;
                let memory = 1u64
                    .checked_shl(u32::from(log_n))
                    .and_then(|n| n.checked_mul(128 * u64::from(r)));
                if !memory.is_some_and(|bytes| bytes <= SCRYPT_MAX_MEMORY) {
                    return Err(HashError::TooExpensive {
                        scheme: name.to_string(),
                        reason: format!("ln={log_n}, r={r} needs more than {SCRYPT_MAX_MEMORY} bytes"),
                    });
                }
                let params = scrypt::Params::new(log_n, r, 1, 32).map_err(|e| backend(e.to_string()))?;
                let mut dk = [0u8; 32];
                scrypt::scrypt(password, &salt, &params, &mut dk).map_err(|e| backend(e.to_string()))?;
                Ok(format!(
                    "$scrypt$ln={log_n},r={r},p=1${}${}",
                    b64_nopad(&salt),
                    b64_nopad(&dk)
                ))
            }
            Scheme::Md5Crypt => {
                let salt = crypt_salt(name, settings, 8)?;
                pwhash::md5_crypt::hash_with(setup(&salt, None), password).map_err(|e| backend(e.to_string()))
            }
            Scheme::Sha1Crypt => {
                let salt = crypt_salt(name, settings, 8)?;
                let rounds = settings.rounds.unwrap_or(480_000);
                pwhash::sha1_crypt::hash_with(setup(&salt, Some(rounds)), password)
                    .map_err(|e| backend(e.to_string()))
            }
            Scheme::Sha256Crypt => {
                let salt = crypt_salt(name, settings, 16)?;
                let rounds = settings.rounds.unwrap_or(535_000);
                pwhash::sha256_crypt::hash_with(setup(&salt, Some(rounds)), password)
                    .map_err(|e| backend(e.to_string()))
            }
            Scheme::Sha512Crypt => {
                let salt = crypt_salt(name, settings, 16)?;
                let rounds = settings.rounds.unwrap_or(656_000);
                pwhash::sha512_crypt::hash_with(setup(&salt, Some(rounds)), password)
                    .map_err(|e| backend(e.to_string()))
            }
            Scheme::BsdiCrypt => {
                let salt = crypt_salt(name, settings, 4)?;
                let rounds = settings.rounds.unwrap_or(5001);
                pwhash::bsdi_crypt::hash_with(setup(&salt, Some(rounds)), password)
                    .map_err(|e| backend(e.to_string()))
            }
            Scheme::DesCrypt => {
                let salt = crypt_salt(name, settings, 2)?;
                pwhash::unix_crypt::hash_with(&salt, password).map_err(|e| backend(e.to_string()))
            }
            Scheme::DjangoDesCrypt => {
                let salt = crypt_salt(name, settings, 2)?;
                let hash = pwhash::unix_crypt::hash_with(&salt, password).map_err(|e| backend(e.to_string()))?;
                Ok(format!("crypt${salt}${hash}"))
            }
            Scheme::BigCrypt => {
                let salt = crypt_salt(name, settings, 2)?;
                legacy::bigcrypt(password, &salt).map_err(|e| backend(e.to_string()))
            }
            Scheme::AprMd5Crypt => {
                let salt = crypt_salt(name, settings, 8)?;
                Ok(legacy::md5_crypt(password, &salt, "$apr1$"))
            }
            Scheme::Phpass => {
                let salt = crypt_salt(name, settings, 8)?;
                let rounds = settings.rounds.unwrap_or(19);
                let ident = settings.ident.as_deref().unwrap_or("P");
                legacy::phpass(password, &salt, rounds, ident).map_err(backend)
            }
            Scheme::CtaPbkdf2Sha1 => {
                let (rounds, salt) = pbkdf2_inputs(settings, 10_000, 16);
                let dk = Prf::Sha1.derive(password, &salt, rounds, 20);
                Ok(format!("$p5k2${rounds:x}${}${}", URL_SAFE.encode(&salt), URL_SAFE.encode(dk)))
            }
            Scheme::DlitzPbkdf2Sha1 => {
                let rounds = settings.rounds.unwrap_or(60_000);
                let salt = crypt_salt(name, settings, 16)?;
                // 400 rounds is encoded as an empty rounds field
                let config = if rounds == 400 {
                    format!("$p5k2$${salt}")
                } else {
                    format!("$p5k2${rounds:x}${salt}")
                };
                let dk = Prf::Sha1.derive(password, config.as_bytes(), rounds, 24);
                Ok(format!("{config}${}", ab64_encode(&dk)))
            }
            Scheme::Fshp => {
                let salt = byte_salt(settings, 16);
                let rounds = settings.rounds.unwrap_or(480_000);
                legacy::fshp(password, &salt, rounds, settings.variant.unwrap_or(1)).map_err(backend)
            }
            Scheme::HexMd4 => Ok(legacy::md4_hex(password)),
            Scheme::HexMd5 => Ok(hex::encode(Md5::digest(password))),
            Scheme::HexSha1 => Ok(hex::encode(Sha1::digest(password))),
            Scheme::HexSha256 => Ok(hex::encode(Sha256::digest(password))),
            Scheme::HexSha512 => Ok(hex::encode(Sha512::digest(password))),
            Scheme::LdapMd5 => Ok(format!("{{MD5}}{}", STANDARD.encode(Md5::digest(password)))),
            Scheme::LdapSha1 => Ok(format!("{{SHA}}{}", STANDARD.encode(Sha1::digest(password)))),
            Scheme::LdapSaltedMd5 => {
                let salt = byte_salt(settings, 4);
                let mut blob = Md5::new().chain_update(password).chain_update(&salt).finalize().to_vec();
                blob.extend_from_slice(&salt);
                Ok(format!("{{SMD5}}{}", STANDARD.encode(blob)))
            }
            Scheme::LdapSaltedSha1 => {
                let salt = byte_salt(settings, 4);
                let mut blob = Sha1::new().chain_update(password).chain_update(&salt).finalize().to_vec();
                blob.extend_from_slice(&salt);
                Ok(format!("{{SSHA}}{}", STANDARD.encode(blob)))
            }
            Scheme::DjangoSaltedMd5 => {
                let salt = text_salt(name, settings, 12)?;
                let digest = Md5::new().chain_update(salt.as_bytes()).chain_update(password).finalize();
                Ok(format!("md5${salt}${}", hex::encode(digest)))
            }
            Scheme::DjangoSaltedSha1 => {
                let salt = text_salt(name, settings, 12)?;
                let digest = Sha1::new().chain_update(salt.as_bytes()).chain_update(password).finalize();
                Ok(format!("sha1${salt}${}", hex::encode(digest)))
            }
            Scheme::Mysql41 => {
                let inner = Sha1::digest(password);
                Ok(format!("*{}", hex::encode_upper(Sha1::digest(inner))))
            }
            Scheme::PostgresMd5 => {
                let user = required_user(name, settings)?;
                let digest = Md5::new().chain_update(password).chain_update(user.as_bytes()).finalize();
                Ok(format!("md5{}", hex::encode(digest)))
            }
            Scheme::Mysql323 => Ok(legacy::mysql323(password)),
            Scheme::Nthash => Ok(hex::encode(legacy::nthash(text_password(name, password)?))),
            Scheme::BsdNthash => Ok(format!(
                "$3$${}",
                hex::encode(legacy::nthash(text_password(name, password)?))
            )),
            Scheme::Lmhash => {
                let encoding = match settings.encoding.as_deref() {
                    None => LmEncoding::Cp437,
                    Some(encoding) => LmEncoding::parse(encoding)
                        .ok_or_else(|| backend(format!("unknown encoding {encoding:?}")))?,
                };
                legacy::lmhash(text_password(name, password)?, encoding).map_err(|reason| {
                    HashError::InvalidPassword {
                        scheme: name.to_string(),
                        reason,
                    }
                })
            }
            Scheme::Msdcc => {
                let user = required_user(name, settings)?;
                Ok(hex::encode(legacy::msdcc(text_password(name, password)?, user)))
            }
            Scheme::Msdcc2 => {
                let user = required_user(name, settings)?;
                Ok(hex::encode(legacy::msdcc2(text_password(name, password)?, user)))
            }
            Scheme::Mssql2000 | Scheme::Mssql2005 => {
                let salt = mssql_salt(name, settings)?;
                let with_upper = *self == Scheme::Mssql2000;
                Ok(legacy::mssql(text_password(name, password)?, &salt, with_upper))
            }
            Scheme::Oracle10 => {
                let user = required_user(name, settings)?;
                Ok(legacy::oracle10(text_password(name, password)?, user))
            }
            Scheme::Oracle11 => {
                let salt = match &settings.salt {
                    Some(salt) => hex::decode(salt)
                        .ok()
                        .filter(|bytes| bytes.len() == 10)
                        .ok_or_else(|| HashError::InvalidSalt {
                            scheme: name.to_string(),
                            reason: "salt must be 20 hexadecimal characters".to_string(),
                        })?,
                    None => random_bytes(10),
                };
                Ok(legacy::oracle11(password, &salt))
            }
        }
    }
}

fn required_user<'a>(name: &str, settings: &'a SchemeSettings) -> Result<&'a str, HashError> {
    settings.user.as_deref().ok_or_else(|| HashError::MissingSetting {
        scheme: name.to_string(),
        property: "User",
    })
}

/// Windows and Oracle formats hash the password as UTF-16 text.
fn text_password<'a>(name: &str, password: &'a [u8]) -> Result<&'a str, HashError> {
    std::str::from_utf8(password).map_err(|_| HashError::InvalidPassword {
        scheme: name.to_string(),
        reason: "password is not valid UTF-8".to_string(),
    })
}

fn mssql_salt(name: &str, settings: &SchemeSettings) -> Result<Vec<u8>, HashError> {
    match &settings.salt {
        Some(salt) if salt.len() != 4 => Err(HashError::InvalidSalt {
            scheme: name.to_string(),
            reason: "salt must be exactly 4 bytes".to_string(),
        }),
        Some(salt) => Ok(salt.as_bytes().to_vec()),
        None => Ok(random_bytes(4)),
    }
}

fn setup(salt: &str, rounds: Option<u32>) -> HashSetup<'_> {
    HashSetup {
        salt: Some(salt),
        rounds,
    }
}

/// Explicit salt taken verbatim as bytes, else `default_size` random bytes.
fn byte_salt(settings: &SchemeSettings, default_size: usize) -> Vec<u8> {
    match &settings.salt {
        Some(salt) => salt.as_bytes().to_vec(),
        None => random_bytes(settings.salt_size.unwrap_or(default_size)),
    }
}

fn pbkdf2_inputs(settings: &SchemeSettings, default_rounds: u32, default_salt: usize) -> (u32, Vec<u8>) {
    (settings.rounds.unwrap_or(default_rounds), byte_salt(settings, default_salt))
}

#[derive(Debug, Clone, Copy)]
enum Prf {
    Sha1,
    Sha256,
    Sha512,
}

impl Prf {
    fn derive(self, password: &[u8], salt: &[u8], rounds: u32, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        match self {
            Prf::Sha1 => pbkdf2::pbkdf2_hmac::<Sha1>(password, salt, rounds, &mut out),
            Prf::Sha256 => pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, rounds, &mut out),
            Prf::Sha512 => pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, rounds, &mut out),
        }
        out
    }
}

/// Salt embedded as text in a `$`-delimited format.
fn text_salt(name: &str, settings: &SchemeSettings, default_size: usize) -> Result<String, HashError> {
    match &settings.salt {
        Some(salt) if salt.contains('$') => Err(HashError::InvalidSalt {
            scheme: name.to_string(),
            reason: "salt cannot contain '$'".to_string(),
        }),
        Some(salt) => Ok(salt.clone()),
        None => Ok(random_alnum(settings.salt_size.unwrap_or(default_size))),
    }
}

/// Salt restricted to the crypt(3) alphabet.
fn crypt_salt(name: &str, settings: &SchemeSettings, default_size: usize) -> Result<String, HashError> {
    match &settings.salt {
        Some(salt) if !is_hash64(salt) => Err(HashError::InvalidSalt {
            scheme: name.to_string(),
            reason: "salt may only contain characters from [./0-9A-Za-z]".to_string(),
        }),
        Some(salt) => Ok(salt.clone()),
        None => Ok(random_hash64(settings.salt_size.unwrap_or(default_size))),
    }
}

fn argon2_phc(name: &str, password: &[u8], settings: &SchemeSettings) -> Result<String, HashError> {
    let backend = |message: String| HashError::Backend {
        scheme: name.to_string(),
        message,
    };

    let defaults = argon2::Params::default();
    let params = argon2::Params::new(
        settings.memory_cost.unwrap_or(defaults.m_cost()),
        settings.rounds.unwrap_or(defaults.t_cost()),
        settings.parallelism.unwrap_or(defaults.p_cost()),
        Some(settings.digest_size.unwrap_or(argon2::Params::DEFAULT_OUTPUT_LEN)),
    )
    .map_err(|e| backend(e.to_string()))?;

    let salt = SaltString::encode_b64(&byte_salt(settings, 16)).map_err(|e| backend(e.to_string()))?;
    let hasher = argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);
    hasher
        .hash_password(password, &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| backend(e.to_string()))
}

fn bcrypt_salt(name: &str, settings: &SchemeSettings) -> Result<[u8; 16], HashError> {
    match &settings.salt {
        Some(salt) => decode_bcrypt_salt(salt).ok_or_else(|| HashError::InvalidSalt {
            scheme: name.to_string(),
            reason: "salt must be 22 characters from [./A-Za-z0-9]".to_string(),
        }),
        None => {
            let mut salt = [0u8; 16];
            salt.copy_from_slice(&random_bytes(16));
            Ok(salt)
        }
    }
}

fn bcrypt_version(ident: &str) -> bcrypt::Version {
    match ident {
        "2a" => bcrypt::Version::TwoA,
        "2y" => bcrypt::Version::TwoY,
        _ => bcrypt::Version::TwoB,
    }
}

fn bcrypt_hash(name: &str, password: &[u8], settings: &SchemeSettings) -> Result<String, HashError> {
    let salt = bcrypt_salt(name, settings)?;
    let version = bcrypt_version(settings.ident.as_deref().unwrap_or("2b"));

    let parts = bcrypt::hash_with_salt(password, settings.rounds.unwrap_or(12), salt).map_err(|e| {
        HashError::Backend {
            scheme: name.to_string(),
            message: e.to_string(),
        }
    })?;
    Ok(parts.format_for_version(version))
}

/// bcrypt over a base64 HMAC-SHA256 of the password keyed by the salt, so
/// passwords longer than 72 bytes still contribute every byte.
fn bcrypt_sha256_hash(name: &str, password: &[u8], settings: &SchemeSettings) -> Result<String, HashError> {
    let backend = |message: String| HashError::Backend {
        scheme: name.to_string(),
        message,
    };

    let salt = bcrypt_salt(name, settings)?;
    let salt_text = encode_bcrypt_salt(&salt);
    let mut mac = Hmac::<Sha256>::new_from_slice(salt_text.as_bytes()).map_err(|e| backend(e.to_string()))?;
    mac.update(password);
    let key = STANDARD.encode(mac.finalize().into_bytes());

    let ident = settings.ident.as_deref().unwrap_or("2b");
    let rounds = settings.rounds.unwrap_or(12);
    let full = bcrypt::hash_with_salt(key.as_bytes(), rounds, salt)
        .map_err(|e| backend(e.to_string()))?
        .format_for_version(bcrypt_version(ident));
    let checksum = full.get(full.len().saturating_sub(31)..).unwrap_or_default();
    Ok(format!("$bcrypt-sha256$v=2,t={ident},r={rounds}${salt_text}${checksum}"))
}

fn scram_hash(password: &[u8], settings: &SchemeSettings) -> Result<String, HashError> {
    let rounds = settings.rounds.unwrap_or(100_000);
    let salt = byte_salt(settings, 12);

    // sha-1 is always present so the hash can be verified by any scram reader
    let requested = settings
        .algs
        .clone()
        .unwrap_or_else(|| vec!["sha-256".to_string(), "sha-512".to_string()]);
    let algs: Vec<&str> = ["sha-1", "sha-256", "sha-512"]
        .into_iter()
        .filter(|alg| *alg == "sha-1" || requested.iter().any(|r| r == alg))
        .collect();

    let digests: Vec<String> = algs
        .iter()
        .map(|alg| {
            let dk = match *alg {
                "sha-1" => Prf::Sha1.derive(password, &salt, rounds, 20),
                "sha-256" => Prf::Sha256.derive(password, &salt, rounds, 32),
                _ => Prf::Sha512.derive(password, &salt, rounds, 64),
            };
            format!("{alg}={}", ab64_encode(&dk))
        })
        .collect();

    Ok(format!("$scram${rounds}${}${}", ab64_encode(&salt), digests.join(",")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_salt(salt: &str) -> SchemeSettings {
        SchemeSettings {
            salt: Some(salt.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_hex_digests() {
        let settings = SchemeSettings::default();
        assert_eq!(
            Scheme::HexMd5.hash("hex_md5", b"password", &settings).unwrap(),
            "5f4dcc3b5aa765d61d8327deb882cf99"
        );
        assert_eq!(
            Scheme::HexSha1.hash("hex_sha1", b"password", &settings).unwrap(),
            "5baa61e4c9b93f3f0682250b6cf8331b7ee68fd8"
        );
    }

    #[test]
    fn test_mysql41() {
        let hash = Scheme::Mysql41
            .hash("mysql41", b"password", &SchemeSettings::default())
            .unwrap();
        assert_eq!(hash, "*2470C0C06DEE42FD1618BB99005ADCA2EC9D1E19");
    }

    #[test]
    fn test_postgres_md5_requires_user() {
        let err = Scheme::PostgresMd5
            .hash("postgres_md5", b"password", &SchemeSettings::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "User must be specified for scheme postgres_md5");

        let settings = SchemeSettings {
            user: Some("admin".to_string()),
            ..Default::default()
        };
        let hash = Scheme::PostgresMd5.hash("postgres_md5", b"password", &settings).unwrap();
        assert!(hash.starts_with("md5"));
        assert_eq!(hash.len(), 35);
    }

    #[test]
    fn test_pbkdf2_sha256_format() {
        let settings = SchemeSettings {
            rounds: Some(1000),
            ..with_salt("saltsaltsaltsalt")
        };
        let hash = Scheme::Pbkdf2Sha256
            .hash("pbkdf2_sha256", b"password", &settings)
            .unwrap();
        let parts: Vec<&str> = hash.split('$').collect();
        assert_eq!(parts[1], "pbkdf2-sha256");
        assert_eq!(parts[2], "1000");
        assert_eq!(parts[3], ab64_encode(b"saltsaltsaltsalt"));
        assert_eq!(parts.len(), 5);
    }

    #[test]
    fn test_grub_format_is_uppercase_hex() {
        let settings = SchemeSettings {
            rounds: Some(10),
            ..with_salt("abcd")
        };
        let hash = Scheme::GrubPbkdf2Sha512
            .hash("grub_pbkdf2_sha512", b"pw", &settings)
            .unwrap();
        assert!(hash.starts_with("grub.pbkdf2.sha512.10.61626364."));
        assert_eq!(hash.rsplit('.').next().unwrap().len(), 128);
    }

    #[test]
    fn test_scram_always_includes_sha1() {
        let settings = SchemeSettings {
            rounds: Some(10),
            algs: Some(vec!["sha-512".to_string()]),
            ..Default::default()
        };
        let hash = Scheme::Scram.hash("scram", b"pw", &settings).unwrap();
        let digests = hash.rsplit('$').next().unwrap();
        assert!(digests.starts_with("sha-1="));
        assert!(digests.contains(",sha-512="));
        assert!(!digests.contains("sha-256"));
    }

    #[test]
    fn test_crypt_salt_alphabet() {
        let err = Scheme::Md5Crypt
            .hash("md5_crypt", b"pw", &with_salt("bad$"))
            .unwrap_err();
        assert!(matches!(err, HashError::InvalidSalt { .. }));

        let hash = Scheme::Md5Crypt.hash("md5_crypt", b"pw", &with_salt("abcdefgh")).unwrap();
        assert!(hash.starts_with("$1$abcdefgh$"));
    }

    #[test]
    fn test_sha512_crypt_rounds() {
        let settings = SchemeSettings {
            rounds: Some(5000),
            ..with_salt("saltstring")
        };
        let hash = Scheme::Sha512Crypt.hash("sha512_crypt", b"pw", &settings).unwrap();
        assert!(hash.starts_with("$6$"));
    }

    #[test]
    fn test_bcrypt_ident_and_salt() {
        let settings = SchemeSettings {
            rounds: Some(4),
            ident: Some("2a".to_string()),
            ..with_salt("EGdrhbKUv8Oc9vGiXX0HQO")
        };
        let hash = Scheme::Bcrypt.hash("bcrypt", b"pw", &settings).unwrap();
        assert!(hash.starts_with("$2a$04$"));

        let django = Scheme::DjangoBcrypt.hash("django_bcrypt", b"pw", &settings).unwrap();
        assert!(django.starts_with("bcrypt$$2a$04$"));
    }

    #[test]
    fn test_ldap_salted_blob_carries_salt() {
        let hash = Scheme::LdapSaltedSha1
            .hash("ldap_salted_sha1", b"pw", &with_salt("salt"))
            .unwrap();
        let blob = STANDARD.decode(hash.trim_start_matches("{SSHA}")).unwrap();
        assert_eq!(blob.len(), 24);
        assert_eq!(&blob[20..], b"salt");
    }

    #[test]
    fn test_django_salted_rejects_dollar() {
        let err = Scheme::DjangoSaltedMd5
            .hash("django_salted_md5", b"pw", &with_salt("a$b"))
            .unwrap_err();
        assert!(err.to_string().contains("cannot contain '$'"));
    }

    #[test]
    fn test_argon2_phc_string() {
        let settings = SchemeSettings {
            memory_cost: Some(64),
            rounds: Some(1),
            parallelism: Some(1),
            ..with_salt("somesaltvalue")
        };
        let hash = Scheme::Argon2.hash("argon2", b"pw", &settings).unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=64,t=1,p=1$"));
    }

    #[test]
    fn test_des_crypt_with_known_salt() {
        let hash = Scheme::DesCrypt.hash("des_crypt", b"password", &with_salt("ab")).unwrap();
        assert_eq!(hash, "abJnggxhB/yWI");

        let django = Scheme::DjangoDesCrypt
            .hash("django_des_crypt", b"password", &with_salt("ab"))
            .unwrap();
        assert_eq!(django, "crypt$ab$abJnggxhB/yWI");

        let big = Scheme::BigCrypt
            .hash("bigcrypt", b"passwordpassword", &with_salt("ab"))
            .unwrap();
        assert_eq!(big, "abJnggxhB/yWI8NTHMQt1Cew");
    }

    #[test]
    fn test_scrypt_memory_limit() {
        let settings = SchemeSettings {
            rounds: Some(32),
            block_size: Some(8),
            ..Default::default()
        };
        let err = Scheme::Scrypt.hash("scrypt", b"pw", &settings).unwrap_err();
        assert!(matches!(err, HashError::TooExpensive { .. }));
        assert!(err.to_string().starts_with("Parameters for scrypt exceed resource limits"));

        let settings = SchemeSettings {
            rounds: Some(4),
            block_size: Some(1),
            ..with_salt("salt")
        };
        let hash = Scheme::Scrypt.hash("scrypt", b"pw", &settings).unwrap();
        assert!(hash.starts_with("$scrypt$ln=4,r=1,p=1$c2FsdA$"));
    }

    #[test]
    fn test_bcrypt_sha256_format() {
        let settings = SchemeSettings {
            rounds: Some(4),
            ..with_salt("EGdrhbKUv8Oc9vGiXX0HQO")
        };
        let hash = Scheme::BcryptSha256.hash("bcrypt_sha256", b"pw", &settings).unwrap();
        let prefix = "$bcrypt-sha256$v=2,t=2b,r=4$EGdrhbKUv8Oc9vGiXX0HQO$";
        assert!(hash.starts_with(prefix), "{hash}");
        assert_eq!(hash.len(), prefix.len() + 31);

        let django = Scheme::DjangoBcryptSha256
            .hash("django_bcrypt_sha256", b"pw", &settings)
            .unwrap();
        assert!(django.starts_with("bcrypt_sha256$$2b$04$EGdrhbKUv8Oc9vGiXX0HQO"));
    }

    #[test]
    fn test_md5_and_phpass_family() {
        let apr = Scheme::AprMd5Crypt
            .hash("apr_md5_crypt", b"password", &with_salt("5pZSV9va"))
            .unwrap();
        assert_eq!(apr, "$apr1$5pZSV9va$nIQEIClR.vnHUQ6o.XKhS1");

        let settings = SchemeSettings {
            rounds: Some(7),
            ..with_salt("abcdefgh")
        };
        let phpass = Scheme::Phpass.hash("phpass", b"password", &settings).unwrap();
        assert_eq!(phpass, "$P$5abcdefghTirbPJao7vjX0d/TOtGeU/");
    }

    #[test]
    fn test_p5k2_formats() {
        let settings = SchemeSettings {
            rounds: Some(1000),
            ..with_salt("saltsaltsaltsalt")
        };
        let cta = Scheme::CtaPbkdf2Sha1
            .hash("cta_pbkdf2_sha1", b"password", &settings)
            .unwrap();
        assert_eq!(cta, "$p5k2$3e8$c2FsdHNhbHRzYWx0c2FsdA==$2FWw_oC7TQkskizC-81lWlmFAMM=");

        let settings = SchemeSettings {
            rounds: Some(1000),
            ..with_salt("saltsalt")
        };
        let dlitz = Scheme::DlitzPbkdf2Sha1
            .hash("dlitz_pbkdf2_sha1", b"password", &settings)
            .unwrap();
        assert_eq!(dlitz, "$p5k2$3e8$saltsalt$VMsQ8iP5Hx6tl1PsTkMsdcJeTQ2zYW55");

        let settings = SchemeSettings {
            rounds: Some(400),
            ..with_salt("saltsalt")
        };
        let dlitz = Scheme::DlitzPbkdf2Sha1
            .hash("dlitz_pbkdf2_sha1", b"password", &settings)
            .unwrap();
        assert_eq!(dlitz, "$p5k2$$saltsalt$SEEcFh/oAs/ae8lJunW2wRo8/4C3eLGC");
    }

    #[test]
    fn test_fshp_variant() {
        let settings = SchemeSettings {
            rounds: Some(10),
            variant: Some(1),
            ..with_salt("saltsaltsaltsalt")
        };
        let hash = Scheme::Fshp.hash("fshp", b"password", &settings).unwrap();
        assert_eq!(
            hash,
            "{FSHP1|16|10}c2FsdHNhbHRzYWx0c2FsdL+XtaGcmWqjEaLsgI+PkH4zWE4+NR3UX4fpyKL8adTQ"
        );
    }

    #[test]
    fn test_windows_schemes() {
        let none = SchemeSettings::default();
        assert_eq!(
            Scheme::Nthash.hash("nthash", b"password", &none).unwrap(),
            "8846f7eaee8fb117ad06bdd830b7586c"
        );
        assert_eq!(
            Scheme::BsdNthash.hash("bsd_nthash", b"password", &none).unwrap(),
            "$3$$8846f7eaee8fb117ad06bdd830b7586c"
        );
        assert_eq!(
            Scheme::Lmhash.hash("lmhash", b"password", &none).unwrap(),
            "e52cac67419a9a224a3b108f3fa6cb6d"
        );

        let err = Scheme::Lmhash
            .hash("lmhash", "pässword".as_bytes(), &none)
            .unwrap_err();
        assert!(matches!(err, HashError::InvalidPassword { .. }));
        let latin1 = SchemeSettings {
            encoding: Some("latin-1".to_string()),
            ..Default::default()
        };
        assert!(Scheme::Lmhash.hash("lmhash", "pässword".as_bytes(), &latin1).is_ok());

        let err = Scheme::Msdcc2.hash("msdcc2", b"password", &none).unwrap_err();
        assert_eq!(err.to_string(), "User must be specified for scheme msdcc2");
        let admin = SchemeSettings {
            user: Some("Administrator".to_string()),
            ..Default::default()
        };
        assert_eq!(
            Scheme::Msdcc.hash("msdcc", b"password", &admin).unwrap(),
            "25fd08fa89795ed54207e6e8442a6ca0"
        );
        assert_eq!(
            Scheme::Msdcc2.hash("msdcc2", b"password", &admin).unwrap(),
            "4c253e4b65c007a8cd683ea57bc43c76"
        );
    }

    #[test]
    fn test_database_schemes() {
        let none = SchemeSettings::default();
        assert_eq!(
            Scheme::Mysql323.hash("mysql323", b"password", &none).unwrap(),
            "5d2e19393cc5ef67"
        );
        assert_eq!(
            Scheme::HexMd4.hash("hex_md4", b"abc", &none).unwrap(),
            "a448017aaf21d8525fc10ae87aa6729d"
        );

        let scott = SchemeSettings {
            user: Some("scott".to_string()),
            ..Default::default()
        };
        assert_eq!(
            Scheme::Oracle10.hash("oracle10", b"tiger", &scott).unwrap(),
            "F894844C34402B67"
        );

        let hash = Scheme::Oracle11
            .hash("oracle11", b"password", &with_salt("0123456789ABCDEF0123"))
            .unwrap();
        assert_eq!(hash, "S:AE921ED081C9797AEB259E2A298E046290C3A5880123456789ABCDEF0123");
        let err = Scheme::Oracle11
            .hash("oracle11", b"password", &with_salt("not-hex-not-hex-not!"))
            .unwrap_err();
        assert!(matches!(err, HashError::InvalidSalt { .. }));
        let random = Scheme::Oracle11.hash("oracle11", b"password", &none).unwrap();
        assert_eq!(random.len(), 2 + 40 + 20);

        assert_eq!(
            Scheme::Mssql2005.hash("mssql2005", b"password", &with_salt("abcd")).unwrap(),
            "0x0100616263642B5DCEDFDD3509A1E53C2C81B9D6C9B4F7E1C00C"
        );
        let mssql2000 = Scheme::Mssql2000
            .hash("mssql2000", b"password", &with_salt("abcd"))
            .unwrap();
        assert!(mssql2000.ends_with("34E46CA7DA40762DEAB7586D4C9314F2CAEE6911"));
        let err = Scheme::Mssql2005
            .hash("mssql2005", b"pw", &with_salt("äbc"))
            .unwrap_err();
        assert!(matches!(err, HashError::InvalidSalt { .. }));
    }

    #[test]
    fn test_settings_reject_negative_rounds() {
        let mut settings = SchemeSettings::default();
        let err = settings
            .set(Setting::Rounds, ParamValue::Integer(-1))
            .unwrap_err();
        assert!(matches!(err, HashError::OutOfRange { .. }));
    }
}
