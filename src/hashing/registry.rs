use super::legacy::LmEncoding;
use super::parameter::{HashParameter, ParamValue, Setting};
use super::schemes::Scheme;

/// Static description of a supported hash scheme
#[derive(Debug)]
pub struct HashAlgorithm {
    pub name: &'static str,
    pub is_secure: bool,
    pub scheme: Scheme,
    /// Accepted request properties, in validation order
    pub parameters: &'static [(&'static str, HashParameter)],
}

fn validate_scram_algs(value: &ParamValue) -> Result<(), String> {
    let ParamValue::TextList(algs) = value else {
        return Err("Algs must be a list".to_string());
    };

    if algs.is_empty() {
        return Err("Algs cannot be empty".to_string());
    }

    for alg in algs {
        if !matches!(alg.as_str(), "sha-1" | "sha-256" | "sha-512") {
            return Err(format!("Invalid Alg value: {alg:?}"));
        }
    }

    if algs.iter().all(|alg| alg == "sha-1") {
        return Err("Alg must contain sha-256 or sha-512".to_string());
    }

    Ok(())
}

fn validate_bcrypt_ident(value: &ParamValue) -> Result<(), String> {
    match value {
        ParamValue::Text(ident) if matches!(ident.as_str(), "2a" | "2b" | "2y") => Ok(()),
        other => Err(format!("Ident must be one of 2a, 2b, 2y: {other}")),
    }
}

fn validate_bcrypt_sha256_ident(value: &ParamValue) -> Result<(), String> {
    match value {
        ParamValue::Text(ident) if matches!(ident.as_str(), "2a" | "2b") => Ok(()),
        other => Err(format!("Ident must be one of 2a, 2b: {other}")),
    }
}

fn validate_phpass_ident(value: &ParamValue) -> Result<(), String> {
    match value {
        ParamValue::Text(ident) if matches!(ident.as_str(), "P" | "H") => Ok(()),
        other => Err(format!("Ident must be one of P, H: {other}")),
    }
}

fn validate_hex(value: &ParamValue) -> Result<(), String> {
    match value {
        ParamValue::Text(text) if text.bytes().all(|b| b.is_ascii_hexdigit()) => Ok(()),
        other => Err(format!("Salt must be hexadecimal: {other}")),
    }
}

fn validate_lm_encoding(value: &ParamValue) -> Result<(), String> {
    match value {
        ParamValue::Text(name) if LmEncoding::parse(name).is_some() => Ok(()),
        other => Err(format!("Encoding must be cp437 or latin-1: {other}")),
    }
}

const U32_MAX: i64 = u32::MAX as i64;

/// Upper bounds for properties that size an allocation
const MAX_SALT_SIZE: i64 = 1024;
const MAX_DIGEST_SIZE: i64 = 1024;
const MAX_BLOCK_SIZE: i64 = 1024;
/// KiB; one gibibyte of argon2 working memory
const MAX_MEMORY_COST: i64 = 1024 * 1024;

const SALT_0_16: HashParameter = HashParameter::text(Setting::Salt).length(0, 16);
const SALT_0_64: HashParameter = HashParameter::text(Setting::Salt).length(0, 64);
const SALT_0_8: HashParameter = HashParameter::text(Setting::Salt).length(0, 8);
const SALT_0_1024: HashParameter = HashParameter::text(Setting::Salt).length(0, 1024);
const SALT_8: HashParameter = HashParameter::text(Setting::Salt).length(8, 8);
const SALT_HEX_20: HashParameter = HashParameter::text(Setting::Salt)
    .length(20, 20)
    .validator(validate_hex);
const SALT_2: HashParameter = HashParameter::text(Setting::Salt).length(2, 2);
const SALT_4: HashParameter = HashParameter::text(Setting::Salt).length(4, 4);
const SALT_4_16: HashParameter = HashParameter::text(Setting::Salt).length(4, 16);
const SALT_22: HashParameter = HashParameter::text(Setting::Salt).length(22, 22);
const SALT_ANY: HashParameter = HashParameter::text(Setting::Salt).min_length(0);

const SALT_SIZE_1: HashParameter = HashParameter::integer(Setting::SaltSize).range(1, MAX_SALT_SIZE);
const SALT_SIZE_0_8: HashParameter = HashParameter::integer(Setting::SaltSize).range(0, 8);
const SALT_SIZE_0_64: HashParameter = HashParameter::integer(Setting::SaltSize).range(0, 64);
const SALT_SIZE_0_1024: HashParameter = HashParameter::integer(Setting::SaltSize).range(0, MAX_SALT_SIZE);
const SALT_SIZE_4_16: HashParameter = HashParameter::integer(Setting::SaltSize).range(4, 16);

const ROUNDS: HashParameter = HashParameter::integer(Setting::Rounds).range(1, U32_MAX);
const ROUNDS_1_32: HashParameter = HashParameter::integer(Setting::Rounds).range(1, 32);
const ROUNDS_1_16777215: HashParameter = HashParameter::integer(Setting::Rounds).range(1, 16_777_215);
const ROUNDS_7_30: HashParameter = HashParameter::integer(Setting::Rounds).range(7, 30);
const ROUNDS_4_31: HashParameter = HashParameter::integer(Setting::Rounds).range(4, 31);
const ROUNDS_1000_999999999: HashParameter =
    HashParameter::integer(Setting::Rounds).range(1000, 999_999_999);

const MEMORY_COST: HashParameter = HashParameter::integer(Setting::MemoryCost).range(0, MAX_MEMORY_COST);
const PARALLELISM: HashParameter = HashParameter::integer(Setting::Parallelism).range(1, U32_MAX);
const DIGEST_SIZE: HashParameter = HashParameter::integer(Setting::DigestSize).range(1, MAX_DIGEST_SIZE);
const BLOCK_SIZE: HashParameter = HashParameter::integer(Setting::BlockSize).range(1, MAX_BLOCK_SIZE);
const VARIANT: HashParameter = HashParameter::integer(Setting::Variant).range(0, 3);
const BCRYPT_IDENT: HashParameter = HashParameter::text(Setting::Ident).validator(validate_bcrypt_ident);
const BCRYPT_SHA256_IDENT: HashParameter =
    HashParameter::text(Setting::Ident).validator(validate_bcrypt_sha256_ident);
const PHPASS_IDENT: HashParameter = HashParameter::text(Setting::Ident).validator(validate_phpass_ident);
const LM_ENCODING: HashParameter = HashParameter::text(Setting::Encoding).validator(validate_lm_encoding);
const USER: HashParameter = HashParameter::text(Setting::User);
const SCRAM_ALGS: HashParameter = HashParameter::text_list(Setting::Algs).validator(validate_scram_algs);

const ARGON2_PARAMS: &[(&str, HashParameter)] = &[
    ("Salt", SALT_0_1024),
    ("SaltSize", SALT_SIZE_0_1024),
    ("Rounds", ROUNDS),
    ("MemoryCost", MEMORY_COST),
    ("Parallelism", PARALLELISM),
    ("DigestSize", DIGEST_SIZE),
];

const BCRYPT_PARAMS: &[(&str, HashParameter)] = &[
    ("Salt", SALT_22),
    ("Rounds", ROUNDS_4_31),
    ("Ident", BCRYPT_IDENT),
];

const BCRYPT_SHA256_PARAMS: &[(&str, HashParameter)] = &[
    ("Salt", SALT_22),
    ("Rounds", ROUNDS_4_31),
    ("Ident", BCRYPT_SHA256_IDENT),
];

const PBKDF2_PARAMS: &[(&str, HashParameter)] = &[
    ("Salt", SALT_0_1024),
    ("SaltSize", SALT_SIZE_0_1024),
    ("Rounds", ROUNDS),
];

const SHA2_CRYPT_PARAMS: &[(&str, HashParameter)] = &[
    ("Salt", SALT_0_16),
    ("Rounds", ROUNDS_1000_999999999),
];

const LDAP_SALTED_PARAMS: &[(&str, HashParameter)] = &[
    ("Salt", SALT_4_16),
    ("SaltSize", SALT_SIZE_4_16),
];

const DJANGO_SALTED_PARAMS: &[(&str, HashParameter)] = &[
    ("Salt", SALT_ANY),
    ("SaltSize", SALT_SIZE_1),
];

const fn algorithm(
    name: &'static str,
    is_secure: bool,
    scheme: Scheme,
    parameters: &'static [(&'static str, HashParameter)],
) -> HashAlgorithm {
    HashAlgorithm {
        name,
        is_secure,
        scheme,
        parameters,
    }
}

static ALGORITHMS: &[HashAlgorithm] = &[
    // Secure
    algorithm("argon2", true, Scheme::Argon2, ARGON2_PARAMS),
    algorithm("bcrypt", true, Scheme::Bcrypt, BCRYPT_PARAMS),
    algorithm("bcrypt_sha256", true, Scheme::BcryptSha256, BCRYPT_SHA256_PARAMS),
    algorithm("pbkdf2_sha256", true, Scheme::Pbkdf2Sha256, PBKDF2_PARAMS),
    algorithm("pbkdf2_sha512", true, Scheme::Pbkdf2Sha512, PBKDF2_PARAMS),
    algorithm(
        "scram",
        true,
        Scheme::Scram,
        &[
            ("Salt", SALT_0_1024),
            ("SaltSize", SALT_SIZE_0_1024),
            ("Rounds", ROUNDS),
            ("Algs", SCRAM_ALGS),
        ],
    ),
    algorithm(
        "scrypt",
        true,
        Scheme::Scrypt,
        &[
            ("Salt", SALT_0_1024),
            ("SaltSize", SALT_SIZE_0_1024),
            ("Rounds", ROUNDS_1_32),
            ("BlockSize", BLOCK_SIZE),
        ],
    ),
    algorithm("sha256_crypt", true, Scheme::Sha256Crypt, SHA2_CRYPT_PARAMS),
    algorithm("sha512_crypt", true, Scheme::Sha512Crypt, SHA2_CRYPT_PARAMS),
    // Secure, application specific
    algorithm("django_argon2", true, Scheme::DjangoArgon2, ARGON2_PARAMS),
    algorithm("django_bcrypt", true, Scheme::DjangoBcrypt, BCRYPT_PARAMS),
    algorithm("django_bcrypt_sha256", true, Scheme::DjangoBcryptSha256, BCRYPT_PARAMS),
    algorithm("django_pbkdf2_sha256", true, Scheme::DjangoPbkdf2Sha256, PBKDF2_PARAMS),
    algorithm("grub_pbkdf2_sha512", true, Scheme::GrubPbkdf2Sha512, PBKDF2_PARAMS),
    // Insecure
    algorithm("apr_md5_crypt", false, Scheme::AprMd5Crypt, &[("Salt", SALT_0_8)]),
    algorithm("bigcrypt", false, Scheme::BigCrypt, &[("Salt", SALT_2)]),
    algorithm(
        "bsdi_crypt",
        false,
        Scheme::BsdiCrypt,
        &[("Salt", SALT_4), ("Rounds", ROUNDS_1_16777215)],
    ),
    algorithm("bsd_nthash", false, Scheme::BsdNthash, &[]),
    algorithm("cta_pbkdf2_sha1", false, Scheme::CtaPbkdf2Sha1, PBKDF2_PARAMS),
    algorithm("des_crypt", false, Scheme::DesCrypt, &[("Salt", SALT_2)]),
    algorithm("django_des_crypt", false, Scheme::DjangoDesCrypt, &[("Salt", SALT_2)]),
    algorithm("django_salted_md5", false, Scheme::DjangoSaltedMd5, DJANGO_SALTED_PARAMS),
    algorithm("django_salted_sha1", false, Scheme::DjangoSaltedSha1, DJANGO_SALTED_PARAMS),
    algorithm("dlitz_pbkdf2_sha1", false, Scheme::DlitzPbkdf2Sha1, PBKDF2_PARAMS),
    algorithm(
        "fshp",
        false,
        Scheme::Fshp,
        &[
            ("Salt", SALT_ANY),
            ("SaltSize", SALT_SIZE_1),
            ("Rounds", ROUNDS),
            ("Variant", VARIANT),
        ],
    ),
    algorithm("hex_md4", false, Scheme::HexMd4, &[]),
    algorithm("hex_md5", false, Scheme::HexMd5, &[]),
    algorithm("hex_sha1", false, Scheme::HexSha1, &[]),
    algorithm("hex_sha256", false, Scheme::HexSha256, &[]),
    algorithm("hex_sha512", false, Scheme::HexSha512, &[]),
    algorithm("ldap_md5", false, Scheme::LdapMd5, &[]),
    algorithm("ldap_sha1", false, Scheme::LdapSha1, &[]),
    algorithm("ldap_salted_md5", false, Scheme::LdapSaltedMd5, LDAP_SALTED_PARAMS),
    algorithm("ldap_salted_sha1", false, Scheme::LdapSaltedSha1, LDAP_SALTED_PARAMS),
    algorithm("lmhash", false, Scheme::Lmhash, &[("Encoding", LM_ENCODING)]),
    algorithm(
        "md5_crypt",
        false,
        Scheme::Md5Crypt,
        &[("Salt", SALT_0_8), ("SaltSize", SALT_SIZE_0_8)],
    ),
    algorithm("msdcc", false, Scheme::Msdcc, &[("User", USER)]),
    algorithm("msdcc2", false, Scheme::Msdcc2, &[("User", USER)]),
    algorithm("mssql2000", false, Scheme::Mssql2000, &[("Salt", SALT_4)]),
    algorithm("mssql2005", false, Scheme::Mssql2005, &[("Salt", SALT_4)]),
    algorithm("mysql323", false, Scheme::Mysql323, &[]),
    algorithm("mysql41", false, Scheme::Mysql41, &[]),
    algorithm("nthash", false, Scheme::Nthash, &[]),
    algorithm("oracle10", false, Scheme::Oracle10, &[("User", USER)]),
    algorithm("oracle11", false, Scheme::Oracle11, &[("Salt", SALT_HEX_20)]),
    algorithm("pbkdf2_sha1", false, Scheme::Pbkdf2Sha1, PBKDF2_PARAMS),
    algorithm(
        "phpass",
        false,
        Scheme::Phpass,
        &[("Salt", SALT_8), ("Rounds", ROUNDS_7_30), ("Ident", PHPASS_IDENT)],
    ),
    algorithm("postgres_md5", false, Scheme::PostgresMd5, &[("User", USER)]),
    algorithm(
        "sha1_crypt",
        false,
        Scheme::Sha1Crypt,
        &[
            ("Salt", SALT_0_64),
            ("SaltSize", SALT_SIZE_0_64),
            ("Rounds", ROUNDS),
        ],
    ),
];

/// Look up a scheme by its normalized name (`-` already replaced by `_`).
pub fn lookup(name: &str) -> Option<&'static HashAlgorithm> {
    ALGORITHMS.iter().find(|algorithm| algorithm.name == name)
}

pub fn algorithms() -> impl Iterator<Item = &'static HashAlgorithm> {
    ALGORITHMS.iter()
}
