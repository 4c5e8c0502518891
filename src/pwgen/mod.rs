//! Random password and passphrase generation.

use std::collections::HashSet;
use std::sync::LazyLock;

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use thiserror::Error;

const ASCII_62: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const ASCII_50: &str = "234679abcdefghjkmnpqrstuvwxyzACDEFGHJKMNPQRTUVWXYZ";
const ASCII_72: &str =
    "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz!@#$%^&*?/";
const HEX: &str = "0123456789abcdef";

const EFF_LONG: &str = include_str!("wordsets/eff_long.txt");
const EFF_SHORT: &str = include_str!("wordsets/eff_short.txt");
const EFF_PREFIXED: &str = include_str!("wordsets/eff_prefixed.txt");
const BIP39: &str = include_str!("wordsets/bip39.txt");

pub const DEFAULT_CHARSET: &str = "ascii_62";
pub const DEFAULT_WORDSET: &str = "eff_long";
pub const DEFAULT_SEPARATOR: &str = " ";

/// Upper bound on requested entropy. Larger values only inflate the output.
pub const MAX_ENTROPY: u32 = 1024;

pub const WORDSETS: &[&str] = &["eff_long", "eff_short", "eff_prefixed", "bip39"];

static WORDSET_CACHE: LazyLock<Vec<(&'static str, SymbolSet)>> = LazyLock::new(|| {
    [("eff_long", EFF_LONG), ("eff_short", EFF_SHORT), ("eff_prefixed", EFF_PREFIXED), ("bip39", BIP39)]
        .into_iter()
        .filter_map(|(name, text)| {
            let words = text.lines().map(str::trim).filter(|w| !w.is_empty());
            SymbolSet::from_words(words).ok().map(|set| (name, set))
        })
        .collect()
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PwgenError {
    #[error("Unknown charset {0:?}")]
    UnknownCharset(String),

    #[error("Unknown wordset {0:?}")]
    UnknownWordset(String),

    #[error("At least 2 distinct symbols are required, got {0}")]
    TooFewSymbols(usize),

    #[error("Entropy must be between 1 and {MAX_ENTROPY}: {0}")]
    InvalidEntropy(i64),
}

/// Alphabet a password is drawn from: single characters or whole words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSet {
    symbols: Vec<String>,
}

impl SymbolSet {
    fn new(symbols: impl IntoIterator<Item = String>) -> Result<Self, PwgenError> {
        let mut seen = HashSet::new();
        let unique: Vec<String> = symbols
            .into_iter()
            .filter(|symbol| seen.insert(symbol.clone()))
            .collect();

        if unique.len() < 2 {
            return Err(PwgenError::TooFewSymbols(unique.len()));
        }

        Ok(Self { symbols: unique })
    }

    pub fn from_chars(chars: &str) -> Result<Self, PwgenError> {
        Self::new(chars.chars().map(String::from))
    }

    pub fn from_words<I, S>(words: I) -> Result<Self, PwgenError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(words.into_iter().map(Into::into))
    }

    pub fn charset(name: &str) -> Result<Self, PwgenError> {
        let chars = match name {
            "ascii_62" => ASCII_62,
            "ascii_50" => ASCII_50,
            "ascii_72" => ASCII_72,
            "hex" => HEX,
            other => return Err(PwgenError::UnknownCharset(other.to_string())),
        };
        Self::from_chars(chars)
    }

    pub fn wordset(name: &str) -> Result<Self, PwgenError> {
        WORDSET_CACHE
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, set)| set.clone())
            .ok_or_else(|| PwgenError::UnknownWordset(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Number of symbols needed to reach `entropy` bits.
    pub fn length_for(&self, entropy: u32) -> usize {
        let per_symbol = (self.symbols.len() as f64).log2();
        (f64::from(entropy) / per_symbol).ceil() as usize
    }

    /// Draw enough symbols uniformly from the OS RNG to reach `entropy` bits.
    pub fn generate(&self, entropy: u32, separator: &str) -> String {
        let mut rng = OsRng;
        (0..self.length_for(entropy))
            .filter_map(|_| self.symbols.choose(&mut rng).map(String::as_str))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Validate a requested entropy value in bits.
pub fn entropy_bits(value: i64) -> Result<u32, PwgenError> {
    u32::try_from(value)
        .ok()
        .filter(|bits| (1..=MAX_ENTROPY).contains(bits))
        .ok_or(PwgenError::InvalidEntropy(value))
}
