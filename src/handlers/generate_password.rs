use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::debug;

use super::properties::Properties;
use super::traits::{HandlerError, HandlerResult, ResourceHandler};
use super::types::LifecycleEvent;
use crate::aws::KeyManagement;
use crate::pwgen::{self, DEFAULT_CHARSET, DEFAULT_SEPARATOR, DEFAULT_WORDSET, SymbolSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PasswordType {
    Word,
    Phrase,
}

impl PasswordType {
    fn as_str(&self) -> &'static str {
        match self {
            PasswordType::Word => "word",
            PasswordType::Phrase => "phrase",
        }
    }
}

fn reject(props: &Properties<'_>, keys: &[&str], password_type: PasswordType) -> Result<(), HandlerError> {
    match keys.iter().find(|key| props.contains(key)) {
        Some(key) => Err(HandlerError::validation(format!(
            r#"{key} cannot be specified when PasswordType is "{}""#,
            password_type.as_str()
        ))),
        None => Ok(()),
    }
}

fn exclusive(props: &Properties<'_>, a: &str, b: &str) -> Result<(), HandlerError> {
    if props.contains(a) && props.contains(b) {
        return Err(HandlerError::validation(format!("{a} and {b} are mutually exclusive")));
    }
    Ok(())
}

fn words(value: &Value) -> Result<Vec<&str>, HandlerError> {
    let invalid = || HandlerError::type_error("Words must be a list of strings");
    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|word| word.as_str().ok_or_else(invalid))
        .collect()
}

/// `Custom::GeneratePassword`: random passwords and passphrases,
/// optionally encrypted before they leave the process.
pub struct GeneratePasswordHandler {
    keys: Arc<dyn KeyManagement>,
    default_entropy: u32,
}

impl GeneratePasswordHandler {
    pub fn new(keys: Arc<dyn KeyManagement>, default_entropy: u32) -> Self {
        Self { keys, default_entropy }
    }

    fn symbols(&self, props: &mut Properties<'_>) -> Result<(SymbolSet, PasswordType), HandlerError> {
        let password_type = match props.take("PasswordType") {
            None => PasswordType::Word,
            Some(Value::String(s)) if s == "word" => PasswordType::Word,
            Some(Value::String(s)) if s == "phrase" => PasswordType::Phrase,
            Some(other) => {
                return Err(HandlerError::validation(format!(
                    r#"PasswordType must be "word" or "phrase": {other}"#
                )));
            }
        };

        match password_type {
            PasswordType::Phrase => {
                reject(props, &["Chars", "Charset"], password_type)?;
                exclusive(props, "Words", "Wordset")?;
                let symbols = match props.take("Words") {
                    Some(value) => SymbolSet::from_words(words(value)?)?,
                    None => SymbolSet::wordset(props.take_str("Wordset")?.unwrap_or(DEFAULT_WORDSET))?,
                };
                Ok((symbols, password_type))
            }
            PasswordType::Word => {
                reject(props, &["Words", "Wordset", "Separator"], password_type)?;
                exclusive(props, "Chars", "Charset")?;
                let symbols = match props.take_str("Chars")? {
                    Some(chars) => SymbolSet::from_chars(chars)?,
                    None => SymbolSet::charset(props.take_str("Charset")?.unwrap_or(DEFAULT_CHARSET))?,
                };
                Ok((symbols, password_type))
            }
        }
    }

    fn entropy(&self, props: &mut Properties<'_>) -> Result<u32, HandlerError> {
        match props.take("Entropy") {
            None => Ok(self.default_entropy),
            Some(value) => {
                let bits = value
                    .as_i64()
                    .ok_or_else(|| HandlerError::validation(format!("Entropy must be an integer: {value}")))?;
                Ok(pwgen::entropy_bits(bits)?)
            }
        }
    }
}

#[async_trait]
impl ResourceHandler for GeneratePasswordHandler {
    async fn handle(&self, event: &LifecycleEvent) -> HandlerResult {
        if event.request_type.is_delete() {
            return Ok(None);
        }

        let mut props = Properties::new(&event.resource_properties);
        let (symbols, password_type) = self.symbols(&mut props)?;
        let separator = match password_type {
            PasswordType::Phrase => props.take_str("Separator")?.unwrap_or(DEFAULT_SEPARATOR),
            PasswordType::Word => "",
        };
        let entropy = self.entropy(&mut props)?;

        let password = symbols.generate(entropy, separator);
        debug!(
            password_type = password_type.as_str(),
            entropy,
            alphabet = symbols.len(),
            length = symbols.length_for(entropy),
            "Generated password"
        );

        let mut data = Map::new();
        match props.take_str("EncryptionKey")? {
            Some(key_id) => {
                let context = props.take_context("EncryptionContext")?;
                let ciphertext = self.keys.encrypt(key_id, password.as_bytes(), &context).await?;
                data.insert("CiphertextBase64Password".to_string(), json!(STANDARD.encode(ciphertext)));
            }
            None => {
                data.insert("PlaintextPassword".to_string(), json!(password));
            }
        }
        Ok(Some(data))
    }
}
