use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

use super::properties::Properties;
use super::traits::{HandlerError, HandlerResult, ResourceHandler};
use super::types::LifecycleEvent;
use crate::aws::{EncryptionContext, KeyManagement};
use crate::hashing::{self, HashAlgorithm, SchemeSettings, parse_truth_value};

/// Properties accepted alongside any scheme without being parameters.
const TOLERATED: &[&str] = &["ServiceToken"];

enum PasswordSource {
    Plaintext(String),
    Ciphertext {
        ciphertext: Vec<u8>,
        context: EncryptionContext,
    },
}

fn password_source(props: &mut Properties<'_>) -> Result<PasswordSource, HandlerError> {
    match (props.contains("PlaintextPassword"), props.contains("CiphertextBase64Password")) {
        (true, true) => {
            return Err(HandlerError::validation(
                "PlaintextPassword and CiphertextBase64Password are mutually exclusive",
            ));
        }
        (false, false) => {
            return Err(HandlerError::validation(
                "Either PlaintextPassword or CiphertextBase64Password must be specified",
            ));
        }
        _ => {}
    }

    if let Some(plaintext) = props.take_str("PlaintextPassword")? {
        return Ok(PasswordSource::Plaintext(plaintext.to_string()));
    }

    let encoded = props.take_str("CiphertextBase64Password")?.unwrap_or_default();
    let context = props.take_context("EncryptionContext")?;
    let ciphertext = STANDARD
        .decode(encoded)
        .map_err(|_| HandlerError::validation("Invalid base64 encoding in CiphertextBase64Password"))?;

    Ok(PasswordSource::Ciphertext { ciphertext, context })
}

fn allow_insecure(props: &mut Properties<'_>) -> Result<bool, HandlerError> {
    match props.take("AllowInsecure") {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Number(n)) => Ok(n.as_f64().is_some_and(|n| n != 0.0)),
        Some(Value::String(s)) => parse_truth_value(s)
            .ok_or_else(|| HandlerError::validation(format!("invalid truth value {s:?}"))),
        Some(_) => Err(HandlerError::type_error("AllowInsecure must be true or false")),
    }
}

fn resolve_scheme(props: &mut Properties<'_>) -> Result<&'static HashAlgorithm, HandlerError> {
    let scheme = match props.take("Scheme") {
        None => return Err(HandlerError::validation("Scheme must be specified")),
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(HandlerError::type_error("Scheme must be a string")),
    };
    if scheme.is_empty() {
        return Err(HandlerError::validation("Scheme cannot be empty"));
    }

    let allow_insecure = allow_insecure(props)?;
    let algorithm = hashing::lookup(&scheme.replace('-', "_"))
        .ok_or_else(|| HandlerError::UnknownScheme(scheme.to_string()))?;

    if !algorithm.is_secure && !allow_insecure {
        return Err(HandlerError::InsecureScheme(scheme.to_string()));
    }
    Ok(algorithm)
}

fn scheme_settings(
    props: &mut Properties<'_>,
    algorithm: &HashAlgorithm,
) -> Result<SchemeSettings, HandlerError> {
    let mut settings = SchemeSettings::default();
    for (name, parameter) in algorithm.parameters {
        let Some(raw) = props.take(name) else {
            continue;
        };
        let value = parameter.validate(name, raw)?;
        settings.set(parameter.setting, value)?;
    }

    let unknown = props.unknown_keys(TOLERATED);
    if !unknown.is_empty() {
        return Err(HandlerError::validation(format!(
            "Unknown parameters: {}",
            unknown.join(", ")
        )));
    }
    Ok(settings)
}

/// `Custom::HashPassword`: hash a plaintext or encrypted password with a
/// registered scheme.
pub struct HashPasswordHandler {
    keys: Arc<dyn KeyManagement>,
}

impl HashPasswordHandler {
    pub fn new(keys: Arc<dyn KeyManagement>) -> Self {
        Self { keys }
    }

    async fn plaintext(&self, source: PasswordSource) -> Result<Vec<u8>, HandlerError> {
        match source {
            PasswordSource::Plaintext(password) => Ok(password.into_bytes()),
            PasswordSource::Ciphertext { ciphertext, context } => {
                self.keys.decrypt(&ciphertext, &context).await.map_err(|err| {
                    warn!(error = %err, "Failed to decrypt CiphertextBase64Password");
                    HandlerError::Decryption
                })
            }
        }
    }
}

#[async_trait]
impl ResourceHandler for HashPasswordHandler {
    async fn handle(&self, event: &LifecycleEvent) -> HandlerResult {
        if event.request_type.is_delete() {
            return Ok(None);
        }

        let mut props = Properties::new(&event.resource_properties);
        let source = password_source(&mut props)?;
        let algorithm = resolve_scheme(&mut props)?;
        let settings = scheme_settings(&mut props, algorithm)?;
        let password = self.plaintext(source).await?;

        debug!(scheme = algorithm.name, secure = algorithm.is_secure, "Hashing password");
        let hash = tokio::task::spawn_blocking(move || {
            algorithm.scheme.hash(algorithm.name, &password, &settings)
        })
        .await
        .map_err(|e| HandlerError::Internal(format!("Hash task failed: {e}")))??;

        let mut data = Map::new();
        data.insert("Hash".to_string(), json!(hash));
        Ok(Some(data))
    }
}
