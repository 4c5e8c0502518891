use super::models::{BackendProvider, Config};
use crate::pwgen::MAX_ENTROPY;
use thiserror::Error;

/// Upper bound for `server.max_event_bytes`
pub const MAX_EVENT_BYTES_LIMIT: usize = 10 * 1024 * 1024;

/// Upper bound for `password.max_random_bytes`
pub const MAX_RANDOM_BYTES_LIMIT: usize = 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Timeout must be positive: {field}")]
    ZeroTimeout { field: &'static str },

    #[error("max_event_bytes must be between 1 and {limit}, got {actual}")]
    InvalidEventLimit { actual: usize, limit: usize },

    #[error("default_entropy must be between 1 and {limit}, got {actual}")]
    InvalidEntropy { actual: u32, limit: u32 },

    #[error("max_random_bytes must be between 1 and {limit}, got {actual}")]
    InvalidRandomLimit { actual: usize, limit: usize },

    #[error("Backend provider '{0}' requires building with the `aws` feature")]
    ProviderUnavailable(BackendProvider),
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_server(config)?;
    validate_callback(config)?;
    validate_password(config)?;
    validate_backend(config)?;
    Ok(())
}

fn validate_server(config: &Config) -> Result<(), ValidationError> {
    let actual = config.server.max_event_bytes;
    if actual == 0 || actual > MAX_EVENT_BYTES_LIMIT {
        return Err(ValidationError::InvalidEventLimit {
            actual,
            limit: MAX_EVENT_BYTES_LIMIT,
        });
    }
    Ok(())
}

fn validate_callback(config: &Config) -> Result<(), ValidationError> {
    if config.callback.connect_timeout_ms == 0 {
        return Err(ValidationError::ZeroTimeout {
            field: "callback.connect_timeout_ms",
        });
    }
    if config.callback.request_timeout_ms == 0 {
        return Err(ValidationError::ZeroTimeout {
            field: "callback.request_timeout_ms",
        });
    }
    Ok(())
}

fn validate_password(config: &Config) -> Result<(), ValidationError> {
    let entropy = config.password.default_entropy;
    if entropy == 0 || entropy > MAX_ENTROPY {
        return Err(ValidationError::InvalidEntropy {
            actual: entropy,
            limit: MAX_ENTROPY,
        });
    }

    let random = config.password.max_random_bytes;
    if random == 0 || random > MAX_RANDOM_BYTES_LIMIT {
        return Err(ValidationError::InvalidRandomLimit {
            actual: random,
            limit: MAX_RANDOM_BYTES_LIMIT,
        });
    }
    Ok(())
}

fn validate_backend(config: &Config) -> Result<(), ValidationError> {
    if config.backend.provider == BackendProvider::Aws && !cfg!(feature = "aws") {
        return Err(ValidationError::ProviderUnavailable(BackendProvider::Aws));
    }
    Ok(())
}
