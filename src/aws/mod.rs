//! External service collaborators used by the resource handlers.
//!
//! Handlers only see the traits defined here. Two implementations exist:
//! [`memory`] keeps everything in process (development and tests) and
//! `sdk` talks to the real services when built with the `aws` feature.

pub mod memory;
#[cfg(feature = "aws")]
pub mod sdk;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{BackendConfig, BackendProvider};
use crate::images::{FilterSet, ImageRecord};

/// Key/value pairs bound to a ciphertext at encryption time.
pub type EncryptionContext = BTreeMap<String, String>;

/// JSON-pointer path of the "all types" binary media entry.
pub const ALL_BINARY_MEDIA_PATH: &str = "/binaryMediaTypes/*~1*";
pub const ALL_MEDIA_TYPES: &str = "*/*";

/// A call to an external service failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{service} {operation} failed: {message}")]
pub struct CollaboratorError {
    pub service: &'static str,
    pub operation: &'static str,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(service: &'static str, operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            service,
            operation,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend provider '{0}' requires building with the `aws` feature")]
    FeatureDisabled(BackendProvider),
}

#[async_trait]
pub trait ImageLookup: Send + Sync {
    async fn describe_images(
        &self,
        owner: &str,
        filters: &FilterSet,
    ) -> Result<Vec<ImageRecord>, CollaboratorError>;
}

#[async_trait]
pub trait KeyManagement: Send + Sync {
    async fn encrypt(
        &self,
        key_id: &str,
        plaintext: &[u8],
        context: &EncryptionContext,
    ) -> Result<Vec<u8>, CollaboratorError>;

    async fn decrypt(
        &self,
        ciphertext: &[u8],
        context: &EncryptionContext,
    ) -> Result<Vec<u8>, CollaboratorError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOp {
    Add,
    Remove,
}

impl fmt::Display for PatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchOp::Add => f.write_str("add"),
            PatchOp::Remove => f.write_str("remove"),
        }
    }
}

#[async_trait]
pub trait ApiManagement: Send + Sync {
    async fn binary_media_types(&self, rest_api_id: &str) -> Result<Vec<String>, CollaboratorError>;

    async fn patch_binary_media_types(
        &self,
        rest_api_id: &str,
        op: PatchOp,
        path: &str,
    ) -> Result<(), CollaboratorError>;
}

/// Shared, immutable handles to every collaborator
#[derive(Clone)]
pub struct Backends {
    pub images: Arc<dyn ImageLookup>,
    pub keys: Arc<dyn KeyManagement>,
    pub apis: Arc<dyn ApiManagement>,
}

impl Backends {
    pub fn new(
        images: Arc<dyn ImageLookup>,
        keys: Arc<dyn KeyManagement>,
        apis: Arc<dyn ApiManagement>,
    ) -> Self {
        Self { images, keys, apis }
    }

    /// Empty in-process collaborators
    pub fn in_memory() -> Self {
        Self {
            images: Arc::new(memory::MemoryImageLookup::new()),
            keys: Arc::new(memory::MemoryKeyManagement::new()),
            apis: Arc::new(memory::MemoryApiManagement::new()),
        }
    }

    pub async fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        match config.provider {
            BackendProvider::Memory => {
                tracing::info!("Using in-memory collaborators");
                Ok(Self::in_memory())
            }
            #[cfg(feature = "aws")]
            BackendProvider::Aws => Ok(sdk::load(config.region.clone()).await),
            #[cfg(not(feature = "aws"))]
            BackendProvider::Aws => Err(BackendError::FeatureDisabled(BackendProvider::Aws)),
        }
    }
}

/// Decode a JSON-pointer segment (`~1` is `/`, `~0` is `~`).
pub fn unescape_pointer_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
