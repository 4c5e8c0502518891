use async_trait::async_trait;
use thiserror::Error;

use super::types::{HandlerOutput, LifecycleEvent};
use crate::aws::CollaboratorError;
use crate::hashing::{HashError, ParameterError};
use crate::images::ImageError;
use crate::pwgen::PwgenError;

/// Machine-checkable category of a [`HandlerError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Type,
    UnknownResourceType,
    UnknownScheme,
    InsecureScheme,
    Decryption,
    NoMatch,
    Collaborator,
    Internal,
}

/// Handler errors; the display string becomes the failure reason
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Type(String),

    #[error("Unknown resource type {0}")]
    UnknownResourceType(String),

    #[error("Unknown scheme {0:?}")]
    UnknownScheme(String),

    #[error("Scheme {0} is insecure and AllowInsecure was not specified")]
    InsecureScheme(String),

    #[error("Unable to decrypt CiphertextBase64Password")]
    Decryption,

    #[error("{0}")]
    NoMatch(String),

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error("{0}")]
    Internal(String),
}

impl HandlerError {
    pub fn validation(message: impl Into<String>) -> Self {
        HandlerError::Validation(message.into())
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        HandlerError::Type(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            HandlerError::Validation(_) | HandlerError::Parameter(_) | HandlerError::Hash(_) => {
                ErrorKind::Validation
            }
            HandlerError::Type(_) => ErrorKind::Type,
            HandlerError::UnknownResourceType(_) => ErrorKind::UnknownResourceType,
            HandlerError::UnknownScheme(_) => ErrorKind::UnknownScheme,
            HandlerError::InsecureScheme(_) => ErrorKind::InsecureScheme,
            HandlerError::Decryption => ErrorKind::Decryption,
            HandlerError::NoMatch(_) => ErrorKind::NoMatch,
            HandlerError::Collaborator(_) => ErrorKind::Collaborator,
            HandlerError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<ImageError> for HandlerError {
    fn from(err: ImageError) -> Self {
        if err.is_no_match() {
            HandlerError::NoMatch(err.to_string())
        } else {
            HandlerError::Validation(err.to_string())
        }
    }
}

impl From<PwgenError> for HandlerError {
    fn from(err: PwgenError) -> Self {
        HandlerError::Validation(err.to_string())
    }
}

pub type HandlerResult = Result<HandlerOutput, HandlerError>;

/// A custom resource implementation
///
/// Handlers validate the event's properties, perform their side effect or
/// computation, and return the data to report. They never deliver the
/// response themselves.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    async fn handle(&self, event: &LifecycleEvent) -> HandlerResult;
}
