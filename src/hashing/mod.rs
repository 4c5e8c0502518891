//! Password hashing schemes and their request parameters.
//!
//! Every supported scheme is described by a static [`HashAlgorithm`]
//! entry: its name, whether it is considered secure, and the ordered set
//! of request properties it accepts. Each property carries its own
//! [`HashParameter`] rule (coercion, optional validator, length and value
//! bounds) and the native [`Setting`] it configures.
//!
//! ```rust,ignore
//! use cfntoolkit::hashing::{self, SchemeSettings};
//!
//! let algorithm = hashing::lookup("sha512_crypt").unwrap();
//! let hash = algorithm.scheme.hash(algorithm.name, b"secret", &SchemeSettings::default())?;
//! ```

mod encoding;
mod legacy;
mod parameter;
mod registry;
mod schemes;

pub use parameter::{
    HashParameter, ParamKind, ParamValue, ParameterError, Setting, coerce_integer,
    parse_truth_value,
};
pub use registry::{HashAlgorithm, algorithms, lookup};
pub use schemes::{Scheme, SchemeSettings};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("Invalid salt for scheme {scheme}: {reason}")]
    InvalidSalt { scheme: String, reason: String },

    #[error("{property} must be specified for scheme {scheme}")]
    MissingSetting {
        scheme: String,
        property: &'static str,
    },

    #[error("Value for {setting} is out of range: {value}")]
    OutOfRange { setting: Setting, value: String },

    #[error("Password cannot be hashed with {scheme}: {reason}")]
    InvalidPassword { scheme: String, reason: String },

    #[error("Parameters for {scheme} exceed resource limits: {reason}")]
    TooExpensive { scheme: String, reason: String },

    #[error("Unable to hash password with {scheme}: {message}")]
    Backend { scheme: String, message: String },
}
