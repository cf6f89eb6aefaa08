//! use jkskit::error::JksError;

use std::fmt;

use thiserror::Error;

/// Input field of a key pair that was found empty during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Certificate,
    PrivateKey,
    /// Intermediate certificate at the given 0-based position.
    Intermediate(usize),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Certificate => write!(f, "certificate"),
            Field::PrivateKey => write!(f, "private key"),
            Field::Intermediate(i) => write!(f, "intermediate certificate {i}"),
        }
    }
}

/// Represents errors that can occur while building a keystore.
///
/// Every failure is deterministic for a given input, so callers should not
/// retry without changing the input.
#[derive(Debug, Error, Clone)]
pub enum JksError {
    /// The keystore password was never set or is empty.
    #[error("password is not set for store")]
    NoPassword,

    /// An entry was added under an empty alias.
    #[error("alias must not be an empty string")]
    InvalidAlias,

    /// A certificate, key or intermediate certificate was supplied empty.
    #[error("{field} is empty for alias {alias:?}")]
    EmptyField { alias: String, field: Field },

    /// Two aliases differ only by case; JKS readers fold alias case.
    #[error("aliases {first:?} and {second:?} collide when compared without case")]
    AliasCollision { first: String, second: String },

    /// Malformed PEM armor.
    #[error("Failed to decode PEM: {0}")]
    PemDecode(String),

    /// The PEM label or embedded algorithm does not name a supported key type.
    #[error("unknown key type: {0}")]
    UnsupportedKeyType(String),

    /// Malformed DER under a recognized key label.
    #[error("Failed to parse private key: {0}")]
    KeyParse(String),

    /// Malformed certificate at a 0-based chain position (leaf is 0).
    #[error("error parsing certificate {index}: {reason}")]
    CertificateParse { index: usize, reason: String },

    /// A precondition of the key protection algorithm was violated.
    #[error("Key protection error: {0}")]
    KeyProtection(String),

    /// The integrity check of a protected key did not match.
    #[error("wrong password or corrupt key data")]
    WrongPasswordOrCorruptData,

    /// A structural violation detected while writing the keystore image.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    Encoding(String),

    /// A failure attributed to one keystore entry.
    #[error("entry {alias:?}: {source}")]
    Entry {
        alias: String,
        #[source]
        source: Box<JksError>,
    },
}

impl JksError {
    /// Wraps `self` with the alias of the entry that produced it.
    pub fn for_alias(self, alias: &str) -> Self {
        JksError::Entry {
            alias: alias.to_string(),
            source: Box::new(self),
        }
    }

    /// Returns the underlying error with any alias context removed.
    pub fn root(&self) -> &JksError {
        match self {
            JksError::Entry { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<der::Error> for JksError {
    /// Converts a `der::Error` into a `JksError`.
    fn from(err: der::Error) -> Self {
        JksError::Encoding(err.to_string())
    }
}

impl From<pem::PemError> for JksError {
    fn from(err: pem::PemError) -> Self {
        JksError::PemDecode(err.to_string())
    }
}

impl From<pkcs8::Error> for JksError {
    fn from(err: pkcs8::Error) -> Self {
        JksError::KeyParse(err.to_string())
    }
}
