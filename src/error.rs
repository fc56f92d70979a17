//! Error types for the pgpvault library.
//!
//! Every operation of the key store and the crypto handler reports one of
//! these variants. Callers pick user-facing copy by matching on the variant;
//! nothing in this crate formats messages for end users.

use std::path::PathBuf;

use thiserror::Error;

use crate::identifier::KeyIdentifier;

/// The main error type for pgpvault operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Key bytes do not parse as any known keyring format
    #[error("Key material could not be parsed as an OpenPGP keyring")]
    InvalidKey,

    /// Key parses but cannot be used for encryption
    #[error("Key is not usable for encryption")]
    UnusableKey,

    /// A secret key for this identifier is already stored
    #[error("Key already exists: {0}")]
    KeyAlreadyExists(KeyIdentifier),

    /// Removing a key file from disk failed
    #[error("Failed to delete key file: {0}")]
    KeyDeletionFailed(#[source] std::io::Error),

    /// The key directory is missing and could not be created
    #[error("Key directory is unavailable: {}", .0.display())]
    KeyDirectoryUnavailable(PathBuf),

    /// Lookup found no matching key
    #[error("Key not found: {0}")]
    KeyNotFound(KeyIdentifier),

    /// The key store holds no keys
    #[error("No keys are available in the key store")]
    NoKeysAvailable,

    /// Zero keys were passed to an encrypt or decrypt call
    #[error("No keys were provided")]
    NoKeysProvided,

    /// The passphrase did not unlock any of the provided keys
    #[error("Incorrect passphrase")]
    IncorrectPassphrase,

    /// Message uses legacy Symmetrically Encrypted Data framing
    #[error("Message uses a non-standard, integrity-unprotected encryption mode")]
    NonStandardAead,

    /// Text is neither a key ID, a fingerprint nor a user ID with an email
    #[error("Invalid key identifier: {0}")]
    InvalidIdentifier(String),

    /// Unrecognized underlying failure
    #[error("Unknown error: {0}")]
    Unknown(#[source] anyhow::Error),
}

/// A specialized Result type for pgpvault operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Unknown(e)
    }
}

impl From<pgp::errors::Error> for Error {
    fn from(e: pgp::errors::Error) -> Self {
        Error::Unknown(e.into())
    }
}

impl Error {
    /// Wrap an I/O failure with a short description of what was attempted.
    pub(crate) fn io(context: impl std::fmt::Display, e: std::io::Error) -> Self {
        Error::Unknown(anyhow::Error::new(e).context(context.to_string()))
    }
}
