//! # pgpvault
//!
//! The key and crypto engine of a password-store vault, built on
//! [rpgp](https://docs.rs/pgp).
//!
//! This library covers everything between "the user typed a key identifier"
//! and "here are the decrypted bytes":
//!
//! - **Identifiers**: parse key IDs, fingerprints and user IDs
//! - **Key Storage**: a directory of key files with merge/replace rules
//! - **Encryption/Decryption**: to one or many recipients, with failures
//!   classified as wrong passphrase, unusable key or legacy message format
//!
//! ## Quick Start
//!
//! ```no_run
//! use pgpvault::*;
//!
//! let config = Config::default();
//! let provider = PgpProvider::initialize(&config);
//! let store = KeyStore::open("/data/app", &config, provider.clone());
//! let handler = PgpCryptoHandler::new(provider, &config);
//!
//! // Find the key for an entry
//! let id = KeyIdentifier::parse("alice@example.com").unwrap();
//! let key = store.get_key_by_id(&id).unwrap();
//!
//! // Encrypt a password
//! let mut ciphertext = Vec::new();
//! let options = EncryptionOptions::builder().with_ascii_armor(false).build();
//! handler
//!     .encrypt(&[key.clone()], &b"hunter2"[..], &mut ciphertext, &options)
//!     .unwrap();
//!
//! // And decrypt it again
//! let mut plaintext = Vec::new();
//! let options = DecryptionOptions::builder().build();
//! handler
//!     .decrypt(&[key], "passphrase", &ciphertext[..], &mut plaintext, &options)
//!     .unwrap();
//! assert_eq!(plaintext, b"hunter2");
//! ```
//!
//! ## Design
//!
//! Key material is passed around as raw bytes ([`KeyMaterial`]) and parsed
//! on demand. The rpgp configuration lives in a [`PgpProvider`] created once
//! by the host and shared by every component; there is no global state.

// Modules
mod error;
mod types;
mod internal;

mod config;
mod identifier;
mod key_utils;
mod options;
mod provider;
mod handler;

pub mod keystore;

// Re-export error types
pub use error::{Error, Result};

// Re-export all public types
pub use types::{
    CipherPreference,
    KeyMaterial,
};

pub use config::Config;
pub use provider::PgpProvider;

// Re-export identifier types
pub use identifier::{
    KeyId,
    KeyIdentifier,
    UserId,
};

// Re-export key inspection
pub use key_utils::{
    KeyUtils,
    ParsedKeyring,
};

// Re-export option bags
pub use options::{
    CryptoOptions,
    DecryptionOptions,
    DecryptionOptionsBuilder,
    EncryptionOptions,
    EncryptionOptionsBuilder,
};

// Re-export the crypto handler
pub use handler::{
    CryptoHandler,
    PgpCryptoHandler,
};

pub use keystore::KeyStore;
