//! Directory-backed key storage.
//!
//! This module keeps the user's OpenPGP keys as one file per key in a
//! directory, indexed by primary key ID and searchable by user ID email.
//!
//! # Features
//!
//! - **Deterministic merging**: a secret key is never downgraded to a public
//!   one, and repeated public imports are merged rather than duplicated
//! - **Lookup**: find keys by key ID, fingerprint or email
//! - **Plain files**: key files hold the keyring exactly as imported
//!
//! # Basic Usage
//!
//! ```no_run
//! use pgpvault::{Config, KeyIdentifier, KeyMaterial, KeyStore, PgpProvider};
//!
//! let config = Config::default();
//! let provider = PgpProvider::initialize(&config);
//! let store = KeyStore::open("/data/app", &config, provider);
//!
//! // Import a key
//! let key = KeyMaterial::new(std::fs::read("alice.asc").unwrap());
//! store.add_key(key, false).unwrap();
//!
//! // Look it up again by email
//! let id = KeyIdentifier::parse("alice@example.com").unwrap();
//! let alice = store.get_key_by_id(&id).unwrap();
//! ```

mod store;

pub use store::*;
