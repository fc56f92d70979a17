//! Engine configuration.
//!
//! The host application usually embeds [`Config`] in its own settings file;
//! every field has a default so an empty table is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::CipherPreference;

/// Settings for the key store layout and outgoing encryption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name of the key directory below the application data directory
    pub key_dir_name: String,
    /// Extension of key files inside the key directory
    pub key_extension: String,
    /// Extension of encrypted password entries
    pub encrypted_extension: String,
    /// Session key cipher for outgoing messages
    pub cipher: CipherPreference,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_dir_name: "keys".to_string(),
            key_extension: "key".to_string(),
            encrypted_extension: "gpg".to_string(),
            cipher: CipherPreference::default(),
        }
    }
}

impl Config {
    /// Key directory for a given application data directory.
    pub fn key_dir(&self, app_data_dir: impl AsRef<Path>) -> PathBuf {
        app_data_dir.as_ref().join(&self.key_dir_name)
    }
}
