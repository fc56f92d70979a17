//! Public type definitions for the pgpvault library.

use pgp::crypto::sym::SymmetricKeyAlgorithm;
use serde::{Deserialize, Serialize};

/// Serialized OpenPGP keyring bytes, public or secret, armored or binary.
///
/// This is the durable form of a key: everything else is derived from it
/// on demand.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial(Vec<u8>);

impl KeyMaterial {
    /// Wrap raw keyring bytes.
    pub fn new(contents: impl Into<Vec<u8>>) -> Self {
        Self(contents.into())
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Take ownership of the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for KeyMaterial {
    fn from(contents: Vec<u8>) -> Self {
        Self(contents)
    }
}

impl From<&[u8]> for KeyMaterial {
    fn from(contents: &[u8]) -> Self {
        Self(contents.to_vec())
    }
}

impl From<String> for KeyMaterial {
    fn from(armored: String) -> Self {
        Self(armored.into_bytes())
    }
}

impl AsRef<[u8]> for KeyMaterial {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// Secret key bytes stay out of logs.
impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyMaterial({} bytes)", self.0.len())
    }
}

/// Symmetric cipher used for the session key of outgoing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CipherPreference {
    /// AES with a 128-bit key
    Aes128,
    /// AES with a 192-bit key
    Aes192,
    /// AES with a 256-bit key
    #[default]
    Aes256,
}

impl std::str::FromStr for CipherPreference {
    type Err = String;

    /// Parse cipher preference from string (case-insensitive).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aes128" | "aes-128" => Ok(CipherPreference::Aes128),
            "aes192" | "aes-192" => Ok(CipherPreference::Aes192),
            "aes256" | "aes-256" | "aes" => Ok(CipherPreference::Aes256),
            _ => Err(format!("unknown cipher: {}", s)),
        }
    }
}

impl TryFrom<String> for CipherPreference {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CipherPreference> for String {
    fn from(cipher: CipherPreference) -> Self {
        cipher.name().to_string()
    }
}

impl CipherPreference {
    /// Canonical lowercase name, as accepted by `FromStr`.
    pub fn name(&self) -> &'static str {
        match self {
            CipherPreference::Aes128 => "aes128",
            CipherPreference::Aes192 => "aes192",
            CipherPreference::Aes256 => "aes256",
        }
    }

    /// The rpgp algorithm for this preference.
    pub fn symmetric_algorithm(&self) -> SymmetricKeyAlgorithm {
        match self {
            CipherPreference::Aes128 => SymmetricKeyAlgorithm::AES128,
            CipherPreference::Aes192 => SymmetricKeyAlgorithm::AES192,
            CipherPreference::Aes256 => SymmetricKeyAlgorithm::AES256,
        }
    }
}
