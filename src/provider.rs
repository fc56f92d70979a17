//! OpenPGP provider handle.
//!
//! rpgp has no global policy object, so the choices other OpenPGP stacks
//! keep in process-wide state live here instead. The host creates one
//! [`PgpProvider`] at start-up and hands the `Arc` to every component.

use std::sync::Arc;

use pgp::crypto::sym::SymmetricKeyAlgorithm;
use pgp::types::KeyVersion;

use crate::config::Config;

/// Process-wide OpenPGP settings, passed explicitly.
#[derive(Debug, Clone)]
pub struct PgpProvider {
    symmetric_algorithm: SymmetricKeyAlgorithm,
    accepted_key_versions: Vec<KeyVersion>,
}

impl PgpProvider {
    /// Build the provider from configuration.
    ///
    /// Call once at process start and share the result.
    pub fn initialize(config: &Config) -> Arc<Self> {
        let provider = Self {
            symmetric_algorithm: config.cipher.symmetric_algorithm(),
            // v5 (LibrePGP) keys carry the GnuPG OCB profile we do not support
            accepted_key_versions: vec![KeyVersion::V4, KeyVersion::V6],
        };
        tracing::debug!(
            cipher = ?provider.symmetric_algorithm,
            "initialized OpenPGP provider"
        );
        Arc::new(provider)
    }

    /// Session key cipher for outgoing messages.
    pub fn symmetric_algorithm(&self) -> SymmetricKeyAlgorithm {
        self.symmetric_algorithm
    }

    /// Whether keys of this packet version may be used.
    pub fn accepts_key_version(&self, version: KeyVersion) -> bool {
        self.accepted_key_versions.contains(&version)
    }
}

impl Default for PgpProvider {
    fn default() -> Self {
        Arc::unwrap_or_clone(Self::initialize(&Config::default()))
    }
}
