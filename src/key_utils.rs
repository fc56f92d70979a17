//! Keyring parsing and inspection.
//!
//! Key material is the durable form of a key; a [`ParsedKeyring`] is derived
//! from it whenever one is needed and thrown away afterwards. None of the
//! functions here return errors: a buffer that does not parse simply has no
//! key ID, no email and is not usable.

use std::sync::Arc;

use pgp::composed::{SignedPublicKey, SignedSecretKey};
use pgp::types::SignedUser;

use crate::identifier::{KeyId, KeyIdentifier, UserId};
use crate::internal::{is_usable_for_encryption, key_id_of, parse_public_key, parse_secret_key};
use crate::provider::PgpProvider;
use crate::types::KeyMaterial;

/// A keyring parsed from key material, tagged by what it can do.
#[derive(Debug, Clone)]
pub enum ParsedKeyring {
    /// Certificate only; can encrypt to, cannot decrypt
    PublicOnly(SignedPublicKey),
    /// Carries secret key material
    SecretCapable(SignedSecretKey),
}

impl ParsedKeyring {
    /// Whether secret key material is present.
    pub fn is_secret(&self) -> bool {
        matches!(self, ParsedKeyring::SecretCapable(_))
    }

    /// Primary key ID.
    pub fn key_id(&self) -> KeyId {
        match self {
            ParsedKeyring::PublicOnly(key) => key_id_of(&key.primary_key),
            ParsedKeyring::SecretCapable(key) => key_id_of(&key.primary_key),
        }
    }

    /// The public certificate, derived from secret material if needed.
    pub fn to_public(&self) -> SignedPublicKey {
        match self {
            ParsedKeyring::PublicOnly(key) => key.clone(),
            ParsedKeyring::SecretCapable(key) => key.to_public_key(),
        }
    }

    fn users(&self) -> &[SignedUser] {
        match self {
            ParsedKeyring::PublicOnly(key) => &key.details.users,
            ParsedKeyring::SecretCapable(key) => &key.details.users,
        }
    }

    /// Email fragments of every attached user ID, in keyring order.
    ///
    /// User IDs without an email-shaped part are skipped.
    pub fn emails(&self) -> Vec<UserId> {
        self.users()
            .iter()
            .filter_map(user_id_email)
            .collect()
    }
}

fn user_id_email(user: &SignedUser) -> Option<UserId> {
    let text = String::from_utf8_lossy(user.id.id());
    match KeyIdentifier::parse(&text)? {
        KeyIdentifier::UserId(email) => Some(email),
        KeyIdentifier::KeyId(_) => None,
    }
}

/// Parses key material and answers questions about it.
#[derive(Debug, Clone)]
pub struct KeyUtils {
    provider: Arc<PgpProvider>,
}

impl KeyUtils {
    /// Create with the process provider.
    pub fn new(provider: Arc<PgpProvider>) -> Self {
        Self { provider }
    }

    /// Parse as a secret keyring, falling back to a public one.
    pub fn try_parse_keyring(&self, key: &KeyMaterial) -> Option<ParsedKeyring> {
        if let Ok(secret) = parse_secret_key(key.as_bytes()) {
            return Some(ParsedKeyring::SecretCapable(secret));
        }
        match parse_public_key(key.as_bytes()) {
            Ok(public) => Some(ParsedKeyring::PublicOnly(public)),
            Err(_) => {
                tracing::debug!(len = key.as_bytes().len(), "key material does not parse");
                None
            }
        }
    }

    /// Primary key ID, if the material parses.
    pub fn try_get_id(&self, key: &KeyMaterial) -> Option<KeyId> {
        self.try_parse_keyring(key).map(|keyring| keyring.key_id())
    }

    /// Email of the first user ID only.
    ///
    /// Callers that need every identity should use [`ParsedKeyring::emails`].
    pub fn try_get_email(&self, key: &KeyMaterial) -> Option<UserId> {
        let keyring = self.try_parse_keyring(key)?;
        keyring.users().first().and_then(user_id_email)
    }

    /// Whether the key can be used as an encryption recipient.
    ///
    /// False for unparseable material, revoked or expired keys, keys without
    /// a valid encryption subkey and keys on an unsupported packet version
    /// (such as LibrePGP v5 keys using the OCB AEAD profile).
    pub fn is_key_usable(&self, key: &KeyMaterial) -> bool {
        match self.try_parse_keyring(key) {
            Some(keyring) => self.is_keyring_usable(&keyring),
            None => false,
        }
    }

    /// [`KeyUtils::is_key_usable`] for an already parsed keyring.
    pub fn is_keyring_usable(&self, keyring: &ParsedKeyring) -> bool {
        is_usable_for_encryption(&keyring.to_public(), &self.provider)
    }

    pub(crate) fn provider(&self) -> &PgpProvider {
        &self.provider
    }
}
