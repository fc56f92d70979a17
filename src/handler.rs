//! Encryption and decryption of password entries.
//!
//! [`PgpCryptoHandler`] takes key material straight from the key store and
//! byte streams from the caller. Failures are sorted into the handful of
//! cases a user can act on: wrong passphrase, unusable key, legacy message
//! format; everything else is reported as [`Error::Unknown`] with the cause
//! attached.

use std::io::{Cursor, Read, Write};
use std::sync::Arc;

use pgp::composed::{Message, MessageBuilder, SignedPublicKey, SignedSecretKey};
use pgp::types::Password;
use rand::thread_rng;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::internal::{
    dearmor_if_needed, fingerprint_to_hex, keyid_to_hex, outline, parse_secret_key, read_all,
    usable_encryption_subkeys, MessageOutline,
};
use crate::key_utils::KeyUtils;
use crate::options::{CryptoOptions, DecryptionOptions, EncryptionOptions};
use crate::provider::PgpProvider;
use crate::types::KeyMaterial;

/// Stream-oriented encryption engine over a particular key format.
pub trait CryptoHandler {
    /// Options understood by [`CryptoHandler::encrypt`].
    type EncryptionOptions: CryptoOptions;
    /// Options understood by [`CryptoHandler::decrypt`].
    type DecryptionOptions: CryptoOptions;

    /// Encrypt `plaintext` to every key in `keys`, writing to `output`.
    fn encrypt<R: Read, W: Write>(
        &self,
        keys: &[KeyMaterial],
        plaintext: R,
        output: W,
        options: &Self::EncryptionOptions,
    ) -> Result<()>;

    /// Decrypt `ciphertext` with any of `keys`, writing to `output`.
    fn decrypt<R: Read, W: Write>(
        &self,
        keys: &[KeyMaterial],
        passphrase: &str,
        ciphertext: R,
        output: W,
        options: &Self::DecryptionOptions,
    ) -> Result<()>;

    /// Whether files with this name are ours to decrypt.
    fn can_handle(&self, file_name: &str) -> bool;

    /// Whether every key needs a passphrase before it can decrypt.
    fn is_passphrase_protected(&self, keys: &[KeyMaterial]) -> bool;
}

/// OpenPGP implementation of [`CryptoHandler`] on top of rpgp.
#[derive(Debug, Clone)]
pub struct PgpCryptoHandler {
    utils: KeyUtils,
    encrypted_extension: String,
}

impl PgpCryptoHandler {
    /// Create a handler sharing the process provider.
    pub fn new(provider: Arc<PgpProvider>, config: &Config) -> Self {
        Self {
            utils: KeyUtils::new(provider),
            encrypted_extension: config.encrypted_extension.clone(),
        }
    }

    /// Public certificates for all keys, in input order.
    fn certificates(&self, keys: &[KeyMaterial]) -> Result<Vec<SignedPublicKey>> {
        let certs: Vec<SignedPublicKey> = keys
            .iter()
            .filter_map(|key| self.utils.try_parse_keyring(key))
            .map(|keyring| keyring.to_public())
            .collect();

        if certs.len() != keys.len() {
            return Err(Error::Unknown(anyhow::anyhow!(
                "only {} of {} keys yielded a certificate",
                certs.len(),
                keys.len()
            )));
        }
        Ok(certs)
    }

    fn try_decrypt(
        &self,
        secret_keys: &[SignedSecretKey],
        password: &Password,
        ciphertext: &[u8],
        outline: &MessageOutline,
    ) -> anyhow::Result<Vec<u8>> {
        let mut last_error = None;

        for secret_key in secret_keys {
            let message = parse_message(ciphertext)?;
            match message.decrypt(password, secret_key) {
                Ok(decrypted) => return literal_data(decrypted),
                Err(e) => {
                    tracing::debug!(error = %e, "key did not decrypt message");
                    last_error = Some(anyhow::Error::from(e));
                }
            }
        }

        // Symmetric-only messages take the passphrase directly
        if outline.password_esks > 0 {
            let message = parse_message(ciphertext)?;
            match message.decrypt_with_password(password) {
                Ok(decrypted) => return literal_data(decrypted),
                Err(e) => last_error = Some(anyhow::Error::from(e)),
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("no key could decrypt the message")))
    }

    /// Turn a decryption failure into the error a user can act on.
    fn classify(
        &self,
        cause: anyhow::Error,
        secret_keys: &[SignedSecretKey],
        password: &Password,
        outline: &MessageOutline,
    ) -> Error {
        let addressed_to_keys = !outline.recipients.is_empty();
        if addressed_to_keys
            && !secret_keys.is_empty()
            && !secret_keys.iter().any(|key| unlocks_with(key, password))
        {
            return Error::IncorrectPassphrase;
        }
        if outline.legacy_framing {
            return Error::NonStandardAead;
        }
        if outline.is_password_only() {
            return Error::IncorrectPassphrase;
        }

        tracing::warn!(error = %cause, "unclassified decryption failure");
        Error::Unknown(cause)
    }
}

impl CryptoHandler for PgpCryptoHandler {
    type EncryptionOptions = EncryptionOptions;
    type DecryptionOptions = DecryptionOptions;

    fn encrypt<R: Read, W: Write>(
        &self,
        keys: &[KeyMaterial],
        plaintext: R,
        mut output: W,
        options: &EncryptionOptions,
    ) -> Result<()> {
        if keys.is_empty() {
            return Err(Error::NoKeysProvided);
        }

        let certs = self.certificates(keys)?;
        if certs.is_empty() {
            return Err(Error::NoKeysProvided);
        }

        let plaintext = read_all(plaintext, "plaintext")?;
        let provider = self.utils.provider();
        let mut rng = thread_rng();

        let mut builder = MessageBuilder::from_bytes("", plaintext)
            .seipd_v1(&mut rng, provider.symmetric_algorithm());

        // Per certificate, every ID its message recipients may be listed under
        let mut expected: Vec<Vec<String>> = Vec::with_capacity(certs.len());
        for cert in &certs {
            let subkeys = usable_encryption_subkeys(cert, provider);
            if subkeys.is_empty() {
                return Err(Error::UnusableKey);
            }

            let mut ids = Vec::new();
            for subkey in subkeys {
                builder.encrypt_to_key(&mut rng, subkey)?;
                ids.push(keyid_to_hex(&subkey.key));
                ids.push(fingerprint_to_hex(&subkey.key));
            }
            expected.push(ids);
        }

        let ciphertext = if options.ascii_armor() {
            builder.to_armored_string(&mut rng, None.into())?.into_bytes()
        } else {
            builder.to_vec(&mut rng)?
        };

        let produced = outline(&dearmor_if_needed(&ciphertext)?);
        for (cert, ids) in certs.iter().zip(&expected) {
            assert!(
                ids.iter().any(|id| produced.recipients.contains(id)),
                "message is not encrypted to recipient {}",
                fingerprint_to_hex(&cert.primary_key)
            );
        }

        output
            .write_all(&ciphertext)
            .and_then(|()| output.flush())
            .map_err(|e| Error::io("writing ciphertext", e))?;

        tracing::debug!(
            recipients = certs.len(),
            armor = options.ascii_armor(),
            "encrypted message"
        );
        Ok(())
    }

    fn decrypt<R: Read, W: Write>(
        &self,
        keys: &[KeyMaterial],
        passphrase: &str,
        ciphertext: R,
        mut output: W,
        _options: &DecryptionOptions,
    ) -> Result<()> {
        if keys.is_empty() {
            return Err(Error::NoKeysProvided);
        }

        // Public-only material cannot decrypt; drop it
        let secret_keys: Vec<SignedSecretKey> = keys
            .iter()
            .filter_map(|key| parse_secret_key(key.as_bytes()).ok())
            .collect();

        let ciphertext = read_all(ciphertext, "ciphertext")?;
        let password = Password::from(passphrase);
        let outline = outline(&dearmor_if_needed(&ciphertext)?);

        let plaintext = self
            .try_decrypt(&secret_keys, &password, &ciphertext, &outline)
            .map_err(|e| match e.downcast::<Error>() {
                Ok(own) => own,
                Err(e) => self.classify(e, &secret_keys, &password, &outline),
            })?;

        output
            .write_all(&plaintext)
            .and_then(|()| output.flush())
            .map_err(|e| Error::io("writing plaintext", e))?;

        tracing::debug!(keys = secret_keys.len(), "decrypted message");
        Ok(())
    }

    fn can_handle(&self, file_name: &str) -> bool {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or("");
        extension == self.encrypted_extension
    }

    fn is_passphrase_protected(&self, keys: &[KeyMaterial]) -> bool {
        let secret_keys: Vec<SignedSecretKey> = keys
            .iter()
            .filter_map(|key| parse_secret_key(key.as_bytes()).ok())
            .collect();
        if secret_keys.is_empty() {
            return false;
        }

        let empty = Password::from("");
        secret_keys.iter().all(|key| {
            matches!(key.primary_key.unlock(&empty, |_, _| Ok(())), Err(_) | Ok(Err(_)))
        })
    }
}

/// Whether `password` unlocks the primary key or any secret subkey.
fn unlocks_with(key: &SignedSecretKey, password: &Password) -> bool {
    if matches!(key.primary_key.unlock(password, |_, _| Ok(())), Ok(Ok(()))) {
        return true;
    }
    key.secret_subkeys
        .iter()
        .any(|subkey| matches!(subkey.key.unlock(password, |_, _| Ok(())), Ok(Ok(()))))
}

/// Parse an encrypted message, armored or binary.
fn parse_message(ciphertext: &[u8]) -> anyhow::Result<Message<'_>> {
    match Message::from_armor(Cursor::new(ciphertext)) {
        Ok((message, _headers)) => Ok(message),
        Err(_) => Ok(Message::from_bytes(ciphertext)?),
    }
}

/// Literal data of a decrypted message, decompressing if needed.
fn literal_data(message: Message<'_>) -> anyhow::Result<Vec<u8>> {
    let mut decompressed = if message.is_compressed() {
        message.decompress()?
    } else {
        message
    };
    Ok(decompressed.as_data_vec()?)
}
