//! Internal helper functions.

use std::io::{BufReader, Cursor, Read};

use pgp::armor::Dearmor;
use pgp::composed::{Deserializable, SignedPublicKey, SignedSecretKey};
use pgp::types::KeyDetails;

use crate::error::{Error, Result};
use crate::identifier::KeyId;

/// Parse a secret key from bytes (armored or binary).
pub(crate) fn parse_secret_key(data: &[u8]) -> Result<SignedSecretKey> {
    // Try armored first, then binary
    let cursor = Cursor::new(data);
    match SignedSecretKey::from_armor_single(cursor) {
        Ok((key, _headers)) => Ok(key),
        Err(_) => {
            let cursor = Cursor::new(data);
            SignedSecretKey::from_bytes(cursor).map_err(|e| {
                tracing::trace!(error = %e, "not a secret key");
                Error::InvalidKey
            })
        }
    }
}

/// Parse a public key from bytes (armored or binary).
///
/// Unlike [`parse_secret_key`] this does not fall back to secret keys; the
/// caller decides what to do with secret material.
pub(crate) fn parse_public_key(data: &[u8]) -> Result<SignedPublicKey> {
    let cursor = Cursor::new(data);
    if let Ok((key, _headers)) = SignedPublicKey::from_armor_single(cursor) {
        return Ok(key);
    }

    let cursor = Cursor::new(data);
    SignedPublicKey::from_bytes(cursor).map_err(|e| {
        tracing::trace!(error = %e, "not a public key");
        Error::InvalidKey
    })
}

/// Serialize a public key to ASCII-armored format.
pub(crate) fn public_key_to_armored(key: &SignedPublicKey) -> Result<String> {
    Ok(key.to_armored_string(None.into())?)
}

/// Primary key ID of any rpgp key as our [`KeyId`].
pub(crate) fn key_id_of(key: &impl KeyDetails) -> KeyId {
    let legacy = key.legacy_key_id();
    let raw: &[u8] = legacy.as_ref();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(raw);
    KeyId::from_bytes(bytes)
}

/// Lowercase hex of a key's legacy 64-bit ID.
pub(crate) fn keyid_to_hex(key: &impl KeyDetails) -> String {
    hex::encode(key.legacy_key_id().as_ref())
}

/// Lowercase hex of a key's fingerprint.
pub(crate) fn fingerprint_to_hex(key: &impl KeyDetails) -> String {
    hex::encode(key.fingerprint().as_bytes())
}

/// Strip ASCII armor if present, returning binary packet data.
///
/// Armor is located the same way `Message::from_armor` locates it, so
/// leading whitespace or text before the header line is tolerated.
pub(crate) fn dearmor_if_needed(data: &[u8]) -> Result<Vec<u8>> {
    let mut dearmor = Dearmor::new(Cursor::new(data));
    if dearmor.read_header().is_err() {
        return Ok(data.to_vec());
    }

    let mut buf = Vec::new();
    BufReader::new(dearmor)
        .read_to_end(&mut buf)
        .map_err(|e| Error::io("reading armored message", e))?;
    Ok(buf)
}

/// Drain a reader into memory.
pub(crate) fn read_all(mut reader: impl Read, what: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|e| Error::io(format!("reading {}", what), e))?;
    Ok(buf)
}
