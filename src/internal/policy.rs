//! Key validation and algorithm policy functions.
//!
//! rpgp doesn't have a policy system like sequoia, so we implement
//! manual validation of key properties here. This includes:
//! - Key expiration and revocation checks
//! - Encryption capability by algorithm and key flags
//! - Key packet versions accepted by the provider

use std::time::SystemTime;

use chrono::{DateTime, Utc};
use pgp::composed::{SignedPublicKey, SignedPublicSubKey};
use pgp::packet::{Signature, SignatureType};
use pgp::types::KeyDetails;

use crate::provider::PgpProvider;

/// Check if a key has expired based on its creation time and validity period.
pub(crate) fn is_key_expired(creation_time: SystemTime, validity_seconds: Option<u64>) -> bool {
    match validity_seconds {
        None | Some(0) => false,
        Some(validity) => {
            let expiration: DateTime<Utc> =
                (creation_time + std::time::Duration::from_secs(validity)).into();
            expiration < Utc::now()
        }
    }
}

/// Check if a subkey is revoked.
pub(crate) fn is_subkey_revoked(subkey: &SignedPublicSubKey) -> bool {
    subkey
        .signatures
        .iter()
        .any(|sig| sig.typ() == Some(SignatureType::SubkeyRevocation))
}

/// Check if a subkey is valid for use (not expired, not revoked).
pub(crate) fn is_subkey_valid(subkey: &SignedPublicSubKey) -> bool {
    if is_subkey_revoked(subkey) {
        return false;
    }

    // Expiration comes from the most recent binding signature
    let binding = newest(
        subkey
            .signatures
            .iter()
            .filter(|sig| sig.typ() == Some(SignatureType::SubkeyBinding)),
    );
    if let Some(validity) = binding.and_then(|sig| sig.key_expiration_time()) {
        let creation_time: SystemTime = subkey.key.created_at().into();
        if is_key_expired(creation_time, Some(validity.as_secs() as u64)) {
            return false;
        }
    }

    true
}

/// Check if the primary key carries a revocation signature.
pub(crate) fn is_primary_revoked(key: &SignedPublicKey) -> bool {
    !key.details.revocation_signatures.is_empty()
}

/// Check if the primary key has expired.
///
/// Only the newest self-signature counts; an older one carrying a shorter
/// expiry has been superseded.
pub(crate) fn is_primary_expired(key: &SignedPublicKey) -> bool {
    let self_signatures = key
        .details
        .users
        .iter()
        .flat_map(|user| user.signatures.iter())
        .filter(|sig| sig.is_certification() && sig.typ() != Some(SignatureType::CertRevocation))
        .chain(key.details.direct_signatures.iter())
        .filter(|sig| is_issued_by(sig, &key.primary_key));

    let creation_time: SystemTime = key.primary_key.created_at().into();
    newest(self_signatures)
        .and_then(|sig| sig.key_expiration_time())
        .is_some_and(|validity| is_key_expired(creation_time, Some(validity.as_secs() as u64)))
}

/// Whether `sig` was made by `key`. Signatures naming no issuer are
/// given the benefit of the doubt.
fn is_issued_by(sig: &Signature, key: &impl KeyDetails) -> bool {
    let key_ids = sig.issuer_key_id();
    let fingerprints = sig.issuer_fingerprint();
    if key_ids.is_empty() && fingerprints.is_empty() {
        return true;
    }

    let key_id = key.legacy_key_id();
    let fingerprint = key.fingerprint();
    key_ids.iter().any(|id| **id == key_id) || fingerprints.iter().any(|fp| **fp == fingerprint)
}

/// Most recently created signature. Ties go to the later one in the list.
fn newest<'a>(signatures: impl Iterator<Item = &'a Signature>) -> Option<&'a Signature> {
    signatures.max_by_key(|sig| sig.created().map(|t| t.as_secs()).unwrap_or(0))
}

/// Check if a subkey may encrypt, by algorithm and by binding key flags.
pub(crate) fn is_encryption_subkey(subkey: &SignedPublicSubKey) -> bool {
    if !subkey.key.algorithm().can_encrypt() {
        return false;
    }

    subkey.signatures.iter().any(|sig| {
        let flags = sig.key_flags();
        flags.encrypt_comms() || flags.encrypt_storage()
    })
}

/// Encryption subkeys that are valid right now and acceptable to the provider.
pub(crate) fn usable_encryption_subkeys<'a>(
    key: &'a SignedPublicKey,
    provider: &PgpProvider,
) -> Vec<&'a SignedPublicSubKey> {
    key.public_subkeys
        .iter()
        .filter(|subkey| provider.accepts_key_version(subkey.key.version()))
        .filter(|subkey| is_encryption_subkey(subkey))
        .filter(|subkey| is_subkey_valid(subkey))
        .collect()
}

/// Whether a certificate can be used as an encryption recipient.
pub(crate) fn is_usable_for_encryption(key: &SignedPublicKey, provider: &PgpProvider) -> bool {
    if !provider.accepts_key_version(key.primary_key.version()) {
        tracing::debug!(version = ?key.primary_key.version(), "unsupported key version");
        return false;
    }
    if is_primary_revoked(key) || is_primary_expired(key) {
        return false;
    }
    !usable_encryption_subkeys(key, provider).is_empty()
}
