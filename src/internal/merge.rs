//! Certificate merging.
//!
//! Two copies of the same public certificate are joined into one holding
//! the union of their identities, subkeys and signatures. Nothing present
//! in either input is dropped; duplicates are detected on serialized bytes.

use pgp::composed::{SignedKeyDetails, SignedPublicKey, SignedPublicSubKey};
use pgp::packet::Signature;
use pgp::ser::Serialize;
use pgp::types::SignedUser;

use crate::error::{Error, Result};
use crate::internal::fingerprint_to_hex;

/// Merge `incoming` into `existing`. Both must share a primary key.
pub(crate) fn merge_public_keys(
    existing: &SignedPublicKey,
    incoming: &SignedPublicKey,
) -> Result<SignedPublicKey> {
    let fp1 = fingerprint_to_hex(&existing.primary_key);
    let fp2 = fingerprint_to_hex(&incoming.primary_key);
    if fp1 != fp2 {
        return Err(Error::Unknown(anyhow::anyhow!(
            "Certificate fingerprints do not match: {} vs {}",
            fp1,
            fp2
        )));
    }

    let mut revocation_signatures = existing.details.revocation_signatures.clone();
    extend_signatures(&mut revocation_signatures, &incoming.details.revocation_signatures);

    let mut direct_signatures = existing.details.direct_signatures.clone();
    extend_signatures(&mut direct_signatures, &incoming.details.direct_signatures);

    let mut users: Vec<SignedUser> = existing.details.users.clone();
    for user in &incoming.details.users {
        match users.iter_mut().find(|u| u.id.id() == user.id.id()) {
            Some(known) => {
                let mut signatures = known.signatures.clone();
                extend_signatures(&mut signatures, &user.signatures);
                *known = SignedUser::new(known.id.clone(), signatures);
            }
            None => users.push(user.clone()),
        }
    }

    let mut user_attributes = existing.details.user_attributes.clone();
    for attribute in &incoming.details.user_attributes {
        let bytes = attribute.to_bytes()?;
        let mut seen = false;
        for known in &user_attributes {
            if known.to_bytes()? == bytes {
                seen = true;
                break;
            }
        }
        if !seen {
            user_attributes.push(attribute.clone());
        }
    }

    let mut public_subkeys: Vec<SignedPublicSubKey> = existing.public_subkeys.clone();
    for subkey in &incoming.public_subkeys {
        let subkey_fp = fingerprint_to_hex(&subkey.key);
        match public_subkeys
            .iter_mut()
            .find(|s| fingerprint_to_hex(&s.key) == subkey_fp)
        {
            Some(known) => extend_signatures(&mut known.signatures, &subkey.signatures),
            None => public_subkeys.push(subkey.clone()),
        }
    }

    Ok(SignedPublicKey {
        primary_key: existing.primary_key.clone(),
        details: SignedKeyDetails::new(
            revocation_signatures,
            direct_signatures,
            users,
            user_attributes,
        ),
        public_subkeys,
    })
}

/// Append every signature from `extra` not already in `into`.
fn extend_signatures(into: &mut Vec<Signature>, extra: &[Signature]) {
    let mut known: Vec<Vec<u8>> = into.iter().filter_map(|sig| sig.to_bytes().ok()).collect();
    for sig in extra {
        match sig.to_bytes() {
            Ok(bytes) if known.contains(&bytes) => {}
            Ok(bytes) => {
                known.push(bytes);
                into.push(sig.clone());
            }
            // Cannot compare, keep it
            Err(_) => into.push(sig.clone()),
        }
    }
}
