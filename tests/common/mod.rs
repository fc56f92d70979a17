//! Shared helpers for the integration tests.
//!
//! Keys are generated with rpgp on the fly; Curve25519 keeps it fast.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use pgp::composed::{
    EncryptionCaps, KeyType, SecretKeyParamsBuilder, SignedKeyDetails, SignedPublicKey,
    SignedPublicSubKey, SignedSecretKey, SubkeyParamsBuilder,
};
use pgp::crypto::ecc_curve::ECCCurve;
use pgp::packet::{
    KeyFlags, PacketTrait, Signature, SignatureConfig, SignatureType, Subpacket, SubpacketData,
};
use pgp::ser::Serialize;
use pgp::types::{Duration, KeyDetails, KeyVersion, Password, SignedUser, Timestamp};
use rand::thread_rng;

use pgpvault::{Config, KeyId, KeyMaterial, KeyStore, KeyUtils, PgpCryptoHandler, PgpProvider};

pub const TEST_PASSWORD: &str = "test-password-123";

const DAY: u32 = 24 * 60 * 60;

/// A freshly generated key in the forms the tests need.
pub struct TestKey {
    /// Binary secret key
    pub secret: KeyMaterial,
    /// ASCII-armored secret key
    pub secret_armored: KeyMaterial,
    /// ASCII-armored public key
    pub public: KeyMaterial,
    /// Primary key ID
    pub key_id: KeyId,
    /// The rpgp key, for tests that need to build variants
    pub signed: SignedSecretKey,
}

pub fn provider() -> Arc<PgpProvider> {
    PgpProvider::initialize(&Config::default())
}

pub fn key_utils() -> KeyUtils {
    KeyUtils::new(provider())
}

pub fn handler() -> PgpCryptoHandler {
    PgpCryptoHandler::new(provider(), &Config::default())
}

pub fn store(dir: &Path) -> KeyStore {
    KeyStore::new(dir, &Config::default(), provider())
}

/// Cv25519 key with an encryption subkey, protected by `password`
/// (unprotected when empty).
pub fn generate_key(password: &str, user_ids: &[&str]) -> TestKey {
    build_key(password, user_ids, true, Timestamp::now())
}

/// Signing-only key: parses fine but cannot be encrypted to.
pub fn generate_signing_only_key(user_ids: &[&str]) -> TestKey {
    build_key("", user_ids, false, Timestamp::now())
}

/// Unprotected key whose primary and subkey were created `days` ago.
pub fn generate_backdated_key(user_ids: &[&str], days: u32) -> TestKey {
    build_key("", user_ids, true, days_ago(days))
}

pub fn days_ago(days: u32) -> Timestamp {
    Timestamp::from_secs(Timestamp::now().as_secs() - days * DAY)
}

fn build_key(
    password: &str,
    user_ids: &[&str],
    with_encryption: bool,
    created_at: Timestamp,
) -> TestKey {
    let mut rng = thread_rng();

    let mut subkeys = Vec::new();
    if with_encryption {
        let mut enc_builder = SubkeyParamsBuilder::default();
        enc_builder
            .key_type(KeyType::ECDH(ECCCurve::Curve25519))
            .can_encrypt(EncryptionCaps::All)
            .can_sign(false)
            .can_authenticate(false)
            .created_at(created_at);
        if !password.is_empty() {
            enc_builder.passphrase(Some(password.to_string()));
        }
        subkeys.push(enc_builder.build().unwrap());
    }

    let mut key_params = SecretKeyParamsBuilder::default();
    key_params
        .key_type(KeyType::Ed25519Legacy)
        .can_certify(true)
        .can_sign(true)
        .can_encrypt(EncryptionCaps::None)
        .created_at(created_at)
        .primary_user_id(user_ids[0].to_string())
        .subkeys(subkeys);

    if user_ids.len() > 1 {
        let additional: Vec<String> = user_ids[1..].iter().map(|s| s.to_string()).collect();
        key_params.user_ids(additional);
    }

    if !password.is_empty() {
        key_params.passphrase(Some(password.to_string()));
    }

    let signed = key_params.build().unwrap().generate(&mut rng).unwrap();

    let secret = KeyMaterial::new(signed.to_bytes().unwrap());
    let secret_armored = KeyMaterial::from(signed.to_armored_string(None.into()).unwrap());
    let public = armored_public(&signed.to_public_key());
    let key_id = key_utils().try_get_id(&secret).unwrap();

    TestKey {
        secret,
        secret_armored,
        public,
        key_id,
        signed,
    }
}

fn armored_public(key: &SignedPublicKey) -> KeyMaterial {
    KeyMaterial::from(key.to_armored_string(None.into()).unwrap())
}

// =============================================================================
// Re-signed variants (unprotected keys only)
// =============================================================================

/// Signature config for a self-signature made by `key`'s primary at `created`.
fn self_signature(
    key: &SignedSecretKey,
    typ: SignatureType,
    created: Timestamp,
    expires_after: Option<u32>,
    flags: Option<KeyFlags>,
) -> SignatureConfig {
    let mut hashed_subpackets = vec![
        Subpacket::regular(SubpacketData::SignatureCreationTime(created)).unwrap(),
        Subpacket::regular(SubpacketData::IssuerFingerprint(key.primary_key.fingerprint()))
            .unwrap(),
    ];
    if let Some(flags) = flags {
        hashed_subpackets.push(Subpacket::regular(SubpacketData::KeyFlags(flags)).unwrap());
    }
    if let Some(secs) = expires_after {
        hashed_subpackets.push(
            Subpacket::regular(SubpacketData::KeyExpirationTime(Duration::from_secs(secs)))
                .unwrap(),
        );
    }

    let mut config = SignatureConfig::from_key(thread_rng(), &key.primary_key, typ).unwrap();
    config.hashed_subpackets = hashed_subpackets;
    if key.primary_key.version() <= KeyVersion::V4 {
        config.unhashed_subpackets = vec![Subpacket::regular(SubpacketData::IssuerKeyId(
            key.primary_key.legacy_key_id(),
        ))
        .unwrap()];
    }
    config
}

/// The public certificate with every user's self-signatures replaced by one
/// per `(created, expires_after_days)` entry, in the given order.
pub fn with_user_self_signatures(key: &TestKey, entries: &[(Timestamp, Option<u32>)]) -> KeyMaterial {
    let primary = &key.signed.primary_key;
    let public = key.signed.to_public_key();

    let users = public
        .details
        .users
        .iter()
        .map(|user| {
            let flags = user.signatures.first().map(|sig| sig.key_flags());
            let signatures: Vec<Signature> = entries
                .iter()
                .map(|(created, days)| {
                    self_signature(
                        &key.signed,
                        SignatureType::CertPositive,
                        *created,
                        days.map(|d| d * DAY),
                        flags.clone(),
                    )
                    .sign_certification(
                        primary,
                        primary.public_key(),
                        &Password::empty(),
                        user.id.tag(),
                        &user.id,
                    )
                    .unwrap()
                })
                .collect();
            SignedUser::new(user.id.clone(), signatures)
        })
        .collect();

    let details = SignedKeyDetails::new(
        public.details.revocation_signatures.clone(),
        public.details.direct_signatures.clone(),
        users,
        public.details.user_attributes.clone(),
    );
    armored_public(&SignedPublicKey::new(
        public.primary_key.clone(),
        details,
        public.public_subkeys.clone(),
    ))
}

/// The public certificate with the subkey bindings replaced by one per
/// `(created, expires_after_days)` entry, in the given order.
pub fn with_subkey_bindings(key: &TestKey, entries: &[(Timestamp, Option<u32>)]) -> KeyMaterial {
    let primary = &key.signed.primary_key;
    let public = key.signed.to_public_key();

    let subkeys = public
        .public_subkeys
        .iter()
        .map(|subkey| {
            let flags = subkey.signatures.first().map(|sig| sig.key_flags());
            let signatures: Vec<Signature> = entries
                .iter()
                .map(|(created, days)| {
                    self_signature(
                        &key.signed,
                        SignatureType::SubkeyBinding,
                        *created,
                        days.map(|d| d * DAY),
                        flags.clone(),
                    )
                    .sign_subkey_binding(
                        primary,
                        primary.public_key(),
                        &Password::empty(),
                        &subkey.key,
                    )
                    .unwrap()
                })
                .collect();
            SignedPublicSubKey::new(subkey.key.clone(), signatures)
        })
        .collect();

    armored_public(&SignedPublicKey::new(
        public.primary_key.clone(),
        public.details.clone(),
        subkeys,
    ))
}

/// The public certificate with a key revocation signature attached.
pub fn with_primary_revocation(key: &TestKey) -> KeyMaterial {
    let primary = &key.signed.primary_key;
    let mut public = key.signed.to_public_key();

    let revocation = self_signature(
        &key.signed,
        SignatureType::KeyRevocation,
        Timestamp::now(),
        None,
        None,
    )
    .sign_key(primary, &Password::empty(), primary.public_key())
    .unwrap();

    public.details.revocation_signatures.push(revocation);
    armored_public(&public)
}

/// The public certificate with every subkey revoked.
pub fn with_subkey_revocation(key: &TestKey) -> KeyMaterial {
    let primary = &key.signed.primary_key;
    let mut public = key.signed.to_public_key();

    for subkey in &mut public.public_subkeys {
        let revocation = self_signature(
            &key.signed,
            SignatureType::SubkeyRevocation,
            Timestamp::now(),
            None,
            None,
        )
        .sign_subkey_binding(primary, primary.public_key(), &Password::empty(), &subkey.key)
        .unwrap();
        subkey.signatures.push(revocation);
    }
    armored_public(&public)
}

/// Binary public key whose primary key packet claims version 5 (LibrePGP).
pub fn v5_public_key(key: &TestKey) -> KeyMaterial {
    let mut bytes = key.signed.to_public_key().to_bytes().unwrap();
    let offset = body_offset(&bytes);
    assert_eq!(bytes[offset], 4);
    bytes[offset] = 5;
    KeyMaterial::new(bytes)
}

/// Offset of the first packet's body, for new and old format headers.
fn body_offset(bytes: &[u8]) -> usize {
    let tag = bytes[0];
    if tag & 0x40 != 0 {
        match bytes[1] {
            0..=191 => 2,
            192..=223 => 3,
            _ => 6,
        }
    } else {
        match tag & 0x03 {
            0 => 2,
            1 => 3,
            _ => 5,
        }
    }
}
