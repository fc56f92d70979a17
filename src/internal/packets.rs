//! Packet-level inspection of encrypted messages.
//!
//! Used after the fact: to check who a freshly produced message is
//! addressed to, and to explain why a message failed to decrypt.

use std::io::Cursor;

use pgp::packet::{Packet, PacketParser, PublicKeyEncryptedSessionKey};

/// Shape of an encrypted message, as far as the outer packets tell.
#[derive(Debug, Default)]
pub(crate) struct MessageOutline {
    /// Lowercase hex key IDs (v3 PKESK) or fingerprints (v6 PKESK)
    pub recipients: Vec<String>,
    /// Number of password-based session key packets
    pub password_esks: usize,
    /// Message body uses Symmetrically Encrypted Data (no integrity protection)
    pub legacy_framing: bool,
}

impl MessageOutline {
    /// Symmetric-only: no public key session key packets at all.
    pub fn is_password_only(&self) -> bool {
        self.recipients.is_empty() && self.password_esks > 0
    }
}

/// Walk the outer packets of binary message data.
pub(crate) fn outline(data: &[u8]) -> MessageOutline {
    let mut outline = MessageOutline::default();
    let parser = PacketParser::new(Cursor::new(data));

    for packet_result in parser {
        match packet_result {
            Ok(Packet::PublicKeyEncryptedSessionKey(pkesk)) => match pkesk {
                PublicKeyEncryptedSessionKey::V3 { id, .. } => {
                    outline.recipients.push(hex::encode(id.as_ref()));
                }
                PublicKeyEncryptedSessionKey::V6 { fingerprint, .. } => {
                    // Anonymous recipients carry no fingerprint
                    if let Some(fp) = fingerprint {
                        outline.recipients.push(hex::encode(fp.as_bytes()));
                    }
                }
                PublicKeyEncryptedSessionKey::Other { .. } => {}
            },
            Ok(Packet::SymKeyEncryptedSessionKey(_)) => outline.password_esks += 1,
            Ok(Packet::SymEncryptedData(_)) => {
                outline.legacy_framing = true;
                break;
            }
            Ok(Packet::SymEncryptedProtectedData(_)) => break,
            Ok(_) => {}
            // Past the session keys the body is opaque
            Err(_) => break,
        }
    }

    outline
}
