//! Key identifiers.
//!
//! A [`KeyIdentifier`] is what a human hands us to select a key: either a
//! 64-bit OpenPGP key ID (possibly spelled as a full fingerprint) or a user ID
//! from which an email fragment can be pulled out.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;

/// Splits `Name (Comment) <Email>`; every group is optional.
static USER_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<name>[^<>()]*?)?\s*(?:\((?P<comment>[^()]*)\))?\s*(?:<(?P<email>[^<>]*)>)?\s*$")
        .expect("user ID pattern is valid")
});

/// A bare `local@domain` with no whitespace or user ID punctuation.
static BARE_EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@<>()]+@[^\s@<>()]+$").expect("email pattern is valid")
});

/// A 64-bit OpenPGP key ID.
///
/// Stored as `i64` to match the identifiers older stores were written with;
/// only the bit pattern matters. Renders as 16 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyId(pub i64);

impl KeyId {
    /// Build a key ID from its big-endian wire form.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        KeyId(i64::from_be_bytes(bytes))
    }

    /// Big-endian wire form of this key ID.
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Parse exactly 16 hex digits.
    fn from_hex(text: &str) -> Option<Self> {
        let bytes: [u8; 8] = hex::decode(text).ok()?.try_into().ok()?;
        Some(Self::from_bytes(bytes))
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits = self.0 as u64;
        write!(f, "{:08x}{:08x}", bits >> 32, bits & 0xffff_ffff)
    }
}

/// The email-like fragment of an OpenPGP user ID.
///
/// Not validated beyond "this is what sat in the email position".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

impl UserId {
    /// The email fragment.
    pub fn email(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Either a numeric key ID or a user identity email.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyIdentifier {
    /// Primary key ID
    KeyId(KeyId),
    /// Email fragment of a user ID
    UserId(UserId),
}

impl KeyIdentifier {
    /// Parse a human-supplied identifier.
    ///
    /// Accepts, in order of precedence:
    /// - a 16 digit hex key ID, with or without a `0x` prefix
    /// - a 40 digit hex fingerprint, reduced to its trailing 16 digits
    /// - a user ID such as `Alice (work) <alice@example.com>` or a bare email
    ///
    /// Returns `None` when no email-shaped fragment can be found.
    ///
    /// # Example
    ///
    /// ```
    /// use pgpvault::KeyIdentifier;
    ///
    /// let id = KeyIdentifier::parse("0xB950AE2813841585").unwrap();
    /// assert_eq!(id.to_string(), "b950ae2813841585");
    ///
    /// let user = KeyIdentifier::parse("Alice <alice@example.com>").unwrap();
    /// assert_eq!(user.to_string(), "alice@example.com");
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        if text.is_empty() {
            return None;
        }

        let hex_part = text.strip_prefix("0x").unwrap_or(text);
        let is_hex = hex_part.bytes().all(|b| b.is_ascii_hexdigit());
        if is_hex {
            match hex_part.len() {
                16 => return KeyId::from_hex(hex_part).map(KeyIdentifier::KeyId),
                40 => return KeyId::from_hex(&hex_part[24..]).map(KeyIdentifier::KeyId),
                _ => {}
            }
        }

        split_user_id(text).map(|email| KeyIdentifier::UserId(UserId(email)))
    }
}

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyIdentifier::KeyId(id) => id.fmt(f),
            KeyIdentifier::UserId(user) => user.fmt(f),
        }
    }
}

impl FromStr for KeyIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        KeyIdentifier::parse(s).ok_or_else(|| Error::InvalidIdentifier(s.to_string()))
    }
}

impl From<KeyId> for KeyIdentifier {
    fn from(id: KeyId) -> Self {
        KeyIdentifier::KeyId(id)
    }
}

impl From<UserId> for KeyIdentifier {
    fn from(user: UserId) -> Self {
        KeyIdentifier::UserId(user)
    }
}

/// Pull the email fragment out of an OpenPGP user ID string.
fn split_user_id(text: &str) -> Option<String> {
    let captures = USER_ID_PATTERN.captures(text)?;

    let name = captures
        .name("name")
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty());
    let email = captures
        .name("email")
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty());

    match (name, email) {
        // "user@host <user@host>" has no real display name
        (Some(_), Some(email)) => Some(email.to_string()),
        (None, Some(email)) => Some(email.to_string()),
        (Some(name), None) if looks_like_email(name) => Some(name.to_string()),
        _ => None,
    }
}

pub(crate) fn looks_like_email(text: &str) -> bool {
    BARE_EMAIL_PATTERN.is_match(text)
}
