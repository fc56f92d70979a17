//! Option bags for encrypt and decrypt calls.
//!
//! Options are named boolean flags. A flag that was never set reads as
//! disabled, so call sites can pass options around without caring which
//! flags a given operation understands.

use std::collections::HashMap;

/// Query interface shared by every option bag.
pub trait CryptoOptions {
    /// Whether `option` was set to `true`. Unknown options read as `false`.
    fn is_option_enabled(&self, option: &str) -> bool;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Flags(HashMap<&'static str, bool>);

impl Flags {
    fn get(&self, option: &str) -> bool {
        self.0.get(option).copied().unwrap_or(false)
    }

    fn set(&mut self, option: &'static str, value: bool) {
        self.0.insert(option, value);
    }
}

/// Options for decryption. No flags are defined yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecryptionOptions {
    flags: Flags,
}

impl DecryptionOptions {
    /// Start building decryption options.
    pub fn builder() -> DecryptionOptionsBuilder {
        DecryptionOptionsBuilder::default()
    }
}

impl CryptoOptions for DecryptionOptions {
    fn is_option_enabled(&self, option: &str) -> bool {
        self.flags.get(option)
    }
}

/// Builder for [`DecryptionOptions`].
#[derive(Debug, Default)]
pub struct DecryptionOptionsBuilder {
    flags: Flags,
}

impl DecryptionOptionsBuilder {
    /// Snapshot the accumulated flags.
    pub fn build(&self) -> DecryptionOptions {
        DecryptionOptions {
            flags: self.flags.clone(),
        }
    }
}

/// Options for encryption.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptionOptions {
    flags: Flags,
}

impl EncryptionOptions {
    /// Emit ASCII-armored output instead of binary OpenPGP.
    pub const ASCII_ARMOR: &'static str = "ASCII_ARMOR";

    /// Start building encryption options.
    pub fn builder() -> EncryptionOptionsBuilder {
        EncryptionOptionsBuilder::default()
    }

    /// Shorthand for the armor flag.
    pub fn ascii_armor(&self) -> bool {
        self.is_option_enabled(Self::ASCII_ARMOR)
    }
}

impl CryptoOptions for EncryptionOptions {
    fn is_option_enabled(&self, option: &str) -> bool {
        self.flags.get(option)
    }
}

/// Builder for [`EncryptionOptions`].
///
/// ```
/// use pgpvault::{CryptoOptions, EncryptionOptions};
///
/// let options = EncryptionOptions::builder().with_ascii_armor(true).build();
/// assert!(options.is_option_enabled(EncryptionOptions::ASCII_ARMOR));
/// ```
#[derive(Debug, Default)]
pub struct EncryptionOptionsBuilder {
    flags: Flags,
}

impl EncryptionOptionsBuilder {
    /// Toggle ASCII armor on the output.
    pub fn with_ascii_armor(&mut self, value: bool) -> &mut Self {
        self.flags.set(EncryptionOptions::ASCII_ARMOR, value);
        self
    }

    /// Snapshot the accumulated flags.
    pub fn build(&self) -> EncryptionOptions {
        EncryptionOptions {
            flags: self.flags.clone(),
        }
    }
}
