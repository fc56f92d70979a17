//! KeyStore implementation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::identifier::{KeyId, KeyIdentifier};
use crate::internal::{merge_public_keys, public_key_to_armored};
use crate::key_utils::{KeyUtils, ParsedKeyring};
use crate::provider::PgpProvider;
use crate::types::KeyMaterial;

/// Directory-backed key storage.
///
/// Each key lives in its own file named after its primary key ID, e.g.
/// `keys/b950ae2813841585.key`. Files are stored exactly as supplied, except
/// for merged public certificates which are written ASCII-armored.
///
/// # Thread Safety
///
/// There is no locking. Run at most one `add_key`/`remove_key` per directory
/// at a time; reads racing a write may see a partially written file.
#[derive(Debug, Clone)]
pub struct KeyStore {
    keys_dir: PathBuf,
    extension: String,
    utils: KeyUtils,
}

impl KeyStore {
    /// Store rooted at an explicit key directory.
    ///
    /// The directory is created on first use, not here.
    pub fn new(keys_dir: impl Into<PathBuf>, config: &Config, provider: Arc<PgpProvider>) -> Self {
        Self {
            keys_dir: keys_dir.into(),
            extension: config.key_extension.clone(),
            utils: KeyUtils::new(provider),
        }
    }

    /// Store in the configured key directory below the application data directory.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pgpvault::{Config, KeyStore, PgpProvider};
    ///
    /// let config = Config::default();
    /// let provider = PgpProvider::initialize(&config);
    /// let store = KeyStore::open("/data/app", &config, provider);
    ///
    /// for key in store.get_all_keys().unwrap() {
    ///     println!("{:?}", store.get_key_id(&key));
    /// }
    /// ```
    pub fn open(app_data_dir: impl AsRef<Path>, config: &Config, provider: Arc<PgpProvider>) -> Self {
        Self::new(config.key_dir(app_data_dir), config, provider)
    }

    /// The key directory.
    pub fn path(&self) -> &Path {
        &self.keys_dir
    }

    /// Add a key, merging with or replacing what is already stored.
    ///
    /// - A secret key always replaces a stored public key with the same ID.
    /// - Two public keys with the same ID are merged.
    /// - A stored secret key is only replaced when `replace` is set;
    ///   otherwise [`Error::KeyAlreadyExists`] is returned.
    ///
    /// # Returns
    /// The material now on disk for this key ID.
    pub fn add_key(&self, key: KeyMaterial, replace: bool) -> Result<KeyMaterial> {
        self.ensure_dir()?;

        let incoming = self.utils.try_parse_keyring(&key).ok_or(Error::InvalidKey)?;
        if !self.utils.is_keyring_usable(&incoming) {
            return Err(Error::UnusableKey);
        }

        let key_id = incoming.key_id();
        let path = self.key_path(key_id);

        if path.exists() {
            let stored = self.load(&path)?;
            let existing = self.utils.try_parse_keyring(&stored).ok_or(Error::InvalidKey)?;

            match (&existing, &incoming) {
                (ParsedKeyring::PublicOnly(_), ParsedKeyring::SecretCapable(_)) => {
                    self.write(&path, &key)?;
                    tracing::info!(key_id = %key_id, "replaced public key with secret key");
                    return Ok(key);
                }
                (ParsedKeyring::PublicOnly(old), ParsedKeyring::PublicOnly(new)) => {
                    let merged = merge_public_keys(old, new)?;
                    let merged = KeyMaterial::from(public_key_to_armored(&merged)?);
                    self.write(&path, &merged)?;
                    tracing::info!(key_id = %key_id, "merged public key");
                    return Ok(merged);
                }
                (ParsedKeyring::SecretCapable(_), _) => {
                    if !replace {
                        return Err(Error::KeyAlreadyExists(KeyIdentifier::KeyId(key_id)));
                    }
                    fs::remove_file(&path).map_err(Error::KeyDeletionFailed)?;
                }
            }
        }

        self.write(&path, &key)?;
        tracing::info!(key_id = %key_id, secret = incoming.is_secret(), "stored key");
        Ok(key)
    }

    /// Remove the key matching `identifier`.
    pub fn remove_key(&self, identifier: &KeyIdentifier) -> Result<()> {
        self.ensure_dir()?;

        let key = self.get_key_by_id(identifier)?;
        let key_id = self.utils.try_get_id(&key).ok_or(Error::InvalidKey)?;
        let path = self.key_path(key_id);

        fs::remove_file(&path).map_err(Error::KeyDeletionFailed)?;
        tracing::info!(key_id = %key_id, path = %path.display(), "removed key");
        Ok(())
    }

    /// Find a key by key ID or by the email of any of its user IDs.
    ///
    /// # Errors
    /// - [`Error::NoKeysAvailable`] if the store is empty
    /// - [`Error::KeyNotFound`] if nothing matches
    pub fn get_key_by_id(&self, identifier: &KeyIdentifier) -> Result<KeyMaterial> {
        self.ensure_dir()?;

        let files = self.key_files()?;
        if files.is_empty() {
            return Err(Error::NoKeysAvailable);
        }

        let keys = files
            .iter()
            .map(|path| self.load(path))
            .collect::<Result<Vec<_>>>()?;

        let found = match identifier {
            KeyIdentifier::KeyId(id) => keys
                .into_iter()
                .find(|key| self.utils.try_get_id(key) == Some(*id)),
            KeyIdentifier::UserId(user) => keys.into_iter().find(|key| {
                self.utils
                    .try_parse_keyring(key)
                    .is_some_and(|keyring| keyring.emails().contains(user))
            }),
        };

        tracing::debug!(identifier = %identifier, found = found.is_some(), "key lookup");
        found.ok_or_else(|| Error::KeyNotFound(identifier.clone()))
    }

    /// Every stored key. Empty when the store holds nothing.
    pub fn get_all_keys(&self) -> Result<Vec<KeyMaterial>> {
        self.ensure_dir()?;

        self.key_files()?
            .iter()
            .map(|path| self.load(path))
            .collect()
    }

    /// The identifier this key would be stored under.
    pub fn get_key_id(&self, key: &KeyMaterial) -> Option<KeyIdentifier> {
        self.utils.try_get_id(key).map(KeyIdentifier::KeyId)
    }

    fn ensure_dir(&self) -> Result<()> {
        match fs::create_dir_all(&self.keys_dir) {
            Ok(()) if self.keys_dir.is_dir() => Ok(()),
            Ok(()) => Err(Error::KeyDirectoryUnavailable(self.keys_dir.clone())),
            Err(e) => {
                tracing::warn!(
                    path = %self.keys_dir.display(),
                    error = %e,
                    "cannot create key directory"
                );
                Err(Error::KeyDirectoryUnavailable(self.keys_dir.clone()))
            }
        }
    }

    fn key_path(&self, key_id: KeyId) -> PathBuf {
        self.keys_dir.join(format!("{}.{}", key_id, self.extension))
    }

    /// Key files in the directory, sorted by name.
    fn key_files(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.keys_dir)
            .map_err(|_| Error::KeyDirectoryUnavailable(self.keys_dir.clone()))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| Error::io("listing key directory", e))?
                .path();
            let is_key_file = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == self.extension.as_str());
            if is_key_file {
                files.push(path);
            } else {
                tracing::trace!(path = %path.display(), "ignoring non-key file");
            }
        }
        files.sort();
        Ok(files)
    }

    fn load(&self, path: &Path) -> Result<KeyMaterial> {
        fs::read(path)
            .map(KeyMaterial::from)
            .map_err(|e| Error::io(format!("reading {}", path.display()), e))
    }

    fn write(&self, path: &Path, key: &KeyMaterial) -> Result<()> {
        fs::write(path, key.as_bytes())
            .map_err(|e| Error::io(format!("writing {}", path.display()), e))
    }
}
