use std::path::{Path, PathBuf};

use tracing::info;
use zeroize::Zeroizing;

use crate::core::models::CryptoConfig;
use crate::crypto::secure::SecretBytes;
use crate::error::{Result, VaultSealError};
use crate::keystore::KeyStoreManager;
use crate::storage::vault_file;

/// An open (or openable) vault on disk.
///
/// The payload is opaque to this crate: whatever the host serializes its
/// entries into. The master password is never held directly; after `create`
/// or `unlock` it lives only in the session's [`KeyStoreManager`].
pub struct VaultSession {
    vault_path: PathBuf,
    config: CryptoConfig,
    credentials: KeyStoreManager,
    payload: Option<Zeroizing<Vec<u8>>>,
    dirty: bool,
}

impl std::fmt::Debug for VaultSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSession")
            .field("vault_path", &self.vault_path)
            .field("config", &self.config)
            .field("unlocked", &self.is_unlocked())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl VaultSession {
    pub fn new(vault_path: PathBuf, config: CryptoConfig) -> Self {
        Self {
            vault_path,
            config,
            credentials: KeyStoreManager::new(),
            payload: None,
            dirty: false,
        }
    }

    pub fn vault_path(&self) -> &Path {
        &self.vault_path
    }

    pub fn vault_exists(&self) -> bool {
        self.vault_path.exists()
    }

    /// The configuration the next save will use.
    pub fn config(&self) -> &CryptoConfig {
        &self.config
    }

    pub fn is_unlocked(&self) -> bool {
        self.payload.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Create a new vault holding `payload`.
    pub fn create(&mut self, password: SecretBytes, payload: &[u8]) -> Result<()> {
        let credentials = cache(password)?;
        vault_file::write_vault(
            &self.vault_path,
            payload,
            cached_password(&credentials)?,
            &self.config,
        )?;
        self.credentials = credentials;
        self.payload = Some(Zeroizing::new(payload.to_vec()));
        self.dirty = false;
        Ok(())
    }

    /// Unlock an existing vault. The session adopts the parameters recorded in
    /// the file.
    pub fn unlock(&mut self, password: SecretBytes) -> Result<()> {
        let credentials = cache(password)?;
        let (payload, config) =
            vault_file::read_vault(&self.vault_path, cached_password(&credentials)?)?;
        self.credentials = credentials;
        self.config = config;
        self.payload = Some(payload);
        self.dirty = false;
        info!(path = %self.vault_path.display(), "vault unlocked");
        Ok(())
    }

    /// Re-cache the master password after the credential cache was lost,
    /// keeping the in-memory payload and its unsaved edits.
    ///
    /// The password is checked against the vault on disk first; a wrong one
    /// fails with `AuthenticationFailed` and leaves the session unchanged.
    pub fn reauthenticate(&mut self, password: SecretBytes) -> Result<()> {
        if !self.is_unlocked() {
            return Err(VaultSealError::VaultLocked);
        }
        let credentials = cache(password)?;
        vault_file::read_vault(&self.vault_path, cached_password(&credentials)?)?;
        self.credentials = credentials;
        info!(path = %self.vault_path.display(), "master password re-entered");
        Ok(())
    }

    /// Lock the vault, wiping the payload and the cached password.
    pub fn lock(&mut self) {
        self.payload = None;
        self.credentials.clear();
        self.dirty = false;
        info!(path = %self.vault_path.display(), "vault locked");
    }

    /// Save the current payload to disk under the active configuration.
    pub fn save(&mut self) -> Result<()> {
        let payload = self.payload.as_ref().ok_or(VaultSealError::VaultLocked)?;
        let password = cached_password(&self.credentials)?;
        vault_file::write_vault(&self.vault_path, payload, password, &self.config)?;
        self.dirty = false;
        Ok(())
    }

    /// Write a copy of the payload to `path` under a separate password.
    pub fn export(&self, path: &Path, password: SecretBytes) -> Result<()> {
        let payload = self.payload()?;
        vault_file::write_vault(path, payload, password, &self.config)
    }

    /// Re-encrypt the vault under `new_password` and persist it immediately.
    ///
    /// Requires the current password to still be cached; after a lost cache
    /// the host must call [`reauthenticate`](Self::reauthenticate) first.
    pub fn change_password(&mut self, new_password: SecretBytes) -> Result<()> {
        let payload = self.payload.as_ref().ok_or(VaultSealError::VaultLocked)?;
        drop(cached_password(&self.credentials)?);
        let credentials = cache(new_password)?;
        vault_file::write_vault(
            &self.vault_path,
            payload,
            cached_password(&credentials)?,
            &self.config,
        )?;
        self.credentials = credentials;
        self.dirty = false;
        info!(path = %self.vault_path.display(), "master password changed");
        Ok(())
    }

    /// Switch cipher or KDF. Takes effect on the next save.
    pub fn set_crypto_config(&mut self, config: CryptoConfig) -> Result<()> {
        config.validate()?;
        if config != self.config {
            self.config = config;
            self.dirty = self.is_unlocked();
        }
        Ok(())
    }

    pub fn payload(&self) -> Result<&[u8]> {
        self.payload
            .as_deref()
            .map(Vec::as_slice)
            .ok_or(VaultSealError::VaultLocked)
    }

    pub fn set_payload(&mut self, payload: impl Into<Vec<u8>>) -> Result<()> {
        let slot = self.payload.as_mut().ok_or(VaultSealError::VaultLocked)?;
        *slot = Zeroizing::new(payload.into());
        self.dirty = true;
        Ok(())
    }
}

fn cache(password: SecretBytes) -> Result<KeyStoreManager> {
    let mut credentials = KeyStoreManager::new();
    credentials.store(password)?;
    Ok(credentials)
}

fn cached_password(credentials: &KeyStoreManager) -> Result<SecretBytes> {
    credentials.retrieve().ok_or_else(|| {
        VaultSealError::CredentialStore("cached master password unavailable".to_string())
    })
}
