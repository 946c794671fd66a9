//! Ephemeral credential cache.
//!
//! Once a master password has been accepted, it is kept only inside a
//! single-entry [`container`] protected by a random container password. The
//! application then holds the (container password, container bytes) pair
//! instead of the literal master password.
//!
//! This is obfuscation, not hardened secret storage: the container password
//! sits in ordinary process memory next to the container, so anything able to
//! read this process can recover the master password. What it buys is that
//! a stray copy of the cache state does not show the password in the clear,
//! and that every use goes through a fresh, short-lived buffer.

pub mod container;

use secrecy::ExposeSecret;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::crypto::random::SecureRandom;
use crate::crypto::secure::{into_secret, SecretBytes};
use crate::error::Result;

/// Alias of the only entry in the container.
pub const ENTRY_ALIAS: &str = "master-password";

pub const CONTAINER_PASSWORD_LEN: usize = 32;

/// The container password and the bytes it protects. Always replaced or
/// dropped together so the bytes are never paired with another password.
struct CachedCredential {
    container_password: SecretBytes,
    store: Zeroizing<Vec<u8>>,
}

#[derive(Default)]
pub struct KeyStoreManager {
    cached: Option<CachedCredential>,
}

impl std::fmt::Debug for KeyStoreManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStoreManager")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl KeyStoreManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.is_some()
    }

    /// Puts `secret` into a fresh container, replacing any previous one.
    pub fn store(&mut self, secret: SecretBytes) -> Result<()> {
        let mut container_password = Zeroizing::new(vec![0u8; CONTAINER_PASSWORD_LEN]);
        SecureRandom::global()?.fill(&mut container_password)?;

        let store = container::seal(ENTRY_ALIAS, secret.expose_secret(), &container_password)?;
        drop(secret);

        self.cached = Some(CachedCredential {
            container_password: into_secret(container_password),
            store,
        });
        debug!("master password moved into ephemeral container");
        Ok(())
    }

    /// Re-opens the container and returns a fresh copy of the secret.
    ///
    /// Any failure yields `None`, which callers treat as "ask the user again".
    pub fn retrieve(&self) -> Option<SecretBytes> {
        let cached = self.cached.as_ref()?;
        match container::open(
            &cached.store,
            ENTRY_ALIAS,
            cached.container_password.expose_secret(),
        ) {
            Ok(secret) => Some(secret),
            Err(e) => {
                warn!(error = %e, "ephemeral credential container could not be opened");
                None
            }
        }
    }

    /// Drops and zeroes the container password and the container bytes.
    pub fn clear(&mut self) {
        if self.cached.take().is_some() {
            debug!("ephemeral credential container cleared");
        }
    }
}

impl Drop for KeyStoreManager {
    fn drop(&mut self) {
        self.clear();
    }
}
