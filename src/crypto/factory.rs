use tracing::debug;
use zeroize::Zeroizing;

use crate::core::models::{CipherAlgorithm, CryptoConfig};
use crate::crypto::aead::{AesGcmStrategy, ChaChaStrategy, EncryptionStrategy};
use crate::crypto::kdf;
use crate::crypto::secure::SecretBytes;
use crate::error::Result;

/// Uniform encrypt/decrypt handle. The concrete cipher and KDF are resolved
/// once, when the context is built.
#[derive(Debug)]
pub struct EncryptionContext {
    config: CryptoConfig,
    strategy: Box<dyn EncryptionStrategy>,
}

impl EncryptionContext {
    /// Configuration snapshot this context was built from.
    pub fn config(&self) -> &CryptoConfig {
        &self.config
    }

    pub fn encrypt(&self, plaintext: &[u8], password: SecretBytes) -> Result<Vec<u8>> {
        self.strategy.encrypt(plaintext, password)
    }

    pub fn decrypt(&self, envelope: &[u8], password: SecretBytes) -> Result<Zeroizing<Vec<u8>>> {
        self.strategy.decrypt(envelope, password)
    }
}

/// Validates `config` against the safety floors and binds the matching
/// strategy. This is the only way callers obtain an encryption handle.
pub fn crypto(config: &CryptoConfig) -> Result<EncryptionContext> {
    config.validate()?;

    let kdf = kdf::for_config(config);
    let strategy: Box<dyn EncryptionStrategy> = match config.cipher {
        CipherAlgorithm::Aes256Gcm => Box::new(AesGcmStrategy::new(kdf)),
        CipherAlgorithm::ChaCha20Poly1305 => Box::new(ChaChaStrategy::new(kdf)),
    };
    debug!(cipher = %config.cipher, kdf = %config.kdf, "built encryption context");

    Ok(EncryptionContext {
        config: *config,
        strategy,
    })
}
