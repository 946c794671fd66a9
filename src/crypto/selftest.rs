use aes_gcm::Aes256Gcm;
use chacha20poly1305::ChaCha20Poly1305;
use secrecy::ExposeSecret;
use tracing::{error, info};

use crate::core::models::{CipherAlgorithm, CryptoConfig, KdfAlgorithm};
use crate::crypto::aead::{open, seal, CipherSuite};
use crate::crypto::random::SecureRandom;
use crate::crypto::{KEY_LEN, NONCE_LEN};
use crate::error::{Result, VaultSealError};
use crate::keystore::container::{self, KEYSTORE_TYPE};

/// The set of algorithms a host makes available to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    ciphers: Vec<CipherAlgorithm>,
    kdfs: Vec<KdfAlgorithm>,
    keystore_types: Vec<String>,
}

impl Provider {
    /// Everything compiled into this crate.
    pub fn builtin() -> Self {
        Self {
            ciphers: CipherAlgorithm::ALL.to_vec(),
            kdfs: KdfAlgorithm::ALL.to_vec(),
            keystore_types: vec![KEYSTORE_TYPE.to_string()],
        }
    }

    pub fn without_cipher(mut self, cipher: CipherAlgorithm) -> Self {
        self.ciphers.retain(|c| *c != cipher);
        self
    }

    pub fn without_kdf(mut self, kdf: KdfAlgorithm) -> Self {
        self.kdfs.retain(|k| *k != kdf);
        self
    }

    pub fn without_keystore_type(mut self, store_type: &str) -> Self {
        self.keystore_types.retain(|t| t != store_type);
        self
    }

    pub fn supports_cipher(&self, cipher: CipherAlgorithm) -> bool {
        self.ciphers.contains(&cipher)
    }

    pub fn supports_kdf(&self, kdf: KdfAlgorithm) -> bool {
        self.kdfs.contains(&kdf)
    }

    pub fn supports_keystore_type(&self, store_type: &str) -> bool {
        self.keystore_types.iter().any(|t| t == store_type)
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Runs once at startup. Validates `config` against the safety floors, then
/// checks the active and alternate ciphers, the configured KDF, the
/// credential container and the secure random source.
///
/// Any failure is an environment error: the host must refuse to start rather
/// than fall back to weaker primitives.
pub fn self_test(config: &CryptoConfig, provider: &Provider) -> Result<()> {
    let result = run(config, provider);
    match &result {
        Ok(()) => info!(cipher = %config.cipher, kdf = %config.kdf, "crypto self-test passed"),
        Err(e) => error!(error = %e, "crypto self-test failed"),
    }
    result
}

fn run(config: &CryptoConfig, provider: &Provider) -> Result<()> {
    config
        .validate()
        .map_err(|e| VaultSealError::Environment(format!("configured parameters rejected: {e}")))?;

    let random = SecureRandom::global()?;
    let sample: [u8; 32] = random.array()?;
    if sample.iter().all(|b| *b == sample[0]) {
        return Err(VaultSealError::Environment(
            "secure random source returned constant output".to_string(),
        ));
    }

    for cipher in [config.cipher, config.cipher.alternate()] {
        if !provider.supports_cipher(cipher) {
            return Err(VaultSealError::Environment(format!(
                "cipher {cipher} is unavailable"
            )));
        }
        match cipher {
            CipherAlgorithm::Aes256Gcm => probe_cipher::<Aes256Gcm>(random)?,
            CipherAlgorithm::ChaCha20Poly1305 => probe_cipher::<ChaCha20Poly1305>(random)?,
        }
    }

    if !provider.supports_kdf(config.kdf) {
        return Err(VaultSealError::Environment(format!(
            "key derivation {} is unavailable",
            config.kdf
        )));
    }

    if !provider.supports_keystore_type(KEYSTORE_TYPE) {
        return Err(VaultSealError::Environment(format!(
            "keystore type {KEYSTORE_TYPE} is unavailable"
        )));
    }
    probe_keystore(random)
}

/// Seal, open and tamper check with a throwaway key.
fn probe_cipher<C: CipherSuite>(random: &SecureRandom) -> Result<()> {
    let key: [u8; KEY_LEN] = random.array()?;
    let nonce: [u8; NONCE_LEN] = random.array()?;
    let probe = b"vaultseal self-test";
    let unavailable =
        |what: &str| VaultSealError::Environment(format!("cipher {} {what}", C::ALGORITHM));

    let mut sealed = seal::<C>(&key, &nonce, probe, &[]).map_err(|_| unavailable("cannot seal"))?;
    let opened = open::<C>(&key, &nonce, &sealed, &[]).map_err(|_| unavailable("cannot open"))?;
    if opened.as_slice() != probe {
        return Err(unavailable("returned wrong plaintext"));
    }

    sealed[0] ^= 0x01;
    if open::<C>(&key, &nonce, &sealed, &[]).is_ok() {
        return Err(unavailable("accepted a forged message"));
    }
    Ok(())
}

fn probe_keystore(random: &SecureRandom) -> Result<()> {
    let password: [u8; 32] = random.array()?;
    let data = container::seal("self-test", b"probe", &password)
        .map_err(|e| VaultSealError::Environment(format!("keystore cannot seal: {e}")))?;
    let secret = container::open(&data, "self-test", &password)
        .map_err(|e| VaultSealError::Environment(format!("keystore cannot open: {e}")))?;
    if secret.expose_secret().as_slice() != b"probe" {
        return Err(VaultSealError::Environment(
            "keystore returned wrong entry".to_string(),
        ));
    }
    Ok(())
}
