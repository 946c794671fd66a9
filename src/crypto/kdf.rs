use std::fmt;

use argon2::{Algorithm, Argon2, Params, Version};
use secrecy::ExposeSecretMut;
use sha2::{Sha256, Sha512};
use tracing::debug;

use crate::core::models::{
    Argon2Params, Argon2Variant, CryptoConfig, HmacAlgorithm, KdfAlgorithm, Pbkdf2Params,
    ScryptParams,
};
use crate::crypto::secure::{empty_key, DerivedKey};
use crate::crypto::KEY_LEN;
use crate::error::{Result, VaultSealError};

/// Turns a password and salt into a 256-bit key under a cost policy bound at
/// construction. Same (password, salt, parameters) always yields the same key.
pub trait KeyDerivationStrategy: fmt::Debug + Send + Sync {
    fn algorithm(&self) -> KdfAlgorithm;

    fn derive_key(&self, password: &[u8], salt: &[u8]) -> Result<DerivedKey>;
}

/// Resolves the KDF selected in `config`.
pub fn for_config(config: &CryptoConfig) -> Box<dyn KeyDerivationStrategy> {
    match config.kdf {
        KdfAlgorithm::Argon2 => Box::new(Argon2Kdf::new(config.argon2)),
        KdfAlgorithm::Pbkdf2 => Box::new(Pbkdf2Kdf::new(config.pbkdf2)),
        KdfAlgorithm::Scrypt => Box::new(ScryptKdf::new(config.scrypt)),
    }
}

/// One-shot derivation with the KDF selected in `config`.
pub fn derive_key(password: &[u8], salt: &[u8], config: &CryptoConfig) -> Result<DerivedKey> {
    for_config(config).derive_key(password, salt)
}

#[derive(Debug, Clone, Copy)]
pub struct Argon2Kdf {
    params: Argon2Params,
}

impl Argon2Kdf {
    pub fn new(params: Argon2Params) -> Self {
        Self { params }
    }
}

impl KeyDerivationStrategy for Argon2Kdf {
    fn algorithm(&self) -> KdfAlgorithm {
        KdfAlgorithm::Argon2
    }

    fn derive_key(&self, password: &[u8], salt: &[u8]) -> Result<DerivedKey> {
        let argon2_params = Params::new(
            self.params.memory_kib(),
            self.params.iterations,
            self.params.parallelism,
            Some(KEY_LEN),
        )
        .map_err(|e| VaultSealError::Kdf(e.to_string()))?;

        let algorithm = match self.params.variant {
            Argon2Variant::D => Algorithm::Argon2d,
            Argon2Variant::Id => Algorithm::Argon2id,
        };
        debug!(
            ?algorithm,
            memory_kib = self.params.memory_kib(),
            iterations = self.params.iterations,
            parallelism = self.params.parallelism,
            "deriving key"
        );
        let argon2 = Argon2::new(algorithm, Version::V0x13, argon2_params);

        let mut key = empty_key();
        argon2
            .hash_password_into(password, salt, key.expose_secret_mut())
            .map_err(|e| VaultSealError::Kdf(e.to_string()))?;

        Ok(key)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Pbkdf2Kdf {
    params: Pbkdf2Params,
}

impl Pbkdf2Kdf {
    pub fn new(params: Pbkdf2Params) -> Self {
        Self { params }
    }
}

impl KeyDerivationStrategy for Pbkdf2Kdf {
    fn algorithm(&self) -> KdfAlgorithm {
        KdfAlgorithm::Pbkdf2
    }

    fn derive_key(&self, password: &[u8], salt: &[u8]) -> Result<DerivedKey> {
        if self.params.iterations == 0 {
            return Err(VaultSealError::Kdf("pbkdf2 needs at least one round".to_string()));
        }
        debug!(
            hmac = ?self.params.hmac,
            iterations = self.params.iterations,
            "deriving key with PBKDF2"
        );

        let mut key = empty_key();
        let out = key.expose_secret_mut();
        match self.params.hmac {
            HmacAlgorithm::Sha256 => {
                pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, self.params.iterations, out)
            }
            HmacAlgorithm::Sha512 => {
                pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, self.params.iterations, out)
            }
        }

        Ok(key)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScryptKdf {
    params: ScryptParams,
}

impl ScryptKdf {
    pub fn new(params: ScryptParams) -> Self {
        Self { params }
    }
}

impl KeyDerivationStrategy for ScryptKdf {
    fn algorithm(&self) -> KdfAlgorithm {
        KdfAlgorithm::Scrypt
    }

    fn derive_key(&self, password: &[u8], salt: &[u8]) -> Result<DerivedKey> {
        let scrypt_params =
            scrypt::Params::new(self.params.log_n(), self.params.r, self.params.p, KEY_LEN)
                .map_err(|e| VaultSealError::Kdf(e.to_string()))?;
        debug!(
            log_n = self.params.log_n(),
            r = self.params.r,
            p = self.params.p,
            "deriving key with scrypt"
        );

        let mut key = empty_key();
        scrypt::scrypt(password, salt, &scrypt_params, key.expose_secret_mut())
            .map_err(|e| VaultSealError::Kdf(e.to_string()))?;

        Ok(key)
    }
}
