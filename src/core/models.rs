use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultSealError};

pub const ARGON2_MEMORY_MIB: RangeInclusive<u32> = 19..=4096;
pub const ARGON2_ITERATIONS: RangeInclusive<u32> = 2..=64;
pub const ARGON2_PARALLELISM: RangeInclusive<u32> = 1..=16;

pub const PBKDF2_SHA256_ITERATIONS: RangeInclusive<u32> = 600_000..=10_000_000;
pub const PBKDF2_SHA512_ITERATIONS: RangeInclusive<u32> = 1_000_000..=10_000_000;

/// Allowed scrypt costs. The scrypt N is `cost * 1024`.
pub const SCRYPT_COSTS: [u32; 7] = [8, 16, 32, 64, 128, 256, 512];
pub const SCRYPT_BLOCK_SIZE: RangeInclusive<u32> = 1..=32;
pub const SCRYPT_PARALLELISM: RangeInclusive<u32> = 1..=16;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum CipherAlgorithm {
    #[default]
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
    #[serde(rename = "chacha20-poly1305")]
    ChaCha20Poly1305,
}

impl CipherAlgorithm {
    pub const ALL: [CipherAlgorithm; 2] = [Self::Aes256Gcm, Self::ChaCha20Poly1305];

    /// The other supported cipher, checked alongside the active one at startup.
    pub fn alternate(self) -> Self {
        match self {
            Self::Aes256Gcm => Self::ChaCha20Poly1305,
            Self::ChaCha20Poly1305 => Self::Aes256Gcm,
        }
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aes256Gcm => f.write_str("AES-256-GCM"),
            Self::ChaCha20Poly1305 => f.write_str("ChaCha20-Poly1305"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum KdfAlgorithm {
    #[default]
    Argon2,
    Pbkdf2,
    Scrypt,
}

impl KdfAlgorithm {
    pub const ALL: [KdfAlgorithm; 3] = [Self::Argon2, Self::Pbkdf2, Self::Scrypt];
}

impl fmt::Display for KdfAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argon2 => f.write_str("Argon2"),
            Self::Pbkdf2 => f.write_str("PBKDF2"),
            Self::Scrypt => f.write_str("scrypt"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Argon2Variant {
    D,
    #[default]
    Id,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Argon2Params {
    pub variant: Argon2Variant,
    /// Memory cost in MiB; the KDF receives `memory * 1024` KiB.
    pub memory: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            variant: Argon2Variant::Id,
            memory: 64,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl Argon2Params {
    pub fn memory_kib(&self) -> u32 {
        self.memory.saturating_mul(1024)
    }

    pub fn validate(&self) -> Result<()> {
        check_range("argon2 memory (MiB)", self.memory, &ARGON2_MEMORY_MIB)?;
        check_range("argon2 iterations", self.iterations, &ARGON2_ITERATIONS)?;
        check_range("argon2 parallelism", self.parallelism, &ARGON2_PARALLELISM)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum HmacAlgorithm {
    #[default]
    #[serde(rename = "sha256")]
    Sha256,
    #[serde(rename = "sha512")]
    Sha512,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pbkdf2Params {
    pub hmac: HmacAlgorithm,
    pub iterations: u32,
}

impl Default for Pbkdf2Params {
    fn default() -> Self {
        Self {
            hmac: HmacAlgorithm::Sha256,
            iterations: 600_000,
        }
    }
}

impl Pbkdf2Params {
    pub fn validate(&self) -> Result<()> {
        match self.hmac {
            HmacAlgorithm::Sha256 => check_range(
                "pbkdf2-sha256 iterations",
                self.iterations,
                &PBKDF2_SHA256_ITERATIONS,
            ),
            HmacAlgorithm::Sha512 => check_range(
                "pbkdf2-sha512 iterations",
                self.iterations,
                &PBKDF2_SHA512_ITERATIONS,
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScryptParams {
    /// One of [`SCRYPT_COSTS`]; N = `cost * 1024`.
    pub cost: u32,
    pub r: u32,
    pub p: u32,
}

impl Default for ScryptParams {
    fn default() -> Self {
        Self {
            cost: 128,
            r: 8,
            p: 1,
        }
    }
}

impl ScryptParams {
    /// log2 of the scrypt N parameter.
    pub fn log_n(&self) -> u8 {
        // cost is a power of two once validated; 1024 contributes 10.
        (self.cost.max(1).ilog2() + 10) as u8
    }

    pub fn validate(&self) -> Result<()> {
        if !SCRYPT_COSTS.contains(&self.cost) {
            return Err(VaultSealError::Config(format!(
                "scrypt cost {} is not one of {:?}",
                self.cost, SCRYPT_COSTS
            )));
        }
        check_range("scrypt r", self.r, &SCRYPT_BLOCK_SIZE)?;
        check_range("scrypt p", self.p, &SCRYPT_PARALLELISM)
    }
}

/// Active cipher and KDF selection with every cost parameter.
///
/// Treated as an immutable snapshot: each encryption context captures its own
/// copy, so changing the settings never affects an operation in flight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct CryptoConfig {
    pub cipher: CipherAlgorithm,
    pub kdf: KdfAlgorithm,
    pub argon2: Argon2Params,
    pub pbkdf2: Pbkdf2Params,
    pub scrypt: ScryptParams,
}

impl CryptoConfig {
    pub fn new(cipher: CipherAlgorithm, kdf: KdfAlgorithm) -> Self {
        Self {
            cipher,
            kdf,
            ..Self::default()
        }
    }

    pub fn with_argon2(mut self, argon2: Argon2Params) -> Self {
        self.kdf = KdfAlgorithm::Argon2;
        self.argon2 = argon2;
        self
    }

    pub fn with_pbkdf2(mut self, pbkdf2: Pbkdf2Params) -> Self {
        self.kdf = KdfAlgorithm::Pbkdf2;
        self.pbkdf2 = pbkdf2;
        self
    }

    pub fn with_scrypt(mut self, scrypt: ScryptParams) -> Self {
        self.kdf = KdfAlgorithm::Scrypt;
        self.scrypt = scrypt;
        self
    }

    /// Checks the parameters of the selected KDF against the safety floors.
    /// Parameters of unselected KDFs are not inspected.
    pub fn validate(&self) -> Result<()> {
        match self.kdf {
            KdfAlgorithm::Argon2 => self.argon2.validate(),
            KdfAlgorithm::Pbkdf2 => self.pbkdf2.validate(),
            KdfAlgorithm::Scrypt => self.scrypt.validate(),
        }
    }
}

fn check_range(name: &str, value: u32, range: &RangeInclusive<u32>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(VaultSealError::Config(format!(
            "{name} {value} outside {}..={}",
            range.start(),
            range.end()
        )))
    }
}
