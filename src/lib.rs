#![forbid(unsafe_code)]

pub mod config;
pub mod core;
pub mod crypto;
pub mod error;
pub mod keystore;
pub mod logging;
pub mod storage;

pub use crate::config::AppConfig;
pub use crate::core::models::{
    Argon2Params, Argon2Variant, CipherAlgorithm, CryptoConfig, HmacAlgorithm, KdfAlgorithm,
    Pbkdf2Params, ScryptParams,
};
pub use crate::core::session::VaultSession;
pub use crate::crypto::{crypto, self_test, secret_bytes, EncryptionContext, Provider, SecretBytes};
pub use crate::error::{ErrorKind, Result, VaultSealError};
pub use crate::keystore::KeyStoreManager;
