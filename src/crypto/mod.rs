pub mod aead;
pub mod envelope;
pub mod factory;
pub mod kdf;
pub mod random;
pub mod secure;
pub mod selftest;

pub use aead::EncryptionStrategy;
pub use factory::{crypto, EncryptionContext};
pub use kdf::KeyDerivationStrategy;
pub use random::SecureRandom;
pub use secure::{secret_bytes, wipe, DerivedKey, SecretBytes};
pub use selftest::{self_test, Provider};

/// Nonce length for both AES-256-GCM and ChaCha20-Poly1305.
pub const NONCE_LEN: usize = 12;
/// KDF salt length.
pub const SALT_LEN: usize = 16;
/// Derived key length (256 bits).
pub const KEY_LEN: usize = 32;
/// Authentication tag appended by the cipher.
pub const TAG_LEN: usize = 16;
/// Nonce plus salt.
pub const HEADER_LEN: usize = NONCE_LEN + SALT_LEN;
/// Smallest valid envelope: header and the tag of an empty plaintext.
pub const MIN_ENVELOPE_LEN: usize = HEADER_LEN + TAG_LEN;
