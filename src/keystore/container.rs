use aes_gcm::Aes256Gcm;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::core::models::{HmacAlgorithm, Pbkdf2Params};
use crate::crypto::aead::{open as aead_open, seal as aead_seal};
use crate::crypto::kdf::{KeyDerivationStrategy, Pbkdf2Kdf};
use crate::crypto::random::SecureRandom;
use crate::crypto::secure::{into_secret, SecretBytes};
use crate::crypto::{NONCE_LEN, SALT_LEN};
use crate::error::{Result, VaultSealError};

/// Type tag of the single-entry credential container.
pub const KEYSTORE_TYPE: &str = "VSKS";
pub const CONTAINER_VERSION: u8 = 1;

/// Container passwords are random, so a modest work factor is enough.
pub const CONTAINER_ITERATIONS: u32 = 10_000;

#[derive(Debug, Serialize, Deserialize)]
struct ContainerFile {
    store_type: String,
    version: u8,
    alias: String,
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
    iterations: u32,
    sealed: Vec<u8>,
}

fn container_kdf(iterations: u32) -> Pbkdf2Kdf {
    Pbkdf2Kdf::new(Pbkdf2Params {
        hmac: HmacAlgorithm::Sha256,
        iterations,
    })
}

/// Seals `secret` under `alias` and returns the serialized container.
///
/// The entry is sealed with AES-256-GCM under a PBKDF2-HMAC-SHA-256 key
/// derived from the container password. The alias is bound as associated
/// data, so an entry cannot be read back under another name.
pub fn seal(alias: &str, secret: &[u8], container_password: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let random = SecureRandom::global()?;
    let salt: [u8; SALT_LEN] = random.array()?;
    let nonce: [u8; NONCE_LEN] = random.array()?;

    let key = container_kdf(CONTAINER_ITERATIONS).derive_key(container_password, &salt)?;
    let sealed = aead_seal::<Aes256Gcm>(key.expose_secret(), &nonce, secret, alias.as_bytes())?;

    let file = ContainerFile {
        store_type: KEYSTORE_TYPE.to_string(),
        version: CONTAINER_VERSION,
        alias: alias.to_string(),
        salt,
        nonce,
        iterations: CONTAINER_ITERATIONS,
        sealed,
    };
    Ok(Zeroizing::new(bincode::serialize(&file)?))
}

/// Opens a container produced by [`seal`] and extracts the entry stored
/// under `alias`.
pub fn open(data: &[u8], alias: &str, container_password: &[u8]) -> Result<SecretBytes> {
    let file: ContainerFile = bincode::deserialize(data)?;

    if file.store_type != KEYSTORE_TYPE {
        return Err(VaultSealError::CredentialStore(format!(
            "unexpected store type {:?}",
            file.store_type
        )));
    }
    if file.version != CONTAINER_VERSION {
        return Err(VaultSealError::CredentialStore(format!(
            "unsupported container version {}",
            file.version
        )));
    }
    if file.alias != alias {
        return Err(VaultSealError::CredentialStore(format!(
            "no entry named {alias:?}"
        )));
    }
    if file.iterations == 0 {
        return Err(VaultSealError::CredentialStore(
            "container iteration count is zero".to_string(),
        ));
    }

    let key = container_kdf(file.iterations).derive_key(container_password, &file.salt)?;
    let secret = aead_open::<Aes256Gcm>(key.expose_secret(), &file.nonce, &file.sealed, alias.as_bytes())?;
    Ok(into_secret(secret))
}
