use std::fmt;
use std::marker::PhantomData;

use aes_gcm::Aes256Gcm;
use chacha20poly1305::aead::consts::U12;
use chacha20poly1305::aead::generic_array::GenericArray;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, Payload};
use chacha20poly1305::ChaCha20Poly1305;
use secrecy::ExposeSecret;
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::models::CipherAlgorithm;
use crate::crypto::envelope::{self, Envelope};
use crate::crypto::kdf::KeyDerivationStrategy;
use crate::crypto::random::SecureRandom;
use crate::crypto::secure::SecretBytes;
use crate::crypto::{NONCE_LEN, SALT_LEN};
use crate::error::{Result, VaultSealError};

/// Turns plaintext plus password into a self-contained envelope and back.
///
/// Passwords are consumed so they are wiped when the call returns, whatever
/// the outcome.
pub trait EncryptionStrategy: fmt::Debug + Send + Sync {
    fn cipher(&self) -> CipherAlgorithm;

    fn encrypt(&self, plaintext: &[u8], password: SecretBytes) -> Result<Vec<u8>>;

    fn decrypt(&self, envelope: &[u8], password: SecretBytes) -> Result<Zeroizing<Vec<u8>>>;
}

/// AEAD with a 96-bit nonce and a 256-bit key.
pub trait CipherSuite: KeyInit + Aead + AeadCore<NonceSize = U12> {
    const ALGORITHM: CipherAlgorithm;
}

impl CipherSuite for Aes256Gcm {
    const ALGORITHM: CipherAlgorithm = CipherAlgorithm::Aes256Gcm;
}

impl CipherSuite for ChaCha20Poly1305 {
    const ALGORITHM: CipherAlgorithm = CipherAlgorithm::ChaCha20Poly1305;
}

pub type AesGcmStrategy = AeadStrategy<Aes256Gcm>;
pub type ChaChaStrategy = AeadStrategy<ChaCha20Poly1305>;

pub struct AeadStrategy<C> {
    kdf: Box<dyn KeyDerivationStrategy>,
    cipher: PhantomData<fn() -> C>,
}

impl<C: CipherSuite> AeadStrategy<C> {
    pub fn new(kdf: Box<dyn KeyDerivationStrategy>) -> Self {
        Self {
            kdf,
            cipher: PhantomData,
        }
    }
}

impl<C: CipherSuite> fmt::Debug for AeadStrategy<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AeadStrategy")
            .field("cipher", &C::ALGORITHM)
            .field("kdf", &self.kdf)
            .finish()
    }
}

impl<C: CipherSuite> EncryptionStrategy for AeadStrategy<C> {
    fn cipher(&self) -> CipherAlgorithm {
        C::ALGORITHM
    }

    fn encrypt(&self, plaintext: &[u8], password: SecretBytes) -> Result<Vec<u8>> {
        let random = SecureRandom::global()?;
        let nonce: [u8; NONCE_LEN] = random.array()?;
        let salt: [u8; SALT_LEN] = random.array()?;

        let key = self.kdf.derive_key(password.expose_secret(), &salt)?;
        drop(password);

        let ciphertext = seal::<C>(key.expose_secret(), &nonce, plaintext, &[])?;
        debug!(
            cipher = %C::ALGORITHM,
            plaintext_len = plaintext.len(),
            "sealed envelope"
        );
        Ok(envelope::assemble(&nonce, &salt, &ciphertext))
    }

    fn decrypt(&self, data: &[u8], password: SecretBytes) -> Result<Zeroizing<Vec<u8>>> {
        let envelope = Envelope::parse(data)?;

        let key = self.kdf.derive_key(password.expose_secret(), envelope.salt())?;
        drop(password);

        open::<C>(key.expose_secret(), envelope.nonce(), envelope.ciphertext(), &[])
    }
}

/// Encrypts with an explicit key. The returned buffer carries the tag.
pub(crate) fn seal<C: CipherSuite>(
    key: &[u8],
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let cipher = C::new_from_slice(key).map_err(|_| VaultSealError::InvalidKeyLength)?;
    cipher
        .encrypt(
            GenericArray::from_slice(nonce.as_slice()),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| VaultSealError::Encryption(format!("{}: {e}", C::ALGORITHM)))
}

/// Decrypts with an explicit key. Tag mismatch is the only failure callers
/// can observe, and it is never broken down further.
pub(crate) fn open<C: CipherSuite>(
    key: &[u8],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let cipher = C::new_from_slice(key).map_err(|_| VaultSealError::InvalidKeyLength)?;
    let plaintext = cipher
        .decrypt(
            GenericArray::from_slice(nonce.as_slice()),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|e| {
            debug!(cipher = %C::ALGORITHM, error = %e, "AEAD open failed");
            VaultSealError::AuthenticationFailed
        })?;
    Ok(Zeroizing::new(plaintext))
}
