use tracing::debug;

use crate::crypto::{HEADER_LEN, MIN_ENVELOPE_LEN, NONCE_LEN, SALT_LEN};
use crate::error::{Result, VaultSealError};

/// Borrowed view of `NONCE (12) | SALT (16) | CIPHERTEXT | TAG (16)`.
///
/// The layout carries no version or algorithm identifiers; those live in the
/// JSON wrapper around it.
#[derive(Debug, Clone, Copy)]
pub struct Envelope<'a> {
    nonce: &'a [u8; NONCE_LEN],
    salt: &'a [u8; SALT_LEN],
    ciphertext: &'a [u8],
}

impl<'a> Envelope<'a> {
    /// Splits `data` into its three regions. Anything too short to hold a
    /// header and a tag is reported as an authentication failure.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() < MIN_ENVELOPE_LEN {
            debug!(
                len = data.len(),
                min = MIN_ENVELOPE_LEN,
                "envelope too short"
            );
            return Err(VaultSealError::AuthenticationFailed);
        }

        let (header, ciphertext) = data.split_at(HEADER_LEN);
        let (nonce, salt) = header.split_at(NONCE_LEN);

        Ok(Self {
            nonce: nonce
                .try_into()
                .map_err(|_| VaultSealError::AuthenticationFailed)?,
            salt: salt
                .try_into()
                .map_err(|_| VaultSealError::AuthenticationFailed)?,
            ciphertext,
        })
    }

    pub fn nonce(&self) -> &'a [u8; NONCE_LEN] {
        self.nonce
    }

    pub fn salt(&self) -> &'a [u8; SALT_LEN] {
        self.salt
    }

    /// Ciphertext with the authentication tag still appended.
    pub fn ciphertext(&self) -> &'a [u8] {
        self.ciphertext
    }
}

/// Concatenates the envelope regions.
pub fn assemble(nonce: &[u8; NONCE_LEN], salt: &[u8; SALT_LEN], ciphertext: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    data.extend_from_slice(nonce);
    data.extend_from_slice(salt);
    data.extend_from_slice(ciphertext);
    data
}
