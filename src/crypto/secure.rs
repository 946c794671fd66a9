//! Zeroing discipline for password and key material.
//!
//! Every buffer that holds a password, a container password or a derived key
//! is owned by a type that overwrites it with zeros when dropped: [`SecretBox`]
//! from `secrecy` or [`Zeroizing`]. Functions that consume a password take it
//! by value, so the buffer is wiped on every exit path, including early
//! returns through `?`.
//!
//! This is best-effort. The allocator, the OS or an earlier copy made by the
//! caller (e.g. a UI text widget) may still hold the same bytes, and nothing
//! here can reach those.

use secrecy::SecretBox;
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::KEY_LEN;

/// Password or other secret byte string, wiped on drop.
pub type SecretBytes = SecretBox<Vec<u8>>;

/// Raw 256-bit key produced by a KDF, wiped on drop.
pub type DerivedKey = SecretBox<[u8; KEY_LEN]>;

/// Moves `bytes` into a zeroizing box. Any copy the caller keeps is their own
/// responsibility.
pub fn secret_bytes(bytes: impl Into<Vec<u8>>) -> SecretBytes {
    SecretBox::new(Box::new(bytes.into()))
}

/// Moves the contents of a zeroizing buffer into a [`SecretBytes`] without
/// leaving a second copy behind.
pub fn into_secret(mut buf: Zeroizing<Vec<u8>>) -> SecretBytes {
    SecretBox::new(Box::new(std::mem::take(&mut *buf)))
}

/// Overwrites a buffer the caller still owns, such as the contents of a
/// password field once it has been copied into a [`SecretBytes`].
pub fn wipe(buf: &mut [u8]) {
    buf.zeroize();
}

/// Zeroes and truncates a string in place.
pub fn wipe_string(s: &mut String) {
    s.zeroize();
}

pub(crate) fn empty_key() -> DerivedKey {
    SecretBox::new(Box::new([0u8; KEY_LEN]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_bytes_holds_value() {
        let secret = secret_bytes("hunter2");
        assert_eq!(secret.expose_secret().as_slice(), b"hunter2");
    }

    #[test]
    fn test_into_secret_moves_contents() {
        let buf = Zeroizing::new(vec![1u8, 2, 3]);
        let secret = into_secret(buf);
        assert_eq!(secret.expose_secret().as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_wipe_caller_buffers() {
        let mut buf = *b"hunter2";
        wipe(&mut buf);
        assert_eq!(buf, [0u8; 7]);

        let mut field = String::from("hunter2");
        wipe_string(&mut field);
        assert!(field.is_empty());
    }

    #[test]
    fn test_debug_is_redacted() {
        let secret = secret_bytes("TestPassword123!");
        assert!(!format!("{secret:?}").contains("TestPassword"));
    }
}
