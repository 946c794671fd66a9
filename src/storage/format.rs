use crate::core::models::{Argon2Variant, CipherAlgorithm, HmacAlgorithm, KdfAlgorithm};
use crate::error::{Result, VaultSealError};

/// Value of `appName` in every vault file this crate writes.
pub const APP_NAME: &str = "vaultseal";

/// Value of `appVersion` in files written by this build.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const KEY_ALGO_AES: &str = "AES";
pub const KEY_ALGO_CHACHA20: &str = "CHACHA20";

pub const CIP_ALGO_AES_GCM: &str = "AES_256/GCM/NOPADDING";
pub const CIP_ALGO_CHACHA20_POLY1305: &str = "CHACHA20-POLY1305";

pub const ARGON2_TYPE_D: &str = "Argon2d";
pub const ARGON2_TYPE_ID: &str = "Argon2id";

pub const KDF_ARGON2: &str = "ARGON2";
pub const KDF_PBKDF2: &str = "PBKDF2";
pub const KDF_SCRYPT: &str = "SCRYPT";

pub const HMAC_SHA256: &str = "HmacSHA256";
pub const HMAC_SHA512: &str = "HmacSHA512";

/// `(keyALGO, cipALGO)` for a cipher.
pub fn cipher_identifiers(cipher: CipherAlgorithm) -> (&'static str, &'static str) {
    match cipher {
        CipherAlgorithm::Aes256Gcm => (KEY_ALGO_AES, CIP_ALGO_AES_GCM),
        CipherAlgorithm::ChaCha20Poly1305 => (KEY_ALGO_CHACHA20, CIP_ALGO_CHACHA20_POLY1305),
    }
}

/// Resolves `keyALGO`/`cipALGO`; both must name the same cipher.
pub fn parse_cipher(key_algo: &str, cip_algo: &str) -> Result<CipherAlgorithm> {
    let by_key = if key_algo.eq_ignore_ascii_case(KEY_ALGO_AES) {
        CipherAlgorithm::Aes256Gcm
    } else if key_algo.eq_ignore_ascii_case(KEY_ALGO_CHACHA20) {
        CipherAlgorithm::ChaCha20Poly1305
    } else {
        return Err(VaultSealError::UnsupportedAlgorithm(format!(
            "key algorithm {key_algo:?}"
        )));
    };

    let by_transformation = if cip_algo.eq_ignore_ascii_case(CIP_ALGO_AES_GCM) {
        CipherAlgorithm::Aes256Gcm
    } else if cip_algo.eq_ignore_ascii_case(CIP_ALGO_CHACHA20_POLY1305) {
        CipherAlgorithm::ChaCha20Poly1305
    } else {
        return Err(VaultSealError::UnsupportedAlgorithm(format!(
            "cipher transformation {cip_algo:?}"
        )));
    };

    if by_key != by_transformation {
        return Err(VaultSealError::Config(format!(
            "key algorithm {key_algo} does not match cipher {cip_algo}"
        )));
    }
    Ok(by_key)
}

pub fn argon2_type_name(variant: Argon2Variant) -> &'static str {
    match variant {
        Argon2Variant::D => ARGON2_TYPE_D,
        Argon2Variant::Id => ARGON2_TYPE_ID,
    }
}

pub fn parse_argon2_type(name: &str) -> Result<Argon2Variant> {
    match name {
        ARGON2_TYPE_D => Ok(Argon2Variant::D),
        ARGON2_TYPE_ID => Ok(Argon2Variant::Id),
        other => Err(VaultSealError::UnsupportedAlgorithm(format!(
            "argon2 type {other:?}"
        ))),
    }
}

pub fn kdf_name(kdf: KdfAlgorithm) -> &'static str {
    match kdf {
        KdfAlgorithm::Argon2 => KDF_ARGON2,
        KdfAlgorithm::Pbkdf2 => KDF_PBKDF2,
        KdfAlgorithm::Scrypt => KDF_SCRYPT,
    }
}

pub fn parse_kdf(name: &str) -> Result<KdfAlgorithm> {
    if name.eq_ignore_ascii_case(KDF_ARGON2) {
        Ok(KdfAlgorithm::Argon2)
    } else if name.eq_ignore_ascii_case(KDF_PBKDF2) {
        Ok(KdfAlgorithm::Pbkdf2)
    } else if name.eq_ignore_ascii_case(KDF_SCRYPT) {
        Ok(KdfAlgorithm::Scrypt)
    } else {
        Err(VaultSealError::UnsupportedAlgorithm(format!(
            "key derivation {name:?}"
        )))
    }
}

pub fn hmac_name(hmac: HmacAlgorithm) -> &'static str {
    match hmac {
        HmacAlgorithm::Sha256 => HMAC_SHA256,
        HmacAlgorithm::Sha512 => HMAC_SHA512,
    }
}

pub fn parse_hmac(name: &str) -> Result<HmacAlgorithm> {
    match name {
        HMAC_SHA256 => Ok(HmacAlgorithm::Sha256),
        HMAC_SHA512 => Ok(HmacAlgorithm::Sha512),
        other => Err(VaultSealError::UnsupportedAlgorithm(format!("hmac {other:?}"))),
    }
}
