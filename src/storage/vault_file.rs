use std::fs;
use std::io::Write;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::info;
use zeroize::Zeroizing;

use crate::core::models::{
    Argon2Params, CryptoConfig, KdfAlgorithm, Pbkdf2Params, ScryptParams,
};
use crate::crypto::factory::crypto;
use crate::crypto::secure::SecretBytes;
use crate::error::{Result, VaultSealError};
use crate::storage::format::{
    argon2_type_name, cipher_identifiers, hmac_name, kdf_name, parse_argon2_type, parse_cipher,
    parse_hmac, parse_kdf, APP_NAME, APP_VERSION,
};

const TEMP_PREFIX: &str = ".vaultseal_tmp_";

/// On-disk JSON wrapper around one envelope.
///
/// Decryption uses the parameters recorded here, never the application's
/// current defaults, so vaults stay openable after the settings change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VaultFile {
    #[serde(rename = "appName")]
    pub app_name: String,
    #[serde(rename = "appVersion")]
    pub app_version: String,
    #[serde(rename = "keyALGO")]
    pub key_algo: String,
    #[serde(rename = "cipALGO")]
    pub cip_algo: String,
    #[serde(rename = "isArgon2")]
    pub is_argon2: bool,
    #[serde(rename = "argon2Type")]
    pub argon2_type: String,
    #[serde(rename = "argon2Memo")]
    pub argon2_memory: u32,
    #[serde(rename = "argon2Iter")]
    pub argon2_iterations: u32,
    #[serde(rename = "argon2Para")]
    pub argon2_parallelism: u32,
    #[serde(rename = "PBKDF2Iter")]
    pub pbkdf2_iterations: u32,
    #[serde(rename = "keyDerivation", default, skip_serializing_if = "Option::is_none")]
    pub key_derivation: Option<String>,
    #[serde(rename = "PBKDF2Hmac", default, skip_serializing_if = "Option::is_none")]
    pub pbkdf2_hmac: Option<String>,
    #[serde(rename = "scryptCost", default, skip_serializing_if = "Option::is_none")]
    pub scrypt_cost: Option<u32>,
    #[serde(rename = "scryptR", default, skip_serializing_if = "Option::is_none")]
    pub scrypt_r: Option<u32>,
    #[serde(rename = "scryptP", default, skip_serializing_if = "Option::is_none")]
    pub scrypt_p: Option<u32>,
    /// Base64 of `nonce | salt | ciphertext | tag`.
    #[serde(rename = "encryptedData")]
    pub encrypted_data: String,
}

impl VaultFile {
    /// Encrypts `payload` under `config` and records every parameter needed to
    /// open it again.
    pub fn seal(payload: &[u8], password: SecretBytes, config: &CryptoConfig) -> Result<Self> {
        let envelope = crypto(config)?.encrypt(payload, password)?;
        let (key_algo, cip_algo) = cipher_identifiers(config.cipher);
        let scrypt = (config.kdf == KdfAlgorithm::Scrypt).then_some(config.scrypt);

        Ok(Self {
            app_name: APP_NAME.to_string(),
            app_version: APP_VERSION.to_string(),
            key_algo: key_algo.to_string(),
            cip_algo: cip_algo.to_string(),
            is_argon2: config.kdf == KdfAlgorithm::Argon2,
            argon2_type: argon2_type_name(config.argon2.variant).to_string(),
            argon2_memory: config.argon2.memory,
            argon2_iterations: config.argon2.iterations,
            argon2_parallelism: config.argon2.parallelism,
            pbkdf2_iterations: config.pbkdf2.iterations,
            key_derivation: Some(kdf_name(config.kdf).to_string()),
            pbkdf2_hmac: Some(hmac_name(config.pbkdf2.hmac).to_string()),
            scrypt_cost: scrypt.map(|s| s.cost),
            scrypt_r: scrypt.map(|s| s.r),
            scrypt_p: scrypt.map(|s| s.p),
            encrypted_data: BASE64.encode(envelope),
        })
    }

    /// Rebuilds the configuration recorded in the file.
    pub fn crypto_config(&self) -> Result<CryptoConfig> {
        if self.app_name != APP_NAME {
            return Err(VaultSealError::InvalidVaultFile {
                reason: "not a vault file".to_string(),
            });
        }

        let cipher = parse_cipher(&self.key_algo, &self.cip_algo)?;
        let kdf = match (self.is_argon2, self.key_derivation.as_deref()) {
            (true, None) => KdfAlgorithm::Argon2,
            (false, None) => KdfAlgorithm::Pbkdf2,
            (is_argon2, Some(name)) => {
                let kdf = parse_kdf(name)?;
                if is_argon2 != (kdf == KdfAlgorithm::Argon2) {
                    return Err(VaultSealError::Config(format!(
                        "isArgon2={is_argon2} contradicts keyDerivation={name}"
                    )));
                }
                kdf
            }
        };

        let argon2 = Argon2Params {
            variant: parse_argon2_type(&self.argon2_type)?,
            memory: self.argon2_memory,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        };
        let pbkdf2 = Pbkdf2Params {
            hmac: match self.pbkdf2_hmac.as_deref() {
                Some(name) => parse_hmac(name)?,
                None => Default::default(),
            },
            iterations: self.pbkdf2_iterations,
        };
        let scrypt = match (self.scrypt_cost, self.scrypt_r, self.scrypt_p) {
            (Some(cost), Some(r), Some(p)) => ScryptParams { cost, r, p },
            _ if kdf == KdfAlgorithm::Scrypt => {
                return Err(VaultSealError::InvalidVaultFile {
                    reason: "scrypt parameters missing".to_string(),
                })
            }
            _ => ScryptParams::default(),
        };

        Ok(CryptoConfig {
            cipher,
            kdf,
            argon2,
            pbkdf2,
            scrypt,
        })
    }

    /// Decrypts the payload with the file's own parameters.
    pub fn open(&self, password: SecretBytes) -> Result<Zeroizing<Vec<u8>>> {
        let config = self.crypto_config()?;
        let envelope = BASE64.decode(self.encrypted_data.as_bytes())?;
        crypto(&config)?.decrypt(&envelope, password)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Encrypt `payload` and write it to `path` atomically.
pub fn write_vault(
    path: &Path,
    payload: &[u8],
    password: SecretBytes,
    config: &CryptoConfig,
) -> Result<()> {
    let file = VaultFile::seal(payload, password, config)?;
    atomic_write(path, file.to_json()?.as_bytes())?;
    info!(path = %path.display(), cipher = %config.cipher, kdf = %config.kdf, "vault written");
    Ok(())
}

/// Read and decrypt a vault file, returning the payload and the recorded
/// configuration.
pub fn read_vault(
    path: &Path,
    password: SecretBytes,
) -> Result<(Zeroizing<Vec<u8>>, CryptoConfig)> {
    let file = load(path)?;
    let config = file.crypto_config()?;
    let payload = file.open(password)?;
    info!(path = %path.display(), "vault read");
    Ok((payload, config))
}

/// Read the recorded configuration without decrypting.
pub fn read_vault_header(path: &Path) -> Result<CryptoConfig> {
    load(path)?.crypto_config()
}

fn load(path: &Path) -> Result<VaultFile> {
    let json = fs::read_to_string(path)?;
    VaultFile::from_json(&json).map_err(|e| VaultSealError::InvalidVaultFile {
        reason: e.to_string(),
    })
}

/// Writes through a uniquely named temp file in the target directory, then
/// renames it over `path`. The temp file is removed on every failure path.
fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut temp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(parent)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Argon2Variant, CipherAlgorithm, HmacAlgorithm};
    use crate::crypto::secure::secret_bytes;
    use tempfile::TempDir;

    fn fast_scrypt_config() -> CryptoConfig {
        CryptoConfig::new(CipherAlgorithm::ChaCha20Poly1305, KdfAlgorithm::Scrypt).with_scrypt(
            ScryptParams {
                cost: 8,
                r: 8,
                p: 1,
            },
        )
    }

    fn argon2_config() -> CryptoConfig {
        CryptoConfig::new(CipherAlgorithm::Aes256Gcm, KdfAlgorithm::Argon2).with_argon2(
            Argon2Params {
                variant: Argon2Variant::Id,
                memory: 19,
                iterations: 2,
                parallelism: 1,
            },
        )
    }

    #[test]
    fn test_write_and_read_vault() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.vault");
        let config = fast_scrypt_config();

        write_vault(&path, b"csv,blob", secret_bytes("master_password"), &config).unwrap();
        let (payload, read_config) = read_vault(&path, secret_bytes("master_password")).unwrap();

        assert_eq!(payload.as_slice(), b"csv,blob");
        assert_eq!(read_config, config);
    }

    #[test]
    fn test_wrong_password() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.vault");

        write_vault(&path, b"data", secret_bytes("correct"), &fast_scrypt_config()).unwrap();
        let result = read_vault(&path, secret_bytes("wrong"));
        assert!(matches!(result, Err(VaultSealError::AuthenticationFailed)));
    }

    #[test]
    fn test_json_field_names() {
        let file = VaultFile::seal(b"data", secret_bytes("pw"), &argon2_config()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&file.to_json().unwrap()).unwrap();

        assert_eq!(value["appName"], APP_NAME);
        assert_eq!(value["keyALGO"], "AES");
        assert_eq!(value["cipALGO"], "AES_256/GCM/NOPADDING");
        assert_eq!(value["isArgon2"], true);
        assert_eq!(value["argon2Type"], "Argon2id");
        assert_eq!(value["argon2Memo"], 19);
        assert_eq!(value["argon2Iter"], 2);
        assert_eq!(value["argon2Para"], 1);
        assert_eq!(value["PBKDF2Iter"], 600_000);
        assert!(value.get("scryptCost").is_none());

        let envelope = BASE64.decode(value["encryptedData"].as_str().unwrap()).unwrap();
        assert_eq!(envelope.len(), 12 + 16 + 4 + 16);
    }

    #[test]
    fn test_recorded_parameters_win_over_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.vault");
        let recorded = CryptoConfig::new(CipherAlgorithm::Aes256Gcm, KdfAlgorithm::Argon2)
            .with_argon2(Argon2Params {
                variant: Argon2Variant::Id,
                memory: 64,
                iterations: 8,
                parallelism: 2,
            });
        write_vault(&path, b"payload", secret_bytes("pw"), &recorded).unwrap();

        // The application's default has since moved to PBKDF2.
        let current_default = CryptoConfig::default().with_pbkdf2(Pbkdf2Params::default());
        assert_ne!(current_default, recorded);

        let (payload, config) = read_vault(&path, secret_bytes("pw")).unwrap();
        assert_eq!(payload.as_slice(), b"payload");
        assert_eq!(config, recorded);
    }

    #[test]
    fn test_legacy_file_without_optional_fields() {
        let json = r#"{
            "appName": "vaultseal",
            "appVersion": "0.0.1",
            "keyALGO": "CHACHA20",
            "cipALGO": "CHACHA20-POLY1305",
            "isArgon2": false,
            "argon2Type": "Argon2id",
            "argon2Memo": 64,
            "argon2Iter": 3,
            "argon2Para": 4,
            "PBKDF2Iter": 700000,
            "encryptedData": ""
        }"#;
        let file = VaultFile::from_json(json).unwrap();
        let config = file.crypto_config().unwrap();
        assert_eq!(config.kdf, KdfAlgorithm::Pbkdf2);
        assert_eq!(config.cipher, CipherAlgorithm::ChaCha20Poly1305);
        assert_eq!(config.pbkdf2.hmac, HmacAlgorithm::Sha256);
        assert_eq!(config.pbkdf2.iterations, 700_000);

        // Empty envelope: authentication failure, not a panic.
        assert!(matches!(
            file.open(secret_bytes("pw")),
            Err(VaultSealError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_foreign_app_name_rejected() {
        let mut file = VaultFile::seal(b"x", secret_bytes("pw"), &fast_scrypt_config()).unwrap();
        file.app_name = "other-app".to_string();
        assert!(matches!(
            file.crypto_config(),
            Err(VaultSealError::InvalidVaultFile { .. })
        ));
    }

    #[test]
    fn test_contradicting_kdf_flags_rejected() {
        let mut file = VaultFile::seal(b"x", secret_bytes("pw"), &fast_scrypt_config()).unwrap();
        file.is_argon2 = true;
        assert!(matches!(file.crypto_config(), Err(VaultSealError::Config(_))));
    }

    #[test]
    fn test_missing_scrypt_parameters() {
        let mut file = VaultFile::seal(b"x", secret_bytes("pw"), &fast_scrypt_config()).unwrap();
        file.scrypt_r = None;
        assert!(matches!(
            file.crypto_config(),
            Err(VaultSealError::InvalidVaultFile { .. })
        ));
    }

    #[test]
    fn test_missing_required_field() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.vault");
        fs::write(&path, r#"{"appName": "vaultseal"}"#).unwrap();
        assert!(matches!(
            read_vault_header(&path),
            Err(VaultSealError::InvalidVaultFile { .. })
        ));
    }

    #[test]
    fn test_corrupted_base64() {
        let mut file = VaultFile::seal(b"x", secret_bytes("pw"), &fast_scrypt_config()).unwrap();
        file.encrypted_data = "***".to_string();
        assert!(matches!(
            file.open(secret_bytes("pw")),
            Err(VaultSealError::Base64(_))
        ));
    }

    #[test]
    fn test_read_vault_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.vault");
        let config = fast_scrypt_config();

        write_vault(&path, b"data", secret_bytes("pw"), &config).unwrap();
        assert_eq!(read_vault_header(&path).unwrap(), config);
    }

    fn leftover_temp_files(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter(|entry| {
                entry
                    .as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .starts_with(TEMP_PREFIX)
            })
            .count()
    }

    #[test]
    fn test_failed_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        // Renaming a file over a directory fails after the temp file exists.
        let path = dir.path().join("occupied");
        fs::create_dir(&path).unwrap();

        let result = write_vault(&path, b"data", secret_bytes("pw"), &fast_scrypt_config());
        assert!(matches!(result, Err(VaultSealError::Io(_))));
        assert_eq!(leftover_temp_files(dir.path()), 0);
    }

    #[test]
    fn test_concurrent_writes_in_one_directory() {
        let dir = TempDir::new().unwrap();
        let config = fast_scrypt_config();

        std::thread::scope(|scope| {
            for name in ["a.vault", "b.vault", "c.vault"] {
                let path = dir.path().join(name);
                scope.spawn(move || {
                    write_vault(&path, name.as_bytes(), secret_bytes("pw"), &config).unwrap();
                });
            }
        });

        for name in ["a.vault", "b.vault", "c.vault"] {
            let (payload, _) = read_vault(&dir.path().join(name), secret_bytes("pw")).unwrap();
            assert_eq!(payload.as_slice(), name.as_bytes());
        }
        assert_eq!(leftover_temp_files(dir.path()), 0);
    }

    #[test]
    fn test_garbage_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.vault");
        fs::write(&path, b"garbage data that is not a vault").unwrap();
        assert!(read_vault(&path, secret_bytes("pw")).is_err());
    }
}
