use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultSealError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid vault file: {reason}")]
    InvalidVaultFile { reason: String },

    /// AEAD tag mismatch or malformed envelope. Never split further.
    #[error("Authentication failed: wrong password or corrupted data")]
    AuthenticationFailed,

    #[error("Vault is locked")]
    VaultLocked,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid key length")]
    InvalidKeyLength,

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("KDF error: {0}")]
    Kdf(String),

    #[error("Environment error: {0}")]
    Environment(String),

    #[error("Credential store error: {0}")]
    CredentialStore(String),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

/// Coarse classification used by hosts to decide how to react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Authentication,
    Environment,
    Resource,
    Io,
    Format,
    State,
}

impl VaultSealError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_)
            | Self::UnsupportedAlgorithm(_)
            | Self::InvalidKeyLength
            | Self::Kdf(_)
            | Self::Encryption(_)
            | Self::TomlDe(_)
            | Self::TomlSer(_) => ErrorKind::Configuration,
            Self::AuthenticationFailed => ErrorKind::Authentication,
            Self::Environment(_) => ErrorKind::Environment,
            Self::CredentialStore(_) => ErrorKind::Resource,
            Self::Io(_) => ErrorKind::Io,
            Self::Bincode(_) | Self::Json(_) | Self::Base64(_) | Self::InvalidVaultFile { .. } => {
                ErrorKind::Format
            }
            Self::VaultLocked => ErrorKind::State,
        }
    }

    /// Environment failures mean no secure vault is possible in this process.
    pub fn is_recoverable(&self) -> bool {
        self.kind() != ErrorKind::Environment
    }

    /// Opaque message for the presentation layer. The `Display` output carries
    /// the diagnostic detail and belongs in the log, not in a dialog.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Authentication => "Wrong password or corrupted vault file",
            ErrorKind::Configuration => "The encryption settings are invalid",
            ErrorKind::Environment => "Required cryptographic support is unavailable",
            ErrorKind::Resource => "Please enter the master password again",
            ErrorKind::Io => "The vault file could not be accessed",
            ErrorKind::Format => "The file is not a valid vault",
            ErrorKind::State => "The vault is locked",
        }
    }
}

pub type Result<T> = std::result::Result<T, VaultSealError>;
