pub mod format;
pub mod vault_file;

pub use vault_file::{read_vault, read_vault_header, write_vault, VaultFile};
