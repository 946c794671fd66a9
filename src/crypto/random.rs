use std::sync::OnceLock;

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;

use crate::error::{Result, VaultSealError};

static GLOBAL: OnceLock<SecureRandom> = OnceLock::new();

/// Process-wide strong random source for nonces, salts and container
/// passwords.
///
/// Every request goes straight to the OS generator, so there is no userspace
/// state to reseed and a forked child never replays its parent's stream.
/// Failure to reach the OS generator is an environment error.
#[derive(Debug)]
pub struct SecureRandom {
    rng: OsRng,
}

impl SecureRandom {
    fn from_os() -> Result<Self> {
        let random = Self { rng: OsRng };
        random.fill(&mut [0u8; 1])?;
        Ok(random)
    }

    /// Returns the shared instance, checking the OS generator on first use.
    pub fn global() -> Result<&'static SecureRandom> {
        if let Some(random) = GLOBAL.get() {
            return Ok(random);
        }
        let random = Self::from_os()?;
        debug!("OS random generator available");
        Ok(GLOBAL.get_or_init(|| random))
    }

    pub fn fill(&self, buf: &mut [u8]) -> Result<()> {
        let mut rng = self.rng;
        rng.try_fill_bytes(buf)
            .map_err(|e| VaultSealError::Environment(format!("OS random generator failed: {e}")))
    }

    pub fn array<const N: usize>(&self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.fill(&mut out)?;
        Ok(out)
    }
}
