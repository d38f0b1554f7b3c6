//! Immutable store configuration.
//!
//! The secret and table prefix are read exactly once, at construction,
//! and injected into [`AccountStore`](crate::AccountStore). Nothing in
//! the store reads the process environment after this point.

use std::fmt;
use std::path::PathBuf;

use crate::error::{AccountError, AccountResult};

/// Environment variable holding the shared credential-hashing secret.
pub const SECRET_ENV_VAR: &str = "USERBASE_SECRET";

/// Where the backing table lives.
#[derive(Debug, Clone)]
pub enum StoreLocation {
    /// SQLite database file on disk.
    Disk(PathBuf),
    /// In-memory database — useful for tests.
    Memory,
}

/// Configuration for one [`AccountStore`](crate::AccountStore) instance.
///
/// The secret never appears in `Debug` output.
#[derive(Clone)]
pub struct StoreConfig {
    /// Table-name prefix; the accounts table is named `<prefix>_users`.
    pub prefix: String,
    /// Shared secret keying the credential hasher.
    pub(crate) secret: Vec<u8>,
    /// Backing table location.
    pub location: StoreLocation,
}

impl StoreConfig {
    /// Build a configuration from explicit parts.
    ///
    /// An empty prefix or an empty secret is a fatal configuration
    /// error: an empty secret would degrade every credential digest to
    /// a fixed weak key.
    pub fn new(
        prefix: impl Into<String>,
        secret: impl Into<Vec<u8>>,
        location: StoreLocation,
    ) -> AccountResult<Self> {
        let prefix = prefix.into();
        let secret = secret.into();

        if prefix.is_empty() {
            return Err(AccountError::Configuration(
                "table prefix must not be empty".into(),
            ));
        }
        if secret.is_empty() {
            return Err(AccountError::Configuration(
                "hashing secret must not be empty".into(),
            ));
        }

        Ok(Self {
            prefix,
            secret,
            location,
        })
    }

    /// Build a configuration with the secret sourced from
    /// [`SECRET_ENV_VAR`].
    ///
    /// The environment is read once, here. A missing or empty variable
    /// fails with [`AccountError::Configuration`].
    pub fn from_env(prefix: impl Into<String>, location: StoreLocation) -> AccountResult<Self> {
        let secret = std::env::var(SECRET_ENV_VAR).map_err(|_| {
            AccountError::Configuration(format!("{SECRET_ENV_VAR} is not set"))
        })?;

        Self::new(prefix, secret.into_bytes(), location)
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("prefix", &self.prefix)
            .field("secret", &"<redacted>")
            .field("location", &self.location)
            .finish()
    }
}

// ── tests ────────────────────────────────────────────────────────────
