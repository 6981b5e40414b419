//! Accounts file loading.
//!
//! The keeper reads a JSON accounts file of the form
//! `{"accounts": [{"privateKey": "0x..."}, ...]}`. The file is read once at
//! startup; credentials are immutable for the life of the process.

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read accounts file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse accounts file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no accounts configured")]
    NoAccounts,
}

/// One account's signing credential.
///
/// The key is only reachable through [`private_key`](Self::private_key);
/// `Debug` redacts it so a credential can never leak into a log line via
/// formatting.
#[derive(Clone, Deserialize)]
pub struct AccountCredential {
    #[serde(alias = "privateKey")]
    private_key: String,
}

impl AccountCredential {
    pub fn new(private_key: impl Into<String>) -> Self {
        Self {
            private_key: private_key.into(),
        }
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl fmt::Debug for AccountCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountCredential")
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub accounts: Vec<AccountCredential>,
}

impl Config {
    /// Load and validate the accounts file. An empty roster is rejected
    /// here, before any pipeline is built.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        if config.accounts.is_empty() {
            return Err(ConfigError::NoAccounts);
        }
        Ok(config)
    }
}
