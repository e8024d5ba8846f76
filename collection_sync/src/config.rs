//! Runtime configuration

use std::time::Duration;

use crate::api::currency::RATE_URL;
use crate::api::github::GITHUB_API_URL;
use crate::api::scryfall::{BATCH_DELAY, BATCH_SIZE, SCRYFALL_URL};
use crate::error::{Result, SyncError};

/// Default name of the collection file in the repository
pub const DEFAULT_PATH: &str = "cartas_magic_detalhadas.csv";

/// Where the collection lives and which services to talk to
#[derive(Debug, Clone)]
pub struct Config {
    /// Repository in `owner/name` form
    pub repo: String,
    /// File path inside the repository
    pub path: String,
    pub branch: String,
    pub token: Option<String>,
    /// Password required for edits; `None` leaves editing open
    pub edit_password: Option<String>,
    pub scryfall_url: String,
    pub github_url: String,
    pub rate_url: String,
    pub batch_size: usize,
    pub batch_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo: String::new(),
            path: DEFAULT_PATH.to_string(),
            branch: "main".to_string(),
            token: None,
            edit_password: None,
            scryfall_url: SCRYFALL_URL.to_string(),
            github_url: GITHUB_API_URL.to_string(),
            rate_url: RATE_URL.to_string(),
            batch_size: BATCH_SIZE,
            batch_delay: BATCH_DELAY,
        }
    }
}

impl Config {
    /// Checks the settings needed to reach the remote store
    pub fn validate(&self) -> Result<()> {
        let mut parts = self.repo.split('/');
        let owner = parts.next().unwrap_or_default();
        let name = parts.next().unwrap_or_default();
        if owner.is_empty() || name.is_empty() || parts.next().is_some() {
            return Err(SyncError::Config(format!(
                "repository must be given as owner/name, got '{}'",
                self.repo
            )));
        }
        if self.path.trim().is_empty() {
            return Err(SyncError::Config("collection path is empty".to_string()));
        }
        if self.branch.trim().is_empty() {
            return Err(SyncError::Config("branch is empty".to_string()));
        }
        if self.token.is_none() {
            log::warn!("No GitHub token configured; writes will be rejected by GitHub");
        }
        Ok(())
    }
}
