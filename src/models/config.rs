//! Configuration file model (`credgate.toml`).

use crate::constants;
use crate::models::policy::PolicyRules;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub policy: PolicySection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSection {
    /// Users file, relative to the store root unless absolute.
    #[serde(default)]
    pub users_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySection {
    /// Rules assigned to newly registered accounts.
    #[serde(flatten)]
    pub defaults: PolicyRules,

    /// Consecutive failed logins before an account is locked.
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u32,
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            defaults: PolicyRules::default(),
            max_failed_attempts: default_max_failed_attempts(),
        }
    }
}

fn default_max_failed_attempts() -> u32 {
    constants::MAX_FAILED_ATTEMPTS
}
