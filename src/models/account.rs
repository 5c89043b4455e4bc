//! Credential-bearing account record.

use crate::constants;
use crate::models::policy::PolicyRules;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Standard,
    Administrator,
}

impl Role {
    /// Role implied by an identity when it is not stored alongside the account.
    pub fn for_identity(identity: &str) -> Self {
        if identity == constants::BOOTSTRAP_ADMIN {
            Role::Administrator
        } else {
            Role::Standard
        }
    }

    pub fn is_admin(self) -> bool {
        self == Role::Administrator
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Standard => write!(f, "standard"),
            Role::Administrator => write!(f, "administrator"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    identity: String,
    pub secret: String,
    pub locked: bool,
    pub policy_enabled: bool,
    pub rules: PolicyRules,
    pub failed_attempts: u32,
    pub role: Role,
}

impl Account {
    /// New unlocked account with an empty secret and restrictions enabled.
    pub fn new(identity: impl Into<String>, role: Role, rules: PolicyRules) -> Self {
        Self {
            identity: identity.into(),
            secret: String::new(),
            locked: false,
            policy_enabled: true,
            rules,
            failed_attempts: 0,
            role,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Plain equality; secrets are stored as entered.
    pub fn secret_matches(&self, candidate: &str) -> bool {
        self.secret == candidate
    }
}
