//! Credential verification, lockout, and policy-enforced mutations.

use crate::constants;
use crate::core::error::{ChangeError, RegistryError};
use crate::core::registry::AccountRegistry;
use crate::models::account::{Account, Role};
use crate::models::policy::PolicyRules;
use tracing::{info, warn};

/// Proof of a successful login, carried into every later operation.
///
/// Only [`AuthEngine::authenticate`] creates sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    identity: String,
    role: Role,
}

impl Session {
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    NotFound,
    WrongSecret { attempts_remaining: u32 },
}

/// Terminal result of one login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Granted(Session),
    Denied(DenyReason),
    /// This attempt exhausted the allowance and locked the account.
    Locked,
    /// The account was already locked; the secret was not checked.
    Blocked,
}

pub struct AuthEngine {
    registry: AccountRegistry,
    max_failed_attempts: u32,
}

impl AuthEngine {
    pub fn new(registry: AccountRegistry) -> Self {
        Self::with_max_failed_attempts(registry, constants::MAX_FAILED_ATTEMPTS)
    }

    pub fn with_max_failed_attempts(registry: AccountRegistry, max_failed_attempts: u32) -> Self {
        Self {
            registry,
            max_failed_attempts: max_failed_attempts.max(1),
        }
    }

    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    pub fn find(&self, identity: &str) -> Option<&Account> {
        self.registry.find(identity)
    }

    pub fn authenticate(&mut self, identity: &str, secret: &str) -> AuthOutcome {
        let max = self.max_failed_attempts;
        let Some(account) = self.registry.find_mut(identity) else {
            return AuthOutcome::Denied(DenyReason::NotFound);
        };
        if account.locked {
            return AuthOutcome::Blocked;
        }

        if account.secret_matches(secret) {
            account.failed_attempts = 0;
            return AuthOutcome::Granted(Session {
                identity: account.identity().to_string(),
                role: account.role,
            });
        }

        account.failed_attempts += 1;
        if account.failed_attempts < max {
            return AuthOutcome::Denied(DenyReason::WrongSecret {
                attempts_remaining: max - account.failed_attempts,
            });
        }

        account.locked = true;
        warn!(
            identity,
            attempts = account.failed_attempts,
            "account locked after repeated failed logins"
        );
        // The lock holds in memory even if it cannot be saved; persist logs it.
        let _ = self.registry.persist();
        AuthOutcome::Locked
    }

    /// Replace the secret of `identity` after verifying the old one.
    ///
    /// Checks run in order: old secret, policy (when enabled for the
    /// account), confirmation.
    pub fn change_password(
        &mut self,
        identity: &str,
        old_secret: &str,
        new_secret: &str,
        confirm_secret: &str,
    ) -> Result<(), ChangeError> {
        let account = self
            .registry
            .find_mut(identity)
            .ok_or_else(|| ChangeError::NotFound(identity.to_string()))?;

        if !account.secret_matches(old_secret) {
            return Err(ChangeError::WrongOldPassword);
        }
        if account.policy_enabled {
            let failures = account.rules.check(new_secret);
            if !failures.is_empty() {
                return Err(ChangeError::PolicyViolation(failures));
            }
        }
        if new_secret != confirm_secret {
            return Err(ChangeError::ConfirmationMismatch);
        }
        if new_secret.contains(constants::FIELD_DELIMITER) || new_secret.contains(['\n', '\r']) {
            return Err(ChangeError::InvalidSecret);
        }

        account.secret = new_secret.to_string();
        info!(identity, "password changed");
        self.registry.persist()?;
        Ok(())
    }

    /// Add an account with an empty password. Administrator only.
    pub fn register(&mut self, actor: &Session, identity: &str) -> Result<(), RegistryError> {
        require_admin(actor, "add account")?;
        self.registry.register(identity)
    }

    /// Lock an account. Administrator only.
    pub fn lock(&mut self, actor: &Session, identity: &str) -> Result<(), RegistryError> {
        require_admin(actor, "lock account")?;
        self.registry.set_locked(identity, true)
    }

    /// Overwrite the password rules of one account. Administrator only.
    pub fn set_policy_rules(
        &mut self,
        actor: &Session,
        identity: &str,
        rules: PolicyRules,
    ) -> Result<(), RegistryError> {
        require_admin(actor, "configure password rules")?;
        rules.ensure_consistent()?;
        let account = self
            .registry
            .find_mut(identity)
            .ok_or_else(|| RegistryError::NotFound(identity.to_string()))?;
        account.rules = rules;
        info!(identity, rules = %rules.describe(), "password rules updated");
        self.registry.persist()?;
        Ok(())
    }

    /// Enable or disable password restrictions for every account. Administrator only.
    pub fn toggle_policy_for_all(
        &mut self,
        actor: &Session,
        enabled: bool,
    ) -> Result<(), RegistryError> {
        require_admin(actor, "toggle password restrictions")?;
        self.registry.set_policy_enabled_for_all(enabled)
    }

    /// Every account, in registration order. Administrator only.
    pub fn accounts(&self, actor: &Session) -> Result<&[Account], RegistryError> {
        require_admin(actor, "list accounts")?;
        Ok(self.registry.accounts())
    }
}

fn require_admin(actor: &Session, action: &'static str) -> Result<(), RegistryError> {
    if actor.role.is_admin() {
        Ok(())
    } else {
        Err(RegistryError::Forbidden(action))
    }
}
