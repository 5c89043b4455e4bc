//! Account registry: ownership, uniqueness, lookup, and bootstrap.

use crate::constants;
use crate::core::error::{RegistryError, StoreError};
use crate::core::store::{AccountStore, StoredAccount};
use crate::models::account::{Account, Role};
use crate::models::policy::PolicyRules;
use tracing::{debug, info, warn};

/// Owns every account and the store they are persisted to.
///
/// Accounts keep their insertion order. Every mutating method saves the full
/// set before returning; when that save fails the change stays applied in
/// memory and the method returns [`RegistryError::StorageUnavailable`].
pub struct AccountRegistry {
    accounts: Vec<Account>,
    store: Box<dyn AccountStore>,
    default_rules: PolicyRules,
}

impl AccountRegistry {
    /// Load from `store`, bootstrapping the administrator if nothing was loaded.
    pub fn open(store: Box<dyn AccountStore>, default_rules: PolicyRules) -> Self {
        let mut registry = Self {
            accounts: Vec::new(),
            store,
            default_rules,
        };
        registry.load();
        registry
    }

    /// Replace the in-memory accounts with the store's contents.
    ///
    /// An unreadable store is logged and treated as empty; an empty result
    /// bootstraps the administrator.
    pub fn load(&mut self) {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                warn!("account data unavailable, starting empty: {}", e);
                Vec::new()
            }
        };
        let accounts: Vec<Account> = stored
            .into_iter()
            .map(|s| self.account_from_stored(s))
            .collect();
        self.accounts = accounts;
        debug!(accounts = self.accounts.len(), "loaded accounts");
        if self.is_empty() {
            self.bootstrap();
        }
    }

    pub fn save(&mut self) -> Result<(), StoreError> {
        let stored: Vec<StoredAccount> = self.accounts.iter().map(StoredAccount::from).collect();
        self.store.save(&stored)
    }

    /// Add an account with an empty secret and the default rules.
    ///
    /// The role follows the identity, as it does on load, so registering the
    /// bootstrap name while it is absent restores an administrator.
    pub fn register(&mut self, identity: &str) -> Result<(), RegistryError> {
        validate_identity(identity)?;
        if self.find(identity).is_some() {
            return Err(RegistryError::AlreadyExists(identity.to_string()));
        }
        let role = Role::for_identity(identity);
        self.accounts
            .push(Account::new(identity, role, self.default_rules));
        info!(identity, %role, "registered account");
        Ok(self.persist()?)
    }

    pub fn find(&self, identity: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.identity() == identity)
    }

    pub(crate) fn find_mut(&mut self, identity: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.identity() == identity)
    }

    pub fn set_locked(&mut self, identity: &str, locked: bool) -> Result<(), RegistryError> {
        let account = self
            .find_mut(identity)
            .ok_or_else(|| RegistryError::NotFound(identity.to_string()))?;
        account.locked = locked;
        info!(identity, locked, "updated lock state");
        Ok(self.persist()?)
    }

    /// Enable or disable password restrictions on every account, saving once.
    pub fn set_policy_enabled_for_all(&mut self, enabled: bool) -> Result<(), RegistryError> {
        for account in &mut self.accounts {
            account.policy_enabled = enabled;
        }
        info!(enabled, accounts = self.accounts.len(), "toggled password restrictions");
        Ok(self.persist()?)
    }

    /// Accounts in insertion order.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Save after a mutation, logging a failure the caller will also see.
    pub(crate) fn persist(&mut self) -> Result<(), StoreError> {
        self.save().inspect_err(|e| {
            warn!("saving accounts failed, change kept in memory only: {}", e);
        })
    }

    fn bootstrap(&mut self) {
        self.accounts.push(Account::new(
            constants::BOOTSTRAP_ADMIN,
            Role::Administrator,
            self.default_rules,
        ));
        info!(
            identity = constants::BOOTSTRAP_ADMIN,
            "no accounts found, created administrator with an empty password"
        );
        // Already logged by persist; the registry is usable either way.
        let _ = self.persist();
    }

    fn account_from_stored(&self, stored: StoredAccount) -> Account {
        let role = Role::for_identity(&stored.identity);
        let mut account = Account::new(stored.identity, role, self.default_rules);
        account.secret = stored.secret;
        account.locked = stored.locked;
        account.policy_enabled = stored.policy_enabled;
        account
    }
}

fn validate_identity(identity: &str) -> Result<(), RegistryError> {
    if identity.is_empty()
        || identity.contains(constants::FIELD_DELIMITER)
        || identity.contains(['\n', '\r'])
    {
        return Err(RegistryError::InvalidIdentity(identity.to_string()));
    }
    Ok(())
}
