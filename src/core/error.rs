//! Domain error types returned by the registry, engine, and store.

use crate::models::policy::PolicyFailure;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to read or write the users file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("account not found: {0}")]
    NotFound(String),
    #[error("account already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid identity '{0}': must be non-empty and contain no commas or line breaks")]
    InvalidIdentity(String),
    #[error(transparent)]
    InvalidRules(#[from] PolicyError),
    #[error("'{0}' requires an administrator")]
    Forbidden(&'static str),
    /// The in-memory change was applied but could not be saved.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ChangeError {
    #[error("account not found: {0}")]
    NotFound(String),
    #[error("old password is incorrect")]
    WrongOldPassword,
    #[error("password does not satisfy the policy: {}", join_failures(.0))]
    PolicyViolation(Vec<PolicyFailure>),
    #[error("new password and confirmation do not match")]
    ConfirmationMismatch,
    #[error("password must not contain commas or line breaks")]
    InvalidSecret,
    /// The new secret is active in memory but could not be saved.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("invalid rules: {0}")]
    InvalidRules(String),
}

fn join_failures(failures: &[PolicyFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
