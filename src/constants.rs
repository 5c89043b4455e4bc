//! Centralized constants for defaults, file names, and permissions.

/// File holding one account per line.
pub const USERS_FILE: &str = "users.txt";

/// Optional configuration file, relative to the store root.
pub const CONFIG_FILE: &str = "credgate.toml";

/// Advisory lock held for the lifetime of an interactive session.
pub const SESSION_LOCK_FILE: &str = "users.lock";

/// Permission mode for the users file.
pub const USERS_FILE_MODE: u32 = 0o600;

/// Permission mode for the store root directory.
pub const ROOT_DIR_MODE: u32 = 0o700;

/// Field separator of the users file.
pub const FIELD_DELIMITER: char = ',';

/// Identity of the administrator synthesized on first run.
pub const BOOTSTRAP_ADMIN: &str = "admin";

/// Consecutive failed logins before an account is locked.
pub const MAX_FAILED_ATTEMPTS: u32 = 3;

/// Default password rules for newly created accounts.
pub const DEFAULT_MIN_LENGTH: usize = 6;
pub const DEFAULT_MAX_LENGTH: usize = 12;
pub const DEFAULT_MIN_DIGITS: usize = 2;
pub const DEFAULT_MIN_SPECIAL: usize = 2;

/// Maximum accepted size of a secret read from stdin, in bytes.
pub const MAX_SECRET_INPUT: usize = 4096;
