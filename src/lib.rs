//! Local account store with per-account password policies.
//!
//! Accounts live in a comma-separated `users.txt`; an administrator manages
//! them from an interactive menu, standard users can only change their own
//! password. Three consecutive failed logins lock an account.
//!
//! ## Modules
//! - `cli` — Command-line handlers and menus
//! - `core` — Store, registry, and authentication engine
//! - `models` — Accounts, policy rules, configuration
//! - `util` — Filesystem helpers

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod util;
