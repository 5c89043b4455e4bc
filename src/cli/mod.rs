//! CLI routing and command dispatch.

use crate::core::engine::AuthEngine;
use crate::core::file_lock::SessionLock;
use crate::core::paths::StorePaths;
use crate::core::registry::AccountRegistry;
use crate::core::store::LineFileStore;
use crate::models::config::ConfigFile;
use crate::models::policy::PolicyRules;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

pub mod check;
pub mod init;
pub mod list;
pub mod prompt;
pub mod session;

/// Shared context passed to all command handlers.
pub struct CliContext {
    pub paths: StorePaths,
    pub non_interactive: bool,
    pub config: ConfigFile,
}

impl CliContext {
    pub fn default_rules(&self) -> PolicyRules {
        self.config.policy.defaults
    }

    /// Take the session lock and load the registry behind an engine.
    ///
    /// The lock must outlive every use of the engine.
    pub fn open_session(&self) -> Result<(SessionLock, AuthEngine)> {
        fs::create_dir_all(&self.paths.root)
            .with_context(|| format!("create store root {}", self.paths.root.display()))?;
        let Some(lock) = SessionLock::try_acquire(&self.paths.session_lock)? else {
            bail!(
                "another session is active on {} (lock held on {})",
                self.paths,
                self.paths.session_lock.display()
            );
        };
        let store = LineFileStore::new(&self.paths.users_file);
        let registry = AccountRegistry::open(Box::new(store), self.default_rules());
        let engine = AuthEngine::with_max_failed_attempts(
            registry,
            self.config.policy.max_failed_attempts,
        );
        Ok((lock, engine))
    }
}

#[derive(Parser, Debug)]
#[command(name = "credgate", version, about = "Local account store with password policies and role-based menus")]
pub struct Cli {
    /// Directory holding users.txt and credgate.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Run in non-interactive mode (no prompts, suitable for automation)
    #[arg(long, global = true, env = "CREDGATE_NON_INTERACTIVE")]
    pub non_interactive: bool,

    /// Log filter, e.g. `warn` or `credgate=debug`
    #[arg(long, global = true, env = "CREDGATE_LOG", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let mut paths = StorePaths::resolve(self.root)?;

        // A broken config file falls back to the defaults rather than
        // locking every operator out.
        let config = match crate::core::config::load(&paths.config) {
            Ok(config) => config,
            Err(e) => {
                warn!("cannot use {}: {:#}; falling back to defaults", paths.config.display(), e);
                ConfigFile::default()
            }
        };
        if let Some(users_file) = config.store.users_file.as_deref() {
            paths = paths.with_users_file(users_file);
        }

        let ctx = CliContext {
            paths,
            non_interactive: self.non_interactive,
            config,
        };

        match self.command.unwrap_or(Commands::Login(session::LoginArgs::default())) {
            Commands::Login(args) => session::run(&ctx, args),
            Commands::Init(args) => init::run(&ctx, args),
            Commands::List(args) => list::run(&ctx, args),
            Commands::Check(args) => check::run(&ctx, args),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and open the menu for your role (default)
    Login(session::LoginArgs),
    /// Create the store and the bootstrap administrator
    Init(init::InitArgs),
    /// List accounts (administrator password required)
    List(list::ListArgs),
    /// Check a candidate password against the default rules
    Check(check::CheckArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::AuthOutcome;
    use tempfile::TempDir;

    fn context(root: &std::path::Path) -> CliContext {
        CliContext {
            paths: StorePaths::from_root(root.to_path_buf()),
            non_interactive: true,
            config: ConfigFile::default(),
        }
    }

    #[test]
    fn test_cli_parses_default_command() {
        let cli = Cli::try_parse_from(["credgate", "--root", "/tmp/x"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn test_cli_parses_list_flags() {
        let cli = Cli::try_parse_from([
            "credgate",
            "list",
            "--format",
            "json",
            "--password-stdin",
            "--non-interactive",
        ])
        .unwrap();
        assert!(cli.non_interactive);
        match cli.command {
            Some(Commands::List(args)) => {
                assert_eq!(args.format, "json");
                assert_eq!(args.user, "admin");
                assert!(args.password_stdin);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_open_session_bootstraps_store() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());
        let (_lock, mut engine) = ctx.open_session().unwrap();
        assert!(matches!(engine.authenticate("admin", ""), AuthOutcome::Granted(_)));
        let content = fs::read_to_string(dir.path().join("users.txt")).unwrap();
        assert_eq!(content, "admin,,false,true\n");
    }

    #[test]
    fn test_second_session_is_refused() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());
        let _first = ctx.open_session().unwrap();
        let err = ctx.open_session().err().unwrap();
        assert!(err.to_string().contains("another session is active"));
    }

    #[test]
    fn test_login_refused_non_interactive() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());
        assert!(session::run(&ctx, session::LoginArgs::default()).is_err());
    }
}
