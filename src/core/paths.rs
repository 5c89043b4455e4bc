//! Store path resolution.

use crate::constants;
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StorePaths {
    pub root: PathBuf,
    pub users_file: PathBuf,
    pub config: PathBuf,
    pub session_lock: PathBuf,
}

impl StorePaths {
    /// Resolve the root from the CLI arg, `CREDGATE_ROOT`, or the current directory.
    pub fn resolve(root_arg: Option<PathBuf>) -> Result<Self> {
        if let Some(root) = root_arg {
            return Ok(Self::from_root(root));
        }
        if let Ok(root) = env::var("CREDGATE_ROOT") {
            if !root.is_empty() {
                return Ok(Self::from_root(PathBuf::from(root)));
            }
        }
        let cwd = env::current_dir().context("resolve current directory")?;
        Ok(Self::from_root(cwd))
    }

    pub fn from_root(root: PathBuf) -> Self {
        let users_file = root.join(constants::USERS_FILE);
        let config = root.join(constants::CONFIG_FILE);
        let session_lock = root.join(constants::SESSION_LOCK_FILE);
        Self {
            root,
            users_file,
            config,
            session_lock,
        }
    }

    /// Point the users file elsewhere; relative paths are taken from the root.
    pub fn with_users_file(mut self, users_file: &str) -> Self {
        let path = Path::new(users_file);
        self.users_file = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        self
    }
}

impl std::fmt::Display for StorePaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "store@{}", self.root.display())
    }
}
