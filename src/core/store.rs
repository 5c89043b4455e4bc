//! Persistence of accounts in the comma-separated users file.
//!
//! One line per account: `identity,secret,locked,policy_enabled`. Rules and
//! failed-attempt counters are not part of the line and reset on reload.

use crate::constants;
use crate::core::error::StoreError;
use crate::models::account::Account;
use crate::util::fs as store_fs;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The four persisted fields of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAccount {
    pub identity: String,
    pub secret: String,
    pub locked: bool,
    pub policy_enabled: bool,
}

impl From<&Account> for StoredAccount {
    fn from(account: &Account) -> Self {
        Self {
            identity: account.identity().to_string(),
            secret: account.secret.clone(),
            locked: account.locked,
            policy_enabled: account.policy_enabled,
        }
    }
}

/// Load/save collaborator consumed by the registry.
pub trait AccountStore {
    /// Read every stored account. A store that does not exist yet is empty.
    fn load(&self) -> Result<Vec<StoredAccount>, StoreError>;

    /// Replace the stored contents with `accounts`, in order.
    fn save(&mut self, accounts: &[StoredAccount]) -> Result<(), StoreError>;
}

/// Users file on disk.
#[derive(Debug, Clone)]
pub struct LineFileStore {
    path: PathBuf,
}

impl LineFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AccountStore for LineFileStore {
    fn load(&self) -> Result<Vec<StoredAccount>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "users file does not exist yet");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    action: "read users file",
                    path: self.path.clone(),
                    source,
                })
            }
        };
        Ok(parse(&content))
    }

    fn save(&mut self, accounts: &[StoredAccount]) -> Result<(), StoreError> {
        let io_err = |action: &'static str| {
            let path = self.path.clone();
            move |source: io::Error| StoreError::Io {
                action,
                path,
                source,
            }
        };

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(io_err("create directory for"))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".users-")
            .tempfile_in(parent)
            .map_err(io_err("create temp file for"))?;
        tmp.write_all(render(accounts).as_bytes())
            .map_err(io_err("write"))?;
        tmp.flush().map_err(io_err("flush"))?;
        store_fs::set_file_mode(tmp.as_file(), constants::USERS_FILE_MODE)
            .map_err(io_err("set permissions on"))?;

        tmp.persist(&self.path)
            .map_err(|e| io_err("persist")(e.error))?;
        debug!(path = %self.path.display(), accounts = accounts.len(), "saved users file");
        Ok(())
    }
}

/// In-memory store, used when nothing should touch the filesystem.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub accounts: Vec<StoredAccount>,
    pub saves: usize,
    /// Make every `save` fail, for exercising the storage-unavailable paths.
    pub fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: Vec<StoredAccount>) -> Self {
        Self {
            accounts,
            ..Self::default()
        }
    }
}

impl AccountStore for MemoryStore {
    fn load(&self) -> Result<Vec<StoredAccount>, StoreError> {
        Ok(self.accounts.clone())
    }

    fn save(&mut self, accounts: &[StoredAccount]) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::Io {
                action: "write",
                path: PathBuf::from("<memory>"),
                source: io::Error::new(io::ErrorKind::Other, "saves disabled"),
            });
        }
        self.accounts = accounts.to_vec();
        self.saves += 1;
        Ok(())
    }
}

/// Parse file content, skipping lines that cannot describe an account.
pub fn parse(content: &str) -> Vec<StoredAccount> {
    let mut accounts: Vec<StoredAccount> = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match decode_line(line, idx + 1) {
            Ok(account) => {
                if accounts.iter().any(|a| a.identity == account.identity) {
                    warn!(line = idx + 1, "duplicate identity in users file, keeping the first");
                    continue;
                }
                accounts.push(account);
            }
            Err(e) => warn!("skipping users file entry: {}", e),
        }
    }
    accounts
}

/// Serialize accounts to file content, one line each.
pub fn render(accounts: &[StoredAccount]) -> String {
    let mut out = String::new();
    for account in accounts {
        out.push_str(&encode_line(account));
        out.push('\n');
    }
    out
}

pub fn encode_line(account: &StoredAccount) -> String {
    let d = constants::FIELD_DELIMITER;
    format!(
        "{}{d}{}{d}{}{d}{}",
        account.identity, account.secret, account.locked, account.policy_enabled
    )
}

pub fn decode_line(line: &str, line_no: usize) -> Result<StoredAccount, StoreError> {
    let fields: Vec<&str> = line.split(constants::FIELD_DELIMITER).collect();
    if fields.len() < 4 {
        return Err(StoreError::Malformed {
            line: line_no,
            reason: format!("expected 4 fields, found {}", fields.len()),
        });
    }
    if fields[0].is_empty() {
        return Err(StoreError::Malformed {
            line: line_no,
            reason: "empty identity".into(),
        });
    }
    Ok(StoredAccount {
        identity: fields[0].to_string(),
        secret: fields[1].to_string(),
        locked: parse_flag(fields[2]),
        policy_enabled: parse_flag(fields[3]),
    })
}

/// Anything but a case-insensitive `true` reads as false.
fn parse_flag(field: &str) -> bool {
    field.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn stored(identity: &str, secret: &str, locked: bool, policy_enabled: bool) -> StoredAccount {
        StoredAccount {
            identity: identity.into(),
            secret: secret.into(),
            locked,
            policy_enabled,
        }
    }

    #[test]
    fn test_encode_line_format() {
        assert_eq!(encode_line(&stored("admin", "", false, true)), "admin,,false,true");
        assert_eq!(
            encode_line(&stored("bob", "ab12!?", true, false)),
            "bob,ab12!?,true,false"
        );
    }

    #[test]
    fn test_decode_line_flags() {
        let account = decode_line("bob,pw,TRUE,yes", 1).unwrap();
        assert!(account.locked);
        assert!(!account.policy_enabled);
    }

    #[test]
    fn test_decode_line_ignores_extra_fields() {
        let account = decode_line("bob,pw,false,true,extra", 1).unwrap();
        assert_eq!(account, stored("bob", "pw", false, true));
    }

    #[test]
    fn test_decode_line_rejects_short_lines() {
        assert!(decode_line("bob,pw,false", 3).is_err());
        assert!(decode_line(",pw,false,true", 3).is_err());
    }

    #[test]
    fn test_parse_skips_blank_malformed_and_duplicate_lines() {
        let content = "admin,,false,true\n\nbroken\nbob,x,false,true\nbob,y,true,true\r\n";
        let accounts = parse(content);
        assert_eq!(
            accounts,
            vec![stored("admin", "", false, true), stored("bob", "x", false, true)]
        );
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = LineFileStore::new(dir.path().join("users.txt"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_writes_exact_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.txt");
        let mut store = LineFileStore::new(&path);
        store
            .save(&[stored("admin", "", false, true), stored("bob", "ab12!?", true, false)])
            .unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "admin,,false,true\nbob,ab12!?,true,false\n");
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut store = LineFileStore::new(dir.path().join("nested").join("users.txt"));
        let accounts = vec![
            stored("admin", "", false, true),
            stored("alice", "al12!!ce", false, false),
            stored("bob", "b0b$$9", true, true),
        ];
        store.save(&accounts).unwrap();
        assert_eq!(store.load().unwrap(), accounts);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_sets_private_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.txt");
        let mut store = LineFileStore::new(&path);
        store.save(&[stored("admin", "", false, true)]).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn test_memory_store_failing_saves() {
        let mut store = MemoryStore::new();
        store.fail_saves = true;
        assert!(store.save(&[stored("admin", "", false, true)]).is_err());
        assert!(store.accounts.is_empty());
        assert_eq!(store.saves, 0);
    }
}
