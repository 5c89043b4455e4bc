use crate::models::config::ConfigFile;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Read `credgate.toml`; a missing file yields the defaults.
pub fn load(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("parse config {}", path.display()))?;
    config
        .policy
        .defaults
        .ensure_consistent()
        .with_context(|| format!("[policy] in {}", path.display()))?;
    Ok(config)
}
