use crate::cli::CliContext;
use crate::constants;
use crate::models::config::ConfigFile;
use crate::util::fs as store_fs;
use anyhow::{Context, Result};
use clap::Args;
use std::fs;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Also write a credgate.toml with the default settings if none exists
    #[arg(long)]
    pub write_config: bool,
}

pub fn run(ctx: &CliContext, args: InitArgs) -> Result<()> {
    let paths = &ctx.paths;
    if !paths.root.exists() {
        store_fs::ensure_dir(&paths.root, constants::ROOT_DIR_MODE)?;
    }

    if args.write_config && !paths.config.exists() {
        let content = toml::to_string_pretty(&ConfigFile::default())
            .context("serialize default config")?;
        fs::write(&paths.config, content)
            .with_context(|| format!("write config {}", paths.config.display()))?;
        println!("Wrote {}", paths.config.display());
    }

    let (_lock, engine) = ctx.open_session()?;
    let registry = engine.registry();
    println!(
        "store initialized at {} ({} account(s))",
        paths.users_file.display(),
        registry.len()
    );

    match store_fs::mode_of(&paths.users_file) {
        Some(mode) if mode != constants::USERS_FILE_MODE => println!(
            "warning: {} has mode {:04o} (expected {:04o}); passwords are stored in plain text",
            paths.users_file.display(),
            mode,
            constants::USERS_FILE_MODE
        ),
        _ => {}
    }

    if let Some(admin) = registry.find(constants::BOOTSTRAP_ADMIN) {
        if admin.secret.is_empty() {
            println!("administrator '{}' has an empty password: log in and change it", admin.identity());
        }
    }
    Ok(())
}
