//! Operator input: interactive prompts and stdin.

use crate::constants;
use anyhow::{bail, Context, Result};
use dialoguer::{Confirm, Input, Password, Select};
use std::io::Read;
use zeroize::Zeroizing;

/// Source of operator input for the interactive menus.
pub trait Prompt {
    fn text(&mut self, prompt: &str) -> Result<String>;
    fn secret(&mut self, prompt: &str) -> Result<Zeroizing<String>>;
    fn number(&mut self, prompt: &str, default: usize) -> Result<usize>;
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;
    /// Index of the chosen item.
    fn select(&mut self, prompt: &str, items: &[&str]) -> Result<usize>;
}

/// Terminal prompts backed by dialoguer.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn text(&mut self, prompt: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .with_context(|| format!("read {}", prompt.to_lowercase()))
    }

    fn secret(&mut self, prompt: &str) -> Result<Zeroizing<String>> {
        let value = Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .with_context(|| format!("read {}", prompt.to_lowercase()))?;
        Ok(Zeroizing::new(value))
    }

    fn number(&mut self, prompt: &str, default: usize) -> Result<usize> {
        Input::<usize>::new()
            .with_prompt(prompt)
            .default(default)
            .interact_text()
            .with_context(|| format!("read {}", prompt.to_lowercase()))
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .with_context(|| format!("read {}", prompt.to_lowercase()))
    }

    fn select(&mut self, prompt: &str, items: &[&str]) -> Result<usize> {
        Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()
            .context("read menu choice")
    }
}

/// Read one secret from stdin, dropping the trailing line break.
pub fn read_secret_from_stdin() -> Result<Zeroizing<String>> {
    let mut buf = Zeroizing::new(String::new());
    std::io::stdin()
        .take(constants::MAX_SECRET_INPUT as u64 + 1)
        .read_to_string(&mut buf)
        .context("read secret from stdin")?;
    if buf.len() > constants::MAX_SECRET_INPUT {
        bail!(
            "secret exceeds maximum size (max {} bytes)",
            constants::MAX_SECRET_INPUT
        );
    }
    Ok(Zeroizing::new(
        trim_line_break(&buf).to_string(),
    ))
}

fn trim_line_break(s: &str) -> &str {
    s.trim_end_matches(['\r', '\n'])
}
