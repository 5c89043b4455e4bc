//! Check a candidate password against the configured default rules.

use crate::cli::prompt::{read_secret_from_stdin, Prompt, TerminalPrompt};
use crate::cli::CliContext;
use anyhow::{bail, Result};
use clap::Args;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Read the candidate from stdin instead of prompting
    #[arg(long)]
    pub from_stdin: bool,
}

pub fn run(ctx: &CliContext, args: CheckArgs) -> Result<()> {
    if ctx.non_interactive && !args.from_stdin {
        bail!("--non-interactive requires --from-stdin for check");
    }
    let candidate = if args.from_stdin {
        read_secret_from_stdin()?
    } else {
        TerminalPrompt.secret("Candidate password")?
    };

    let rules = ctx.default_rules();
    let failures = rules.check(&candidate);
    if failures.is_empty() {
        println!("OK: satisfies {}", rules.describe());
        return Ok(());
    }

    for failure in &failures {
        println!("  [FAIL] {}", failure);
    }
    println!();
    println!("Rejected: {} rule(s) not met ({})", failures.len(), rules.describe());
    std::process::exit(1);
}
