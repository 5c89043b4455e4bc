use crate::cli::prompt::{read_secret_from_stdin, Prompt, TerminalPrompt};
use crate::cli::CliContext;
use crate::core::engine::AuthOutcome;
use crate::models::account::{Account, Role};
use crate::models::policy::PolicyRules;
use anyhow::{bail, Context, Result};
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Administrator to authenticate as
    #[arg(long, default_value = "admin")]
    pub user: String,

    /// Read the administrator password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,

    /// Output format: table|json
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[derive(Serialize)]
struct ListItem<'a> {
    identity: &'a str,
    role: Role,
    locked: bool,
    policy_enabled: bool,
    rules: PolicyRules,
}

impl<'a> From<&'a Account> for ListItem<'a> {
    fn from(account: &'a Account) -> Self {
        Self {
            identity: account.identity(),
            role: account.role,
            locked: account.locked,
            policy_enabled: account.policy_enabled,
            rules: account.rules,
        }
    }
}

pub fn run(ctx: &CliContext, args: ListArgs) -> Result<()> {
    if args.format != "table" && args.format != "json" {
        bail!("invalid format: {} (use table|json)", args.format);
    }
    if ctx.non_interactive && !args.password_stdin {
        bail!("--non-interactive requires --password-stdin for list");
    }

    let secret = if args.password_stdin {
        read_secret_from_stdin()?
    } else {
        TerminalPrompt.secret(&format!("Password for {}", args.user))?
    };

    let (_lock, mut engine) = ctx.open_session()?;
    let session = match engine.authenticate(&args.user, &secret) {
        AuthOutcome::Granted(session) => session,
        AuthOutcome::Denied(_) => bail!("invalid username or password"),
        AuthOutcome::Locked | AuthOutcome::Blocked => bail!("account {} is locked", args.user),
    };
    let accounts = engine.accounts(&session)?;

    if args.format == "json" {
        let items: Vec<ListItem> = accounts.iter().map(ListItem::from).collect();
        let json = serde_json::to_string_pretty(&items).context("serialize list")?;
        println!("{}", json);
        return Ok(());
    }

    println!("{}", render_table(accounts));
    Ok(())
}

/// Account overview without secrets.
pub fn render_table(accounts: &[Account]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Username").add_attribute(Attribute::Bold),
        Cell::new("Role").add_attribute(Attribute::Bold),
        Cell::new("Locked").add_attribute(Attribute::Bold),
        Cell::new("Restrictions").add_attribute(Attribute::Bold),
        Cell::new("Rules").add_attribute(Attribute::Bold),
    ]);

    for account in accounts {
        let rules = if account.policy_enabled {
            account.rules.describe()
        } else {
            "-".to_string()
        };
        table.add_row(vec![
            account.identity().to_string(),
            account.role.to_string(),
            yes_no(account.locked).to_string(),
            if account.policy_enabled { "on" } else { "off" }.to_string(),
            rules,
        ]);
    }
    table
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
