//! Interactive login loop and the role-based menus.

use crate::cli::list;
use crate::cli::prompt::{Prompt, TerminalPrompt};
use crate::cli::CliContext;
use crate::core::engine::{AuthEngine, AuthOutcome, Session};
use crate::core::error::{ChangeError, RegistryError};
use crate::models::policy::PolicyRules;
use anyhow::{bail, Result};
use clap::Args;

#[derive(Args, Debug, Default)]
pub struct LoginArgs {
    /// Identity to log in as (prompted when omitted)
    #[arg(long)]
    pub user: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StandardAction {
    ChangePassword,
    Exit,
}

impl StandardAction {
    const ALL: [StandardAction; 2] = [StandardAction::ChangePassword, StandardAction::Exit];

    fn label(self) -> &'static str {
        match self {
            StandardAction::ChangePassword => "Change password",
            StandardAction::Exit => "Exit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdminAction {
    ChangePassword,
    ListAccounts,
    AddAccount,
    LockAccount,
    TogglePolicy,
    ConfigureRules,
    Exit,
}

impl AdminAction {
    const ALL: [AdminAction; 7] = [
        AdminAction::ChangePassword,
        AdminAction::ListAccounts,
        AdminAction::AddAccount,
        AdminAction::LockAccount,
        AdminAction::TogglePolicy,
        AdminAction::ConfigureRules,
        AdminAction::Exit,
    ];

    fn label(self) -> &'static str {
        match self {
            AdminAction::ChangePassword => "Change password",
            AdminAction::ListAccounts => "List accounts",
            AdminAction::AddAccount => "Add account",
            AdminAction::LockAccount => "Lock account",
            AdminAction::TogglePolicy => "Enable/disable password restrictions",
            AdminAction::ConfigureRules => "Configure an account's password rules",
            AdminAction::Exit => "Exit",
        }
    }
}

pub fn run(ctx: &CliContext, args: LoginArgs) -> Result<()> {
    if ctx.non_interactive {
        bail!("login is interactive; use `list` or `check` for automation");
    }
    let (_lock, mut engine) = ctx.open_session()?;
    let mut prompt = TerminalPrompt;
    let session = login_loop(&mut engine, &mut prompt, args.user.as_deref())?;
    run_menu(&mut engine, &mut prompt, &session)?;
    println!("Exiting...");
    Ok(())
}

/// Prompt for credentials until a login is granted.
pub fn login_loop(
    engine: &mut AuthEngine,
    prompt: &mut dyn Prompt,
    fixed_user: Option<&str>,
) -> Result<Session> {
    loop {
        let identity = match fixed_user {
            Some(user) => user.to_string(),
            None => prompt.text("Username")?,
        };
        let secret = prompt.secret("Password")?;
        match engine.authenticate(&identity, &secret) {
            AuthOutcome::Granted(session) => {
                println!("Welcome, {} ({})", session.identity(), session.role());
                return Ok(session);
            }
            outcome => println!("{}", refusal_message(&outcome)),
        }
    }
}

/// Operator-facing text for a refused login. Unknown identities and wrong
/// secrets read the same.
fn refusal_message(outcome: &AuthOutcome) -> &'static str {
    match outcome {
        AuthOutcome::Granted(_) => "Login granted.",
        AuthOutcome::Denied(_) => "Invalid username or password.",
        AuthOutcome::Locked => {
            "Too many failed attempts: the account is now locked. Contact an administrator."
        }
        AuthOutcome::Blocked => "This account is locked. Contact an administrator.",
    }
}

/// Show the menu for the session's role until the operator exits.
pub fn run_menu(engine: &mut AuthEngine, prompt: &mut dyn Prompt, session: &Session) -> Result<()> {
    if session.role().is_admin() {
        admin_menu(engine, prompt, session)
    } else {
        standard_menu(engine, prompt, session)
    }
}

fn standard_menu(engine: &mut AuthEngine, prompt: &mut dyn Prompt, session: &Session) -> Result<()> {
    let labels: Vec<&str> = StandardAction::ALL.iter().map(|a| a.label()).collect();
    loop {
        println!();
        let choice = StandardAction::ALL[prompt.select("User menu", &labels)?];
        match choice {
            StandardAction::ChangePassword => change_password(engine, prompt, session)?,
            StandardAction::Exit => return Ok(()),
        }
    }
}

fn admin_menu(engine: &mut AuthEngine, prompt: &mut dyn Prompt, session: &Session) -> Result<()> {
    let labels: Vec<&str> = AdminAction::ALL.iter().map(|a| a.label()).collect();
    loop {
        println!();
        let choice = AdminAction::ALL[prompt.select("Administrator menu", &labels)?];
        match choice {
            AdminAction::ChangePassword => change_password(engine, prompt, session)?,
            AdminAction::ListAccounts => match engine.accounts(session) {
                Ok(accounts) => println!("{}", list::render_table(accounts)),
                Err(e) => report_registry(e),
            },
            AdminAction::AddAccount => {
                let identity = prompt.text("New username")?;
                match engine.register(session, &identity) {
                    Ok(()) => println!("Account {} added with an empty password.", identity),
                    Err(e) => report_registry(e),
                }
            }
            AdminAction::LockAccount => {
                let identity = prompt.text("Username to lock")?;
                match engine.lock(session, &identity) {
                    Ok(()) => println!("Account {} locked.", identity),
                    Err(e) => report_registry(e),
                }
            }
            AdminAction::TogglePolicy => {
                let enabled = prompt.confirm("Enable password restrictions for all accounts?", true)?;
                match engine.toggle_policy_for_all(session, enabled) {
                    Ok(()) => println!(
                        "Password restrictions {} for all accounts.",
                        if enabled { "enabled" } else { "disabled" }
                    ),
                    Err(e) => report_registry(e),
                }
            }
            AdminAction::ConfigureRules => configure_rules(engine, prompt, session)?,
            AdminAction::Exit => return Ok(()),
        }
    }
}

fn change_password(engine: &mut AuthEngine, prompt: &mut dyn Prompt, session: &Session) -> Result<()> {
    if let Some(account) = engine.find(session.identity()) {
        if account.policy_enabled {
            println!("Password rules: {}", account.rules.describe());
        }
    }
    let old = prompt.secret("Current password")?;
    let new = prompt.secret("New password")?;
    let confirm = prompt.secret("Confirm new password")?;
    match engine.change_password(session.identity(), &old, &new, &confirm) {
        Ok(()) => println!("Password changed."),
        Err(ChangeError::StorageUnavailable(e)) => {
            println!("Password changed for this session, but saving failed: {}", e);
        }
        Err(e) => println!("Password not changed: {}", e),
    }
    Ok(())
}

fn configure_rules(engine: &mut AuthEngine, prompt: &mut dyn Prompt, session: &Session) -> Result<()> {
    let identity = prompt.text("Username to configure")?;
    let Some(current) = engine.find(&identity).map(|a| a.rules) else {
        println!("Account not found: {}", identity);
        return Ok(());
    };
    println!("Current rules: {}", current.describe());
    let min_length = prompt.number("Minimum length", current.min_length)?;
    let max_length = prompt.number("Maximum length", current.max_length)?;
    let min_digits = prompt.number("Minimum digits", current.min_digits)?;
    let min_special = prompt.number("Minimum special characters", current.min_special)?;

    let rules = match PolicyRules::new(min_length, max_length, min_digits, min_special) {
        Ok(rules) => rules,
        Err(e) => {
            println!("Rules not changed: {}", e);
            return Ok(());
        }
    };
    match engine.set_policy_rules(session, &identity, rules) {
        Ok(()) => println!("Rules for {} set to {}.", identity, rules.describe()),
        Err(e) => report_registry(e),
    }
    Ok(())
}

fn report_registry(err: RegistryError) {
    match err {
        RegistryError::StorageUnavailable(e) => {
            println!("Change applied for this session, but saving failed: {}", e);
        }
        other => println!("{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::prompt::scripted::ScriptedPrompt;
    use crate::core::engine::DenyReason;
    use crate::core::registry::AccountRegistry;
    use crate::core::store::MemoryStore;
    use crate::models::account::Role;

    fn fresh_engine() -> AuthEngine {
        AuthEngine::new(AccountRegistry::open(
            Box::new(MemoryStore::new()),
            PolicyRules::default(),
        ))
    }

    #[test]
    fn test_login_loop_retries_until_granted() {
        let mut engine = fresh_engine();
        let mut prompt = ScriptedPrompt::new(&["ghost", "x", "admin", "wrong", "admin", ""]);
        let session = login_loop(&mut engine, &mut prompt, None).unwrap();
        assert_eq!(session.role(), Role::Administrator);
        assert_eq!(prompt.remaining(), 0);
    }

    #[test]
    fn test_refusal_does_not_reveal_unknown_identity() {
        let mut engine = fresh_engine();
        let unknown = engine.authenticate("ghost", "x");
        let wrong = engine.authenticate("admin", "x");
        assert!(matches!(
            wrong,
            AuthOutcome::Denied(DenyReason::WrongSecret { attempts_remaining: 2 })
        ));
        assert_eq!(refusal_message(&unknown), refusal_message(&wrong));
    }

    #[test]
    fn test_login_loop_with_fixed_user() {
        let mut engine = fresh_engine();
        let mut prompt = ScriptedPrompt::new(&["nope", ""]);
        let session = login_loop(&mut engine, &mut prompt, Some("admin")).unwrap();
        assert_eq!(session.identity(), "admin");
    }

    #[test]
    fn test_admin_menu_session() {
        let mut engine = fresh_engine();
        let mut prompt = ScriptedPrompt::new(&["admin", ""]);
        let admin = login_loop(&mut engine, &mut prompt, None).unwrap();

        let mut prompt = ScriptedPrompt::new(&[
            "Add account",
            "alice",
            "Add account",
            "bob",
            "Lock account",
            "bob",
            "Configure an account's password rules",
            "alice",
            "4",
            "",
            "0",
            "0",
            "Enable/disable password restrictions",
            "y",
            "List accounts",
            "Exit",
        ]);
        run_menu(&mut engine, &mut prompt, &admin).unwrap();
        assert_eq!(prompt.remaining(), 0);

        assert!(engine.find("bob").unwrap().locked);
        let alice = engine.find("alice").unwrap();
        assert_eq!(alice.rules, PolicyRules::new(4, 12, 0, 0).unwrap());
        assert!(engine.change_password("alice", "", "abcd", "abcd").is_ok());
    }

    #[test]
    fn test_standard_menu_change_password() {
        let mut engine = fresh_engine();
        let mut prompt = ScriptedPrompt::new(&["admin", ""]);
        let admin = login_loop(&mut engine, &mut prompt, None).unwrap();
        engine.register(&admin, "carol").unwrap();

        let mut prompt = ScriptedPrompt::new(&["carol", ""]);
        let carol = login_loop(&mut engine, &mut prompt, None).unwrap();
        let mut prompt = ScriptedPrompt::new(&[
            "Change password",
            "",
            "weak",
            "weak",
            "Change password",
            "",
            "c4r0l!?",
            "c4r0l!?",
            "Exit",
        ]);
        run_menu(&mut engine, &mut prompt, &carol).unwrap();
        assert!(matches!(
            engine.authenticate("carol", "c4r0l!?"),
            AuthOutcome::Granted(_)
        ));
    }

    #[test]
    fn test_invalid_rules_leave_account_unchanged() {
        let mut engine = fresh_engine();
        let mut prompt = ScriptedPrompt::new(&["admin", ""]);
        let admin = login_loop(&mut engine, &mut prompt, None).unwrap();
        let mut prompt = ScriptedPrompt::new(&[
            "Configure an account's password rules",
            "admin",
            "10",
            "5",
            "",
            "",
            "Exit",
        ]);
        run_menu(&mut engine, &mut prompt, &admin).unwrap();
        assert_eq!(engine.find("admin").unwrap().rules, PolicyRules::default());
    }
}
