use clap::{Parser, Subcommand};
use std::io::Write;
use thiserror::Error;

use crate::auth::{self, AuthError, AuthMode, AuthOutcome};
use crate::backend::{Backend, BackendError};
use crate::history::TaskHistory;
use crate::models::{Credentials, Task};
use crate::tracker::format_hms;

#[derive(Parser)]
#[command(name = "timeguru")]
#[command(about = "TimeGuru - track what you work on, one session at a time")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Use development mode (separate dev config and data directories)
    #[arg(long, global = true)]
    pub dev: bool,

    /// Override the database path from the config file
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Override the log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Create an account
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Print your sessions, newest first
    List {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    AuthError(#[from] AuthError),
    #[error("{0}")]
    BackendError(#[from] BackendError),
    #[error("Failed to serialize tasks: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Failed to write output: {0}")]
    IoError(#[from] std::io::Error),
}

/// Handle the sign-up command
pub fn handle_sign_up<B: Backend + ?Sized>(
    email: String,
    password: String,
    backend: &B,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let credentials = Credentials::new(email, password);
    if let AuthOutcome::SignedUp(user) = auth::submit(backend, AuthMode::SignUp, &credentials)? {
        writeln!(out, "{}", auth::SIGN_UP_SUCCESS_MESSAGE)?;
        writeln!(out, "User ID: {}", user.id)?;
    }
    Ok(())
}

/// Handle the list command: sign in, print, sign out
pub fn handle_list<B: Backend + ?Sized>(
    email: String,
    password: String,
    json: bool,
    backend: &B,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let credentials = Credentials::new(email, password);
    let AuthOutcome::SignedIn(session) = auth::submit(backend, AuthMode::SignIn, &credentials)? else {
        return Ok(());
    };

    let mut history = TaskHistory::new();
    let loaded = history.reload(backend, &session);
    // Always release the token, even if the load failed
    let signed_out = auth::sign_out(backend, &session);
    loaded?;
    signed_out?;

    if json {
        serde_json::to_writer_pretty(&mut *out, history.tasks())?;
        writeln!(out)?;
    } else {
        write_table(history.tasks(), out)?;
    }
    Ok(())
}

fn write_table(tasks: &[Task], out: &mut impl Write) -> std::io::Result<()> {
    if tasks.is_empty() {
        return writeln!(out, "No tasks yet");
    }

    writeln!(
        out,
        "{:<16}  {:<8}  {:<10}  {:<13}  {}",
        "START", "DURATION", "CATEGORY", "PRODUCTIVE", "TITLE"
    )?;
    for task in tasks {
        writeln!(
            out,
            "{:<16}  {:<8}  {:<10}  {:<13}  {}",
            task.start_time.format("%Y-%m-%d %H:%M"),
            format_hms(task.duration),
            task.category.label(),
            if task.is_productive { "Productive" } else { "Unproductive" },
            task.title,
        )?;
        if let Some(notes) = &task.notes {
            writeln!(out, "{:>55}{}", "", notes)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SqliteBackend;

    fn backend() -> SqliteBackend {
        SqliteBackend::open_in_memory().unwrap().with_hash_cost(4)
    }

    #[test]
    fn sign_up_prints_confirmation() {
        let backend = backend();
        let mut out = Vec::new();
        handle_sign_up("ada@example.com".into(), "secret1".into(), &backend, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("Account created successfully! Please sign in."));
    }

    #[test]
    fn list_with_no_tasks() {
        let backend = backend();
        handle_sign_up("ada@example.com".into(), "secret1".into(), &backend, &mut Vec::new()).unwrap();

        let mut out = Vec::new();
        handle_list("ada@example.com".into(), "secret1".into(), false, &backend, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No tasks yet\n");

        let mut out = Vec::new();
        handle_list("ada@example.com".into(), "secret1".into(), true, &backend, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim(), "[]");
    }

    #[test]
    fn list_with_wrong_password_fails() {
        let backend = backend();
        handle_sign_up("ada@example.com".into(), "secret1".into(), &backend, &mut Vec::new()).unwrap();
        let err = handle_list("ada@example.com".into(), "nope".into(), false, &backend, &mut Vec::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "timeguru", "list", "--email", "a@b.c", "--password", "pw", "--json", "--dev",
        ]);
        assert!(cli.dev);
        assert!(matches!(cli.command, Some(Commands::List { json: true, .. })));

        let cli = Cli::parse_from(["timeguru"]);
        assert!(cli.command.is_none());
    }
}
