//! Interactive and scripted shell over a [`LedgerStore`](crate::ledger::LedgerStore).

pub mod commands;
mod core;
pub mod output;
mod shell;

pub use self::core::{CliError, CliMode, CommandError, CommandResult, ShellContext};
pub use shell::run_cli;
