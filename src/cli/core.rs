//! Core CLI loop, dispatch, and shell context helpers.

use std::{io, path::PathBuf};

use chrono::NaiveDate;
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use tracing::debug;

use crate::{
    config::{Config, ConfigManager},
    core::{utils::app_data_dir, SequentialIdGenerator, SystemClock},
    domain::{parse_date as parse_domain_date, Month},
    errors::LedgerError,
    ledger::{Ledger, LedgerStore, StoreOptions},
    storage::JsonSnapshotStore,
};

use super::commands::{self, CommandRegistry};
use super::output;

const DEFAULT_SNAPSHOT: &str = "ledger";
const SCRIPT_ID_PREFIX: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

/// Fatal shell failures; these end the session.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

/// Per-command failures; reported and the session continues.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            other => CliError::Command(other.to_string()),
        }
    }
}

pub type CommandResult = Result<(), CommandError>;

/// Everything a command handler can reach: the ledger, its config and the snapshot directory.
pub struct ShellContext {
    mode: CliMode,
    registry: CommandRegistry,
    store: LedgerStore,
    config_manager: ConfigManager,
    config: Config,
    snapshots: JsonSnapshotStore,
    pub(crate) running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_base_dir(mode, app_data_dir())
    }

    pub fn with_base_dir(mode: CliMode, base: PathBuf) -> Result<Self, CliError> {
        let config_manager = ConfigManager::with_base_dir(base)?;
        let config = config_manager.load()?;
        let snapshots = JsonSnapshotStore::new(
            &config_manager.data_dir(&config),
            Some(config.backup_retention),
        )?;

        let store = match mode {
            CliMode::Interactive => LedgerStore::from_config(&config),
            CliMode::Script => LedgerStore::with_collaborators(
                Ledger::new(),
                StoreOptions::from(&config),
                Box::new(SequentialIdGenerator::new(SCRIPT_ID_PREFIX)),
                Box::new(SystemClock),
            ),
        };

        let mut app = ShellContext {
            mode,
            registry: CommandRegistry::new(commands::all_definitions()),
            store,
            config_manager,
            config,
            snapshots,
            running: true,
        };
        app.auto_load_last();
        Ok(app)
    }

    fn auto_load_last(&mut self) {
        if self.mode != CliMode::Interactive {
            return;
        }
        let Some(name) = self.config.last_snapshot.clone() else {
            return;
        };
        match self.store.load_from(&self.snapshots, &name) {
            Ok(warnings) => {
                for warning in &warnings {
                    output::warning(warning);
                }
                output::success(format!("Automatically loaded snapshot `{}`.", name));
            }
            Err(err) => debug!(snapshot = %name, error = %err, "auto-load skipped"),
        }
    }

    pub fn mode(&self) -> CliMode {
        self.mode
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut LedgerStore {
        &mut self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn snapshots(&self) -> &JsonSnapshotStore {
        &self.snapshots
    }

    pub(crate) fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn prompt(&self) -> String {
        format!("ledger [{}] > ", output::format_amount(self.store.balance()))
    }

    /// Snapshot name from `args`, else the last one used, else `ledger`.
    pub(crate) fn snapshot_name(&self, args: &[&str]) -> String {
        args.first()
            .map(|name| name.to_string())
            .or_else(|| self.config.last_snapshot.clone())
            .unwrap_or_else(|| DEFAULT_SNAPSHOT.to_string())
    }

    pub(crate) fn remember_snapshot(&mut self, name: &str) -> CommandResult {
        if self.config.last_snapshot.as_deref() == Some(name) {
            return Ok(());
        }
        self.config.last_snapshot = Some(name.to_string());
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(definition) = self.registry.get(command) {
            let handler = definition.handler;
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match super::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(&err);
                return Ok(LoopControl::Continue);
            }
        };

        let Some(raw) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };
        let command = raw.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();

        match self.dispatch(&command, raw, &args) {
            Ok(LoopControl::Exit) => {
                self.running = false;
                Ok(LoopControl::Exit)
            }
            other => other,
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|key| (levenshtein(key, input), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                output::info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(&message);
                output::hint("Use `help <command>` for usage details.");
            }
            other => output::error(other),
        }
    }
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    parse_domain_date(input).map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

pub(crate) fn parse_month(input: &str) -> Result<Month, CommandError> {
    input.parse::<Month>().map_err(|_| {
        CommandError::InvalidArguments(format!("invalid month `{}` (use YYYY-MM)", input))
    })
}

/// Whole currency units; `.`, `,` and `_` are accepted as digit-group separators.
pub(crate) fn parse_amount(input: &str) -> Result<i64, CommandError> {
    let digits: String = input
        .chars()
        .filter(|ch| !matches!(ch, '.' | ',' | '_'))
        .collect();
    digits
        .parse::<i64>()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid amount `{}`", input)))
}

/// `none` or `-` clears an optional field.
pub(crate) fn parse_optional(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Splits `field=value` arguments used by the edit commands.
pub(crate) fn parse_assignments<'a>(
    args: &[&'a str],
    usage: &str,
) -> Result<Vec<(String, &'a str)>, CommandError> {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments(usage.to_string()));
    }
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .map(|(field, value)| (field.trim().to_ascii_lowercase(), value))
                .ok_or_else(|| {
                    CommandError::InvalidArguments(format!(
                        "expected field=value, got `{}`; {}",
                        arg, usage
                    ))
                })
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn process_script(base: &std::path::Path, lines: &[&str]) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_base_dir(CliMode::Script, base.to_path_buf())?;
    for line in lines {
        match app.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => app.report_error(err),
        }
    }
    Ok(app)
}
