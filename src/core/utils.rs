use dirs::home_dir;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::errors::LedgerError;

const DEFAULT_DIR_NAME: &str = ".ledger_core";
const SNAPSHOT_DIR: &str = "snapshots";
const BACKUP_DIR: &str = "backups";
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides the application data directory.
pub const HOME_ENV: &str = "LEDGER_CORE_HOME";

/// Returns the application-specific data directory, defaulting to `~/.ledger_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding named ledger snapshots under `base`.
pub fn snapshots_dir_in(base: &Path) -> PathBuf {
    base.join(SNAPSHOT_DIR)
}

/// Directory holding rolling snapshot backups under `base`.
pub fn backups_dir_in(base: &Path) -> PathBuf {
    base.join(BACKUP_DIR)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

pub fn ensure_dir(path: &Path) -> Result<(), LedgerError> {
    fs::create_dir_all(path)?;
    Ok(())
}
