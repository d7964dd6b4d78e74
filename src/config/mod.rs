use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::core::{
    services::{BudgetSyncPolicy, SearchMode},
    utils::{app_data_dir, config_file_in, ensure_dir},
};
use crate::errors::LedgerError;

const TMP_SUFFIX: &str = "tmp";
const DEFAULT_BACKUP_RETENTION: usize = 5;

/// User preferences that shape how the ledger store behaves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default)]
    pub search_mode: SearchMode,
    #[serde(default)]
    pub budget_sync: BudgetSyncPolicy,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
    /// Optional custom root for snapshots. Defaults to the application data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_snapshot: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "vi-VN".into(),
            currency: "VND".into(),
            search_mode: SearchMode::default(),
            budget_sync: BudgetSyncPolicy::default(),
            backup_retention: Self::default_backup_retention(),
            data_dir: None,
            last_snapshot: None,
        }
    }
}

impl Config {
    pub fn default_backup_retention() -> usize {
        DEFAULT_BACKUP_RETENTION
    }
}

/// Loads and saves [`Config`] as JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
            base,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn config_path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Config, LedgerError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Snapshot root: `data_dir` from the config when set, else the manager's base directory.
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        config
            .data_dir
            .clone()
            .unwrap_or_else(|| self.base.clone())
    }
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

pub(crate) fn write_atomic(path: &Path, data: &str) -> Result<(), LedgerError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
