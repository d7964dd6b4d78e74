use chrono::{DateTime, NaiveDateTime, Utc};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::{
    config::{tmp_path, write_atomic},
    core::utils::{backups_dir_in, ensure_dir, snapshots_dir_in},
    errors::LedgerError,
    ledger::{ledger::CURRENT_SCHEMA_VERSION, Ledger},
};

use super::{Result, SnapshotStore};

const SNAPSHOT_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
const DEFAULT_RETENTION: usize = 5;

/// Filesystem-backed JSON snapshots with rolling backups of overwritten files.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    snapshots_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonSnapshotStore {
    pub fn new(root: &Path, retention: Option<usize>) -> Result<Self> {
        let snapshots_dir = snapshots_dir_in(root);
        let backups_dir = backups_dir_in(root);
        ensure_dir(&snapshots_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            snapshots_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn snapshot_path(&self, key: &str) -> PathBuf {
        self.snapshots_dir
            .join(format!("{}.{}", canonical_name(key), SNAPSHOT_EXTENSION))
    }

    fn backup_dir(&self, key: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(key))
    }

    pub fn backup_path(&self, key: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(key).join(backup_name)
    }

    /// Backup file names for `key`, newest first.
    pub fn list_backups(&self, key: &str) -> Result<Vec<String>> {
        let dir = self.backup_dir(key);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SNAPSHOT_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(name.to_string());
            }
        }
        entries.sort_by(|a, b| {
            parse_backup_timestamp(b)
                .cmp(&parse_backup_timestamp(a))
                .then_with(|| b.cmp(a))
        });
        Ok(entries)
    }

    /// Copies a backup over the live snapshot and returns the restored ledger.
    pub fn restore_backup(&self, key: &str, backup_name: &str) -> Result<Ledger> {
        let backup_path = self.backup_path(key, backup_name);
        if !backup_path.exists() {
            return Err(LedgerError::Storage(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        let target = self.snapshot_path(key);
        fs::copy(&backup_path, &target)?;
        load_ledger_from_path(&target)
    }

    fn backup_existing_file(&self, key: &str, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(key);
        ensure_dir(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let backup_name = format!("{}_{}.{}", canonical_name(key), timestamp, SNAPSHOT_EXTENSION);
        fs::copy(path, dir.join(&backup_name))?;
        self.prune_backups(key)
    }

    fn prune_backups(&self, key: &str) -> Result<()> {
        let backups = self.list_backups(key)?;
        for name in backups.iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(self.backup_path(key, name)) {
                warn!(backup = %name, error = %err, "failed to prune snapshot backup");
            }
        }
        Ok(())
    }
}

impl SnapshotStore for JsonSnapshotStore {
    fn save(&self, key: &str, ledger: &Ledger) -> Result<()> {
        let path = self.snapshot_path(key);
        self.backup_existing_file(key, &path)?;
        save_ledger_to_path(ledger, &path)?;
        debug!(key, path = %path.display(), "snapshot saved");
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Ledger> {
        let path = self.snapshot_path(key);
        if !path.exists() {
            return Err(LedgerError::Storage(format!("snapshot `{}` not found", key)));
        }
        load_ledger_from_path(&path)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.snapshots_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SNAPSHOT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.snapshot_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(ledger)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_ledger_from_path(path: &Path) -> Result<Ledger> {
    let data = fs::read_to_string(path)?;
    let ledger: Ledger = serde_json::from_str(&data)?;
    if ledger.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(LedgerError::Storage(format!(
            "snapshot `{}` uses schema v{} but only v{} is supported",
            path.display(),
            ledger.schema_version,
            CURRENT_SCHEMA_VERSION
        )));
    }
    Ok(ledger)
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '-',
        })
        .collect();
    if sanitized.trim_matches('-').is_empty() {
        "ledger".into()
    } else {
        sanitized
    }
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let trimmed = name.strip_suffix(&format!(".{}", SNAPSHOT_EXTENSION))?;
    let mut parts = trimmed.rsplit('_');
    let time_part = parts.next()?;
    let date_part = parts.next()?;
    NaiveDateTime::parse_from_str(&format!("{}_{}", date_part, time_part), BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}
