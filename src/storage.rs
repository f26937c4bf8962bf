// Local JSON snapshots standing in for the remote document store.
//
// ⚠️ VERSION BUMP REQUIRED:
// Changes to SourceRecord or ReminderSpec serialization require incrementing
// SNAPSHOT_VERSION below so stale files are rejected instead of misread.
use crate::context::SharedContext;
use crate::model::{ReminderSpec, SourceRecord};
use crate::source::{RecordSource, RecordUpdate};
use anyhow::{Context, Result, bail};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// Version history:
// - v1: records as {id, fields}, reminder specs as {name, times, dosage?, frequency?}
const SNAPSHOT_VERSION: u32 = 1;

/// Wrapper struct for versioned snapshot files
#[derive(Deserialize)]
struct Snapshot<T> {
    #[serde(default)]
    version: u32,
    items: Vec<T>,
}

#[derive(Serialize)]
struct SnapshotRef<'a, T> {
    version: u32,
    items: &'a [T],
}

pub struct LocalStorage;

impl LocalStorage {
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    /// Runs `f` while holding an exclusive lock on a sidecar `.lock` file.
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()?;
        let result = f();
        FileExt::unlock(&file)?;
        result
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Reads a snapshot file. A missing file is an empty snapshot.
    fn read_items<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(vec![]);
        }
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot '{}'", path.display()))?;
        let data: Snapshot<T> = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse snapshot '{}'", path.display()))?;
        if data.version != SNAPSHOT_VERSION {
            bail!(
                "Snapshot '{}' has version {}, expected {}",
                path.display(),
                data.version,
                SNAPSHOT_VERSION
            );
        }
        Ok(data.items)
    }

    fn write_items<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
        let data = SnapshotRef {
            version: SNAPSHOT_VERSION,
            items,
        };
        let json = serde_json::to_string_pretty(&data)?;
        Self::atomic_write(path, json)
    }

    pub fn load<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        Self::with_lock(path, || Self::read_items(path))
    }

    pub fn save<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
        Self::with_lock(path, || Self::write_items(path, items))
    }

    /// Lock, load, modify, save, unlock.
    pub fn modify<T, F>(path: &Path, f: F) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> Result<()>,
    {
        Self::with_lock(path, || {
            let mut items = Self::read_items(path)?;
            f(&mut items)?;
            Self::write_items(path, &items)
        })
    }
}

/// `RecordSource` backed by snapshot files under the context's data directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    ctx: SharedContext,
}

impl LocalStore {
    pub fn new(ctx: SharedContext) -> Self {
        Self { ctx }
    }

    /// Replaces the whole collection snapshot.
    pub fn save_collection(&self, collection: &str, records: &[SourceRecord]) -> Result<()> {
        let path = self.ctx.get_collection_path(collection)?;
        LocalStorage::save(&path, records)
    }

    pub fn save_reminders(&self, user: &str, specs: &[ReminderSpec]) -> Result<()> {
        let path = self.ctx.get_reminders_path(user)?;
        LocalStorage::save(&path, specs)
    }
}

impl RecordSource for LocalStore {
    fn fetch_all_records(&self, collection: &str) -> Result<Vec<SourceRecord>> {
        let path = self.ctx.get_collection_path(collection)?;
        LocalStorage::load(&path)
    }

    fn fetch_reminder_specs(&self, user: &str) -> Result<Vec<ReminderSpec>> {
        let path = self.ctx.get_reminders_path(user)?;
        LocalStorage::load(&path)
    }

    fn update_record(&mut self, collection: &str, id: &str, update: &RecordUpdate) -> Result<()> {
        let path = self.ctx.get_collection_path(collection)?;
        LocalStorage::modify(&path, |records: &mut Vec<SourceRecord>| {
            let Some(record) = records.iter_mut().find(|r| r.id == id) else {
                bail!("Record '{}' not found in '{}'", id, collection);
            };
            update.apply_to(&mut record.fields);
            Ok(())
        })
    }

    fn add_reminder_spec(&mut self, user: &str, spec: ReminderSpec) -> Result<()> {
        let path = self.ctx.get_reminders_path(user)?;
        LocalStorage::modify(&path, |specs: &mut Vec<ReminderSpec>| {
            specs.push(spec);
            Ok(())
        })
    }
}
