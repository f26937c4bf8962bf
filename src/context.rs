// File: ./src/context.rs
//! Where the crate keeps its files.
//!
//! Everything that touches the filesystem takes a `&dyn AppContext` (or a
//! `SharedContext`); nothing reads paths from globals.

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

fn ensure_dir(dir: PathBuf) -> Result<PathBuf> {
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {:?}", dir))?;
    Ok(dir)
}

pub trait AppContext: Send + Sync + std::fmt::Debug {
    fn get_data_dir(&self) -> Result<PathBuf>;
    fn get_config_dir(&self) -> Result<PathBuf>;

    fn get_log_dir(&self) -> Result<PathBuf> {
        ensure_dir(self.get_data_dir()?.join("logs"))
    }

    fn get_config_file_path(&self) -> Result<PathBuf> {
        Ok(self.get_config_dir()?.join("config.toml"))
    }

    /// Snapshot file holding every record of `collection`.
    fn get_collection_path(&self, collection: &str) -> Result<PathBuf> {
        Ok(self
            .get_data_dir()?
            .join("collections")
            .join(format!("{collection}.json")))
    }

    /// Reminder specifications of one user.
    fn get_reminders_path(&self, user: &str) -> Result<PathBuf> {
        Ok(self
            .get_data_dir()?
            .join("users")
            .join(user)
            .join("medicines.json"))
    }
}

/// Fixed data and config directories, created on first use.
#[derive(Clone, Debug)]
pub struct StandardContext {
    data_dir: PathBuf,
    config_dir: PathBuf,
}

impl StandardContext {
    /// Platform directories for `pantry`.
    pub fn new() -> Result<Self> {
        let proj = ProjectDirs::from("com", "pantry", "pantry")
            .ok_or_else(|| anyhow!("No home directory"))?;
        Ok(Self {
            data_dir: proj.data_dir().to_path_buf(),
            config_dir: proj.config_dir().to_path_buf(),
        })
    }

    /// `root/data` and `root/config`.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            data_dir: root.join("data"),
            config_dir: root.join("config"),
        }
    }
}

impl AppContext for StandardContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        ensure_dir(self.data_dir.clone())
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        ensure_dir(self.config_dir.clone())
    }
}

/// A `StandardContext` under a fresh temp directory, deleted on drop.
#[derive(Debug)]
pub struct TestContext {
    pub root: PathBuf,
    inner: StandardContext,
}

impl TestContext {
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("pantry_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&root).expect("failed to create TestContext temp dir");
        let inner = StandardContext::rooted_at(&root);
        Self { root, inner }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext for TestContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        self.inner.get_data_dir()
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        self.inner.get_config_dir()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

pub type SharedContext = std::sync::Arc<dyn AppContext>;
