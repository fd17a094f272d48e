// File: ./src/context.rs
/*! Where the application keeps its files.

`AppContext` answers every "which path?" question. `StandardContext` follows
the platform conventions through `directories::ProjectDirs` (or a `--root`
override); `TestContext` lives in a throwaway temp directory.

Nothing here reads environment variables or global state: code that touches
the filesystem receives a `&dyn AppContext`.
*/

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::path::PathBuf;

pub trait AppContext: Send + Sync + std::fmt::Debug {
    fn get_data_dir(&self) -> Result<PathBuf>;
    fn get_config_dir(&self) -> Result<PathBuf>;

    fn get_config_file_path(&self) -> Result<PathBuf> {
        Ok(self.get_config_dir()?.join("config.toml"))
    }

    /// Persisted store snapshot.
    fn get_state_path(&self) -> Result<PathBuf> {
        Ok(self.get_data_dir()?.join("glassflow.json"))
    }

    fn get_log_path(&self) -> Result<PathBuf> {
        Ok(self.get_data_dir()?.join("glassflow.log"))
    }

    /// Default destination for exports. Created on demand.
    fn get_backup_dir(&self) -> Result<PathBuf> {
        let dir = self.get_data_dir()?.join("backups");
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {:?}", dir))?;
        Ok(dir)
    }
}

// --- Production Implementation ---

#[derive(Clone, Debug)]
pub struct StandardContext {
    override_root: Option<PathBuf>,
}

impl StandardContext {
    /// With `Some(root)`, everything goes under `root/data` and `root/config`.
    pub fn new(override_root: Option<PathBuf>) -> Self {
        Self { override_root }
    }

    fn ensure_exists(path: PathBuf) -> Result<PathBuf> {
        if !path.exists() {
            std::fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(path)
    }

    fn get_proj_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "glassflow", "glassflow").ok_or_else(|| anyhow!("No home directory"))
    }
}

impl AppContext for StandardContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        if let Some(root) = &self.override_root {
            return Self::ensure_exists(root.join("data"));
        }
        Self::ensure_exists(Self::get_proj_dirs()?.data_dir().to_path_buf())
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        if let Some(root) = &self.override_root {
            return Self::ensure_exists(root.join("config"));
        }
        Self::ensure_exists(Self::get_proj_dirs()?.config_dir().to_path_buf())
    }
}

// --- Test Implementation ---

#[derive(Clone, Debug)]
pub struct TestContext {
    pub root: PathBuf,
}

impl TestContext {
    /// Unique temp directory, removed again on drop.
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("glassflow_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&root).expect("failed to create TestContext temp dir");
        Self { root }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext for TestContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        let p = self.root.join("data");
        std::fs::create_dir_all(&p)?;
        Ok(p)
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        let p = self.root.join("config");
        std::fs::create_dir_all(&p)?;
        Ok(p)
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}
