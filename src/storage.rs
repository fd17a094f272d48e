// Manages the on-disk copy of the store.
//
// ⚠️ VERSION BUMP REQUIRED:
// Changes to AppState or the records it holds (Todo, CalendarEvent, Note)
// require incrementing STATE_FILE_VERSION below and adding a migration step.
use crate::context::AppContext;
use crate::store::{AppState, Persist};
use anyhow::{Context, Result, anyhow};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// Version history:
// - v0: layout written by the first desktop build ({"state": {...}, "version": 0})
// - v1: same fields, written by this crate
const STATE_FILE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    version: u32,
    state: AppState,
}

#[derive(Deserialize)]
struct VersionProbe {
    #[serde(default)]
    version: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    /// Never attempted to load
    Uninitialized,
    Success,
    /// Last load failed (corruption, newer version, ...)
    Failed,
}

/// JSON state file guarded by a sidecar lock file.
///
/// # Data Loss Prevention
/// After a failed `load()`, `save()` refuses to overwrite the file: the
/// in-memory state is then most likely empty and would wipe the user's data.
/// `force_save()` skips the check.
#[derive(Debug)]
pub struct LocalStorage {
    path: PathBuf,
    load_state: Mutex<LoadState>,
}

impl LocalStorage {
    pub fn new(ctx: &dyn AppContext) -> Result<Self> {
        Ok(Self::at_path(ctx.get_state_path()?))
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            load_state: Mutex::new(LoadState::Uninitialized),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_state(&self) -> LoadState {
        *self.load_state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_load_state(&self, state: LoadState) {
        *self.load_state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    pub fn can_save(&self) -> bool {
        self.load_state() != LoadState::Failed
    }

    /// Helper to get a sidecar lock file path
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

    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file {}", lock_path.display()))?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Reads the state file, migrating older layouts in place.
    /// `Ok(None)` means there is no file yet.
    ///
    /// Never swallow the error from this function: a failed load blocks
    /// later saves, and callers must not fall back to an empty state
    /// silently.
    pub fn load(&self) -> Result<Option<AppState>> {
        if !self.path.exists() {
            self.set_load_state(LoadState::Success);
            return Ok(None);
        }

        let result = Self::with_lock(&self.path, || {
            let json = fs::read_to_string(&self.path)
                .with_context(|| format!("Failed to read {}", self.path.display()))?;
            let probe: VersionProbe = serde_json::from_str(&json)
                .with_context(|| format!("Corrupt state file {}", self.path.display()))?;

            if probe.version == STATE_FILE_VERSION {
                let data: StateFile = serde_json::from_str(&json)
                    .with_context(|| format!("Corrupt state file {}", self.path.display()))?;
                return Ok(data.state);
            }

            let state = Self::migrate_to_current(probe.version, &json)?;
            let upgraded = StateFile {
                version: STATE_FILE_VERSION,
                state: state.clone(),
            };
            Self::atomic_write(&self.path, serde_json::to_string_pretty(&upgraded)?)?;
            Ok(state)
        });

        match &result {
            Ok(state) => {
                log::info!(
                    "Loaded {} todos, {} events, {} notes from {}",
                    state.todos.len(),
                    state.events.len(),
                    state.notes.len(),
                    self.path.display()
                );
                self.set_load_state(LoadState::Success);
            }
            Err(e) => {
                log::error!("Failed to load {}: {:#}", self.path.display(), e);
                self.set_load_state(LoadState::Failed);
            }
        }
        result.map(Some)
    }

    /// Run migrations to upgrade from old version to current version
    fn migrate_to_current(old_version: u32, json: &str) -> Result<AppState> {
        if old_version > STATE_FILE_VERSION {
            return Err(anyhow!(
                "State file version {} is newer than supported version {}. Please upgrade glassflow.",
                old_version,
                STATE_FILE_VERSION
            ));
        }
        log::info!(
            "Migrating state file from v{} to v{}",
            old_version,
            STATE_FILE_VERSION
        );

        let state = match old_version {
            0 => {
                let data: StateFile = serde_json::from_str(json)
                    .map_err(|e| anyhow!("Failed to migrate v0 state: {}", e))?;
                data.state
            }
            _ => return Err(anyhow!("Unknown state file version: {}", old_version)),
        };

        // if old_version < 2 { state = migrate_v1_to_v2(state)?; }
        Ok(state)
    }

    fn write(&self, state: &AppState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::with_lock(&self.path, || {
            let data = StateFileRef {
                version: STATE_FILE_VERSION,
                state,
            };
            let json = serde_json::to_string_pretty(&data)?;
            Self::atomic_write(&self.path, json)?;
            Ok(())
        })
    }

    pub fn save(&self, state: &AppState) -> Result<()> {
        if !self.can_save() {
            return Err(anyhow!(
                "Cannot save {}: previous load failed. This prevents overwriting data that couldn't be read.",
                self.path.display()
            ));
        }
        self.write(state)
    }

    /// Bypasses the failed-load check. Only for deliberate recovery.
    pub fn force_save(&self, state: &AppState) -> Result<()> {
        self.write(state)?;
        self.set_load_state(LoadState::Success);
        Ok(())
    }
}

#[derive(Serialize)]
struct StateFileRef<'a> {
    version: u32,
    state: &'a AppState,
}

impl Persist for LocalStorage {
    fn save(&self, state: &AppState) -> Result<()> {
        LocalStorage::save(self, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;

    #[test]
    fn test_lock_path_appends_extension() {
        assert_eq!(
            LocalStorage::get_lock_path(Path::new("/tmp/glassflow.json")),
            PathBuf::from("/tmp/glassflow.json.lock")
        );
        assert_eq!(
            LocalStorage::get_lock_path(Path::new("/tmp/state")),
            PathBuf::from("/tmp/state.lock")
        );
    }

    #[test]
    fn test_missing_file_is_none() {
        let ctx = TestContext::new();
        let storage = LocalStorage::new(&ctx).unwrap();
        assert!(storage.load().unwrap().is_none());
        assert!(storage.can_save());
    }

    #[test]
    fn test_newer_version_blocks_save() {
        let ctx = TestContext::new();
        let storage = LocalStorage::new(&ctx).unwrap();
        fs::write(storage.path(), r#"{"version": 99, "state": {}}"#).unwrap();
        assert!(storage.load().is_err());
        assert!(storage.save(&AppState::default()).is_err());
        storage.force_save(&AppState::default()).unwrap();
        assert!(storage.load().unwrap().is_some());
    }
}
