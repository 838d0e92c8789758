//! Registry of users whose session tokens are currently live.
//!
//! Presence in the registry is required for any token of that user to
//! validate, whatever the token's own timestamps say. Logging out removes the
//! user and with it every outstanding token. There is no TTL: entries stay
//! until removed, and expiry is the validator's job.
//!
//! The registry is dumped to a JSON file at shutdown and reloaded at startup
//! so a restart does not force everyone to log in again. Every access to the
//! map, persistence included, goes through the same mutex.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::AppError;

#[derive(Debug, Default)]
pub struct TokenRegistry {
    active: Mutex<HashMap<i64, bool>>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry and populate it from `path`.
    ///
    /// A missing or unreadable file leaves the registry empty.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let registry = Self::new();
        registry.load_from_file(path);
        registry
    }

    pub fn add(&self, user_id: i64) {
        self.active.lock().insert(user_id, true);
    }

    /// Returns whether the user was present.
    pub fn remove(&self, user_id: i64) -> bool {
        self.active.lock().remove(&user_id).is_some()
    }

    pub fn contains(&self, user_id: i64) -> bool {
        self.active.lock().get(&user_id).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.active.lock().values().filter(|present| **present).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> HashMap<i64, bool> {
        self.active.lock().clone()
    }

    /// Replace the whole content with `entries`. Entries flagged `false` are dropped.
    pub fn restore(&self, entries: HashMap<i64, bool>) {
        let mut active = self.active.lock();
        *active = entries.into_iter().filter(|(_, present)| *present).collect();
    }

    /// Write the current snapshot to `path` as a JSON object.
    ///
    /// The file is replaced atomically (temp file + rename) while an exclusive
    /// lock is held on `<path>.lock`.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), AppError> {
        let path = path.as_ref();
        let snapshot = self.snapshot();
        let payload = serde_json::to_vec(&snapshot)
            .map_err(|e| AppError::persistence(format!("failed to encode registry: {e}")))?;

        let _guard = lock_file(path)?;

        let tmp_path = sibling(path, "tmp");
        let mut tmp = File::create(&tmp_path).map_err(|e| io_error("create", &tmp_path, e))?;
        tmp.write_all(&payload)
            .and_then(|_| tmp.sync_all())
            .map_err(|e| io_error("write", &tmp_path, e))?;
        drop(tmp);

        fs::rename(&tmp_path, path).map_err(|e| io_error("rename", path, e))?;

        info!(
            path = %path.display(),
            sessions = snapshot.len(),
            "token registry saved"
        );
        Ok(())
    }

    /// Restore the registry from `path`, returning how many users were loaded.
    ///
    /// Missing or corrupt files are not errors: everyone simply has to log in again.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> usize {
        let path = path.as_ref();

        let raw = {
            let _guard = match lock_file(path) {
                Ok(guard) => guard,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "token registry lock unavailable, starting empty");
                    return 0;
                }
            };
            match fs::read(path) {
                Ok(raw) => raw,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "no token registry file, starting empty");
                    return 0;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "token registry unreadable, starting empty");
                    return 0;
                }
            }
        };

        match serde_json::from_slice::<HashMap<i64, bool>>(&raw) {
            Ok(entries) => {
                self.restore(entries);
                let loaded = self.len();
                info!(path = %path.display(), sessions = loaded, "token registry restored");
                loaded
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "token registry corrupt, starting empty");
                0
            }
        }
    }
}

/// Exclusive advisory lock on `<path>.lock`, released when the file is dropped.
fn lock_file(path: &Path) -> Result<File, AppError> {
    let lock_path = sibling(path, "lock");
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .map_err(|e| io_error("open", &lock_path, e))?;
    file.lock_exclusive()
        .map_err(|e| io_error("lock", &lock_path, e))?;
    Ok(file)
}

fn sibling(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> AppError {
    AppError::persistence(format!("failed to {action} {}: {e}", path.display()))
}
