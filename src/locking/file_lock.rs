//! Output lock files.
//!
//! A lock sits next to the output it guards (`trimmed-talk.mp4` is guarded
//! by `trimmed-talk.mp4.quietcut.lock`), so two processes sharing an output
//! directory never render the same file at once.

use crate::constants::LOCK_FILE_EXTENSION;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};

/// What a lock file records about its holder.
#[derive(Debug, Serialize, Deserialize)]
pub struct LockInfo {
    /// Holder's process id.
    pub pid: u32,
    /// Holder's host, so stale locks on shared storage can be traced.
    pub hostname: String,
    /// When the lock was taken.
    pub started: DateTime<Utc>,
    /// Source video being trimmed.
    pub input: PathBuf,
    /// Output being written.
    pub output: PathBuf,
}

impl LockInfo {
    fn for_this_process(input: &Path, output: &Path) -> Self {
        let hostname = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| String::from("unknown"));
        Self {
            pid: std::process::id(),
            hostname,
            started: Utc::now(),
            input: input.to_path_buf(),
            output: output.to_path_buf(),
        }
    }
}

/// Held lock on an output path; released on drop.
#[derive(Debug)]
pub struct FileLock {
    lock_path: PathBuf,
}

impl FileLock {
    /// Lock `output` for a render of `input`.
    ///
    /// Fails with [`Error::FileLocked`] when another run already holds it.
    pub fn acquire(input: &Path, output: &Path) -> Result<Self> {
        let lock_path = Self::lock_path_for(output);

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(Error::FileLocked { path: lock_path });
            }
            Err(source) => {
                return Err(Error::LockCreate {
                    path: lock_path,
                    source,
                });
            }
        };

        // contents are informational; the file's existence is the lock
        if let Ok(json) =
            serde_json::to_string_pretty(&LockInfo::for_this_process(input, output))
        {
            let _ = file.write_all(json.as_bytes());
        }

        register_lock(&lock_path);
        Ok(Self { lock_path })
    }

    /// `<output file name>.quietcut.lock` next to `output`.
    pub fn lock_path_for(output: &Path) -> PathBuf {
        let mut name: OsString = output
            .file_name()
            .map_or_else(|| "unknown".into(), ToOwned::to_owned);
        name.push(LOCK_FILE_EXTENSION);
        output.with_file_name(name)
    }

    /// Whether some run currently holds the lock for `output`.
    pub fn is_locked(output: &Path) -> bool {
        Self::lock_path_for(output).exists()
    }

    /// Path of the held lock file.
    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
        unregister_lock(&self.lock_path);
    }
}

/// Locks held by this process, removed by the interrupt handler on a forced exit.
static HELD_LOCKS: LazyLock<Mutex<Vec<PathBuf>>> = LazyLock::new(Mutex::default);

/// Track a lock so a forced exit can still remove it.
pub fn register_lock(path: &Path) {
    if let Ok(mut held) = HELD_LOCKS.lock() {
        held.push(path.to_path_buf());
    }
}

/// Stop tracking a lock that was released normally.
pub fn unregister_lock(path: &Path) {
    if let Ok(mut held) = HELD_LOCKS.lock() {
        held.retain(|p| p != path);
    }
}

/// Remove every tracked lock file.
pub fn cleanup_all_locks() {
    if let Ok(held) = HELD_LOCKS.lock() {
        held.iter().for_each(|path| {
            let _ = fs::remove_file(path);
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_lock_records_holder_and_releases() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("talk.mp4");
        let output = temp_dir.path().join("trimmed-talk.mp4");

        let lock = FileLock::acquire(&input, &output).unwrap();
        assert!(FileLock::is_locked(&output));

        let info: LockInfo =
            serde_json::from_str(&fs::read_to_string(lock.path()).unwrap()).unwrap();
        assert_eq!(info.pid, std::process::id());
        assert_eq!(info.output, output);

        drop(lock);
        assert!(!FileLock::is_locked(&output));
    }

    #[test]
    fn test_second_acquire_reports_locked() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("talk.mp4");
        let output = temp_dir.path().join("trimmed-talk.mp4");

        let _lock1 = FileLock::acquire(&input, &output).unwrap();
        let lock2 = FileLock::acquire(&input, &output);
        assert!(matches!(lock2, Err(Error::FileLocked { .. })));
    }

    #[test]
    fn test_lock_path_format() {
        let path = FileLock::lock_path_for(Path::new("/out/trimmed-talk.mp4"));
        assert_eq!(
            path.to_string_lossy(),
            "/out/trimmed-talk.mp4.quietcut.lock"
        );
    }

    #[test]
    fn test_cleanup_all_locks_removes_registered_files() {
        let temp_dir = TempDir::new().unwrap();
        let lock_path = temp_dir.path().join("trimmed-a.mp4.quietcut.lock");

        File::create(&lock_path).unwrap();
        register_lock(&lock_path);
        cleanup_all_locks();

        assert!(!lock_path.exists());
        unregister_lock(&lock_path);
    }
}
