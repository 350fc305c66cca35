//! Lock files that keep concurrent runs off the same output.

mod file_lock;

pub use file_lock::{FileLock, LockInfo, cleanup_all_locks, register_lock, unregister_lock};
