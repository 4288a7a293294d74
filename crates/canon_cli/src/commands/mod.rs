pub mod paths;
pub mod relock;
pub mod validate;

use std::path::{Path, PathBuf};

use canon_lock::{FileLockStore, TamperPolicy};

pub(crate) const DEFAULT_LOCKFILE: &str = "canon.lock";

pub(crate) fn resolve_root(root: Option<PathBuf>) -> PathBuf {
    root.unwrap_or_else(|| PathBuf::from("."))
}

pub(crate) fn lock_store(root: &Path, lockfile: Option<PathBuf>) -> FileLockStore {
    FileLockStore::new(lockfile.unwrap_or_else(|| root.join(DEFAULT_LOCKFILE)))
}

/// `--allow-tamper` wins; otherwise the environment override applies.
pub(crate) fn tamper_policy(allow_tamper_flag: bool) -> TamperPolicy {
    if allow_tamper_flag {
        TamperPolicy::AllowDrift
    } else {
        TamperPolicy::from_env()
    }
}
