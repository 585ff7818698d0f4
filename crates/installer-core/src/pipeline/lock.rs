//! Exclusive per-target install lock

use crate::error::{InstallError, Result};
use std::collections::hash_map::DefaultHasher;
use std::fs::{self, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Held for the duration of an install; removes its lock file on drop
#[derive(Debug)]
pub struct InstallLock {
    path: PathBuf,
}

impl InstallLock {
    /// Lock file location for `target` inside `lock_dir`
    pub fn path_for(lock_dir: &Path, target: &Path) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        target.hash(&mut hasher);
        lock_dir.join(format!("statamic-install-{:016x}.lock", hasher.finish()))
    }

    /// Take the lock for `target`, failing if another live install holds it
    pub fn acquire(lock_dir: &Path, target: &Path) -> Result<Self> {
        let path = Self::path_for(lock_dir, target);
        fs::create_dir_all(lock_dir)?;

        match Self::create(&path) {
            Ok(lock) => Ok(lock),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if holder_is_gone(&path) {
                    tracing::debug!(lock = %path.display(), "removing stale install lock");
                    match fs::remove_file(&path) {
                        Err(e) if e.kind() != ErrorKind::NotFound => return Err(e.into()),
                        _ => {}
                    }
                    return Self::create(&path).map_err(InstallError::from);
                }
                Err(InstallError::precondition(format!(
                    "Another installation into {} is already running (lock file {}).",
                    target.display(),
                    path.display()
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn create(path: &Path) -> std::io::Result<Self> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        write!(file, "{}", std::process::id())?;
        tracing::debug!(lock = %path.display(), "install lock acquired");
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// The recorded holder no longer runs.
///
/// A lock without a readable pid was left by a holder that died before
/// writing it. A live pid is only decidable where `/proc` exists; elsewhere
/// such a lock is always respected.
fn holder_is_gone(lock: &Path) -> bool {
    let pid = fs::read_to_string(lock)
        .ok()
        .and_then(|c| c.trim().parse::<u32>().ok());
    let Some(pid) = pid else {
        return true;
    };

    let proc = Path::new("/proc");
    proc.join("self").exists() && !proc.join(pid.to_string()).exists()
}
