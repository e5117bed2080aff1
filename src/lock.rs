//! Cross-process lock over a working directory.
//!
//! The lock is a zero-byte marker file, `resource-builder.lock`, created
//! with exclusive-create semantics. Its existence is the whole lock state;
//! no holder PID or timestamp is recorded. Cooperating invocations poll for
//! the marker to disappear, so a process that ignores the convention can
//! still corrupt concurrent output.

use crate::error::BuildError;
use colored::*;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

pub const LOCK_FILE: &str = "resource-builder.lock";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct WorkDirLock {
    marker: PathBuf,
    poll_interval: Duration,
}

/// Outcome of waiting for the lock.
#[derive(Debug)]
pub enum Acquire {
    /// We own the marker and must do the work.
    Acquired(LockGuard),
    /// The marker vanished while we waited: another instance produced the
    /// output, nothing is left to do.
    ReleasedByOther,
}

/// Ownership of the marker file. Dropping the guard deletes the marker, so
/// the lock is released on error paths too.
#[derive(Debug)]
pub struct LockGuard {
    marker: PathBuf,
    released: bool,
}

impl WorkDirLock {
    pub fn new(work_dir: &Path) -> Self {
        Self {
            marker: work_dir.join(LOCK_FILE),
            poll_interval: POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn marker(&self) -> &Path {
        &self.marker
    }

    pub fn is_locked(&self) -> bool {
        self.marker.is_file()
    }

    /// Single exclusive-create attempt. `Ok(None)` means the marker exists.
    pub fn try_acquire(&self) -> io::Result<Option<LockGuard>> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.marker)
        {
            Ok(_) => Ok(Some(LockGuard {
                marker: self.marker.clone(),
                released: false,
            })),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Acquire the lock, or wait up to `timeout` for the current holder to
    /// finish.
    pub fn wait_acquire(&self, timeout: Duration) -> Result<Acquire, BuildError> {
        if let Some(guard) = self.try_acquire()? {
            return Ok(Acquire::Acquired(guard));
        }

        println!(
            "{} Waiting up to {:.2} seconds for another instance to finish...",
            "⏳".yellow(),
            timeout.as_secs_f64()
        );

        let start = Instant::now();
        while self.is_locked() && start.elapsed() < timeout {
            thread::sleep(self.poll_interval);
        }

        if self.is_locked() {
            Err(BuildError::LockTimeout {
                marker: self.marker.clone(),
                timeout,
            })
        } else {
            Ok(Acquire::ReleasedByOther)
        }
    }

    /// Remove a stale marker left behind by a crashed instance.
    /// Returns `false` if there was nothing to remove.
    pub fn force_unlock(&self) -> io::Result<bool> {
        match fs::remove_file(&self.marker) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl LockGuard {
    pub fn marker(&self) -> &Path {
        &self.marker
    }

    pub fn release(mut self) -> io::Result<()> {
        self.released = true;
        remove_marker(&self.marker)
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released {
            let _ = remove_marker(&self.marker);
        }
    }
}

fn remove_marker(marker: &Path) -> io::Result<()> {
    match fs::remove_file(marker) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
