//! Scheduler lock file.
//!
//! The scheduler process holds an exclusive lock for its lifetime and writes
//! its PID into the file. The lock makes "at most one scheduler" a kernel
//! guarantee instead of a process-table heuristic, while the recorded PID
//! gives the supervisor an authoritative target to stop before falling back
//! to scanning `/proc`.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::io::proc::is_pid_alive;
use crate::logger::Logger;

/// Path of the scheduler lock file in the runtime directory.
pub fn lock_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(runtime_dir).join("autothemer-scheduler.lock")
}

/// Held for the lifetime of the scheduler process; releases the kernel lock
/// and removes the file on drop.
pub struct SchedulerLock {
    _file: File,
    path: PathBuf,
}

impl SchedulerLock {
    /// Try to acquire the scheduler lock at the default path.
    ///
    /// Returns `Ok(None)` when another scheduler already holds it; the PID
    /// of the holder (if readable) is logged for the caller's message.
    pub fn acquire(logger: &Logger) -> Result<Option<SchedulerLock>> {
        Self::acquire_at(&lock_path(), logger)
    }

    /// Try to acquire the scheduler lock at an explicit path.
    pub fn acquire_at(path: &Path, logger: &Logger) -> Result<Option<SchedulerLock>> {
        // Open without truncating: if the lock is held, the holder's PID
        // must survive our failed attempt.
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("failed to open lock file {}", path.display()))?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                file.set_len(0)?;
                file.seek(SeekFrom::Start(0))?;
                writeln!(&file, "{}", std::process::id())?;
                file.flush()?;

                Ok(Some(SchedulerLock {
                    _file: file,
                    path: path.to_path_buf(),
                }))
            }
            Err(_) => {
                match read_owner_pid_at(path) {
                    Some(pid) => logger.debug(format!("Lock held by PID {pid}")),
                    None => logger.debug("Lock held, owner PID unreadable"),
                }
                Ok(None)
            }
        }
    }
}

impl Drop for SchedulerLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// PID recorded in the lock file at the default path, if the owning process
/// is still alive. Stale files (dead owner) are cleaned up on the way.
pub fn read_owner_pid() -> Option<u32> {
    read_owner_pid_at(&lock_path())
}

fn read_owner_pid_at(path: &Path) -> Option<u32> {
    let contents = std::fs::read_to_string(path).ok()?;
    let pid = contents.lines().next()?.trim().parse::<u32>().ok()?;

    if is_pid_alive(pid) {
        Some(pid)
    } else {
        let _ = std::fs::remove_file(path);
        None
    }
}
