//! Process-table and executable discovery helpers.
//!
//! Discovery works by matching the invocation signature (binary name plus
//! the `scheduler` argument) against `/proc`. There is no authoritative PID
//! registry beyond the lock file, so this is best-effort by design: it can
//! race with unrelated, similarly named processes, which is acceptable for a
//! find-and-stop control plane.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::constants::SCHEDULER_ARG;

/// Binary name matched against process-table entries.
const BINARY_NAME: &str = env!("CARGO_PKG_NAME");

/// Check if a process with the given PID is still running.
pub fn is_pid_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

/// Does this command line belong to a scheduler process?
///
/// Matches when the first argument's file name is the autothemer binary and
/// any later argument is the scheduler marker.
pub fn is_scheduler_cmdline(args: &[&str]) -> bool {
    let Some(program) = args.first() else {
        return false;
    };

    let name = Path::new(program)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    name == BINARY_NAME && args[1..].contains(&SCHEDULER_ARG)
}

/// PIDs of all scheduler processes visible in the process table, excluding
/// the calling process.
pub fn scheduler_pids() -> Vec<u32> {
    let own_pid = std::process::id();
    let mut pids = Vec::new();

    let Ok(entries) = std::fs::read_dir("/proc") else {
        return pids;
    };

    for entry in entries.flatten() {
        let Ok(pid) = entry.file_name().to_string_lossy().parse::<u32>() else {
            continue;
        };
        if pid == own_pid {
            continue;
        }

        // Processes may exit mid-scan; unreadable entries are just skipped.
        let Ok(raw) = std::fs::read(entry.path().join("cmdline")) else {
            continue;
        };

        let cmdline = String::from_utf8_lossy(&raw);
        let args: Vec<&str> = cmdline.split('\0').filter(|a| !a.is_empty()).collect();

        if is_scheduler_cmdline(&args) {
            pids.push(pid);
        }
    }

    pids
}

/// Look up an executable by name on `PATH`.
pub fn find_in_path(program: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;

    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(program);
        if is_executable(&candidate) {
            return Some(candidate);
        }
    }

    None
}

fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
