//! Process supervision for the scheduler daemon.
//!
//! The supervisor guarantees exactly one scheduler process: it stops any
//! instance it can find, spawns a fresh one detached from the calling
//! session with both output streams bound to the durable log before the
//! child runs a single instruction, and watches briefly for an immediate
//! crash so obvious startup failures land in the log instead of dying
//! silently.

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use crate::config;
use crate::constants::{
    CRASH_GRACE_PERIOD, DEV_ENV_MARKER, SCHEDULER_ARG, STOP_WAIT_INTERVAL_MS, STOP_WAIT_TIMEOUT_MS,
};
use crate::error::SpawnError;
use crate::io::{lock, proc};
use crate::logger::Logger;

/// A spawned scheduler process, held only long enough to observe the
/// immediate-crash window.
pub struct SupervisedProcess {
    pub pid: u32,
    child: Child,
}

impl SupervisedProcess {
    /// Wrap an externally spawned child for observation.
    #[cfg(any(test, feature = "testing-support"))]
    pub fn adopt(child: Child) -> Self {
        Self {
            pid: child.id(),
            child,
        }
    }
}

/// Outcome of the immediate-crash check after a spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnOutcome {
    /// Still running after the grace period. Heuristic only: a process that
    /// dies later is not caught by this check.
    Healthy,
    /// Exited within the grace period with the given code.
    CrashedImmediately(i32),
}

/// Session detachment, kept behind a seam since the primitives are
/// platform-specific.
pub trait SessionSetup {
    /// Arrange for the child to start in its own session so signals aimed
    /// at the parent's process group never reach it.
    fn detach(&self, cmd: &mut Command);
}

/// Unix implementation: `setsid()` in the child between fork and exec.
pub struct UnixSessionSetup;

#[cfg(unix)]
impl SessionSetup for UnixSessionSetup {
    fn detach(&self, cmd: &mut Command) {
        use std::os::unix::process::CommandExt;

        unsafe {
            cmd.pre_exec(|| {
                nix::unistd::setsid()
                    .map(|_| ())
                    .map_err(std::io::Error::from)
            });
        }
    }
}

/// External control plane for the scheduler process.
pub struct Supervisor<'a> {
    logger: &'a Logger,
    session: &'a dyn SessionSetup,
}

impl<'a> Supervisor<'a> {
    pub fn new(logger: &'a Logger) -> Self {
        static UNIX: UnixSessionSetup = UnixSessionSetup;
        Self {
            logger,
            session: &UNIX,
        }
    }

    /// Stop any running scheduler, best-effort.
    ///
    /// The lock file PID is authoritative when present; the process table is
    /// the fallback for instances started before the lock existed or whose
    /// lock was removed. Stopping a process that is already gone is not an
    /// error, so every failure here is logged and swallowed.
    pub fn ensure_stopped(&self) {
        let mut pids = proc::scheduler_pids();
        if let Some(pid) = lock::read_owner_pid()
            && !pids.contains(&pid)
        {
            pids.push(pid);
        }

        if pids.is_empty() {
            self.logger.debug("No running scheduler found");
            return;
        }

        for pid in pids {
            self.logger
                .decorated(format!("Stopping scheduler (PID: {pid})..."));

            if let Err(e) = terminate(pid) {
                self.logger
                    .warning(format!("Failed to signal PID {pid}: {e}"));
                continue;
            }

            if !wait_for_exit(pid) {
                self.logger
                    .warning(format!("PID {pid} did not exit within timeout"));
            }
        }
    }

    /// Spawn a detached scheduler process with its output bound to the log.
    ///
    /// The log file descriptors are handed to the kernel before exec, so the
    /// very first byte the child writes — including dynamic-linker and
    /// panic output — lands in the log.
    pub fn spawn(&self) -> Result<SupervisedProcess, SpawnError> {
        let exe = locate_executable()?;
        let log = open_log()?;

        // Parent-side marker so spawn attempts are visible in the log even
        // when the child never produces output.
        write_spawn_marker(&log);

        let stdout = log.try_clone()?;

        let mut cmd = Command::new(&exe);
        cmd.arg(SCHEDULER_ARG)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(log));
        if self.logger.debug_enabled() {
            cmd.arg("--debug");
        }
        self.session.detach(&mut cmd);

        let child = cmd.spawn()?;
        let pid = child.id();

        self.logger
            .decorated(format!("Spawned scheduler (PID: {pid}) from {}", exe.display()));

        Ok(SupervisedProcess { pid, child })
    }

    /// Poll the child's exit status once after a short fixed grace period.
    pub fn observe_immediate_exit(&self, proc: &mut SupervisedProcess) -> SpawnOutcome {
        std::thread::sleep(CRASH_GRACE_PERIOD);

        match proc.child.try_wait() {
            Ok(Some(status)) => {
                let code = status.code().unwrap_or(-1);
                self.logger.pipe();
                self.logger.error(format!(
                    "Scheduler (PID: {}) exited immediately with code {code}",
                    proc.pid
                ));
                self.logger
                    .indented("Check the scheduler log for startup errors");
                SpawnOutcome::CrashedImmediately(code)
            }
            Ok(None) => {
                self.logger
                    .decorated(format!("Scheduler running (PID: {})", proc.pid));
                SpawnOutcome::Healthy
            }
            Err(e) => {
                // Can't tell; assume alive rather than report a phantom crash.
                self.logger
                    .warning(format!("Could not poll scheduler status: {e}"));
                SpawnOutcome::Healthy
            }
        }
    }

    /// Stop-then-start sequence. Safe to call when nothing is running; a
    /// failed spawn is surfaced, not retried, since retrying a broken spawn
    /// risks a crash loop.
    pub fn restart(&self) -> Result<SpawnOutcome, SpawnError> {
        self.ensure_stopped();
        let mut proc = self.spawn()?;
        Ok(self.observe_immediate_exit(&mut proc))
    }
}

/// Send SIGTERM to a process.
fn terminate(pid: u32) -> anyhow::Result<()> {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    kill(Pid::from_raw(pid as i32), Signal::SIGTERM)
        .map_err(|e| anyhow::anyhow!("failed to send SIGTERM: {e}"))
}

/// Wait for a terminated process to leave the process table, bounded.
fn wait_for_exit(pid: u32) -> bool {
    let attempts = STOP_WAIT_TIMEOUT_MS / STOP_WAIT_INTERVAL_MS;

    for _ in 0..attempts {
        if !proc::is_pid_alive(pid) {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(STOP_WAIT_INTERVAL_MS));
    }

    !proc::is_pid_alive(pid)
}

/// Locate the scheduler executable.
///
/// With the development marker set, the currently running executable wins so
/// an editable checkout supervises its own build; otherwise an installed
/// binary on `PATH` is preferred, with the current executable as fallback.
fn locate_executable() -> Result<PathBuf, SpawnError> {
    if std::env::var_os(DEV_ENV_MARKER).is_some() {
        return std::env::current_exe().map_err(SpawnError::Io);
    }

    if let Some(installed) = proc::find_in_path(env!("CARGO_PKG_NAME")) {
        return Ok(installed);
    }

    std::env::current_exe().map_err(|_| SpawnError::ExecutableNotFound)
}

/// Open the scheduler log for appending, creating it (and the data
/// directory) on first use.
fn open_log() -> Result<File, SpawnError> {
    let path = config::scheduler_log_path().map_err(std::io::Error::other)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    Ok(OpenOptions::new().create(true).append(true).open(&path)?)
}

/// Append a spawn-attempt marker to the log. Best-effort diagnostics only;
/// failures are swallowed so they cannot mask the spawn itself.
fn write_spawn_marker(log: &File) {
    let mut log = log;
    let _ = writeln!(
        log,
        "=== spawn attempt at {} (parent pid {})",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        std::process::id()
    );
    let _ = log.flush();
}
