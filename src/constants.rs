//! Shared constants used across the application.

use std::time::Duration;

/// Interval between wall-clock checks while a job is pending.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;

/// How long to wait after spawning the scheduler before polling its exit
/// status once. Catches obvious startup failures (bad path, missing
/// dependency); a process that dies later is outside this window.
pub const CRASH_GRACE_PERIOD: Duration = Duration::from_millis(300);

/// Total time to wait for a terminated scheduler process to exit.
pub const STOP_WAIT_TIMEOUT_MS: u64 = 3000;

/// Polling interval while waiting for a terminated process to exit.
pub const STOP_WAIT_INTERVAL_MS: u64 = 100;

/// Default zero-argument command invoked at each transition.
pub const DEFAULT_APPLY_COMMAND: &str = "autothemer-apply";

/// Argument that marks a process as the scheduler daemon. Used both when
/// spawning and when matching entries in the process table.
pub const SCHEDULER_ARG: &str = "scheduler";

/// Environment marker set when running from an editable checkout; makes the
/// supervisor prefer the currently running executable over an installed one.
pub const DEV_ENV_MARKER: &str = "AUTOTHEMER_DEV";

/// File name of the persisted sunrise/sunset record.
pub const SUN_TIMES_FILE: &str = "sun_times";

/// File name of the scheduler log.
pub const SCHEDULER_LOG_FILE: &str = "scheduler.log";

/// Exit code for fatal startup failures.
pub const EXIT_FAILURE: i32 = 1;
