//! The daily scheduler: one self-cancelling job per transition, forever.
//!
//! The loop cycles through three states. `Waiting` polls the clock at a
//! coarse interval against the single pending job; `Running` invokes the
//! theme-apply action, surviving any failure; `Rearm` re-reads the persisted
//! record and arms the next job. Completion is a value the loop acts on, not
//! hidden job state, so exactly one job is pending at any time and the
//! action can never run twice for one transition.

pub mod resolver;

use chrono::{DateTime, Local, NaiveTime, TimeZone, Utc};
use std::path::PathBuf;
use std::time::Duration;

use crate::action::ThemeAction;
use crate::error::SolarTimesError;
use crate::logger::Logger;
use crate::sched::resolver::{LocalZone, next_run_at};
use crate::solar::SunTimes;
use crate::time_source::TimeSource;

/// Scheduler loop states. There is no terminal state: the process is killed
/// externally to stop it, or exits on a fatal record read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchedulerState {
    Waiting,
    Running,
    Rearm,
}

/// A single armed invocation.
///
/// The due wall-clock time is pinned to a concrete date at arm time: today
/// if the time is still ahead, otherwise tomorrow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledJob {
    pub due_at: DateTime<Local>,
}

impl ScheduledJob {
    /// Arm a job for the next occurrence of `due` relative to `now`.
    pub fn armed_for(due: NaiveTime, now: DateTime<Local>) -> Self {
        let today = now.date_naive().and_time(due);
        let naive = if today > now.naive_local() {
            today
        } else {
            today + chrono::Duration::days(1)
        };

        // A nonexistent local time (DST spring-forward gap) resolves to the
        // earliest valid instant after it.
        let due_at = match now.timezone().from_local_datetime(&naive) {
            chrono::LocalResult::Single(t) => t,
            chrono::LocalResult::Ambiguous(earliest, _) => earliest,
            chrono::LocalResult::None => now
                .timezone()
                .from_local_datetime(&(naive + chrono::Duration::hours(1)))
                .earliest()
                .unwrap_or(now),
        };

        Self { due_at }
    }

    pub fn is_due(&self, now: DateTime<Local>) -> bool {
        now >= self.due_at
    }
}

/// Single-threaded scheduler loop over an injected clock and action.
pub struct DayScheduler<'a> {
    times_path: PathBuf,
    action: &'a mut dyn ThemeAction,
    clock: &'a dyn TimeSource,
    logger: &'a Logger,
    poll_interval: Duration,
    /// When set, used instead of resolving the system timezone at each arm.
    zone_override: Option<LocalZone>,
    state: SchedulerState,
    pending: Option<ScheduledJob>,
}

impl<'a> DayScheduler<'a> {
    pub fn new(
        times_path: PathBuf,
        action: &'a mut dyn ThemeAction,
        clock: &'a dyn TimeSource,
        logger: &'a Logger,
        poll_interval: Duration,
    ) -> Self {
        Self {
            times_path,
            action,
            clock,
            logger,
            poll_interval,
            zone_override: None,
            state: SchedulerState::Rearm,
            pending: None,
        }
    }

    /// Pin the timezone instead of resolving it per arm.
    pub fn with_zone(mut self, zone: LocalZone) -> Self {
        self.zone_override = Some(zone);
        self
    }

    /// The currently armed job, if any.
    pub fn pending_job(&self) -> Option<&ScheduledJob> {
        self.pending.as_ref()
    }

    /// Run forever. Returns only when the persisted record cannot be read,
    /// which is fatal: the external producer owns the record, so retrying
    /// here would spin on a misconfiguration.
    pub fn run(&mut self) -> Result<(), SolarTimesError> {
        self.run_until(|| false)
    }

    /// Run until the stop predicate reports true; polled once per waiting
    /// iteration. The production entry point is [`run`](Self::run), which
    /// never stops.
    pub fn run_until(&mut self, mut stop: impl FnMut() -> bool) -> Result<(), SolarTimesError> {
        loop {
            match self.state {
                SchedulerState::Rearm => {
                    let job = self.arm()?;
                    self.pending = Some(job);
                    self.state = SchedulerState::Waiting;
                }
                SchedulerState::Waiting => {
                    if stop() {
                        return Ok(());
                    }

                    let Some(job) = self.pending else {
                        // Nothing armed; go arm something.
                        self.state = SchedulerState::Rearm;
                        continue;
                    };

                    if job.is_due(self.clock.now()) {
                        self.state = SchedulerState::Running;
                    } else {
                        self.clock.sleep(self.poll_interval);
                    }
                }
                SchedulerState::Running => {
                    // The job cancels unconditionally, success or failure: a
                    // missed transition must not wedge future days.
                    if let Err(e) = self.action.apply() {
                        self.logger.pipe();
                        self.logger.error_chain("Theme apply action failed", &e);
                    } else {
                        self.logger.info("Theme switch applied");
                    }
                    self.pending = None;
                    self.state = SchedulerState::Rearm;
                }
            }
        }
    }

    /// Read a fresh record and arm the next job.
    ///
    /// The record is consumed once per iteration; it is the external
    /// producer's job to have refreshed it since the last transition.
    fn arm(&mut self) -> Result<ScheduledJob, SolarTimesError> {
        let times = SunTimes::load(&self.times_path)?;
        let zone = self
            .zone_override
            .unwrap_or_else(|| resolver::local_zone(self.logger));

        let now = self.clock.now();
        let due = next_run_at(now.with_timezone(&Utc), &times, &zone);
        let job = ScheduledJob::armed_for(due, now);

        self.logger.block_start(format!(
            "Next theme switch armed for {}",
            job.due_at.format("%Y-%m-%d %H:%M")
        ));

        Ok(job)
    }
}
