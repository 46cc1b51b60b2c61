//! End-to-end scheduler loop tests over a manually advanced clock.

use chrono::{DateTime, Local, TimeZone, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use autothemer::action::ThemeAction;
use autothemer::logger::Logger;
use autothemer::sched::DayScheduler;
use autothemer::sched::resolver::LocalZone;
use autothemer::solar::SunTimes;
use autothemer::time_source::{ManualClock, TimeSource};

/// Counts invocations; optionally fails every time.
struct ProbeAction {
    calls: Arc<AtomicU32>,
    fail: bool,
}

impl ProbeAction {
    fn new(fail: bool) -> (Self, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        (
            Self {
                calls: Arc::clone(&calls),
                fail,
            },
            calls,
        )
    }
}

impl ThemeAction for ProbeAction {
    fn apply(&mut self) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("simulated apply failure");
        }
        Ok(())
    }
}

fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

/// A realistic clock reading: live polls never land on a whole second.
fn local_skewed(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
    local(y, mo, d, h, mi) + chrono::Duration::milliseconds(1)
}

/// Persist a record with sunrise 06:45 and sunset 19:10 local on June 21.
fn write_record(dir: &std::path::Path) -> PathBuf {
    let path = dir.join("sun_times");
    SunTimes {
        sunrise: local(2025, 6, 21, 6, 45).with_timezone(&Utc),
        sunset: local(2025, 6, 21, 19, 10).with_timezone(&Utc),
    }
    .save(&path)
    .unwrap();
    path
}

#[test]
fn midday_start_arms_sunset_job() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_record(dir.path());

    let now = local(2025, 6, 21, 12, 0);
    let clock = ManualClock::new(now);
    let logger = Logger::new(false);
    let (mut action, calls) = ProbeAction::new(false);

    let mut sched = DayScheduler::new(path, &mut action, &clock, &logger, Duration::from_secs(1))
        .with_zone(LocalZone::Fixed(*now.offset()));

    // Stop at the first waiting iteration: exactly one job armed, nothing run.
    sched.run_until(|| true).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let job = sched.pending_job().expect("one job must be armed");
    assert_eq!(job.due_at, local(2025, 6, 21, 19, 10));
}

#[test]
fn sunset_fires_once_then_next_sunrise_is_armed() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_record(dir.path());

    let now = local_skewed(2025, 6, 21, 12, 0);
    let clock = ManualClock::new(now);
    let logger = Logger::new(false);
    let (mut action, calls) = ProbeAction::new(false);

    let mut sched = DayScheduler::new(path, &mut action, &clock, &logger, Duration::from_secs(1))
        .with_zone(LocalZone::Fixed(*now.offset()));

    sched
        .run_until(|| calls.load(Ordering::SeqCst) >= 1)
        .unwrap();

    // Fired exactly once, at 19:10, and the record was re-read to arm the
    // following sunrise.
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(clock.now() >= local(2025, 6, 21, 19, 10));

    let job = sched.pending_job().expect("one job must be re-armed");
    assert_eq!(job.due_at, local(2025, 6, 22, 6, 45));
}

#[test]
fn failing_action_keeps_the_loop_alive() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_record(dir.path());

    let now = local_skewed(2025, 6, 21, 12, 0);
    let clock = ManualClock::new(now);
    let logger = Logger::new(false);
    let (mut action, calls) = ProbeAction::new(true);

    let mut sched = DayScheduler::new(path, &mut action, &clock, &logger, Duration::from_secs(30))
        .with_zone(LocalZone::Fixed(*now.offset()));

    // Three failed transitions: sunset, next sunrise, next sunset. The loop
    // must survive each failure and keep re-arming.
    sched
        .run_until(|| calls.load(Ordering::SeqCst) >= 3)
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(sched.pending_job().is_some());
}

#[test]
fn at_most_one_job_is_pending_after_each_rearm() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_record(dir.path());

    let now = local_skewed(2025, 6, 21, 18, 0);
    let clock = ManualClock::new(now);
    let logger = Logger::new(false);
    let (mut action, calls) = ProbeAction::new(false);

    let mut sched = DayScheduler::new(path, &mut action, &clock, &logger, Duration::from_secs(1))
        .with_zone(LocalZone::Fixed(*now.offset()));

    sched
        .run_until(|| calls.load(Ordering::SeqCst) >= 2)
        .unwrap();

    // Two transitions happened on two distinct days; after each the loop
    // holds exactly one pending job.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(sched.pending_job().is_some());
    assert_eq!(
        sched.pending_job().unwrap().due_at,
        local(2025, 6, 22, 19, 10)
    );
}
