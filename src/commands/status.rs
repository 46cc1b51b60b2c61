//! Status command: scheduler liveness and the persisted solar times.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::config;
use crate::error::SolarTimesError;
use crate::io::{lock, proc};
use crate::logger::Logger;
use crate::sched::resolver::{self, LocalZone};
use crate::solar::SunTimes;

pub fn handle_status_command(debug_enabled: bool) -> Result<()> {
    let logger = Logger::new(debug_enabled);
    logger.version_header();

    match lock::read_owner_pid() {
        Some(pid) => logger.block_start(format!("Scheduler running (PID: {pid})")),
        None => match proc::scheduler_pids().first() {
            // Visible in the process table but holding no lock: predates the
            // lock file or lost it. Still report it as running.
            Some(pid) => logger.block_start(format!("Scheduler running unlocked (PID: {pid})")),
            None => logger.block_start("Scheduler is not running"),
        },
    }

    let times_path = config::sun_times_path()?;
    match SunTimes::load(&times_path) {
        Ok(times) => {
            let zone = resolver::local_zone(&logger);

            logger.block_start("Stored solar times:");
            logger.indented(format!("Sunrise: {}", fmt_local(&zone, times.sunrise)));
            logger.indented(format!("Sunset:  {}", fmt_local(&zone, times.sunset)));

            let next = resolver::next_run_at(Utc::now(), &times, &zone);
            logger.indented(format!("Next switch at: {}", next.format("%H:%M")));
        }
        Err(SolarTimesError::NotFound { path }) => {
            logger.pipe();
            logger.warning(format!("No sun times record at {}", path.display()));
            logger.indented("The scheduler will exit until the record is written");
        }
        Err(e) => {
            logger.pipe();
            logger.warning(format!("Could not read the sun times record: {e}"));
        }
    }

    logger.end();
    Ok(())
}

fn fmt_local(zone: &LocalZone, instant: DateTime<Utc>) -> String {
    match zone {
        LocalZone::Iana(tz) => instant.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string(),
        LocalZone::Fixed(offset) => instant
            .with_timezone(offset)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
    }
}
