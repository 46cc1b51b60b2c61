//! The scheduler daemon entry point.
//!
//! Runs the daily loop in the foreground. Under normal management the
//! supervisor has already detached this process and bound its output to the
//! scheduler log; running it directly in a terminal works too and is useful
//! for debugging.

use anyhow::{Context, Result};

use crate::action::CommandAction;
use crate::config::{self, Config};
use crate::error::SolarTimesError;
use crate::io::lock::SchedulerLock;
use crate::logger::Logger;
use crate::sched::DayScheduler;
use crate::time_source::RealTimeSource;

pub fn handle_scheduler_command(debug_enabled: bool) -> Result<()> {
    let logger = Logger::new(debug_enabled);
    logger.version_header();

    // One scheduler per user, enforced by the kernel lock.
    let _lock = match SchedulerLock::acquire(&logger)? {
        Some(lock) => lock,
        None => {
            logger.pipe();
            logger.error("Another scheduler is already running");
            logger.indented("Use 'autothemer restart' to replace it");
            logger.end();
            std::process::exit(crate::constants::EXIT_FAILURE);
        }
    };

    let config = Config::load(&logger);
    let times_path = config::sun_times_path()?;

    let mut action = CommandAction::new(config.apply_command());
    let clock = RealTimeSource;

    let mut scheduler = DayScheduler::new(
        times_path,
        &mut action,
        &clock,
        &logger,
        config.poll_interval(),
    );

    match scheduler.run() {
        // The loop only returns on a fatal record read; log it and exit
        // cleanly rather than spin on a record only the producer can fix.
        Err(e @ SolarTimesError::NotFound { .. }) => {
            logger.pipe();
            logger.error("Could not find the sun times record, exiting...");
            logger.indented("Run the times update so the record gets written");
            logger.end();
            Err(e).context("scheduler stopped")
        }
        Err(e) => {
            let err = anyhow::Error::new(e);
            logger.pipe();
            logger.error_chain("Failed to read the sun times record", &err);
            logger.end();
            Err(err.context("scheduler stopped"))
        }
        Ok(()) => Ok(()),
    }
}
