//! Implementation of the stop command.

use anyhow::Result;

use crate::io::{lock, proc};
use crate::logger::Logger;
use crate::supervisor::Supervisor;

pub fn handle_stop_command(debug_enabled: bool) -> Result<()> {
    let logger = Logger::new(debug_enabled);
    logger.version_header();

    let running = lock::read_owner_pid().is_some() || !proc::scheduler_pids().is_empty();
    if !running {
        logger.pipe();
        logger.info("No scheduler is running");
        logger.end();
        return Ok(());
    }

    logger.block_start("Stopping the scheduler...");
    Supervisor::new(&logger).ensure_stopped();
    logger.pipe();
    logger.info("Done");
    logger.end();
    Ok(())
}
