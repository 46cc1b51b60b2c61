//! Implementation of the restart command.
//!
//! Stops any running scheduler and starts a fresh, detached one. This is
//! also how the scheduler is started in the first place: restart with
//! nothing running is simply a start.

use anyhow::Result;

use crate::logger::Logger;
use crate::supervisor::{SpawnOutcome, Supervisor};

pub fn handle_restart_command(debug_enabled: bool) -> Result<()> {
    let logger = Logger::new(debug_enabled);
    logger.version_header();
    logger.block_start("Restarting the scheduler...");

    let supervisor = Supervisor::new(&logger);

    match supervisor.restart() {
        Ok(SpawnOutcome::Healthy) => {
            logger.pipe();
            logger.info("Scheduler restarted");
            logger.end();
            Ok(())
        }
        Ok(SpawnOutcome::CrashedImmediately(code)) => {
            // Already logged by the supervisor; no automatic retry, a spawn
            // that crashes on startup will crash again.
            logger.end();
            anyhow::bail!("scheduler exited immediately with code {code}")
        }
        Err(e) => {
            logger.pipe();
            logger.error(format!("Failed to start the scheduler: {e}"));
            logger.end();
            Err(e.into())
        }
    }
}
