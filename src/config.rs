//! Configuration loading and well-known paths.
//!
//! Configuration is deliberately thin: which command applies the theme and
//! how often the scheduler polls the clock. A missing file is created with
//! commented defaults; an unreadable file degrades to defaults with a
//! warning, since the scheduler can run fine without it.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_APPLY_COMMAND, DEFAULT_POLL_INTERVAL_SECS, SCHEDULER_LOG_FILE, SUN_TIMES_FILE,
};
use crate::logger::Logger;

/// User-tunable settings read from `autothemer.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Zero-argument command invoked at each transition.
    pub apply_command: Option<String>,
    /// Seconds between wall-clock checks while a job is pending.
    pub poll_interval_secs: Option<u64>,
}

impl Config {
    /// Load configuration, creating a default file on first run.
    ///
    /// Never fatal: any failure along the way falls back to defaults so a
    /// broken config file cannot keep the scheduler from arming jobs.
    pub fn load(logger: &Logger) -> Config {
        let path = match config_path() {
            Ok(path) => path,
            Err(e) => {
                logger.warning(format!("Could not determine config path: {e}"));
                return Config::default();
            }
        };

        if !path.exists() {
            if let Err(e) = create_default_config(&path) {
                logger.warning(format!("Could not create default config: {e}"));
                return Config::default();
            }
        }

        match std::fs::read_to_string(&path)
            .context("failed to read config file")
            .and_then(|raw| toml::from_str(&raw).context("failed to parse config file"))
        {
            Ok(config) => config,
            Err(e) => {
                logger.warning(format!("{e:#}; using defaults"));
                Config::default()
            }
        }
    }

    pub fn apply_command(&self) -> &str {
        self.apply_command.as_deref().unwrap_or(DEFAULT_APPLY_COMMAND)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS))
    }
}

/// Write a commented default config so users have something to edit.
fn create_default_config(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = format!(
        "#[Autothemer config]\n\
         # Zero-argument command run at each sunrise/sunset transition.\n\
         apply_command = \"{DEFAULT_APPLY_COMMAND}\"\n\
         \n\
         # Seconds between clock checks while waiting for the next transition.\n\
         poll_interval_secs = {DEFAULT_POLL_INTERVAL_SECS}\n"
    );

    std::fs::write(path, contents).context("failed to write default config")
}

/// Path of `autothemer.toml` under the user config directory.
pub fn config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("could not determine config directory")?;
    Ok(base.join("autothemer").join("autothemer.toml"))
}

/// Data directory holding the sun times record and the scheduler log.
pub fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_local_dir().context("could not determine local data directory")?;
    Ok(base.join("autothemer"))
}

/// Path of the persisted sunrise/sunset record.
pub fn sun_times_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(SUN_TIMES_FILE))
}

/// Path of the append-only scheduler log shared by the supervisor's markers
/// and the scheduler's redirected output.
pub fn scheduler_log_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(SCHEDULER_LOG_FILE))
}
