//! The pluggable theme-apply action.
//!
//! What "switching the theme" means is desktop-specific and lives outside
//! this crate; the scheduler only knows how to invoke a zero-argument
//! external command and to treat its failure as survivable.

use anyhow::{Context, Result, anyhow};
use std::path::PathBuf;
use std::process::Command;

use crate::io::proc::find_in_path;

/// Action invoked once per transition.
#[cfg_attr(test, mockall::automock)]
pub trait ThemeAction {
    fn apply(&mut self) -> Result<()>;
}

/// Runs a zero-argument external command as the theme-apply action.
pub struct CommandAction {
    program: String,
}

impl CommandAction {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve the command: an explicit path is used as-is, a bare name is
    /// looked up on `PATH` at each invocation so the command may appear or
    /// move between transitions without restarting the scheduler.
    fn resolve(&self) -> Result<PathBuf> {
        let candidate = PathBuf::from(&self.program);
        if candidate.components().count() > 1 {
            return Ok(candidate);
        }

        find_in_path(&self.program)
            .ok_or_else(|| anyhow!("'{}' not found in PATH", self.program))
    }
}

impl ThemeAction for CommandAction {
    fn apply(&mut self) -> Result<()> {
        let program = self.resolve()?;

        let output = Command::new(&program)
            .output()
            .with_context(|| format!("failed to run {}", program.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "{} exited with {}: {}",
                program.display(),
                output.status,
                stderr.trim()
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_command_is_ok() {
        let mut action = CommandAction::new("/bin/true");
        assert!(action.apply().is_ok());
    }

    #[test]
    fn failing_command_reports_status() {
        let mut action = CommandAction::new("/bin/false");
        let err = action.apply().unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }

    #[test]
    fn missing_command_reports_lookup_failure() {
        let mut action = CommandAction::new("autothemer-test-no-such-command");
        let err = action.apply().unwrap_err();
        assert!(err.to_string().contains("not found in PATH"));
    }
}
