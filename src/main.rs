//! Binary entry point: argument parsing and command dispatch.

use anyhow::Result;

use autothemer::args::{self, CliAction, ParsedArgs};
use autothemer::commands;
use autothemer::logger::Logger;

fn main() -> Result<()> {
    let parsed = ParsedArgs::from_env();

    match parsed.action {
        CliAction::RunScheduler { debug_enabled } => {
            commands::scheduler::handle_scheduler_command(debug_enabled)
        }
        CliAction::Restart { debug_enabled } => {
            commands::restart::handle_restart_command(debug_enabled)
        }
        CliAction::Stop { debug_enabled } => commands::stop::handle_stop_command(debug_enabled),
        CliAction::Status { debug_enabled } => {
            commands::status::handle_status_command(debug_enabled)
        }
        CliAction::ShowHelp => {
            args::display_help(&Logger::new(false));
            Ok(())
        }
        CliAction::ShowVersion => {
            args::display_version(&Logger::new(false));
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help(&Logger::new(false));
            std::process::exit(autothemer::constants::EXIT_FAILURE);
        }
    }
}
