//! Command-line argument parsing and processing.
//!
//! Parsing is done by hand over the argument list: the surface is small
//! (four subcommands and three flags) and hand parsing keeps unknown
//! arguments flowing into the help fallback instead of a panic.

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the scheduler daemon loop in the foreground. This is the
    /// invocation the supervisor spawns and matches in the process table.
    RunScheduler { debug_enabled: bool },
    /// Stop any running scheduler and start a fresh one.
    Restart { debug_enabled: bool },
    /// Stop the running scheduler.
    Stop { debug_enabled: bool },
    /// Report scheduler liveness and the persisted solar times.
    Status { debug_enabled: bool },
    /// Display help information and exit.
    ShowHelp,
    /// Display version information and exit.
    ShowVersion,
    /// Show help due to unknown arguments and exit.
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    pub fn from_env() -> Self {
        Self::parse(std::env::args())
    }

    /// Parse command-line arguments into a structured result.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut command: Option<String> = None;
        let mut unknown_arg_found = false;

        for arg in args.into_iter().skip(1) {
            match arg.as_ref() {
                "--debug" | "-d" => debug_enabled = true,
                "--help" | "-h" => {
                    return ParsedArgs {
                        action: CliAction::ShowHelp,
                    };
                }
                "--version" | "-V" => {
                    return ParsedArgs {
                        action: CliAction::ShowVersion,
                    };
                }
                other if other.starts_with('-') => unknown_arg_found = true,
                other if command.is_none() => command = Some(other.to_string()),
                _ => unknown_arg_found = true,
            }
        }

        if unknown_arg_found {
            return ParsedArgs {
                action: CliAction::ShowHelpDueToError,
            };
        }

        let action = match command.as_deref() {
            Some("scheduler") => CliAction::RunScheduler { debug_enabled },
            Some("restart") => CliAction::Restart { debug_enabled },
            Some("stop") => CliAction::Stop { debug_enabled },
            Some("status") => CliAction::Status { debug_enabled },
            Some("help") => CliAction::ShowHelp,
            Some("version") => CliAction::ShowVersion,
            Some(_) => CliAction::ShowHelpDueToError,
            // Bare invocation: show usage rather than silently starting a
            // daemon from an interactive shell.
            None => CliAction::ShowHelp,
        };

        ParsedArgs { action }
    }
}

/// Display help information.
pub fn display_help(logger: &crate::logger::Logger) {
    logger.version_header();
    logger.block_start("Usage: autothemer [OPTIONS] <COMMAND>");
    logger.block_start("Commands:");
    logger.indented("scheduler   Run the transition scheduler in the foreground");
    logger.indented("restart     Stop any running scheduler and start a fresh one");
    logger.indented("stop        Stop the running scheduler");
    logger.indented("status      Show scheduler state and the stored solar times");
    logger.block_start("Options:");
    logger.indented("-d, --debug     Enable detailed debug output");
    logger.indented("-h, --help      Print help");
    logger.indented("-V, --version   Print version");
    logger.block_start("The scheduler is normally managed through 'autothemer restart',");
    logger.indented("which detaches it from the shell and logs to the data directory.");
    logger.end();
}

/// Display version information.
pub fn display_version(logger: &crate::logger::Logger) {
    logger.version_header();
    logger.block_start(format!("autothemer v{}", env!("CARGO_PKG_VERSION")));
    logger.indented("Automatic light/dark theme switching at sunrise and sunset");
    logger.end();
}
