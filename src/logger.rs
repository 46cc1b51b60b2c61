//! Structured logging sink with visual formatting.
//!
//! The `Logger` is constructed once at process start and passed into each
//! component rather than living in global state; it is flushed when dropped.
//! Output uses Unicode box-drawing characters for structured, readable blocks
//! plus `[LEVEL]` prefixes for semantic messages.
//!
//! When standard output is not a terminal (the scheduler daemon runs with its
//! streams redirected into the log file), every line is prefixed with a
//! timestamp and ANSI color codes are stripped, so the durable log stays
//! plain and greppable.

use std::io::{IsTerminal, Write};

/// Logging sink handed to each component at construction time.
///
/// ## Conventions
///
/// - `block_start` initiates a new conceptual block (`┃` spacer then `┣ msg`);
///   follow-up lines in the same block use `decorated` or `indented`.
/// - `decorated` prints `┣ msg` for continuation or standalone status lines.
/// - `indented` prints `┃   msg` for sub-items and details.
/// - `pipe` prints a bare `┃` for vertical spacing before a semantic message.
/// - `version_header` / `end` open and close the whole log flow.
/// - `info` / `warning` / `error` / `debug` carry `[LEVEL]` prefixes.
pub struct Logger {
    debug_enabled: bool,
    /// Plain mode: strip colors and prefix timestamps (non-tty output).
    plain: bool,
}

impl Logger {
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            plain: !std::io::stdout().is_terminal(),
        }
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug_enabled
    }

    fn timestamp_prefix(&self) -> String {
        if self.plain {
            format!("[{}] ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))
        } else {
            String::new()
        }
    }

    fn write(&self, text: &str) {
        if self.plain {
            // Every physical line gets its own timestamp in the log file.
            let stripped = strip_ansi_codes(text);
            let prefix = self.timestamp_prefix();
            for line in stripped.split_inclusive('\n') {
                print!("{prefix}{line}");
            }
        } else {
            print!("{text}");
        }
        let _ = std::io::stdout().flush();
    }

    pub fn version_header(&self) {
        let version = env!("CARGO_PKG_VERSION");
        self.write(&format!("┏ autothemer v{version} ━━╸\n"));
    }

    pub fn end(&self) {
        self.write("╹\n");
    }

    pub fn pipe(&self) {
        self.write("┃\n");
    }

    pub fn block_start(&self, message: impl AsRef<str>) {
        self.write(&format!("┃\n┣ {}\n", message.as_ref()));
    }

    pub fn decorated(&self, message: impl AsRef<str>) {
        self.write(&format!("┣ {}\n", message.as_ref()));
    }

    pub fn indented(&self, message: impl AsRef<str>) {
        self.write(&format!("┃   {}\n", message.as_ref()));
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.write(&format!("┣[\x1b[32mINFO\x1b[0m] {}\n", message.as_ref()));
    }

    pub fn warning(&self, message: impl AsRef<str>) {
        self.write(&format!("┣[\x1b[33mWARNING\x1b[0m] {}\n", message.as_ref()));
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.write(&format!("┣[\x1b[31mERROR\x1b[0m] {}\n", message.as_ref()));
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        if self.debug_enabled {
            self.write(&format!("┣[\x1b[32mDEBUG\x1b[0m] {}\n", message.as_ref()));
        }
    }

    /// Log an error together with its full cause chain, each cause indented
    /// under the primary message.
    pub fn error_chain(&self, message: impl AsRef<str>, err: &anyhow::Error) {
        self.error(format!("{}: {err}", message.as_ref()));
        for cause in err.chain().skip(1) {
            self.indented(format!("caused by: {cause}"));
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        let _ = std::io::stdout().flush();
    }
}

/// Strip ANSI escape sequences (`ESC [ ... m`) from text.
fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            if chars.peek() == Some(&'[') {
                chars.next();
                for ch in chars.by_ref() {
                    if ch == 'm' {
                        break;
                    }
                }
            } else {
                result.push(ch);
            }
        } else {
            result.push(ch);
        }
    }

    result
}
