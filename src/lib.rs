//! # Autothemer Library
//!
//! Internal library for the autothemer binary.
//!
//! Autothemer switches the desktop between light and dark themes at sunrise
//! and sunset. The scheduler daemon reads a persisted record of the next
//! solar events, arms exactly one job for the next transition, invokes the
//! external theme-apply command when it fires, and re-arms for the following
//! day forever. A supervisor launches the scheduler detached from the
//! calling session, captures its early output in a durable log, and detects
//! immediate crashes.
//!
//! ## Architecture
//!
//! - **Scheduling**: `sched` holds the daily state machine and the
//!   next-transition resolver; `solar` owns the persisted sunrise/sunset
//!   record; `time_source` abstracts the clock.
//! - **Supervision**: `supervisor` spawns, detaches, observes and stops the
//!   scheduler process; `io` provides the lock file and process-table
//!   helpers it relies on.
//! - **Surface**: `args` parses the CLI, `commands` implements the
//!   subcommands, `action` wraps the external theme-apply command.
//! - **Infrastructure**: `logger` (explicit sink, injected), `config`,
//!   `constants`, `error`.

pub mod action;
pub mod args;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod logger;
pub mod sched;
pub mod solar;
pub mod supervisor;
pub mod time_source;
