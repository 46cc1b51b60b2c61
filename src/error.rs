//! Typed errors for the two fatal startup paths.
//!
//! Everything else in the crate flows through `anyhow::Result` with context;
//! these enums exist so callers can distinguish misconfiguration (abort, no
//! retry) from transient trouble.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to read the persisted sunrise/sunset record.
///
/// All variants are fatal for the scheduler process: the external producer is
/// responsible for keeping the record fresh, so retrying here cannot help.
#[derive(Debug, Error)]
pub enum SolarTimesError {
    /// The record does not exist at the expected path.
    #[error("sun times record not found at {}", path.display())]
    NotFound { path: PathBuf },

    /// The record exists but could not be read.
    #[error("failed to read sun times record")]
    Io(#[from] std::io::Error),

    /// The record exists but could not be decoded.
    #[error("sun times record is corrupt")]
    Decode(#[from] bincode::Error),
}

/// Failure to launch the scheduler process.
///
/// Surfaced to the supervisor's caller rather than retried: a broken spawn
/// retried automatically risks a crash loop.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// No scheduler executable could be located.
    #[error("could not locate the autothemer executable")]
    ExecutableNotFound,

    /// The operating system rejected the spawn request.
    #[error("failed to spawn scheduler process")]
    Io(#[from] std::io::Error),
}
