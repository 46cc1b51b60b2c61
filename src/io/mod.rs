//! Process-level coordination: lock file and process-table access.

pub mod lock;
pub mod proc;
