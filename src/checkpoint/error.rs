//! Checkpoint error types.

use super::validation::SnapshotViolation;
use crate::machine::MachineError;
use thiserror::Error;

/// Errors that can occur during checkpoint operations
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Checkpoint version is not supported by this version
    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Snapshot contents are inconsistent; every violation found is listed
    #[error("Snapshot validation failed: {}", join(.violations))]
    InvalidSnapshot { violations: Vec<SnapshotViolation> },

    /// Rebuilding the machine from a validated snapshot failed
    #[error(transparent)]
    Machine(#[from] MachineError),
}

fn join(violations: &[SnapshotViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
