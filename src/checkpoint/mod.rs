//! Checkpoint and resume functionality for machines.
//!
//! A [`Checkpoint`] wraps a [`Snapshot`] with a format version, a unique id
//! and a timestamp, and can be written as JSON or as a compact binary blob.
//! Callbacks are not serializable and are never part of a checkpoint; bind
//! them again after [`Machine::resume`].

use crate::core::{State, Symbol};
use crate::machine::Machine;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod error;
mod snapshot;
mod validation;

pub use error::CheckpointError;
pub use snapshot::{Snapshot, StateEntry, TransitionEntry};
pub use validation::{validate, SnapshotViolation};

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable checkpoint of a machine.
/// Does NOT include callbacks (not serializable).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize, T: Serialize",
    deserialize = "S: Deserialize<'de>, T: Deserialize<'de>"
))]
pub struct Checkpoint<S, T> {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Tables, position and counters of the machine
    pub snapshot: Snapshot<S, T>,
}

impl<S, T> Checkpoint<S, T> {
    /// Wrap a snapshot with the current format version, a fresh id and the
    /// current time.
    pub fn new(snapshot: Snapshot<S, T>) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            snapshot,
        }
    }
}

impl<S: Serialize, T: Serialize> Checkpoint<S, T> {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }
}

impl<S: DeserializeOwned, T: DeserializeOwned> Checkpoint<S, T> {
    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }
}

impl<S: State, T: Symbol, P> Machine<S, T, P> {
    /// Take a checkpoint of the machine's current state.
    pub fn checkpoint(&self) -> Checkpoint<S, T> {
        let checkpoint = Checkpoint::new(self.to_snapshot());
        debug!(id = %checkpoint.id, "checkpoint taken");
        checkpoint
    }

    /// Rebuild a machine from a checkpoint.
    ///
    /// Fails with [`CheckpointError::UnsupportedVersion`] for checkpoints
    /// written by another format version, and with
    /// [`CheckpointError::InvalidSnapshot`] if the snapshot is inconsistent.
    pub fn resume(checkpoint: Checkpoint<S, T>) -> Result<Self, CheckpointError> {
        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: checkpoint.version,
                supported: CHECKPOINT_VERSION,
            });
        }

        let id = checkpoint.id;
        let machine = Self::from_snapshot(checkpoint.snapshot)?;
        debug!(%id, "machine resumed from checkpoint");
        Ok(machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Token;
    use crate::machine::{MachineConfig, MachineError};

    fn machine() -> Machine<String, char> {
        let mut machine = Machine::new();
        machine.add_state("idle".to_string(), false, true).unwrap();
        machine.add_state("busy".to_string(), false, false).unwrap();
        machine.add_state("done".to_string(), true, false).unwrap();
        machine
            .add_transition("idle".to_string(), "busy".to_string(), 's')
            .unwrap();
        machine
            .add_transition("busy".to_string(), "done".to_string(), 'f')
            .unwrap();
        machine
            .add_wildcard_transition("busy".to_string(), "busy".to_string())
            .unwrap();
        machine
    }

    #[test]
    fn checkpoint_carries_version_and_unique_id() {
        let machine = machine();

        let first = machine.checkpoint();
        let second = machine.checkpoint();

        assert_eq!(first.version, CHECKPOINT_VERSION);
        assert_ne!(first.id, second.id);
        assert_eq!(first.snapshot, second.snapshot);
    }

    #[test]
    fn json_round_trip() {
        let mut machine = machine();
        machine.feed_many("sxx".chars()).unwrap();
        let checkpoint = machine.checkpoint();

        let json = checkpoint.to_json().unwrap();
        let restored: Checkpoint<String, char> = Checkpoint::from_json(&json).unwrap();

        assert_eq!(restored.id, checkpoint.id);
        assert_eq!(restored.version, checkpoint.version);
        assert_eq!(restored.snapshot, checkpoint.snapshot);
    }

    #[test]
    fn binary_round_trip() {
        let mut machine = machine();
        machine.feed('s').unwrap();
        let checkpoint = machine.checkpoint();

        let bytes = checkpoint.to_binary().unwrap();
        let restored: Checkpoint<String, char> = Checkpoint::from_binary(&bytes).unwrap();

        assert_eq!(restored.id, checkpoint.id);
        assert_eq!(restored.snapshot, checkpoint.snapshot);
    }

    #[test]
    fn resumed_machine_keeps_running() {
        let mut machine = machine();
        machine.feed_many("sx".chars()).unwrap();

        let json = machine.checkpoint().to_json().unwrap();
        let checkpoint = Checkpoint::<String, char>::from_json(&json).unwrap();
        let mut resumed = Machine::<String, char>::resume(checkpoint).unwrap();

        assert_eq!(resumed.current_state().map(String::as_str), Some("busy"));
        assert_eq!(resumed.feed_count(), 2);
        assert_eq!(resumed.transition_count(), 2);
        assert!(resumed.feed('f').unwrap());
        assert!(resumed.is_terminated());
        assert!(resumed.has_transition(&"busy".to_string(), Token::Any));
    }

    #[test]
    fn strict_setting_survives_resume() {
        let mut strict: Machine<String, char> = Machine::with_config(MachineConfig::strict());
        strict.add_state("idle".to_string(), false, true).unwrap();
        strict.add_state("busy".to_string(), false, false).unwrap();
        strict
            .add_transition("idle".to_string(), "busy".to_string(), 's')
            .unwrap();

        let json = strict.checkpoint().to_json().unwrap();
        let bytes = strict.checkpoint().to_binary().unwrap();
        let from_json =
            Machine::<String, char>::resume(Checkpoint::from_json(&json).unwrap()).unwrap();
        let from_binary =
            Machine::<String, char>::resume(Checkpoint::from_binary(&bytes).unwrap()).unwrap();

        for mut restored in [from_json, from_binary] {
            assert!(restored.raise_on_invalid_token());
            assert_eq!(restored.config(), MachineConfig::strict());
            assert!(matches!(
                restored.feed('z'),
                Err(MachineError::InvalidToken { .. })
            ));
            assert_eq!(restored.feed_count(), 1);
            assert!(restored.feed('s').unwrap());
        }
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut checkpoint = machine().checkpoint();
        checkpoint.version = CHECKPOINT_VERSION + 1;

        let result = Machine::<String, char>::resume(checkpoint);

        match result {
            Err(CheckpointError::UnsupportedVersion { found, supported }) => {
                assert_eq!(found, CHECKPOINT_VERSION + 1);
                assert_eq!(supported, CHECKPOINT_VERSION);
            }
            _ => panic!("Expected UnsupportedVersion error"),
        }
    }

    #[test]
    fn tampered_checkpoint_reports_violations() {
        let mut checkpoint = machine().checkpoint();
        checkpoint.snapshot.current_state = Some("lost".to_string());
        checkpoint.snapshot.transition_count = 5;

        let json = checkpoint.to_json().unwrap();
        let checkpoint = Checkpoint::<String, char>::from_json(&json).unwrap();
        let result = Machine::<String, char>::resume(checkpoint);

        match result {
            Err(CheckpointError::InvalidSnapshot { violations }) => {
                assert_eq!(violations.len(), 2);
            }
            _ => panic!("Expected InvalidSnapshot error"),
        }
    }

    #[test]
    fn malformed_json_is_a_deserialization_error() {
        let result = Checkpoint::<String, char>::from_json("{ not json");

        assert!(matches!(
            result,
            Err(CheckpointError::DeserializationFailed(_))
        ));
    }
}
