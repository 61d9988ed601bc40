//! Callback-free projection of a machine.

use super::error::CheckpointError;
use super::validation::validate;
use crate::core::{State, Symbol, Token};
use crate::machine::{Machine, MachineConfig};
use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;
use tracing::debug;

/// A registered state and its terminal flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry<S> {
    pub state: S,
    pub is_terminal: bool,
}

/// A registered transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEntry<S, T> {
    pub from: S,
    pub token: Token<T>,
    pub to: S,
}

/// Serializable state of a machine.
///
/// Holds the tables, the initial and current state, both counters and the
/// invalid-token setting. Callbacks and the handle counter are not part of
/// it: a machine rebuilt from a snapshot has empty callback buckets and
/// issues handles from zero again.
///
/// Entries are listed in registration order, so snapshots of equal machines
/// compare equal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize, T: Serialize",
    deserialize = "S: Deserialize<'de>, T: Deserialize<'de>"
))]
pub struct Snapshot<S, T> {
    pub states: Vec<StateEntry<S>>,
    pub transitions: Vec<TransitionEntry<S, T>>,
    pub initial_state: Option<S>,
    pub current_state: Option<S>,
    pub feed_count: u64,
    pub transition_count: u64,
    pub raise_on_invalid_token: bool,
}

impl<S: State, T: Symbol, P> Machine<S, T, P> {
    /// Project the machine into a [`Snapshot`].
    pub fn to_snapshot(&self) -> Snapshot<S, T> {
        Snapshot {
            states: self
                .states
                .iter()
                .map(|(state, is_terminal)| StateEntry {
                    state: state.clone(),
                    is_terminal,
                })
                .collect(),
            transitions: self
                .transitions
                .iter()
                .map(|(from, token, to)| TransitionEntry {
                    from: from.clone(),
                    token: token.clone(),
                    to: to.clone(),
                })
                .collect(),
            initial_state: self.states.initial().cloned(),
            current_state: self.current.clone(),
            feed_count: self.feed_count,
            transition_count: self.transition_count,
            raise_on_invalid_token: self.config.raise_on_invalid_token,
        }
    }

    /// Rebuild a machine from a [`Snapshot`].
    ///
    /// The snapshot is validated first and every inconsistency is reported
    /// at once in [`CheckpointError::InvalidSnapshot`].
    pub fn from_snapshot(snapshot: Snapshot<S, T>) -> Result<Self, CheckpointError> {
        if let Validation::Failure(errors) = validate(&snapshot) {
            return Err(CheckpointError::InvalidSnapshot {
                violations: errors.iter().cloned().collect(),
            });
        }

        let Snapshot {
            states,
            transitions,
            initial_state,
            current_state,
            feed_count,
            transition_count,
            raise_on_invalid_token,
        } = snapshot;

        let mut machine = Machine::with_config(MachineConfig {
            raise_on_invalid_token,
        });
        for entry in states {
            let is_initial = initial_state.as_ref() == Some(&entry.state);
            machine.add_state(entry.state, entry.is_terminal, is_initial)?;
        }
        for entry in transitions {
            machine.add_transition(entry.from, entry.to, entry.token)?;
        }
        machine.current = current_state;
        machine.feed_count = feed_count;
        machine.transition_count = transition_count;

        debug!(
            states = machine.state_amount(),
            transitions = machine.transition_amount(),
            "machine restored from snapshot"
        );
        Ok(machine)
    }
}
