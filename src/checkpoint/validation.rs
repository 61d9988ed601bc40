//! Consistency checks for snapshots using Validation.
//!
//! A snapshot may come from an untrusted or hand-edited file. All checks run
//! and every violation is collected, so a broken snapshot is reported in a
//! single pass.

use super::snapshot::Snapshot;
use crate::core::{State, Symbol, Token};
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A single inconsistency found in a snapshot.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotViolation {
    #[error("state {state} is listed more than once")]
    DuplicateState { state: String },

    #[error("transition {from} --({token})--> ... is listed more than once")]
    DuplicateTransition { from: String, token: String },

    #[error("transition {from} --({token})--> ... references unknown state {state}")]
    DanglingTransition {
        from: String,
        token: String,
        state: String,
    },

    #[error("initial state {state} is not a listed state")]
    UnknownInitialState { state: String },

    #[error("current state {state} is not a listed state")]
    UnknownCurrentState { state: String },

    #[error("current state {state} is set but there is no initial state")]
    CurrentWithoutInitial { state: String },

    #[error("initial state {state} is set but there is no current state")]
    InitialWithoutCurrent { state: String },

    #[error("transition count {transition_count} exceeds feed count {feed_count}")]
    CountMismatch {
        feed_count: u64,
        transition_count: u64,
    },
}

type Check = Validation<(), NonEmptyVec<SnapshotViolation>>;

fn check(ok: bool, violation: impl FnOnce() -> SnapshotViolation) -> Check {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

/// Run every consistency check against `snapshot`.
pub fn validate<S: State, T: Symbol>(snapshot: &Snapshot<S, T>) -> Check {
    let mut checks: Vec<Check> = Vec::new();

    let mut known: HashSet<&S> = HashSet::new();
    for entry in &snapshot.states {
        let fresh = known.insert(&entry.state);
        checks.push(check(fresh, || SnapshotViolation::DuplicateState {
            state: format!("{:?}", entry.state),
        }));
    }

    let mut keys: HashSet<(&S, &Token<T>)> = HashSet::new();
    for entry in &snapshot.transitions {
        let fresh = keys.insert((&entry.from, &entry.token));
        checks.push(check(fresh, || SnapshotViolation::DuplicateTransition {
            from: format!("{:?}", entry.from),
            token: entry.token.to_string(),
        }));
        for endpoint in [&entry.from, &entry.to] {
            checks.push(check(known.contains(endpoint), || {
                SnapshotViolation::DanglingTransition {
                    from: format!("{:?}", entry.from),
                    token: entry.token.to_string(),
                    state: format!("{endpoint:?}"),
                }
            }));
        }
    }

    match (&snapshot.initial_state, &snapshot.current_state) {
        (Some(initial), Some(current)) => {
            checks.push(check(known.contains(initial), || {
                SnapshotViolation::UnknownInitialState {
                    state: format!("{initial:?}"),
                }
            }));
            checks.push(check(known.contains(current), || {
                SnapshotViolation::UnknownCurrentState {
                    state: format!("{current:?}"),
                }
            }));
        }
        (None, Some(current)) => {
            checks.push(Validation::fail(SnapshotViolation::CurrentWithoutInitial {
                state: format!("{current:?}"),
            }));
        }
        (Some(initial), None) => {
            checks.push(Validation::fail(SnapshotViolation::InitialWithoutCurrent {
                state: format!("{initial:?}"),
            }));
        }
        (None, None) => {}
    }

    checks.push(check(
        snapshot.transition_count <= snapshot.feed_count,
        || SnapshotViolation::CountMismatch {
            feed_count: snapshot.feed_count,
            transition_count: snapshot.transition_count,
        },
    ));

    Validation::all_vec(checks).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::{StateEntry, TransitionEntry};

    fn entry(state: &'static str, is_terminal: bool) -> StateEntry<&'static str> {
        StateEntry { state, is_terminal }
    }

    fn valid() -> Snapshot<&'static str, char> {
        Snapshot {
            states: vec![entry("a", false), entry("b", true)],
            transitions: vec![TransitionEntry {
                from: "a",
                token: Token::Exact('b'),
                to: "b",
            }],
            initial_state: Some("a"),
            current_state: Some("b"),
            feed_count: 4,
            transition_count: 1,
            raise_on_invalid_token: false,
        }
    }

    #[test]
    fn consistent_snapshot_passes() {
        assert!(validate(&valid()).is_success());
    }

    #[test]
    fn validation_accumulates_all_violations() {
        let mut snapshot = valid();
        snapshot.states.push(entry("a", true));
        snapshot.transitions.push(TransitionEntry {
            from: "a",
            token: Token::Exact('b'),
            to: "ghost",
        });
        snapshot.current_state = Some("nowhere");
        snapshot.transition_count = 9;

        match validate(&snapshot) {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 5);

                let has = |pred: fn(&SnapshotViolation) -> bool| errors.iter().any(pred);
                assert!(has(|e| matches!(e, SnapshotViolation::DuplicateState { .. })));
                assert!(has(|e| matches!(
                    e,
                    SnapshotViolation::DuplicateTransition { .. }
                )));
                assert!(has(|e| matches!(
                    e,
                    SnapshotViolation::DanglingTransition { .. }
                )));
                assert!(has(|e| matches!(
                    e,
                    SnapshotViolation::UnknownCurrentState { .. }
                )));
                assert!(has(|e| matches!(e, SnapshotViolation::CountMismatch { .. })));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn current_and_initial_must_be_set_together() {
        let mut snapshot = valid();
        snapshot.initial_state = None;
        assert!(validate(&snapshot).is_failure());

        let mut snapshot = valid();
        snapshot.current_state = None;
        assert!(validate(&snapshot).is_failure());

        let mut snapshot = valid();
        snapshot.initial_state = None;
        snapshot.current_state = None;
        assert!(validate(&snapshot).is_success());
    }

    #[test]
    fn unknown_initial_state_is_reported() {
        let mut snapshot = valid();
        snapshot.initial_state = Some("ghost");

        match validate(&snapshot) {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors
                    .iter()
                    .all(|e| matches!(e, SnapshotViolation::UnknownInitialState { .. })));
            }
            Validation::Success(_) => panic!("Expected failure, got success"),
        }
    }
}
