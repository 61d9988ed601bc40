//! State identifiers and the state table.
//!
//! A state is any value that can be cloned, compared, hashed and printed for
//! diagnostics. The table remembers which states are terminal and which one
//! is the (single, fixed) initial state.

use crate::machine::MachineError;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state machine states.
///
/// Blanket-implemented for every `Clone + Eq + Hash + Debug` type, so strings,
/// integers, chars and plain enums can be used directly.
///
/// # Required Traits
///
/// - `Clone`: states are copied into transition events and snapshots
/// - `Eq` + `Hash`: states key the transition and callback tables
/// - `Debug`: states are rendered in errors and log fields
///
/// # Example
///
/// ```rust
/// use dfsm::core::State;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// fn accepts_state<S: State>(_state: S) {}
///
/// accepts_state(Door::Open);
/// accepts_state("locked");
/// accepts_state(3u8);
/// ```
pub trait State: Clone + Eq + Hash + Debug {}

impl<S: Clone + Eq + Hash + Debug> State for S {}

/// Registered states with their terminal flags and the initial state.
///
/// States are kept in registration order so that projections of the table
/// are deterministic.
#[derive(Clone, Debug)]
pub struct StateTable<S: State> {
    terminal: HashMap<S, bool>,
    order: Vec<S>,
    initial: Option<S>,
}

impl<S: State> Default for StateTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateTable<S> {
    /// Create an empty table with no initial state.
    pub fn new() -> Self {
        Self {
            terminal: HashMap::new(),
            order: Vec::new(),
            initial: None,
        }
    }

    /// Register a state.
    ///
    /// Fails with [`MachineError::DuplicateState`] if the state is already
    /// known and with [`MachineError::MultipleInitialStates`] if `is_initial`
    /// is set while another initial state exists. Nothing is recorded when
    /// either check fails.
    pub fn add(&mut self, state: S, is_terminal: bool, is_initial: bool) -> Result<(), MachineError> {
        if self.terminal.contains_key(&state) {
            return Err(MachineError::DuplicateState {
                state: format!("{state:?}"),
            });
        }
        if is_initial {
            if let Some(existing) = &self.initial {
                return Err(MachineError::MultipleInitialStates {
                    existing: format!("{existing:?}"),
                    rejected: format!("{state:?}"),
                });
            }
            self.initial = Some(state.clone());
        }
        self.terminal.insert(state.clone(), is_terminal);
        self.order.push(state);
        Ok(())
    }

    pub fn contains(&self, state: &S) -> bool {
        self.terminal.contains_key(state)
    }

    /// Terminal flag of a registered state.
    pub fn is_terminal(&self, state: &S) -> Result<bool, MachineError> {
        self.terminal
            .get(state)
            .copied()
            .ok_or_else(|| MachineError::UnknownState {
                state: format!("{state:?}"),
            })
    }

    /// Whether `state` is the initial state.
    pub fn is_initial(&self, state: &S) -> bool {
        self.initial.as_ref() == Some(state)
    }

    pub fn initial(&self) -> Option<&S> {
        self.initial.as_ref()
    }

    /// Fail with [`MachineError::UnknownState`] unless `state` is registered.
    pub fn require(&self, state: &S) -> Result<(), MachineError> {
        if self.contains(state) {
            Ok(())
        } else {
            Err(MachineError::UnknownState {
                state: format!("{state:?}"),
            })
        }
    }

    /// States with their terminal flags, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&S, bool)> + '_ {
        self.order
            .iter()
            .map(move |state| (state, self.terminal.get(state).copied().unwrap_or(false)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
