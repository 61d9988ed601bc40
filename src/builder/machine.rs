//! Builder for constructing machines.

use crate::core::{State, Symbol, Token};
use crate::machine::{Machine, MachineConfig, MachineError};
use std::marker::PhantomData;

enum Declaration<S, T> {
    State {
        state: S,
        is_terminal: bool,
        is_initial: bool,
    },
    Transition {
        from: S,
        to: S,
        token: Token<T>,
    },
}

/// Builder for constructing machines with a fluent API.
///
/// ```
/// use dfsm::MachineBuilder;
///
/// let mut machine = MachineBuilder::<&str, char>::new()
///     .initial("locked")
///     .state("unlocked")
///     .transition("locked", "unlocked", 'c')
///     .transition("unlocked", "locked", 'p')
///     .build()
///     .unwrap();
///
/// assert!(machine.feed('c').unwrap());
/// assert_eq!(machine.current_state(), Some(&"unlocked"));
/// ```
pub struct MachineBuilder<S: State, T: Symbol, P = ()> {
    declarations: Vec<Declaration<S, T>>,
    config: MachineConfig,
    has_initial: bool,
    _payload: PhantomData<fn(P)>,
}

impl<S: State, T: Symbol, P> MachineBuilder<S, T, P> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            declarations: Vec::new(),
            config: MachineConfig::default(),
            has_initial: false,
            _payload: PhantomData,
        }
    }

    fn declare_state(mut self, state: S, is_terminal: bool, is_initial: bool) -> Self {
        self.has_initial |= is_initial;
        self.declarations.push(Declaration::State {
            state,
            is_terminal,
            is_initial,
        });
        self
    }

    /// Declare a plain state.
    pub fn state(self, state: S) -> Self {
        self.declare_state(state, false, false)
    }

    /// Declare a terminal state.
    pub fn terminal(self, state: S) -> Self {
        self.declare_state(state, true, false)
    }

    /// Declare the initial state (required).
    pub fn initial(self, state: S) -> Self {
        self.declare_state(state, false, true)
    }

    /// Declare an initial state that is also terminal.
    pub fn initial_terminal(self, state: S) -> Self {
        self.declare_state(state, true, true)
    }

    /// Declare a transition on a concrete token or on [`Token::Any`].
    pub fn transition(mut self, from: S, to: S, token: impl Into<Token<T>>) -> Self {
        self.declarations.push(Declaration::Transition {
            from,
            to,
            token: token.into(),
        });
        self
    }

    /// Declare a wildcard transition.
    pub fn wildcard(self, from: S, to: S) -> Self {
        self.transition(from, to, Token::<T>::Any)
    }

    pub fn raise_on_invalid_token(mut self, raise: bool) -> Self {
        self.config.raise_on_invalid_token = raise;
        self
    }

    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the machine.
    ///
    /// Declarations are applied in the order they were made. Fails with
    /// [`MachineError::NoInitialState`] if no initial state was declared, or
    /// with the first error an `add_state`/`add_transition` call reports.
    pub fn build(self) -> Result<Machine<S, T, P>, MachineError> {
        if !self.has_initial {
            return Err(MachineError::NoInitialState);
        }

        let mut machine = Machine::with_config(self.config);
        for declaration in self.declarations {
            match declaration {
                Declaration::State {
                    state,
                    is_terminal,
                    is_initial,
                } => machine.add_state(state, is_terminal, is_initial)?,
                Declaration::Transition { from, to, token } => {
                    machine.add_transition(from, to, token)?
                }
            }
        }

        Ok(machine)
    }
}

impl<S: State, T: Symbol, P> Default for MachineBuilder<S, T, P> {
    fn default() -> Self {
        Self::new()
    }
}
