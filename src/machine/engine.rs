//! The feed/dispatch engine.

use super::config::MachineConfig;
use super::error::MachineError;
use crate::callbacks::{
    boxed, CallbackOutcome, CallbackRegistry, DispatchGuards, GlobalTrigger, Handle, Trigger,
};
use crate::core::{Resolution, State, StateTable, Symbol, Token, TransitionEvent, TransitionTable};
use tracing::{debug, trace};

/// Deterministic finite state machine.
///
/// `S` is the state type, `T` the token type and `P` an optional payload
/// passed through to callbacks untouched.
///
/// # Example
///
/// ```rust
/// use dfsm::machine::Machine;
///
/// let mut machine: Machine<u8, u8> = Machine::new();
/// machine.add_state(0, true, true).unwrap();
/// machine.add_state(1, false, false).unwrap();
/// machine.add_transition(0, 1, 1).unwrap();
/// machine.add_transition(1, 0, 1).unwrap();
///
/// assert_eq!(machine.feed_many([1, 1, 7]).unwrap(), vec![true, true, false]);
/// assert_eq!(machine.current_state(), Some(&0));
/// assert_eq!(machine.feed_count(), 3);
/// assert_eq!(machine.transition_count(), 2);
/// ```
pub struct Machine<S: State, T: Symbol, P = ()> {
    pub(crate) states: StateTable<S>,
    pub(crate) transitions: TransitionTable<S, T>,
    callbacks: CallbackRegistry<S, T, P>,
    pub(crate) current: Option<S>,
    pub(crate) feed_count: u64,
    pub(crate) transition_count: u64,
    pub(crate) config: MachineConfig,
}

impl<S: State, T: Symbol, P> Default for Machine<S, T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, T: Symbol, P> Machine<S, T, P> {
    /// Create an empty machine that returns `false` for unmatched tokens.
    pub fn new() -> Self {
        Self::with_config(MachineConfig::default())
    }

    pub fn with_config(config: MachineConfig) -> Self {
        Self {
            states: StateTable::new(),
            transitions: TransitionTable::new(),
            callbacks: CallbackRegistry::new(),
            current: None,
            feed_count: 0,
            transition_count: 0,
            config,
        }
    }

    pub fn config(&self) -> MachineConfig {
        self.config
    }

    /// Add a state to the machine.
    ///
    /// An initial state also becomes the current state. Fails with
    /// [`MachineError::DuplicateState`] or
    /// [`MachineError::MultipleInitialStates`].
    pub fn add_state(
        &mut self,
        state: S,
        is_terminal: bool,
        is_initial: bool,
    ) -> Result<(), MachineError> {
        self.states.add(state.clone(), is_terminal, is_initial)?;
        if is_initial {
            self.current = Some(state.clone());
        }
        debug!(?state, is_terminal, is_initial, "state added");
        self.callbacks.register_state(state);
        Ok(())
    }

    pub fn has_state(&self, state: &S) -> bool {
        self.states.contains(state)
    }

    /// Terminal flag of a state, [`MachineError::UnknownState`] if unknown.
    pub fn is_terminal(&self, state: &S) -> Result<bool, MachineError> {
        self.states.is_terminal(state)
    }

    /// Add a transition `from --token--> to`.
    ///
    /// `token` is either a symbol or [`Token::Any`] for the wildcard
    /// fallback.
    pub fn add_transition(
        &mut self,
        from: S,
        to: S,
        token: impl Into<Token<T>>,
    ) -> Result<(), MachineError> {
        self.states.require(&from)?;
        self.states.require(&to)?;
        let key = token.into();
        debug!(?from, ?to, token = %key, "transition added");
        self.transitions.insert(from.clone(), key.clone(), to)?;
        self.callbacks.register_transition(from, key);
        Ok(())
    }

    /// Add a wildcard transition, taken for any token without an exact
    /// transition out of `from`.
    pub fn add_wildcard_transition(&mut self, from: S, to: S) -> Result<(), MachineError> {
        self.add_transition(from, to, Token::Any)
    }

    pub fn has_transition(&self, from: &S, token: impl Into<Token<T>>) -> bool {
        self.transitions.contains(from, &token.into())
    }

    /// Feed a token without payload. See [`feed_with`](Self::feed_with).
    pub fn feed(&mut self, token: T) -> Result<bool, MachineError> {
        self.feed_inner(token, None)
    }

    /// Feed a token and a payload for the callbacks.
    ///
    /// Returns `Ok(true)` when a transition fired and `Ok(false)` when the
    /// token matched nothing (unless the machine is configured to raise
    /// [`MachineError::InvalidToken`]). The feed count grows on every call
    /// that gets past the initial-state check, the transition count only on
    /// matches.
    ///
    /// Counters are updated before callbacks run; the current state is
    /// committed only after every callback returned successfully. A failing
    /// callback therefore leaves the machine in the exited state with the
    /// counters already advanced.
    pub fn feed_with(&mut self, token: T, payload: P) -> Result<bool, MachineError> {
        self.feed_inner(token, Some(payload))
    }

    fn feed_inner(&mut self, token: T, payload: Option<P>) -> Result<bool, MachineError> {
        let current = self.current.clone().ok_or(MachineError::NoInitialState)?;
        self.feed_count += 1;

        let (key, next) = match self.transitions.resolve(&current, &token) {
            Resolution::Matched { key, target } => (key, target.clone()),
            Resolution::Unmatched => {
                trace!(state = ?current, ?token, feed_count = self.feed_count, "token rejected");
                if self.config.raise_on_invalid_token {
                    return Err(MachineError::InvalidToken {
                        state: format!("{current:?}"),
                        token: format!("{token:?}"),
                    });
                }
                return Ok(false);
            }
        };

        self.transition_count += 1;
        let guards = DispatchGuards {
            exit_terminal: self.states.is_terminal(&current)?,
            exit_initial: self.states.is_initial(&current),
            enter_terminal: self.states.is_terminal(&next)?,
            enter_initial: self.states.is_initial(&next),
        };
        trace!(from = ?current, to = ?next, token = %key, "transition");

        let event = TransitionEvent::new(
            current,
            next,
            key,
            guards.enter_terminal,
            self.feed_count,
            self.transition_count,
            payload,
        );
        self.callbacks.dispatch(&event, guards)?;
        self.current = Some(event.entered_state().clone());
        Ok(true)
    }

    /// Feed tokens in order, returning one match flag per token.
    ///
    /// Stops at the first error; earlier feeds stay applied.
    pub fn feed_many<I>(&mut self, tokens: I) -> Result<Vec<bool>, MachineError>
    where
        I: IntoIterator<Item = T>,
    {
        tokens.into_iter().map(|token| self.feed(token)).collect()
    }

    /// Feed tokens paired with payloads.
    ///
    /// Both sequences must have the same length; otherwise
    /// [`MachineError::PayloadCountMismatch`] is returned before anything
    /// is fed.
    pub fn feed_many_with<I, J>(&mut self, tokens: I, payloads: J) -> Result<Vec<bool>, MachineError>
    where
        I: IntoIterator<Item = T>,
        J: IntoIterator<Item = P>,
    {
        let tokens: Vec<T> = tokens.into_iter().collect();
        let payloads: Vec<P> = payloads.into_iter().collect();
        if tokens.len() != payloads.len() {
            return Err(MachineError::PayloadCountMismatch {
                tokens: tokens.len(),
                payloads: payloads.len(),
            });
        }
        tokens
            .into_iter()
            .zip(payloads)
            .map(|(token, payload)| self.feed_with(token, payload))
            .collect()
    }

    /// Return to the initial state and zero both counters.
    ///
    /// States, transitions and callback bindings are kept.
    pub fn reset(&mut self) {
        self.current = self.states.initial().cloned();
        self.feed_count = 0;
        self.transition_count = 0;
        debug!("machine reset");
    }

    /// The current state, `None` until an initial state was added.
    pub fn current_state(&self) -> Option<&S> {
        self.current.as_ref()
    }

    pub fn initial_state(&self) -> Option<&S> {
        self.states.initial()
    }

    /// Whether the current state is terminal.
    pub fn is_terminated(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|state| self.states.is_terminal(state).unwrap_or(false))
    }

    /// Whether the current state is the initial state.
    pub fn is_initial(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|state| self.states.is_initial(state))
    }

    pub fn feed_count(&self) -> u64 {
        self.feed_count
    }

    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    /// Number of registered states.
    pub fn state_amount(&self) -> usize {
        self.states.len()
    }

    /// Number of registered transitions, wildcards included.
    pub fn transition_amount(&self) -> usize {
        self.transitions.len()
    }

    pub fn raise_on_invalid_token(&self) -> bool {
        self.config.raise_on_invalid_token
    }

    /// Bind a callback to any trigger.
    pub fn bind<F, R>(&mut self, trigger: Trigger<S, T>, callback: F) -> Result<Handle, MachineError>
    where
        F: FnMut(&TransitionEvent<S, T, P>) -> R + Send + 'static,
        R: CallbackOutcome,
    {
        self.callbacks.bind(&trigger, boxed(callback))
    }

    /// Unbind a callback from the trigger it was bound to.
    pub fn unbind(&mut self, trigger: Trigger<S, T>, handle: Handle) -> Result<(), MachineError> {
        self.callbacks.unbind(&trigger, handle)
    }

    /// Number of callbacks bound to a trigger.
    pub fn bound_count(&self, trigger: Trigger<S, T>) -> Result<usize, MachineError> {
        self.callbacks.bound_count(&trigger)
    }

    fn bind_global<F, R>(&mut self, trigger: GlobalTrigger, callback: F) -> Handle
    where
        F: FnMut(&TransitionEvent<S, T, P>) -> R + Send + 'static,
        R: CallbackOutcome,
    {
        self.callbacks.bind_global(trigger, boxed(callback))
    }

    /// Bind a callback to entering `state`.
    pub fn bind_enter<F, R>(&mut self, state: S, callback: F) -> Result<Handle, MachineError>
    where
        F: FnMut(&TransitionEvent<S, T, P>) -> R + Send + 'static,
        R: CallbackOutcome,
    {
        self.bind(Trigger::Enter(state), callback)
    }

    pub fn unbind_enter(&mut self, state: S, handle: Handle) -> Result<(), MachineError> {
        self.unbind(Trigger::Enter(state), handle)
    }

    /// Bind a callback to leaving `state`.
    pub fn bind_exit<F, R>(&mut self, state: S, callback: F) -> Result<Handle, MachineError>
    where
        F: FnMut(&TransitionEvent<S, T, P>) -> R + Send + 'static,
        R: CallbackOutcome,
    {
        self.bind(Trigger::Exit(state), callback)
    }

    pub fn unbind_exit(&mut self, state: S, handle: Handle) -> Result<(), MachineError> {
        self.unbind(Trigger::Exit(state), handle)
    }

    /// Bind a callback to the transition keyed by `(from, token)`.
    ///
    /// Use [`Token::Any`] to observe the wildcard transition of `from`.
    pub fn bind_transition<F, R>(
        &mut self,
        from: S,
        token: impl Into<Token<T>>,
        callback: F,
    ) -> Result<Handle, MachineError>
    where
        F: FnMut(&TransitionEvent<S, T, P>) -> R + Send + 'static,
        R: CallbackOutcome,
    {
        self.bind(Trigger::Transition(from, token.into()), callback)
    }

    pub fn unbind_transition(
        &mut self,
        from: S,
        token: impl Into<Token<T>>,
        handle: Handle,
    ) -> Result<(), MachineError> {
        self.unbind(Trigger::Transition(from, token.into()), handle)
    }

    /// Bind a callback to entering any terminal state.
    pub fn bind_enter_terminal<F, R>(&mut self, callback: F) -> Handle
    where
        F: FnMut(&TransitionEvent<S, T, P>) -> R + Send + 'static,
        R: CallbackOutcome,
    {
        self.bind_global(GlobalTrigger::EnterTerminal, callback)
    }

    pub fn unbind_enter_terminal(&mut self, handle: Handle) -> Result<(), MachineError> {
        self.unbind(Trigger::EnterTerminal, handle)
    }

    /// Bind a callback to leaving any terminal state.
    pub fn bind_exit_terminal<F, R>(&mut self, callback: F) -> Handle
    where
        F: FnMut(&TransitionEvent<S, T, P>) -> R + Send + 'static,
        R: CallbackOutcome,
    {
        self.bind_global(GlobalTrigger::ExitTerminal, callback)
    }

    pub fn unbind_exit_terminal(&mut self, handle: Handle) -> Result<(), MachineError> {
        self.unbind(Trigger::ExitTerminal, handle)
    }

    /// Bind a callback to entering the initial state.
    pub fn bind_enter_initial<F, R>(&mut self, callback: F) -> Handle
    where
        F: FnMut(&TransitionEvent<S, T, P>) -> R + Send + 'static,
        R: CallbackOutcome,
    {
        self.bind_global(GlobalTrigger::EnterInitial, callback)
    }

    pub fn unbind_enter_initial(&mut self, handle: Handle) -> Result<(), MachineError> {
        self.unbind(Trigger::EnterInitial, handle)
    }

    /// Bind a callback to leaving the initial state.
    pub fn bind_exit_initial<F, R>(&mut self, callback: F) -> Handle
    where
        F: FnMut(&TransitionEvent<S, T, P>) -> R + Send + 'static,
        R: CallbackOutcome,
    {
        self.bind_global(GlobalTrigger::ExitInitial, callback)
    }

    pub fn unbind_exit_initial(&mut self, handle: Handle) -> Result<(), MachineError> {
        self.unbind(Trigger::ExitInitial, handle)
    }

    /// Bind a callback to every transition.
    pub fn bind_always<F, R>(&mut self, callback: F) -> Handle
    where
        F: FnMut(&TransitionEvent<S, T, P>) -> R + Send + 'static,
        R: CallbackOutcome,
    {
        self.bind_global(GlobalTrigger::Always, callback)
    }

    pub fn unbind_always(&mut self, handle: Handle) -> Result<(), MachineError> {
        self.unbind(Trigger::Always, handle)
    }
}
