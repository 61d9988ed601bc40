//! The record handed to callbacks for one transition.

use super::token::Token;

/// Immutable description of a single completed transition.
///
/// One event is built per matched feed and every callback dispatched for that
/// transition sees the same instance. Counts are cumulative since the last
/// reset and already include the feed that produced the event.
///
/// # Example
///
/// ```rust
/// use dfsm::core::Token;
/// use dfsm::machine::Machine;
///
/// let mut machine: Machine<&str, char, u32> = Machine::new();
/// machine.add_state("idle", false, true).unwrap();
/// machine.add_state("done", true, false).unwrap();
/// machine.add_transition("idle", "done", 'g').unwrap();
///
/// machine
///     .bind_enter_terminal(|event| {
///         assert_eq!(event.exited_state(), &"idle");
///         assert_eq!(event.entered_state(), &"done");
///         assert_eq!(event.token(), &Token::Exact('g'));
///         assert_eq!(event.payload(), Some(&7));
///     });
///
/// assert!(machine.feed_with('g', 7).unwrap());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionEvent<S, T, P = ()> {
    entered_state: S,
    exited_state: S,
    token: Token<T>,
    entered_state_is_terminal: bool,
    feed_count: u64,
    transition_count: u64,
    payload: Option<P>,
}

impl<S, T, P> TransitionEvent<S, T, P> {
    pub(crate) fn new(
        exited_state: S,
        entered_state: S,
        token: Token<T>,
        entered_state_is_terminal: bool,
        feed_count: u64,
        transition_count: u64,
        payload: Option<P>,
    ) -> Self {
        Self {
            entered_state,
            exited_state,
            token,
            entered_state_is_terminal,
            feed_count,
            transition_count,
            payload,
        }
    }

    /// The state entered by the transition.
    pub fn entered_state(&self) -> &S {
        &self.entered_state
    }

    /// The state left by the transition.
    pub fn exited_state(&self) -> &S {
        &self.exited_state
    }

    /// The key that matched: the fed symbol, or `Token::Any` if the wildcard
    /// transition fired.
    pub fn token(&self) -> &Token<T> {
        &self.token
    }

    pub fn entered_state_is_terminal(&self) -> bool {
        self.entered_state_is_terminal
    }

    /// Number of feeds so far, this one included.
    pub fn feed_count(&self) -> u64 {
        self.feed_count
    }

    /// Number of transitions so far, this one included.
    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }
}
