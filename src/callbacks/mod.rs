//! Observer callbacks and their registry.
//!
//! Callbacks are grouped into buckets by [`Trigger`]. Every bind returns a
//! [`Handle`] drawn from one counter per registry, so handles are never
//! reused, even across buckets or after an unbind.
//!
//! # Dispatch order
//!
//! For a transition `A --K--> B` the registry invokes, in order:
//!
//! 1. `Always`
//! 2. `Exit(A)`
//! 3. `Transition(A, K)`
//! 4. `Enter(B)`
//! 5. `ExitTerminal` if `A` is terminal, `ExitInitial` if `A` is initial,
//!    `EnterTerminal` if `B` is terminal, `EnterInitial` if `B` is initial
//!
//! Inside a bucket callbacks run in the order they were bound. The first
//! callback error stops dispatch.

mod bucket;
mod registry;

pub use registry::{CallbackRegistry, DispatchGuards};

use crate::core::Token;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error type returned by fallible callbacks.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Type-erased callback stored in a bucket.
pub type BoxedCallback<E> = Box<dyn FnMut(&E) -> Result<(), CallbackError> + Send>;

/// Identifier of a bound callback.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Handle(u64);

impl Handle {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Return values a callback may produce.
///
/// Implemented for `()` (infallible callbacks) and for `Result<(), E>` where
/// `E` converts into a [`CallbackError`].
pub trait CallbackOutcome {
    fn into_result(self) -> Result<(), CallbackError>;
}

impl CallbackOutcome for () {
    fn into_result(self) -> Result<(), CallbackError> {
        Ok(())
    }
}

impl<E: Into<CallbackError>> CallbackOutcome for Result<(), E> {
    fn into_result(self) -> Result<(), CallbackError> {
        self.map_err(Into::into)
    }
}

/// Box a user callback into the stored form.
pub(crate) fn boxed<E, F, R>(mut callback: F) -> BoxedCallback<E>
where
    F: FnMut(&E) -> R + Send + 'static,
    R: CallbackOutcome,
{
    Box::new(move |event| callback(event).into_result())
}

/// The bucket a callback is bound to.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Trigger<S, T> {
    /// Entering the given state.
    Enter(S),
    /// Leaving the given state.
    Exit(S),
    /// Taking the transition keyed by `(from, token)`.
    Transition(S, Token<T>),
    /// Entering any terminal state.
    EnterTerminal,
    /// Leaving any terminal state.
    ExitTerminal,
    /// Entering the initial state.
    EnterInitial,
    /// Leaving the initial state.
    ExitInitial,
    /// Every transition.
    Always,
}

/// The buckets that do not depend on a particular state or transition.
///
/// Binding to these cannot fail.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum GlobalTrigger {
    EnterTerminal,
    ExitTerminal,
    EnterInitial,
    ExitInitial,
    Always,
}

impl<S, T> From<GlobalTrigger> for Trigger<S, T> {
    fn from(trigger: GlobalTrigger) -> Self {
        match trigger {
            GlobalTrigger::EnterTerminal => Self::EnterTerminal,
            GlobalTrigger::ExitTerminal => Self::ExitTerminal,
            GlobalTrigger::EnterInitial => Self::EnterInitial,
            GlobalTrigger::ExitInitial => Self::ExitInitial,
            GlobalTrigger::Always => Self::Always,
        }
    }
}
