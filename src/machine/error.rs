//! Errors raised by machine operations.

use crate::callbacks::{CallbackError, Handle};
use thiserror::Error;

/// Errors that can occur when building or driving a machine.
///
/// States and tokens are carried in their `Debug` rendering so the error
/// type does not depend on the machine's type parameters.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("State {state} already exists")]
    DuplicateState { state: String },

    #[error("State {state} does not exist")]
    UnknownState { state: String },

    #[error("There is already an initial state {existing}, cannot make {rejected} initial")]
    MultipleInitialStates { existing: String, rejected: String },

    #[error("A transition {from} --({token})--> ... already exists")]
    DuplicateTransition { from: String, token: String },

    #[error("A transition {from} --({token})--> ... does not exist")]
    UnknownTransition { from: String, token: String },

    #[error("Invalid token {token} in state {state}")]
    InvalidToken { state: String, token: String },

    #[error("No initial state available. Add a state with is_initial set before feeding")]
    NoInitialState,

    #[error("Handle {handle} is not bound")]
    UnknownHandle { handle: Handle },

    #[error("Got {payloads} payloads for {tokens} tokens")]
    PayloadCountMismatch { tokens: usize, payloads: usize },

    #[error("Callback {handle} failed: {source}")]
    Callback {
        handle: Handle,
        #[source]
        source: CallbackError,
    },
}
