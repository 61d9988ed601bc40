//! Core automaton types.
//!
//! This module contains the table side of the machine:
//! - States and the state table (terminal flags, the initial state)
//! - Tokens, including the wildcard key
//! - The transition table and its two-tier lookup
//! - The event value passed to callbacks
//!
//! Nothing here runs callbacks or keeps counters; that is the job of
//! [`Machine`](crate::machine::Machine).

mod event;
mod state;
mod token;
mod transition;

pub use event::TransitionEvent;
pub use state::{State, StateTable};
pub use token::{Symbol, Token};
pub use transition::{Resolution, TransitionTable};
