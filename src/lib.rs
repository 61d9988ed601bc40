//! dfsm: a deterministic finite state machine with observer callbacks
//!
//! A [`Machine`] is built from states and transitions, then driven one token
//! at a time. Every accepted token fires the callbacks bound to the states and
//! transitions involved, so the machine can be used as a streaming matcher or
//! as the skeleton of an event-driven workflow.
//!
//! # Core Concepts
//!
//! - **States**: any `Clone + Eq + Hash + Debug` value, flagged terminal and/or initial
//! - **Tokens**: any `Clone + Eq + Hash + Debug` value, plus the [`Token::Any`] wildcard
//! - **Callbacks**: closures bound to a [`Trigger`], removable by [`Handle`]
//! - **Checkpoints**: callback-free snapshots as JSON or binary
//!
//! # Example
//!
//! ```rust
//! use dfsm::MachineBuilder;
//! use std::sync::{Arc, Mutex};
//!
//! let mut machine = MachineBuilder::<&str, char>::new()
//!     .initial("x")
//!     .state("o")
//!     .state("m")
//!     .terminal("g")
//!     .transition("x", "o", 'o')
//!     .transition("o", "m", 'm')
//!     .transition("m", "g", 'g')
//!     .wildcard("x", "x")
//!     .wildcard("o", "x")
//!     .wildcard("m", "x")
//!     .wildcard("g", "x")
//!     .build()
//!     .unwrap();
//!
//! let seen = Arc::new(Mutex::new(0));
//! let counter = Arc::clone(&seen);
//! machine.bind_enter_terminal(move |_| *counter.lock().unwrap() += 1);
//!
//! machine.feed_many("so omg, omg!".chars()).unwrap();
//! assert_eq!(*seen.lock().unwrap(), 2);
//! ```

pub mod builder;
pub mod callbacks;
pub mod checkpoint;
pub mod core;
pub mod machine;

// Re-export commonly used types
pub use builder::MachineBuilder;
pub use callbacks::{CallbackError, GlobalTrigger, Handle, Trigger};
pub use checkpoint::{Checkpoint, CheckpointError, Snapshot};
pub use core::{State, Symbol, Token, TransitionEvent};
pub use machine::{Machine, MachineConfig, MachineError};
