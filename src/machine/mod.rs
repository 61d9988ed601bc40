//! The machine: tables, counters and callback dispatch in one place.
//!
//! A [`Machine`] owns its state table, transition table and callback
//! registry. It is driven with [`Machine::feed`] and friends; every call
//! runs to completion, callbacks included, before returning.
//!
//! A machine is not synchronized. Mutating calls take `&mut self`; share one
//! across threads only behind a lock.

mod config;
mod engine;
mod error;

pub use config::MachineConfig;
pub use engine::Machine;
pub use error::MachineError;
