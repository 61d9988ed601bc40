//! Builder API for ergonomic machine construction.
//!
//! [`MachineBuilder`] collects state and transition declarations and replays
//! them through the machine's own operations on [`MachineBuilder::build`], so
//! a builder reports exactly the errors the equivalent `add_*` calls would.

pub mod machine;

pub use machine::MachineBuilder;
