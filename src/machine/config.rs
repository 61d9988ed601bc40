//! Machine configuration.

use serde::{Deserialize, Serialize};

/// Behavioral switches of a [`Machine`](super::Machine).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Treat a token with no matching transition as an error
    /// ([`MachineError::InvalidToken`](super::MachineError::InvalidToken))
    /// instead of returning `false` from `feed`.
    pub raise_on_invalid_token: bool,
}

impl MachineConfig {
    /// Configuration that rejects unmatched tokens with an error.
    pub fn strict() -> Self {
        Self {
            raise_on_invalid_token: true,
        }
    }
}
