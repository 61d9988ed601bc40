//! Input tokens and the wildcard key.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::hash::Hash;

/// Trait for input symbols fed to a machine.
///
/// Like [`State`](super::State), this is blanket-implemented for every
/// `Clone + Eq + Hash + Debug` type.
pub trait Symbol: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> Symbol for T {}

/// Key of a transition: either a concrete symbol or the wildcard.
///
/// `Any` matches every symbol that has no concrete transition out of the
/// current state. When it fires, `Any` itself (not the fed symbol) is the
/// token reported in the [`TransitionEvent`](super::TransitionEvent).
///
/// # Example
///
/// ```rust
/// use dfsm::core::Token;
///
/// let exact: Token<char> = 'a'.into();
/// assert_eq!(exact, Token::Exact('a'));
/// assert!(Token::<char>::Any.is_wildcard());
/// assert_eq!(exact.exact(), Some(&'a'));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Token<T> {
    /// Matches exactly this symbol.
    Exact(T),
    /// Matches any symbol not otherwise mapped.
    Any,
}

impl<T> Token<T> {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// The concrete symbol, or `None` for the wildcard.
    pub fn exact(&self) -> Option<&T> {
        match self {
            Self::Exact(symbol) => Some(symbol),
            Self::Any => None,
        }
    }
}

impl<T> From<T> for Token<T> {
    fn from(symbol: T) -> Self {
        Self::Exact(symbol)
    }
}

impl<T: Debug> fmt::Display for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(symbol) => write!(f, "{symbol:?}"),
            Self::Any => f.write_str("*"),
        }
    }
}
