//! Transition table with wildcard fallback.

use super::state::State;
use super::token::{Symbol, Token};
use crate::machine::MachineError;
use std::collections::HashMap;

/// Outcome of looking up a symbol from a state.
#[derive(Debug, PartialEq)]
pub enum Resolution<'a, S, T> {
    /// A transition fired. `key` is the key that matched, which is
    /// `Token::Any` when the wildcard was used.
    Matched { key: Token<T>, target: &'a S },
    /// Neither an exact nor a wildcard transition exists.
    Unmatched,
}

/// Mapping `(from, key) -> to`.
///
/// Rows are keyed by the source state so resolving a token takes two hash lookups at
/// most: the exact key, then the wildcard.
#[derive(Clone, Debug)]
pub struct TransitionTable<S: State, T: Symbol> {
    rows: HashMap<S, HashMap<Token<T>, S>>,
    order: Vec<(S, Token<T>)>,
}

impl<S: State, T: Symbol> Default for TransitionTable<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, T: Symbol> TransitionTable<S, T> {
    pub fn new() -> Self {
        Self {
            rows: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Store a transition.
    ///
    /// Endpoint validation is the caller's job (the table does not know the
    /// registered states); this only rejects a second mapping for the same
    /// `(from, key)` with [`MachineError::DuplicateTransition`].
    pub fn insert(&mut self, from: S, key: Token<T>, to: S) -> Result<(), MachineError> {
        let row = self.rows.entry(from.clone()).or_default();
        if row.contains_key(&key) {
            return Err(MachineError::DuplicateTransition {
                from: format!("{from:?}"),
                token: key.to_string(),
            });
        }
        row.insert(key.clone(), to);
        self.order.push((from, key));
        Ok(())
    }

    /// Resolve `symbol` fed while in `from`.
    ///
    /// An exact transition always takes precedence over the wildcard.
    pub fn resolve(&self, from: &S, symbol: &T) -> Resolution<'_, S, T> {
        let Some(row) = self.rows.get(from) else {
            return Resolution::Unmatched;
        };

        let key = Token::Exact(symbol.clone());
        if let Some(target) = row.get(&key) {
            return Resolution::Matched { key, target };
        }

        match row.get(&Token::Any) {
            Some(target) => Resolution::Matched {
                key: Token::Any,
                target,
            },
            None => Resolution::Unmatched,
        }
    }

    pub fn contains(&self, from: &S, key: &Token<T>) -> bool {
        self.rows.get(from).is_some_and(|row| row.contains_key(key))
    }

    pub fn target(&self, from: &S, key: &Token<T>) -> Option<&S> {
        self.rows.get(from).and_then(|row| row.get(key))
    }

    /// Transitions as `(from, key, to)`, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&S, &Token<T>, &S)> + '_ {
        self.order.iter().filter_map(move |(from, key)| {
            self.target(from, key).map(|to| (from, key, to))
        })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
