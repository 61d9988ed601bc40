//! Ordered handle -> callback map.

use super::{BoxedCallback, CallbackError, Handle};
use std::collections::BTreeMap;

/// Callbacks of one trigger.
///
/// Handles increase monotonically, so iterating the map in key order is
/// iterating in bind order.
pub(crate) struct Bucket<E> {
    callbacks: BTreeMap<Handle, BoxedCallback<E>>,
}

impl<E> Default for Bucket<E> {
    fn default() -> Self {
        Self {
            callbacks: BTreeMap::new(),
        }
    }
}

impl<E> Bucket<E> {
    pub(crate) fn insert(&mut self, handle: Handle, callback: BoxedCallback<E>) {
        self.callbacks.insert(handle, callback);
    }

    /// Remove a callback; `false` if the handle is not bound here.
    pub(crate) fn remove(&mut self, handle: Handle) -> bool {
        self.callbacks.remove(&handle).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Run every callback in bind order, stopping at the first error.
    pub(crate) fn invoke(&mut self, event: &E) -> Result<(), (Handle, CallbackError)> {
        for (handle, callback) in self.callbacks.iter_mut() {
            callback(event).map_err(|source| (*handle, source))?;
        }
        Ok(())
    }
}
