//! Scoped auto-commit switching.
//!
//! [`AutoCommitGuard::disable`] records the store's current auto-commit mode
//! and turns it off. The previous mode comes back when the guard is restored
//! or dropped, whichever happens first, so early returns via `?` still leave
//! the connection the way the caller handed it over.

use std::ops::{Deref, DerefMut};

use super::{Store, StoreError};

/// Holds a store in manual-commit mode for the guard's lifetime.
pub struct AutoCommitGuard<'a, S: Store + ?Sized> {
    store: &'a mut S,
    previous: bool,
    restored: bool,
}

impl<'a, S: Store + ?Sized> AutoCommitGuard<'a, S> {
    /// Turn auto-commit off, remembering the current mode.
    pub fn disable(store: &'a mut S) -> Result<Self, StoreError> {
        let previous = store.auto_commit()?;
        let guard = Self {
            store,
            previous,
            restored: false,
        };
        guard.store.set_auto_commit(false)?;
        Ok(guard)
    }

    /// The mode that will be restored.
    pub fn previous(&self) -> bool {
        self.previous
    }

    /// Restore the previous mode now, surfacing any failure.
    pub fn restore(mut self) -> Result<(), StoreError> {
        self.restored = true;
        self.store.set_auto_commit(self.previous)
    }
}

impl<S: Store + ?Sized> Deref for AutoCommitGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.store
    }
}

impl<S: Store + ?Sized> DerefMut for AutoCommitGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.store
    }
}

impl<S: Store + ?Sized> Drop for AutoCommitGuard<'_, S> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(err) = self.store.set_auto_commit(self.previous) {
            tracing::warn!(error = %err, previous = self.previous, "Failed to restore auto-commit mode");
        }
    }
}
