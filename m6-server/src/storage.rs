//! Handle sequences
//!
//! Both handle tables keep their handles in an unordered sequence with
//! unique entries. The sequence logic (identity lookup, duplicate rejection
//! and swap-and-pop removal) lives in [`HandleList`]; the backing store is
//! either a caller-owned fixed buffer ([`FixedSlots`]) or a growable
//! `Vec`.
//!
//! # Removal
//!
//! Removal overwrites the removed entry with the last entry and shrinks the
//! sequence by one. This is O(1) but moves the last handle, so positions are
//! not stable across removals.

use crate::error::{ServerError, ServerResult};
use crate::handle::Handle;

/// Backing store for a handle sequence
pub(crate) trait HandleStorage {
    /// Live entries
    fn as_slice(&self) -> &[usize];

    /// Live entries, mutable
    fn as_mut_slice(&mut self) -> &mut [usize];

    /// Append an entry
    ///
    /// Fails with [`ServerError::InsufficientSpace`] if the store cannot grow.
    fn push(&mut self, raw: usize) -> ServerResult<()>;

    /// Drop the last entry
    fn pop(&mut self) -> Option<usize>;
}

/// Fixed-capacity store over a caller-owned slot array
pub(crate) struct FixedSlots<'a> {
    slots: &'a mut [usize],
    len: usize,
}

impl<'a> FixedSlots<'a> {
    pub(crate) fn new(slots: &'a mut [usize]) -> Self {
        Self { slots, len: 0 }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl HandleStorage for FixedSlots<'_> {
    fn as_slice(&self) -> &[usize] {
        &self.slots[..self.len]
    }

    fn as_mut_slice(&mut self) -> &mut [usize] {
        &mut self.slots[..self.len]
    }

    fn push(&mut self, raw: usize) -> ServerResult<()> {
        let slot = self
            .slots
            .get_mut(self.len)
            .ok_or(ServerError::InsufficientSpace)?;
        *slot = raw;
        self.len += 1;
        Ok(())
    }

    fn pop(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(core::mem::take(&mut self.slots[self.len]))
    }
}

#[cfg(feature = "alloc")]
impl HandleStorage for alloc::vec::Vec<usize> {
    fn as_slice(&self) -> &[usize] {
        self
    }

    fn as_mut_slice(&mut self) -> &mut [usize] {
        self
    }

    fn push(&mut self, raw: usize) -> ServerResult<()> {
        self.try_reserve(1)
            .map_err(|_| ServerError::InsufficientSpace)?;
        alloc::vec::Vec::push(self, raw);
        Ok(())
    }

    fn pop(&mut self) -> Option<usize> {
        alloc::vec::Vec::pop(self)
    }
}

/// Unordered sequence of unique handles
pub(crate) struct HandleList<S> {
    storage: S,
}

impl<S: HandleStorage> HandleList<S> {
    pub(crate) fn new(storage: S) -> Self {
        Self { storage }
    }

    pub(crate) fn storage(&self) -> &S {
        &self.storage
    }

    /// Position of a handle, by identity
    fn position(&self, handle: Handle) -> Option<usize> {
        self.storage
            .as_slice()
            .iter()
            .position(|&raw| raw == handle.raw())
    }

    /// Add a handle
    pub(crate) fn insert(&mut self, handle: Handle) -> ServerResult<()> {
        if handle.is_null() {
            return Err(ServerError::InvalidParameter);
        }
        if self.position(handle).is_some() {
            log::debug!("rejected duplicate handle {}", handle);
            return Err(ServerError::OperationDenied);
        }
        self.storage.push(handle.raw())
    }

    /// Remove a handle by swapping in the last entry
    pub(crate) fn remove(&mut self, handle: Handle) -> ServerResult<()> {
        if handle.is_null() {
            return Err(ServerError::InvalidParameter);
        }
        let index = self.position(handle).ok_or(ServerError::InvalidHandle)?;

        let entries = self.storage.as_mut_slice();
        let last = entries.len() - 1;
        entries[index] = entries[last];
        self.storage.pop();

        Ok(())
    }

    /// Return `handle` if present
    pub(crate) fn validate(&self, handle: Handle) -> Option<Handle> {
        if handle.is_null() {
            return None;
        }
        self.position(handle).map(|_| handle)
    }

    pub(crate) fn len(&self) -> usize {
        self.storage.as_slice().len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = Handle> + '_ {
        self.storage.as_slice().iter().map(|&raw| Handle::from_raw(raw))
    }
}
