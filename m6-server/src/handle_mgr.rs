//! Multi-category handle manager
//!
//! A server that hands out several kinds of handles (e.g. key handles and
//! file handles) keeps one list per kind. Lists are addressed by a category
//! ID in `0..categories` fixed at construction and grow on demand.
//!
//! Unlike [`HandleTable`](crate::HandleTable), an invalid category is a
//! parameter error for the mutating operations, while
//! [`validate`](HandleMgr::validate) simply resolves it to `None`.

use alloc::vec::Vec;

use crate::error::{ServerError, ServerResult};
use crate::handle::Handle;
use crate::storage::HandleList;

/// Per-category handle lists.
pub struct HandleMgr {
    lists: Vec<HandleList<Vec<usize>>>,
}

impl HandleMgr {
    /// Create a manager with `categories` empty lists.
    ///
    /// # Errors
    ///
    /// - [`ServerError::InvalidParameter`] if `categories` is zero
    /// - [`ServerError::InsufficientSpace`] if the lists cannot be allocated
    pub fn new(categories: usize) -> ServerResult<Self> {
        if categories == 0 {
            return Err(ServerError::InvalidParameter);
        }

        let mut lists = Vec::new();
        lists
            .try_reserve_exact(categories)
            .map_err(|_| ServerError::InsufficientSpace)?;

        for _ in 0..categories {
            // Pre-size each list for one handle
            let mut storage = Vec::new();
            storage
                .try_reserve(1)
                .map_err(|_| ServerError::InsufficientSpace)?;
            lists.push(HandleList::new(storage));
        }

        Ok(Self { lists })
    }

    fn list_mut(&mut self, id: usize) -> ServerResult<&mut HandleList<Vec<usize>>> {
        self.lists.get_mut(id).ok_or(ServerError::InvalidParameter)
    }

    /// Add a handle to category `id`.
    ///
    /// # Errors
    ///
    /// - [`ServerError::InvalidParameter`] for an unknown category or the
    ///   null handle
    /// - [`ServerError::OperationDenied`] if the handle is already in the
    ///   category
    /// - [`ServerError::InsufficientSpace`] if the list cannot grow
    pub fn add(&mut self, id: usize, handle: Handle) -> ServerResult<()> {
        self.list_mut(id)?.insert(handle)
    }

    /// Add a handle to category `id` if `prior` succeeded.
    ///
    /// A failed `prior` is returned unchanged and no list is touched.
    pub fn add_on_success<T>(
        &mut self,
        id: usize,
        prior: ServerResult<T>,
        handle: Handle,
    ) -> ServerResult<T> {
        let value = prior?;
        self.add(id, handle)?;
        Ok(value)
    }

    /// Remove a handle from category `id`.
    ///
    /// # Errors
    ///
    /// - [`ServerError::InvalidParameter`] for an unknown category or the
    ///   null handle
    /// - [`ServerError::InvalidHandle`] if the handle is not in the category
    pub fn remove(&mut self, id: usize, handle: Handle) -> ServerResult<()> {
        self.list_mut(id)?.remove(handle)
    }

    /// Remove a handle from category `id` if `prior` succeeded.
    ///
    /// A failed `prior` is returned unchanged and no list is touched.
    pub fn remove_on_success<T>(
        &mut self,
        id: usize,
        prior: ServerResult<T>,
        handle: Handle,
    ) -> ServerResult<T> {
        let value = prior?;
        self.remove(id, handle)?;
        Ok(value)
    }

    /// Look up a handle in category `id`.
    ///
    /// Returns `None` for an absent handle, the null handle or an unknown
    /// category.
    #[must_use]
    pub fn validate(&self, id: usize, handle: Handle) -> Option<Handle> {
        self.lists.get(id)?.validate(handle)
    }

    /// Number of categories
    #[must_use]
    pub fn categories(&self) -> usize {
        self.lists.len()
    }

    /// Number of handles in category `id` (zero for an unknown category)
    #[must_use]
    pub fn len(&self, id: usize) -> usize {
        self.lists.get(id).map_or(0, |list| list.len())
    }

    /// Iterate over the handles of category `id`, in no particular order.
    pub fn iter(&self, id: usize) -> impl Iterator<Item = Handle> + '_ {
        self.lists.get(id).into_iter().flat_map(|list| list.iter())
    }
}
