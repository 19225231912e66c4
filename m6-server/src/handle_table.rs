//! Statically bounded handle table
//!
//! Tracks the handles a server has handed out, in a buffer owned by the
//! caller. Nothing is allocated: the table never grows past the number of
//! handles that fit in the buffer it was built over, which makes it usable
//! in components that forbid dynamic allocation.
//!
//! # Example
//!
//! ```ignore
//! let mut slots = [0usize; 16];
//! let mut keys = HandleTable::from_slots(&mut slots, None)?;
//!
//! let mut key = Handle::NULL;
//! keys.add_on_success(crypto.import_key(&data, &mut key), key)?;
//!
//! // Later, before touching the key on behalf of a client:
//! let key = keys.validate(requested).ok_or(ServerError::InvalidHandle)?;
//! ```

use zerocopy::FromBytes;

use crate::error::{ServerError, ServerResult};
use crate::handle::{HANDLE_SIZE, Handle};
use crate::storage::{FixedSlots, HandleList};

/// Handle table over a caller-owned buffer.
pub struct HandleTable<'a> {
    list: HandleList<FixedSlots<'a>>,
}

impl<'a> HandleTable<'a> {
    /// Size in bytes of a buffer holding exactly `num_handles` handles.
    #[must_use]
    pub const fn buffer_size(num_handles: usize) -> usize {
        num_handles * HANDLE_SIZE
    }

    /// Create a table over a raw byte buffer.
    ///
    /// The buffer is used as an array of `buffer.len() / HANDLE_SIZE`
    /// handle slots; trailing bytes that do not form a whole slot are left
    /// untouched. Its previous contents are ignored.
    ///
    /// # Arguments
    /// * `buffer` - Backing memory, aligned for `usize`
    /// * `required` - Number of handles the caller needs room for, if any
    ///
    /// # Errors
    ///
    /// - [`ServerError::InsufficientSpace`] if `required` exceeds the
    ///   capacity of the buffer
    /// - [`ServerError::InvalidParameter`] if the buffer cannot hold a single
    ///   handle or is misaligned
    pub fn new(buffer: &'a mut [u8], required: Option<usize>) -> ServerResult<Self> {
        let capacity = buffer.len() / HANDLE_SIZE;
        Self::check_capacity(capacity, required)?;

        let (slots, _) = <[usize]>::mut_from_prefix_with_elems(buffer, capacity)
            .map_err(|_| ServerError::InvalidParameter)?;

        Ok(Self {
            list: HandleList::new(FixedSlots::new(slots)),
        })
    }

    /// Create a table over an array of handle slots.
    ///
    /// Same as [`new`](Self::new) for callers that already have typed
    /// storage.
    pub fn from_slots(slots: &'a mut [usize], required: Option<usize>) -> ServerResult<Self> {
        Self::check_capacity(slots.len(), required)?;

        Ok(Self {
            list: HandleList::new(FixedSlots::new(slots)),
        })
    }

    fn check_capacity(capacity: usize, required: Option<usize>) -> ServerResult<()> {
        if let Some(required) = required
            && required > capacity
        {
            return Err(ServerError::InsufficientSpace);
        }
        if capacity == 0 {
            return Err(ServerError::InvalidParameter);
        }
        Ok(())
    }

    /// Add a handle.
    ///
    /// # Errors
    ///
    /// - [`ServerError::InvalidParameter`] for the null handle
    /// - [`ServerError::OperationDenied`] if the handle is already present
    /// - [`ServerError::InsufficientSpace`] if the table is full
    pub fn add(&mut self, handle: Handle) -> ServerResult<()> {
        self.list.insert(handle)
    }

    /// Add a handle if `prior` succeeded.
    ///
    /// A failed `prior` is returned unchanged and the table is not touched.
    /// This lets the call that produces a handle and its registration be
    /// written as one expression:
    ///
    /// ```ignore
    /// table.add_on_success(open_file(path, &mut handle), handle)?;
    /// ```
    ///
    /// Arguments are evaluated left to right, so `handle` is read after the
    /// producing call has stored it.
    pub fn add_on_success<T>(&mut self, prior: ServerResult<T>, handle: Handle) -> ServerResult<T> {
        let value = prior?;
        self.add(handle)?;
        Ok(value)
    }

    /// Remove a handle.
    ///
    /// The last handle in the table takes the place of the removed one.
    ///
    /// # Errors
    ///
    /// - [`ServerError::InvalidParameter`] for the null handle
    /// - [`ServerError::InvalidHandle`] if the handle is not present
    pub fn remove(&mut self, handle: Handle) -> ServerResult<()> {
        self.list.remove(handle)
    }

    /// Remove a handle if `prior` succeeded.
    ///
    /// A failed `prior` is returned unchanged and the table is not touched.
    pub fn remove_on_success<T>(
        &mut self,
        prior: ServerResult<T>,
        handle: Handle,
    ) -> ServerResult<T> {
        let value = prior?;
        self.remove(handle)?;
        Ok(value)
    }

    /// Look up a handle.
    ///
    /// Returns `Some(handle)` if it is present, `None` otherwise (always
    /// `None` for the null handle).
    #[must_use]
    pub fn validate(&self, handle: Handle) -> Option<Handle> {
        self.list.validate(handle)
    }

    /// Maximum number of handles
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.list.storage().capacity()
    }

    /// Number of handles currently tracked
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Check if the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the table is full
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Iterate over the tracked handles, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = Handle> + '_ {
        self.list.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::IntoBytes;

    const NUM_SLOTS: usize = 10;

    fn h(raw: usize) -> Handle {
        Handle::from_raw(raw)
    }

    #[test]
    fn test_buffer_size() {
        assert_eq!(HandleTable::buffer_size(0), 0);
        assert_eq!(HandleTable::buffer_size(NUM_SLOTS), NUM_SLOTS * HANDLE_SIZE);
    }

    #[test]
    fn test_new_reports_capacity() {
        let mut words = [0usize; NUM_SLOTS];
        let table = HandleTable::new(words.as_mut_bytes(), None).unwrap();
        assert_eq!(table.capacity(), NUM_SLOTS);
        assert!(table.is_empty());
    }

    #[test]
    fn test_new_rounds_capacity_down() {
        let mut words = [0usize; NUM_SLOTS + 1];
        let bytes = words.as_mut_bytes();
        let len = HandleTable::buffer_size(NUM_SLOTS) + HANDLE_SIZE - 1;

        let table = HandleTable::new(&mut bytes[..len], Some(NUM_SLOTS)).unwrap();
        assert_eq!(table.capacity(), NUM_SLOTS);
    }

    #[test]
    fn test_new_rejects_excess_requirement() {
        let mut words = [0usize; NUM_SLOTS];
        assert!(matches!(
            HandleTable::new(words.as_mut_bytes(), Some(NUM_SLOTS + 1)),
            Err(ServerError::InsufficientSpace)
        ));

        let mut slots = [0usize; NUM_SLOTS];
        assert!(matches!(
            HandleTable::from_slots(&mut slots, Some(NUM_SLOTS + 1)),
            Err(ServerError::InsufficientSpace)
        ));
        assert!(HandleTable::from_slots(&mut slots, Some(NUM_SLOTS)).is_ok());
    }

    #[test]
    fn test_new_rejects_unusable_buffer() {
        let mut words = [0usize; 2];
        let bytes = words.as_mut_bytes();

        // Too small for one handle
        assert!(matches!(
            HandleTable::new(&mut bytes[..HANDLE_SIZE - 1], None),
            Err(ServerError::InvalidParameter)
        ));

        // Misaligned
        assert!(matches!(
            HandleTable::new(&mut bytes[1..], None),
            Err(ServerError::InvalidParameter)
        ));
    }

    #[test]
    fn test_new_ignores_stale_contents() {
        let mut words = [7usize; NUM_SLOTS];
        let table = HandleTable::new(words.as_mut_bytes(), None).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.validate(h(7)), None);
    }

    #[test]
    fn test_add_validate() {
        let mut slots = [0usize; NUM_SLOTS];
        let mut table = HandleTable::from_slots(&mut slots, None).unwrap();

        assert!(table.add(h(1)).is_ok());
        assert_eq!(table.validate(h(1)), Some(h(1)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_add_neg() {
        let mut slots = [0usize; NUM_SLOTS];
        let mut table = HandleTable::from_slots(&mut slots, None).unwrap();

        assert_eq!(table.add(Handle::NULL), Err(ServerError::InvalidParameter));
        assert!(table.add(h(1)).is_ok());
        assert_eq!(table.add(h(1)), Err(ServerError::OperationDenied));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_capacity_is_reusable() {
        let mut words = [0usize; NUM_SLOTS];
        let mut table = HandleTable::new(words.as_mut_bytes(), Some(NUM_SLOTS)).unwrap();

        for raw in 1..=NUM_SLOTS {
            assert!(table.add(h(raw)).is_ok());
        }
        assert!(table.is_full());
        assert_eq!(table.add(h(11)), Err(ServerError::InsufficientSpace));

        assert!(table.remove(h(1)).is_ok());
        assert!(table.add(h(1)).is_ok());
        assert!(table.is_full());

        for raw in 1..=NUM_SLOTS {
            assert_eq!(table.validate(h(raw)), Some(h(raw)));
        }
        assert_eq!(table.validate(h(11)), None);
    }

    #[test]
    fn test_add_on_success() {
        let mut slots = [0usize; NUM_SLOTS];
        let mut table = HandleTable::from_slots(&mut slots, None).unwrap();

        assert_eq!(table.add_on_success(Ok(5u8), h(1)), Ok(5));
        assert_eq!(table.validate(h(1)), Some(h(1)));

        // Failure passes through and leaves the table alone
        assert_eq!(
            table.add_on_success::<()>(Err(ServerError::Aborted), h(2)),
            Err(ServerError::Aborted)
        );
        assert_eq!(table.validate(h(2)), None);
        assert_eq!(table.len(), 1);

        assert_eq!(
            table.add_on_success(Ok(()), Handle::NULL),
            Err(ServerError::InvalidParameter)
        );
    }

    #[test]
    fn test_add_on_success_reads_produced_handle() {
        fn open(out: &mut Handle) -> ServerResult<()> {
            *out = Handle::from_raw(0x4000);
            Ok(())
        }

        let mut slots = [0usize; NUM_SLOTS];
        let mut table = HandleTable::from_slots(&mut slots, None).unwrap();

        let mut handle = Handle::NULL;
        assert!(table.add_on_success(open(&mut handle), handle).is_ok());
        assert_eq!(table.validate(h(0x4000)), Some(h(0x4000)));
    }

    #[test]
    fn test_remove() {
        let mut slots = [0usize; NUM_SLOTS];
        let mut table = HandleTable::from_slots(&mut slots, None).unwrap();

        assert_eq!(table.remove(Handle::NULL), Err(ServerError::InvalidParameter));
        assert_eq!(table.remove(h(1)), Err(ServerError::InvalidHandle));

        table.add(h(1)).unwrap();
        assert!(table.remove(h(1)).is_ok());
        assert_eq!(table.validate(h(1)), None);
        assert_eq!(table.remove(h(1)), Err(ServerError::InvalidHandle));
    }

    #[test]
    fn test_remove_on_success() {
        let mut slots = [0usize; NUM_SLOTS];
        let mut table = HandleTable::from_slots(&mut slots, None).unwrap();
        table.add(h(1)).unwrap();

        assert_eq!(
            table.remove_on_success::<()>(Err(ServerError::Aborted), h(1)),
            Err(ServerError::Aborted)
        );
        assert_eq!(table.validate(h(1)), Some(h(1)));

        assert_eq!(
            table.remove_on_success(Ok(()), Handle::NULL),
            Err(ServerError::InvalidParameter)
        );
        assert!(table.remove_on_success(Ok(()), h(1)).is_ok());
        assert_eq!(table.validate(h(1)), None);
    }

    #[test]
    fn test_iter() {
        let mut slots = [0usize; NUM_SLOTS];
        let mut table = HandleTable::from_slots(&mut slots, None).unwrap();
        for raw in 1..=3 {
            table.add(h(raw)).unwrap();
        }
        table.remove(h(2)).unwrap();

        let mut seen = [false; 4];
        for handle in table.iter() {
            seen[handle.raw()] = true;
        }
        assert_eq!(seen, [false, true, false, true]);
    }
}
