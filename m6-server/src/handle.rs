//! Opaque resource handles
//!
//! A handle is a pointer-sized value a server hands out to its clients to
//! name a resource (a key, an open file, a session). The registries only
//! ever compare handles for identity; they never dereference them.

use core::fmt;

/// Opaque pointer-sized handle.
///
/// # Null Handle
///
/// A handle of zero (`Handle::NULL`) names no resource. It is rejected by
/// every mutating table operation and never validates.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Handle(usize);

/// Size of a handle in bytes.
pub const HANDLE_SIZE: usize = core::mem::size_of::<Handle>();

impl Handle {
    /// Null handle (no resource).
    pub const NULL: Self = Self(0);

    /// Create a handle from its raw value.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Create a handle from the address of a resource.
    #[inline]
    #[must_use]
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr as usize)
    }

    /// Get the raw value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> usize {
        self.0
    }

    /// Check if this is the null handle.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Handle::NULL")
        } else {
            write!(f, "Handle({:#x})", self.0)
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "{:#x}", self.0)
        }
    }
}
