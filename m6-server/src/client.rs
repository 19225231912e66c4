//! Client identity
//!
//! RPC servers on M6 tell callers apart by the badge of the endpoint
//! capability a request arrives on. The server mints one badged endpoint
//! per client, so the badge doubles as a stable client ID for the lifetime
//! of the component.

use core::fmt;

/// Identity of an RPC client.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ClientId(u32);

impl ClientId {
    /// Create a client ID from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for ClientId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Debug for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientId({})", self.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CID={}", self.0)
    }
}
