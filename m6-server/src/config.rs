//! Registry limits and configuration

use crate::error::{ServerError, ServerResult};

/// Minimum number of client contexts a [`ContextMgr`] can manage.
///
/// [`ContextMgr`]: crate::ContextMgr
pub const CONTEXTS_MIN: usize = 1;

/// Maximum number of client contexts a [`ContextMgr`] can manage.
///
/// The bound keeps the linear slot scan short. It can be raised without
/// other changes as long as the component has the memory for it.
///
/// [`ContextMgr`]: crate::ContextMgr
pub const CONTEXTS_MAX: usize = 1024;

/// What happens to a claimed slot when the context `init` callback fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InitFailurePolicy {
    /// Keep the slot claimed by the client, without a context.
    ///
    /// Later requests from that client fail with
    /// [`ServerError::Aborted`] and the slot stays unusable until teardown.
    #[default]
    Retain,
    /// Return the slot to the free pool.
    ///
    /// Later requests from that client retry the allocation.
    Rollback,
}

/// Context manager configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextMgrConfig {
    /// Number of client slots (fixed for the lifetime of the manager)
    pub max_contexts: usize,
    /// Slot handling on context allocation failure
    pub init_failure: InitFailurePolicy,
}

impl ContextMgrConfig {
    /// Configuration for `max_contexts` slots with the default policy.
    #[must_use]
    pub const fn new(max_contexts: usize) -> Self {
        Self {
            max_contexts,
            init_failure: InitFailurePolicy::Retain,
        }
    }

    /// Replace the init failure policy.
    #[must_use]
    pub const fn with_init_failure(mut self, policy: InitFailurePolicy) -> Self {
        self.init_failure = policy;
        self
    }

    /// Check the slot count against [`CONTEXTS_MIN`]..=[`CONTEXTS_MAX`].
    pub const fn validate(&self) -> ServerResult<()> {
        if self.max_contexts < CONTEXTS_MIN || self.max_contexts > CONTEXTS_MAX {
            return Err(ServerError::InvalidParameter);
        }
        Ok(())
    }
}
