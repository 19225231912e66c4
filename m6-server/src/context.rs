//! Per-client context manager
//!
//! RPC servers are driven by a stateless dispatch loop: each request only
//! carries the caller's [`ClientId`]. The [`ContextMgr`] maps that ID to a
//! per-client context which is allocated lazily, the first time the client
//! is seen, through a [`ContextFactory`] supplied by the server.
//!
//! # Slots
//!
//! The manager owns a fixed array of slots sized at construction. A client
//! claims a slot on its first request and keeps it until the manager is torn
//! down; there is no per-client release. When every slot is claimed, new
//! clients are refused with [`ServerError::InsufficientSpace`]; existing
//! clients are never evicted.
//!
//! # Example
//!
//! ```ignore
//! let mut contexts = ContextMgr::new(SessionFactory, 8)?;
//!
//! // In the dispatch loop:
//! let session = contexts.get(ClientId::new(badge as u32))?;
//! session.requests += 1;
//! ```

use alloc::vec::Vec;

use crate::client::ClientId;
use crate::config::{ContextMgrConfig, InitFailurePolicy};
use crate::error::{ServerError, ServerResult};

/// Allocation callbacks for client contexts.
///
/// Implemented by the server to build and destroy the state it keeps per
/// client. Both callbacks are invoked synchronously from within
/// [`ContextMgr::get`] and [`ContextMgr::teardown`].
pub trait ContextFactory {
    /// Per-client state
    type Context;

    /// Create the context for a client seen for the first time.
    fn init(&mut self, cid: ClientId) -> ServerResult<Self::Context>;

    /// Destroy a client context during teardown.
    ///
    /// A failure is logged and does not stop the remaining contexts from
    /// being released.
    fn free(&mut self, cid: ClientId, ctx: Self::Context) -> ServerResult<()>;
}

/// Client slot state
enum ClientSlot<C> {
    /// Unused
    Free,
    /// Claimed by a client whose context allocation failed
    Claimed(ClientId),
    /// Claimed and holding the client's context
    Ready { cid: ClientId, ctx: C },
}

impl<C> ClientSlot<C> {
    fn owner(&self) -> Option<ClientId> {
        match self {
            Self::Free => None,
            Self::Claimed(cid) | Self::Ready { cid, .. } => Some(*cid),
        }
    }

    fn context(&self) -> Option<&C> {
        match self {
            Self::Ready { ctx, .. } => Some(ctx),
            _ => None,
        }
    }

    fn context_mut(&mut self) -> Option<&mut C> {
        match self {
            Self::Ready { ctx, .. } => Some(ctx),
            _ => None,
        }
    }
}

/// Lazily allocating registry of per-client contexts.
pub struct ContextMgr<F: ContextFactory> {
    factory: F,
    slots: Vec<ClientSlot<F::Context>>,
    init_failure: InitFailurePolicy,
}

impl<F: ContextFactory> ContextMgr<F> {
    /// Create a manager with `max_contexts` slots.
    ///
    /// No context is allocated until [`get`](Self::get) is called.
    ///
    /// # Errors
    ///
    /// - [`ServerError::InvalidParameter`] if `max_contexts` is outside
    ///   [`CONTEXTS_MIN`](crate::config::CONTEXTS_MIN)..=[`CONTEXTS_MAX`](crate::config::CONTEXTS_MAX)
    /// - [`ServerError::InsufficientSpace`] if the slot array cannot be allocated
    pub fn new(factory: F, max_contexts: usize) -> ServerResult<Self> {
        Self::with_config(factory, ContextMgrConfig::new(max_contexts))
    }

    /// Create a manager from a full configuration.
    pub fn with_config(factory: F, config: ContextMgrConfig) -> ServerResult<Self> {
        config.validate()?;

        let mut slots = Vec::new();
        if slots.try_reserve_exact(config.max_contexts).is_err() {
            log::error!("failed to allocate {} client slots", config.max_contexts);
            return Err(ServerError::InsufficientSpace);
        }
        slots.resize_with(config.max_contexts, || ClientSlot::Free);

        Ok(Self {
            factory,
            slots,
            init_failure: config.init_failure,
        })
    }

    /// Get the context of a client, allocating it on first use.
    ///
    /// Repeated calls for the same client return the same context without
    /// invoking the factory again.
    ///
    /// # Errors
    ///
    /// - [`ServerError::InsufficientSpace`] if the client is new and every
    ///   slot is claimed
    /// - the error of [`ContextFactory::init`] if the allocation fails
    /// - [`ServerError::Aborted`] if an earlier allocation for this client
    ///   failed under [`InitFailurePolicy::Retain`]
    pub fn get(&mut self, cid: ClientId) -> ServerResult<&mut F::Context> {
        let mut owned = None;
        let mut free = None;

        for (index, slot) in self.slots.iter().enumerate() {
            match slot.owner() {
                Some(owner) if owner == cid => {
                    owned = Some(index);
                    break;
                }
                Some(_) => {}
                None => {
                    if free.is_none() {
                        free = Some(index);
                    }
                }
            }
        }

        if let Some(index) = owned {
            return match self.slots[index].context_mut() {
                Some(ctx) => Ok(ctx),
                None => {
                    log::error!("client ({}) holds a slot without context", cid);
                    Err(ServerError::Aborted)
                }
            };
        }

        let Some(index) = free else {
            log::error!("could not find free context slot for client ({})", cid);
            return Err(ServerError::InsufficientSpace);
        };

        self.slots[index] = ClientSlot::Claimed(cid);

        match self.factory.init(cid) {
            Ok(ctx) => {
                log::debug!("allocated context for client ({}) in slot {}", cid, index);
                self.slots[index] = ClientSlot::Ready { cid, ctx };
                self.slots[index].context_mut().ok_or(ServerError::Aborted)
            }
            Err(err) => {
                log::error!("init() callback failed on client ({}) with {}", cid, err);
                if self.init_failure == InitFailurePolicy::Rollback {
                    self.slots[index] = ClientSlot::Free;
                }
                Err(err)
            }
        }
    }

    /// Look up the context of a known client without allocating.
    #[must_use]
    pub fn find(&self, cid: ClientId) -> Option<&F::Context> {
        self.slots
            .iter()
            .find(|slot| slot.owner() == Some(cid))
            .and_then(|slot| slot.context())
    }

    /// Number of slots
    #[must_use]
    pub fn max_contexts(&self) -> usize {
        self.slots.len()
    }

    /// Number of claimed slots
    #[must_use]
    pub fn active(&self) -> usize {
        self.slots.iter().filter(|slot| slot.owner().is_some()).count()
    }

    /// Get the factory.
    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Release every client context and the slot array.
    ///
    /// Calls [`ContextFactory::free`] once for each allocated context.
    /// Callback failures are logged and skipped.
    pub fn teardown(mut self) {
        let released = self.release_all();
        self.slots = Vec::new();
        log::debug!("context manager torn down, released {} contexts", released);
    }

    fn release_all(&mut self) -> usize {
        let mut released = 0;

        for slot in self.slots.iter_mut() {
            if let ClientSlot::Ready { cid, ctx } = core::mem::replace(slot, ClientSlot::Free) {
                if let Err(err) = self.factory.free(cid, ctx) {
                    log::error!(
                        "free() callback failed on client ({}) with {}, continuing",
                        cid,
                        err
                    );
                }
                released += 1;
            }
        }

        released
    }
}

impl<F: ContextFactory> Drop for ContextMgr<F> {
    fn drop(&mut self) {
        self.release_all();
    }
}
