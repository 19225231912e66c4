//! M6 RPC Server Registries
//!
//! Bookkeeping for userspace RPC servers on the M6 microkernel. A server's
//! dispatch loop is stateless: every request arrives with the caller's
//! badge and a few message words. This crate provides the two tables such a
//! server needs to tie requests back to per-caller state.
//!
//! # Components
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`ContextMgr`] | One lazily allocated context per client, in a fixed number of slots |
//! | [`HandleTable`] | Set of live handles in a caller-owned buffer (no allocation) |
//! | [`HandleMgr`] | Per-category sets of live handles, growable |
//!
//! The components are independent; a server uses whichever it needs.
//!
//! # Handles
//!
//! A [`Handle`] is an opaque pointer-sized value. The tables compare handles
//! by identity only and never dereference them, so what a handle refers to
//! and how long it lives is up to the server. Each table rejects duplicates,
//! and removal swaps the last handle into the freed position, so the order
//! of handles in a table is unspecified.
//!
//! # Errors
//!
//! All fallible operations return [`ServerResult`]. Parameters are checked
//! before any state is touched, and capacity errors are never retried
//! internally. `validate` on the handle tables cannot fail: anything that is
//! not a tracked handle resolves to `None`.
//!
//! # Concurrency
//!
//! No internal locking. Mutating operations take `&mut self`; a server that
//! shares a table between threads wraps it in its own lock.
//!
//! # Optional Features
//!
//! - `alloc` (default): heap-backed [`ContextMgr`] and [`HandleMgr`]

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "alloc")]
extern crate alloc;

mod client;
pub mod config;
mod error;
mod handle;
mod handle_table;
mod storage;

#[cfg(feature = "alloc")]
mod context;

#[cfg(feature = "alloc")]
mod handle_mgr;

pub use client::ClientId;
pub use config::{CONTEXTS_MAX, CONTEXTS_MIN, ContextMgrConfig, InitFailurePolicy};
pub use error::{STATUS_SUCCESS, ServerError, ServerResult, status_code};
pub use handle::{HANDLE_SIZE, Handle};
pub use handle_table::HandleTable;

#[cfg(feature = "alloc")]
pub use context::{ContextFactory, ContextMgr};

#[cfg(feature = "alloc")]
pub use handle_mgr::HandleMgr;
