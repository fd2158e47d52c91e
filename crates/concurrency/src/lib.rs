//! Concurrency layer for graphtx
//!
//! This crate holds the I/O-free pieces both execution paths share:
//! - [`TransactionState`]: the pure lifecycle state machine
//! - [`AtomicState`]: the single shared state cell
//! - [`Completion`] / [`PendingOp`]: exactly-once continuations and the
//!   awaitable handle they resolve
//! - [`on_completion`] / [`fallback`]: combinators used to compose
//!   commit, rollback and finalization

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod completion;
pub mod state;

pub use completion::{fallback, on_completion, pending, Completion, PendingOp};
pub use state::{AtomicState, TransactionState};
