//! Explicit transactions
//!
//! An explicit transaction is opened with BEGIN, runs any number of
//! statements and ends with COMMIT or ROLLBACK, all on one connection.
//!
//! # Lifecycle
//!
//! | State | `success()` | `failure()` | statement fails (recoverable / fatal) | close sends |
//! |-------|-------------|-------------|----------------------------------------|-------------|
//! | ACTIVE | MARKED_SUCCESS | MARKED_FAILED | MARKED_FAILED / FAILED | ROLLBACK |
//! | MARKED_SUCCESS | - | MARKED_FAILED | MARKED_FAILED / FAILED | COMMIT, ROLLBACK if it fails |
//! | MARKED_FAILED | - | - | - / FAILED | ROLLBACK |
//! | FAILED | - | - | - | nothing |
//! | COMMITTED | - | - | - | nothing |
//! | ROLLED_BACK | - | - | - | nothing |
//!
//! Whatever the close path, the transaction ends COMMITTED or ROLLED_BACK,
//! its connection is released once and its owner is notified once.
//!
//! Two front-ends share this machinery:
//! - [`ExplicitTransaction`] over a blocking [`graphtx_wire::Connection`]
//! - [`AsyncExplicitTransaction`] over a non-blocking [`graphtx_wire::AsyncConnection`]

mod blocking;
mod nonblocking;
mod shared;

pub use blocking::ExplicitTransaction;
pub use nonblocking::AsyncExplicitTransaction;
pub(crate) use shared::TransactionCore;
