//! Explicit transaction engine for graphtx
//!
//! This crate drives one explicit transaction over one connection:
//! - [`ExplicitTransaction`]: blocking path, every exchange waits on the
//!   calling thread
//! - [`AsyncExplicitTransaction`]: non-blocking path, every exchange is a
//!   chain of completions resolved by reply callbacks
//!
//! Both share the same state machine (`graphtx_concurrency::TransactionState`)
//! and the same release-exactly-once contract: the connection is released and
//! the owning [`ResourcesHandler`] notified once, on the terminal transition,
//! whichever path produced it.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod handlers;
pub mod resources;
pub mod result;
pub mod transaction;

pub use resources::{NoOpResourcesHandler, ResourcesHandler, ResultResourcesHandler};
pub use result::{Record, ResultCursor, StatementResult};
pub use transaction::{AsyncExplicitTransaction, ExplicitTransaction};

pub use graphtx_concurrency::{PendingOp, TransactionState};
