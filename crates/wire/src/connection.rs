//! Connection facades
//!
//! The transaction layer talks to exactly one connection for its whole life
//! and releases it exactly once. Two flavors exist:
//!
//! - [`Connection`]: blocking. `sync()` waits on the calling thread until every
//!   queued reply has been delivered.
//! - [`AsyncConnection`]: non-blocking. Requests are queued, `flush()` hands
//!   them to the transport, and replies reach the handlers later on the
//!   connection's executor.
//!
//! Both deliver replies in request order.

use crate::handler::ResponseHandler;
use graphtx_core::{Params, Result};

/// Blocking connection
pub trait Connection: Send {
    /// Queue a RUN request
    fn run(
        &mut self,
        statement: &str,
        parameters: Params,
        handler: Box<dyn ResponseHandler>,
    ) -> Result<()>;

    /// Queue a PULL_ALL request
    fn pull_all(&mut self, handler: Box<dyn ResponseHandler>) -> Result<()>;

    /// Write queued requests to the transport without waiting for replies
    fn flush(&mut self) -> Result<()>;

    /// Flush and block until all outstanding replies are delivered
    ///
    /// Returns the first FAILURE received since the previous sync, if any.
    fn sync(&mut self) -> Result<()>;

    /// Whether the transport is still usable
    fn is_open(&self) -> bool;

    /// Give the connection back to its owner (pool or session)
    fn release(&mut self);
}

/// Non-blocking connection
///
/// Methods take `&self`; implementations synchronize internally and must not
/// hold internal locks while invoking handlers.
pub trait AsyncConnection: Send + Sync {
    /// Queue a RUN request
    fn run(&self, statement: &str, parameters: Params, handler: Box<dyn ResponseHandler>);

    /// Queue a PULL_ALL request
    fn pull_all(&self, handler: Box<dyn ResponseHandler>);

    /// Hand queued requests to the transport
    fn flush(&self);

    /// Whether the transport is still usable
    fn is_open(&self) -> bool;

    /// Give the connection back to its owner (pool or session)
    fn release(&self);
}
