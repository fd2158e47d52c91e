//! Response handler contract
//!
//! Every request is paired with one handler. The connection invokes the
//! handler with the reply to that request, in request order:
//!
//! ```text
//! on_record*  then exactly one of  on_success | on_failure
//! ```
//!
//! A connection that discards a handler without a reply (for example because
//! the socket died) simply drops it. Handlers that own a completion must treat
//! drop as failure; see `graphtx_concurrency::Completion`.

use crate::message::Metadata;
use graphtx_core::{Error, Value};

/// Observer of the reply to a single request
///
/// Handlers are invoked on whatever thread the connection delivers replies
/// on. They may issue further requests on the same connection from inside a
/// callback.
pub trait ResponseHandler: Send {
    /// The request succeeded
    fn on_success(&mut self, metadata: Metadata);

    /// The request failed, or was ignored after an earlier failure
    fn on_failure(&mut self, error: Error);

    /// One result record (PULL_ALL only)
    fn on_record(&mut self, _fields: Vec<Value>) {}
}

/// Handler that ignores every reply
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpResponseHandler;

impl ResponseHandler for NoOpResponseHandler {
    fn on_success(&mut self, _metadata: Metadata) {}

    fn on_failure(&mut self, _error: Error) {}
}

impl NoOpResponseHandler {
    /// Boxed instance, ready to hand to a connection
    pub fn boxed() -> Box<dyn ResponseHandler> {
        Box::new(NoOpResponseHandler)
    }
}
