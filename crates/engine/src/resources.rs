//! Callbacks between a transaction and its owners

use graphtx_core::{Error, TransactionId};

/// Owner of a transaction's connection (session or pool)
///
/// Notified exactly once per transaction, after its connection has been
/// released. Sessions use this to forget the transaction.
pub trait ResourcesHandler: Send + Sync {
    /// The transaction reached a terminal state and gave its connection back
    fn on_transaction_closed(&self, tx: TransactionId);
}

/// Owner that does not track its transactions
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpResourcesHandler;

impl ResourcesHandler for NoOpResourcesHandler {
    fn on_transaction_closed(&self, _tx: TransactionId) {}
}

/// Receiver of result-stream outcomes
///
/// Result handlers report here once per statement: `result_fetched` when the
/// stream completed, `result_failed` when the statement failed.
pub trait ResultResourcesHandler: Send + Sync {
    /// The statement's results were fully received
    fn result_fetched(&self);

    /// The statement failed
    fn result_failed(&self, error: &Error);
}
