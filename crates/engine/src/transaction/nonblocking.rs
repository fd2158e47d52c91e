//! Non-blocking execution path
//!
//! Nothing here waits. Each operation queues its requests immediately, hands
//! the reply handler a [`Completion`] and returns a [`PendingOp`]. The
//! completion chain for a terminal operation looks like:
//!
//! ```text
//! COMMIT reply ──► CommitTxResponseHandler (bookmark, COMMITTED)
//!              ──► fallback (ROLLBACK on failure, close_async only)
//!              ──► closed (finalize, release, notify)
//!              ──► PendingOp
//! ```
//!
//! Because requests are sent eagerly, the connection is released and the
//! owner notified even if the caller never awaits the returned handle.

use super::TransactionCore;
use crate::handlers::{
    BeginTxResponseHandler, CommitTxResponseHandler, PullAllResponseHandler,
    RollbackTxResponseHandler, RunResponseHandler,
};
use crate::resources::{ResourcesHandler, ResultResourcesHandler};
use crate::result::ResultCursor;
use graphtx_concurrency::{
    fallback, on_completion, pending, Completion, PendingOp, TransactionState,
};
use graphtx_config::TransactionConfig;
use graphtx_core::{Bookmark, Error, Params, Result, TransactionId};
use graphtx_wire::{AsyncConnection, NoOpResponseHandler, BEGIN, COMMIT, ROLLBACK};
use std::sync::Arc;
use tracing::{debug, warn};

/// Explicit transaction over a non-blocking connection
///
/// Cheap to clone; clones share the same transaction.
pub struct AsyncExplicitTransaction<C: AsyncConnection + 'static> {
    inner: Arc<Inner<C>>,
}

struct Inner<C: AsyncConnection + 'static> {
    core: Arc<TransactionCore>,
    connection: Arc<C>,
    session: Arc<dyn ResourcesHandler>,
}

impl<C: AsyncConnection + 'static> AsyncExplicitTransaction<C> {
    /// Open a transaction on `connection`
    ///
    /// Without a bookmark BEGIN is only queued and the handle is already
    /// resolved. With a bookmark BEGIN is flushed and the handle resolves
    /// once the server acknowledged it. A failed BEGIN releases the
    /// connection and notifies `session` before the handle fails.
    pub fn begin(
        connection: Arc<C>,
        session: Arc<dyn ResourcesHandler>,
        config: &TransactionConfig,
    ) -> PendingOp<Self> {
        let tx = Self {
            inner: Arc::new(Inner {
                core: Arc::new(TransactionCore::new()),
                connection,
                session,
            }),
        };
        debug!(tx_id = %tx.id(), bookmark = %config.bookmark, "beginning transaction");

        let connection = &tx.inner.connection;
        connection.run(BEGIN, config.begin_parameters(), NoOpResponseHandler::boxed());
        if config.bookmark.is_empty() {
            connection.pull_all(NoOpResponseHandler::boxed());
            return PendingOp::completed(tx);
        }

        let (done, op) = pending();
        let began = tx.clone();
        let acknowledged = Completion::new(move |result: Result<()>| match result {
            Ok(()) => done.complete(Ok(began)),
            Err(error) => {
                debug!(tx_id = %began.id(), %error, "BEGIN failed");
                began.inner.core.mark_failed();
                if began.inner.core.claim_close() {
                    began.inner.release_resources(&Err(error.clone()));
                }
                done.complete(Err(error));
            }
        });
        connection.pull_all(Box::new(BeginTxResponseHandler::new(acknowledged)));
        connection.flush();
        op
    }

    /// Transaction id, used in logs and in the closed notification
    pub fn id(&self) -> TransactionId {
        self.inner.core.id()
    }

    /// Current lifecycle state
    pub fn state(&self) -> TransactionState {
        self.inner.core.state()
    }

    /// True until the transaction committed or rolled back
    pub fn is_open(&self) -> bool {
        self.inner.core.is_open()
    }

    /// Mark the transaction to be committed on close
    pub fn success(&self) {
        self.inner.core.mark_success();
    }

    /// Mark the transaction to be rolled back on close
    pub fn failure(&self) {
        self.inner.core.mark_failure();
    }

    /// Latest bookmark, updated by a successful commit
    pub fn bookmark(&self) -> Bookmark {
        self.inner.core.bookmark()
    }

    /// Replace the bookmark; an empty bookmark is ignored
    pub fn set_bookmark(&self, bookmark: Bookmark) {
        self.inner.core.set_bookmark(bookmark);
    }

    /// Queue a statement and return its cursor
    ///
    /// Fails with a usage error unless the transaction is ACTIVE or
    /// MARKED_SUCCESS. Statement failures arrive later, through the cursor
    /// and through the transaction's state.
    pub fn run_async(&self, statement: &str, parameters: Params) -> Result<ResultCursor> {
        let core = &self.inner.core;
        core.ensure_accepts_statements()?;

        let cursor = ResultCursor::new(statement);
        let resources: Arc<dyn ResultResourcesHandler> = core.clone();
        let connection = &self.inner.connection;
        connection.run(
            statement,
            parameters,
            Box::new(RunResponseHandler::new(cursor.clone(), Arc::clone(&resources))),
        );
        connection.pull_all(Box::new(PullAllResponseHandler::new(cursor.clone(), resources)));
        connection.flush();
        Ok(cursor)
    }

    /// Commit the transaction
    ///
    /// Resolves immediately if the transaction already ended. A FAILED
    /// transaction is not sent anywhere: it ends ROLLED_BACK and the handle
    /// fails with a usage error.
    pub fn commit_async(&self) -> PendingOp<()> {
        if let Err(op) = self.claim() {
            return op;
        }
        let (done, op) = pending();
        let done = self.inner.closed(done);
        match self.state() {
            TransactionState::Failed => done.complete(Err(Error::usage(
                "Cannot commit this transaction, because it has been terminated by a previous \
                 failure and rolled back.",
            ))),
            TransactionState::Committed | TransactionState::RolledBack => done.complete(Ok(())),
            _ => self.inner.commit(done),
        }
        op
    }

    /// Roll the transaction back
    ///
    /// Resolves immediately if the transaction already ended. A FAILED
    /// transaction ends ROLLED_BACK without network traffic.
    pub fn rollback_async(&self) -> PendingOp<()> {
        if let Err(op) = self.claim() {
            return op;
        }
        let (done, op) = pending();
        let done = self.inner.closed(done);
        match self.state() {
            TransactionState::Failed
            | TransactionState::Committed
            | TransactionState::RolledBack => done.complete(Ok(())),
            _ => self.inner.rollback(done),
        }
        op
    }

    /// Commit if marked with `success()`, roll back otherwise
    ///
    /// A failed commit is followed by a rollback; the handle then fails with
    /// the commit error.
    pub fn close_async(&self) -> PendingOp<()> {
        if let Err(op) = self.claim() {
            return op;
        }
        let (done, op) = pending();
        let done = self.inner.closed(done);
        let state = self.state();
        debug!(tx_id = %self.id(), %state, "closing transaction");
        match state {
            TransactionState::MarkedSuccess => {
                let inner = Arc::clone(&self.inner);
                self.inner
                    .commit(fallback(done, move |rolled_back| inner.rollback(rolled_back)));
            }
            TransactionState::Active | TransactionState::MarkedFailed => self.inner.rollback(done),
            TransactionState::Failed
            | TransactionState::Committed
            | TransactionState::RolledBack => done.complete(Ok(())),
        }
        op
    }

    /// Become the one terminal operation, or get the handle late callers see
    fn claim(&self) -> std::result::Result<(), PendingOp<()>> {
        let core = &self.inner.core;
        if core.claim_close() {
            return Ok(());
        }
        if core.is_open() {
            Err(PendingOp::failed(Error::usage(
                "Transaction is already being committed or rolled back",
            )))
        } else {
            Err(PendingOp::completed(()))
        }
    }
}

impl<C: AsyncConnection + 'static> Inner<C> {
    /// Attach release and notification to `done`
    fn closed(self: &Arc<Self>, done: Completion<()>) -> Completion<()> {
        let inner = Arc::clone(self);
        on_completion(done, move |outcome| inner.release_resources(outcome))
    }

    fn commit(&self, done: Completion<()>) {
        self.connection.run(COMMIT, Params::new(), NoOpResponseHandler::boxed());
        self.connection.pull_all(Box::new(CommitTxResponseHandler::new(
            Arc::clone(&self.core),
            done,
        )));
        self.connection.flush();
    }

    fn rollback(&self, done: Completion<()>) {
        self.connection.run(ROLLBACK, Params::new(), NoOpResponseHandler::boxed());
        self.connection.pull_all(Box::new(RollbackTxResponseHandler::new(
            Arc::clone(&self.core),
            done,
        )));
        self.connection.flush();
    }

    fn release_resources(&self, outcome: &Result<()>) {
        release_resources(&self.core, &*self.connection, &*self.session, outcome);
    }
}

fn release_resources<C: AsyncConnection>(
    core: &TransactionCore,
    connection: &C,
    session: &dyn ResourcesHandler,
    outcome: &Result<()>,
) {
    core.finalize(TransactionState::RolledBack);
    connection.release();
    session.on_transaction_closed(core.id());
    let tx_id = core.id();
    let state = core.state();
    match outcome {
        Ok(()) => debug!(%tx_id, %state, "transaction closed, connection released"),
        Err(error) => {
            debug!(%tx_id, %state, %error, "transaction closed after error, connection released")
        }
    }
}

/// An open transaction dropped without a terminal call is rolled back. The
/// ROLLBACK is only queued; release and notification follow its reply.
impl<C: AsyncConnection + 'static> Drop for Inner<C> {
    fn drop(&mut self) {
        if !self.core.is_open() || !self.core.claim_close() {
            return;
        }
        let state = self.core.state();
        warn!(
            tx_id = %self.core.id(),
            %state,
            "transaction dropped without commit or rollback, rolling back"
        );
        if state == TransactionState::Failed {
            self.release_resources(&Ok(()));
            return;
        }

        let core = Arc::clone(&self.core);
        let connection = Arc::clone(&self.connection);
        let session = Arc::clone(&self.session);
        let done = Completion::new(move |outcome: Result<()>| {
            if let Err(error) = &outcome {
                warn!(tx_id = %core.id(), %error, "rollback of dropped transaction failed");
            }
            release_resources(&core, &*connection, &*session, &outcome);
        });
        self.rollback(done);
    }
}

impl<C: AsyncConnection + 'static> Clone for AsyncExplicitTransaction<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: AsyncConnection + 'static> ResultResourcesHandler for AsyncExplicitTransaction<C> {
    fn result_fetched(&self) {
        self.inner.core.result_fetched();
    }

    fn result_failed(&self, error: &Error) {
        self.inner.core.result_failed(error);
    }
}

impl<C: AsyncConnection + 'static> std::fmt::Debug for AsyncExplicitTransaction<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncExplicitTransaction")
            .field("core", &self.inner.core)
            .finish_non_exhaustive()
    }
}
