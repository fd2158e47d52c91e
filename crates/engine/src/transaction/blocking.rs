//! Blocking execution path
//!
//! Every exchange runs on the calling thread. COMMIT and ROLLBACK wait on
//! `sync()`; statements are only flushed, and their results are awaited
//! lazily by [`StatementResult`].

use super::TransactionCore;
use crate::handlers::{BookmarkResponseHandler, PullAllResponseHandler, RunResponseHandler};
use crate::resources::{ResourcesHandler, ResultResourcesHandler};
use crate::result::{ResultCursor, StatementResult};
use graphtx_concurrency::TransactionState;
use graphtx_config::TransactionConfig;
use graphtx_core::{Bookmark, Error, Params, Result, TransactionId};
use graphtx_wire::{Connection, NoOpResponseHandler, BEGIN, COMMIT, ROLLBACK};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

/// Explicit transaction over a blocking connection
///
/// Dropping an open transaction closes it: committed if marked with
/// [`success`](Self::success), rolled back otherwise.
///
/// ```ignore
/// let tx = ExplicitTransaction::begin(connection, session, &TransactionConfig::default())?;
/// tx.run("CREATE (n:Person {name: $name})", params)?;
/// tx.commit()?;
/// ```
pub struct ExplicitTransaction<C: Connection> {
    core: Arc<TransactionCore>,
    connection: Arc<Mutex<C>>,
    resources: Arc<dyn ResourcesHandler>,
}

impl<C: Connection> ExplicitTransaction<C> {
    /// Open a transaction on `connection`
    ///
    /// BEGIN is queued without waiting unless `config` carries a bookmark, in
    /// which case this blocks until the server has acknowledged it. On error
    /// the connection is released and `resources` notified before returning.
    pub fn begin(
        connection: C,
        resources: Arc<dyn ResourcesHandler>,
        config: &TransactionConfig,
    ) -> Result<Self> {
        let tx = Self {
            core: Arc::new(TransactionCore::new()),
            connection: Arc::new(Mutex::new(connection)),
            resources,
        };
        debug!(tx_id = %tx.id(), bookmark = %config.bookmark, "beginning transaction");

        if let Err(error) = tx.send_begin(config) {
            debug!(tx_id = %tx.id(), %error, "BEGIN failed");
            // Dropping a FAILED transaction finalizes it without network traffic.
            tx.core.mark_failed();
            return Err(error);
        }
        Ok(tx)
    }

    fn send_begin(&self, config: &TransactionConfig) -> Result<()> {
        let mut connection = self.connection.lock();
        connection.run(BEGIN, config.begin_parameters(), NoOpResponseHandler::boxed())?;
        connection.pull_all(NoOpResponseHandler::boxed())?;
        if !config.bookmark.is_empty() {
            connection.sync()?;
        }
        Ok(())
    }

    /// Transaction id, used in logs and in the closed notification
    pub fn id(&self) -> TransactionId {
        self.core.id()
    }

    /// Current lifecycle state
    pub fn state(&self) -> TransactionState {
        self.core.state()
    }

    /// True until the transaction committed or rolled back
    pub fn is_open(&self) -> bool {
        self.core.is_open()
    }

    /// Mark the transaction to be committed on close
    pub fn success(&self) {
        self.core.mark_success();
    }

    /// Mark the transaction to be rolled back on close
    pub fn failure(&self) {
        self.core.mark_failure();
    }

    /// Latest bookmark, updated by a successful commit
    pub fn bookmark(&self) -> Bookmark {
        self.core.bookmark()
    }

    /// Replace the bookmark; an empty bookmark is ignored
    pub fn set_bookmark(&self, bookmark: Bookmark) {
        self.core.set_bookmark(bookmark);
    }

    /// Run a statement
    ///
    /// Fails with a usage error unless the transaction is ACTIVE or
    /// MARKED_SUCCESS. A failure to send moves the transaction to FAILED.
    pub fn run(&self, statement: &str, parameters: Params) -> Result<StatementResult<C>> {
        self.core.ensure_accepts_statements()?;

        let cursor = ResultCursor::new(statement);
        if let Err(error) = self.send_statement(&cursor, parameters) {
            debug!(tx_id = %self.id(), %error, "failed to send statement");
            self.core.mark_failed();
            return Err(error);
        }
        Ok(StatementResult::new(cursor, Arc::clone(&self.connection)))
    }

    fn send_statement(&self, cursor: &ResultCursor, parameters: Params) -> Result<()> {
        let resources: Arc<dyn ResultResourcesHandler> = self.core.clone();
        let mut connection = self.connection.lock();
        connection.run(
            cursor.statement(),
            parameters,
            Box::new(RunResponseHandler::new(cursor.clone(), Arc::clone(&resources))),
        )?;
        connection.pull_all(Box::new(PullAllResponseHandler::new(cursor.clone(), resources)))?;
        connection.flush()
    }

    /// Commit if marked with `success()`, roll back otherwise
    ///
    /// A failed commit is followed by a best-effort rollback and the commit
    /// error is returned. On a closed connection nothing is sent and a
    /// pending commit fails with a connection error. Whatever happens, the transaction ends terminal,
    /// its connection is released and its owner notified, once. Closing an
    /// already closed transaction does nothing.
    pub fn close(&self) -> Result<()> {
        if !self.core.claim_close() {
            return Ok(());
        }
        // Declared before the connection guard so it drops after it.
        let _finalizer = CloseGuard { tx: self };

        let state = self.core.state();
        let mut connection = self.connection.lock();
        if !connection.is_open() {
            debug!(tx_id = %self.id(), %state, "connection already closed, finalizing locally");
            return match state {
                TransactionState::MarkedSuccess => Err(Error::connection(
                    "Connection closed before the transaction could be committed",
                )),
                _ => Ok(()),
            };
        }

        debug!(tx_id = %self.id(), %state, "closing transaction");
        match state {
            TransactionState::MarkedSuccess => self.commit_or_rollback(&mut *connection),
            TransactionState::Active | TransactionState::MarkedFailed => {
                self.rollback_tx(&mut *connection)
            }
            // The server already discarded the transaction.
            TransactionState::Failed => Ok(()),
            TransactionState::Committed | TransactionState::RolledBack => Ok(()),
        }
    }

    /// Mark for success and close
    pub fn commit(self) -> Result<()> {
        self.success();
        self.close()
    }

    /// Mark for failure and close
    pub fn rollback(self) -> Result<()> {
        self.failure();
        self.close()
    }

    fn commit_or_rollback(&self, connection: &mut C) -> Result<()> {
        let error = match self.commit_tx(connection) {
            Ok(()) => return Ok(()),
            Err(error) => error,
        };
        if let Err(rollback_error) = self.rollback_tx(connection) {
            debug!(
                tx_id = %self.id(),
                error = %rollback_error,
                commit_error = %error,
                "rollback after failed commit also failed"
            );
        }
        Err(error)
    }

    fn commit_tx(&self, connection: &mut C) -> Result<()> {
        connection.run(COMMIT, Params::new(), NoOpResponseHandler::boxed())?;
        connection.pull_all(Box::new(BookmarkResponseHandler::new(Arc::clone(&self.core))))?;
        connection.sync()?;
        self.core.finalize(TransactionState::Committed);
        Ok(())
    }

    fn rollback_tx(&self, connection: &mut C) -> Result<()> {
        connection.run(ROLLBACK, Params::new(), NoOpResponseHandler::boxed())?;
        connection.pull_all(Box::new(BookmarkResponseHandler::new(Arc::clone(&self.core))))?;
        connection.sync()?;
        self.core.finalize(TransactionState::RolledBack);
        Ok(())
    }

    fn release_resources(&self) {
        self.core.finalize(TransactionState::RolledBack);
        self.connection.lock().release();
        self.resources.on_transaction_closed(self.id());
        debug!(tx_id = %self.id(), state = %self.state(), "transaction closed, connection released");
    }
}

/// Releases the connection and notifies the owner on every exit from `close`
struct CloseGuard<'a, C: Connection> {
    tx: &'a ExplicitTransaction<C>,
}

impl<C: Connection> Drop for CloseGuard<'_, C> {
    fn drop(&mut self) {
        self.tx.release_resources();
    }
}

impl<C: Connection> Drop for ExplicitTransaction<C> {
    fn drop(&mut self) {
        if self.core.is_closing() {
            return;
        }
        if let Err(error) = self.close() {
            warn!(tx_id = %self.id(), %error, "failed to close transaction on drop");
        }
    }
}

impl<C: Connection> ResultResourcesHandler for ExplicitTransaction<C> {
    fn result_fetched(&self) {
        self.core.result_fetched();
    }

    fn result_failed(&self, error: &Error) {
        self.core.result_failed(error);
    }
}

impl<C: Connection> std::fmt::Debug for ExplicitTransaction<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplicitTransaction")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}
