//! State shared by both execution paths
//!
//! [`TransactionCore`] owns everything about a transaction that is not tied to
//! a connection flavor: its id, its lifecycle state, its bookmark and the close
//! claim. Reply handlers hold an `Arc` to it and mutate it from the connection's
//! thread while application code reads it from its own.
//!
//! # Thread Safety
//!
//! State and close claim are atomics, the bookmark sits behind a `RwLock`.
//! No lock is held across a protocol exchange; the per-state legality checks
//! are the only serialization between writers.

use crate::resources::ResultResourcesHandler;
use graphtx_concurrency::{AtomicState, TransactionState};
use graphtx_core::{Bookmark, Error, Result, TransactionId};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

pub(crate) struct TransactionCore {
    id: TransactionId,
    state: AtomicState,
    bookmark: RwLock<Bookmark>,
    /// Set by the first terminal operation
    closing: AtomicBool,
}

impl TransactionCore {
    pub(crate) fn new() -> Self {
        Self {
            id: TransactionId::new(),
            state: AtomicState::default(),
            bookmark: RwLock::new(Bookmark::empty()),
            closing: AtomicBool::new(false),
        }
    }

    pub(crate) fn id(&self) -> TransactionId {
        self.id
    }

    pub(crate) fn state(&self) -> TransactionState {
        self.state.load()
    }

    pub(crate) fn is_open(&self) -> bool {
        self.state().is_open()
    }

    pub(crate) fn mark_success(&self) {
        self.transition("success", TransactionState::mark_success);
    }

    pub(crate) fn mark_failure(&self) {
        self.transition("failure", TransactionState::mark_failure);
    }

    /// Unrecoverable error: no further messages are sent for this transaction
    pub(crate) fn mark_failed(&self) {
        self.transition("failed", TransactionState::mark_failed);
    }

    fn transition(&self, event: &'static str, f: fn(TransactionState) -> TransactionState) {
        let (previous, current) = self.state.update(f);
        if previous != current {
            trace!(tx_id = %self.id, event, from = %previous, to = %current, "transaction state changed");
        }
    }

    /// Reject statements unless the transaction is ACTIVE or MARKED_SUCCESS
    pub(crate) fn ensure_accepts_statements(&self) -> Result<()> {
        if self.is_closing() {
            return Err(Error::usage(
                "Cannot run more statements in this transaction, because it is being closed.",
            ));
        }
        match self.state() {
            TransactionState::Active | TransactionState::MarkedSuccess => Ok(()),
            TransactionState::Committed => Err(Error::usage(
                "Cannot run more statements in this transaction, because it has been committed. \
                 Please start a new transaction to run another statement.",
            )),
            TransactionState::MarkedFailed
            | TransactionState::Failed
            | TransactionState::RolledBack => Err(Error::usage(
                "Cannot run more statements in this transaction, because previous statements in \
                 the transaction has failed and the transaction has been rolled back. Please \
                 start a new transaction to run another statement.",
            )),
        }
    }

    pub(crate) fn bookmark(&self) -> Bookmark {
        self.bookmark.read().clone()
    }

    /// Replace the bookmark; empty bookmarks are ignored
    pub(crate) fn set_bookmark(&self, bookmark: Bookmark) {
        if bookmark.is_empty() {
            return;
        }
        trace!(tx_id = %self.id, %bookmark, "bookmark updated");
        *self.bookmark.write() = bookmark;
    }

    /// Claim the right to close; true for the first caller only
    pub(crate) fn claim_close(&self) -> bool {
        !self.closing.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn is_closing(&self) -> bool {
        self.closing.load(Ordering::Acquire)
    }

    /// Move to `terminal`; false if a terminal state was already reached
    pub(crate) fn finalize(&self, terminal: TransactionState) -> bool {
        match self.state.finalize(terminal) {
            Ok(previous) => {
                debug!(tx_id = %self.id, from = %previous, to = %terminal, "transaction finalized");
                true
            }
            Err(_) => false,
        }
    }
}

impl std::fmt::Debug for TransactionCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionCore")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("bookmark", &*self.bookmark.read())
            .field("closing", &self.is_closing())
            .finish()
    }
}

impl ResultResourcesHandler for TransactionCore {
    fn result_fetched(&self) {}

    fn result_failed(&self, error: &Error) {
        if error.is_recoverable() {
            self.mark_failure();
        } else {
            self.mark_failed();
        }
    }
}
