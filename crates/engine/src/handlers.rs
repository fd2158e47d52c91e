//! Response handlers used by explicit transactions
//!
//! | Handler | Paired with | On success | On failure |
//! |---------|-------------|------------|------------|
//! | [`RunResponseHandler`] | statement RUN | record column names | report `result_failed` |
//! | [`PullAllResponseHandler`] | statement PULL_ALL | buffer records, report `result_fetched` | report `result_failed` |
//! | [`BookmarkResponseHandler`] | blocking COMMIT/ROLLBACK PULL_ALL | capture bookmark | (surfaced by `sync`) |
//! | [`BeginTxResponseHandler`] | BEGIN PULL_ALL with a bookmark | complete | fail |
//! | [`CommitTxResponseHandler`] | async COMMIT PULL_ALL | capture bookmark, COMMITTED, complete | fail |
//! | [`RollbackTxResponseHandler`] | async ROLLBACK PULL_ALL | ROLLED_BACK, complete | fail |
//!
//! Handlers that flip state do so before firing their completion, so anything
//! chained on the completion observes the post-state.

use crate::resources::ResultResourcesHandler;
use crate::result::ResultCursor;
use crate::transaction::TransactionCore;
use graphtx_concurrency::{Completion, TransactionState};
use graphtx_core::{Error, Value};
use graphtx_wire::{bookmark_from_metadata, fields_from_metadata, Metadata, ResponseHandler};
use std::sync::Arc;

pub(crate) struct RunResponseHandler {
    cursor: ResultCursor,
    resources: Arc<dyn ResultResourcesHandler>,
}

impl RunResponseHandler {
    pub(crate) fn new(cursor: ResultCursor, resources: Arc<dyn ResultResourcesHandler>) -> Self {
        Self { cursor, resources }
    }
}

impl ResponseHandler for RunResponseHandler {
    fn on_success(&mut self, metadata: Metadata) {
        self.cursor.set_keys(fields_from_metadata(&metadata));
    }

    fn on_failure(&mut self, error: Error) {
        if self.cursor.fail(error.clone()) {
            self.resources.result_failed(&error);
        }
    }
}

pub(crate) struct PullAllResponseHandler {
    cursor: ResultCursor,
    resources: Arc<dyn ResultResourcesHandler>,
}

impl PullAllResponseHandler {
    pub(crate) fn new(cursor: ResultCursor, resources: Arc<dyn ResultResourcesHandler>) -> Self {
        Self { cursor, resources }
    }
}

impl ResponseHandler for PullAllResponseHandler {
    fn on_success(&mut self, metadata: Metadata) {
        self.cursor.finish(metadata);
        self.resources.result_fetched();
    }

    fn on_failure(&mut self, error: Error) {
        if self.cursor.fail(error.clone()) {
            self.resources.result_failed(&error);
        }
    }

    fn on_record(&mut self, fields: Vec<Value>) {
        self.cursor.push(fields);
    }
}

pub(crate) struct BookmarkResponseHandler {
    core: Arc<TransactionCore>,
}

impl BookmarkResponseHandler {
    pub(crate) fn new(core: Arc<TransactionCore>) -> Self {
        Self { core }
    }
}

impl ResponseHandler for BookmarkResponseHandler {
    fn on_success(&mut self, metadata: Metadata) {
        self.core.set_bookmark(bookmark_from_metadata(&metadata));
    }

    fn on_failure(&mut self, _error: Error) {}
}

pub(crate) struct BeginTxResponseHandler {
    completion: Option<Completion<()>>,
}

impl BeginTxResponseHandler {
    pub(crate) fn new(completion: Completion<()>) -> Self {
        Self {
            completion: Some(completion),
        }
    }
}

impl ResponseHandler for BeginTxResponseHandler {
    fn on_success(&mut self, _metadata: Metadata) {
        if let Some(completion) = self.completion.take() {
            completion.complete(Ok(()));
        }
    }

    fn on_failure(&mut self, error: Error) {
        if let Some(completion) = self.completion.take() {
            completion.complete(Err(error));
        }
    }
}

pub(crate) struct CommitTxResponseHandler {
    core: Arc<TransactionCore>,
    completion: Option<Completion<()>>,
}

impl CommitTxResponseHandler {
    pub(crate) fn new(core: Arc<TransactionCore>, completion: Completion<()>) -> Self {
        Self {
            core,
            completion: Some(completion),
        }
    }
}

impl ResponseHandler for CommitTxResponseHandler {
    fn on_success(&mut self, metadata: Metadata) {
        self.core.set_bookmark(bookmark_from_metadata(&metadata));
        self.core.finalize(TransactionState::Committed);
        if let Some(completion) = self.completion.take() {
            completion.complete(Ok(()));
        }
    }

    fn on_failure(&mut self, error: Error) {
        if let Some(completion) = self.completion.take() {
            completion.complete(Err(error));
        }
    }
}

pub(crate) struct RollbackTxResponseHandler {
    core: Arc<TransactionCore>,
    completion: Option<Completion<()>>,
}

impl RollbackTxResponseHandler {
    pub(crate) fn new(core: Arc<TransactionCore>, completion: Completion<()>) -> Self {
        Self {
            core,
            completion: Some(completion),
        }
    }
}

impl ResponseHandler for RollbackTxResponseHandler {
    fn on_success(&mut self, _metadata: Metadata) {
        self.core.finalize(TransactionState::RolledBack);
        if let Some(completion) = self.completion.take() {
            completion.complete(Ok(()));
        }
    }

    fn on_failure(&mut self, error: Error) {
        if let Some(completion) = self.completion.take() {
            completion.complete(Err(error));
        }
    }
}
