//! Statement results
//!
//! A [`ResultCursor`] is the buffer the RUN and PULL_ALL handlers fill as
//! replies arrive. The blocking path wraps it in a [`StatementResult`] that
//! can wait for the stream by syncing the connection; the non-blocking path
//! hands the cursor out directly.

use graphtx_concurrency::{pending, Completion, PendingOp};
use graphtx_core::{Error, Result, Value};
use graphtx_wire::{Connection, Metadata};
use parking_lot::Mutex;
use std::sync::Arc;

/// One result row
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    keys: Arc<Vec<String>>,
    values: Vec<Value>,
}

impl Record {
    /// Column names, shared by every record of the result
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Values in column order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value of the named column
    pub fn get(&self, key: &str) -> Option<&Value> {
        let index = self.keys.iter().position(|k| k == key)?;
        self.values.get(index)
    }
}

#[derive(Debug, Default)]
struct ResultBuffer {
    keys: Arc<Vec<String>>,
    records: Vec<Record>,
    summary: Option<Metadata>,
    error: Option<Error>,
    waiters: Vec<Completion<Metadata>>,
}

impl ResultBuffer {
    fn is_complete(&self) -> bool {
        self.summary.is_some() || self.error.is_some()
    }
}

/// Shared buffer of one statement's results
#[derive(Debug, Clone)]
pub struct ResultCursor {
    statement: Arc<str>,
    buffer: Arc<Mutex<ResultBuffer>>,
}

impl ResultCursor {
    pub(crate) fn new(statement: &str) -> Self {
        Self {
            statement: Arc::from(statement),
            buffer: Arc::new(Mutex::new(ResultBuffer::default())),
        }
    }

    /// Statement text this cursor belongs to
    pub fn statement(&self) -> &str {
        &self.statement
    }

    /// Column names (empty until the RUN reply arrived)
    pub fn keys(&self) -> Vec<String> {
        self.buffer.lock().keys.as_ref().clone()
    }

    /// Records received so far
    pub fn records(&self) -> Vec<Record> {
        self.buffer.lock().records.clone()
    }

    /// Summary metadata, once the stream completed successfully
    pub fn summary(&self) -> Option<Metadata> {
        self.buffer.lock().summary.clone()
    }

    /// Failure of the statement, if it failed
    pub fn error(&self) -> Option<Error> {
        self.buffer.lock().error.clone()
    }

    /// True once a summary or a failure was received
    pub fn is_complete(&self) -> bool {
        self.buffer.lock().is_complete()
    }

    /// Resolves with the summary when the stream completes
    pub fn consume(&self) -> PendingOp<Metadata> {
        let mut buffer = self.buffer.lock();
        if let Some(error) = &buffer.error {
            return PendingOp::failed(error.clone());
        }
        if let Some(summary) = &buffer.summary {
            return PendingOp::completed(summary.clone());
        }
        let (waiter, op) = pending();
        buffer.waiters.push(waiter);
        op
    }

    pub(crate) fn set_keys(&self, keys: Vec<String>) {
        self.buffer.lock().keys = Arc::new(keys);
    }

    pub(crate) fn push(&self, values: Vec<Value>) {
        let mut buffer = self.buffer.lock();
        let keys = Arc::clone(&buffer.keys);
        buffer.records.push(Record { keys, values });
    }

    pub(crate) fn finish(&self, summary: Metadata) {
        let waiters = {
            let mut buffer = self.buffer.lock();
            if buffer.is_complete() {
                return;
            }
            buffer.summary = Some(summary.clone());
            std::mem::take(&mut buffer.waiters)
        };
        for waiter in waiters {
            waiter.complete(Ok(summary.clone()));
        }
    }

    /// Record a failure; returns false if the stream had already completed
    pub(crate) fn fail(&self, error: Error) -> bool {
        let waiters = {
            let mut buffer = self.buffer.lock();
            if buffer.is_complete() {
                return false;
            }
            buffer.error = Some(error.clone());
            std::mem::take(&mut buffer.waiters)
        };
        for waiter in waiters {
            waiter.complete(Err(error.clone()));
        }
        true
    }
}

/// Result of a statement run on the blocking path
///
/// Accessors block on `sync()` until the stream has completed.
pub struct StatementResult<C: Connection> {
    cursor: ResultCursor,
    connection: Arc<Mutex<C>>,
}

impl<C: Connection> StatementResult<C> {
    pub(crate) fn new(cursor: ResultCursor, connection: Arc<Mutex<C>>) -> Self {
        Self { cursor, connection }
    }

    /// Column names
    pub fn keys(&self) -> Result<Vec<String>> {
        self.wait()?;
        Ok(self.cursor.keys())
    }

    /// All records
    pub fn records(&self) -> Result<Vec<Record>> {
        self.wait()?;
        Ok(self.cursor.records())
    }

    /// Summary metadata
    pub fn consume(&self) -> Result<Metadata> {
        self.wait()?;
        Ok(self.cursor.summary().unwrap_or_default())
    }

    /// The underlying cursor
    pub fn cursor(&self) -> &ResultCursor {
        &self.cursor
    }

    fn wait(&self) -> Result<()> {
        if !self.cursor.is_complete() {
            let synced = self.connection.lock().sync();
            if let Some(error) = self.cursor.error() {
                return Err(error);
            }
            synced?;
        }
        match self.cursor.error() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl<C: Connection> std::fmt::Debug for StatementResult<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementResult")
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}
