//! Exactly-once continuations and pending-operation handles
//!
//! The non-blocking path never waits on a thread. Each protocol exchange is
//! given a [`Completion`], which the response handler fires when the reply
//! arrives. Completions chain into one another, and the last one in a chain
//! resolves the [`PendingOp`] the caller is holding.
//!
//! ```text
//! reply ──► handler ──► Completion (state flip) ──► Completion (release + notify) ──► PendingOp
//! ```
//!
//! A completion that is dropped without firing reports [`Error::Canceled`]
//! downstream, so a handler discarded by a dead connection still unwinds the
//! chain and never leaves a caller waiting forever.

use graphtx_core::{Error, Result};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

type Callback<T> = Box<dyn FnOnce(Result<T>) + Send>;

/// Continuation invoked exactly once with the outcome of an operation
pub struct Completion<T> {
    callback: Option<Callback<T>>,
}

impl<T> Completion<T> {
    /// Wrap a callback
    pub fn new<F>(callback: F) -> Self
    where
        F: FnOnce(Result<T>) + Send + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// Completion that discards the outcome
    pub fn ignore() -> Self {
        Self::new(|_| {})
    }

    /// Fire the continuation
    pub fn complete(mut self, result: Result<T>) {
        if let Some(callback) = self.callback.take() {
            callback(result);
        }
    }
}

impl<T> Drop for Completion<T> {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback(Err(Error::Canceled(
                "completion dropped before the operation finished".to_string(),
            )));
        }
    }
}

impl<T> std::fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

/// Handle to an operation that resolves later
///
/// Await it to get the outcome. It is backed by a oneshot channel, so it
/// resolves whether or not anyone polls it; dropping the handle does not
/// cancel the operation.
#[derive(Debug)]
pub struct PendingOp<T> {
    receiver: oneshot::Receiver<Result<T>>,
}

/// Create a linked completion / handle pair
pub fn pending<T>() -> (Completion<T>, PendingOp<T>)
where
    T: Send + 'static,
{
    let (sender, receiver) = oneshot::channel();
    let completion = Completion::new(move |result| {
        // The caller may have dropped the handle; the outcome is then unobserved.
        let _ = sender.send(result);
    });
    (completion, PendingOp { receiver })
}

impl<T> PendingOp<T>
where
    T: Send + 'static,
{
    /// Handle that is already resolved with `result`
    pub fn ready(result: Result<T>) -> Self {
        let (completion, op) = pending();
        completion.complete(result);
        op
    }

    /// Handle that already succeeded
    pub fn completed(value: T) -> Self {
        Self::ready(Ok(value))
    }

    /// Handle that already failed
    pub fn failed(error: Error) -> Self {
        Self::ready(Err(error))
    }

    /// Take the outcome if the operation has finished
    ///
    /// Returns `None` while still pending. The outcome can be taken once.
    pub fn try_take(&mut self) -> Option<Result<T>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(canceled())),
        }
    }
}

impl<T> Future for PendingOp<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(canceled())))
    }
}

fn canceled() -> Error {
    Error::Canceled("pending operation abandoned".to_string())
}

/// Run `finalizer` on either outcome, then pass the outcome on to `done`
pub fn on_completion<T, F>(done: Completion<T>, finalizer: F) -> Completion<T>
where
    T: Send + 'static,
    F: FnOnce(&Result<T>) + Send + 'static,
{
    Completion::new(move |result| {
        finalizer(&result);
        done.complete(result);
    })
}

/// Start `secondary` when the primary operation fails
///
/// On primary success `done` receives the value. On primary failure
/// `secondary` runs to completion and `done` then receives the primary
/// error; a secondary failure is logged and swallowed so it never masks the
/// primary cause.
pub fn fallback<T, F>(done: Completion<T>, secondary: F) -> Completion<T>
where
    T: Send + 'static,
    F: FnOnce(Completion<()>) + Send + 'static,
{
    Completion::new(move |result| match result {
        Ok(value) => done.complete(Ok(value)),
        Err(primary) => secondary(Completion::new(move |outcome: Result<()>| {
            if let Err(error) = outcome {
                tracing::debug!(%error, %primary, "fallback failed after primary failure");
            }
            done.complete(Err(primary));
        })),
    })
}
