//! Single-assignment result slot for in-flight operations.
//!
//! A [`PendingOperation`] is handed to the caller as soon as an operation is
//! issued. The task doing the work owns the matching [`Completion`] and fills
//! the slot exactly once; `complete` consumes it, so a second outcome cannot
//! be produced. When the task goes away without completing (aborted,
//! panicked, runtime shut down) the caller observes
//! [`AdminError::Interrupted`](pkgadmin_core::AdminError::Interrupted).

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::trace;

use pkgadmin_core::{AdminError, AdminResult};

use crate::{bridge, errors};

/// Create a connected pending operation and its completion handle
pub fn channel<T>() -> (Completion<T>, PendingOperation<T>) {
    let (sender, receiver) = oneshot::channel();
    (
        Completion { sender },
        PendingOperation {
            receiver,
            runtime: None,
        },
    )
}

/// Producer side of a [`PendingOperation`]
pub struct Completion<T> {
    sender: oneshot::Sender<AdminResult<T>>,
}

impl<T> Completion<T> {
    /// Record the outcome; a caller that stopped waiting is not an error
    pub fn complete(self, outcome: AdminResult<T>) {
        if self.sender.send(outcome).is_err() {
            trace!("operation completed after its caller went away");
        }
    }

    pub fn succeed(self, value: T) {
        self.complete(Ok(value))
    }

    pub fn fail(self, error: AdminError) {
        self.complete(Err(error))
    }

    /// True when the consumer was dropped and nobody will read the outcome
    pub fn is_abandoned(&self) -> bool {
        self.sender.is_closed()
    }
}

/// An operation whose outcome arrives later.
///
/// Await it from async code, or call [`wait`](Self::wait) from a plain thread.
#[must_use = "a pending operation does nothing useful unless awaited or waited on"]
pub struct PendingOperation<T> {
    receiver: oneshot::Receiver<AdminResult<T>>,
    /// Flavor of the runtime completing this operation, when known
    runtime: Option<RuntimeFlavor>,
}

impl<T> PendingOperation<T> {
    /// Operation that already succeeded
    pub fn ready(value: T) -> Self {
        let (completion, pending) = channel();
        completion.succeed(value);
        pending
    }

    /// Operation that already failed; used when a request cannot even be built
    pub fn failed(error: AdminError) -> Self {
        let (completion, pending) = channel();
        completion.fail(error);
        pending
    }

    /// Run `future` on `runtime` and complete with its output
    pub fn spawn<F>(runtime: &Handle, future: F) -> Self
    where
        F: Future<Output = AdminResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (completion, mut pending) = channel();
        pending.runtime = Some(runtime.runtime_flavor());
        runtime.spawn(async move {
            let outcome = future.await;
            completion.complete(outcome);
        });
        pending
    }

    /// Block the calling thread until the outcome is available
    pub fn wait(mut self) -> AdminResult<T> {
        if let Some(outcome) = self.try_take() {
            return outcome;
        }
        let runtime = self.runtime.take();
        bridge::wait_with(runtime, move || self)
    }

    /// Take the outcome if it has already arrived
    pub fn try_take(&mut self) -> Option<AdminResult<T>> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(abandoned())),
        }
    }
}

fn abandoned() -> AdminError {
    errors::interrupted("operation was abandoned before it completed")
}

impl<T> Future for PendingOperation<T> {
    type Output = AdminResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(abandoned())),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> fmt::Debug for PendingOperation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingOperation").finish_non_exhaustive()
    }
}
