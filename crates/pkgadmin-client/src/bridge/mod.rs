//! Blocking surface over asynchronous operations.
//!
//! Only async primitives are implemented; every blocking call is derived from
//! one with [`blocking`].

use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::warn;

use pkgadmin_core::AdminResult;

use crate::errors;
use crate::pending::PendingOperation;

/// Start `operation` on `runtime` and wait for its outcome on the calling
/// thread.
///
/// The outcome is returned unchanged, whether a value or an error. There is
/// no timeout; request timeouts belong to the executor.
///
/// Waiting from a multi-threaded runtime worker hands the worker over with
/// `block_in_place`; any other thread simply blocks. The only refused case is
/// an operation runtime with a single thread while the caller sits inside a
/// runtime: that thread may be the one the operation needs, so the call fails
/// with `Interrupted` before the operation starts.
pub fn blocking<T, F>(runtime: &Handle, operation: F) -> AdminResult<T>
where
    F: FnOnce() -> PendingOperation<T>,
{
    wait_with(Some(runtime.runtime_flavor()), operation)
}

/// Like [`blocking`] when the runtime completing the operation may be unknown.
///
/// Without a known runtime, waiting is refused on a current-thread caller.
pub(crate) fn wait_with<T, F>(operation_flavor: Option<RuntimeFlavor>, operation: F) -> AdminResult<T>
where
    F: FnOnce() -> PendingOperation<T>,
{
    let caller = match Handle::try_current() {
        Ok(handle) => handle.runtime_flavor(),
        Err(_) => return futures::executor::block_on(operation()),
    };

    let single_threaded = match operation_flavor {
        Some(flavor) => matches!(flavor, RuntimeFlavor::CurrentThread),
        None => matches!(caller, RuntimeFlavor::CurrentThread),
    };
    if single_threaded {
        warn!("blocking call on a single-threaded runtime refused");
        return Err(errors::interrupted(
            "blocking call from a current-thread runtime would deadlock; use the async API",
        ));
    }

    match caller {
        RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| futures::executor::block_on(operation()))
        },
        _ => futures::executor::block_on(operation()),
    }
}
