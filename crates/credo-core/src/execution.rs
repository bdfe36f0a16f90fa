//! One-shot execution of service operations
//!
//! Each operation runs as its own task and reports its [`Outcome`] through a
//! private one-shot channel. The sender is consumed by the send, so an
//! operation can complete at most once; a task that dies before sending
//! closes the channel and the waiting caller sees an internal error.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tracing::{debug, error};

use crate::error::ServiceError;
use crate::outcome::Outcome;

/// Handle to a running operation
///
/// Awaiting it yields the operation's single outcome.
#[must_use = "an operation's outcome is only observed by awaiting it"]
#[derive(Debug)]
pub struct Pending<T> {
    operation: &'static str,
    rx: oneshot::Receiver<Outcome<T>>,
}

impl<T> Future for Pending<T> {
    type Output = Outcome<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let operation = self.operation;
        Pin::new(&mut self.rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                error!(operation, "Operation ended without producing an outcome");
                Err(ServiceError::internal(format!(
                    "{} ended without producing an outcome",
                    operation
                )))
            })
        })
    }
}

/// Start `work` on its own task and return a handle to its outcome
///
/// Must be called from within a tokio runtime.
pub fn dispatch<T, F>(operation: &'static str, work: F) -> Pending<T>
where
    T: Send + 'static,
    F: Future<Output = Outcome<T>> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let outcome = work.await;
        if tx.send(outcome).is_err() {
            debug!(operation, "Caller went away before the outcome was delivered");
        }
    });

    Pending { operation, rx }
}
