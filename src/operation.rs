//! One-shot asynchronous operations
//!
//! `operation()` splits an operation into the side that produces its result
//! (`Completion`) and the side that waits for it (`Subscription`). When the
//! subscriber has been disposed by the time the result arrives, a failure is
//! wrapped as an `UndeliverableError` and routed to the `ErrorSink`. Errors
//! that reach a live subscriber never touch the sink.

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::error::{OperationError, Origin, UndeliverableError};
use crate::sink::{ErrorSink, Routed};

type Outcome<T> = Result<T, Arc<OperationError>>;

/// What happened to a completed operation's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The subscriber received it.
    Delivered,
    /// Success value with nobody listening; dropped.
    Dropped,
    /// Error with nobody listening; sent to the sink.
    Routed(Routed),
}

/// Create a new pending operation reporting late failures to `sink`.
pub fn operation<T>(sink: ErrorSink, origin: Origin) -> (Completion<T>, Subscription<T>) {
    let (tx, rx) = oneshot::channel();
    let completion = Completion {
        tx,
        origin: origin.clone(),
        sink,
    };
    let subscription = Subscription { rx, origin };
    (completion, subscription)
}

/// Producer side of an operation.
pub struct Completion<T> {
    tx: oneshot::Sender<Outcome<T>>,
    origin: Origin,
    sink: ErrorSink,
}

impl<T> Completion<T> {
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// True once the subscriber has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Hand the result to the subscriber, or to the sink if it is gone.
    pub fn complete(self, result: Result<T, OperationError>) -> Delivery {
        match self.tx.send(result.map_err(Arc::new)) {
            Ok(()) => Delivery::Delivered,
            Err(Ok(_)) => Delivery::Dropped,
            Err(Err(cause)) => {
                Delivery::Routed(self.sink.route(UndeliverableError::new(cause, self.origin)))
            }
        }
    }
}

/// Consumer side of an operation.
pub struct Subscription<T> {
    rx: oneshot::Receiver<Outcome<T>>,
    origin: Origin,
}

impl<T> Subscription<T> {
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Wait for the result.
    ///
    /// A producer that goes away without completing yields an
    /// `IllegalState` error.
    pub async fn recv(self) -> Outcome<T> {
        match self.rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(Arc::new(OperationError::IllegalState(format!(
                "{} dropped without completing",
                self.origin
            )))),
        }
    }

    /// Withdraw interest in the result.
    pub fn dispose(self) {
        drop(self.rx);
    }
}
