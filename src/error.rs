//! Error types carried through the undeliverable-error channel
//!
//! `OperationError` is everything an asynchronous operation can fail with.
//! When the subscriber of that operation is already gone, the runtime wraps
//! the failure in an `UndeliverableError` and hands it to the sink.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::ble::BleError;

/// Coarse classification of an `OperationError`.
///
/// Suppression rules match on this instead of on concrete error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Ble,
    Io,
    NullReference,
    IllegalState,
    Other,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Ble => "ble",
            ErrorCategory::Io => "io",
            ErrorCategory::NullReference => "null_reference",
            ErrorCategory::IllegalState => "illegal_state",
            ErrorCategory::Other => "other",
        };
        f.write_str(name)
    }
}

/// A failure produced by an asynchronous operation.
#[derive(Error, Debug)]
pub enum OperationError {
    #[error("BLE operation failed: {0}")]
    Ble(#[from] BleError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Null reference: {0}")]
    NullReference(String),

    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OperationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            OperationError::Ble(_) => ErrorCategory::Ble,
            OperationError::Io(_) => ErrorCategory::Io,
            OperationError::NullReference(_) => ErrorCategory::NullReference,
            OperationError::IllegalState(_) => ErrorCategory::IllegalState,
            OperationError::Other(_) => ErrorCategory::Other,
        }
    }
}

/// Identifies the asynchronous operation an error came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// Operation type, e.g. `"ble:read"`.
    pub kind: String,
    /// Unique id of this particular operation instance.
    pub operation_id: Uuid,
}

impl Origin {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            operation_id: Uuid::new_v4(),
        }
    }

    /// Origin for a BLE operation such as `"read"` or `"write"`.
    pub fn ble(operation: &str) -> Self {
        Self::new(format!("ble:{}", operation))
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.operation_id)
    }
}

/// An operation error that arrived after its subscriber was disposed.
///
/// The cause is shared behind an `Arc` so that whoever finally receives it
/// (the gate, or the fatal path) sees the very same object the operation
/// produced.
#[derive(Error, Debug, Clone)]
#[error("undeliverable error from {origin}: {cause}")]
pub struct UndeliverableError {
    #[source]
    cause: Arc<OperationError>,
    origin: Origin,
}

impl UndeliverableError {
    pub fn new(cause: impl Into<Arc<OperationError>>, origin: Origin) -> Self {
        Self {
            cause: cause.into(),
            origin,
        }
    }

    pub fn cause(&self) -> &Arc<OperationError> {
        &self.cause
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Give up the wrapper and keep the original cause.
    pub fn into_cause(self) -> Arc<OperationError> {
        self.cause
    }
}
