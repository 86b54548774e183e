//! The process-wide undeliverable-error sink
//!
//! The asynchronous runtime sends every error it could not deliver here.
//! A sink holds at most one `ErrorGate` for its whole lifetime and the host's
//! `FatalErrorPath`. Applications normally use `ErrorSink::process()`; tests
//! build their own sinks with `ErrorSink::new`.

use std::sync::{Arc, OnceLock};

use thiserror::Error;

use crate::error::{OperationError, UndeliverableError};
use crate::gate::{Decision, ErrorGate};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GateError {
    #[error("A different error gate is already installed on this sink")]
    AlreadyInstalled,
}

/// Where unsuppressed errors go.
///
/// Implementations receive the cause object exactly as the operation produced
/// it.
pub trait FatalErrorPath: Send + Sync {
    fn raise(&self, cause: Arc<OperationError>);
}

/// Default fatal path: log the cause, then panic with the original
/// `Arc<OperationError>` as the payload.
///
/// The payload is not a string, so the panic hook cannot print the error
/// text; the `error` record carries it. Under `panic = "abort"` this
/// terminates the process. In unwind builds a panic raised inside a tokio
/// task is caught by the runtime and surfaces through the task's
/// `JoinHandle`; use `AbortFatalPath` if that must still end the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanicFatalPath;

impl FatalErrorPath for PanicFatalPath {
    fn raise(&self, cause: Arc<OperationError>) {
        log::error!("Fatal undeliverable error: {}", cause);
        std::panic::panic_any(cause)
    }
}

/// Fatal path that logs the cause and aborts the process, whatever the
/// panic strategy or the thread it runs on.
#[derive(Debug, Default, Clone, Copy)]
pub struct AbortFatalPath;

impl FatalErrorPath for AbortFatalPath {
    fn raise(&self, cause: Arc<OperationError>) {
        log::error!("Fatal undeliverable error: {:?}", cause);
        std::process::abort()
    }
}

/// Result of `ErrorSink::install`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Installation {
    /// The gate is now active.
    Installed,
    /// An identical gate was already active; nothing changed.
    AlreadyInstalled,
}

/// What the sink did with a routed error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// The gate suppressed it.
    Suppressed,
    /// The gate propagated it to the fatal path.
    Propagated,
    /// No gate was installed; the fatal path got it.
    Unhandled,
}

impl From<Decision> for Routed {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Suppress => Routed::Suppressed,
            Decision::Propagate => Routed::Propagated,
        }
    }
}

static PROCESS_SINK: OnceLock<ErrorSink> = OnceLock::new();

/// Handle to an undeliverable-error channel. Clones share the same channel.
#[derive(Clone)]
pub struct ErrorSink {
    inner: Arc<SinkInner>,
}

struct SinkInner {
    gate: OnceLock<ErrorGate>,
    fatal: Arc<dyn FatalErrorPath>,
}

impl ErrorSink {
    pub fn new(fatal: Arc<dyn FatalErrorPath>) -> Self {
        Self {
            inner: Arc::new(SinkInner {
                gate: OnceLock::new(),
                fatal,
            }),
        }
    }

    /// The sink shared by the whole process, panicking on fatal errors.
    pub fn process() -> &'static ErrorSink {
        PROCESS_SINK.get_or_init(ErrorSink::default)
    }

    /// Install `gate` as this sink's handler.
    ///
    /// Installing a gate equal to the active one is a no-op. Installing a
    /// different gate is rejected; the active gate stays in place.
    ///
    /// `SuppressionRule::Predicate` rules are equal only when they share the
    /// same `Arc`. A host that reinstalls on every recreation must keep its
    /// predicate `Arc`s (or the whole `ErrorGate`) and pass the same ones
    /// again, otherwise the reinstall is rejected.
    pub fn install(&self, gate: ErrorGate) -> Result<Installation, GateError> {
        let rule_count = gate.rules().len();
        match self.inner.gate.set(gate) {
            Ok(()) => {
                log::info!("Error gate installed with {} suppression rule(s)", rule_count);
                Ok(Installation::Installed)
            }
            Err(rejected) => {
                if self.inner.gate.get() == Some(&rejected) {
                    log::debug!("Error gate already installed, ignoring reinstall");
                    Ok(Installation::AlreadyInstalled)
                } else {
                    log::warn!("Refusing to replace the installed error gate");
                    Err(GateError::AlreadyInstalled)
                }
            }
        }
    }

    pub fn gate(&self) -> Option<&ErrorGate> {
        self.inner.gate.get()
    }

    pub fn is_installed(&self) -> bool {
        self.inner.gate.get().is_some()
    }

    /// Route an undeliverable error.
    ///
    /// This is the only place where a propagated cause is handed to the fatal
    /// path. With the default `PanicFatalPath` a propagated error does not
    /// return from here.
    pub fn route(&self, error: UndeliverableError) -> Routed {
        match self.inner.gate.get() {
            Some(gate) => {
                let decision = gate.handle(&error);
                if decision.is_propagate() {
                    self.inner.fatal.raise(error.into_cause());
                }
                decision.into()
            }
            None => {
                log::error!("Undeliverable error with no gate installed: {}", error);
                self.inner.fatal.raise(error.into_cause());
                Routed::Unhandled
            }
        }
    }
}

impl Default for ErrorSink {
    fn default() -> Self {
        Self::new(Arc::new(PanicFatalPath))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ble::BleError;
    use crate::error::{ErrorCategory, Origin};
    use crate::gate::SuppressionRule;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingFatalPath {
        raised: Mutex<Vec<Arc<OperationError>>>,
    }

    impl FatalErrorPath for RecordingFatalPath {
        fn raise(&self, cause: Arc<OperationError>) {
            self.raised.lock().unwrap().push(cause);
        }
    }

    fn recording_sink() -> (ErrorSink, Arc<RecordingFatalPath>) {
        let fatal = Arc::new(RecordingFatalPath::default());
        (ErrorSink::new(fatal.clone()), fatal)
    }

    #[test]
    fn test_suppressed_error_reaches_nothing() {
        let (sink, fatal) = recording_sink();
        sink.install(ErrorGate::ble_default()).unwrap();

        let err = UndeliverableError::new(
            OperationError::from(BleError::GattError("GATT disconnect".into())),
            Origin::ble("read"),
        );
        assert_eq!(sink.route(err), Routed::Suppressed);
        assert!(fatal.raised.lock().unwrap().is_empty());
    }

    #[test]
    fn test_propagated_error_keeps_identity() {
        let (sink, fatal) = recording_sink();
        sink.install(ErrorGate::ble_default()).unwrap();

        let cause = Arc::new(OperationError::NullReference("unrelated bug".into()));
        let err = UndeliverableError::new(Arc::clone(&cause), Origin::ble("read"));
        assert_eq!(sink.route(err), Routed::Propagated);

        let raised = fatal.raised.lock().unwrap();
        assert_eq!(raised.len(), 1);
        assert!(Arc::ptr_eq(&raised[0], &cause));
    }

    #[test]
    fn test_no_gate_goes_to_fatal_path() {
        let (sink, fatal) = recording_sink();
        assert!(!sink.is_installed());

        let err = UndeliverableError::new(
            OperationError::from(BleError::Disconnected),
            Origin::ble("read"),
        );
        assert_eq!(sink.route(err), Routed::Unhandled);
        assert_eq!(fatal.raised.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_reinstall_same_gate_is_idempotent() {
        let (sink, fatal) = recording_sink();
        assert_eq!(
            sink.install(ErrorGate::ble_default()),
            Ok(Installation::Installed)
        );
        assert_eq!(
            sink.install(ErrorGate::ble_default()),
            Ok(Installation::AlreadyInstalled)
        );

        let cause = Arc::new(OperationError::IllegalState("closed".into()));
        let err = UndeliverableError::new(Arc::clone(&cause), Origin::ble("write"));
        sink.route(err);
        assert_eq!(fatal.raised.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_reinstall_different_gate_is_rejected() {
        let (sink, _fatal) = recording_sink();
        sink.install(ErrorGate::ble_default()).unwrap();

        let other = ErrorGate::builder().suppress(ErrorCategory::Io).build();
        assert_eq!(sink.install(other), Err(GateError::AlreadyInstalled));
        assert_eq!(sink.gate(), Some(&ErrorGate::ble_default()));
    }

    #[test]
    fn test_reinstall_predicate_gate_needs_shared_arc() {
        let (sink, _fatal) = recording_sink();
        let rule = SuppressionRule::predicate(|cause| {
            matches!(cause, OperationError::Ble(BleError::Timeout))
        });
        let build = |rule: &SuppressionRule| ErrorGate::builder().rule(rule.clone()).build();

        assert_eq!(sink.install(build(&rule)), Ok(Installation::Installed));
        assert_eq!(
            sink.install(build(&rule)),
            Ok(Installation::AlreadyInstalled)
        );

        let rebuilt = ErrorGate::builder()
            .suppress_when(|cause| matches!(cause, OperationError::Ble(BleError::Timeout)))
            .build();
        assert_eq!(sink.install(rebuilt), Err(GateError::AlreadyInstalled));
    }

    #[test]
    fn test_panic_fatal_path_carries_original_cause() {
        let sink = ErrorSink::default();
        sink.install(ErrorGate::ble_default()).unwrap();

        let cause = Arc::new(OperationError::NullReference("unrelated bug".into()));
        let err = UndeliverableError::new(Arc::clone(&cause), Origin::ble("read"));

        let payload = panic::catch_unwind(AssertUnwindSafe(|| sink.route(err)))
            .expect_err("propagated error should unwind");
        let raised = payload
            .downcast::<Arc<OperationError>>()
            .expect("payload is the original cause");
        assert!(Arc::ptr_eq(&raised, &cause));
    }

    #[test]
    fn test_clones_share_the_gate() {
        let (sink, _fatal) = recording_sink();
        let clone = sink.clone();
        sink.install(ErrorGate::ble_default()).unwrap();
        assert!(clone.is_installed());
        assert_eq!(
            clone.install(ErrorGate::ble_default()),
            Ok(Installation::AlreadyInstalled)
        );
    }

    #[test]
    fn test_process_sink_is_shared() {
        assert!(std::ptr::eq(ErrorSink::process(), ErrorSink::process()));
    }
}
