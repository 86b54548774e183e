// Undeliverable BLE error gate

pub mod ble;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod ffi;
pub mod gate;
pub mod operation;
pub mod sink;

pub use ble::BleError;
pub use bootstrap::{install_ble_gate, install_from_config};
pub use config::{ConfigError, GateConfig};
pub use error::{ErrorCategory, OperationError, Origin, UndeliverableError};
pub use gate::{Decision, ErrorGate, ErrorGateBuilder, RulePredicate, SuppressionRule};
pub use operation::{operation, Completion, Delivery, Subscription};
pub use sink::{
    AbortFatalPath, ErrorSink, FatalErrorPath, GateError, Installation, PanicFatalPath, Routed,
};
