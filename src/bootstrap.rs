//! Startup hook for the application shell
//!
//! Call `install_ble_gate` while the host is being created, before any BLE
//! operation is scheduled. Hosts that get recreated (e.g. on rotation) may
//! call it again; the second call is a no-op.

use crate::config::GateConfig;
use crate::sink::{ErrorSink, GateError, Installation};

/// Install the default gate: late BLE failures are suppressed.
pub fn install_ble_gate(sink: &ErrorSink) -> Result<Installation, GateError> {
    install_from_config(sink, &GateConfig::default())
}

/// Install a gate built from `config`.
pub fn install_from_config(
    sink: &ErrorSink,
    config: &GateConfig,
) -> Result<Installation, GateError> {
    sink.install(config.build_gate())
}
