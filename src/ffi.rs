//! FFI entry points for the host application shell
//!
//! The host calls one of these from its creation hook. Both install onto the
//! process sink, so calling them again after the host is recreated is
//! harmless.
//!
//! Return codes: 0 installed, 1 already installed, -1 error.

use std::ffi::CStr;
use std::os::raw::c_char;

use crate::bootstrap::{install_ble_gate, install_from_config};
use crate::config::GateConfig;
use crate::sink::{ErrorSink, GateError, Installation};

fn status(result: Result<Installation, GateError>) -> i32 {
    match result {
        Ok(Installation::Installed) => 0,
        Ok(Installation::AlreadyInstalled) => 1,
        Err(e) => {
            log::warn!("ble_error_gate: {}", e);
            -1
        }
    }
}

/// Install the default BLE gate on the process sink.
#[no_mangle]
pub extern "C" fn ble_error_gate_install() -> i32 {
    status(install_ble_gate(ErrorSink::process()))
}

/// Install a gate read from the JSON file at `config_path`.
///
/// A null path installs the default BLE gate. A path that is not valid
/// UTF-8 or cannot be loaded installs nothing and returns -1.
#[no_mangle]
pub extern "C" fn ble_error_gate_install_config(config_path: *const c_char) -> i32 {
    if config_path.is_null() {
        return status(install_ble_gate(ErrorSink::process()));
    }

    let path = match unsafe { CStr::from_ptr(config_path) }.to_str() {
        Ok(path) => path,
        Err(e) => {
            log::warn!("ble_error_gate: config path is not UTF-8: {}", e);
            return -1;
        }
    };
    let config = match GateConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("ble_error_gate: {}", e);
            return -1;
        }
    };
    status(install_from_config(ErrorSink::process(), &config))
}
