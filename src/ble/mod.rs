//! BLE error types and a simulated GATT operation
//!
//! `BleError` is the failure type of BLE operations. Its variants mirror the
//! failure kinds the host BLE library reports (connection, advertising,
//! scan, GATT, MTU, disconnect, timeout). The gate's default rule treats
//! every one of these as benign when it arrives after the subscriber has
//! already been disposed.

pub mod simulated;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BleError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Advertising error: {0}")]
    AdvertisingError(String),

    #[error("Scan error: {0}")]
    ScanError(String),

    #[error("GATT error: {0}")]
    GattError(String),

    #[error("Payload exceeds MTU ({size} > {mtu})")]
    MtuExceeded { size: usize, mtu: usize },

    #[error("Peer disconnected")]
    Disconnected,

    #[error("Operation timed out")]
    Timeout,
}
