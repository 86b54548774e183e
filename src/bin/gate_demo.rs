// src/bin/gate_demo.rs
//! Installs the BLE error gate on the process sink and runs a simulated
//! GATT read whose subscriber is disposed before the read fails.
//!
//! Usage: gate_demo [path/to/gate.json]

use std::time::Duration;

use ble_error_gate::ble::simulated::SimGattRead;
use ble_error_gate::{install_from_config, BleError, Delivery, ErrorSink, GateConfig};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => GateConfig::load(&path)?,
        None => GateConfig::default(),
    };

    let sink = ErrorSink::process();
    install_from_config(sink, &config)?;

    let read = SimGattRead::failing(Uuid::new_v4(), BleError::GattError("GATT disconnect".into()))
        .with_latency(Duration::from_millis(100));
    let characteristic = read.characteristic();

    let (subscription, handle) = read.start(sink);
    println!("Reading characteristic {}", characteristic);
    subscription.dispose();
    println!("Subscriber disposed before the read completed");

    match handle.await? {
        Delivery::Routed(routed) => println!("Late failure routed to the gate: {:?}", routed),
        other => println!("Read result: {:?}", other),
    }
    Ok(())
}
