//! Simulated GATT reads
//!
//! A `SimGattRead` completes on a background tokio task after a configurable
//! latency, the way a real characteristic read completes on the BLE
//! library's own thread. Disposing the subscription before the read finishes
//! reproduces the late-failure race the error gate exists for.

use std::time::Duration;

use tokio::task::JoinHandle;
use uuid::Uuid;

use super::BleError;
use crate::error::Origin;
use crate::operation::{operation, Delivery, Subscription};
use crate::sink::ErrorSink;

enum ReadOutcome {
    Value(Vec<u8>),
    Fail(BleError),
}

/// A simulated read of one GATT characteristic.
pub struct SimGattRead {
    characteristic: Uuid,
    outcome: ReadOutcome,
    /// Uses tokio time, so paused clocks advance instantly in tests.
    latency: Duration,
}

impl SimGattRead {
    /// A read that returns `value`.
    pub fn succeeding(characteristic: Uuid, value: Vec<u8>) -> Self {
        Self {
            characteristic,
            outcome: ReadOutcome::Value(value),
            latency: Duration::ZERO,
        }
    }

    /// A read that fails with `error`.
    pub fn failing(characteristic: Uuid, error: BleError) -> Self {
        Self {
            characteristic,
            outcome: ReadOutcome::Fail(error),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn characteristic(&self) -> Uuid {
        self.characteristic
    }

    /// Start the read on the current tokio runtime.
    ///
    /// Returns the subscriber side and a handle resolving to what happened to
    /// the result once the read finished.
    pub fn start(self, sink: &ErrorSink) -> (Subscription<Vec<u8>>, JoinHandle<Delivery>) {
        let (completion, subscription) = operation(sink.clone(), Origin::ble("read"));
        let handle = tokio::spawn(async move {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            let result = match self.outcome {
                ReadOutcome::Value(value) => Ok(value),
                ReadOutcome::Fail(error) => Err(error.into()),
            };
            completion.complete(result)
        });
        (subscription, handle)
    }
}
