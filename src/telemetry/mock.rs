//! Mock telemetry channel for testing

use super::{TelemetryChannel, TelemetryMessage};
use crate::error::Result;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock channel recording every sent message
///
/// The simulated peer stays silent until `respond_after` probes have been
/// sent, then answers every wait. Clones share state so a test can keep a
/// handle while the relay owns the channel.
#[derive(Clone, Default)]
pub struct MockChannel {
    inner: Arc<Mutex<MockChannelInner>>,
}

#[derive(Default)]
struct MockChannelInner {
    sent: Vec<TelemetryMessage>,
    waits: Vec<Duration>,
    respond_after: usize,
}

impl MockChannel {
    /// Peer that answers the first probe
    pub fn new() -> Self {
        Self::responding_after(1)
    }

    /// Peer that answers only once `probes` probes were sent
    pub fn responding_after(probes: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockChannelInner {
                respond_after: probes,
                ..Default::default()
            })),
        }
    }

    /// All messages sent so far
    pub fn sent(&self) -> Vec<TelemetryMessage> {
        self.lock().sent.clone()
    }

    /// Number of probes sent so far
    pub fn probe_count(&self) -> usize {
        self.lock().sent.iter().filter(|m| m.is_probe()).count()
    }

    /// Timeouts passed to each `wait_for_message` call
    pub fn waits(&self) -> Vec<Duration> {
        self.lock().waits.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockChannelInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TelemetryChannel for MockChannel {
    fn send(&mut self, msg: &TelemetryMessage) -> Result<()> {
        self.lock().sent.push(msg.clone());
        Ok(())
    }

    fn wait_for_message(&mut self, timeout: Duration) -> Result<bool> {
        let mut inner = self.lock();
        inner.waits.push(timeout);
        let probes = inner.sent.iter().filter(|m| m.is_probe()).count();
        Ok(probes >= inner.respond_after)
    }
}
