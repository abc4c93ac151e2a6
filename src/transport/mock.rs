//! Mock transport for testing

use super::Transport;
use crate::error::Result;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

/// Mock transport for unit testing
///
/// Reads drain the injected bytes. Once drained, reads fail with
/// `UnexpectedEof` so a test pipeline ends instead of blocking forever.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

struct MockTransportInner {
    read_buffer: VecDeque<u8>,
    /// Upper bound on bytes handed out per read, to exercise partial reads
    chunk_size: usize,
    reads: usize,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        MockTransport {
            inner: Arc::new(Mutex::new(MockTransportInner {
                read_buffer: VecDeque::new(),
                chunk_size: usize::MAX,
                reads: 0,
            })),
        }
    }

    /// Inject data to be read
    pub fn inject_read(&self, data: &[u8]) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.read_buffer.extend(data);
    }

    /// Limit how many bytes a single read returns
    pub fn set_chunk_size(&self, chunk_size: usize) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.chunk_size = chunk_size.max(1);
    }

    /// Bytes still waiting to be read
    pub fn remaining(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.read_buffer.len()
    }

    /// Number of read calls that returned data
    pub fn read_count(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.reads
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.read_buffer.is_empty() {
            return Err(
                io::Error::new(io::ErrorKind::UnexpectedEof, "mock transport drained").into(),
            );
        }

        let available = inner.read_buffer.len().min(buffer.len()).min(inner.chunk_size);
        for (slot, byte) in buffer.iter_mut().zip(inner.read_buffer.drain(..available)) {
            *slot = byte;
        }
        inner.reads += 1;

        Ok(available)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}
