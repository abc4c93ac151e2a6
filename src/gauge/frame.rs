//! Frame extraction from the gauge byte stream
//!
//! Wire format: [0x01] [STATUS] [D0 D1 D2 D3] [0x17]
//!
//! `FrameReader` hunts for the start delimiter, then collects bytes until the
//! end delimiter. Bytes read past a frame stay buffered for the next call.

use super::constants::{FRAME_END, FRAME_START, IDLE_POLL_MS, MAX_FRAME_LEN, MIN_FRAME_LEN};
use crate::error::{Error, Result};
use crate::transport::Transport;
use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

/// Size of a single transport read
const READ_CHUNK: usize = 64;

/// Delimited frame reader
///
/// There is no timeout: a silent transport keeps `next_frame` waiting.
pub struct FrameReader {
    pending: VecDeque<u8>,
    frame: Vec<u8>,
}

impl FrameReader {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::with_capacity(READ_CHUNK),
            frame: Vec::with_capacity(MAX_FRAME_LEN),
        }
    }

    /// Read the next frame payload, delimiters stripped
    ///
    /// Fails with `MalformedFrame` when the payload is shorter than
    /// `MIN_FRAME_LEN`, or when no end delimiter shows up within
    /// `MAX_FRAME_LEN` bytes. Either way the reader is left ready to hunt for
    /// the next start delimiter.
    pub fn next_frame<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<&[u8]> {
        // Discard up to and including the start delimiter
        let mut skipped = 0usize;
        while self.next_byte(transport)? != FRAME_START {
            skipped += 1;
        }
        if skipped > 0 {
            log::debug!("Skipped {} bytes before frame start", skipped);
        }

        self.frame.clear();
        loop {
            let byte = self.next_byte(transport)?;
            if byte == FRAME_END {
                break;
            }
            if self.frame.len() >= MAX_FRAME_LEN {
                log::warn!("No frame end after {} bytes, resyncing", self.frame.len());
                return Err(Error::MalformedFrame {
                    len: self.frame.len(),
                });
            }
            self.frame.push(byte);
        }

        if self.frame.len() < MIN_FRAME_LEN {
            return Err(Error::MalformedFrame {
                len: self.frame.len(),
            });
        }

        log::trace!("Frame: {:02X?}", self.frame);
        Ok(&self.frame)
    }

    /// Bytes read from the transport but not yet consumed
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    fn next_byte<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<u8> {
        loop {
            if let Some(byte) = self.pending.pop_front() {
                return Ok(byte);
            }

            let mut chunk = [0u8; READ_CHUNK];
            let n = transport.read(&mut chunk)?;
            if n == 0 {
                // Gauge idle between readings
                thread::sleep(Duration::from_millis(IDLE_POLL_MS));
                continue;
            }
            self.pending.extend(&chunk[..n]);
        }
    }
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}
