//! Transport layer for I/O abstraction

use crate::error::Result;

mod mock;
mod serial;
pub use mock::MockTransport;
pub use serial::SerialTransport;

/// Byte source the gauge frames are read from
pub trait Transport: Send {
    /// Read data into buffer, returns number of bytes read
    ///
    /// `Ok(0)` means no data arrived within the transport's poll window;
    /// callers retry.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;
}
