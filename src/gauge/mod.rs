//! Ultrasonic thickness gauge driver
//!
//! The gauge streams one frame per measurement over a 2400 baud UART:
//!
//! ```text
//! [0x01] [STATUS] [D0 D1 D2 D3] [0x17]
//! ```
//!
//! # Status byte
//!
//! | bit | meaning |
//! |-----|---------|
//! | 0   | invalid (no usable echo) |
//! | 1   | fixed 1 |
//! | 2-3 | echo count |
//! | 4   | high range |
//! | 5   | imperial |
//! | 6   | high resolution |
//! | 7   | fixed 1 |
//!
//! The gauge assumes a sound velocity of 6400 m/s; `Calibrator` rescales the
//! displayed value for the configured material.

pub mod calibration;
pub mod constants;
pub mod frame;
pub mod materials;
pub mod protocol;

pub use calibration::{CalibratedReading, Calibrator, describe, telemetry_value};
pub use frame::FrameReader;
pub use materials::{CalibrationFactor, MaterialLibrary};
pub use protocol::{RawMeasurement, Reading, StatusFlags, Unit, decode};

use crate::error::Result;
use crate::transport::Transport;

/// Gauge connection: owns the transport for its whole lifetime
///
/// Dropping the gauge closes the transport.
pub struct UtGauge<T: Transport> {
    transport: T,
    reader: FrameReader,
    calibrator: Calibrator,
}

impl<T: Transport> UtGauge<T> {
    pub fn new(transport: T, calibrator: Calibrator) -> Self {
        log::info!(
            "Gauge ready: material {:?} (factor {:.6})",
            calibrator.material(),
            calibrator.factor().value()
        );
        Self {
            transport,
            reader: FrameReader::new(),
            calibrator,
        }
    }

    /// Block until the next frame and decode it
    pub fn next_raw(&mut self) -> Result<Reading> {
        let frame = self.reader.next_frame(&mut self.transport)?;
        let reading = decode(frame)?;
        log::debug!("Decoded {:?}", reading);
        Ok(reading)
    }

    /// Block until the next frame, decode and calibrate it
    ///
    /// `Ok(None)` means the gauge reported no reading.
    pub fn next_reading(&mut self) -> Result<Option<CalibratedReading>> {
        let reading = self.next_raw()?;
        Ok(self.calibrator.calibrate(&reading))
    }

    pub fn set_material(&mut self, material: &str) -> Result<()> {
        self.calibrator.set_material(material)
    }

    pub fn calibrator(&self) -> &Calibrator {
        &self.calibrator
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Drop for UtGauge<T> {
    fn drop(&mut self) {
        log::debug!("Releasing gauge transport");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::transport::MockTransport;
    use approx::assert_relative_eq;

    fn gauge_with(bytes: &[u8]) -> UtGauge<MockTransport> {
        let transport = MockTransport::new();
        transport.inject_read(bytes);
        let calibrator = Calibrator::new(MaterialLibrary::standard(), "core ten steel").unwrap();
        UtGauge::new(transport, calibrator)
    }

    #[test]
    fn test_pipeline_valid_then_invalid() {
        let mut gauge = gauge_with(&[
            0x01, 0x82, b'1', b'2', b'3', b'4', 0x17, // 123.4 mm
            0x01, 0x83, b'0', b'0', b'0', b'0', 0x17, // no echo
        ]);

        let first = gauge.next_reading().unwrap().unwrap();
        assert_relative_eq!(first.value, 114.145, epsilon = 1e-9);
        assert_eq!(first.unit, Unit::Millimeters);

        assert!(gauge.next_reading().unwrap().is_none());
        assert!(matches!(gauge.next_reading(), Err(Error::Io(_))));
    }

    #[test]
    fn test_material_change_applies_to_next_reading() {
        let mut gauge = gauge_with(&[0x01, 0x82, b'0', b'6', b'4', b'0', 0x17]);
        gauge.set_material("titanium").unwrap();
        assert_eq!(gauge.calibrator().material(), "titanium");
        let reading = gauge.next_reading().unwrap().unwrap();
        assert_relative_eq!(reading.value, 64.0 * 6165.0 / 6400.0, epsilon = 1e-9);
    }

    #[test]
    fn test_digit_error_surfaces() {
        let mut gauge = gauge_with(&[0x01, 0x82, b'1', b'x', b'3', b'4', 0x17]);
        assert!(matches!(
            gauge.next_reading(),
            Err(Error::DigitParse { byte: b'x' })
        ));
    }
}
