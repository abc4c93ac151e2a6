//! Gauge frame decoding
//!
//! Frame payload: [STATUS] [D0 D1 D2 D3]
//!
//! The status byte carries validity, echo count and display mode flags. The
//! four digit bytes are ASCII and the display mode decides where the decimal
//! point goes.

use super::constants::{
    DIGIT_COUNT, FLAG_HIGH_RANGE, FLAG_HIGH_RESOLUTION, FLAG_IMPERIAL, FLAG_INVALID,
    MASK_ECHO_COUNT, MIN_FRAME_LEN, SHIFT_ECHO_COUNT,
};
use crate::error::{Error, Result};
use std::fmt;

/// Measurement unit shown by the gauge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Millimeters,
    Inches,
}

impl Unit {
    /// Display symbol
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Millimeters => "mm",
            Unit::Inches => "\"",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Flags decoded from the frame status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusFlags {
    /// Gauge found no usable echo
    pub invalid: bool,
    /// Echoes used for the measurement (0-3)
    pub echo_count: u8,
    pub high_range: bool,
    pub imperial: bool,
    pub high_resolution: bool,
}

impl StatusFlags {
    /// Decode the status byte (bits 1 and 7 are ignored)
    pub fn from_byte(status: u8) -> Self {
        Self {
            invalid: status & FLAG_INVALID != 0,
            echo_count: (status & MASK_ECHO_COUNT) >> SHIFT_ECHO_COUNT,
            high_range: status & FLAG_HIGH_RANGE != 0,
            imperial: status & FLAG_IMPERIAL != 0,
            high_resolution: status & FLAG_HIGH_RESOLUTION != 0,
        }
    }

    /// Number of digits before the decimal point
    ///
    /// First matching row wins:
    ///
    /// | imperial | high_range | high_resolution | layout    |
    /// |----------|------------|-----------------|-----------|
    /// | yes      | no         | any             | `d.ddd`   |
    /// | yes      | yes        | any             | `dd.dd`   |
    /// | no       | no         | yes             | `dd.dd`   |
    /// | no       | no         | no              | `ddd.d`   |
    /// | no       | yes        | any             | `ddd.d`   |
    pub fn integer_digits(&self) -> usize {
        match (self.imperial, self.high_range, self.high_resolution) {
            (true, false, _) => 1,
            (true, true, _) => 2,
            (false, false, true) => 2,
            (false, false, false) => 3,
            (false, true, _) => 3,
        }
    }

    pub fn unit(&self) -> Unit {
        if self.imperial {
            Unit::Inches
        } else {
            Unit::Millimeters
        }
    }
}

/// Raw gauge value before calibration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawMeasurement {
    pub value: f64,
    pub unit: Unit,
    pub echo_count: u8,
}

/// Outcome of decoding one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// The gauge reported no usable echo
    Invalid,
    Valid(RawMeasurement),
}

/// Build the decimal string for four ASCII digits
///
/// Fails with `DigitParse` on the first byte that is not `b'0'..=b'9'`.
pub fn digit_string(flags: &StatusFlags, digits: &[u8; DIGIT_COUNT]) -> Result<String> {
    if let Some(&byte) = digits.iter().find(|b| !b.is_ascii_digit()) {
        return Err(Error::DigitParse { byte });
    }

    let split = flags.integer_digits();
    let mut out = String::with_capacity(DIGIT_COUNT + 1);
    out.extend(digits[..split].iter().map(|&b| b as char));
    out.push('.');
    out.extend(digits[split..].iter().map(|&b| b as char));
    Ok(out)
}

/// Decode a frame payload (delimiters already stripped)
///
/// Only the status byte is inspected when the invalid flag is set. Bytes past
/// the fourth digit are ignored.
pub fn decode(frame: &[u8]) -> Result<Reading> {
    if frame.len() < MIN_FRAME_LEN {
        return Err(Error::MalformedFrame { len: frame.len() });
    }

    let flags = StatusFlags::from_byte(frame[0]);
    if flags.invalid {
        return Ok(Reading::Invalid);
    }

    let mut digits = [0u8; DIGIT_COUNT];
    digits.copy_from_slice(&frame[1..1 + DIGIT_COUNT]);

    let text = digit_string(&flags, &digits)?;
    let value: f64 = text.parse().map_err(|_| Error::DigitParse { byte: digits[0] })?;

    Ok(Reading::Valid(RawMeasurement {
        value,
        unit: flags.unit(),
        echo_count: flags.echo_count,
    }))
}
