//! Material calibration of raw gauge readings

use super::materials::{CalibrationFactor, MaterialLibrary};
use super::protocol::{Reading, Unit};
use crate::error::Result;
use std::fmt;

/// Thickness corrected for the active material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibratedReading {
    pub value: f64,
    pub unit: Unit,
    pub echo_count: u8,
}

impl fmt::Display for CalibratedReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} - {} echoes",
            format_value(self.value),
            self.unit,
            self.echo_count
        )
    }
}

/// Significant digits shown for a thickness value
const DISPLAY_DIGITS: usize = 12;

/// Format to 12 significant digits, trailing zeros trimmed, at least one
/// fractional digit (`12.0`, `114.145`)
fn format_value(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{:?}", value);
    }

    // Exponent after rounding, so 9.9999999999999 counts as 10
    let scientific = format!("{:.*e}", DISPLAY_DIGITS - 1, value);
    let exponent: i32 = match scientific.rsplit_once('e').map(|(_, e)| e.parse()) {
        Some(Ok(e)) => e,
        _ => return format!("{:?}", value),
    };
    if !(-4..DISPLAY_DIGITS as i32).contains(&exponent) {
        return format!("{:?}", value);
    }

    let decimals = (DISPLAY_DIGITS as i32 - 1 - exponent) as usize;
    let mut text = format!("{:.*}", decimals, value);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').len();
        text.truncate(trimmed);
    }
    if text.ends_with('.') {
        text.push('0');
    } else if !text.contains('.') {
        text.push_str(".0");
    }
    text
}

/// Human-readable line for a reading, `"no reading"` when the gauge had none
pub fn describe(reading: Option<&CalibratedReading>) -> String {
    match reading {
        Some(r) => r.to_string(),
        None => "no reading".to_string(),
    }
}

/// Value sent over telemetry, `-1.0` when the gauge had no reading
pub fn telemetry_value(reading: Option<&CalibratedReading>) -> f32 {
    reading.map_or(-1.0, |r| r.value as f32)
}

/// Applies the active material's calibration factor
#[derive(Debug, Clone)]
pub struct Calibrator {
    library: MaterialLibrary,
    material: String,
    factor: CalibrationFactor,
}

impl Calibrator {
    /// Create a calibrator for `material`
    ///
    /// Fails with `UnknownMaterial` if the library has no such entry.
    pub fn new(library: MaterialLibrary, material: &str) -> Result<Self> {
        let factor = library.calibration_factor(material)?;
        Ok(Self {
            library,
            material: material.to_string(),
            factor,
        })
    }

    /// Switch material; on error the previous material stays active
    pub fn set_material(&mut self, material: &str) -> Result<()> {
        self.factor = self.library.calibration_factor(material)?;
        self.material = material.to_string();
        log::info!(
            "Material set to {:?} (factor {:.6})",
            self.material,
            self.factor.value()
        );
        Ok(())
    }

    pub fn material(&self) -> &str {
        &self.material
    }

    pub fn factor(&self) -> CalibrationFactor {
        self.factor
    }

    /// Rescale a reading; `Invalid` has nothing to scale and yields `None`
    pub fn calibrate(&self, reading: &Reading) -> Option<CalibratedReading> {
        match reading {
            Reading::Invalid => None,
            Reading::Valid(raw) => Some(CalibratedReading {
                value: self.factor.apply(raw.value),
                unit: raw.unit,
                echo_count: raw.echo_count,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::gauge::protocol::{RawMeasurement, decode};
    use approx::assert_relative_eq;

    fn core_ten() -> Calibrator {
        Calibrator::new(MaterialLibrary::standard(), "core ten steel").unwrap()
    }

    #[test]
    fn test_core_ten_scenario() {
        let calibrator = core_ten();
        let reading = decode(&[0x00, b'1', b'2', b'3', b'4']).unwrap();
        let calibrated = calibrator.calibrate(&reading).unwrap();

        assert_relative_eq!(calibrated.value, 114.145, epsilon = 1e-9);
        assert_eq!(calibrated.value, 123.4 * (5920.0 / 6400.0));
        assert_eq!(calibrated.unit, Unit::Millimeters);
        assert_eq!(calibrated.echo_count, 0);
    }

    #[test]
    fn test_invalid_passes_through() {
        let calibrator = core_ten();
        let calibrated = calibrator.calibrate(&Reading::Invalid);
        assert!(calibrated.is_none());
        assert_eq!(describe(calibrated.as_ref()), "no reading");
        assert_eq!(telemetry_value(calibrated.as_ref()), -1.0);
    }

    #[test]
    fn test_text_format() {
        let reading = CalibratedReading {
            value: 2.5,
            unit: Unit::Inches,
            echo_count: 3,
        };
        assert_eq!(describe(Some(&reading)), "2.5 \" - 3 echoes");

        let reading = CalibratedReading {
            value: 12.0,
            unit: Unit::Millimeters,
            echo_count: 1,
        };
        assert_eq!(reading.to_string(), "12.0 mm - 1 echoes");
    }

    #[test]
    fn test_text_format_hides_float_noise() {
        let calibrator = core_ten();
        let reading = decode(&[0x00, b'1', b'2', b'3', b'4']).unwrap();
        let calibrated = calibrator.calibrate(&reading).unwrap();
        assert_ne!(format!("{:?}", calibrated.value), "114.145");
        assert_eq!(calibrated.to_string(), "114.145 mm - 0 echoes");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(114.14500000000001), "114.145");
        assert_eq!(format_value(46.25), "46.25");
        assert_eq!(format_value(100.0), "100.0");
        assert_eq!(format_value(9.9999999999999), "10.0");
        assert_eq!(format_value(0.1 + 0.2), "0.3");
        assert_eq!(format_value(0.0), "0.0");
        assert_eq!(format_value(-1.5), "-1.5");
        assert_eq!(format_value(1.0 / 3.0), "0.333333333333");
    }

    #[test]
    fn test_set_material() {
        let mut calibrator = core_ten();
        calibrator.set_material("lead").unwrap();
        assert_eq!(calibrator.material(), "lead");

        let raw = Reading::Valid(RawMeasurement {
            value: 64.0,
            unit: Unit::Millimeters,
            echo_count: 1,
        });
        assert_relative_eq!(calibrator.calibrate(&raw).unwrap().value, 21.5);
    }

    #[test]
    fn test_unknown_material_keeps_previous() {
        let mut calibrator = core_ten();
        assert!(matches!(
            calibrator.set_material("cheese"),
            Err(Error::UnknownMaterial(_))
        ));
        assert_eq!(calibrator.material(), "core ten steel");
        assert_eq!(calibrator.factor().value(), 5920.0 / 6400.0);

        assert!(Calibrator::new(MaterialLibrary::standard(), "cheese").is_err());
    }
}
