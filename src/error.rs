//! Error types for the UTGauge relay

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// UTGauge relay error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration is well-formed but rejected
    #[error("Configuration error: {0}")]
    Config(String),

    /// Material is not present in the material library
    #[error("Unknown material: {0:?}")]
    UnknownMaterial(String),

    /// Frame payload too short, or no end delimiter before the size limit
    #[error("Malformed frame: {len} payload bytes")]
    MalformedFrame {
        /// Payload bytes accumulated when the frame was rejected
        len: usize,
    },

    /// Digit position of a frame held a non-ASCII-digit byte
    #[error("Digit parse error: byte {byte:#04x} is not an ASCII digit")]
    DigitParse {
        /// Offending byte
        byte: u8,
    },

    /// Telemetry message could not be encoded
    #[error("Encode error: {0}")]
    Encode(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error only spoils the current frame
    ///
    /// Frame errors are skipped by the relay loop; everything else ends it.
    pub fn is_frame_error(&self) -> bool {
        matches!(self, Error::MalformedFrame { .. } | Error::DigitParse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_errors_are_recoverable() {
        assert!(Error::MalformedFrame { len: 2 }.is_frame_error());
        assert!(Error::DigitParse { byte: b'x' }.is_frame_error());
        assert!(!Error::UnknownMaterial("unobtainium".to_string()).is_frame_error());
        assert!(!Error::Other("signal handler".to_string()).is_frame_error());
        assert!(
            !Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "gone")).is_frame_error()
        );
    }

    #[test]
    fn test_digit_parse_message() {
        let err = Error::DigitParse { byte: 0x41 };
        assert_eq!(
            err.to_string(),
            "Digit parse error: byte 0x41 is not an ASCII digit"
        );
    }

    #[test]
    fn test_other_message_is_verbatim() {
        let err = Error::Other("Error setting Ctrl-C handler: busy".to_string());
        assert_eq!(err.to_string(), "Error setting Ctrl-C handler: busy");
    }
}
