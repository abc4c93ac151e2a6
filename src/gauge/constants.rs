//! Constants for the ultrasonic thickness gauge serial protocol

// Frame delimiters
pub const FRAME_START: u8 = 0x01;
pub const FRAME_END: u8 = 0x17;

// Frame sizes
pub const MIN_FRAME_LEN: usize = 5; // STATUS(1) + DIGITS(4)
pub const MAX_FRAME_LEN: usize = 64; // Give up on a frame that never ends
pub const DIGIT_COUNT: usize = 4;

// Status byte flags (bits 1 and 7 are fixed at 1 by the gauge)
pub const FLAG_INVALID: u8 = 1 << 0;
pub const MASK_ECHO_COUNT: u8 = 0b11 << 2;
pub const SHIFT_ECHO_COUNT: u8 = 2;
pub const FLAG_HIGH_RANGE: u8 = 1 << 4;
pub const FLAG_IMPERIAL: u8 = 1 << 5;
pub const FLAG_HIGH_RESOLUTION: u8 = 1 << 6;

/// Sound velocity the gauge assumes internally (m/s)
pub const REFERENCE_VELOCITY: f64 = 6400.0;

// Serial defaults
pub const DEFAULT_BAUD_RATE: u32 = 2400;
pub const DEFAULT_MATERIAL: &str = "core ten steel";

// Timing constants
pub const IDLE_POLL_MS: u64 = 2;
