//! MAVLink v1 framing for outbound telemetry
//!
//! Frame format: [0xFE] [LEN] [SEQ] [SYS] [COMP] [MSG] [PAYLOAD] [CRC_L] [CRC_H]
//!
//! The CRC is CRC-16/MCRF4XX (MAVLink's "X.25") over LEN..PAYLOAD followed by
//! the per-message CRC_EXTRA seed byte. Payload fields are little-endian and
//! ordered by size, largest first.

use super::messages::{TelemetryMessage, VALUE_NAME_LEN};
use crc::{CRC_16_MCRF4XX, Crc};

pub const MAVLINK_V1_STX: u8 = 0xFE;
pub const MAVLINK_V2_STX: u8 = 0xFD;

pub const MSG_ID_PING: u8 = 4;
pub const MSG_ID_NAMED_VALUE_FLOAT: u8 = 251;

const CRC_EXTRA_PING: u8 = 237;
const CRC_EXTRA_NAMED_VALUE_FLOAT: u8 = 170;

const HEADER_LEN: usize = 6;
const CRC_LEN: usize = 2;
/// Largest payload we emit (NAMED_VALUE_FLOAT: 4 + 4 + 10)
const MAX_PAYLOAD_LEN: usize = 18;
const MAX_FRAME_LEN: usize = HEADER_LEN + MAX_PAYLOAD_LEN + CRC_LEN;

const X25: Crc<u16> = Crc::<u16>::new(&CRC_16_MCRF4XX);

/// Reusable MAVLink v1 encoder
///
/// Holds the sender identity and the rolling sequence number. One frame
/// buffer is reused for every message.
pub struct MavlinkEncoder {
    system_id: u8,
    component_id: u8,
    sequence: u8,
    data: [u8; MAX_FRAME_LEN],
    len: usize,
}

impl MavlinkEncoder {
    pub fn new(system_id: u8, component_id: u8) -> Self {
        let mut data = [0u8; MAX_FRAME_LEN];
        data[0] = MAVLINK_V1_STX;
        Self {
            system_id,
            component_id,
            sequence: 0,
            data,
            len: 0,
        }
    }

    /// Encode a message; the returned slice is valid until the next call
    pub fn encode(&mut self, msg: &TelemetryMessage) -> &[u8] {
        match msg {
            TelemetryMessage::Ping {
                time_usec,
                seq,
                target_system,
                target_component,
            } => {
                let p = &mut self.data[HEADER_LEN..];
                p[0..8].copy_from_slice(&time_usec.to_le_bytes());
                p[8..12].copy_from_slice(&seq.to_le_bytes());
                p[12] = *target_system;
                p[13] = *target_component;
                self.finalize(MSG_ID_PING, 14, CRC_EXTRA_PING);
            }
            TelemetryMessage::NamedValueFloat {
                time_boot_ms,
                name,
                value,
            } => {
                let p = &mut self.data[HEADER_LEN..];
                p[0..4].copy_from_slice(&time_boot_ms.to_le_bytes());
                p[4..8].copy_from_slice(&value.to_le_bytes());
                // char[10], NUL padded; names are validated on construction
                let name = name.as_bytes();
                let n = name.len().min(VALUE_NAME_LEN);
                p[8..8 + n].copy_from_slice(&name[..n]);
                p[8 + n..8 + VALUE_NAME_LEN].fill(0);
                self.finalize(MSG_ID_NAMED_VALUE_FLOAT, 18, CRC_EXTRA_NAMED_VALUE_FLOAT);
            }
        }
        &self.data[..self.len]
    }

    /// Sequence number the next frame will carry
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    /// Fill header, append CRC, advance sequence
    fn finalize(&mut self, msg_id: u8, payload_len: usize, crc_extra: u8) {
        self.data[1] = payload_len as u8;
        self.data[2] = self.sequence;
        self.data[3] = self.system_id;
        self.data[4] = self.component_id;
        self.data[5] = msg_id;

        let crc_pos = HEADER_LEN + payload_len;
        let crc = checksum(&self.data[1..crc_pos], crc_extra);
        self.data[crc_pos..crc_pos + CRC_LEN].copy_from_slice(&crc.to_le_bytes());
        self.len = crc_pos + CRC_LEN;
        self.sequence = self.sequence.wrapping_add(1);
    }
}

/// MAVLink frame checksum over header-after-STX and payload
pub fn checksum(data: &[u8], crc_extra: u8) -> u16 {
    let mut digest = X25.digest();
    digest.update(data);
    digest.update(&[crc_extra]);
    digest.finalize()
}

/// Message id of an inbound MAVLink v1 or v2 frame, if it looks like one
pub fn peek_message_id(datagram: &[u8]) -> Option<u32> {
    match datagram.first()? {
        &MAVLINK_V1_STX if datagram.len() >= HEADER_LEN => Some(datagram[5] as u32),
        &MAVLINK_V2_STX if datagram.len() >= 10 => Some(
            datagram[7] as u32 | (datagram[8] as u32) << 8 | (datagram[9] as u32) << 16,
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc_check_value() {
        assert_eq!(X25.checksum(b"123456789"), 0x6F91);
    }

    #[test]
    fn test_ping_frame() {
        let mut encoder = MavlinkEncoder::new(255, 0);
        let frame = encoder.encode(&TelemetryMessage::probe(1_500_000));
        assert_eq!(
            frame,
            &[
                0xFE, 0x0E, 0x00, 0xFF, 0x00, 0x04, // header
                0x60, 0xE3, 0x16, 0x00, 0x00, 0x00, 0x00, 0x00, // time_usec
                0x00, 0x00, 0x00, 0x00, // seq
                0x00, 0x00, // targets
                0xDB, 0x3A, // crc
            ]
        );
    }

    #[test]
    fn test_named_value_frame() {
        let mut encoder = MavlinkEncoder::new(255, 0);
        encoder.encode(&TelemetryMessage::probe(0));

        let msg = TelemetryMessage::named_value(2500, "UTGauge", 114.145).unwrap();
        let frame = encoder.encode(&msg);
        assert_eq!(
            frame,
            &[
                0xFE, 0x12, 0x01, 0xFF, 0x00, 0xFB, // header, seq 1
                0xC4, 0x09, 0x00, 0x00, // time_boot_ms
                0x3D, 0x4A, 0xE4, 0x42, // value
                b'U', b'T', b'G', b'a', b'u', b'g', b'e', 0x00, 0x00, 0x00, // name
                0x33, 0x89, // crc
            ]
        );
    }

    #[test]
    fn test_name_padding_cleared_between_frames() {
        let mut encoder = MavlinkEncoder::new(1, 1);
        let long = TelemetryMessage::named_value(0, "ABCDEFGHIJ", 0.0).unwrap();
        encoder.encode(&long);
        let short = TelemetryMessage::named_value(0, "X", 0.0).unwrap();
        let frame = encoder.encode(&short);
        assert_eq!(&frame[14..24], b"X\0\0\0\0\0\0\0\0\0");
    }

    #[test]
    fn test_sequence_wraps() {
        let mut encoder = MavlinkEncoder::new(1, 1);
        for _ in 0..255 {
            encoder.encode(&TelemetryMessage::probe(0));
        }
        assert_eq!(encoder.sequence(), 255);
        assert_eq!(encoder.encode(&TelemetryMessage::probe(0))[2], 255);
        assert_eq!(encoder.sequence(), 0);
    }

    #[test]
    fn test_peek_message_id() {
        let mut encoder = MavlinkEncoder::new(1, 1);
        let frame = encoder.encode(&TelemetryMessage::probe(0)).to_vec();
        assert_eq!(peek_message_id(&frame), Some(MSG_ID_PING as u32));

        let v2_heartbeat = [0xFD, 9, 0, 0, 7, 1, 1, 0, 0, 0];
        assert_eq!(peek_message_id(&v2_heartbeat), Some(0));
        assert_eq!(peek_message_id(b"hello"), None);
        assert_eq!(peek_message_id(&[]), None);
    }
}
