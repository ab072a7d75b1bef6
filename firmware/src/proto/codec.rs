//! Packet encoder and streaming frame decoder.
//!
//! The encoder is pure: header + payload + CRC into a scratch buffer,
//! COBS-stuffed into the caller's output with a trailing `0x00`.
//!
//! The decoder is a byte feeder. It accumulates stuffed bytes until the
//! delimiter, then unstuffs and validates in one pass:
//!
//! ```text
//! bytes ──▶ accumulate ──0x00──▶ COBS decode ──▶ length ──▶ version ──▶ CRC
//!              │ overflow?            │ invalid     │           │         │
//!              └──── BAD_LEN ◀────────┴─────────────┘   UNSUPPORTED   CRC_FAIL
//! ```
//!
//! A tripped overflow flag discards everything up to the next delimiter;
//! partial frames are never parsed.

use heapless::Vec;

use super::{
    cobs, crc::crc16_ccitt_false, CRC_LEN, HEADER_LEN, MAX_RX_PAYLOAD, MIN_PACKET_LEN,
    PROTO_VERSION, RX_STUFFED_CAP, TX_PACKET_CAP,
};
use crate::error::{FrameError, ProtoError};

/// A validated inbound packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub msg_type: u8,
    pub seq: u16,
    pub payload: Vec<u8, MAX_RX_PAYLOAD>,
}

/// Encode one packet into `out` and return the wire length.
///
/// `out` receives the COBS-stuffed packet plus the `0x00` delimiter.
/// Returns `None` when the payload exceeds the packet scratch or the
/// stuffed frame exceeds `out`.
pub fn encode_packet(msg_type: u8, seq: u16, payload: &[u8], out: &mut [u8]) -> Option<usize> {
    let packet_len = HEADER_LEN + payload.len() + CRC_LEN;
    if packet_len > TX_PACKET_CAP {
        return None;
    }

    let mut raw = [0u8; TX_PACKET_CAP];
    raw[0] = PROTO_VERSION;
    raw[1] = msg_type;
    raw[2..4].copy_from_slice(&seq.to_le_bytes());
    raw[4..6].copy_from_slice(&(payload.len() as u16).to_le_bytes());
    raw[6..6 + payload.len()].copy_from_slice(payload);

    let crc = crc16_ccitt_false(&raw[..HEADER_LEN + payload.len()]);
    raw[HEADER_LEN + payload.len()..packet_len].copy_from_slice(&crc.to_le_bytes());

    let stuffed = cobs::encode(&raw[..packet_len], out)?;
    if stuffed >= out.len() {
        return None;
    }
    out[stuffed] = 0x00;
    Some(stuffed + 1)
}

// ── Decoder ──────────────────────────────────────────────────

/// Streaming decoder fed one byte at a time from the serial FIFO.
pub struct FrameDecoder {
    stuffed: [u8; RX_STUFFED_CAP],
    len: usize,
    overflowed: bool,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            stuffed: [0; RX_STUFFED_CAP],
            len: 0,
            overflowed: false,
        }
    }

    /// Feed one byte.
    ///
    /// Returns `Some(Ok(packet))` when a delimiter completes a valid
    /// frame, `Some(Err(e))` when it completes a rejected one, `None`
    /// otherwise. A spurious delimiter (empty accumulator) is ignored.
    pub fn feed(&mut self, byte: u8) -> Option<Result<Packet, FrameError>> {
        if byte != 0x00 {
            if self.len == self.stuffed.len() {
                self.overflowed = true;
            } else {
                self.stuffed[self.len] = byte;
                self.len += 1;
            }
            return None;
        }

        let len = self.len;
        let overflowed = self.overflowed;
        self.len = 0;
        self.overflowed = false;

        if overflowed {
            return Some(Err(FrameError {
                error: ProtoError::BadLen,
                cmd_id: 0,
            }));
        }
        if len == 0 {
            return None;
        }

        Some(Self::parse(&self.stuffed[..len]))
    }

    /// Discard any partial frame (e.g. after a transport reopen).
    pub fn reset(&mut self) {
        self.len = 0;
        self.overflowed = false;
    }

    fn parse(stuffed: &[u8]) -> Result<Packet, FrameError> {
        let mut raw = [0u8; RX_STUFFED_CAP];
        let raw_len = cobs::decode(stuffed, &mut raw).map_err(|_| FrameError {
            error: ProtoError::BadLen,
            cmd_id: 0,
        })?;
        let raw = &raw[..raw_len];

        // The msg_type byte is reported back in EVT_ERR when readable.
        let cmd_id = if raw.len() >= 2 { raw[1] } else { 0 };

        if raw.len() < MIN_PACKET_LEN {
            return Err(FrameError {
                error: ProtoError::BadLen,
                cmd_id,
            });
        }

        let version = raw[0];
        let msg_type = raw[1];
        let seq = u16::from_le_bytes([raw[2], raw[3]]);
        let payload_len = u16::from_le_bytes([raw[4], raw[5]]) as usize;

        if raw.len() != HEADER_LEN + payload_len + CRC_LEN {
            return Err(FrameError {
                error: ProtoError::BadLen,
                cmd_id: msg_type,
            });
        }

        if version != PROTO_VERSION {
            return Err(FrameError {
                error: ProtoError::UnsupportedVersion,
                cmd_id: msg_type,
            });
        }

        let crc_offset = HEADER_LEN + payload_len;
        let expected = u16::from_le_bytes([raw[crc_offset], raw[crc_offset + 1]]);
        if crc16_ccitt_false(&raw[..crc_offset]) != expected {
            return Err(FrameError {
                error: ProtoError::CrcFail,
                cmd_id: msg_type,
            });
        }

        let mut payload = Vec::new();
        payload
            .extend_from_slice(&raw[HEADER_LEN..crc_offset])
            .map_err(|_| FrameError {
                error: ProtoError::BadLen,
                cmd_id: msg_type,
            })?;

        Ok(Packet {
            msg_type,
            seq,
            payload,
        })
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::TX_STUFFED_CAP;

    fn feed_all(dec: &mut FrameDecoder, bytes: &[u8]) -> Vec2<Result<Packet, FrameError>> {
        let mut results = Vec2::new();
        for &b in bytes {
            if let Some(r) = dec.feed(b) {
                results.push(r);
            }
        }
        results
    }

    type Vec2<T> = std::vec::Vec<T>;

    fn encode(msg_type: u8, seq: u16, payload: &[u8]) -> Vec2<u8> {
        let mut out = [0u8; TX_STUFFED_CAP];
        let n = encode_packet(msg_type, seq, payload, &mut out).unwrap();
        out[..n].to_vec()
    }

    #[test]
    fn roundtrip_empty_payload() {
        let wire = encode(0x05, 7, &[]);
        let mut dec = FrameDecoder::new();
        let results = feed_all(&mut dec, &wire);
        assert_eq!(results.len(), 1);
        let pkt = results[0].as_ref().unwrap();
        assert_eq!(pkt.msg_type, 0x05);
        assert_eq!(pkt.seq, 7);
        assert!(pkt.payload.is_empty());
    }

    #[test]
    fn roundtrip_with_payload() {
        let payload = [0x01, 0x00, 0xFF, 0x00, 0x42];
        let wire = encode(0x92, 0xBEEF, &payload);
        let mut dec = FrameDecoder::new();
        let results = feed_all(&mut dec, &wire);
        let pkt = results[0].as_ref().unwrap();
        assert_eq!(pkt.msg_type, 0x92);
        assert_eq!(pkt.seq, 0xBEEF);
        assert_eq!(pkt.payload.as_slice(), &payload);
    }

    #[test]
    fn no_zero_inside_stuffed_frame() {
        let wire = encode(0x91, 0, &[0x00; 32]);
        assert_eq!(wire.iter().filter(|&&b| b == 0).count(), 1);
        assert_eq!(*wire.last().unwrap(), 0x00);
    }

    #[test]
    fn spurious_delimiters_ignored() {
        let mut dec = FrameDecoder::new();
        assert!(dec.feed(0x00).is_none());
        assert!(dec.feed(0x00).is_none());

        let wire = encode(0x05, 1, &[]);
        let results = feed_all(&mut dec, &wire);
        assert!(results[0].is_ok());
    }

    #[test]
    fn split_feed_across_chunks() {
        let wire = encode(0x01, 3, &[1]);
        let mut dec = FrameDecoder::new();
        let (a, b) = wire.split_at(wire.len() / 2);
        assert!(feed_all(&mut dec, a).is_empty());
        let results = feed_all(&mut dec, b);
        assert!(results[0].is_ok());
    }

    #[test]
    fn crc_corruption_detected() {
        let mut wire = encode(0x01, 0, &[1]);
        // Flip a bit in the stuffed body (not the delimiter). The frame
        // still unstuffs, but the CRC or length check must reject it.
        wire[1] ^= 0x01;
        let mut dec = FrameDecoder::new();
        let results = feed_all(&mut dec, &wire);
        let err = results[0].as_ref().unwrap_err();
        assert!(matches!(
            err.error,
            ProtoError::CrcFail | ProtoError::BadLen | ProtoError::UnsupportedVersion
        ));
    }

    #[test]
    fn wrong_version_rejected() {
        // Hand-build a version-2 packet with a valid CRC.
        let mut raw = [0u8; MIN_PACKET_LEN];
        raw[0] = 2;
        raw[1] = 0x05;
        let crc = crc16_ccitt_false(&raw[..HEADER_LEN]);
        raw[HEADER_LEN..].copy_from_slice(&crc.to_le_bytes());

        let mut stuffed = [0u8; 32];
        let n = cobs::encode(&raw, &mut stuffed).unwrap();
        stuffed[n] = 0;

        let mut dec = FrameDecoder::new();
        let results = feed_all(&mut dec, &stuffed[..n + 1]);
        let err = results[0].as_ref().unwrap_err();
        assert_eq!(err.error, ProtoError::UnsupportedVersion);
        assert_eq!(err.cmd_id, 0x05);
    }

    #[test]
    fn length_mismatch_rejected_with_cmd_id() {
        // Header claims a 4-byte payload but carries none.
        let mut raw = [0u8; MIN_PACKET_LEN];
        raw[0] = PROTO_VERSION;
        raw[1] = 0x03;
        raw[4] = 4;
        let crc = crc16_ccitt_false(&raw[..HEADER_LEN]);
        raw[HEADER_LEN..].copy_from_slice(&crc.to_le_bytes());

        let mut stuffed = [0u8; 32];
        let n = cobs::encode(&raw, &mut stuffed).unwrap();
        stuffed[n] = 0;

        let mut dec = FrameDecoder::new();
        let results = feed_all(&mut dec, &stuffed[..n + 1]);
        let err = results[0].as_ref().unwrap_err();
        assert_eq!(err.error, ProtoError::BadLen);
        assert_eq!(err.cmd_id, 0x03);
    }

    #[test]
    fn short_packet_rejected() {
        let raw = [PROTO_VERSION, 0x01, 0x00];
        let mut stuffed = [0u8; 16];
        let n = cobs::encode(&raw, &mut stuffed).unwrap();
        stuffed[n] = 0;

        let mut dec = FrameDecoder::new();
        let results = feed_all(&mut dec, &stuffed[..n + 1]);
        let err = results[0].as_ref().unwrap_err();
        assert_eq!(err.error, ProtoError::BadLen);
        assert_eq!(err.cmd_id, 0x01);
    }

    #[test]
    fn overflow_discards_until_delimiter() {
        let mut dec = FrameDecoder::new();
        for _ in 0..RX_STUFFED_CAP + 100 {
            assert!(dec.feed(0x55).is_none());
        }
        // Delimiter after overflow reports one BAD_LEN with cmd_id 0.
        let err = dec.feed(0x00).unwrap().unwrap_err();
        assert_eq!(err.error, ProtoError::BadLen);
        assert_eq!(err.cmd_id, 0);

        // Decoder recovers on the next well-formed frame.
        let wire = encode(0x05, 9, &[]);
        let results = feed_all(&mut dec, &wire);
        assert!(results[0].is_ok());
    }

    #[test]
    fn back_to_back_frames() {
        let mut wire = encode(0x01, 1, &[1]);
        wire.extend_from_slice(&encode(0x02, 2, &[0xFE, 0xFF]));
        let mut dec = FrameDecoder::new();
        let results = feed_all(&mut dec, &wire);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().msg_type, 0x01);
        assert_eq!(results[1].as_ref().unwrap().msg_type, 0x02);
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let big = [0u8; TX_PACKET_CAP];
        let mut out = [0u8; TX_STUFFED_CAP];
        assert!(encode_packet(0x92, 0, &big, &mut out).is_none());
    }
}
