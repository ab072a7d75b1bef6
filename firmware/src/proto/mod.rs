//! Binary serial protocol.
//!
//! Length-prefixed packets protected by CRC-16/CCITT-FALSE, byte-stuffed
//! with COBS and separated by a single `0x00` delimiter:
//!
//! ```text
//! ┌─────────┬──────────┬─────────┬─────────────┬─────────┬─────────┐
//! │ version │ msg_type │ seq     │ payload_len │ payload │ crc16   │
//! │ (1B)    │ (1B)     │ (2B LE) │ (2B LE)     │ (N B)   │ (2B LE) │
//! └─────────┴──────────┴─────────┴─────────────┴─────────┴─────────┘
//!          └────────────── CRC covers version..payload ───────┘
//! ```
//!
//! COBS guarantees no `0x00` inside a stuffed packet, so the delimiter
//! unambiguously separates frames even after a desync.

pub mod cobs;
pub mod codec;
pub mod crc;
pub mod events;

/// Protocol version carried in every packet header.
pub const PROTO_VERSION: u8 = 1;

// ── Host → device commands ────────────────────────────────────

pub const CMD_SET_HM: u8 = 0x01;
pub const CMD_SET_FOCUS: u8 = 0x02;
pub const CMD_SET_BIO_MS: u8 = 0x03;
pub const CMD_SET_TARGETS_MS: u8 = 0x04;
pub const CMD_PING: u8 = 0x05;

// ── Device → host events ──────────────────────────────────────

pub const EVT_ACK: u8 = 0x81;
pub const EVT_ERR: u8 = 0x82;
pub const EVT_PONG: u8 = 0x83;
pub const EVT_HELLO: u8 = 0x90;
pub const EVT_STATE: u8 = 0x91;
pub const EVT_TARGETS: u8 = 0x92;
pub const EVT_BIO: u8 = 0x93;
pub const EVT_LIGHT: u8 = 0x94;

// ── ACK status codes ──────────────────────────────────────────

pub const ACK_OK: u8 = 0;
pub const ACK_CLAMPED: u8 = 1;
pub const ACK_IGNORED: u8 = 2;

// ── EVT_TARGETS flags ─────────────────────────────────────────

/// The focus fields in the targets header describe a live selection.
pub const FLAG_FOCUS_VALID: u8 = 1 << 0;
/// More targets were observed than fit on the wire.
pub const FLAG_TARGETS_TRUNCATED: u8 = 1 << 1;

// ── Sizing ────────────────────────────────────────────────────

/// Header bytes covered by the CRC together with the payload.
pub const HEADER_LEN: usize = 6;
/// Trailing CRC bytes.
pub const CRC_LEN: usize = 2;
/// Smallest decodable packet: header + empty payload + CRC.
pub const MIN_PACKET_LEN: usize = HEADER_LEN + CRC_LEN;

/// Inbound stuffed-frame accumulator capacity.
pub const RX_STUFFED_CAP: usize = 384;
/// Largest inbound payload a decoded packet may carry.
pub const MAX_RX_PAYLOAD: usize = RX_STUFFED_CAP - MIN_PACKET_LEN;
/// Outbound raw-packet scratch capacity.
pub const TX_PACKET_CAP: usize = 512;
/// Outbound stuffed-frame capacity (raw + COBS overhead + delimiter).
pub const TX_STUFFED_CAP: usize = 640;

/// Hard cap on target entries in one `EVT_TARGETS` frame.
pub const MAX_WIRE_TARGETS: usize = 8;

/// `0xFFFF` marks a missing unsigned wire value (distance, vitals).
pub const SENTINEL_U16: u16 = 0xFFFF;
