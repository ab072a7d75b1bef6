//! Unified error types for the WaveSense firmware.
//!
//! A single `Error` enum that every subsystem can convert into keeps the
//! main loop's error handling uniform. All variants are `Copy` so they
//! can be passed through the engine and telemetry paths without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Wire protocol error codes
// ---------------------------------------------------------------------------

/// Error codes carried in `EVT_ERR` frames.
///
/// The discriminants are the on-wire values; they must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ProtoError {
    /// `msg_type` is not a known host command.
    UnknownCmd = 1,
    /// Frame or payload length is wrong, the COBS stream was invalid, or
    /// the inbound accumulator overflowed.
    BadLen = 2,
    /// Payload decoded but a field is out of its allowed range.
    BadValue = 3,
    /// CRC-16 over header+payload did not match.
    CrcFail = 4,
    /// Packet version byte is not the supported protocol version.
    UnsupportedVersion = 5,
}

impl ProtoError {
    /// On-wire error code.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ProtoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCmd => write!(f, "unknown command"),
            Self::BadLen => write!(f, "bad length"),
            Self::BadValue => write!(f, "bad value"),
            Self::CrcFail => write!(f, "CRC mismatch"),
            Self::UnsupportedVersion => write!(f, "unsupported version"),
        }
    }
}

// ---------------------------------------------------------------------------
// Framing errors (decoder side)
// ---------------------------------------------------------------------------

/// A rejected inbound frame: the wire error code plus the command id the
/// `EVT_ERR` report should reference (0 when the header was unreadable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameError {
    pub error: ProtoError,
    pub cmd_id: u8,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame rejected (cmd 0x{:02X}): {}", self.cmd_id, self.error)
    }
}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

/// Serial transport failures. Telemetry is best-effort: the service logs
/// these and keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The outbound write did not accept the full frame.
    WriteFailed,
    /// The transport reported a read-side fault.
    ReadFailed,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed => write!(f, "serial write failed"),
            Self::ReadFailed => write!(f, "serial read failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An inbound frame failed framing validation.
    Frame(FrameError),
    /// The serial link failed.
    Link(LinkError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame(e) => write!(f, "frame: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
