//! Port traits — the boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (radar driver, serial transport, ambient-light
//! sensor) implement these traits. The service consumes them via
//! generics, so the domain core never touches hardware directly.

use crate::engine::RadarFrame;
use crate::error::LinkError;

// ───────────────────────────────────────────────────────────────
// Radar port (driven adapter: sensor → domain)
// ───────────────────────────────────────────────────────────────

/// Source of per-frame radar observations.
pub trait RadarPort {
    /// Wait up to `timeout_ms` for the next frame.
    ///
    /// `None` means the driver produced nothing in time; the loop goes
    /// back to pumping the serial link. Misses are silent.
    fn poll_frame(&mut self, timeout_ms: u32) -> Option<RadarFrame>;
}

// ───────────────────────────────────────────────────────────────
// Serial link port (host ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Byte-oriented host link (USB CDC, 115200 8N1).
///
/// Reads drain a FIFO filled by the transport driver; the main loop is
/// the only consumer. Writes carry one complete stuffed frame.
pub trait SerialLink {
    /// Pop the next inbound byte, if one is buffered. Never blocks.
    fn read_byte(&mut self) -> Option<u8>;

    /// Write one encoded frame (stuffed packet + delimiter).
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), LinkError>;
}

// ───────────────────────────────────────────────────────────────
// Ambient light port
// ───────────────────────────────────────────────────────────────

/// One ambient-light observation.
#[derive(Debug, Clone, Copy)]
pub struct LightSample {
    pub lux: f32,
    pub valid: bool,
}

/// Optional ambient-light sensor. Its readings feed an independent
/// telemetry stream and never touch the state engine.
pub trait LightPort {
    fn read_lux(&mut self) -> LightSample;
}
