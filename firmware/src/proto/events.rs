//! Outbound event payload builders.
//!
//! All multi-byte fields are little-endian. Scaled floats are rounded
//! to the nearest integer and saturated to their field's range; a
//! missing or non-finite value becomes `0xFFFF` in unsigned fields and
//! zero in the signed focus fields (with `FLAG_FOCUS_VALID` cleared).
//!
//! Numeric scales on the wire:
//! - positions and distances in millimeters
//! - bearings in centi-degrees
//! - velocities in deci-cm/s (cm/s × 10)
//! - vitals in centi-bpm (bpm × 100)

use heapless::Vec;

use super::{FLAG_FOCUS_VALID, FLAG_TARGETS_TRUNCATED, MAX_WIRE_TARGETS, SENTINEL_U16};
use crate::engine::fusion::Assessment;
use crate::engine::Target;
use crate::error::ProtoError;

/// `EVT_TARGETS` payload capacity: 20-byte header + 12 bytes per entry.
pub const TARGETS_PAYLOAD_CAP: usize = 20 + MAX_WIRE_TARGETS * 12;

// ── Control-plane events ──────────────────────────────────────

/// `EVT_HELLO`: protocol version and feature bits, sent once at boot.
pub fn hello() -> [u8; 3] {
    let mut p = [0u8; 3];
    p[0] = super::PROTO_VERSION;
    p[1..3].copy_from_slice(&0u16.to_le_bytes());
    p
}

/// `EVT_PONG`: reply to `CMD_PING`.
pub fn pong(t_ms: u32) -> [u8; 4] {
    t_ms.to_le_bytes()
}

/// `EVT_ACK`: command accepted, with status and the applied value.
pub fn ack(cmd_id: u8, status: u8, value: i32) -> [u8; 6] {
    let mut p = [0u8; 6];
    p[0] = cmd_id;
    p[1] = status;
    p[2..6].copy_from_slice(&value.to_le_bytes());
    p
}

/// `EVT_ERR`: command or frame rejected.
pub fn err(cmd_id: u8, error: ProtoError) -> [u8; 2] {
    [cmd_id, error.code()]
}

// ── Telemetry events ──────────────────────────────────────────

/// `EVT_STATE` payload.
pub fn state(t_ms: u32, a: &Assessment) -> [u8; 12] {
    let mut p = [0u8; 12];
    p[0..4].copy_from_slice(&t_ms.to_le_bytes());
    p[4] = a.state as u8;
    p[5] = a.pose as u8;
    p[6] = a.head_moving as u8;
    p[7] = a.human as u8;
    p[8] = a.n_targets.min(u8::MAX as usize) as u8;
    p[9] = a.dist_new as u8;
    p[10..12].copy_from_slice(&scale_u16(a.dist_cm, 10.0).to_le_bytes());
    p
}

/// `EVT_BIO` payload. Vitals carry last-good values; the flags reflect
/// the current gate.
pub fn bio(t_ms: u32, a: &Assessment) -> [u8; 12] {
    let mut p = [0u8; 12];
    p[0..4].copy_from_slice(&t_ms.to_le_bytes());
    p[4] = a.vitals_allowed as u8;
    p[5] = a.vitals_valid as u8;
    p[6] = a.br_new as u8;
    p[7] = a.hr_new as u8;
    p[8..10].copy_from_slice(&scale_u16(a.br_bpm, 100.0).to_le_bytes());
    p[10..12].copy_from_slice(&scale_u16(a.hr_bpm, 100.0).to_le_bytes());
    p
}

/// `EVT_LIGHT` payload. A non-finite lux reading is marked invalid.
pub fn light(t_ms: u32, valid: bool, lux: f32) -> [u8; 9] {
    let mut p = [0u8; 9];
    p[0..4].copy_from_slice(&t_ms.to_le_bytes());
    p[4] = (valid && lux.is_finite()) as u8;
    p[5..9].copy_from_slice(&lux.to_le_bytes());
    p
}

/// `EVT_TARGETS` payload: focus header plus up to eight entries.
pub fn targets(
    t_ms: u32,
    a: &Assessment,
    list: &[Target],
    forced_focus_cluster: i16,
    range_step_cm_s: f32,
) -> Vec<u8, TARGETS_PAYLOAD_CAP> {
    let mut p: Vec<u8, TARGETS_PAYLOAD_CAP> = Vec::new();

    let n_wire = list.len().min(MAX_WIRE_TARGETS);
    let mut flags = 0u8;
    if list.len() > MAX_WIRE_TARGETS {
        flags |= FLAG_TARGETS_TRUNCATED;
    }

    put(&mut p, &t_ms.to_le_bytes());
    put(&mut p, &forced_focus_cluster.to_le_bytes());

    match a.focus {
        Some(f) if f.target.x_m.is_finite() && f.target.y_m.is_finite() => {
            flags |= FLAG_FOCUS_VALID;
            let t = &f.target;
            put(&mut p, &t.cluster_id.to_le_bytes());
            put(&mut p, &scale_i16(t.x_m, 1000.0).to_le_bytes());
            put(&mut p, &scale_i16(t.y_m, 1000.0).to_le_bytes());
            put(&mut p, &scale_u16(Some(t.range_m()), 1000.0).to_le_bytes());
            put(&mut p, &scale_i16(t.bearing_deg(), 100.0).to_le_bytes());
            put(&mut p, &scale_i16(t.speed_cm_s(range_step_cm_s), 10.0).to_le_bytes());
        }
        _ => {
            put(&mut p, &(-1i16).to_le_bytes());
            put(&mut p, &0i16.to_le_bytes());
            put(&mut p, &0i16.to_le_bytes());
            put(&mut p, &0u16.to_le_bytes());
            put(&mut p, &0i16.to_le_bytes());
            put(&mut p, &0i16.to_le_bytes());
        }
    }

    put(&mut p, &[flags, n_wire as u8]);

    for t in &list[..n_wire] {
        put(&mut p, &t.cluster_id.to_le_bytes());
        put(&mut p, &scale_i16(t.x_m, 1000.0).to_le_bytes());
        put(&mut p, &scale_i16(t.y_m, 1000.0).to_le_bytes());
        put(&mut p, &scale_u16(Some(t.range_m()), 1000.0).to_le_bytes());
        put(&mut p, &scale_i16(t.bearing_deg(), 100.0).to_le_bytes());
        put(&mut p, &scale_i16(t.speed_cm_s(range_step_cm_s), 10.0).to_le_bytes());
    }

    p
}

// ── Scaling helpers ──────────────────────────────────────────

fn put<const N: usize>(out: &mut Vec<u8, N>, bytes: &[u8]) {
    // Capacity is sized for the maximal frame; overflow is impossible.
    let _ = out.extend_from_slice(bytes);
}

/// Scale and round into a signed field; non-finite becomes zero.
fn scale_i16(value: f32, scale: f32) -> i16 {
    let scaled = value * scale;
    if !scaled.is_finite() {
        return 0;
    }
    scaled.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Scale and round into an unsigned field; missing or non-finite
/// becomes the `0xFFFF` sentinel.
fn scale_u16(value: Option<f32>, scale: f32) -> u16 {
    match value {
        Some(v) => {
            let scaled = v * scale;
            if !scaled.is_finite() {
                return SENTINEL_U16;
            }
            scaled.round().clamp(0.0, u16::MAX as f32) as u16
        }
        None => SENTINEL_U16,
    }
}

// ── Tests ────────────────────────────────────────────────────
