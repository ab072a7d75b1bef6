//! Command dispatcher — validates inbound packets and mutates config.
//!
//! Validation order per command: exact length → value range → apply.
//! Every accepted command is acknowledged; every rejection produces a
//! single `EVT_ERR` referencing the offending command id. Configuration
//! is untouched on any rejection.

use log::{info, warn};

use crate::config::{RuntimeConfig, MIN_PERIOD_MS};
use crate::error::ProtoError;
use crate::proto::{
    ACK_CLAMPED, ACK_OK, CMD_PING, CMD_SET_BIO_MS, CMD_SET_FOCUS, CMD_SET_HM, CMD_SET_TARGETS_MS,
};

/// Outcome of dispatching one inbound packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Command applied; echo status and the applied value.
    Ack { cmd_id: u8, status: u8, value: i32 },
    /// `CMD_PING` response.
    Pong { t_ms: u32 },
    /// Command rejected; config unchanged.
    Err { cmd_id: u8, error: ProtoError },
}

/// Dispatch one decoded packet against the runtime configuration.
pub fn dispatch(msg_type: u8, payload: &[u8], cfg: &mut RuntimeConfig, now_ms: u32) -> Reply {
    match msg_type {
        CMD_SET_HM => {
            if payload.len() != 1 {
                return reject(msg_type, ProtoError::BadLen);
            }
            let hm = payload[0];
            if hm > 1 {
                return reject(msg_type, ProtoError::BadValue);
            }
            cfg.head_moving = hm == 1;
            info!("cmd: head_moving={}", cfg.head_moving);
            Reply::Ack {
                cmd_id: msg_type,
                status: ACK_OK,
                value: hm as i32,
            }
        }

        CMD_SET_FOCUS => {
            if payload.len() != 2 {
                return reject(msg_type, ProtoError::BadLen);
            }
            let cluster = i16::from_le_bytes([payload[0], payload[1]]);
            cfg.forced_focus_cluster = cluster;
            info!("cmd: forced_focus_cluster={cluster}");
            Reply::Ack {
                cmd_id: msg_type,
                status: ACK_OK,
                value: cluster as i32,
            }
        }

        CMD_SET_BIO_MS => set_period(msg_type, payload, &mut cfg.bio_period_ms, "bio_period_ms"),

        CMD_SET_TARGETS_MS => set_period(
            msg_type,
            payload,
            &mut cfg.targets_period_ms,
            "targets_period_ms",
        ),

        CMD_PING => {
            if !payload.is_empty() {
                return reject(msg_type, ProtoError::BadLen);
            }
            Reply::Pong { t_ms: now_ms }
        }

        other => reject(other, ProtoError::UnknownCmd),
    }
}

/// Shared handler for the two period commands: clamp low, ack the
/// applied value, flag the clamp.
fn set_period(cmd_id: u8, payload: &[u8], slot: &mut u16, name: &str) -> Reply {
    if payload.len() != 2 {
        return reject(cmd_id, ProtoError::BadLen);
    }
    let requested = u16::from_le_bytes([payload[0], payload[1]]);
    let applied = requested.max(MIN_PERIOD_MS);
    *slot = applied;
    info!("cmd: {name}={applied}");
    Reply::Ack {
        cmd_id,
        status: if requested < MIN_PERIOD_MS {
            ACK_CLAMPED
        } else {
            ACK_OK
        },
        value: applied as i32,
    }
}

fn reject(cmd_id: u8, error: ProtoError) -> Reply {
    warn!("cmd 0x{cmd_id:02X} rejected: {error}");
    Reply::Err { cmd_id, error }
}

// ── Tests ────────────────────────────────────────────────────
