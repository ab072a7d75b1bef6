//! Application service — owns the engine, codec state, and cadences.
//!
//! One loop iteration is three calls:
//!
//! 1. [`pump_serial`](AppService::pump_serial) — drain inbound bytes,
//!    dispatch every decoded packet, reply inline (acks are causally
//!    ordered before any telemetry that could reflect the command).
//! 2. [`on_radar_frame`](AppService::on_radar_frame) — fold the frame
//!    into the fusion engine, then emit due telemetry in targets →
//!    state → bio order.
//! 3. [`poll_light`](AppService::poll_light) — the independent
//!    ambient-light stream.
//!
//! The service never blocks and never allocates; outbound frames are
//! staged in a stack scratch buffer.

use log::{info, warn};

use super::dispatcher::{self, Reply};
use super::ports::{LightPort, SerialLink};
use super::telemetry::{StateKey, TelemetryScheduler};
use crate::config::{RuntimeConfig, Tuning};
use crate::engine::fusion::FusionEngine;
use crate::engine::{PersonState, RadarFrame};
use crate::proto::codec::FrameDecoder;
use crate::proto::{
    codec, events, EVT_ACK, EVT_BIO, EVT_ERR, EVT_HELLO, EVT_LIGHT, EVT_PONG, EVT_STATE,
    EVT_TARGETS, TX_STUFFED_CAP,
};

pub struct AppService {
    cfg: RuntimeConfig,
    tuning: Tuning,
    engine: FusionEngine,
    decoder: FrameDecoder,
    sched: TelemetryScheduler,
    tx_seq: u16,
}

impl AppService {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            cfg: RuntimeConfig::default(),
            tuning,
            engine: FusionEngine::new(),
            decoder: FrameDecoder::new(),
            sched: TelemetryScheduler::new(),
            tx_seq: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce the protocol. Must be the first frame after boot.
    pub fn hello(&mut self, link: &mut impl SerialLink) {
        info!("hello: proto v{}", crate::proto::PROTO_VERSION);
        self.send(link, EVT_HELLO, &events::hello());
    }

    // ── Inbound ───────────────────────────────────────────────

    /// Drain every buffered inbound byte and dispatch decoded packets.
    pub fn pump_serial(&mut self, link: &mut impl SerialLink, now_ms: u32) {
        while let Some(byte) = link.read_byte() {
            let Some(result) = self.decoder.feed(byte) else {
                continue;
            };
            match result {
                Ok(packet) => {
                    let reply =
                        dispatcher::dispatch(packet.msg_type, &packet.payload, &mut self.cfg, now_ms);
                    self.send_reply(link, reply);
                }
                Err(frame_err) => {
                    warn!("{frame_err}");
                    self.send(link, EVT_ERR, &events::err(frame_err.cmd_id, frame_err.error));
                }
            }
        }
    }

    // ── Per-frame orchestration ───────────────────────────────

    /// Fold one radar frame and emit due telemetry.
    pub fn on_radar_frame(&mut self, frame: &RadarFrame, link: &mut impl SerialLink, now_ms: u32) {
        let a = self.engine.update(frame, &self.cfg, &self.tuning, now_ms);

        if self
            .sched
            .targets_due(a.n_targets, self.cfg.targets_period_ms, now_ms)
        {
            let payload = events::targets(
                now_ms,
                &a,
                &frame.targets,
                self.cfg.forced_focus_cluster,
                self.tuning.range_step_cm_s,
            );
            self.send(link, EVT_TARGETS, &payload);
        }

        let key = StateKey {
            state: a.state,
            pose: a.pose,
            head_moving: a.head_moving,
            n_targets: a.n_targets,
        };
        if self.sched.state_due(key, now_ms) {
            self.send(link, EVT_STATE, &events::state(now_ms, &a));
        }

        if self.sched.bio_due(self.cfg.bio_period_ms, now_ms) {
            self.send(link, EVT_BIO, &events::bio(now_ms, &a));
        }
    }

    /// Sample and emit the ambient-light side channel when due.
    pub fn poll_light(&mut self, light: &mut impl LightPort, link: &mut impl SerialLink, now_ms: u32) {
        if self.sched.light_due(self.cfg.light_period_ms, now_ms) {
            let sample = light.read_lux();
            self.send(link, EVT_LIGHT, &events::light(now_ms, sample.valid, sample.lux));
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> PersonState {
        self.engine.state()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.cfg
    }

    pub fn tx_seq(&self) -> u16 {
        self.tx_seq
    }

    // ── Internal ──────────────────────────────────────────────

    fn send_reply(&mut self, link: &mut impl SerialLink, reply: Reply) {
        match reply {
            Reply::Ack {
                cmd_id,
                status,
                value,
            } => self.send(link, EVT_ACK, &events::ack(cmd_id, status, value)),
            Reply::Pong { t_ms } => self.send(link, EVT_PONG, &events::pong(t_ms)),
            Reply::Err { cmd_id, error } => self.send(link, EVT_ERR, &events::err(cmd_id, error)),
        }
    }

    fn send(&mut self, link: &mut impl SerialLink, msg_type: u8, payload: &[u8]) {
        let mut wire = [0u8; TX_STUFFED_CAP];
        let Some(len) = codec::encode_packet(msg_type, self.tx_seq, payload, &mut wire) else {
            warn!("tx: frame 0x{msg_type:02X} too large, dropped");
            return;
        };
        self.tx_seq = self.tx_seq.wrapping_add(1);
        if let Err(e) = link.write_frame(&wire[..len]) {
            warn!("tx: {e}");
        }
    }
}
