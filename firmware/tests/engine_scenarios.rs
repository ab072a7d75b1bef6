//! End-to-end engine scenarios driven through the application service.
//!
//! Frames go in through the radar port, telemetry comes back out as
//! decoded wire frames — the same path the host observes.

#![cfg(not(target_os = "espidf"))]

use heapless::Vec as HVec;
use wavesense::adapters::serial::LoopbackLink;
use wavesense::app::service::AppService;
use wavesense::config::Tuning;
use wavesense::engine::{PersonState, RadarFrame, Target, MAX_TARGETS};
use wavesense::proto::codec::{encode_packet, FrameDecoder};
use wavesense::proto::{
    CMD_SET_BIO_MS, CMD_SET_HM, EVT_ACK, EVT_BIO, EVT_STATE, TX_STUFFED_CAP,
};

// ── Harness ──────────────────────────────────────────────────

struct Harness {
    app: AppService,
    link: LoopbackLink,
    now_ms: u32,
}

impl Harness {
    fn new() -> Self {
        Self {
            app: AppService::new(Tuning::default()),
            link: LoopbackLink::new(),
            now_ms: 0,
        }
    }

    /// Advance 100 ms, pump inbound, feed one radar frame.
    fn step(&mut self, frame: &RadarFrame) {
        self.now_ms += 100;
        self.app.pump_serial(&mut self.link, self.now_ms);
        self.app.on_radar_frame(frame, &mut self.link, self.now_ms);
    }

    fn send_command(&mut self, msg_type: u8, payload: &[u8]) {
        let mut buf = [0u8; TX_STUFFED_CAP];
        let n = encode_packet(msg_type, 0, payload, &mut buf).unwrap();
        self.link.push_inbound(&buf[..n]);
    }

    /// Decode and drain everything the firmware wrote.
    fn drain(&mut self) -> Vec<(u8, Vec<u8>)> {
        let mut dec = FrameDecoder::new();
        let mut out = Vec::new();
        for frame in self.link.take_outbound() {
            for b in frame {
                if let Some(r) = dec.feed(b) {
                    let p = r.expect("device output must decode");
                    out.push((p.msg_type, p.payload.to_vec()));
                }
            }
        }
        out
    }
}

fn resting_frame() -> RadarFrame {
    let mut targets: HVec<Target, MAX_TARGETS> = HVec::new();
    targets
        .push(Target {
            cluster_id: 2,
            x_m: 0.0,
            y_m: 0.8,
            doppler_index: 0,
        })
        .unwrap();
    RadarFrame {
        human: true,
        targets,
        distance_cm: Some(80.0),
        breath_bpm: Some(14.0),
        heart_bpm: Some(72.0),
    }
}

fn states(events: &[(u8, Vec<u8>)]) -> Vec<u8> {
    events
        .iter()
        .filter(|(t, _)| *t == EVT_STATE)
        .map(|(_, p)| p[4])
        .collect()
}

// ── Scenarios ────────────────────────────────────────────────

/// Six stationary single-target frames with plausible vitals: the state
/// goes STILL_NEAR → RESTING_VITALS exactly when the confirmation
/// streak reaches five, and stays there.
#[test]
fn resting_vitals_confirmation() {
    let mut h = Harness::new();
    let frame = resting_frame();

    for _ in 0..4 {
        h.step(&frame);
        assert_eq!(h.app.state(), PersonState::StillNear);
    }
    h.step(&frame);
    assert_eq!(h.app.state(), PersonState::RestingVitals);
    h.step(&frame);
    assert_eq!(h.app.state(), PersonState::RestingVitals);

    let seen = states(&h.drain());
    assert_eq!(
        seen,
        vec![
            PersonState::StillNear as u8,
            PersonState::RestingVitals as u8
        ],
        "one frame per material change"
    );
}

/// Losing the target list briefly keeps the vitals gate open through
/// the fallback lock while the module's human flag holds steady.
#[test]
fn fallback_lock_keeps_gate_open() {
    let mut h = Harness::new();
    // Fast bio cadence so every step can emit.
    h.send_command(CMD_SET_BIO_MS, &50u16.to_le_bytes());

    let frame = resting_frame();
    for _ in 0..10 {
        h.step(&frame);
    }
    h.drain();

    let loss = RadarFrame {
        human: true,
        targets: HVec::new(),
        distance_cm: None,
        breath_bpm: Some(12.0),
        heart_bpm: Some(70.0),
    };
    h.step(&loss);

    let events = h.drain();
    let bio = events
        .iter()
        .find(|(t, _)| *t == EVT_BIO)
        .expect("bio frame due");
    assert_eq!(bio.1[4], 1, "vitals still allowed through fallback lock");
    assert_eq!(bio.1[5], 1, "vitals valid through fallback lock");
}

/// SET_HM=1 while resting: acknowledged, the next frame leaves
/// RESTING_VITALS, and the bio stream reports the closed gate.
#[test]
fn head_motion_kills_vitals() {
    let mut h = Harness::new();
    h.send_command(CMD_SET_BIO_MS, &50u16.to_le_bytes());

    let frame = resting_frame();
    for _ in 0..6 {
        h.step(&frame);
    }
    assert_eq!(h.app.state(), PersonState::RestingVitals);
    h.drain();

    h.send_command(CMD_SET_HM, &[1]);
    h.step(&frame);

    assert_ne!(h.app.state(), PersonState::RestingVitals);
    assert_eq!(h.app.state(), PersonState::Moving);

    let events = h.drain();
    let ack = events.iter().find(|(t, _)| *t == EVT_ACK).expect("ack");
    assert_eq!(ack.1[0], CMD_SET_HM);

    let bio = events.iter().find(|(t, _)| *t == EVT_BIO).expect("bio");
    assert_eq!(bio.1[4], 0, "gate must close under head motion");
    assert_eq!(bio.1[5], 0);
}

/// A second target forces MULTI_TARGET and restarts the confirmation
/// streak: one clean frame afterwards cannot re-enter RESTING_VITALS.
#[test]
fn multi_target_restarts_confirmation() {
    let mut h = Harness::new();
    let frame = resting_frame();
    for _ in 0..6 {
        h.step(&frame);
    }
    assert_eq!(h.app.state(), PersonState::RestingVitals);

    let mut crowd = resting_frame();
    crowd
        .targets
        .push(Target {
            cluster_id: 9,
            x_m: 1.0,
            y_m: 2.0,
            doppler_index: 0,
        })
        .unwrap();
    h.step(&crowd);
    assert_eq!(h.app.state(), PersonState::MultiTarget);

    h.step(&frame);
    assert_eq!(h.app.state(), PersonState::StillNear);
}

/// Absence requires both the hold window and the empty-frame streak;
/// last-good distance keeps feeding EVT_STATE while it builds.
#[test]
fn absence_hysteresis_and_last_good_distance() {
    let mut h = Harness::new();
    h.step(&resting_frame());

    let empty = RadarFrame::default();
    for _ in 0..11 {
        h.step(&empty);
        assert_ne!(h.app.state(), PersonState::NoTarget);
    }
    h.step(&empty);
    assert_eq!(h.app.state(), PersonState::NoTarget);

    let events = h.drain();
    let state_frames: Vec<&Vec<u8>> = events
        .iter()
        .filter(|(t, _)| *t == EVT_STATE)
        .map(|(_, p)| p)
        .collect();
    // Every state frame carried the stored 800 mm distance.
    for p in state_frames {
        assert_eq!(u16::from_le_bytes([p[10], p[11]]), 800);
    }
}
