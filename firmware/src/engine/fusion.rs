//! Fusion & state engine.
//!
//! Folds per-frame radar observations into hysteretic presence state,
//! movement detection, a vitals validity streak, and the six-state
//! person classifier:
//!
//! ```text
//!        ¬presence_recent ∧ absent_streak ≥ N ──▶ NO_TARGET
//!        n_targets > 1 ─────────────────────────▶ MULTI_TARGET
//!        head or target moving ─────────────────▶ MOVING
//!        near ∧ vitals_streak ≥ N ──────────────▶ RESTING_VITALS
//!        near ─────────────────────────────────▶ STILL_NEAR
//!        otherwise ────────────────────────────▶ PRESENT_FAR
//! ```
//!
//! The cascade is evaluated once per frame, top to bottom; the order is
//! semantically significant (MULTI_TARGET outranks MOVING, movement
//! outranks the vitals states).
//!
//! All counters saturate at 255 and all timestamps are monotonic
//! milliseconds since boot, compared with wrapping arithmetic.

use log::info;

use super::{focus, FocusTarget, PersonState, PoseGuess, RadarFrame};
use crate::config::{RuntimeConfig, Tuning};

/// Everything downstream consumers need from one engine update.
#[derive(Debug, Clone)]
pub struct Assessment {
    pub state: PersonState,
    pub pose: PoseGuess,
    /// Raw module-level human flag from this frame.
    pub human: bool,
    /// Actual target count this frame (not the wire cap).
    pub n_targets: usize,
    pub focus: Option<FocusTarget>,
    /// `head_moving` as read from config at frame time.
    pub head_moving: bool,

    /// Effective distance, cm: this frame's reading or last-good.
    pub dist_cm: Option<f32>,
    /// True when this frame contributed a fresh distance reading.
    pub dist_new: bool,

    /// Effective breath rate, bpm.
    pub br_bpm: Option<f32>,
    pub br_new: bool,
    /// Effective heart rate, bpm.
    pub hr_bpm: Option<f32>,
    pub hr_new: bool,

    /// The vitals gate: no head motion and an unambiguous single target
    /// (or the short fallback lock after losing it).
    pub vitals_allowed: bool,
    /// Gate plus plausible breath and heart readings this frame.
    pub vitals_valid: bool,
}

/// Owns every hysteresis counter and last-good value.
///
/// Created once at boot, mutated only on the main loop's frame cadence.
pub struct FusionEngine {
    // Last-good readings. Only finite, positive values are ever stored.
    last_dist_cm: Option<f32>,
    last_br_bpm: Option<f32>,
    last_hr_bpm: Option<f32>,

    // Presence hysteresis.
    last_presence_ms: Option<u32>,
    absent_streak: u8,

    // Vitals and fallback-lock hysteresis.
    vitals_streak: u8,
    human_stable_streak: u8,
    seen_single_target: bool,
    last_single_target_ms: u32,

    state: PersonState,
}

impl Default for FusionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FusionEngine {
    pub fn new() -> Self {
        Self {
            last_dist_cm: None,
            last_br_bpm: None,
            last_hr_bpm: None,
            last_presence_ms: None,
            absent_streak: 0,
            vitals_streak: 0,
            human_stable_streak: 0,
            seen_single_target: false,
            last_single_target_ms: 0,
            state: PersonState::NoTarget,
        }
    }

    /// Current classification (initially `NO_TARGET`).
    pub fn state(&self) -> PersonState {
        self.state
    }

    /// Current vitals confirmation streak.
    pub fn vitals_streak(&self) -> u8 {
        self.vitals_streak
    }

    /// Fold one radar frame into the engine state.
    pub fn update(
        &mut self,
        frame: &RadarFrame,
        cfg: &RuntimeConfig,
        tuning: &Tuning,
        now_ms: u32,
    ) -> Assessment {
        let head_moving = cfg.head_moving;
        let n_targets = frame.targets.len();

        // 1. Focus selection.
        let focus = focus::pick(&frame.targets, cfg.forced_focus_cluster);

        // 2. Last-good value update. Missing or implausible readings
        //    never overwrite a stored value and never read as zero.
        let dist_new = self.store_reading(Field::Dist, frame.distance_cm);
        let br_new = self.store_reading(Field::Breath, frame.breath_bpm);
        let hr_new = self.store_reading(Field::Heart, frame.heart_bpm);

        // 3. Presence. Any signal in the current frame counts; the
        //    absence streak resets the instant one is observed.
        let present_now = frame.human
            || n_targets > 0
            || finite_positive(frame.distance_cm)
            || finite_positive(frame.breath_bpm)
            || finite_positive(frame.heart_bpm);
        if present_now {
            self.last_presence_ms = Some(now_ms);
            self.absent_streak = 0;
        } else {
            self.absent_streak = self.absent_streak.saturating_add(1);
        }
        let presence_recent = self
            .last_presence_ms
            .map(|t| now_ms.wrapping_sub(t) < tuning.absent_hold_ms)
            .unwrap_or(false);

        // 4. Movement.
        let target_moving = focus
            .map(|f| f.target.speed_cm_s(tuning.range_step_cm_s).abs() >= tuning.moving_cm_s)
            .unwrap_or(false);
        let moving = head_moving || target_moving;

        // 5. Near band on the effective distance.
        let near = self
            .last_dist_cm
            .map(|d| d >= tuning.near_min_dist_cm && d <= tuning.near_max_dist_cm)
            .unwrap_or(false);

        // 6. Single-target tracking and the fallback lock.
        let single_target = n_targets == 1;
        if single_target {
            self.seen_single_target = true;
            self.last_single_target_ms = now_ms;
        }
        if frame.human && !head_moving {
            self.human_stable_streak = self.human_stable_streak.saturating_add(1);
        } else {
            self.human_stable_streak = 0;
        }
        let single_target_recent = self.seen_single_target
            && now_ms.wrapping_sub(self.last_single_target_ms) <= tuning.target_loss_grace_ms;
        let fallback_target_lock = !single_target
            && n_targets == 0
            && single_target_recent
            && self.human_stable_streak >= tuning.human_stable_fallback_confirm;

        // 7. Vitals gate. Validity demands readings from this frame;
        //    last-good values only feed telemetry.
        let br_valid = frame
            .breath_bpm
            .map(|v| v.is_finite() && v >= tuning.br_min && v <= tuning.br_max)
            .unwrap_or(false);
        let hr_valid = frame
            .heart_bpm
            .map(|v| v.is_finite() && v >= tuning.hr_min && v <= tuning.hr_max)
            .unwrap_or(false);
        let vitals_allowed = !head_moving && (single_target || fallback_target_lock);
        let vitals_valid = vitals_allowed && br_valid && hr_valid;
        if vitals_valid {
            self.vitals_streak = self.vitals_streak.saturating_add(1);
        } else {
            self.vitals_streak = 0;
        }

        // 8. State decision, first matching rule wins.
        let state = if !presence_recent && self.absent_streak >= tuning.absent_confirm {
            self.vitals_streak = 0;
            PersonState::NoTarget
        } else if n_targets > 1 {
            self.vitals_streak = 0;
            PersonState::MultiTarget
        } else if moving {
            self.vitals_streak = 0;
            PersonState::Moving
        } else if near && self.vitals_streak >= tuning.vitals_confirm {
            PersonState::RestingVitals
        } else if near {
            PersonState::StillNear
        } else {
            PersonState::PresentFar
        };

        if state != self.state {
            info!("state: {} -> {}", self.state.name(), state.name());
            self.state = state;
        }

        // 9. Pose, derived fresh every frame.
        let pose = match (state, self.last_dist_cm) {
            (PersonState::NoTarget, _) | (_, None) => PoseGuess::Unknown,
            (_, Some(d)) if d < tuning.sit_stand_threshold_cm => PoseGuess::Sitting,
            _ => PoseGuess::Standing,
        };

        Assessment {
            state,
            pose,
            human: frame.human,
            n_targets,
            focus,
            head_moving,
            dist_cm: self.last_dist_cm,
            dist_new,
            br_bpm: self.last_br_bpm,
            br_new,
            hr_bpm: self.last_hr_bpm,
            hr_new,
            vitals_allowed,
            vitals_valid,
        }
    }

    fn store_reading(&mut self, field: Field, value: Option<f32>) -> bool {
        let slot = match field {
            Field::Dist => &mut self.last_dist_cm,
            Field::Breath => &mut self.last_br_bpm,
            Field::Heart => &mut self.last_hr_bpm,
        };
        match value {
            Some(v) if v.is_finite() && v > 0.0 => {
                *slot = Some(v);
                true
            }
            _ => false,
        }
    }
}

enum Field {
    Dist,
    Breath,
    Heart,
}

fn finite_positive(value: Option<f32>) -> bool {
    value.map(|v| v.is_finite() && v > 0.0).unwrap_or(false)
}

// ── Tests ────────────────────────────────────────────────────


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::engine::{Target, MAX_TARGETS};
    use heapless::Vec;
    use proptest::prelude::*;

    fn arb_frame() -> impl Strategy<Value = RadarFrame> {
        (
            any::<bool>(),
            proptest::collection::vec((any::<i16>(), -5.0f32..5.0, -5.0f32..5.0, -50i16..50), 0..5),
            proptest::option::of(-10.0f32..500.0),
            proptest::option::of(-5.0f32..60.0),
            proptest::option::of(-5.0f32..250.0),
        )
            .prop_map(|(human, raw_targets, distance_cm, breath_bpm, heart_bpm)| {
                let mut targets: Vec<Target, MAX_TARGETS> = Vec::new();
                for (cluster_id, x_m, y_m, doppler_index) in raw_targets {
                    let _ = targets.push(Target {
                        cluster_id,
                        x_m,
                        y_m,
                        doppler_index,
                    });
                }
                RadarFrame {
                    human,
                    targets,
                    distance_cm,
                    breath_bpm,
                    heart_bpm,
                }
            })
    }

    proptest! {
        /// With the head in motion, no frame sequence ever reports valid
        /// vitals or reaches RESTING_VITALS.
        #[test]
        fn head_motion_always_closes_the_gate(
            frames in proptest::collection::vec(arb_frame(), 1..50),
        ) {
            let mut engine = FusionEngine::new();
            let mut cfg = RuntimeConfig::default();
            cfg.head_moving = true;
            let tuning = Tuning::default();

            let mut now_ms = 0u32;
            for frame in &frames {
                now_ms += 100;
                let a = engine.update(frame, &cfg, &tuning, now_ms);
                prop_assert!(!a.vitals_allowed);
                prop_assert!(!a.vitals_valid);
                prop_assert_ne!(a.state, PersonState::RestingVitals);
            }
        }

        /// Stored readings are always finite and positive, whatever the
        /// driver reports.
        #[test]
        fn last_good_values_stay_plausible(
            frames in proptest::collection::vec(arb_frame(), 1..50),
        ) {
            let mut engine = FusionEngine::new();
            let cfg = RuntimeConfig::default();
            let tuning = Tuning::default();

            let mut now_ms = 0u32;
            for frame in &frames {
                now_ms += 100;
                let a = engine.update(frame, &cfg, &tuning, now_ms);
                for value in [a.dist_cm, a.br_bpm, a.hr_bpm].into_iter().flatten() {
                    prop_assert!(value.is_finite() && value > 0.0);
                }
            }
        }

        /// Any frame with more than one target zeroes the confirmation
        /// streak, so RESTING_VITALS can never directly follow it.
        #[test]
        fn multi_target_always_resets_streak(
            frames in proptest::collection::vec(arb_frame(), 1..50),
        ) {
            let mut engine = FusionEngine::new();
            let cfg = RuntimeConfig::default();
            let tuning = Tuning::default();

            let mut now_ms = 0u32;
            let mut prev_multi = false;
            for frame in &frames {
                now_ms += 100;
                let a = engine.update(frame, &cfg, &tuning, now_ms);
                if frame.targets.len() > 1 {
                    prop_assert_eq!(engine.vitals_streak(), 0);
                }
                if prev_multi {
                    prop_assert_ne!(a.state, PersonState::RestingVitals);
                }
                prev_multi = a.state == PersonState::MultiTarget;
            }
        }
    }
}
